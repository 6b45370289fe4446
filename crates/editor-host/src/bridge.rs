//! The latest-handler cell and its delivery queue.
//!
//! Handler identity may change on every render pass, but the engine-side
//! subscription is installed exactly once per mount. The subscription closes
//! over a [`HandlerCell`] and only queues the event; the wrapper that drove
//! the mutation drains the queue after releasing its engine borrow. Whichever
//! handler was supplied most recently receives the event, and because no
//! engine borrow is held during delivery a handler may freely read back (or
//! mutate) through the handle. An absent handler makes delivery a silent
//! no-op.

use editor_engine::{SelectionChange, TextChange};
use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

/// Caller-supplied text-change handler.
pub type TextHandler = Box<dyn FnMut(&TextChange)>;

/// Caller-supplied selection-change handler.
pub type SelectionHandler = Box<dyn FnMut(&SelectionChange)>;

enum Event {
    Text(TextChange),
    Selection(SelectionChange),
}

#[derive(Default)]
struct Slots {
    on_text_change: Option<TextHandler>,
    on_selection_change: Option<SelectionHandler>,
    pending: VecDeque<Event>,
    draining: bool,
}

/// Shared mutable slot holding the latest handlers and undelivered events.
///
/// Single writer (the host's render pass), single reader (the engine
/// subscription); both run on the one cooperative thread.
#[derive(Clone, Default)]
pub(crate) struct HandlerCell {
    slots: Rc<RefCell<Slots>>,
}

impl HandlerCell {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Replace both handlers. Runs synchronously in the render pass, before
    /// any engine event of that pass can be delivered.
    pub(crate) fn set(
        &self,
        on_text_change: Option<TextHandler>,
        on_selection_change: Option<SelectionHandler>,
    ) {
        let mut slots = self.slots.borrow_mut();
        slots.on_text_change = on_text_change;
        slots.on_selection_change = on_selection_change;
    }

    pub(crate) fn queue_text(&self, change: &TextChange) {
        self.slots
            .borrow_mut()
            .pending
            .push_back(Event::Text(change.clone()));
    }

    pub(crate) fn queue_selection(&self, change: &SelectionChange) {
        self.slots
            .borrow_mut()
            .pending
            .push_back(Event::Selection(change.clone()));
    }

    /// Deliver every queued event, in order, to the current handlers.
    ///
    /// Reentrant drains (a handler mutating through the handle queues more
    /// events and lands here again) return immediately; the outer drain picks
    /// the new events up in order.
    pub(crate) fn drain(&self) {
        {
            let mut slots = self.slots.borrow_mut();
            if slots.draining {
                return;
            }
            slots.draining = true;
        }
        loop {
            // Pop in its own statement so the borrow ends before delivery;
            // `while let` would hold the `borrow_mut` temporary for the body.
            let popped = self.slots.borrow_mut().pending.pop_front();
            let Some(event) = popped else { break };
            match event {
                Event::Text(change) => self.deliver_text(&change),
                Event::Selection(change) => self.deliver_selection(&change),
            }
        }
        self.slots.borrow_mut().draining = false;
    }

    fn deliver_text(&self, change: &TextChange) {
        // The handler is taken out for the duration of the call so a handler
        // that itself triggers a render pass cannot alias the slot.
        let handler = self.slots.borrow_mut().on_text_change.take();
        if let Some(mut handler) = handler {
            handler(change);
            let mut slots = self.slots.borrow_mut();
            if slots.on_text_change.is_none() {
                slots.on_text_change = Some(handler);
            }
        }
    }

    fn deliver_selection(&self, change: &SelectionChange) {
        let handler = self.slots.borrow_mut().on_selection_change.take();
        if let Some(mut handler) = handler {
            handler(change);
            let mut slots = self.slots.borrow_mut();
            if slots.on_selection_change.is_none() {
                slots.on_selection_change = Some(handler);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use editor_engine::{ChangeSource, Delta};

    fn change(text: &str) -> TextChange {
        TextChange {
            delta: Delta::new().insert(text),
            old_contents: Delta::new(),
            source: ChangeSource::Api,
        }
    }

    #[test]
    fn absent_handler_is_a_silent_noop() {
        let cell = HandlerCell::new();
        cell.queue_text(&change("x"));
        cell.drain();
    }

    #[test]
    fn latest_handler_receives_delivery() {
        let cell = HandlerCell::new();
        let log = Rc::new(RefCell::new(Vec::new()));

        for tag in ["first", "second", "third"] {
            let sink = log.clone();
            cell.set(
                Some(Box::new(move |_change| sink.borrow_mut().push(tag))),
                None,
            );
        }
        cell.queue_text(&change("x"));
        cell.drain();
        assert_eq!(*log.borrow(), vec!["third"]);
    }

    #[test]
    fn handler_survives_repeated_deliveries() {
        let cell = HandlerCell::new();
        let count = Rc::new(RefCell::new(0));

        let sink = count.clone();
        cell.set(Some(Box::new(move |_| *sink.borrow_mut() += 1)), None);

        cell.queue_text(&change("x"));
        cell.drain();
        cell.queue_text(&change("y"));
        cell.drain();
        assert_eq!(*count.borrow(), 2);
    }

    #[test]
    fn queued_events_deliver_in_order() {
        let cell = HandlerCell::new();
        let log = Rc::new(RefCell::new(Vec::new()));

        let sink = log.clone();
        cell.set(
            Some(Box::new(move |change: &TextChange| {
                sink.borrow_mut().push(change.delta.inserted_len());
            })),
            None,
        );

        cell.queue_text(&change("a"));
        cell.queue_text(&change("bc"));
        cell.drain();
        assert_eq!(*log.borrow(), vec![1, 2]);
    }

    #[test]
    fn reentrant_drain_defers_to_the_outer_one() {
        let cell = HandlerCell::new();
        let log = Rc::new(RefCell::new(Vec::new()));

        let sink = log.clone();
        let inner = cell.clone();
        cell.set(
            Some(Box::new(move |delivered: &TextChange| {
                sink.borrow_mut().push(delivered.delta.inserted_len());
                if sink.borrow().len() == 1 {
                    inner.queue_text(&change("bc"));
                    inner.drain();
                }
            })),
            None,
        );

        cell.queue_text(&change("a"));
        cell.drain();
        // The nested event was delivered by the outer drain, after the first
        // handler call returned.
        assert_eq!(*log.borrow(), vec![1, 2]);
    }
}
