//! The host component: lifecycle, wiring, and the per-render pass.

use crate::HostError;
use crate::bridge::{HandlerCell, SelectionHandler, TextHandler};
use crate::handle::HostHandle;
use crate::surface::{Attachment, FOOTNOTE_TRIGGER};
use editor_engine::{ChangeSource, Delta, Engine, EngineOptions, Keymap, Theme};
use editor_engine_footnote::FOOTNOTE_MODULE;
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

/// The host's configuration surface, supplied at mount and on every render
/// pass.
///
/// `read_only` is reflected onto the live instance on every pass.
/// `default_value` is consumed at mount only; supplying a different value on
/// a later pass has no effect. The handlers may be fresh closures on every
/// pass; the latest ones always receive deliveries.
#[derive(Default)]
pub struct HostProps {
    /// Reject user edits while `true`.
    pub read_only: bool,
    /// Initial content, applied once at mount.
    pub default_value: Option<Delta>,
    /// Content-change handler.
    pub on_text_change: Option<TextHandler>,
    /// Selection-change handler.
    pub on_selection_change: Option<SelectionHandler>,
}

/// One mount cycle of the editing surface.
///
/// Owns exactly one engine instance from a successful [`mount`](Self::mount)
/// until [`unmount`](Self::unmount) (or drop). The per-render
/// [`update`](Self::update) pass refreshes handlers and the enabled state but
/// never reconstructs the instance, so re-rendering on every keystroke is
/// free.
pub struct EditorHost {
    attachment: Attachment,
    handle: HostHandle,
    handlers: HandlerCell,
    engine: Option<Rc<RefCell<Engine>>>,
}

impl EditorHost {
    /// Mount the surface into an empty attachment point.
    ///
    /// Sequencing: footnote capability registration (idempotent), engine
    /// construction from the configuration snapshot, initial-content seeding,
    /// handle population, event-bridge subscription, toolbar wiring, initial
    /// enabled state. Construction failure is fatal and propagates; nothing
    /// is left mounted.
    pub fn mount(
        attachment: &Attachment,
        handle: &HostHandle,
        props: HostProps,
    ) -> Result<Self, HostError> {
        if !attachment.is_empty() {
            return Err(HostError::AttachmentOccupied);
        }

        editor_engine_footnote::register();

        let mut keymap = Keymap::new();
        keymap.merge(editor_engine_footnote::keyboard_bindings());
        let options = EngineOptions {
            theme: Theme::Snow,
            keymap,
            modules: vec![FOOTNOTE_MODULE.to_string()],
        };
        let mut engine = Engine::new(options)?;
        if !engine.has_module(FOOTNOTE_MODULE) {
            return Err(HostError::FootnoteUnavailable);
        }

        // Seed content before the bridge exists; handlers never observe it,
        // and later prop changes never re-apply it.
        if let Some(contents) = props.default_value {
            engine.set_contents(contents, ChangeSource::Api)?;
        }

        let handlers = HandlerCell::new();
        handlers.set(props.on_text_change, props.on_selection_change);

        // One subscription per category for the lifetime of the instance.
        // Subscriptions only queue: the engine is still mutably borrowed when
        // they run, so delivery waits until the driving wrapper drains.
        let cell = handlers.clone();
        engine.on_text_change(move |change| cell.queue_text(change));
        let cell = handlers.clone();
        engine.on_selection_change(move |change| cell.queue_selection(change));

        engine.enable(!props.read_only);

        let engine = Rc::new(RefCell::new(engine));
        handle.attach(engine.clone(), handlers.clone());

        let action_engine = engine.clone();
        let action_handlers = handlers.clone();
        attachment.add_trigger(
            FOOTNOTE_TRIGGER,
            "Insert Footnote",
            Rc::new(RefCell::new(move || {
                let result = action_engine.borrow_mut().dispatch(
                    FOOTNOTE_MODULE,
                    "add",
                    "",
                    ChangeSource::User,
                );
                action_handlers.drain();
                result.map_err(HostError::from)
            })),
        );
        attachment.bind_content(engine.borrow().id());

        Ok(Self {
            attachment: attachment.clone(),
            handle: handle.clone(),
            handlers,
            engine: Some(engine),
        })
    }

    /// The per-render pass.
    ///
    /// Refreshes the handler cell first, synchronously, so any event
    /// delivered later in the pass sees the latest closures; then reflects
    /// `read_only`. `default_value` is ignored after mount.
    pub fn update(&mut self, props: HostProps) {
        self.handlers
            .set(props.on_text_change, props.on_selection_change);
        if let Some(engine) = &self.engine {
            engine.borrow_mut().enable(!props.read_only);
        }
    }

    /// Tear down the mount: clears the handle, clears both attachment
    /// regions, and releases the instance. Idempotent.
    pub fn unmount(&mut self) {
        if self.engine.take().is_none() {
            return;
        }
        self.handle.clear();
        self.attachment.clear();
    }

    /// Returns `true` while this host holds a live instance.
    pub fn is_live(&self) -> bool {
        self.engine.is_some()
    }

    /// The handle this host populates.
    pub fn handle(&self) -> &HostHandle {
        &self.handle
    }

    /// The attachment point this host mounted into.
    pub fn attachment(&self) -> &Attachment {
        &self.attachment
    }
}

impl fmt::Debug for EditorHost {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EditorHost")
            .field("live", &self.engine.is_some())
            .finish_non_exhaustive()
    }
}

impl Drop for EditorHost {
    fn drop(&mut self) {
        self.unmount();
    }
}
