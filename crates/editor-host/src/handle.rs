//! The imperative handle to the live instance.

use crate::HostError;
use crate::bridge::HandlerCell;
use editor_engine::{ChangeSource, Delta, Engine, EngineId, KeyEvent, SelectionRange};
use std::cell::RefCell;
use std::rc::Rc;

/// The engine plus the event sink the host wired it to. Mutating calls drain
/// the sink after the engine borrow ends, so handlers observe a borrow-free
/// engine.
#[derive(Clone)]
struct Wiring {
    engine: Rc<RefCell<Engine>>,
    handlers: HandlerCell,
}

/// Caller-owned reference cell pointing at the live engine instance.
///
/// The cell is empty before mount and after teardown; only the host writes
/// it. Clones share the same slot, so a handle created before mount observes
/// the instance once the host attaches it.
///
/// The handle is command/read-only by construction: callers can toggle
/// editing, read and write content, and drive user input, but there is no way
/// to replace or destroy the instance through it. Operations against an empty
/// handle are guarded no-ops, never errors, because callers may legitimately
/// race the mount sequence.
#[derive(Clone, Default)]
pub struct HostHandle {
    slot: Rc<RefCell<Option<Wiring>>>,
}

impl HostHandle {
    /// Create an empty handle.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` while an instance is live.
    pub fn is_live(&self) -> bool {
        self.slot.borrow().is_some()
    }

    /// Id of the live instance, if any.
    pub fn engine_id(&self) -> Option<EngineId> {
        self.wiring().map(|wiring| wiring.engine.borrow().id())
    }

    /// Set whether user edits are accepted. Returns `false` (and does
    /// nothing) when no instance is live. Idempotent.
    pub fn enable(&self, enabled: bool) -> bool {
        match self.wiring() {
            Some(wiring) => {
                wiring.engine.borrow_mut().enable(enabled);
                true
            }
            None => false,
        }
    }

    /// Whether the live instance currently accepts user edits.
    pub fn is_enabled(&self) -> Option<bool> {
        self.wiring()
            .map(|wiring| wiring.engine.borrow().is_enabled())
    }

    /// Full content of the live instance as an insert-only delta.
    pub fn contents(&self) -> Option<Delta> {
        self.wiring()
            .map(|wiring| wiring.engine.borrow().contents())
    }

    /// Full text of the live instance.
    pub fn text(&self) -> Option<String> {
        self.wiring().map(|wiring| wiring.engine.borrow().text())
    }

    /// Replace the content of the live instance. No-op when not live.
    pub fn set_contents(&self, contents: Delta) -> Result<(), HostError> {
        match self.wiring() {
            Some(wiring) => {
                let result = wiring
                    .engine
                    .borrow_mut()
                    .set_contents(contents, ChangeSource::Api);
                wiring.handlers.drain();
                Ok(result?)
            }
            None => Ok(()),
        }
    }

    /// Apply a change to the live instance. No-op when not live.
    pub fn update_contents(&self, delta: &Delta) -> Result<(), HostError> {
        match self.wiring() {
            Some(wiring) => {
                let result = wiring
                    .engine
                    .borrow_mut()
                    .update_contents(delta, ChangeSource::Api);
                wiring.handlers.drain();
                Ok(result?)
            }
            None => Ok(()),
        }
    }

    /// Move the selection of the live instance. No-op when not live.
    pub fn set_selection(&self, range: Option<SelectionRange>) -> Result<(), HostError> {
        match self.wiring() {
            Some(wiring) => {
                let result = wiring
                    .engine
                    .borrow_mut()
                    .set_selection(range, ChangeSource::Api);
                wiring.handlers.drain();
                Ok(result?)
            }
            None => Ok(()),
        }
    }

    /// Feed a user key press to the live instance. Returns `Ok(false)` when
    /// not live, when editing is disabled, or when nothing handled the key.
    pub fn input_key(&self, event: KeyEvent) -> Result<bool, HostError> {
        match self.wiring() {
            Some(wiring) => {
                let result = wiring.engine.borrow_mut().input_key(event);
                wiring.handlers.drain();
                Ok(result?)
            }
            None => Ok(false),
        }
    }

    /// Run a read-only closure against the live instance.
    pub fn with_engine<R>(&self, f: impl FnOnce(&Engine) -> R) -> Option<R> {
        self.wiring().map(|wiring| f(&wiring.engine.borrow()))
    }

    pub(crate) fn attach(&self, engine: Rc<RefCell<Engine>>, handlers: HandlerCell) {
        *self.slot.borrow_mut() = Some(Wiring { engine, handlers });
    }

    pub(crate) fn clear(&self) {
        *self.slot.borrow_mut() = None;
    }

    fn wiring(&self) -> Option<Wiring> {
        self.slot.borrow().clone()
    }
}
