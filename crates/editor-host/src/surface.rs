//! The attachment point and its rendered regions.
//!
//! An [`Attachment`] is the caller-created container the host mounts into.
//! It must be empty at mount; the host then fully owns its contents: a
//! toolbar region holding pressable triggers and a content region bound to
//! the live instance. Both regions are regenerated on every mount and cleared
//! at unmount, so callers must not assume anything in them persists across
//! remounts.

use crate::HostError;
use editor_engine::EngineId;
use std::cell::RefCell;
use std::rc::Rc;

/// Trigger id of the footnote button installed by the host.
pub const FOOTNOTE_TRIGGER: &str = "footnote";

pub(crate) type TriggerAction = Rc<RefCell<dyn FnMut() -> Result<(), HostError>>>;

struct Trigger {
    id: String,
    label: String,
    action: TriggerAction,
}

#[derive(Default)]
struct AttachmentState {
    toolbar: Vec<Trigger>,
    content: Option<EngineId>,
}

/// A caller-owned view container. Clones share the same regions.
#[derive(Clone, Default)]
pub struct Attachment {
    inner: Rc<RefCell<AttachmentState>>,
}

impl Attachment {
    /// Create an empty attachment point.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` when neither region holds content.
    pub fn is_empty(&self) -> bool {
        let state = self.inner.borrow();
        state.toolbar.is_empty() && state.content.is_none()
    }

    /// Ids of the installed toolbar triggers, in toolbar order.
    pub fn trigger_ids(&self) -> Vec<String> {
        self.inner
            .borrow()
            .toolbar
            .iter()
            .map(|trigger| trigger.id.clone())
            .collect()
    }

    /// Display label of a toolbar trigger.
    pub fn trigger_label(&self, id: &str) -> Option<String> {
        self.inner
            .borrow()
            .toolbar
            .iter()
            .find(|trigger| trigger.id == id)
            .map(|trigger| trigger.label.clone())
    }

    /// Id of the instance the content region is bound to, if mounted.
    pub fn content_engine(&self) -> Option<EngineId> {
        self.inner.borrow().content
    }

    /// Press a toolbar trigger.
    ///
    /// Presses are independent; pressing N times runs the action N times
    /// with no debouncing.
    pub fn press(&self, id: &str) -> Result<(), HostError> {
        let action = self
            .inner
            .borrow()
            .toolbar
            .iter()
            .find(|trigger| trigger.id == id)
            .map(|trigger| trigger.action.clone())
            .ok_or_else(|| HostError::UnknownTrigger(id.to_string()))?;
        // The region borrow is released before the action runs; the action
        // mutates the engine, not the attachment.
        let mut action = action.borrow_mut();
        action()
    }

    pub(crate) fn add_trigger(&self, id: &str, label: &str, action: TriggerAction) {
        self.inner.borrow_mut().toolbar.push(Trigger {
            id: id.to_string(),
            label: label.to_string(),
            action,
        });
    }

    pub(crate) fn bind_content(&self, engine: EngineId) {
        self.inner.borrow_mut().content = Some(engine);
    }

    pub(crate) fn clear(&self) {
        let mut state = self.inner.borrow_mut();
        state.toolbar.clear();
        state.content = None;
    }
}
