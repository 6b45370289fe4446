//! The engine instance.
//!
//! # Overview
//!
//! An [`Engine`] is one live editing session: it owns the attributed
//! [`Document`], the selection, the instantiated capability modules, and the
//! change subscriptions. Construction captures an [`EngineOptions`] snapshot
//! (theme, keymap, module names) that never changes for the lifetime of the
//! instance.
//!
//! Mutations carry a [`ChangeSource`]:
//!
//! - `User` edits are rejected while the engine is disabled,
//! - `Api` edits always pass,
//! - `Silent` edits pass and suppress change notification.
//!
//! # Example
//!
//! ```rust
//! use editor_engine::{ChangeSource, Engine, EngineOptions};
//!
//! let mut engine = Engine::new(EngineOptions::default()).unwrap();
//! engine.on_text_change(|change| {
//!     println!("{} ops applied", change.delta.ops.len());
//! });
//! engine.insert_text(0, "Hello", ChangeSource::Api).unwrap();
//! assert_eq!(engine.text(), "Hello");
//! ```

use crate::delta::Delta;
use crate::document::Document;
use crate::keyboard::{BindingAction, Key, KeyEvent, Keymap};
use crate::module::{EngineModule, ModuleContext};
use crate::registry;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};

/// Visual theme recorded in the construction options.
///
/// The engine is headless; the theme is carried for the embedding layer and
/// has no effect on content semantics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Theme {
    /// Toolbar-above-content presentation.
    #[default]
    Snow,
    /// Minimal floating-toolbar presentation.
    Bubble,
}

/// Construction-time configuration snapshot. Captured once per instance;
/// later changes by the caller have no effect on a live engine.
#[derive(Debug, Clone, Default)]
pub struct EngineOptions {
    /// Visual theme for the embedding layer.
    pub theme: Theme,
    /// Key bindings consulted by [`Engine::input_key`].
    pub keymap: Keymap,
    /// Names of capability modules to instantiate from the process registry.
    pub modules: Vec<String>,
}

/// Who caused a mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeSource {
    /// A user-initiated edit (subject to the enabled state).
    User,
    /// A programmatic edit.
    Api,
    /// A programmatic edit that must not notify subscribers.
    Silent,
}

/// Caret or selection expressed in character offsets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SelectionRange {
    /// Start offset.
    pub index: usize,
    /// Selected character count (0 for a caret).
    pub len: usize,
}

impl SelectionRange {
    /// A zero-length selection at `index`.
    pub fn caret(index: usize) -> Self {
        Self { index, len: 0 }
    }

    /// Exclusive end offset.
    pub fn end(&self) -> usize {
        self.index + self.len
    }

    /// Returns `true` for a zero-length selection.
    pub fn is_caret(&self) -> bool {
        self.len == 0
    }
}

/// A content-change notification.
#[derive(Debug, Clone)]
pub struct TextChange {
    /// The change that was applied.
    pub delta: Delta,
    /// Full content before the change, as an insert-only delta.
    pub old_contents: Delta,
    /// Who caused the change.
    pub source: ChangeSource,
}

/// A selection-change notification.
#[derive(Debug, Clone)]
pub struct SelectionChange {
    /// The new selection (`None` when focus left the surface).
    pub range: Option<SelectionRange>,
    /// The previous selection.
    pub old_range: Option<SelectionRange>,
    /// Who caused the change.
    pub source: ChangeSource,
}

/// Content-change callback type.
///
/// Callbacks are `FnMut` without a `Send` bound: the engine runs on a single
/// cooperative thread and subscribers typically capture `Rc` state.
pub type TextChangeCallback = Box<dyn FnMut(&TextChange)>;

/// Selection-change callback type.
pub type SelectionChangeCallback = Box<dyn FnMut(&SelectionChange)>;

/// Process-unique identifier of an engine instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EngineId(u64);

impl EngineId {
    /// Get the underlying numeric id.
    pub fn get(self) -> u64 {
        self.0
    }
}

static NEXT_ENGINE_ID: AtomicU64 = AtomicU64::new(1);

/// Errors produced by engine construction and mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    /// A delta consumes more characters than the document holds.
    DeltaOutOfBounds {
        /// Characters the delta retains + deletes.
        needed: usize,
        /// Current document character count.
        len: usize,
    },
    /// A selection or offset exceeds the document bounds.
    InvalidRange {
        /// Start offset.
        index: usize,
        /// Selected length.
        len: usize,
    },
    /// A configured module name is absent from the process registry.
    UnknownModule(String),
    /// A dispatch target was not instantiated on this engine.
    ModuleMissing(String),
    /// A user-sourced mutation was rejected while the engine is disabled.
    Disabled,
    /// A module reported a failure.
    Module(String),
}

impl std::fmt::Display for EngineError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EngineError::DeltaOutOfBounds { needed, len } => {
                write!(f, "delta consumes {} chars but document has {}", needed, len)
            }
            EngineError::InvalidRange { index, len } => {
                write!(f, "invalid range: {}..{}", index, index + len)
            }
            EngineError::UnknownModule(name) => {
                write!(f, "module '{}' is not registered", name)
            }
            EngineError::ModuleMissing(name) => {
                write!(f, "module '{}' is not enabled on this engine", name)
            }
            EngineError::Disabled => {
                write!(f, "user edit rejected: engine is disabled")
            }
            EngineError::Module(message) => {
                write!(f, "{}", message)
            }
        }
    }
}

impl std::error::Error for EngineError {}

/// One live editing session.
pub struct Engine {
    id: EngineId,
    document: Document,
    selection: Option<SelectionRange>,
    enabled: bool,
    options: EngineOptions,
    modules: BTreeMap<String, Box<dyn EngineModule>>,
    text_callbacks: Vec<TextChangeCallback>,
    selection_callbacks: Vec<SelectionChangeCallback>,
    version: u64,
}

impl Engine {
    /// Construct an engine from a configuration snapshot.
    ///
    /// Every name in `options.modules` is resolved against the process
    /// registry; an unknown name fails construction.
    pub fn new(options: EngineOptions) -> Result<Self, EngineError> {
        let mut modules: BTreeMap<String, Box<dyn EngineModule>> = BTreeMap::new();
        for name in &options.modules {
            let ctor = registry::registered_module(name)
                .ok_or_else(|| EngineError::UnknownModule(name.clone()))?;
            modules.insert(name.clone(), ctor(&options));
        }
        Ok(Self {
            id: EngineId(NEXT_ENGINE_ID.fetch_add(1, Ordering::Relaxed)),
            document: Document::new(),
            selection: None,
            enabled: true,
            options,
            modules,
            text_callbacks: Vec::new(),
            selection_callbacks: Vec::new(),
            version: 0,
        })
    }

    /// Process-unique id of this instance.
    pub fn id(&self) -> EngineId {
        self.id
    }

    /// Number of content mutations applied so far.
    pub fn version(&self) -> u64 {
        self.version
    }

    /// The configuration snapshot captured at construction.
    pub fn options(&self) -> &EngineOptions {
        &self.options
    }

    /// The current document.
    pub fn document(&self) -> &Document {
        &self.document
    }

    /// Full content as an insert-only delta.
    pub fn contents(&self) -> Delta {
        self.document.contents()
    }

    /// Full text without attributes.
    pub fn text(&self) -> String {
        self.document.text()
    }

    /// Whether user edits are currently accepted.
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Set whether user edits are accepted. Idempotent; applying the current
    /// state again is a no-op.
    pub fn enable(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    /// Subscribe to content changes. Callbacks run in subscription order,
    /// synchronously, in engine emission order.
    pub fn on_text_change(&mut self, callback: impl FnMut(&TextChange) + 'static) {
        self.text_callbacks.push(Box::new(callback));
    }

    /// Subscribe to selection changes.
    pub fn on_selection_change(&mut self, callback: impl FnMut(&SelectionChange) + 'static) {
        self.selection_callbacks.push(Box::new(callback));
    }

    /// Replace the entire content.
    pub fn set_contents(&mut self, contents: Delta, source: ChangeSource) -> Result<(), EngineError> {
        self.check_source(source)?;
        let old_contents = self.document.contents();
        let old_len = self.document.len_chars();

        let mut document = Document::new();
        document.apply(&contents)?;
        self.document = document;
        self.selection = self.selection.map(|range| self.clamp_range(range));
        self.version += 1;

        let mut delta = Delta::new().delete(old_len);
        delta.ops.extend(contents.ops);
        self.emit_text_change(TextChange {
            delta,
            old_contents,
            source,
        });
        Ok(())
    }

    /// Apply a change to the content.
    pub fn update_contents(&mut self, delta: &Delta, source: ChangeSource) -> Result<(), EngineError> {
        self.check_source(source)?;
        if delta.is_empty() {
            return Ok(());
        }
        let old_contents = self.document.contents();
        self.document.apply(delta)?;
        self.selection = self.selection.map(|range| self.clamp_range(range));
        self.version += 1;
        self.emit_text_change(TextChange {
            delta: delta.clone(),
            old_contents,
            source,
        });
        Ok(())
    }

    /// Insert plain text at a character offset.
    pub fn insert_text(
        &mut self,
        offset: usize,
        text: &str,
        source: ChangeSource,
    ) -> Result<(), EngineError> {
        if offset > self.document.len_chars() {
            return Err(EngineError::InvalidRange {
                index: offset,
                len: 0,
            });
        }
        let delta = Delta::new().retain(offset).insert(text);
        self.update_contents(&delta, source)
    }

    /// The current selection.
    pub fn selection(&self) -> Option<SelectionRange> {
        self.selection
    }

    /// Move the selection. `None` means focus left the surface.
    pub fn set_selection(
        &mut self,
        range: Option<SelectionRange>,
        source: ChangeSource,
    ) -> Result<(), EngineError> {
        if let Some(range) = range {
            if range.end() > self.document.len_chars() {
                return Err(EngineError::InvalidRange {
                    index: range.index,
                    len: range.len,
                });
            }
        }
        let old_range = self.selection;
        self.selection = range;
        self.emit_selection_change(SelectionChange {
            range,
            old_range,
            source,
        });
        Ok(())
    }

    /// Returns `true` if a module was instantiated under `name`.
    pub fn has_module(&self, name: &str) -> bool {
        self.modules.contains_key(name)
    }

    /// Typed access to an instantiated module.
    pub fn module<M: EngineModule>(&self, name: &str) -> Option<&M> {
        self.modules
            .get(name)
            .and_then(|module| module.as_any().downcast_ref::<M>())
    }

    /// Typed mutable access to an instantiated module.
    pub fn module_mut<M: EngineModule>(&mut self, name: &str) -> Option<&mut M> {
        self.modules
            .get_mut(name)
            .and_then(|module| module.as_any_mut().downcast_mut::<M>())
    }

    /// Dispatch a command to a module and apply the content change it
    /// produces, if any.
    pub fn dispatch(
        &mut self,
        module: &str,
        command: &str,
        payload: &str,
        source: ChangeSource,
    ) -> Result<(), EngineError> {
        self.check_source(source)?;
        let mut target = self
            .modules
            .remove(module)
            .ok_or_else(|| EngineError::ModuleMissing(module.to_string()))?;
        let result = target.command(
            ModuleContext {
                document: &self.document,
                selection: self.selection,
            },
            command,
            payload,
        );
        // The module must be back in place even when the command failed.
        self.modules.insert(module.to_string(), target);
        if let Some(delta) = result? {
            self.update_contents(&delta, source)?;
        }
        Ok(())
    }

    /// Feed a user key press through the keymap.
    ///
    /// Returns `Ok(false)` when the engine is disabled or nothing handled the
    /// key. Bindings that decline (a module command producing no change)
    /// cascade to the built-in behavior for that key.
    pub fn input_key(&mut self, event: KeyEvent) -> Result<bool, EngineError> {
        if !self.enabled {
            return Ok(false);
        }
        if let Some(action) = self.options.keymap.lookup(&event).cloned() {
            if self.run_binding(action)? {
                return Ok(true);
            }
        }
        match event.key {
            Key::Char(c) if !event.ctrl && !event.alt => {
                self.run_binding(BindingAction::InsertText(c.to_string()))
            }
            Key::Enter => self.run_binding(BindingAction::InsertText("\n".to_string())),
            Key::Backspace => self.run_binding(BindingAction::DeleteBackward),
            _ => Ok(false),
        }
    }

    fn run_binding(&mut self, action: BindingAction) -> Result<bool, EngineError> {
        match action {
            BindingAction::InsertText(text) => {
                let sel = self.caret_selection();
                let len = text.chars().count();
                let delta = Delta::new().retain(sel.index).delete(sel.len).insert(text);
                self.update_contents(&delta, ChangeSource::User)?;
                self.set_caret(sel.index + len);
                Ok(true)
            }
            BindingAction::DeleteBackward => {
                let sel = self.caret_selection();
                let (start, removed) = if sel.len > 0 {
                    (sel.index, sel.len)
                } else if sel.index > 0 {
                    let start = self.document.prev_grapheme_start(sel.index);
                    (start, sel.index - start)
                } else {
                    return Ok(false);
                };
                let delta = Delta::new().retain(start).delete(removed);
                self.update_contents(&delta, ChangeSource::User)?;
                self.set_caret(start);
                Ok(true)
            }
            BindingAction::Module { module, command } => {
                let before = self.version;
                self.dispatch(&module, &command, "", ChangeSource::User)?;
                Ok(self.version != before)
            }
        }
    }

    fn caret_selection(&self) -> SelectionRange {
        self.selection
            .unwrap_or_else(|| SelectionRange::caret(self.document.len_chars()))
    }

    fn set_caret(&mut self, offset: usize) {
        // Internal caret maintenance after an edit; not an observable
        // selection change.
        self.selection = Some(SelectionRange::caret(offset.min(self.document.len_chars())));
    }

    fn clamp_range(&self, range: SelectionRange) -> SelectionRange {
        let total = self.document.len_chars();
        let index = range.index.min(total);
        SelectionRange {
            index,
            len: range.len.min(total - index),
        }
    }

    fn check_source(&self, source: ChangeSource) -> Result<(), EngineError> {
        if !self.enabled && source == ChangeSource::User {
            return Err(EngineError::Disabled);
        }
        Ok(())
    }

    fn emit_text_change(&mut self, change: TextChange) {
        if change.source == ChangeSource::Silent {
            return;
        }
        for callback in &mut self.text_callbacks {
            callback(&change);
        }
    }

    fn emit_selection_change(&mut self, change: SelectionChange) {
        if change.source == ChangeSource::Silent {
            return;
        }
        for callback in &mut self.selection_callbacks {
            callback(&change);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn ids_are_unique() {
        let a = Engine::new(EngineOptions::default()).unwrap();
        let b = Engine::new(EngineOptions::default()).unwrap();
        assert_ne!(a.id(), b.id());
    }

    #[test]
    fn insert_and_read_back() {
        let mut engine = Engine::new(EngineOptions::default()).unwrap();
        engine.insert_text(0, "hello", ChangeSource::Api).unwrap();
        engine.insert_text(5, " world", ChangeSource::Api).unwrap();
        assert_eq!(engine.text(), "hello world");
        assert_eq!(engine.version(), 2);
    }

    #[test]
    fn text_change_notifications_in_order() {
        let mut engine = Engine::new(EngineOptions::default()).unwrap();
        let log = Rc::new(RefCell::new(Vec::new()));

        let sink = log.clone();
        engine.on_text_change(move |change| {
            sink.borrow_mut().push(change.delta.inserted_len());
        });

        engine.insert_text(0, "a", ChangeSource::Api).unwrap();
        engine.insert_text(1, "bc", ChangeSource::Api).unwrap();
        assert_eq!(*log.borrow(), vec![1, 2]);
    }

    #[test]
    fn silent_source_suppresses_notification() {
        let mut engine = Engine::new(EngineOptions::default()).unwrap();
        let count = Rc::new(RefCell::new(0));

        let sink = count.clone();
        engine.on_text_change(move |_| *sink.borrow_mut() += 1);

        engine.insert_text(0, "seed", ChangeSource::Silent).unwrap();
        assert_eq!(*count.borrow(), 0);
        assert_eq!(engine.text(), "seed");

        engine.insert_text(4, "!", ChangeSource::Api).unwrap();
        assert_eq!(*count.borrow(), 1);
    }

    #[test]
    fn disabled_rejects_user_edits_only() {
        let mut engine = Engine::new(EngineOptions::default()).unwrap();
        engine.insert_text(0, "ab", ChangeSource::User).unwrap();

        engine.enable(false);
        assert_eq!(
            engine.insert_text(2, "c", ChangeSource::User),
            Err(EngineError::Disabled)
        );
        engine.insert_text(2, "c", ChangeSource::Api).unwrap();
        assert_eq!(engine.text(), "abc");

        // Disabling twice is observably the same as disabling once.
        engine.enable(false);
        assert!(!engine.is_enabled());
        assert_eq!(
            engine.input_key(KeyEvent::char('x')).unwrap(),
            false
        );

        engine.enable(true);
        engine.insert_text(3, "d", ChangeSource::User).unwrap();
        assert_eq!(engine.text(), "abcd");
    }

    #[test]
    fn selection_change_reports_old_range() {
        let mut engine = Engine::new(EngineOptions::default()).unwrap();
        engine.insert_text(0, "hello", ChangeSource::Api).unwrap();

        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = seen.clone();
        engine.on_selection_change(move |change| {
            sink.borrow_mut().push((change.old_range, change.range));
        });

        engine
            .set_selection(Some(SelectionRange::caret(2)), ChangeSource::User)
            .unwrap();
        engine.set_selection(None, ChangeSource::User).unwrap();

        let seen = seen.borrow();
        assert_eq!(seen[0], (None, Some(SelectionRange::caret(2))));
        assert_eq!(seen[1], (Some(SelectionRange::caret(2)), None));
    }

    #[test]
    fn selection_out_of_bounds_is_rejected() {
        let mut engine = Engine::new(EngineOptions::default()).unwrap();
        engine.insert_text(0, "ab", ChangeSource::Api).unwrap();
        assert_eq!(
            engine.set_selection(Some(SelectionRange { index: 1, len: 5 }), ChangeSource::Api),
            Err(EngineError::InvalidRange { index: 1, len: 5 })
        );
    }

    #[test]
    fn unknown_module_fails_construction() {
        let options = EngineOptions {
            modules: vec!["no-such-module".to_string()],
            ..EngineOptions::default()
        };
        assert_eq!(
            Engine::new(options).err(),
            Some(EngineError::UnknownModule("no-such-module".to_string()))
        );
    }

    #[test]
    fn input_key_types_replacing_selection() {
        let mut engine = Engine::new(EngineOptions::default()).unwrap();
        engine.insert_text(0, "hello", ChangeSource::Api).unwrap();
        engine
            .set_selection(Some(SelectionRange { index: 1, len: 3 }), ChangeSource::Api)
            .unwrap();

        assert!(engine.input_key(KeyEvent::char('u')).unwrap());
        assert_eq!(engine.text(), "huo");
        assert_eq!(engine.selection(), Some(SelectionRange::caret(2)));
    }

    #[test]
    fn backspace_removes_one_grapheme_cluster() {
        let mut engine = Engine::new(EngineOptions::default()).unwrap();
        engine.insert_text(0, "ae\u{301}", ChangeSource::Api).unwrap();
        engine
            .set_selection(Some(SelectionRange::caret(3)), ChangeSource::Api)
            .unwrap();

        assert!(engine.input_key(KeyEvent::plain(Key::Backspace)).unwrap());
        assert_eq!(engine.text(), "a");
    }

    #[test]
    fn set_contents_reports_replacement_delta() {
        let mut engine = Engine::new(EngineOptions::default()).unwrap();
        engine.insert_text(0, "old", ChangeSource::Api).unwrap();

        let seen = Rc::new(RefCell::new(None));
        let sink = seen.clone();
        engine.on_text_change(move |change| {
            *sink.borrow_mut() = Some(change.delta.clone());
        });

        engine
            .set_contents(Delta::new().insert("new!"), ChangeSource::Api)
            .unwrap();
        assert_eq!(engine.text(), "new!");
        assert_eq!(
            seen.borrow().clone().unwrap(),
            Delta::new().delete(3).insert("new!")
        );
    }
}
