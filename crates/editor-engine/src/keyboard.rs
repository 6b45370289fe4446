//! Key events and the construction-time keymap.
//!
//! A [`Keymap`] is part of the engine's configuration snapshot: it is captured
//! at construction and consulted by [`crate::Engine::input_key`]. Bindings map
//! a key event to a tagged [`BindingAction`] rather than to a callback, so a
//! keymap can be built, merged, and inspected as plain data.

/// A logical key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    /// A printable character.
    Char(char),
    /// Backspace.
    Backspace,
    /// Forward delete.
    Delete,
    /// Enter / return.
    Enter,
    /// Tab.
    Tab,
    /// Escape.
    Escape,
}

/// A key press with modifier state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeyEvent {
    /// The logical key.
    pub key: Key,
    /// Shift held.
    pub shift: bool,
    /// Control held.
    pub ctrl: bool,
    /// Alt/Option held.
    pub alt: bool,
}

impl KeyEvent {
    /// A key press with no modifiers.
    pub fn plain(key: Key) -> Self {
        Self {
            key,
            shift: false,
            ctrl: false,
            alt: false,
        }
    }

    /// A plain character press.
    pub fn char(c: char) -> Self {
        Self::plain(Key::Char(c))
    }
}

/// What a matched binding does.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BindingAction {
    /// Insert literal text at the caret, replacing the selection.
    InsertText(String),
    /// Delete the selection, or one grapheme cluster before the caret.
    DeleteBackward,
    /// Dispatch a named command to a named capability module.
    Module {
        /// Registry name of the target module.
        module: String,
        /// Command understood by the module.
        command: String,
    },
}

/// One keymap entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyBinding {
    /// The key event this binding matches exactly.
    pub event: KeyEvent,
    /// The action to run on a match.
    pub action: BindingAction,
}

/// An ordered binding table. Lookup returns the first match, so earlier
/// bindings shadow later ones.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Keymap {
    bindings: Vec<KeyBinding>,
}

impl Keymap {
    /// Create an empty keymap.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a binding.
    pub fn bind(&mut self, event: KeyEvent, action: BindingAction) {
        self.bindings.push(KeyBinding { event, action });
    }

    /// Append every binding of `other` after the existing ones (existing
    /// bindings keep precedence).
    pub fn merge(&mut self, other: Keymap) {
        self.bindings.extend(other.bindings);
    }

    /// First action bound to `event`, if any.
    pub fn lookup(&self, event: &KeyEvent) -> Option<&BindingAction> {
        self.bindings
            .iter()
            .find(|binding| binding.event == *event)
            .map(|binding| &binding.action)
    }

    /// Number of bindings.
    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    /// Returns `true` if the keymap holds no bindings.
    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_binding_wins() {
        let mut keymap = Keymap::new();
        keymap.bind(
            KeyEvent::plain(Key::Backspace),
            BindingAction::Module {
                module: "footnote".to_string(),
                command: "remove-behind".to_string(),
            },
        );
        keymap.bind(KeyEvent::plain(Key::Backspace), BindingAction::DeleteBackward);

        match keymap.lookup(&KeyEvent::plain(Key::Backspace)) {
            Some(BindingAction::Module { module, .. }) => assert_eq!(module, "footnote"),
            other => panic!("unexpected binding: {other:?}"),
        }
    }

    #[test]
    fn merge_keeps_existing_precedence() {
        let mut base = Keymap::new();
        base.bind(KeyEvent::char('x'), BindingAction::InsertText("X".to_string()));

        let mut extra = Keymap::new();
        extra.bind(KeyEvent::char('x'), BindingAction::InsertText("Y".to_string()));
        base.merge(extra);

        assert_eq!(base.len(), 2);
        assert_eq!(
            base.lookup(&KeyEvent::char('x')),
            Some(&BindingAction::InsertText("X".to_string()))
        );
    }
}
