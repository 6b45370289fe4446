#![warn(missing_docs)]
//! `editor-engine-footnote` - footnote capability module for `editor-engine`.
//!
//! Footnotes live in the content itself, addressable through attributes:
//! a numbered `[n]` marker carrying [`REF_ATTRIBUTE`] at the reference point,
//! a one-time divider line carrying [`DIVIDER_ATTRIBUTE`], and a numbered
//! entry line at the document end carrying [`NOTE_ATTRIBUTE`]. Every marker
//! and entry shares the footnote's process-assigned id as the attribute
//! value, so consumers can correlate them without parsing text.
//!
//! The module is consumed through registration ([`register`]) plus command
//! dispatch (`"add"`, `"remove"`, `"remove-behind"`); it never holds a
//! reference to the engine.

mod footnotes;

pub use footnotes::{FootnoteEntry, FootnoteModule};

use editor_engine::keyboard::{BindingAction, Key, KeyEvent, Keymap};
use editor_engine::registry::register_module;
use thiserror::Error;

/// Registry name of the footnote module.
pub const FOOTNOTE_MODULE: &str = "footnote";

/// Attribute carried by a footnote marker in the body.
pub const REF_ATTRIBUTE: &str = "footnote-ref";

/// Attribute carried by a footnote entry line in the footnote section.
pub const NOTE_ATTRIBUTE: &str = "footnote";

/// Attribute carried by the divider between body and footnote section.
pub const DIVIDER_ATTRIBUTE: &str = "footnote-divider";

/// Errors reported by footnote commands.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum FootnoteError {
    /// No footnote exists with the given id.
    #[error("no footnote with id {0}")]
    UnknownId(u64),

    /// A command payload did not parse as a footnote id.
    #[error("invalid footnote id '{0}'")]
    InvalidId(String),

    /// A command name the module does not understand.
    #[error("unknown footnote command '{0}'")]
    UnknownCommand(String),
}

impl From<FootnoteError> for editor_engine::EngineError {
    fn from(error: FootnoteError) -> Self {
        editor_engine::EngineError::Module(error.to_string())
    }
}

/// Register the footnote module in the process-wide registry.
///
/// Idempotent; hosts call this unconditionally on every mount. Returns `true`
/// on the call that actually installed the constructor.
pub fn register() -> bool {
    register_module(FOOTNOTE_MODULE, footnotes::footnote_module)
}

/// The keymap fragment the embedding layer merges into the engine options:
/// Backspace immediately after a marker removes the whole footnote (marker,
/// entry, and renumbering) instead of eating the marker text char by char.
pub fn keyboard_bindings() -> Keymap {
    let mut keymap = Keymap::new();
    keymap.bind(
        KeyEvent::plain(Key::Backspace),
        BindingAction::Module {
            module: FOOTNOTE_MODULE.to_string(),
            command: "remove-behind".to_string(),
        },
    );
    keymap
}
