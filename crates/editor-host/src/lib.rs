#![warn(missing_docs)]
//! `editor-host` - embedding layer for `editor-engine`.
//!
//! # Overview
//!
//! An [`EditorHost`] owns one engine instance for the duration of a mount
//! cycle and composes three responsibilities in sequence:
//!
//! 1. **Lifecycle** - construct the engine against a caller-owned
//!    [`Attachment`], seed optional initial content, and tear everything down
//!    on unmount (or drop). Construction runs exactly once per mount; the
//!    per-render [`EditorHost::update`] pass never rebuilds the instance.
//! 2. **Event bridge** - forward the engine's text/selection notifications to
//!    caller handlers that may be replaced on every render pass, through a
//!    handler cell refreshed synchronously before any event can observe it.
//!    The engine-side subscription is installed once and only queues; the
//!    wrapper that drove the mutation delivers after releasing its engine
//!    borrow, so handlers can read back through the [`HostHandle`].
//! 3. **Toolbar wiring** - install a single footnote trigger in the
//!    attachment's toolbar region, driving the footnote module through the
//!    engine's dispatch path.
//!
//! Callers reach the live instance only through a [`HostHandle`]: a cloneable
//! reference cell that is empty before mount and after teardown and that
//! exposes command/read accessors rather than ownership.
//!
//! # Example
//!
//! ```rust
//! use editor_host::{Attachment, EditorHost, HostHandle, HostProps, FOOTNOTE_TRIGGER};
//!
//! let attachment = Attachment::new();
//! let handle = HostHandle::new();
//! let mut host = EditorHost::mount(&attachment, &handle, HostProps::default()).unwrap();
//!
//! attachment.press(FOOTNOTE_TRIGGER).unwrap();
//! assert!(handle.text().unwrap().contains("[1]"));
//!
//! host.unmount();
//! assert!(!handle.is_live());
//! ```

mod bridge;
mod handle;
mod host;
mod surface;

pub use bridge::{SelectionHandler, TextHandler};
pub use handle::HostHandle;
pub use host::{EditorHost, HostProps};
pub use surface::{Attachment, FOOTNOTE_TRIGGER};

use editor_engine::EngineError;
use thiserror::Error;

/// Errors surfaced by the host.
///
/// Everything here is a configuration error: fatal at mount (or at a press
/// against a misconfigured toolbar), never retried.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum HostError {
    /// The attachment point already holds content owned by another mount.
    #[error("attachment point is already occupied")]
    AttachmentOccupied,

    /// The footnote module is missing from the engine configuration.
    #[error("footnote module is not available in this configuration")]
    FootnoteUnavailable,

    /// No toolbar trigger with the given id.
    #[error("no trigger '{0}' in the toolbar")]
    UnknownTrigger(String),

    /// An engine failure propagated unchanged.
    #[error(transparent)]
    Engine(#[from] EngineError),
}
