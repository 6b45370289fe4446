#![warn(missing_docs)]
//! Editor Engine - Headless Attributed Rich-Text Engine
//!
//! # Overview
//!
//! `editor-engine` is a headless rich-text engine focused on attributed
//! content, change notification, and named capability modules. It does not
//! render anything: an embedding layer (for example the `editor-host` crate)
//! owns the surface and drives the engine through its construction, content,
//! and subscription APIs.
//!
//! # Core Features
//!
//! - **Attributed Deltas**: one operation format for content and changes,
//!   expressed in character offsets, with a conventional JSON serialization
//! - **Rope-Backed Document**: O(log n) text edits with an attribute
//!   run list kept in lockstep
//! - **Change Notifications**: ordered, synchronous text/selection
//!   subscriptions with a `User` / `Api` / `Silent` source taxonomy
//! - **Capability Modules**: named extensions instantiated from an explicit,
//!   idempotent process-wide registry and driven through command dispatch
//! - **Enable/Disable**: user-sourced edits are rejected while disabled;
//!   programmatic edits always pass
//!
//! # Quick Start
//!
//! ```rust
//! use editor_engine::{ChangeSource, Delta, Engine, EngineOptions};
//!
//! let mut engine = Engine::new(EngineOptions::default()).unwrap();
//!
//! engine.on_text_change(|change| {
//!     println!("{} ops applied", change.delta.ops.len());
//! });
//!
//! engine
//!     .set_contents(Delta::new().insert("Hello"), ChangeSource::Api)
//!     .unwrap();
//! assert_eq!(engine.text(), "Hello");
//! ```
//!
//! # Module Description
//!
//! - [`delta`] - attributed content deltas
//! - [`document`] - rope-backed attributed document state
//! - [`engine`] - the engine instance (options, content, events, dispatch)
//! - [`keyboard`] - key events and the construction-time keymap
//! - [`module`] - the capability-module trait
//! - [`registry`] - explicit, idempotent process-wide module registration

pub mod delta;
pub mod document;
pub mod engine;
pub mod keyboard;
pub mod module;
pub mod registry;

pub use delta::{AttributeValue, Attributes, Delta, DeltaOp};
pub use document::{AttrRun, Document};
pub use engine::{
    ChangeSource, Engine, EngineError, EngineId, EngineOptions, SelectionChange,
    SelectionChangeCallback, SelectionRange, TextChange, TextChangeCallback, Theme,
};
pub use keyboard::{BindingAction, Key, KeyBinding, KeyEvent, Keymap};
pub use module::{EngineModule, ModuleContext};
pub use registry::{ModuleCtor, ModuleRegistry, register_module, registered_module};
