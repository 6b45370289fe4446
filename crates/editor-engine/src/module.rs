//! Capability modules.
//!
//! A module is a named extension instantiated as part of engine construction
//! (see [`crate::registry`]). Modules receive commands through
//! [`crate::Engine::dispatch`]: they read the document and selection, keep
//! their own state, and describe any content mutation as a [`Delta`] for the
//! engine to apply. Modules never hold a reference to the engine, which keeps
//! ownership single-writer.

use crate::delta::Delta;
use crate::document::Document;
use crate::engine::{EngineError, SelectionRange};
use std::any::Any;

/// Read-only view handed to a module command.
pub struct ModuleContext<'a> {
    /// The document at dispatch time.
    pub document: &'a Document,
    /// The selection at dispatch time.
    pub selection: Option<SelectionRange>,
}

/// A named capability extension of the engine.
pub trait EngineModule: Any {
    /// The registry name this module is known under.
    fn name(&self) -> &'static str;

    /// Handle a dispatched command.
    ///
    /// Returns the content change to apply, or `None` when the command did
    /// not apply (the caller may fall back to default behavior).
    fn command(
        &mut self,
        ctx: ModuleContext<'_>,
        command: &str,
        payload: &str,
    ) -> Result<Option<Delta>, EngineError>;

    /// Upcast for typed retrieval via [`crate::Engine::module`].
    fn as_any(&self) -> &dyn Any;

    /// Upcast for typed retrieval via [`crate::Engine::module_mut`].
    fn as_any_mut(&mut self) -> &mut dyn Any;
}
