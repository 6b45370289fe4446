//! Process-wide capability registry.
//!
//! Modules are registered explicitly, once, at process initialization:
//! [`register_module`] is idempotent (the first constructor registered under
//! a name wins and repeated calls are a safe no-op), so hosts can register
//! their capabilities unconditionally on every mount without coordinating.
//! Engine construction resolves the module names in
//! [`EngineOptions::modules`](crate::EngineOptions) against this registry.

use crate::engine::EngineOptions;
use crate::module::EngineModule;
use once_cell::sync::Lazy;
use std::collections::BTreeMap;
use std::sync::{Mutex, PoisonError};

/// Constructor for a registered module, invoked once per engine instance.
pub type ModuleCtor = fn(&EngineOptions) -> Box<dyn EngineModule>;

/// A name-to-constructor table.
#[derive(Debug, Default)]
pub struct ModuleRegistry {
    ctors: BTreeMap<String, ModuleCtor>,
}

impl ModuleRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `ctor` under `name`. The first registration wins; repeated
    /// calls leave the table unchanged. Returns `true` if this call installed
    /// the constructor.
    pub fn register(&mut self, name: &str, ctor: ModuleCtor) -> bool {
        if self.ctors.contains_key(name) {
            return false;
        }
        self.ctors.insert(name.to_string(), ctor);
        true
    }

    /// Look up a constructor.
    pub fn get(&self, name: &str) -> Option<ModuleCtor> {
        self.ctors.get(name).copied()
    }

    /// Returns `true` if `name` is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.ctors.contains_key(name)
    }
}

static GLOBAL: Lazy<Mutex<ModuleRegistry>> = Lazy::new(|| Mutex::new(ModuleRegistry::new()));

/// Register a module constructor in the process-wide registry. Idempotent.
pub fn register_module(name: &str, ctor: ModuleCtor) -> bool {
    GLOBAL
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .register(name, ctor)
}

/// Look up a module constructor in the process-wide registry.
pub fn registered_module(name: &str) -> Option<ModuleCtor> {
    GLOBAL
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .get(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::delta::Delta;
    use crate::module::ModuleContext;
    use std::any::Any;

    struct Null(&'static str);

    impl EngineModule for Null {
        fn name(&self) -> &'static str {
            self.0
        }

        fn command(
            &mut self,
            _ctx: ModuleContext<'_>,
            _command: &str,
            _payload: &str,
        ) -> Result<Option<Delta>, crate::engine::EngineError> {
            Ok(None)
        }

        fn as_any(&self) -> &dyn Any {
            self
        }

        fn as_any_mut(&mut self) -> &mut dyn Any {
            self
        }
    }

    fn null_a(_options: &EngineOptions) -> Box<dyn EngineModule> {
        Box::new(Null("a"))
    }

    fn null_b(_options: &EngineOptions) -> Box<dyn EngineModule> {
        Box::new(Null("b"))
    }

    #[test]
    fn first_registration_wins() {
        let mut registry = ModuleRegistry::new();
        assert!(registry.register("test", null_a));
        assert!(!registry.register("test", null_b));

        let ctor = registry.get("test").unwrap();
        let module = ctor(&EngineOptions::default());
        assert_eq!(module.name(), "a");
    }

    #[test]
    fn global_registration_is_idempotent() {
        let installed = register_module("registry-test-module", null_a);
        let repeated = register_module("registry-test-module", null_a);
        assert!(installed);
        assert!(!repeated);
        assert!(registered_module("registry-test-module").is_some());
    }
}
