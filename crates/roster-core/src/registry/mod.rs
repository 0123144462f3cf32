//! Operation registry -- maps operation names to typed handlers.
//!
//! The executor looks up every plan operation here before touching the
//! store, so an unknown name is reported as its own error kind instead of
//! as an opaque store failure.
//!
//! ```text
//! PlanExecutor
//!     |
//!     v
//! OperationRegistry --get("createTeam")--> &dyn OperationHandler
//!                                              |
//!                                  check(args) |  apply(store, args)
//!                                              v
//!                                         GraphStore
//! ```

pub mod builtin;
pub mod spec;
pub mod trait_def;

use std::collections::HashMap;

use thiserror::Error;

pub use builtin::{
    ADD_TEAM_MANAGER, ADD_TEAM_MEMBER, CREATE_PERSON, CREATE_TEAM, builtin_operations,
};
pub use spec::{ArgumentError, EntityKind, EntityRef, OperationSpec, ParamKind, ParamSpec};
pub use trait_def::{OperationHandler, StoreQuery};

/// Errors raised when registering a handler.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("operation name must not be empty")]
    EmptyName,

    #[error("operation {0:?} is already registered")]
    Duplicate(String),

    #[error("operation {operation:?} has an invalid signature: {reason}")]
    InvalidSpec { operation: String, reason: String },
}

/// A collection of registered [`OperationHandler`]s, keyed by name.
#[derive(Default)]
pub struct OperationRegistry {
    handlers: HashMap<String, Box<dyn OperationHandler>>,
}

impl OperationRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry holding the built-in team operations.
    ///
    /// Fails if any built-in is rejected, so a registry is never returned
    /// with part of the catalog missing.
    pub fn with_builtin() -> Result<Self, RegistryError> {
        Self::with_handlers(builtin_operations())
    }

    /// Create a registry from `handlers`, stopping at the first one that
    /// fails to register.
    pub fn with_handlers<H>(handlers: impl IntoIterator<Item = H>) -> Result<Self, RegistryError>
    where
        H: OperationHandler + 'static,
    {
        let mut registry = Self::new();
        for handler in handlers {
            registry.register(handler)?;
        }
        Ok(registry)
    }

    /// Register a handler under its spec's name.
    ///
    /// Rejects empty names, names already registered, and signatures whose
    /// entity references do not point at required text parameters.
    pub fn register(&mut self, handler: impl OperationHandler + 'static) -> Result<(), RegistryError> {
        let name = handler.name().trim().to_string();
        if name.is_empty() {
            return Err(RegistryError::EmptyName);
        }
        if name != handler.name() {
            return Err(RegistryError::InvalidSpec {
                operation: handler.name().to_string(),
                reason: "name has surrounding whitespace".to_string(),
            });
        }
        if self.handlers.contains_key(&name) {
            return Err(RegistryError::Duplicate(name));
        }
        handler
            .spec()
            .self_check()
            .map_err(|reason| RegistryError::InvalidSpec {
                operation: name.clone(),
                reason,
            })?;
        self.handlers.insert(name, Box::new(handler));
        Ok(())
    }

    /// Look up a handler by name.
    pub fn get(&self, name: &str) -> Option<&dyn OperationHandler> {
        self.handlers.get(name).map(|b| b.as_ref())
    }

    /// Look up the signature of a registered operation.
    pub fn spec(&self, name: &str) -> Option<&OperationSpec> {
        self.get(name).map(|h| h.spec())
    }

    /// Registered names, sorted.
    pub fn list(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.handlers.keys().map(|s| s.as_str()).collect();
        names.sort_unstable();
        names
    }

    /// Registered signatures, sorted by name.
    pub fn specs(&self) -> Vec<&OperationSpec> {
        self.list()
            .into_iter()
            .filter_map(|name| self.spec(name))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

impl std::fmt::Debug for OperationRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OperationRegistry")
            .field("operations", &self.list())
            .finish()
    }
}
