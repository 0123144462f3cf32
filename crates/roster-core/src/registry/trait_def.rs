//! The `OperationHandler` trait -- a typed handler for one named graph
//! mutation.
//!
//! The trait is object-safe so handlers can be stored as
//! `Box<dyn OperationHandler>` in the [`super::OperationRegistry`].

use async_trait::async_trait;

use roster_store::{Arguments, GraphStore, StoreError};

use super::spec::{ArgumentError, OperationSpec};

/// Handler for a registered operation.
#[async_trait]
pub trait OperationHandler: Send + Sync {
    /// Signature of the operation this handler serves.
    fn spec(&self) -> &OperationSpec;

    /// Registered name (the signature's name).
    fn name(&self) -> &str {
        &self.spec().name
    }

    /// Validate arguments before anything is sent to the store.
    fn check(&self, arguments: &Arguments) -> Result<(), ArgumentError> {
        self.spec().check(arguments)
    }

    /// Apply the operation against the store.
    ///
    /// Called only after [`Self::check`] has accepted `arguments`.
    async fn apply(
        &self,
        store: &dyn GraphStore,
        arguments: &Arguments,
    ) -> Result<serde_json::Value, StoreError>;
}

const _: () = {
    fn _assert_object_safe(_: &dyn OperationHandler) {}
};

/// Handler that forwards the call to the store query of the same name.
#[derive(Debug, Clone)]
pub struct StoreQuery {
    spec: OperationSpec,
}

impl StoreQuery {
    pub fn new(spec: OperationSpec) -> Self {
        Self { spec }
    }
}

#[async_trait]
impl OperationHandler for StoreQuery {
    fn spec(&self) -> &OperationSpec {
        &self.spec
    }

    async fn apply(
        &self,
        store: &dyn GraphStore,
        arguments: &Arguments,
    ) -> Result<serde_json::Value, StoreError> {
        store.execute(&self.spec.name, arguments).await
    }
}
