//! The `Planner` trait -- the adapter interface for plan-producing models.
//!
//! The trait is object-safe so the service and HTTP layers can hold a
//! `&dyn Planner` / `Arc<dyn Planner>` without knowing the backend.

use anyhow::Result;
use async_trait::async_trait;

/// Turns a prompt into plan text.
///
/// The returned text is expected to contain a JSON plan but is not trusted:
/// callers decode and validate it.
#[async_trait]
pub trait Planner: Send + Sync {
    /// Human-readable backend name (e.g. "openai").
    fn name(&self) -> &str;

    /// Produce plan text for the prompt.
    async fn propose(&self, prompt: &str) -> Result<String>;

    /// Free-form single-turn question, answered in plain text.
    async fn ask(&self, message: &str) -> Result<String>;
}

const _: () = {
    fn _assert_object_safe(_: &dyn Planner) {}
};
