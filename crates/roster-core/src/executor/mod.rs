//! Plan executor: runs a validated plan's operations against the store,
//! one at a time and in order, recording a result for every operation.
//!
//! Operations name the entities they link rather than carrying store IDs,
//! so operation N must be applied before N+1 is sent. There is no
//! concurrent dispatch path and no transaction around the plan; a failed
//! operation is recorded and the run continues.

pub mod result;
pub mod state;

use chrono::Utc;

use roster_store::GraphStore;

use crate::plan::{Operation, Plan};
use crate::registry::OperationRegistry;

pub use result::{ExecutionReport, ExecutionResult, OperationError, Outcome};
pub use state::OperationState;

use state::OperationRun;

/// Executes plans against a store through a registry of handlers.
///
/// Borrows the store client; the caller owns its lifecycle.
pub struct PlanExecutor<'a> {
    store: &'a dyn GraphStore,
    registry: &'a OperationRegistry,
}

impl<'a> PlanExecutor<'a> {
    pub fn new(store: &'a dyn GraphStore, registry: &'a OperationRegistry) -> Self {
        Self { store, registry }
    }

    /// Run every operation of `plan` in order.
    ///
    /// Always returns one result per operation. Repeating a call repeats
    /// every store mutation; nothing is deduplicated.
    pub async fn execute(&self, plan: &Plan) -> ExecutionReport {
        let started_at = Utc::now();
        let mut results = Vec::with_capacity(plan.operations.len());

        for (index, op) in plan.operations.iter().enumerate() {
            let result = self.execute_operation(index, op).await;
            results.push(result);
        }

        let report = ExecutionReport {
            results,
            started_at,
            finished_at: Utc::now(),
        };
        tracing::info!(
            team = %plan.team_name,
            operations = plan.operations.len(),
            succeeded = report.succeeded(),
            failed = report.failed(),
            "plan executed"
        );
        report
    }

    /// Run a single operation and record its outcome.
    pub async fn execute_operation(&self, index: usize, op: &Operation) -> ExecutionResult {
        let mut run = OperationRun::new(index);
        let outcome = match self.dispatch(&mut run, op).await {
            Ok(response) => {
                run.advance(OperationState::Succeeded);
                tracing::info!(index, operation = ?op.name(), "operation succeeded");
                Outcome::Succeeded(response)
            }
            Err(error) => {
                run.advance(OperationState::Failed);
                tracing::warn!(
                    index,
                    operation = ?op.name(),
                    kind = error.kind(),
                    error = %error,
                    "operation failed"
                );
                Outcome::Failed(error)
            }
        };
        debug_assert!(run.state().is_terminal());

        ExecutionResult {
            operation_name: op.name().map(str::to_string),
            arguments: op.arguments.clone(),
            outcome,
        }
    }

    async fn dispatch(
        &self,
        run: &mut OperationRun,
        op: &Operation,
    ) -> Result<serde_json::Value, OperationError> {
        let name = op.name().ok_or(OperationError::MissingName)?;
        let handler = self
            .registry
            .get(name)
            .ok_or_else(|| OperationError::UnknownOperation(name.to_string()))?;
        handler.check(&op.arguments)?;

        run.advance(OperationState::Dispatched);
        Ok(handler.apply(self.store, &op.arguments).await?)
    }
}
