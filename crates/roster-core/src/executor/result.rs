//! Per-operation result records.

use chrono::{DateTime, Utc};
use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};
use thiserror::Error;

use roster_store::{Arguments, StoreError};

use super::state::OperationState;
use crate::registry::ArgumentError;

/// Why a single operation failed. Recorded in the result, never raised
/// past the executor.
#[derive(Debug, Error)]
pub enum OperationError {
    /// The operation has no name; the store was not contacted.
    #[error("missing operation name")]
    MissingName,

    /// No handler is registered under this name; the store was not contacted.
    #[error("unknown operation {0:?}")]
    UnknownOperation(String),

    /// The handler rejected the arguments; the store was not contacted.
    #[error("invalid arguments: {0}")]
    InvalidArguments(#[from] ArgumentError),

    /// The store rejected or failed the call.
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl OperationError {
    /// Stable machine-readable kind.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::MissingName => "dispatch",
            Self::UnknownOperation(_) => "unknown_operation",
            Self::InvalidArguments(_) => "invalid_arguments",
            Self::Store(_) => "store",
        }
    }

    /// Whether the store was called for this operation.
    pub fn reached_store(&self) -> bool {
        matches!(self, Self::Store(_))
    }
}

/// Terminal outcome of one operation.
#[derive(Debug)]
pub enum Outcome {
    /// The store accepted the call; holds its raw response.
    Succeeded(serde_json::Value),
    Failed(OperationError),
}

impl Outcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Succeeded(_))
    }

    pub fn state(&self) -> OperationState {
        match self {
            Self::Succeeded(_) => OperationState::Succeeded,
            Self::Failed(_) => OperationState::Failed,
        }
    }

    pub fn error(&self) -> Option<&OperationError> {
        match self {
            Self::Succeeded(_) => None,
            Self::Failed(e) => Some(e),
        }
    }
}

/// Serialized as `{"status": "succeeded", "response": ...}` or
/// `{"status": "failed", "kind": ..., "error": "..."}`.
impl Serialize for Outcome {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Succeeded(response) => {
                let mut s = serializer.serialize_struct("Outcome", 2)?;
                s.serialize_field("status", "succeeded")?;
                s.serialize_field("response", response)?;
                s.end()
            }
            Self::Failed(error) => {
                let mut s = serializer.serialize_struct("Outcome", 3)?;
                s.serialize_field("status", "failed")?;
                s.serialize_field("kind", error.kind())?;
                s.serialize_field("error", &error.to_string())?;
                s.end()
            }
        }
    }
}

/// Result of one operation, echoing what was attempted.
#[derive(Debug, Serialize)]
pub struct ExecutionResult {
    /// `None` when the operation had no name.
    pub operation_name: Option<String>,
    pub arguments: Arguments,
    pub outcome: Outcome,
}

impl ExecutionResult {
    pub fn is_success(&self) -> bool {
        self.outcome.is_success()
    }
}

/// All results of one plan run, in operation order.
#[derive(Debug, Serialize)]
pub struct ExecutionReport {
    pub results: Vec<ExecutionResult>,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl ExecutionReport {
    pub fn succeeded(&self) -> usize {
        self.results.iter().filter(|r| r.is_success()).count()
    }

    pub fn failed(&self) -> usize {
        self.results.len() - self.succeeded()
    }

    pub fn is_complete_success(&self) -> bool {
        self.failed() == 0
    }

    pub fn into_results(self) -> Vec<ExecutionResult> {
        self.results
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn success_serializes_response() {
        let result = ExecutionResult {
            operation_name: Some("createTeam".into()),
            arguments: Arguments::new(),
            outcome: Outcome::Succeeded(json!({ "id": 1 })),
        };
        let value = serde_json::to_value(&result).unwrap();
        assert_eq!(
            value,
            json!({
                "operation_name": "createTeam",
                "arguments": {},
                "outcome": { "status": "succeeded", "response": { "id": 1 } }
            })
        );
    }

    #[test]
    fn failure_serializes_kind_and_message() {
        let result = ExecutionResult {
            operation_name: None,
            arguments: Arguments::new(),
            outcome: Outcome::Failed(OperationError::MissingName),
        };
        let value = serde_json::to_value(&result).unwrap();
        assert_eq!(value["operation_name"], serde_json::Value::Null);
        assert_eq!(value["outcome"]["status"], "failed");
        assert_eq!(value["outcome"]["kind"], "dispatch");
        assert_eq!(value["outcome"]["error"], "missing operation name");
    }

    #[test]
    fn store_error_message_passes_through() {
        let err = OperationError::from(StoreError::query("duplicate name"));
        assert_eq!(err.to_string(), "duplicate name");
        assert_eq!(err.kind(), "store");
        assert!(err.reached_store());
        assert!(!OperationError::MissingName.reached_store());
    }

    #[test]
    fn report_counts_outcomes() {
        let now = Utc::now();
        let report = ExecutionReport {
            results: vec![
                ExecutionResult {
                    operation_name: Some("a".into()),
                    arguments: Arguments::new(),
                    outcome: Outcome::Succeeded(json!(null)),
                },
                ExecutionResult {
                    operation_name: Some("b".into()),
                    arguments: Arguments::new(),
                    outcome: Outcome::Failed(OperationError::UnknownOperation("b".into())),
                },
            ],
            started_at: now,
            finished_at: now,
        };
        assert_eq!(report.succeeded(), 1);
        assert_eq!(report.failed(), 1);
        assert!(!report.is_complete_success());
        assert_eq!(report.results[1].outcome.state(), OperationState::Failed);
    }
}
