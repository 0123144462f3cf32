//! Team build service.
//!
//! Runs one request end to end: prompt the planner, decode and validate
//! its output, then execute the plan. Only a malformed plan (or a failed
//! planner call) rejects the request; operation failures come back as
//! data in the execution results.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use roster_store::GraphStore;

use super::format::Plan;
use super::generate::{PlanPromptContext, build_planner_prompt, operations_from_registry};
use super::parser::{MalformedPlan, ValidationMode, parse_plan, validate_plan};
use crate::executor::{ExecutionResult, PlanExecutor};
use crate::planner::Planner;
use crate::registry::OperationRegistry;

/// Caller input for a team build.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TeamRequest {
    pub team_name: String,
    pub manager_prompt: String,
    #[serde(default)]
    pub raw_candidate_text: String,
}

/// The plan that was run and one result per operation.
#[derive(Debug, Serialize)]
pub struct TeamBuildOutput {
    pub plan: Plan,
    pub execution_results: Vec<ExecutionResult>,
}

/// Request-level failures. Nothing has been executed when one of these is
/// returned.
#[derive(Debug, Error)]
pub enum TeamBuildError {
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("planner failed: {0:#}")]
    Planner(anyhow::Error),

    #[error("malformed plan: {error}")]
    Malformed {
        error: MalformedPlan,
        /// The undecoded planner output, for diagnosis.
        raw_output: String,
    },
}

/// Collaborators for running plans. All borrowed; the caller owns the
/// store client and planner lifecycles.
#[derive(Clone, Copy)]
pub struct TeamService<'a> {
    pub store: &'a dyn GraphStore,
    pub registry: &'a OperationRegistry,
    pub mode: ValidationMode,
}

impl<'a> TeamService<'a> {
    pub fn new(
        store: &'a dyn GraphStore,
        registry: &'a OperationRegistry,
        mode: ValidationMode,
    ) -> Self {
        Self {
            store,
            registry,
            mode,
        }
    }

    /// Build the planner prompt for a request.
    pub fn prompt_for(&self, request: &TeamRequest) -> String {
        build_planner_prompt(&PlanPromptContext {
            team_name: request.team_name.trim().to_string(),
            manager_prompt: request.manager_prompt.clone(),
            candidates: request.raw_candidate_text.clone(),
            operations: operations_from_registry(self.registry),
        })
    }

    /// Plan and execute a team build.
    pub async fn build_team(
        &self,
        planner: &dyn Planner,
        request: &TeamRequest,
    ) -> Result<TeamBuildOutput, TeamBuildError> {
        if request.team_name.trim().is_empty() {
            return Err(TeamBuildError::InvalidRequest(
                "team_name is required".to_string(),
            ));
        }
        if request.manager_prompt.trim().is_empty() {
            return Err(TeamBuildError::InvalidRequest(
                "manager_prompt is required".to_string(),
            ));
        }

        let request_id = Uuid::new_v4();
        tracing::info!(
            %request_id,
            team = %request.team_name,
            planner = planner.name(),
            "team build started"
        );

        let prompt = self.prompt_for(request);
        let raw_output = planner
            .propose(&prompt)
            .await
            .map_err(TeamBuildError::Planner)?;
        tracing::debug!(%request_id, output_len = raw_output.len(), "planner responded");

        let output = self.execute_text(&raw_output).await;
        match &output {
            Ok(out) => tracing::info!(
                %request_id,
                operations = out.execution_results.len(),
                "team build finished"
            ),
            Err(e) => tracing::warn!(%request_id, error = %e, "team build rejected"),
        }
        output
    }

    /// Decode, validate and execute plan text (planner output or a plan
    /// file).
    pub async fn execute_text(&self, raw_output: &str) -> Result<TeamBuildOutput, TeamBuildError> {
        let plan = parse_plan(raw_output, self.mode, self.registry).map_err(|error| {
            TeamBuildError::Malformed {
                error,
                raw_output: raw_output.to_string(),
            }
        })?;
        Ok(self.execute_plan(plan).await)
    }

    /// Validate and execute an already-decoded plan value.
    pub async fn execute_value(
        &self,
        value: &serde_json::Value,
    ) -> Result<TeamBuildOutput, TeamBuildError> {
        let plan = validate_plan(value, self.mode, self.registry).map_err(|error| {
            TeamBuildError::Malformed {
                error,
                raw_output: value.to_string(),
            }
        })?;
        Ok(self.execute_plan(plan).await)
    }

    /// Execute a validated plan.
    pub async fn execute_plan(&self, plan: Plan) -> TeamBuildOutput {
        let report = PlanExecutor::new(self.store, self.registry)
            .execute(&plan)
            .await;
        TeamBuildOutput {
            plan,
            execution_results: report.into_results(),
        }
    }
}
