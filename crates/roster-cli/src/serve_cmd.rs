use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::{Value, json};
use tower_http::cors::CorsLayer;

use roster_core::plan::{TeamBuildError, TeamRequest, TeamService, ValidationMode, validate_plan};
use roster_core::planner::Planner;
use roster_core::registry::OperationRegistry;
use roster_store::GraphStore;

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

pub struct AppError {
    status: StatusCode,
    message: String,
    raw_output: Option<String>,
}

impl AppError {
    fn new(status: StatusCode, msg: impl Into<String>) -> Self {
        Self {
            status,
            message: msg.into(),
            raw_output: None,
        }
    }

    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, msg)
    }

    pub fn unprocessable(msg: impl Into<String>, raw_output: Option<String>) -> Self {
        Self {
            raw_output,
            ..Self::new(StatusCode::UNPROCESSABLE_ENTITY, msg)
        }
    }

    pub fn bad_gateway(err: anyhow::Error) -> Self {
        Self::new(StatusCode::BAD_GATEWAY, format!("{err:#}"))
    }

    pub fn planner_unavailable() -> Self {
        Self::new(
            StatusCode::SERVICE_UNAVAILABLE,
            "planner is not configured (set OPENAI_API_KEY)",
        )
    }
}

impl From<TeamBuildError> for AppError {
    fn from(err: TeamBuildError) -> Self {
        match err {
            TeamBuildError::InvalidRequest(msg) => Self::bad_request(msg),
            TeamBuildError::Planner(e) => Self::bad_gateway(e),
            TeamBuildError::Malformed { error, raw_output } => {
                Self::unprocessable(error.to_string(), Some(raw_output))
            }
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        Self::bad_request(rejection.body_text())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let body = match self.raw_output {
            Some(raw) => json!({ "error": self.message, "raw_output": raw }),
            None => json!({ "error": self.message }),
        };
        (self.status, Json(body)).into_response()
    }
}

// ---------------------------------------------------------------------------
// State
// ---------------------------------------------------------------------------

/// Shared handler state. The store client is owned by the caller of
/// [`run_serve`], which closes it after shutdown.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn GraphStore>,
    pub store_endpoint: String,
    pub planner: Option<Arc<dyn Planner>>,
    pub registry: Arc<OperationRegistry>,
    pub mode: ValidationMode,
}

impl AppState {
    fn service(&self, strict: Option<bool>) -> TeamService<'_> {
        let mode = strict.map(ValidationMode::from_strict).unwrap_or(self.mode);
        TeamService::new(self.store.as_ref(), &self.registry, mode)
    }

    fn planner(&self) -> Result<&dyn Planner, AppError> {
        self.planner
            .as_deref()
            .ok_or_else(AppError::planner_unavailable)
    }
}

// ---------------------------------------------------------------------------
// Request types
// ---------------------------------------------------------------------------

/// `?strict=true|false` overrides the server's validation mode per request.
#[derive(Debug, Default, Deserialize)]
pub struct ModeQuery {
    pub strict: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub struct AgentRequest {
    #[serde(default)]
    pub message: String,
}

// ---------------------------------------------------------------------------
// Router
// ---------------------------------------------------------------------------

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/api/health", get(health))
        .route("/api/operations", get(list_operations))
        .route("/api/teams", post(build_team))
        .route("/api/plans/validate", post(validate_plan_handler))
        .route("/api/plans/execute", post(execute_plan_handler))
        .route("/api/agent", post(agent))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

pub async fn run_serve(state: AppState, bind: &str, port: u16) -> Result<()> {
    let app = build_router(state);
    let addr: SocketAddr = format!("{bind}:{port}").parse()?;
    tracing::info!("roster serve listening on http://{addr}");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    tracing::info!("roster serve shut down");
    Ok(())
}

async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("failed to install Ctrl+C handler");
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

async fn index(State(state): State<AppState>) -> Html<String> {
    let rows = state
        .registry
        .specs()
        .iter()
        .map(|spec| {
            format!(
                "<tr><td>{name}</td><td>{desc}</td></tr>",
                name = spec.name,
                desc = spec.description,
            )
        })
        .collect::<Vec<_>>()
        .join("\n");

    Html(format!(
        "<!DOCTYPE html>\
<html><head><title>roster</title></head><body>\
<h1>roster</h1>\
<p><a href=\"/api/health\">/api/health</a> | <a href=\"/api/operations\">/api/operations</a></p>\
<p>POST a team request to <code>/api/teams</code>: \
<code>{{\"team_name\", \"manager_prompt\", \"raw_candidate_text\"}}</code></p>\
<table><tr><th>Operation</th><th>Description</th></tr>{rows}</table>\
</body></html>"
    ))
}

async fn health(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "store": state.store_endpoint,
        "planner": state.planner.is_some(),
    }))
}

async fn list_operations(State(state): State<AppState>) -> axum::response::Response {
    Json(state.registry.specs()).into_response()
}

async fn build_team(
    State(state): State<AppState>,
    Query(query): Query<ModeQuery>,
    payload: Result<Json<TeamRequest>, JsonRejection>,
) -> Result<axum::response::Response, AppError> {
    let Json(request) = payload?;
    let planner = state.planner()?;
    let output = state
        .service(query.strict)
        .build_team(planner, &request)
        .await?;
    Ok(Json(output).into_response())
}

async fn validate_plan_handler(
    State(state): State<AppState>,
    Query(query): Query<ModeQuery>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<axum::response::Response, AppError> {
    let Json(value) = payload?;
    let service = state.service(query.strict);
    let plan = validate_plan(&value, service.mode, service.registry)
        .map_err(|e| AppError::unprocessable(e.to_string(), None))?;
    Ok(Json(plan).into_response())
}

async fn execute_plan_handler(
    State(state): State<AppState>,
    Query(query): Query<ModeQuery>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<axum::response::Response, AppError> {
    let Json(value) = payload?;
    let output = state.service(query.strict).execute_value(&value).await?;
    Ok(Json(output).into_response())
}

async fn agent(
    State(state): State<AppState>,
    payload: Result<Json<AgentRequest>, JsonRejection>,
) -> Result<axum::response::Response, AppError> {
    let Json(request) = payload?;
    if request.message.trim().is_empty() {
        return Err(AppError::bad_request("message is required"));
    }
    let answer = state
        .planner()?
        .ask(&request.message)
        .await
        .map_err(AppError::bad_gateway)?;
    Ok(Json(json!({ "answer": answer })).into_response())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
