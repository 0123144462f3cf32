//! Shared test utilities for roster integration tests.
//!
//! Provides an in-memory [`MockStore`] that records every call, a
//! [`ScriptedPlanner`] that returns canned output, and plan fixtures.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::{Value, json};

use roster_core::planner::Planner;
use roster_store::{Arguments, GraphStore, StoreError};

/// One recorded store call.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedCall {
    pub name: String,
    pub arguments: Arguments,
}

/// In-memory store that answers every query with
/// `{"ok": true, "query": <name>}` unless told to fail it.
#[derive(Debug, Default)]
pub struct MockStore {
    calls: Mutex<Vec<RecordedCall>>,
    failures: HashMap<String, String>,
}

impl MockStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reject every call to `name` with `message`.
    pub fn fail_on(mut self, name: &str, message: &str) -> Self {
        self.failures.insert(name.to_string(), message.to_string());
        self
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn call_names(&self) -> Vec<String> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .map(|c| c.name.clone())
            .collect()
    }
}

#[async_trait]
impl GraphStore for MockStore {
    async fn execute(&self, name: &str, arguments: &Arguments) -> Result<Value, StoreError> {
        self.calls.lock().unwrap().push(RecordedCall {
            name: name.to_string(),
            arguments: arguments.clone(),
        });
        match self.failures.get(name) {
            Some(message) => Err(StoreError::query(message.clone())),
            None => Ok(json!({ "ok": true, "query": name })),
        }
    }
}

/// Planner that returns a fixed answer and records the prompts it saw.
#[derive(Debug)]
pub struct ScriptedPlanner {
    reply: Result<String, String>,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedPlanner {
    /// Answer every call with `text`.
    pub fn replying(text: impl Into<String>) -> Self {
        Self {
            reply: Ok(text.into()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// Fail every call with `message`.
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            reply: Err(message.into()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }

    fn answer(&self, prompt: &str) -> anyhow::Result<String> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        match &self.reply {
            Ok(text) => Ok(text.clone()),
            Err(message) => Err(anyhow::anyhow!("{message}")),
        }
    }
}

#[async_trait]
impl Planner for ScriptedPlanner {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn propose(&self, prompt: &str) -> anyhow::Result<String> {
        self.answer(prompt)
    }

    async fn ask(&self, message: &str) -> anyhow::Result<String> {
        self.answer(message)
    }
}

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

/// Team Alpha: one manager (Bo), created then linked.
pub fn alpha_plan_json() -> Value {
    json!({
        "team_name": "Alpha",
        "team_text": "Platform team",
        "people": [
            { "name": "Bo", "tags": ["rust"], "text": "Staff engineer", "role": "manager" }
        ],
        "operations": [
            { "name": "createTeam", "arguments": { "name": "Alpha", "text": "Platform team" } },
            { "name": "createPerson", "arguments": { "name": "Bo", "tags": ["rust"], "text": "Staff engineer" } },
            { "name": "addTeamManager", "arguments": { "person_name": "Bo", "team_name": "Alpha" } }
        ]
    })
}

/// [`alpha_plan_json`] serialized, as a planner would return it.
pub fn alpha_plan_text() -> String {
    alpha_plan_json().to_string()
}

/// Team Beta: a manager and two members.
pub fn beta_plan_json() -> Value {
    json!({
        "team_name": "Beta",
        "team_text": "",
        "people": [
            { "name": "Cy", "tags": [], "text": "", "role": "manager" },
            { "name": "Di", "tags": ["go"], "text": "", "role": "member" },
            { "name": "Ed", "tags": ["sql", "go"], "text": "", "role": "member" }
        ],
        "operations": [
            { "name": "createTeam", "arguments": { "name": "Beta" } },
            { "name": "createPerson", "arguments": { "name": "Cy" } },
            { "name": "createPerson", "arguments": { "name": "Di", "tags": ["go"] } },
            { "name": "createPerson", "arguments": { "name": "Ed", "tags": ["sql", "go"] } },
            { "name": "addTeamManager", "arguments": { "person_name": "Cy", "team_name": "Beta" } },
            { "name": "addTeamMember", "arguments": { "person_name": "Di", "team_name": "Beta" } },
            { "name": "addTeamMember", "arguments": { "person_name": "Ed", "team_name": "Beta" } }
        ]
    })
}
