//! OpenAI chat-completions planner.

use std::time::Duration;

use anyhow::{Context, Result, anyhow, bail};
use async_trait::async_trait;
use serde::Deserialize;

use super::trait_def::Planner;

/// Connection settings for [`OpenAiPlanner`].
#[derive(Debug, Clone)]
pub struct PlannerConfig {
    pub api_key: String,
    pub model: String,
    /// API root, e.g. `https://api.openai.com/v1`.
    pub base_url: String,
    pub timeout: Duration,
}

impl PlannerConfig {
    pub const DEFAULT_MODEL: &str = "gpt-4o-mini";
    pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
    pub const DEFAULT_TIMEOUT_SECS: u64 = 120;

    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: Self::DEFAULT_MODEL.to_string(),
            base_url: Self::DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(Self::DEFAULT_TIMEOUT_SECS),
        }
    }

    fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.base_url.trim_end_matches('/'))
    }
}

const PLAN_INSTRUCTIONS: &str = "You are a team planner for a graph database. \
     Answer with a single JSON object that follows the schema in the prompt.";

const ASSISTANT_INSTRUCTIONS: &str = "You are a helpful assistant for a HelixDB-powered app. \
     Reply concisely and explain what you are doing when asked.";

/// Planner backed by the OpenAI chat-completions API.
#[derive(Clone)]
pub struct OpenAiPlanner {
    http: reqwest::Client,
    config: PlannerConfig,
}

impl OpenAiPlanner {
    pub fn new(config: PlannerConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .context("failed to build planner HTTP client")?;
        Ok(Self { http, config })
    }

    pub fn model(&self) -> &str {
        &self.config.model
    }

    async fn complete(&self, system: &str, user: &str, json_mode: bool) -> Result<String> {
        let mut body = serde_json::json!({
            "model": &self.config.model,
            "messages": [
                { "role": "system", "content": system },
                { "role": "user", "content": user }
            ],
            "temperature": 0.1
        });
        if json_mode {
            body["response_format"] = serde_json::json!({ "type": "json_object" });
        }

        let response = self
            .http
            .post(self.config.completions_url())
            .bearer_auth(&self.config.api_key)
            .json(&body)
            .send()
            .await
            .context("planner request failed")?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            bail!("planner API error {status}: {text}");
        }

        #[derive(Deserialize)]
        struct Message {
            content: Option<String>,
        }
        #[derive(Deserialize)]
        struct Choice {
            message: Message,
        }
        #[derive(Deserialize)]
        struct ApiResponse {
            choices: Vec<Choice>,
        }

        let parsed: ApiResponse = response
            .json()
            .await
            .context("planner returned an unreadable response")?;
        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| anyhow!("planner returned no content"))
    }
}

impl std::fmt::Debug for OpenAiPlanner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiPlanner")
            .field("model", &self.config.model)
            .field("base_url", &self.config.base_url)
            .finish()
    }
}

#[async_trait]
impl Planner for OpenAiPlanner {
    fn name(&self) -> &str {
        "openai"
    }

    async fn propose(&self, prompt: &str) -> Result<String> {
        tracing::debug!(model = %self.config.model, prompt_len = prompt.len(), "requesting plan");
        self.complete(PLAN_INSTRUCTIONS, prompt, true).await
    }

    async fn ask(&self, message: &str) -> Result<String> {
        self.complete(ASSISTANT_INSTRUCTIONS, message, false).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_defaults() {
        let cfg = PlannerConfig::new("sk-test");
        assert_eq!(cfg.model, "gpt-4o-mini");
        assert_eq!(
            cfg.completions_url(),
            "https://api.openai.com/v1/chat/completions"
        );
    }

    #[test]
    fn completions_url_tolerates_trailing_slash() {
        let cfg = PlannerConfig {
            base_url: "http://localhost:8080/v1/".to_string(),
            ..PlannerConfig::new("k")
        };
        assert_eq!(cfg.completions_url(), "http://localhost:8080/v1/chat/completions");
    }

    #[test]
    fn debug_hides_api_key() {
        let planner = OpenAiPlanner::new(PlannerConfig::new("sk-secret")).unwrap();
        let debug = format!("{planner:?}");
        assert!(!debug.contains("sk-secret"));
        assert!(debug.contains("gpt-4o-mini"));
    }
}
