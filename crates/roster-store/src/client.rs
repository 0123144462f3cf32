//! The `GraphStore` trait and its HelixDB HTTP client.
//!
//! HelixDB exposes every compiled query as `POST /{query_name}` taking a
//! JSON object of named parameters and returning a JSON body.

use anyhow::{Context, Result};
use async_trait::async_trait;
use tracing::{debug, info};

use crate::config::StoreConfig;
use crate::error::StoreError;
use crate::models::Arguments;

/// Query-by-name interface to the property-graph store.
///
/// Implementations must bound the latency of `execute`; callers await each
/// call before issuing the next and apply no timeout of their own.
#[async_trait]
pub trait GraphStore: Send + Sync {
    /// Run the named query with the given arguments and return the raw
    /// store response.
    async fn execute(
        &self,
        name: &str,
        arguments: &Arguments,
    ) -> Result<serde_json::Value, StoreError>;
}

// Compile-time assertion: GraphStore must be usable as `dyn GraphStore`.
const _: () = {
    fn _assert_object_safe(_: &dyn GraphStore) {}
};

/// HTTP client for a HelixDB instance.
///
/// Construct once at startup with [`HelixClient::connect`], share by
/// reference, and call [`HelixClient::close`] at shutdown.
#[derive(Debug, Clone)]
pub struct HelixClient {
    http: reqwest::Client,
    config: StoreConfig,
}

impl HelixClient {
    /// Build a client for the configured endpoint.
    ///
    /// No request is made here; HelixDB has no handshake, so the first
    /// query is the first contact with the store.
    pub fn connect(config: &StoreConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .connect_timeout(config.timeout)
            .build()
            .with_context(|| format!("failed to build store client for {}", config.endpoint))?;
        info!(endpoint = %config.endpoint, timeout = ?config.timeout, "store client opened");
        Ok(Self {
            http,
            config: config.clone(),
        })
    }

    /// The endpoint this client talks to.
    pub fn endpoint(&self) -> &str {
        &self.config.endpoint
    }

    /// End the client's lifecycle. Pooled connections are dropped.
    pub fn close(self) {
        info!(endpoint = %self.config.endpoint, "store client closed");
    }

    fn map_transport_error(&self, err: reqwest::Error) -> StoreError {
        if err.is_timeout() {
            StoreError::Timeout(self.config.timeout)
        } else {
            StoreError::Connection(err.to_string())
        }
    }
}

#[async_trait]
impl GraphStore for HelixClient {
    async fn execute(
        &self,
        name: &str,
        arguments: &Arguments,
    ) -> Result<serde_json::Value, StoreError> {
        let url = self.config.query_url(name);
        debug!(query = name, %url, "sending store query");

        let response = self
            .http
            .post(&url)
            .json(arguments)
            .send()
            .await
            .map_err(|e| self.map_transport_error(e))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| self.map_transport_error(e))?;

        if !status.is_success() {
            let message = if body.trim().is_empty() {
                status
                    .canonical_reason()
                    .unwrap_or("query rejected")
                    .to_string()
            } else {
                body.trim().to_string()
            };
            return Err(StoreError::Rejected {
                status: status.as_u16(),
                message,
            });
        }

        if body.trim().is_empty() {
            return Ok(serde_json::Value::Null);
        }
        serde_json::from_str(&body).map_err(|e| StoreError::Decode(e.to_string()))
    }
}
