use std::time::Duration;

/// Graph store configuration.
///
/// Built from an explicit endpoint; the CLI resolves it from flags, the
/// environment and the config file.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Base URL of the store's query API (no trailing slash).
    pub endpoint: String,
    /// Upper bound on a single query call, including connect time.
    pub timeout: Duration,
}

impl StoreConfig {
    /// Local HelixDB endpoint used when nothing else is configured.
    pub const DEFAULT_URL: &str = "http://localhost:6969";

    /// Default per-query timeout in seconds.
    pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

    /// Build a config for `endpoint` with the default timeout.
    pub fn new(endpoint: impl Into<String>) -> Self {
        let endpoint: String = endpoint.into();
        Self {
            endpoint: endpoint.trim_end_matches('/').to_owned(),
            timeout: Duration::from_secs(Self::DEFAULT_TIMEOUT_SECS),
        }
    }

    /// Replace the per-query timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// URL of the named query endpoint.
    pub fn query_url(&self, query_name: &str) -> String {
        format!("{}/{}", self.endpoint, query_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_url() {
        let cfg = StoreConfig::new(StoreConfig::DEFAULT_URL);
        assert_eq!(cfg.endpoint, "http://localhost:6969");
        assert_eq!(cfg.timeout, Duration::from_secs(30));
    }

    #[test]
    fn trailing_slash_is_trimmed() {
        let cfg = StoreConfig::new("http://helix.internal:6969/");
        assert_eq!(cfg.endpoint, "http://helix.internal:6969");
    }

    #[test]
    fn query_url_appends_name() {
        let cfg = StoreConfig::new("http://localhost:6969");
        assert_eq!(cfg.query_url("createTeam"), "http://localhost:6969/createTeam");
    }

    #[test]
    fn with_timeout_overrides_default() {
        let cfg = StoreConfig::new("http://x").with_timeout(Duration::from_millis(250));
        assert_eq!(cfg.timeout, Duration::from_millis(250));
    }
}
