//! Configuration file management for roster.
//!
//! Provides a TOML-based config file at `~/.config/roster/config.toml` and a
//! resolution chain: CLI flag > env var > config file > default.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};

use roster_core::plan::ValidationMode;
use roster_core::planner::PlannerConfig;
use roster_store::StoreConfig;

// -----------------------------------------------------------------------
// Config file types
// -----------------------------------------------------------------------

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct ConfigFile {
    #[serde(default)]
    pub store: StoreSection,
    #[serde(default)]
    pub planner: PlannerSection,
    #[serde(default)]
    pub validation: ValidationSection,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct StoreSection {
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
}

impl Default for StoreSection {
    fn default() -> Self {
        Self {
            url: StoreConfig::DEFAULT_URL.to_string(),
            timeout_secs: None,
        }
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct PlannerSection {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct ValidationSection {
    /// Enforce coverage and create-before-reference ordering.
    #[serde(default)]
    pub strict: bool,
}

// -----------------------------------------------------------------------
// Paths
// -----------------------------------------------------------------------

/// Return the roster config directory.
///
/// Always uses XDG layout: `$XDG_CONFIG_HOME/roster` or `~/.config/roster`,
/// ignoring the platform-specific `dirs::config_dir()`.
pub fn config_dir() -> PathBuf {
    if let Ok(xdg) = std::env::var("XDG_CONFIG_HOME") {
        return PathBuf::from(xdg).join("roster");
    }
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config")
        .join("roster")
}

/// Return the path to the roster config file.
pub fn config_path() -> PathBuf {
    config_dir().join("config.toml")
}

// -----------------------------------------------------------------------
// Read / write
// -----------------------------------------------------------------------

/// Load and parse the config file. Returns an error if it does not exist.
pub fn load_config() -> Result<ConfigFile> {
    let path = config_path();
    let contents = std::fs::read_to_string(&path)
        .with_context(|| format!("failed to read config file at {}", path.display()))?;
    let config: ConfigFile = toml::from_str(&contents).context("failed to parse config file")?;
    Ok(config)
}

/// Serialize and write the config file, creating parent dirs as needed.
/// Sets file permissions to 0600 on Unix, since it may hold an API key.
pub fn save_config(config: &ConfigFile) -> Result<()> {
    let path = config_path();
    let dir = config_dir();
    std::fs::create_dir_all(&dir)
        .with_context(|| format!("failed to create config directory {}", dir.display()))?;

    let contents = toml::to_string_pretty(config).context("failed to serialize config")?;
    std::fs::write(&path, &contents)
        .with_context(|| format!("failed to write config file at {}", path.display()))?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let perms = std::fs::Permissions::from_mode(0o600);
        std::fs::set_permissions(&path, perms)
            .with_context(|| format!("failed to set permissions on {}", path.display()))?;
    }

    Ok(())
}

// -----------------------------------------------------------------------
// Resolved config
// -----------------------------------------------------------------------

/// Fully resolved configuration, ready for use.
#[derive(Debug)]
pub struct RosterConfig {
    pub store: StoreConfig,
    /// `None` when no API key is configured; only commands that call the
    /// planner require it.
    pub planner: Option<PlannerConfig>,
    pub mode: ValidationMode,
}

impl RosterConfig {
    /// Resolve configuration using the chain: CLI flag > env var > config file > default.
    ///
    /// - Store URL: `cli_store_url` > `ROSTER_STORE_URL` > `HELIX_API_ENDPOINT` > `store.url` > `StoreConfig::DEFAULT_URL`
    /// - Store timeout: `ROSTER_STORE_TIMEOUT_SECS` > `store.timeout_secs` > 30 s
    /// - Planner key: `OPENAI_API_KEY` > `planner.api_key` > none
    /// - Strict validation: `--strict` > `ROSTER_STRICT` > `validation.strict` > lenient
    pub fn resolve(cli_store_url: Option<&str>, cli_strict: bool) -> Result<Self> {
        let file_config = load_config().ok();

        let store_url = if let Some(url) = cli_store_url {
            url.to_string()
        } else if let Ok(url) = std::env::var("ROSTER_STORE_URL") {
            url
        } else if let Ok(url) = std::env::var("HELIX_API_ENDPOINT") {
            url
        } else if let Some(ref cfg) = file_config {
            cfg.store.url.clone()
        } else {
            StoreConfig::DEFAULT_URL.to_string()
        };

        let timeout_secs = if let Ok(raw) = std::env::var("ROSTER_STORE_TIMEOUT_SECS") {
            raw.parse::<u64>()
                .context("ROSTER_STORE_TIMEOUT_SECS must be a whole number of seconds")?
        } else {
            file_config
                .as_ref()
                .and_then(|cfg| cfg.store.timeout_secs)
                .unwrap_or(StoreConfig::DEFAULT_TIMEOUT_SECS)
        };
        let store = StoreConfig::new(store_url).with_timeout(Duration::from_secs(timeout_secs));

        let planner_section = file_config.as_ref().map(|cfg| &cfg.planner);
        let api_key = std::env::var("OPENAI_API_KEY")
            .ok()
            .or_else(|| planner_section.and_then(|p| p.api_key.clone()))
            .filter(|k| !k.trim().is_empty());
        let planner = api_key.map(|key| {
            let mut config = PlannerConfig::new(key);
            if let Some(model) = std::env::var("OPENAI_MODEL")
                .ok()
                .or_else(|| planner_section.and_then(|p| p.model.clone()))
            {
                config.model = model;
            }
            if let Some(base_url) = std::env::var("OPENAI_BASE_URL")
                .ok()
                .or_else(|| planner_section.and_then(|p| p.base_url.clone()))
            {
                config.base_url = base_url;
            }
            config
        });

        let strict = cli_strict
            || env_flag("ROSTER_STRICT")
            || file_config.as_ref().is_some_and(|cfg| cfg.validation.strict);

        Ok(Self {
            store,
            planner,
            mode: ValidationMode::from_strict(strict),
        })
    }

    /// The planner config, or an error telling the operator how to set one.
    pub fn require_planner(&self) -> Result<PlannerConfig> {
        match &self.planner {
            Some(cfg) => Ok(cfg.clone()),
            None => bail!(
                "planner API key not found; set OPENAI_API_KEY or run `roster init --api-key <key>`"
            ),
        }
    }
}

fn env_flag(name: &str) -> bool {
    std::env::var(name)
        .map(|v| matches!(v.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
        .unwrap_or(false)
}

// -----------------------------------------------------------------------
// Tests
// -----------------------------------------------------------------------
