//! Layered service configuration.
//!
//! Sources, later ones winning: built-in defaults, an optional TOML file, then
//! `CONDUCTOR_*` environment variables with `__` between nested keys
//! (`CONDUCTOR_SERVER__PORT=9000`).

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use clap::ValueEnum;
use conductor_orchestrator::{AgentKind, OrchestratorConfig, RequestLimits};
use conductor_providers::ModelType;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// File name looked up in the working directory when no `--config` is given.
pub const DEFAULT_CONFIG_FILE: &str = "conductor.toml";

const ENV_PREFIX: &str = "CONDUCTOR";

/// Configuration errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// A source could not be read or did not match the schema.
    #[error("Failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),

    /// The configuration loaded but holds an unusable value.
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// HTTP listener and upload limits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    /// Directory served at `/` when set.
    pub static_dir: Option<PathBuf>,
    /// Largest accepted request body, which bounds each file too.
    pub max_upload_bytes: usize,
    pub max_files: usize,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            static_dir: None,
            max_upload_bytes: 25 * 1024 * 1024,
            max_files: 10,
        }
    }
}

/// Language model selection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelSettings {
    /// `mock` or `openai`.
    pub provider: String,
    pub model_id: String,
    /// Falls back to `OPENAI_API_KEY` when unset.
    pub api_key: Option<String>,
    pub base_url: Option<String>,
}

impl Default for ModelSettings {
    fn default() -> Self {
        Self { provider: "mock".to_string(), model_id: "mock-model".to_string(), api_key: None, base_url: None }
    }
}

/// Web search backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchSettings {
    /// SearXNG base URL. The offline provider is used when unset.
    pub searxng_url: Option<String>,
    pub max_results: usize,
    pub timeout_secs: u64,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self { searxng_url: None, max_results: 5, timeout_secs: 10 }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    pub format: LogFormat,
}

/// The complete service configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub server: ServerSettings,
    pub orchestrator: OrchestratorConfig,
    pub model: ModelSettings,
    pub search: SearchSettings,
    pub logging: LoggingSettings,
}

impl Settings {
    /// Loads configuration from `path` (if any) and the process environment.
    ///
    /// Without an explicit path, `conductor.toml` is read when it exists.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        Self::load_with_env(path, None)
    }

    /// Like [`Settings::load`], reading variables from `env` instead of the
    /// process environment when given.
    pub fn load_with_env(path: Option<&Path>, env: Option<HashMap<String, String>>) -> Result<Self, ConfigError> {
        let mut builder = config::Config::builder();

        match path {
            Some(path) => {
                builder = builder.add_source(config::File::from(path).format(config::FileFormat::Toml).required(true));
            }
            None => {
                builder = builder.add_source(
                    config::File::with_name(DEFAULT_CONFIG_FILE).format(config::FileFormat::Toml).required(false),
                );
            }
        }

        builder = builder.add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true)
                .source(env),
        );

        let settings: Self = builder.build()?.try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }

    /// Rejects values the service cannot start with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.host.trim().is_empty() {
            return Err(ConfigError::Invalid("server.host must not be empty".to_string()));
        }
        if self.server.max_upload_bytes == 0 {
            return Err(ConfigError::Invalid("server.max_upload_bytes must be positive".to_string()));
        }
        if ModelType::from_str(&self.model.provider).is_err() {
            return Err(ConfigError::Invalid(format!(
                "model.provider '{}' is not supported (expected mock or openai)",
                self.model.provider
            )));
        }
        if self.orchestrator.agent_timeout_secs == 0 || self.orchestrator.request_deadline_secs == 0 {
            return Err(ConfigError::Invalid("orchestrator timeouts must be positive".to_string()));
        }
        if self.search.timeout_secs == 0 {
            return Err(ConfigError::Invalid("search.timeout_secs must be positive".to_string()));
        }
        if let Some(unknown) = self.orchestrator.agents.keys().find(|id| id.parse::<AgentKind>().is_err()) {
            return Err(ConfigError::Invalid(format!("orchestrator.agents.{unknown} is not a known agent")));
        }
        Ok(())
    }

    /// Address the listener binds to.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    /// Attachment limits handed to the orchestrator.
    pub const fn request_limits(&self) -> RequestLimits {
        RequestLimits { max_attachments: self.server.max_files, max_attachment_bytes: self.server.max_upload_bytes }
    }

    /// A copy safe to print, with secrets masked.
    #[must_use]
    pub fn redacted(&self) -> Self {
        let mut copy = self.clone();
        if copy.model.api_key.is_some() {
            copy.model.api_key = Some("********".to_string());
        }
        copy
    }
}
