//! Application configuration.
//!
//! Aggregates configuration into a single Config struct that can be loaded
//! from YAML files or environment variables.

mod orchestrator;

pub use orchestrator::{
    OrchestratorConfig, ServiceAccounts, DEFAULT_ATTACHED_BUDGET, DEFAULT_CALL_FEE,
    DEFAULT_COUNTER_SERVICE, DEFAULT_GUESTBOOK_SERVICE, DEFAULT_HELLO_SERVICE, DEFAULT_SELF_ID,
};

/// Default configuration file name.
pub const DEFAULT_CONFIG_FILE: &str = "crosscall.yaml";
/// Environment variable for configuration file path.
pub const CONFIG_ENV_VAR: &str = "CROSSCALL_CONFIG";
/// Prefix for configuration environment variables.
pub const CONFIG_ENV_PREFIX: &str = "CROSSCALL";
/// Environment variable for logging configuration.
pub const LOG_ENV_VAR: &str = "CROSSCALL_LOG";

use serde::Deserialize;

/// Main application configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Local orchestrator settings.
    pub orchestrator: OrchestratorConfig,
    /// Remote service addresses.
    pub services: ServiceAccounts,
}

impl Config {
    /// Load configuration from file and environment.
    ///
    /// Configuration sources (in order of priority, later overrides earlier):
    /// 1. `crosscall.yaml` in current directory (if exists)
    /// 2. File specified by `path` argument (if provided)
    /// 3. File specified by `CONFIG_ENV_VAR` environment variable (if set)
    /// 4. Environment variables with `CONFIG_ENV_PREFIX` prefix
    pub fn load(path: Option<&str>) -> Result<Self, ::config::ConfigError> {
        use ::config::{Config as ConfigLib, Environment, File, FileFormat};

        let mut builder = ConfigLib::builder()
            .add_source(File::new(DEFAULT_CONFIG_FILE, FileFormat::Yaml).required(false));

        if let Some(config_path) = path {
            builder = builder.add_source(File::new(config_path, FileFormat::Yaml).required(true));
        }

        if let Ok(config_path) = std::env::var(CONFIG_ENV_VAR) {
            builder = builder.add_source(File::new(&config_path, FileFormat::Yaml).required(true));
        }

        let config = builder
            .add_source(
                Environment::with_prefix(CONFIG_ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }

    /// Create config for testing.
    pub fn for_test() -> Self {
        Self::default()
    }
}
