//! Application settings and configuration management

use crate::error::{AppError, Result};
use config::{Config, Environment, File};
use serde::Deserialize;
use std::fmt;
use std::path::Path;

/// Model the studio submits every job to
pub const DEFAULT_MODEL: &str =
    "smoretalk/agent-demo:da3364a3b51d323f5969b9f0d08422765f78b3292fa438b3ca6b140c42b5b23d";

/// Root configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub generation: GenerationConfig,
    #[serde(default)]
    pub fetch: FetchConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub secrets: Credentials,
}

/// Server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: usize,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_max_upload_bytes() -> usize {
    20 * 1024 * 1024
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            max_upload_bytes: default_max_upload_bytes(),
        }
    }
}

/// Remote generation service configuration
#[derive(Debug, Clone, Deserialize)]
pub struct GenerationConfig {
    #[serde(default = "default_api_base")]
    pub api_base: String,
    #[serde(default = "default_model")]
    pub model: String,
    /// Delay between status checks while a prediction is still running
    #[serde(default = "default_poll_interval")]
    pub poll_interval_ms: u64,
    /// Ask the service to hold the create call open until the prediction settles
    #[serde(default = "default_true")]
    pub prefer_wait: bool,
    /// Overall deadline for one generation; unset means wait indefinitely
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

fn default_api_base() -> String {
    "https://api.replicate.com".to_string()
}

fn default_model() -> String {
    DEFAULT_MODEL.to_string()
}

fn default_poll_interval() -> u64 {
    500
}

fn default_true() -> bool {
    true
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            api_base: default_api_base(),
            model: default_model(),
            poll_interval_ms: default_poll_interval(),
            prefer_wait: true,
            timeout_secs: None,
        }
    }
}

/// Asset download configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FetchConfig {
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "json".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

/// Static credentials passed through to the generation service
#[derive(Clone, Default, Deserialize)]
pub struct Credentials {
    #[serde(default)]
    pub replicate_api_token: String,
    #[serde(default)]
    pub api_key_1: String,
    #[serde(default)]
    pub api_key_2: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn mask(value: &str) -> &'static str {
            if value.trim().is_empty() {
                "<unset>"
            } else {
                "<redacted>"
            }
        }

        f.debug_struct("Credentials")
            .field("replicate_api_token", &mask(&self.replicate_api_token))
            .field("api_key_1", &mask(&self.api_key_1))
            .field("api_key_2", &mask(&self.api_key_2))
            .finish()
    }
}

impl Credentials {
    /// Names of the secrets that are absent or blank
    pub fn missing(&self) -> Vec<&'static str> {
        [
            ("REPLICATE_API_TOKEN", &self.replicate_api_token),
            ("API_KEY_1", &self.api_key_1),
            ("API_KEY_2", &self.api_key_2),
        ]
        .into_iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(name, _)| name)
        .collect()
    }

    /// Fail with every missing secret at once
    pub fn validate(&self) -> Result<()> {
        let missing = self.missing();
        if missing.is_empty() {
            Ok(())
        } else {
            Err(AppError::MissingSecrets(missing))
        }
    }

    /// Fill blank fields from the bare variable names used by hosted deployments
    fn fill_from_env(&mut self) {
        for (name, slot) in [
            ("REPLICATE_API_TOKEN", &mut self.replicate_api_token),
            ("API_KEY_1", &mut self.api_key_1),
            ("API_KEY_2", &mut self.api_key_2),
        ] {
            if slot.trim().is_empty() {
                if let Ok(value) = std::env::var(name) {
                    *slot = value;
                }
            }
        }
    }
}

impl Settings {
    /// Load settings from configuration files and environment variables
    pub fn load() -> Result<Self> {
        Self::load_from_path("config/default.toml")
    }

    /// Load settings from a specific configuration file path
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let config = Config::builder()
            // Start with default values
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 8080)?
            .set_default("generation.api_base", default_api_base())?
            .set_default("generation.model", default_model())?
            // Load from configuration file
            .add_source(File::with_name(path.as_ref().to_str().unwrap_or("config/default")).required(false))
            // Override with environment variables (e.g. STUDIO__SERVER__PORT)
            // Values stay strings so secrets pass through verbatim; numeric fields convert on deserialize
            .add_source(Environment::with_prefix("STUDIO").separator("__"))
            .build()?;

        let mut settings: Settings = config.try_deserialize()?;
        settings.secrets.fill_from_env();
        Ok(settings)
    }

    /// Validate the structural configuration. Secrets are checked separately so a
    /// missing key does not stop the server from starting.
    pub fn validate(&self) -> Result<()> {
        if self.server.port == 0 {
            return Err(AppError::Config(config::ConfigError::Message(
                "Server port cannot be 0".to_string(),
            )));
        }

        if self.server.max_upload_bytes == 0 {
            return Err(AppError::Config(config::ConfigError::Message(
                "server.max_upload_bytes must be greater than 0".to_string(),
            )));
        }

        if self.generation.api_base.trim().is_empty() {
            return Err(AppError::Config(config::ConfigError::Message(
                "generation.api_base cannot be empty".to_string(),
            )));
        }

        if self.generation.model.trim().is_empty() {
            return Err(AppError::Config(config::ConfigError::Message(
                "generation.model cannot be empty".to_string(),
            )));
        }

        if self.generation.poll_interval_ms == 0 {
            return Err(AppError::Config(config::ConfigError::Message(
                "generation.poll_interval_ms must be greater than 0".to_string(),
            )));
        }

        if !["json", "pretty"].contains(&self.logging.format.as_str()) {
            return Err(AppError::Config(config::ConfigError::Message(format!(
                "logging.format '{}' is invalid. Must be 'json' or 'pretty'",
                self.logging.format
            ))));
        }

        Ok(())
    }
}
