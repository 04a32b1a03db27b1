use serde::Deserialize;
use std::env;
use std::sync::OnceLock;
use thiserror::Error;

/// Errors encountered while loading configuration from environment variables.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Required environment variable was not provided.
    #[error("Missing environment variable: {0}")]
    MissingVariable(String),
    /// Environment variable contained a value that could not be parsed.
    #[error("Invalid value for environment variable: {0}")]
    InvalidValue(String),
}

/// Runtime configuration for the Docintake server.
#[derive(Debug, Deserialize)]
pub struct Config {
    /// Google Cloud project that owns the Document AI processor.
    pub project_id: String,
    /// Document AI region; also selects the regional endpoint host.
    pub location: String,
    /// Identifier of the Document AI processor used for text extraction.
    pub processor_id: String,
    /// Directory receiving per-request temporary uploads.
    pub upload_dir: String,
    /// Optional override for the HTTP server port.
    pub server_port: Option<u16>,
}

/// Directory used for temporary uploads when `UPLOAD_DIR` is not set.
const DEFAULT_UPLOAD_DIR: &str = "uploads";

impl Config {
    /// Load configuration from environment variables, performing validation along the way.
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            project_id: load_env("PROJECT_ID")?,
            location: load_env("LOCATION")?,
            processor_id: load_env("PROCESSOR_ID")?,
            upload_dir: load_env_optional("UPLOAD_DIR")
                .unwrap_or_else(|| DEFAULT_UPLOAD_DIR.to_string()),
            server_port: load_env_optional("SERVER_PORT")
                .map(|value| {
                    value
                        .parse()
                        .map_err(|_| ConfigError::InvalidValue("SERVER_PORT".into()))
                })
                .transpose()?,
        })
    }
}

fn load_env(key: &str) -> Result<String, ConfigError> {
    env::var(key).map_err(|_| ConfigError::MissingVariable(key.to_string()))
}

fn load_env_optional(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

/// Global configuration cache populated during process start.
pub static CONFIG: OnceLock<Config> = OnceLock::new();

/// Retrieve the loaded configuration, panicking if initialization has not occurred.
pub fn get_config() -> &'static Config {
    CONFIG.get().expect("Config not initialized")
}

/// Load configuration from the environment and install it in the global cache.
pub fn init_config() {
    dotenvy::dotenv().ok();
    let config = Config::from_env().expect("Failed to load config from environment");
    tracing::debug!(
        project_id = %config.project_id,
        location = %config.location,
        processor_id = %config.processor_id,
        upload_dir = %config.upload_dir,
        server_port = ?config.server_port,
        "Loaded configuration"
    );
    CONFIG.set(config).expect("Failed to set config");
}
