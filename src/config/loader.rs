//! Configuration loading.
//!
//! Precedence, lowest first: built-in defaults, the TOML file (if any), then
//! process environment. `main` loads a `.env` file into the environment first.

use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::config::schema::ServiceConfig;
use crate::config::validation::{validate_config, ValidationError};

pub const ENV_PORT: &str = "PORT";
pub const ENV_STORE_URI: &str = "STORE_URI";
/// Accepted when `STORE_URI` is unset.
pub const ENV_MONGODB_URI: &str = "MONGODB_URI";
pub const ENV_VALIDATE_ON_CREATE: &str = "VALIDATE_ON_CREATE";
pub const ENV_LOG_LEVEL: &str = "LOG_LEVEL";

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid value `{value}` for {var}")]
    Env { var: &'static str, value: String },

    #[error("Validation failed: {}", join(.0))]
    Validation(Vec<ValidationError>),
}

fn join(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load, layer and validate the configuration.
pub fn load_config(path: Option<&Path>) -> Result<ServiceConfig, ConfigError> {
    let mut config = match path {
        Some(path) => load_file(path)?,
        None => ServiceConfig::default(),
    };
    apply_env(&mut config, |var| std::env::var(var).ok())?;
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

/// Parse a TOML file without environment overrides or validation.
pub fn load_file(path: &Path) -> Result<ServiceConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    Ok(toml::from_str(&content)?)
}

/// Apply environment overrides using `lookup` to read variables.
pub fn apply_env<F>(config: &mut ServiceConfig, lookup: F) -> Result<(), ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let read = |var: &str| lookup(var).filter(|v| !v.trim().is_empty());

    if let Some(value) = read(ENV_PORT) {
        config.listener.port = value.trim().parse().map_err(|_| ConfigError::Env {
            var: ENV_PORT,
            value: value.clone(),
        })?;
    }

    if let Some(uri) = read(ENV_STORE_URI).or_else(|| read(ENV_MONGODB_URI)) {
        config.store.uri = uri;
    }

    if let Some(value) = read(ENV_VALIDATE_ON_CREATE) {
        config.records.validate_on_create = parse_flag(&value).ok_or(ConfigError::Env {
            var: ENV_VALIDATE_ON_CREATE,
            value: value.clone(),
        })?;
    }

    if let Some(level) = read(ENV_LOG_LEVEL) {
        config.observability.log_level = level;
    }

    Ok(())
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
