//! Configuration loading from disk and environment.

use std::fs;
use std::path::Path;

use crate::config::schema::ServiceConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load and validate configuration from a TOML file.
///
/// API keys named by each provider's `api_key_env` are read from the process
/// environment and take precedence over keys written in the file.
pub fn load_config(path: &Path) -> Result<ServiceConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    let mut config: ServiceConfig = toml::from_str(&content)?;

    apply_env_overrides(&mut config, |name| std::env::var(name).ok());
    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

/// Build a configuration from defaults plus environment keys.
pub fn load_from_env() -> Result<ServiceConfig, ConfigError> {
    let mut config = ServiceConfig::default();
    apply_env_overrides(&mut config, |name| std::env::var(name).ok());
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

/// Overlay provider API keys using `lookup` (normally `std::env::var`).
///
/// Empty values are ignored so an exported-but-blank variable does not wipe a
/// key from the file.
pub fn apply_env_overrides<F>(config: &mut ServiceConfig, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    let gemini = &mut config.providers.gemini;
    if let Some(key) = lookup(&gemini.api_key_env).filter(|k| !k.trim().is_empty()) {
        gemini.api_key = Some(key);
    }

    let gateway = &mut config.providers.gateway;
    if let Some(key) = lookup(&gateway.api_key_env).filter(|k| !k.trim().is_empty()) {
        gateway.api_key = Some(key);
    }
}
