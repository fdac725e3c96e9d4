//! Configuration validation.
//!
//! Serde handles syntax; this module checks values. All errors are collected
//! so an operator sees every problem in one pass.

use std::net::SocketAddr;

use crate::config::schema::ServiceConfig;

/// A single semantic problem in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("{field}: invalid socket address '{value}'")]
    InvalidAddress { field: &'static str, value: String },

    #[error("{field}: invalid URL '{value}'")]
    InvalidUrl { field: &'static str, value: String },

    #[error("{field}: must be greater than zero")]
    Zero { field: &'static str },

    #[error("{field}: must not be empty")]
    Empty { field: &'static str },

    #[error("timeouts.request_secs ({request_secs}) must be more than twice timeouts.upstream_secs ({upstream_secs})")]
    TimeoutBudget { request_secs: u64, upstream_secs: u64 },
}

/// Validate a configuration, returning every error found.
pub fn validate_config(config: &ServiceConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    check_address(&mut errors, "listener.bind_address", &config.listener.bind_address);
    if config.listener.max_connections == 0 {
        errors.push(ValidationError::Zero { field: "listener.max_connections" });
    }

    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::Zero { field: "timeouts.request_secs" });
    }
    if config.timeouts.upstream_secs == 0 {
        errors.push(ValidationError::Zero { field: "timeouts.upstream_secs" });
    }
    let (request_secs, upstream_secs) = (config.timeouts.request_secs, config.timeouts.upstream_secs);
    if request_secs > 0 && upstream_secs > 0 && request_secs <= upstream_secs.saturating_mul(2) {
        errors.push(ValidationError::TimeoutBudget { request_secs, upstream_secs });
    }

    let gemini = &config.providers.gemini;
    check_url(&mut errors, "providers.gemini.base_url", &gemini.base_url);
    check_non_empty(&mut errors, "providers.gemini.image_model", &gemini.image_model);

    let gateway = &config.providers.gateway;
    check_url(&mut errors, "providers.gateway.url", &gateway.url);
    check_non_empty(&mut errors, "providers.gateway.prompt_model", &gateway.prompt_model);
    check_non_empty(&mut errors, "providers.gateway.image_model", &gateway.image_model);

    check_url(&mut errors, "youtube.thumbnail_base", &config.youtube.thumbnail_base);

    if config.rate_limit.enabled {
        if config.rate_limit.requests_per_second == 0 {
            errors.push(ValidationError::Zero { field: "rate_limit.requests_per_second" });
        }
        if config.rate_limit.burst_size == 0 {
            errors.push(ValidationError::Zero { field: "rate_limit.burst_size" });
        }
    }

    if config.observability.metrics_enabled {
        check_address(
            &mut errors,
            "observability.metrics_address",
            &config.observability.metrics_address,
        );
    }

    if config.security.max_body_size == 0 {
        errors.push(ValidationError::Zero { field: "security.max_body_size" });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_address(errors: &mut Vec<ValidationError>, field: &'static str, value: &str) {
    if value.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidAddress { field, value: value.to_string() });
    }
}

fn check_url(errors: &mut Vec<ValidationError>, field: &'static str, value: &str) {
    match url::Url::parse(value) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => {}
        _ => errors.push(ValidationError::InvalidUrl { field, value: value.to_string() }),
    }
}

fn check_non_empty(errors: &mut Vec<ValidationError>, field: &'static str, value: &str) {
    if value.trim().is_empty() {
        errors.push(ValidationError::Empty { field });
    }
}
