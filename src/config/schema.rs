//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the gateway.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration for the thumbnail gateway.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ServiceConfig {
    /// Listener configuration (bind address, concurrency).
    pub listener: ListenerConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Upstream AI provider definitions.
    pub providers: ProvidersConfig,

    /// Thumbnail source settings.
    pub youtube: YoutubeConfig,

    /// Rate limiting configuration.
    pub rate_limit: RateLimitConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,

    #[serde(default)]
    pub security: SecurityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,

    /// Maximum in-flight requests (backpressure).
    pub max_connections: usize,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
            max_connections: 1024,
        }
    }
}

/// Timeout configuration for various operations.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Request timeout (total time for request/response) in seconds.
    ///
    /// Must exceed twice `upstream_secs` so an image request can wait out a
    /// slow Gemini call and still reach the gateway.
    pub request_secs: u64,

    /// Timeout for a single upstream provider call in seconds.
    pub upstream_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            request_secs: 120,
            upstream_secs: 50,
        }
    }
}

/// Both upstream providers.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ProvidersConfig {
    /// Direct Gemini image generation, used with the operator's own key.
    pub gemini: GeminiConfig,

    /// Chat-completions gateway, used for prompts and as image fallback.
    pub gateway: GatewayConfig,
}

/// Gemini `generateContent` endpoint settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct GeminiConfig {
    /// API base, without the `/models/...` suffix.
    pub base_url: String,

    /// Model used for image generation.
    pub image_model: String,

    /// API key. Overridden by `api_key_env` when that variable is set.
    pub api_key: Option<String>,

    /// Environment variable holding the API key.
    pub api_key_env: String,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            base_url: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            image_model: "gemini-2.5-flash-image-preview".to_string(),
            api_key: None,
            api_key_env: "GEMINI_API_KEY".to_string(),
        }
    }
}

/// Chat-completions gateway settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct GatewayConfig {
    /// Full chat-completions URL.
    pub url: String,

    /// Vision model used to describe thumbnails.
    pub prompt_model: String,

    /// Model used for fallback image generation.
    pub image_model: String,

    /// API key. Overridden by `api_key_env` when that variable is set.
    pub api_key: Option<String>,

    /// Environment variable holding the API key.
    pub api_key_env: String,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            url: "https://ai.gateway.lovable.dev/v1/chat/completions".to_string(),
            prompt_model: "google/gemini-2.5-flash".to_string(),
            image_model: "google/gemini-2.5-flash-image-preview".to_string(),
            api_key: None,
            api_key_env: "LOVABLE_API_KEY".to_string(),
        }
    }
}

/// Thumbnail source settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct YoutubeConfig {
    /// Host serving `/vi/{id}/{quality}.jpg`.
    pub thumbnail_base: String,
}

impl Default for YoutubeConfig {
    fn default() -> Self {
        Self {
            thumbnail_base: crate::youtube::DEFAULT_THUMBNAIL_BASE.to_string(),
        }
    }
}

/// Rate limiting configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RateLimitConfig {
    /// Enable rate limiting.
    pub enabled: bool,

    /// Maximum requests per second per client IP.
    pub requests_per_second: u32,

    /// Burst capacity.
    pub burst_size: u32,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            requests_per_second: 5,
            burst_size: 10,
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Human-readable or JSON log lines.
    pub log_format: LogFormat,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

/// Security hardening configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SecurityConfig {
    /// Maximum body size in bytes.
    pub max_body_size: usize,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            max_body_size: 64 * 1024,
        }
    }
}
