//! Upstream AI providers.
//!
//! # Data Flow
//! ```text
//! generate-prompts:  thumbnail URL → gateway.rs (vision chat) → prompts.rs (parse) → [String; ≤3]
//! generate-image:    prompt → image.rs (Gemini first, gateway fallback) → GeneratedImage
//! ```
//!
//! Clients are built from config once and rebuilt on reload. A provider
//! without an API key is simply absent.

pub mod gateway;
pub mod gemini;
pub mod image;
pub mod prompts;

use std::time::Duration;

use crate::config::ServiceConfig;

pub use gateway::GatewayClient;
pub use gemini::GeminiClient;
pub use image::{GeneratedImage, ImageGenerationError, ImageGenerator, ImageSource};
pub use prompts::{parse_prompts, PromptParseError};

/// Error from a single upstream call.
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("upstream returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("upstream request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("upstream response could not be decoded: {0}")]
    Decode(String),

    #[error("upstream response is missing {0}")]
    MissingContent(&'static str),

    #[error("request deadline reached before the upstream call")]
    DeadlineExceeded,
}

impl ProviderError {
    /// Short label for metrics.
    pub fn outcome(&self) -> &'static str {
        match self {
            ProviderError::Status { status: 429, .. } => "rate_limited",
            ProviderError::Status { .. } => "http_error",
            ProviderError::Transport(_) => "transport_error",
            ProviderError::Decode(_) => "decode_error",
            ProviderError::MissingContent(_) => "missing_content",
            ProviderError::DeadlineExceeded => "deadline_exceeded",
        }
    }
}

/// Everything the handlers need to reach upstream providers.
#[derive(Clone, Default)]
pub struct Providers {
    /// Chat-completions gateway for prompt generation.
    pub gateway: Option<GatewayClient>,
    pub images: ImageGenerator,
    /// Plain client for fetching thumbnails.
    pub http: reqwest::Client,
}

impl Providers {
    pub fn from_config(config: &ServiceConfig) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeouts.upstream_secs))
            .user_agent(concat!("thumbnail-gateway/", env!("CARGO_PKG_VERSION")))
            .build()?;

        let gemini = GeminiClient::from_config(http.clone(), &config.providers.gemini);
        let gateway = GatewayClient::from_config(http.clone(), &config.providers.gateway);

        tracing::info!(
            gemini = gemini.is_some(),
            gateway = gateway.is_some(),
            "Provider clients configured"
        );

        Ok(Self {
            images: ImageGenerator::new(
                gemini,
                gateway.clone(),
                Duration::from_secs(config.timeouts.upstream_secs),
            ),
            gateway,
            http,
        })
    }
}
