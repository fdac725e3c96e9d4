//! Image generation with provider fallback.
//!
//! ```text
//! prompt → enhance (16:9 framing)
//!     → Gemini (only if a key is configured)
//!         ok    → data:image/png;base64,...  source=user_gemini_api
//!         error → log, fall through
//!     → gateway (requires key)
//!         ok    → image URL                  source=lovable_ai
//!         429   → RateLimited
//!         other → UpstreamFailed / Unexpected
//! ```
//!
//! Each provider is tried at most once per request. Both calls share the
//! request deadline: Gemini only gets what is left after reserving a full
//! upstream window for the gateway.

use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

use crate::config::TimeoutConfig;

use crate::observability::metrics;
use crate::providers::gateway::GatewayClient;
use crate::providers::gemini::GeminiClient;
use crate::providers::ProviderError;

/// Which provider produced an image. Serialized names are part of the API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImageSource {
    UserGeminiApi,
    LovableAi,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedImage {
    /// `data:` URL or remote URL.
    pub image: String,
    pub source: ImageSource,
}

#[derive(Debug, thiserror::Error)]
pub enum ImageGenerationError {
    #[error("no image provider is configured")]
    NotConfigured,
    #[error("image provider rate limited the request")]
    RateLimited,
    #[error("image provider returned HTTP {0}")]
    UpstreamFailed(u16),
    #[error("{0}")]
    Unexpected(String),
}

/// Wrap a user prompt with widescreen framing instructions.
pub fn enhance_prompt(prompt: &str) -> String {
    format!(
        "Create a high-quality 16:9 aspect ratio image. {prompt}. The image should be cinematic, professional, and visually striking with a 16:9 widescreen composition."
    )
}

/// Gemini-first, gateway-fallback image generator.
#[derive(Clone)]
pub struct ImageGenerator {
    gemini: Option<GeminiClient>,
    gateway: Option<GatewayClient>,
    /// Cap on any single provider call.
    upstream_timeout: Duration,
}

impl Default for ImageGenerator {
    fn default() -> Self {
        Self::new(None, None, Duration::from_secs(TimeoutConfig::default().upstream_secs))
    }
}

impl ImageGenerator {
    pub fn new(
        gemini: Option<GeminiClient>,
        gateway: Option<GatewayClient>,
        upstream_timeout: Duration,
    ) -> Self {
        Self { gemini, gateway, upstream_timeout }
    }

    /// Time Gemini may use before `deadline`, keeping a gateway window free.
    fn gemini_budget(&self, deadline: Instant) -> Duration {
        let reserve = if self.gateway.is_some() { self.upstream_timeout } else { Duration::ZERO };
        deadline
            .saturating_duration_since(Instant::now())
            .saturating_sub(reserve)
            .min(self.upstream_timeout)
    }

    /// Generate an image for `prompt`, finishing (successfully or not) by `deadline`.
    pub async fn generate(
        &self,
        prompt: &str,
        deadline: Instant,
    ) -> Result<GeneratedImage, ImageGenerationError> {
        let enhanced = enhance_prompt(prompt);

        if let Some(gemini) = &self.gemini {
            let budget = self.gemini_budget(deadline);
            tracing::debug!(budget_ms = budget.as_millis() as u64, "Using configured Gemini API key");
            let result = if budget.is_zero() {
                Err(ProviderError::DeadlineExceeded)
            } else {
                gemini.generate_image(&enhanced, budget).await
            };
            match result {
                Ok(data) => {
                    metrics::record_upstream_call("gemini", "ok");
                    tracing::info!("Generated image with Gemini");
                    return Ok(GeneratedImage {
                        image: format!("data:image/png;base64,{data}"),
                        source: ImageSource::UserGeminiApi,
                    });
                }
                Err(e) => {
                    metrics::record_upstream_call("gemini", e.outcome());
                    metrics::record_fallback();
                    tracing::warn!(error = %e, "Gemini image generation failed, falling back to gateway");
                }
            }
        }

        let Some(gateway) = &self.gateway else {
            tracing::error!("No image provider keys configured");
            return Err(ImageGenerationError::NotConfigured);
        };

        let budget = deadline
            .saturating_duration_since(Instant::now())
            .min(self.upstream_timeout);
        let result = if budget.is_zero() {
            Err(ProviderError::DeadlineExceeded)
        } else {
            gateway.generate_image(&enhanced, budget).await
        };

        match result {
            Ok(url) => {
                metrics::record_upstream_call("gateway", "ok");
                tracing::info!("Generated image with gateway");
                Ok(GeneratedImage { image: url, source: ImageSource::LovableAi })
            }
            Err(e) => {
                metrics::record_upstream_call("gateway", e.outcome());
                tracing::error!(error = %e, "Gateway image generation failed");
                Err(match e {
                    ProviderError::Status { status: 429, .. } => ImageGenerationError::RateLimited,
                    ProviderError::Status { status, .. } => ImageGenerationError::UpstreamFailed(status),
                    ProviderError::MissingContent(_) => {
                        ImageGenerationError::Unexpected("No image generated".to_string())
                    }
                    other => ImageGenerationError::Unexpected(other.to_string()),
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_enhance_prompt() {
        assert_eq!(
            enhance_prompt("a fox"),
            "Create a high-quality 16:9 aspect ratio image. a fox. The image should be cinematic, professional, and visually striking with a 16:9 widescreen composition."
        );
    }

    #[test]
    fn test_source_wire_names() {
        assert_eq!(serde_json::to_string(&ImageSource::UserGeminiApi).unwrap(), "\"user_gemini_api\"");
        assert_eq!(serde_json::to_string(&ImageSource::LovableAi).unwrap(), "\"lovable_ai\"");
    }

    #[tokio::test]
    async fn test_no_providers_is_not_configured() {
        let generator = ImageGenerator::default();
        let deadline = Instant::now() + Duration::from_secs(5);
        assert!(matches!(
            generator.generate("anything", deadline).await,
            Err(ImageGenerationError::NotConfigured)
        ));
    }

    fn gemini_only() -> GeminiClient {
        let config = crate::config::GeminiConfig {
            api_key: Some("k".into()),
            ..Default::default()
        };
        GeminiClient::from_config(reqwest::Client::new(), &config).unwrap()
    }

    fn gateway_only() -> GatewayClient {
        let config = crate::config::GatewayConfig {
            api_key: Some("k".into()),
            ..Default::default()
        };
        GatewayClient::from_config(reqwest::Client::new(), &config).unwrap()
    }

    #[test]
    fn test_gemini_budget_reserves_gateway_window() {
        let upstream = Duration::from_secs(3);
        let deadline = Instant::now() + Duration::from_secs(4);

        let both = ImageGenerator::new(Some(gemini_only()), Some(gateway_only()), upstream);
        assert!(both.gemini_budget(deadline) <= Duration::from_secs(1));

        let alone = ImageGenerator::new(Some(gemini_only()), None, upstream);
        assert_eq!(alone.gemini_budget(deadline), upstream);

        let generous = Instant::now() + Duration::from_secs(60);
        assert_eq!(both.gemini_budget(generous), upstream);
    }

    #[tokio::test]
    async fn test_expired_deadline_skips_calls() {
        let generator = ImageGenerator::new(None, Some(gateway_only()), Duration::from_secs(3));
        let result = generator.generate("late", Instant::now()).await;
        assert!(matches!(result, Err(ImageGenerationError::Unexpected(_))));
    }
}
