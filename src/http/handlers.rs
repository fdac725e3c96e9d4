//! Endpoint handlers.

use std::time::{Duration, Instant};

use axum::{
    body::Bytes,
    extract::{Query, State},
    http::{header, HeaderMap},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::Instrument;

use crate::http::request::request_id;
use crate::http::response::ApiError;
use crate::http::server::AppState;
use crate::observability::{logging, metrics};
use crate::providers::{parse_prompts, ImageSource, ProviderError};
use crate::youtube::{extract_video_id, Thumbnail, ThumbnailQuality};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeneratePromptsRequest {
    #[serde(default)]
    thumbnail_url: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct PromptsResponse {
    pub prompts: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct GenerateImageRequest {
    #[serde(default)]
    prompt: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ImageResponse {
    pub image: String,
    pub source: ImageSource,
}

#[derive(Debug, Deserialize)]
pub struct ThumbnailQuery {
    #[serde(default)]
    url: String,
    quality: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ThumbnailInfo {
    pub video_id: String,
    pub quality: ThumbnailQuality,
    pub label: &'static str,
    pub width: u32,
    pub height: u32,
    pub thumbnail_url: String,
    pub filename: String,
}

/// Record the outcome of a handler and pass it through.
fn finish<T>(endpoint: &'static str, start: Instant, result: Result<T, ApiError>) -> Result<T, ApiError> {
    let status = match &result {
        Ok(_) => 200,
        Err(e) => e.status().as_u16(),
    };
    metrics::record_request(endpoint, status, start);
    result
}

/// Body parse failures are treated like any other unexpected failure.
fn parse_body<'a, T: Deserialize<'a>>(body: &'a [u8]) -> Result<T, ApiError> {
    serde_json::from_slice(body).map_err(|e| ApiError::Unexpected(e.to_string()))
}

/// JSON 404 for unknown routes.
pub async fn not_found() -> ApiError {
    ApiError::NotFound
}

pub async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// `POST /functions/v1/generate-prompts`
pub async fn generate_prompts(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<PromptsResponse>, ApiError> {
    let start = Instant::now();
    let span = tracing::info_span!("generate_prompts", request_id = %request_id(&headers));

    let result = async {
        let request: GeneratePromptsRequest = parse_body(&body)?;
        let thumbnail_url = request
            .thumbnail_url
            .filter(|u| !u.is_empty())
            .ok_or(ApiError::MissingField("Thumbnail URL"))?;

        let inner = state.inner.load_full();
        let Some(gateway) = inner.providers.gateway.as_ref() else {
            tracing::error!("Gateway API key not configured");
            return Err(ApiError::NotConfigured);
        };

        tracing::info!(thumbnail_url = %thumbnail_url, "Generating prompts for thumbnail");

        let content = match gateway.describe_thumbnail(&thumbnail_url).await {
            Ok(content) => {
                metrics::record_upstream_call("gateway", "ok");
                content
            }
            Err(e) => {
                metrics::record_upstream_call("gateway", e.outcome());
                tracing::error!(error = %e, "Prompt generation failed");
                return Err(match e {
                    ProviderError::Status { status: 429, .. } => ApiError::RateLimited,
                    ProviderError::Status { .. } => ApiError::GenerationFailed("prompts"),
                    ProviderError::MissingContent(_) => {
                        ApiError::Unexpected("No content in AI response".to_string())
                    }
                    other => ApiError::Unexpected(other.to_string()),
                });
            }
        };

        let prompts = parse_prompts(&content).map_err(|e| {
            tracing::error!(error = %e, content = %logging::preview(&content, 200), "Could not parse prompts");
            ApiError::Unexpected(e.to_string())
        })?;

        tracing::info!(count = prompts.len(), "Generated prompts");
        Ok::<_, ApiError>(Json(PromptsResponse { prompts }))
    }
    .instrument(span)
    .await;

    finish("generate_prompts", start, result)
}

/// `POST /functions/v1/generate-image`
pub async fn generate_image(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<ImageResponse>, ApiError> {
    let start = Instant::now();
    let span = tracing::info_span!("generate_image", request_id = %request_id(&headers));

    let result = async {
        let request: GenerateImageRequest = parse_body(&body)?;
        let prompt = request
            .prompt
            .filter(|p| !p.is_empty())
            .ok_or(ApiError::MissingField("Prompt"))?;

        tracing::info!(prompt = %logging::preview(&prompt, 50), "Generating image");

        let inner = state.inner.load_full();
        let deadline = start + Duration::from_secs(inner.config.timeouts.request_secs);
        let generated = inner.providers.images.generate(&prompt, deadline).await?;

        Ok::<_, ApiError>(Json(ImageResponse {
            image: generated.image,
            source: generated.source,
        }))
    }
    .instrument(span)
    .await;

    finish("generate_image", start, result)
}

fn resolve_thumbnail(query: &ThumbnailQuery) -> Result<Thumbnail, ApiError> {
    let video_id = extract_video_id(&query.url).ok_or(ApiError::InvalidVideoUrl)?;
    let quality = match query.quality.as_deref() {
        None | Some("") => ThumbnailQuality::default(),
        Some(raw) => raw
            .parse()
            .map_err(|e: crate::youtube::UnknownQuality| ApiError::InvalidQuality(e.to_string()))?,
    };
    Ok(Thumbnail::new(video_id, quality))
}

/// `GET /api/thumbnail`
pub async fn describe_thumbnail(
    State(state): State<AppState>,
    Query(query): Query<ThumbnailQuery>,
) -> Result<Json<ThumbnailInfo>, ApiError> {
    let start = Instant::now();
    let result = resolve_thumbnail(&query).map(|thumb| {
        let inner = state.inner.load();
        let (width, height) = thumb.quality.dimensions();
        Json(ThumbnailInfo {
            video_id: thumb.video_id.to_string(),
            quality: thumb.quality,
            label: thumb.quality.label(),
            width,
            height,
            thumbnail_url: thumb.url(&inner.config.youtube.thumbnail_base),
            filename: thumb.filename(),
        })
    });

    finish("thumbnail", start, result)
}

/// `GET /api/thumbnail/download`
pub async fn download_thumbnail(
    State(state): State<AppState>,
    Query(query): Query<ThumbnailQuery>,
) -> Result<Response, ApiError> {
    let start = Instant::now();

    let result = async {
        let thumb = resolve_thumbnail(&query)?;
        let inner = state.inner.load_full();
        let url = thumb.url(&inner.config.youtube.thumbnail_base);

        tracing::debug!(url = %url, "Fetching thumbnail");

        let response = inner
            .providers
            .http
            .get(&url)
            .send()
            .await
            .map_err(|e| ApiError::ThumbnailUnavailable(e.to_string()))?;

        if !response.status().is_success() {
            tracing::warn!(url = %url, status = %response.status(), "Thumbnail not available");
            return Err(ApiError::ThumbnailUnavailable(
                "This quality may not be available for this video".to_string(),
            ));
        }

        let content_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("image/jpeg")
            .to_string();
        let bytes = response
            .bytes()
            .await
            .map_err(|e| ApiError::ThumbnailUnavailable(e.to_string()))?;

        Ok::<_, ApiError>((
            [
                (header::CONTENT_TYPE, content_type),
                (
                    header::CONTENT_DISPOSITION,
                    format!("attachment; filename=\"{}\"", thumb.filename()),
                ),
            ],
            bytes,
        )
            .into_response())
    }
    .await;

    finish("thumbnail_download", start, result)
}
