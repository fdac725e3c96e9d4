//! JSON error responses.
//!
//! Every failure leaves the service as `{"error": ..., "details"?: ...}` with
//! a status code browsers and the CLI can branch on: 400 for bad input, 429
//! for rate limits (ours or upstream's), 500 for provider trouble.

use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::providers::ImageGenerationError;

/// Error body returned to clients.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0} is required")]
    MissingField(&'static str),

    #[error("AI service not configured")]
    NotConfigured,

    #[error("Rate limit exceeded. Please try again later.")]
    RateLimited,

    /// Upstream answered with a non-success status; `0` names the artifact.
    #[error("Failed to generate {0}")]
    GenerationFailed(&'static str),

    #[error("Invalid YouTube URL")]
    InvalidVideoUrl,

    #[error("Invalid thumbnail quality")]
    InvalidQuality(String),

    #[error("Failed to download thumbnail")]
    ThumbnailUnavailable(String),

    #[error("An unexpected error occurred")]
    Unexpected(String),

    #[error("Not found")]
    NotFound,

    #[error("Method not allowed")]
    MethodNotAllowed,

    #[error("Request timed out")]
    RequestTimeout,

    #[error("Request body too large")]
    PayloadTooLarge,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::MissingField(_) | ApiError::InvalidVideoUrl | ApiError::InvalidQuality(_) => {
                StatusCode::BAD_REQUEST
            }
            ApiError::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            ApiError::RequestTimeout => StatusCode::REQUEST_TIMEOUT,
            ApiError::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            ApiError::ThumbnailUnavailable(_) => StatusCode::BAD_GATEWAY,
            ApiError::NotConfigured | ApiError::GenerationFailed(_) | ApiError::Unexpected(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn details(&self) -> Option<String> {
        match self {
            ApiError::InvalidVideoUrl => Some("Please enter a valid YouTube video URL".to_string()),
            ApiError::InvalidQuality(details)
            | ApiError::ThumbnailUnavailable(details)
            | ApiError::Unexpected(details) => Some(details.clone()),
            _ => None,
        }
    }
}

impl From<ImageGenerationError> for ApiError {
    fn from(err: ImageGenerationError) -> Self {
        match err {
            ImageGenerationError::NotConfigured => ApiError::NotConfigured,
            ImageGenerationError::RateLimited => ApiError::RateLimited,
            ImageGenerationError::UpstreamFailed(_) => ApiError::GenerationFailed("image"),
            ImageGenerationError::Unexpected(details) => ApiError::Unexpected(details),
        }
    }
}

/// Replace the plain-text or empty bodies produced by the router and the
/// tower-http limit/timeout layers with the JSON error shape.
pub async fn json_error_bodies(response: Response) -> Response {
    let is_json = response
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|ct| ct.starts_with("application/json"));
    if is_json {
        return response;
    }

    let replacement = match response.status() {
        StatusCode::NOT_FOUND => ApiError::NotFound,
        StatusCode::METHOD_NOT_ALLOWED => ApiError::MethodNotAllowed,
        StatusCode::REQUEST_TIMEOUT => ApiError::RequestTimeout,
        StatusCode::PAYLOAD_TOO_LARGE => ApiError::PayloadTooLarge,
        _ => return response,
    };
    let (mut parts, _) = response.into_parts();
    let fresh = replacement.into_response();
    parts.headers.remove(header::CONTENT_LENGTH);
    parts.headers.extend(fresh.headers().clone());
    Response::from_parts(parts, fresh.into_body())
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: self.to_string(),
            details: self.details(),
        };
        (self.status(), Json(body)).into_response()
    }
}
