//! Cross-origin headers.
//!
//! The endpoints are called straight from browser pages on other origins,
//! so every response allows any origin and the headers browser SDKs send.

use axum::http::{header, HeaderName, Method};
use tower_http::cors::{Any, CorsLayer};

/// Request headers browsers may send on cross-origin calls.
pub const ALLOWED_HEADERS: [HeaderName; 4] = [
    header::AUTHORIZATION,
    HeaderName::from_static("x-client-info"),
    HeaderName::from_static("apikey"),
    header::CONTENT_TYPE,
];

/// CORS layer answering preflights and tagging responses.
pub fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(ALLOWED_HEADERS)
}
