//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse, overlay API keys from the environment)
//!     → validation.rs (semantic checks)
//!     → ServiceConfig (validated, immutable)
//!     → provider clients built from it and shared via ArcSwap
//!
//! On file change:
//!     watcher.rs detects change
//!     → loader.rs loads new config
//!     → HttpServer rebuilds provider clients and swaps them in
//! ```
//!
//! All fields have defaults, so an empty file plus two environment
//! variables is a working configuration.

pub mod loader;
pub mod schema;
pub mod validation;
pub mod watcher;

pub use loader::{load_config, load_from_env, ConfigError};
pub use schema::{
    GatewayConfig, GeminiConfig, ListenerConfig, LogFormat, ObservabilityConfig,
    ProvidersConfig, RateLimitConfig, SecurityConfig, ServiceConfig, TimeoutConfig,
    YoutubeConfig,
};
