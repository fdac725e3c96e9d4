//! YouTube thumbnail remix gateway library.

pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod providers;
pub mod security;
pub mod youtube;

pub use config::schema::ServiceConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
