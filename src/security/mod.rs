//! Security subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming request:
//!     → headers.rs (CORS preflight / response headers)
//!     → rate_limit.rs (per-IP token bucket, optional)
//!     → handlers
//! ```

pub mod headers;
pub mod rate_limit;
