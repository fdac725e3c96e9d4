//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with all handlers
//! - Wire up middleware (tracing, request ID, CORS, limits, rate limiting)
//! - Build provider clients from config and swap them on reload
//! - Serve until the shutdown signal fires

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use arc_swap::ArcSwap;
use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use tokio::net::TcpListener;
use tokio::sync::{broadcast, mpsc};
use tower::limit::GlobalConcurrencyLimitLayer;
use tower_http::{limit::RequestBodyLimitLayer, timeout::TimeoutLayer, trace::TraceLayer};

use crate::config::ServiceConfig;
use crate::http::handlers;
use crate::http::request::{propagate_request_id_layer, set_request_id_layer};
use crate::http::response::json_error_bodies;
use crate::providers::Providers;
use crate::security::headers::cors_layer;
use crate::security::rate_limit::{rate_limit_middleware, RateLimiterState};

/// How often idle rate-limit buckets are dropped.
const BUCKET_SWEEP_INTERVAL: Duration = Duration::from_secs(60);

/// Config plus the clients built from it. Replaced as a whole on reload.
pub struct Inner {
    pub config: ServiceConfig,
    pub providers: Providers,
}

impl Inner {
    pub fn build(config: ServiceConfig) -> Result<Self, reqwest::Error> {
        let providers = Providers::from_config(&config)?;
        Ok(Self { config, providers })
    }
}

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub inner: Arc<ArcSwap<Inner>>,
}

/// HTTP server for the gateway.
pub struct HttpServer {
    router: Router,
    state: AppState,
    limiter: Option<Arc<RateLimiterState>>,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    pub fn new(config: ServiceConfig) -> Result<Self, reqwest::Error> {
        let inner = Inner::build(config.clone())?;
        let state = AppState {
            inner: Arc::new(ArcSwap::from_pointee(inner)),
        };

        let limiter = config
            .rate_limit
            .enabled
            .then(|| Arc::new(RateLimiterState::new(&config.rate_limit)));

        let router = Self::build_router(&config, state.clone(), limiter.clone());
        Ok(Self { router, state, limiter })
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(
        config: &ServiceConfig,
        state: AppState,
        limiter: Option<Arc<RateLimiterState>>,
    ) -> Router {
        let mut router = Router::new()
            .route("/health", get(handlers::health))
            .route("/api/thumbnail", get(handlers::describe_thumbnail))
            .route("/api/thumbnail/download", get(handlers::download_thumbnail))
            .route("/functions/v1/generate-prompts", post(handlers::generate_prompts))
            .route("/functions/v1/generate-image", post(handlers::generate_image))
            .fallback(handlers::not_found)
            .with_state(state);

        if let Some(limiter) = limiter {
            router = router.layer(middleware::from_fn_with_state(limiter, rate_limit_middleware));
        }

        router
            .layer(RequestBodyLimitLayer::new(config.security.max_body_size))
            .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)))
            .layer(middleware::map_response(json_error_bodies))
            .layer(GlobalConcurrencyLimitLayer::new(config.listener.max_connections))
            .layer(cors_layer())
            .layer(propagate_request_id_layer())
            .layer(TraceLayer::new_for_http())
            .layer(set_request_id_layer())
    }

    /// Run the server, accepting connections on the given listener.
    ///
    /// New configurations arriving on `config_updates` replace the provider
    /// clients; listener, timeout and limit layers keep their startup values.
    pub async fn run(
        self,
        listener: TcpListener,
        mut config_updates: mpsc::UnboundedReceiver<ServiceConfig>,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        let state = self.state.clone();
        tokio::spawn(async move {
            while let Some(new_config) = config_updates.recv().await {
                match Inner::build(new_config) {
                    Ok(inner) => {
                        state.inner.store(Arc::new(inner));
                        tracing::info!("Configuration reloaded");
                    }
                    Err(e) => {
                        tracing::error!(error = %e, "Failed to apply reloaded config, keeping current clients");
                    }
                }
            }
        });

        let eviction = self.limiter.map(|limiter| {
            tokio::spawn(async move {
                let mut ticker = tokio::time::interval(BUCKET_SWEEP_INTERVAL);
                loop {
                    ticker.tick().await;
                    let evicted = limiter.evict_idle(BUCKET_SWEEP_INTERVAL);
                    if evicted > 0 {
                        tracing::debug!(evicted, remaining = limiter.tracked_clients(), "Evicted idle rate-limit buckets");
                    }
                }
            })
        });

        let app = self.router.into_make_service_with_connect_info::<SocketAddr>();

        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received");
            })
            .await?;

        if let Some(task) = eviction {
            task.abort();
        }
        tracing::info!("HTTP server stopped");
        Ok(())
    }
}
