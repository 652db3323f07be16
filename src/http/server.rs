//! HTTP server setup.
//!
//! # Responsibilities
//! - Build shared pipeline state from configuration
//! - Assemble the dispatcher and pipeline into one router
//! - Serve until shutdown, with the idle-client reaper running alongside
//!
//! # Design Decisions
//! - Every request is bounded by `timeouts.request_secs` (408 when exceeded)
//! - The drain after shutdown is bounded by `timeouts.shutdown_grace_secs`;
//!   connections still open at the deadline are abandoned

use std::future::IntoFuture;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use tokio::net::TcpListener;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

use crate::auth::identity::{IdentityResolver, UserDirectory};
use crate::auth::token::TokenVerifier;
use crate::config::{AppConfig, TimeoutConfig};
use crate::http::middleware::Authenticator;
use crate::http::{pipeline, routes};
use crate::lifecycle::Shutdown;
use crate::security::client_registry::SWEEP_INTERVAL;
use crate::security::{CorsPolicy, RateLimiter};

/// State shared by the pipeline stages and handlers.
#[derive(Clone)]
pub struct AppState {
    pub environment: String,
    pub limiter: RateLimiter,
    pub cors: CorsPolicy,
    pub authenticator: Authenticator,
}

impl AppState {
    pub fn new(config: &AppConfig, directory: Arc<dyn UserDirectory>) -> Self {
        Self {
            environment: config.environment.clone(),
            limiter: RateLimiter::new(&config.limiter),
            cors: CorsPolicy::new(&config.cors),
            authenticator: Authenticator {
                verifier: Arc::new(TokenVerifier::new(config.jwt.secret.as_bytes())),
                resolver: IdentityResolver::new(directory),
            },
        }
    }
}

/// Build the complete application router: dispatcher, pipeline, request
/// deadline, access log.
#[allow(deprecated)]
pub fn build_router(state: AppState, timeouts: &TimeoutConfig) -> Router {
    let app = pipeline::compose(routes::dispatcher(state.clone()), &state);
    app.layer(TimeoutLayer::new(Duration::from_secs(timeouts.request_secs)))
        .layer(TraceLayer::new_for_http())
}

/// The API server.
pub struct HttpServer {
    router: Router,
    limiter: RateLimiter,
    shutdown_grace: Duration,
}

impl HttpServer {
    pub fn new(config: &AppConfig, directory: Arc<dyn UserDirectory>) -> Self {
        let state = AppState::new(config, directory);
        let limiter = state.limiter.clone();
        Self {
            router: build_router(state, &config.timeouts),
            limiter,
            shutdown_grace: Duration::from_secs(config.timeouts.shutdown_grace_secs),
        }
    }

    /// Serve on `listener` until `shutdown` is triggered, then drain in-flight requests.
    pub async fn run(self, listener: TcpListener, shutdown: Shutdown) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            rate_limit_enabled = self.limiter.is_enabled(),
            "HTTP server starting"
        );

        let reaper = self.limiter.is_enabled().then(|| {
            tokio::spawn(
                self.limiter
                    .registry()
                    .clone()
                    .run_reaper(SWEEP_INTERVAL, shutdown.subscribe()),
            )
        });

        let mut stop = shutdown.subscribe();
        let mut deadline = shutdown.subscribe();
        let grace = self.shutdown_grace;
        let app = self.router.into_make_service_with_connect_info::<SocketAddr>();

        let serve = axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = stop.recv().await;
                tracing::info!("Shutdown signal received, draining connections");
            })
            .into_future();

        tokio::pin!(serve);

        let served = tokio::select! {
            result = &mut serve => result,
            _ = deadline.recv() => match tokio::time::timeout(grace, &mut serve).await {
                Ok(result) => result,
                Err(_) => {
                    tracing::warn!(
                        grace_secs = grace.as_secs(),
                        "Drain deadline reached, abandoning in-flight connections"
                    );
                    Ok(())
                }
            },
        };

        // Stop the reaper even if serving failed.
        shutdown.trigger();
        if let Some(reaper) = reaper {
            if let Err(e) = reaper.await {
                tracing::error!(error = %e, "Client reaper task failed");
            }
        }

        served?;
        tracing::info!("HTTP server stopped");
        Ok(())
    }
}
