//! Per-client rate limiting stage.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Body,
    extract::{ConnectInfo, State},
    http::Request,
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::config::RateLimitConfig;
use crate::http::response::{server_error, ApiError};
use crate::observability::metrics;
use crate::security::client_registry::{Admission, ClientRegistry};

/// State for the rate limiting stage.
#[derive(Debug, Clone)]
pub struct RateLimiter {
    enabled: bool,
    registry: Arc<ClientRegistry>,
}

impl RateLimiter {
    pub fn new(config: &RateLimitConfig) -> Self {
        Self {
            enabled: config.enabled,
            registry: Arc::new(ClientRegistry::new(config.requests_per_second, config.burst)),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn registry(&self) -> &Arc<ClientRegistry> {
        &self.registry
    }
}

/// Admit or reject the request based on the client's remote address.
pub async fn rate_limit_middleware(
    State(limiter): State<RateLimiter>,
    request: Request<Body>,
    next: Next,
) -> Response {
    if !limiter.enabled {
        return next.run(request).await;
    }

    let Some(ConnectInfo(addr)) = request.extensions().get::<ConnectInfo<SocketAddr>>().copied()
    else {
        return server_error(
            request.method(),
            request.uri(),
            &"remote address unavailable",
        )
        .into_response();
    };

    let client = addr.ip().to_string();
    match limiter.registry.check(&client) {
        Admission::Admitted => next.run(request).await,
        Admission::Rejected { retry_after } => {
            tracing::warn!(client = %client, retry_after = ?retry_after, "Rate limit exceeded");
            metrics::record_rate_limited();
            ApiError::RateLimitExceeded {
                retry_after_secs: retry_after.map(whole_seconds),
            }
            .into_response()
        }
    }
}

/// Round a wait up to whole seconds, at least one.
fn whole_seconds(wait: Duration) -> u64 {
    let secs = wait.as_secs() + u64::from(wait.subsec_nanos() > 0);
    secs.max(1)
}
