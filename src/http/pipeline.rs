//! Pipeline composition.
//!
//! # Data Flow
//! ```text
//! request  → metrics → recover → cors → rate_limit → authenticate → dispatcher
//! response ← metrics ← recover ← cors ← rate_limit ← authenticate ←
//! ```
//!
//! # Design Decisions
//! - Order is fixed. Metrics sees every response, including rejections.
//!   Panic recovery covers everything beneath it. CORS answers preflights
//!   before they cost a rate limit token. Floods are throttled before any
//!   token verification work.
//! - The authorization gate is not part of the pipeline; it wraps individual
//!   routes in the dispatcher.

use axum::{middleware, Router};
use tower::ServiceBuilder;

use crate::http::middleware::{
    authenticate_middleware, metrics_middleware, recover_panic_middleware,
};
use crate::http::server::AppState;
use crate::security::cors::cors_middleware;
use crate::security::rate_limit::rate_limit_middleware;

/// Wrap `dispatcher` in the pipeline stages. The first layer listed is the outermost.
pub fn compose(dispatcher: Router, state: &AppState) -> Router {
    dispatcher.layer(
        ServiceBuilder::new()
            .layer(middleware::from_fn(metrics_middleware))
            .layer(middleware::from_fn(recover_panic_middleware))
            .layer(middleware::from_fn_with_state(state.cors.clone(), cors_middleware))
            .layer(middleware::from_fn_with_state(
                state.limiter.clone(),
                rate_limit_middleware,
            ))
            .layer(middleware::from_fn_with_state(
                state.authenticator.clone(),
                authenticate_middleware,
            )),
    )
}
