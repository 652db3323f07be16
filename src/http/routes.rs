//! Route dispatcher.
//!
//! A small route table behind the pipeline: a health check, the caller's
//! profile (gated), and JSON fallbacks for unknown paths and methods.

use axum::{
    extract::State,
    http::Method,
    middleware,
    routing::get,
    Json, Router,
};
use serde_json::{json, Value};

use crate::auth::context::CurrentIdentity;
use crate::http::middleware::require_authenticated_user;
use crate::http::response::ApiError;
use crate::http::server::AppState;

pub const HEALTH_PATH: &str = "/";
pub const PROFILE_PATH: &str = "/v1/users/profile";

/// Build the dispatcher. Pipeline stages are added by [`crate::http::pipeline::compose`].
pub fn dispatcher(state: AppState) -> Router {
    Router::new()
        .route(HEALTH_PATH, get(health))
        .route(
            PROFILE_PATH,
            get(profile).route_layer(middleware::from_fn(require_authenticated_user)),
        )
        .fallback(not_found)
        .method_not_allowed_fallback(method_not_allowed)
        .with_state(state)
}

async fn health(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "available",
        "environment": state.environment,
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

async fn profile(CurrentIdentity(identity): CurrentIdentity) -> Result<Json<Value>, ApiError> {
    let user = identity.user().ok_or(ApiError::AuthenticationRequired)?;
    Ok(Json(json!({
        "message": "user profile fetched successfully",
        "data": user,
    })))
}

async fn not_found() -> ApiError {
    ApiError::NotFound
}

async fn method_not_allowed(method: Method) -> ApiError {
    ApiError::MethodNotAllowed(method)
}
