//! Authorization gate for routes that need a known user.

use axum::{
    body::Body,
    http::Request,
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::auth::context::identity;
use crate::auth::identity::Identity;
use crate::http::response::ApiError;

/// Reject anonymous requests. Must run after the authentication stage.
pub async fn require_authenticated_user(request: Request<Body>, next: Next) -> Response {
    let anonymous = identity(request.extensions()).map(Identity::is_anonymous);

    match anonymous {
        Some(false) => next.run(request).await,
        Some(true) => ApiError::AuthenticationRequired.into_response(),
        None => {
            tracing::error!(
                request_method = %request.method(),
                request_url = %request.uri(),
                "Authorization gate reached without an identity; is the authentication stage installed?"
            );
            ApiError::ServerError.into_response()
        }
    }
}
