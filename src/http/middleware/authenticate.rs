//! Authentication stage.
//!
//! # Responsibilities
//! - Read the `Authorization: Bearer <token>` header
//! - Verify the token and resolve its subject to a user
//! - Attach the resulting `Identity` to the request
//!
//! # Design Decisions
//! - No header means anonymous, not an error; gating happens per route
//! - Every token problem, including an unknown subject, answers the same 401
//! - `Vary: Authorization` is added to every response from this stage

use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::{header, HeaderValue, Request},
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::auth::context::set_identity;
use crate::auth::identity::{IdentityResolver, ResolveError};
use crate::auth::token::TokenVerifier;
use crate::http::response::{server_error, ApiError};
use crate::observability::metrics;

/// State for the authentication stage.
#[derive(Clone)]
pub struct Authenticator {
    pub verifier: Arc<TokenVerifier>,
    pub resolver: IdentityResolver,
}

/// Extract the token from an `Authorization` header value.
///
/// The value must be exactly two whitespace-separated fields, the first being
/// the literal `Bearer`.
fn bearer_token(value: &HeaderValue) -> Option<&str> {
    let value = value.to_str().ok()?;
    let mut fields = value.split_whitespace();
    match (fields.next(), fields.next(), fields.next()) {
        (Some("Bearer"), Some(token), None) => Some(token),
        _ => None,
    }
}

pub async fn authenticate_middleware(
    State(auth): State<Authenticator>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let mut response = authenticate(auth, request, next).await;
    response
        .headers_mut()
        .append(header::VARY, HeaderValue::from_static("Authorization"));
    response
}

async fn authenticate(auth: Authenticator, mut request: Request<Body>, next: Next) -> Response {
    let Some(value) = request.headers().get(header::AUTHORIZATION) else {
        set_identity(request.extensions_mut(), auth.resolver.anonymous());
        return next.run(request).await;
    };

    let Some(token) = bearer_token(value) else {
        tracing::debug!("Malformed Authorization header");
        metrics::record_auth_failure("bad_header");
        return ApiError::InvalidAuthenticationToken.into_response();
    };

    let claims = match auth.verifier.verify(token) {
        Ok(claims) => claims,
        Err(e) => {
            tracing::debug!(reason = e.reason(), "Token rejected");
            metrics::record_auth_failure(e.reason());
            return ApiError::InvalidAuthenticationToken.into_response();
        }
    };

    match auth.resolver.resolve(&claims.sub).await {
        Ok(identity) => {
            set_identity(request.extensions_mut(), identity);
            next.run(request).await
        }
        Err(ResolveError::NotFound) => {
            tracing::warn!(subject = %claims.sub, "Token subject has no matching user");
            metrics::record_auth_failure("unknown_subject");
            ApiError::InvalidAuthenticationToken.into_response()
        }
        Err(e @ ResolveError::Lookup(_)) => {
            metrics::record_auth_failure("lookup");
            server_error(request.method(), request.uri(), &e).into_response()
        }
    }
}
