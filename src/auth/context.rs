//! Per-request identity slot.
//!
//! The authentication stage stores the [`Identity`] in request extensions;
//! everything downstream reads it through this module. Reading never panics:
//! a missing identity is reported to the caller.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::http::Extensions;

use crate::auth::identity::Identity;
use crate::http::response::ApiError;

/// Store the identity for this request.
pub fn set_identity(extensions: &mut Extensions, identity: Identity) {
    extensions.insert(identity);
}

/// The identity attached by the authentication stage, if any.
pub fn identity(extensions: &Extensions) -> Option<&Identity> {
    extensions.get::<Identity>()
}

/// Extractor for the request's identity.
///
/// Rejects with a logged server error when the authentication stage did not run.
#[derive(Debug, Clone)]
pub struct CurrentIdentity(pub Identity);

impl<S> FromRequestParts<S> for CurrentIdentity
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        match identity(&parts.extensions) {
            Some(identity) => Ok(CurrentIdentity(identity.clone())),
            None => {
                tracing::error!(
                    request_method = %parts.method,
                    request_url = %parts.uri,
                    "Identity missing from request context"
                );
                Err(ApiError::ServerError)
            }
        }
    }
}
