//! Error responses.
//!
//! # Responsibilities
//! - Define every error the pipeline can answer with
//! - Map each to a status code and a JSON body `{"error": "<message>"}`
//! - Log server-side faults with the request method and URL
//!
//! # Design Decisions
//! - Messages are fixed strings; internal causes are logged, never returned

use axum::http::{header, HeaderValue, Method, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

/// An error answered directly to the client.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    #[error("rate limit exceeded")]
    RateLimitExceeded { retry_after_secs: Option<u64> },

    #[error("invalid or missing authentication token")]
    InvalidAuthenticationToken,

    #[error("you must be authenticated to access this resource")]
    AuthenticationRequired,

    #[error("the requested resource could not be found")]
    NotFound,

    #[error("the {0} method is not supported for this resource")]
    MethodNotAllowed(Method),

    #[error("the server encountered a problem and could not process your request")]
    ServerError,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::RateLimitExceeded { .. } => StatusCode::TOO_MANY_REQUESTS,
            ApiError::InvalidAuthenticationToken | ApiError::AuthenticationRequired => {
                StatusCode::UNAUTHORIZED
            }
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::MethodNotAllowed(_) => StatusCode::METHOD_NOT_ALLOWED,
            ApiError::ServerError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let mut response = (status, Json(json!({ "error": self.to_string() }))).into_response();

        let headers = response.headers_mut();
        match self {
            ApiError::RateLimitExceeded {
                retry_after_secs: Some(secs),
            } => {
                headers.insert(header::RETRY_AFTER, HeaderValue::from(secs));
            }
            ApiError::InvalidAuthenticationToken => {
                headers.insert(header::WWW_AUTHENTICATE, HeaderValue::from_static("Bearer"));
            }
            _ => {}
        }

        response
    }
}

/// Log an infrastructure fault and produce the generic 500.
pub fn server_error(method: &Method, uri: &Uri, error: &dyn std::fmt::Display) -> ApiError {
    tracing::error!(
        request_method = %method,
        request_url = %uri,
        error = %error,
        "Request failed with server error"
    );
    ApiError::ServerError
}
