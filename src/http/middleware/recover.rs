//! Panic containment.
//!
//! A panic anywhere beneath this stage is caught, logged, and answered with
//! a 500. The connection is closed after the response, the process keeps
//! serving.

use std::any::Any;
use std::panic::AssertUnwindSafe;

use axum::{
    body::Body,
    http::{header, HeaderValue, Request},
    middleware::Next,
    response::{IntoResponse, Response},
};
use futures_util::FutureExt;

use crate::http::response::ApiError;
use crate::observability::metrics;

pub async fn recover_panic_middleware(request: Request<Body>, next: Next) -> Response {
    let method = request.method().clone();
    let uri = request.uri().clone();

    match AssertUnwindSafe(next.run(request)).catch_unwind().await {
        Ok(response) => response,
        Err(panic) => {
            tracing::error!(
                request_method = %method,
                request_url = %uri,
                panic = %panic_message(panic.as_ref()),
                "Recovered from panic"
            );
            metrics::record_panic_recovered();

            let mut response = ApiError::ServerError.into_response();
            response
                .headers_mut()
                .insert(header::CONNECTION, HeaderValue::from_static("close"));
            response
        }
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> &str {
    if let Some(message) = panic.downcast_ref::<&str>() {
        *message
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.as_str()
    } else {
        "unknown panic payload"
    }
}
