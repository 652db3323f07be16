//! Request metrics stage. Outermost, so it observes every response,
//! including rejections and recovered panics.

use std::time::Instant;

use axum::{body::Body, http::Request, middleware::Next, response::Response};

use crate::observability::metrics;

pub async fn metrics_middleware(request: Request<Body>, next: Next) -> Response {
    let start = Instant::now();
    let method = request.method().to_string();
    metrics::record_request_received();

    let response = next.run(request).await;

    metrics::record_response(&method, response.status().as_u16(), start);
    response
}
