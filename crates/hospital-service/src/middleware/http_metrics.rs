//! HTTP metrics middleware.
//!
//! Applied outermost so framework-level rejections (404, 405, 415, JSON
//! parse failures) are counted too. The endpoint label is the matched route
//! template; unmatched paths share one label.

use crate::observability::metrics::record_http_request;
use axum::{
    extract::{MatchedPath, Request},
    middleware::Next,
    response::Response,
};
use std::time::Instant;

pub async fn http_metrics_middleware(request: Request, next: Next) -> Response {
    let start = Instant::now();
    let method = request.method().to_string();
    let endpoint = request
        .extensions()
        .get::<MatchedPath>()
        .map(|path| path.as_str().to_string())
        .unwrap_or_else(|| "unmatched".to_string());

    let response = next.run(request).await;

    record_http_request(&method, &endpoint, response.status().as_u16(), start.elapsed());
    response
}
