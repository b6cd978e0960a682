//! # Request Metrics
//!
//! Records every request through the `metrics` facade:
//!
//! - `http_requests_total` counter, labelled by `method` and `status`.
//! - `http_request_duration_seconds` histogram, same labels.
//!
//! With no recorder installed the macros are no-ops. The server binary
//! installs a Prometheus recorder and `GET /metrics` renders it.

use std::time::{Duration, Instant};

use axum::extract::Request;
use axum::http::{Method, StatusCode};
use axum::middleware::Next;
use axum::response::Response;
use metrics::{counter, histogram};

const REQUESTS_TOTAL: &str = "http_requests_total";
const REQUEST_DURATION: &str = "http_request_duration_seconds";

/// Record one finished request.
pub fn record_request(method: &Method, status: StatusCode, elapsed: Duration) {
    let method = method.as_str().to_owned();
    let status = status.as_u16().to_string();
    counter!(REQUESTS_TOTAL, "method" => method.clone(), "status" => status.clone()).increment(1);
    histogram!(REQUEST_DURATION, "method" => method, "status" => status)
        .record(elapsed.as_secs_f64());
}

/// Middleware that times each request and records it.
pub async fn metrics_middleware(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let start = Instant::now();

    let response = next.run(request).await;

    record_request(&method, response.status(), start.elapsed());
    response
}
