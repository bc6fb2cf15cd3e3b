use std::time::Instant;

use axum::{extract::Request, middleware::Next, response::Response};

/// Log one line per request: method, path, status and latency.
pub async fn log_requests(req: Request, next: Next) -> Response {
    let method = req.method().clone();
    let path = req.uri().path().to_string();
    let started = Instant::now();

    let response = next.run(req).await;

    let status = response.status();
    let elapsed = started.elapsed();
    if status.is_server_error() {
        log::warn!("{method} {path} -> {} in {elapsed:?}", status.as_u16());
    } else {
        log::info!("{method} {path} -> {} in {elapsed:?}", status.as_u16());
    }
    response
}
