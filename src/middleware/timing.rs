use axum::{
    extract::{MatchedPath, Request, State},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;
use std::time::Instant;

use crate::metrics::Sample;
use crate::AppState;

/// Route label used when no route matched.
pub const UNKNOWN_URI: &str = "UNKNOWN";

/// Middleware that times every request, records it in the metrics
/// collector and adds two response headers:
///
///   X-Response-Time-Us  — total handler wall time in microseconds
///   Server-Timing       — same value in the standard Server-Timing format
pub async fn timing_middleware(
    State(state): State<Arc<AppState>>,
    req: Request,
    next: Next,
) -> Response {
    let method = req.method().clone();
    let uri = req
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_owned())
        .unwrap_or_else(|| UNKNOWN_URI.to_owned());

    let start = Instant::now();
    let mut response = next.run(req).await;
    let elapsed = start.elapsed();
    let us = elapsed.as_micros();

    // ── Inject response headers ─────────────────────────────────
    if let Ok(val) = us.to_string().parse() {
        response.headers_mut().insert("X-Response-Time-Us", val);
    }

    let server_timing = format!("total;dur={:.3}", elapsed.as_secs_f64() * 1000.0);
    if let Ok(val) = server_timing.parse() {
        response.headers_mut().insert("Server-Timing", val);
    }

    let status = response.status().as_u16();
    state.metrics.record(Sample {
        method: method.to_string(),
        uri: uri.clone(),
        status,
        elapsed,
    });

    // Scrapes are frequent; keep them out of the info log
    if uri == state.config.metrics.path {
        tracing::debug!(%method, %uri, status, us = us as u64, "request");
    } else {
        tracing::info!(%method, %uri, status, us = us as u64, "request");
    }

    response
}
