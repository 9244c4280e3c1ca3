//! Request correlator middleware.
//!
//! Extracts the correlator header (or generates a UUID), stores it in a
//! tracing span and request extensions, and returns it in the response.

use axum::{
    extract::{Request, State},
    http::HeaderValue,
    middleware::Next,
    response::Response,
};
use std::sync::Arc;
use tracing::Instrument;
use uuid::Uuid;

use crate::AppState;

/// Correlator of the current request, available to handlers as an extension.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Correlator(pub String);

pub async fn correlator_middleware(
    State(state): State<Arc<AppState>>,
    mut req: Request,
    next: Next,
) -> Response {
    let header = &state.correlator_header;
    let id = req
        .headers()
        .get(header)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty())
        .map(String::from)
        .unwrap_or_else(|| Uuid::new_v4().to_string());

    req.extensions_mut().insert(Correlator(id.clone()));

    let span = tracing::info_span!("request", correlator = %id);
    let mut response = next.run(req).instrument(span).await;

    if let Ok(val) = HeaderValue::from_str(&id) {
        response.headers_mut().insert(header.clone(), val);
    }

    response
}
