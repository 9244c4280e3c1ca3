use axum::{
    extract::State,
    http::{header::CONTENT_TYPE, HeaderMap},
    response::{IntoResponse, Response},
    Json,
};
use std::sync::Arc;

use super::collector::MetricsSnapshot;
use super::exposition::{self, TextOutputFormat};
use crate::handlers::{accept_values, AppError};
use crate::negotiation::Producible;
use crate::AppState;

pub const NEGOTIATION_COUNTER: &str = "content_negotiation";
const NEGOTIATION_HELP: &str = "Content negotiation outcomes per endpoint";

// ─── GET {metrics.path} ──────────────────────────────────────────
/// Prometheus scrape endpoint. The body format follows the `Accept` headers.

pub async fn prometheus_scrape(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Response, AppError> {
    let accepted = accept_values(&headers)?;

    let format = match TextOutputFormat::negotiate(&accepted) {
        Ok(Some(format)) => format,
        Ok(None) => {
            count_outcome(&state, "none");
            return Err(AppError::NotAcceptable(format!(
                "no metrics format matches Accept {accepted:?}"
            )));
        }
        Err(e) => {
            count_outcome(&state, "error");
            return Err(e.into());
        }
    };
    count_outcome(&state, format.name());

    let body = exposition::render(&state.metrics.snapshot(), format);
    Ok(([(CONTENT_TYPE, format.content_type())], body).into_response())
}

// ─── GET {base_path}/metrics ─────────────────────────────────────
/// Returns a single JSON snapshot — useful for curl / debugging.

pub async fn get_metrics(State(state): State<Arc<AppState>>) -> Json<MetricsSnapshot> {
    Json(state.metrics.snapshot())
}

fn count_outcome(state: &AppState, result: &str) {
    state.metrics.increment(
        NEGOTIATION_COUNTER,
        NEGOTIATION_HELP,
        &[("endpoint", "prometheus"), ("result", result)],
    );
}
