pub mod negotiate;

use axum::{
    http::{header::ACCEPT, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};

use crate::error::NegotiationError;

// ─── Unified error type ──────────────────────────────────────────

#[derive(Debug)]
pub enum AppError {
    BadRequest(String),
    NotAcceptable(String),
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            Self::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            Self::NotAcceptable(msg) => (StatusCode::NOT_ACCEPTABLE, msg),
            Self::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };

        if status.is_server_error() {
            tracing::error!(%status, "{message}");
        } else {
            tracing::debug!(%status, "{message}");
        }

        let body = serde_json::json!({
            "error":  message,
            "status": status.as_u16(),
        });

        (status, Json(body)).into_response()
    }
}

impl From<NegotiationError> for AppError {
    fn from(err: NegotiationError) -> Self {
        match err {
            NegotiationError::Parse { .. }
            | NegotiationError::DuplicateVariant(_)
            | NegotiationError::TooManyVariants(_) => {
                Self::BadRequest(err.to_string())
            }
            NegotiationError::EmptyCandidates => Self::Internal(err.to_string()),
        }
    }
}

// ─── Helpers ─────────────────────────────────────────────────────

/// Every non-blank `Accept` header value, in order. Each may list several
/// media types. An empty `Accept:` expresses no preference.
pub fn accept_values(headers: &HeaderMap) -> Result<Vec<String>, AppError> {
    let mut values = Vec::new();
    for v in headers.get_all(ACCEPT) {
        let v = v
            .to_str()
            .map_err(|_| AppError::BadRequest("Accept header is not visible ASCII".into()))?;
        if !v.trim().is_empty() {
            values.push(v.to_owned());
        }
    }
    Ok(values)
}
