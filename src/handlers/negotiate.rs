use axum::{http::HeaderMap, Json};
use serde::{Deserialize, Serialize};

use crate::error::NegotiationError;
use crate::negotiation::{resolve, MimeType, Variant, VariantSet};

use super::{accept_values, AppError};

// ─── Request / response types ────────────────────────────────────

#[derive(Debug, Clone, Deserialize)]
pub struct NegotiateRequest {
    /// Representations on offer, in declaration order
    pub candidates: Vec<CandidateSpec>,

    /// Accepted media types; the request's own `Accept` headers when absent
    #[serde(default)]
    pub accept: Option<Vec<String>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CandidateSpec {
    pub name: String,
    pub media_type: String,

    /// Defaults to the candidate's declaration index
    #[serde(default)]
    pub precedence: Option<u32>,
}

#[derive(Debug, Serialize)]
pub struct NegotiateResponse {
    pub selected: Option<SelectedVariant>,
}

#[derive(Debug, Serialize)]
pub struct SelectedVariant {
    pub name: String,
    pub media_type: String,
    pub precedence: u32,
}

// ─── POST {base_path}/negotiate ──────────────────────────────────

pub async fn negotiate(
    headers: HeaderMap,
    Json(req): Json<NegotiateRequest>,
) -> Result<Json<NegotiateResponse>, AppError> {
    if req.candidates.is_empty() {
        return Err(AppError::BadRequest("candidates must not be empty".into()));
    }

    let variants = req
        .candidates
        .into_iter()
        .enumerate()
        .map(|(i, c)| {
            let precedence = match c.precedence {
                Some(p) => p,
                None => u32::try_from(i).map_err(|_| NegotiationError::TooManyVariants(i + 1))?,
            };
            let produced = MimeType::parse(&c.media_type)?;
            Ok(Variant::new(c.name, produced, precedence))
        })
        .collect::<Result<Vec<_>, NegotiationError>>()?;
    let set = VariantSet::new(variants)?;

    let accepted = match req.accept {
        Some(accept) => accept,
        None => accept_values(&headers)?,
    };

    let selected = resolve(&accepted, &set)?.map(|v| SelectedVariant {
        name: v.name().to_owned(),
        media_type: v.produced().to_string(),
        precedence: v.precedence(),
    });

    Ok(Json(NegotiateResponse { selected }))
}
