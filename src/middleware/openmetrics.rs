//! Accept-header rewrite for OpenMetrics scrapers.
//!
//! Scrapers that understand OpenMetrics usually also list the classic text
//! format, and negotiation then prefers the classic one. When a request
//! names `application/openmetrics-text` at all, its `Accept` is narrowed to
//! OpenMetrics 1.0.0 only.

use axum::{
    extract::Request,
    http::{header::ACCEPT, HeaderMap, HeaderValue},
    middleware::Next,
    response::Response,
};

use crate::negotiation::{tokenize, MimeType};

/// The `Accept` value forced onto OpenMetrics requests.
pub const OPENMETRICS_ACCEPT: &str = "application/openmetrics-text; version=1.0.0";

pub async fn openmetrics_accept_middleware(mut req: Request, next: Next) -> Response {
    if narrow_to_openmetrics(req.headers_mut()) {
        tracing::debug!("request accepting OpenMetrics media type");
    }
    next.run(req).await
}

/// Replace all `Accept` headers with [`OPENMETRICS_ACCEPT`] when any of them
/// names OpenMetrics. Returns whether the headers changed.
///
/// Unparseable tokens are skipped here; the handler rejects them.
pub fn narrow_to_openmetrics(headers: &mut HeaderMap) -> bool {
    if !accepts_openmetrics(headers) {
        return false;
    }
    headers.insert(ACCEPT, HeaderValue::from_static(OPENMETRICS_ACCEPT));
    true
}

fn accepts_openmetrics(headers: &HeaderMap) -> bool {
    let openmetrics = MimeType::from_static("application", "openmetrics-text", &[]);
    headers
        .get_all(ACCEPT)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(tokenize)
        .filter_map(|token| MimeType::parse(token).ok())
        .any(|m| m.equals_type_and_subtype(&openmetrics))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers(values: &[&'static str]) -> HeaderMap {
        let mut h = HeaderMap::new();
        for v in values {
            h.append(ACCEPT, HeaderValue::from_static(v));
        }
        h
    }

    #[test]
    fn openmetrics_request_is_narrowed() {
        let mut h = headers(&[
            "application/openmetrics-text;version=0.0.1,text/plain;version=0.0.4;q=0.5",
            "*/*;q=0.1",
        ]);
        assert!(narrow_to_openmetrics(&mut h));

        let values: Vec<_> = h.get_all(ACCEPT).iter().collect();
        assert_eq!(values, vec![OPENMETRICS_ACCEPT]);
    }

    #[test]
    fn other_requests_are_untouched() {
        let mut h = headers(&["text/plain", "application/json"]);
        assert!(!narrow_to_openmetrics(&mut h));
        assert_eq!(h.get_all(ACCEPT).iter().count(), 2);

        let mut empty = HeaderMap::new();
        assert!(!narrow_to_openmetrics(&mut empty));
        assert!(empty.get(ACCEPT).is_none());
    }

    #[test]
    fn match_is_on_type_and_subtype_only() {
        let mut h = headers(&["Application/OpenMetrics-Text; version=2.0.0"]);
        assert!(narrow_to_openmetrics(&mut h));
    }

    #[test]
    fn malformed_tokens_do_not_block_the_rewrite() {
        let mut h = headers(&["bogus, application/openmetrics-text"]);
        assert!(narrow_to_openmetrics(&mut h));
    }
}
