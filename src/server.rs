use axum::{
    middleware as axum_mw,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::CorsLayer;

use crate::handlers;
use crate::metrics::endpoint;
use crate::middleware::{correlator, openmetrics, timing};
use crate::AppState;

pub const NEGOTIATE_ROUTE: &str = "/negotiate";
pub const METRICS_JSON_ROUTE: &str = "/metrics";

/// Routes mounted under `server.base_path`.
pub const API_ROUTES: [&str; 2] = [NEGOTIATE_ROUTE, METRICS_JSON_ROUTE];

/// Builds the full Axum `Router` with all routes and middleware.
pub fn create_router(state: Arc<AppState>) -> Router {
    let config = state.config.clone();

    // ── API endpoints, mounted under the base path ──────────────
    let api = Router::new()
        .route(NEGOTIATE_ROUTE, post(handlers::negotiate::negotiate))
        .route(METRICS_JSON_ROUTE, get(endpoint::get_metrics));

    // ── Prometheus scrape; the Accept rewrite applies here only ─
    let mut scrape = get(endpoint::prometheus_scrape);
    if config.metrics.force_openmetrics {
        scrape = scrape.layer(axum_mw::from_fn(
            openmetrics::openmetrics_accept_middleware,
        ));
    }

    let base_path = config.server.base_path.as_str();
    let router = Router::new().route(&config.metrics.path, scrape);
    let router = if base_path == "/" {
        router.merge(api)
    } else {
        router.nest(base_path, api)
    };

    // ── Global middleware (applied bottom-up) ───────────────────
    let mut router = router
        .layer(axum_mw::from_fn_with_state(
            state.clone(),
            timing::timing_middleware,
        ))
        .layer(axum_mw::from_fn_with_state(
            state.clone(),
            correlator::correlator_middleware,
        ));
    if config.middleware.cors {
        router = router.layer(CorsLayer::permissive());
    }

    router.with_state(state)
}
