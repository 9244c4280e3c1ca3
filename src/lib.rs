//! Example service: request middleware, content negotiation for producible
//! representations, and a Prometheus / OpenMetrics scrape endpoint.

pub mod config;
pub mod error;
pub mod handlers;
pub mod metrics;
pub mod middleware;
pub mod negotiation;
pub mod server;

use axum::http::HeaderName;
use std::sync::Arc;

use config::Config;

/// Shared application state available to every handler via `State<Arc<AppState>>`.
pub struct AppState {
    pub config: Arc<Config>,

    /// Central metrics engine — middleware pushes samples, the scrape endpoint reads snapshots.
    pub metrics: Arc<metrics::MetricsCollector>,

    /// Parsed `middleware.correlator_header`.
    pub correlator_header: HeaderName,
}

impl AppState {
    pub fn new(config: Config) -> anyhow::Result<Self> {
        config::validate_config(&config)?;
        let correlator_header = HeaderName::from_bytes(config.middleware.correlator_header.as_bytes())?;

        Ok(Self {
            config: Arc::new(config),
            metrics: Arc::new(metrics::MetricsCollector::new()),
            correlator_header,
        })
    }
}
