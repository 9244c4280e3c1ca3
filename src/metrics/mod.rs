pub mod collector;
pub mod endpoint;
pub mod exposition;

use std::time::Duration;

pub use collector::{MetricsCollector, MetricsSnapshot};
pub use exposition::TextOutputFormat;

/// A single timed request recorded by the timing middleware.
/// This is the "write" side; the scrape endpoint reads snapshots.
#[derive(Debug, Clone)]
pub struct Sample {
    /// HTTP method, e.g. "GET"
    pub method: String,
    /// Matched route template, e.g. "/api/metrics", or "UNKNOWN"
    pub uri: String,
    /// Response status code
    pub status: u16,
    /// Wall time spent producing the response
    pub elapsed: Duration,
}
