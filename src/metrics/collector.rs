use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::Serialize;

use super::Sample;

// ─── Public types ────────────────────────────────────────────────

/// Thread-safe metrics engine.
/// The timing middleware calls `record()`, handlers call `increment()`,
/// the scrape endpoint calls `snapshot()`.
pub struct MetricsCollector {
    inner: Mutex<Inner>,
}

/// Cumulative totals for one (method, uri, status) combination.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimerSnapshot {
    pub method: String,
    pub uri: String,
    pub status: u16,
    pub count: u64,
    pub total_seconds: f64,
    pub max_seconds: f64,
}

/// One labelled counter series.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CounterSnapshot {
    /// Family name without the `_total` suffix.
    pub name: String,
    pub help: String,
    /// Sorted by label name.
    pub labels: Vec<(String, String)>,
    pub value: u64,
}

/// Read-only copy of everything collected so far.
#[derive(Debug, Clone, Serialize)]
pub struct MetricsSnapshot {
    pub started_at: DateTime<Utc>,
    pub total_requests: u64,
    pub total_errors: u64,
    pub timers: Vec<TimerSnapshot>,
    pub counters: Vec<CounterSnapshot>,
}

// ─── Internal state ──────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
struct TimerKey {
    method: String,
    uri: String,
    status: u16,
}

#[derive(Debug, Default)]
struct TimerStats {
    count: u64,
    total_nanos: u128,
    max_nanos: u128,
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
struct CounterKey {
    name: String,
    labels: Vec<(String, String)>,
}

struct Inner {
    timers: BTreeMap<TimerKey, TimerStats>,
    counters: BTreeMap<CounterKey, u64>,
    help: BTreeMap<String, String>,
    total_requests: u64,
    total_errors: u64,
    started_at: DateTime<Utc>,
}

// ─── MetricsCollector impl ───────────────────────────────────────

impl MetricsCollector {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Inner::new()),
        }
    }

    /// Record one timed request.
    pub fn record(&self, sample: Sample) {
        self.inner.lock().record(sample);
    }

    /// Add one to the counter `name` with the given labels.
    /// `help` is kept from the first call for each name.
    pub fn increment(&self, name: &str, help: &str, labels: &[(&str, &str)]) {
        self.inner.lock().increment(name, help, labels);
    }

    /// Wipe all data.
    pub fn reset(&self) {
        *self.inner.lock() = Inner::new();
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        self.inner.lock().snapshot()
    }
}

impl Default for MetricsCollector {
    fn default() -> Self {
        Self::new()
    }
}

// ─── Inner impl ──────────────────────────────────────────────────

impl Inner {
    fn new() -> Self {
        Self {
            timers: BTreeMap::new(),
            counters: BTreeMap::new(),
            help: BTreeMap::new(),
            total_requests: 0,
            total_errors: 0,
            started_at: Utc::now(),
        }
    }

    fn record(&mut self, sample: Sample) {
        self.total_requests += 1;
        if sample.status >= 400 {
            self.total_errors += 1;
        }

        let nanos = sample.elapsed.as_nanos();
        let stats = self
            .timers
            .entry(TimerKey {
                method: sample.method,
                uri: sample.uri,
                status: sample.status,
            })
            .or_default();
        stats.count += 1;
        stats.total_nanos += nanos;
        stats.max_nanos = stats.max_nanos.max(nanos);
    }

    fn increment(&mut self, name: &str, help: &str, labels: &[(&str, &str)]) {
        let mut labels: Vec<(String, String)> = labels
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect();
        labels.sort();

        self.help
            .entry(name.to_owned())
            .or_insert_with(|| help.to_owned());
        *self
            .counters
            .entry(CounterKey {
                name: name.to_owned(),
                labels,
            })
            .or_insert(0) += 1;
    }

    fn snapshot(&self) -> MetricsSnapshot {
        let timers = self
            .timers
            .iter()
            .map(|(key, stats)| TimerSnapshot {
                method: key.method.clone(),
                uri: key.uri.clone(),
                status: key.status,
                count: stats.count,
                total_seconds: nanos_to_seconds(stats.total_nanos),
                max_seconds: nanos_to_seconds(stats.max_nanos),
            })
            .collect();

        let counters = self
            .counters
            .iter()
            .map(|(key, value)| CounterSnapshot {
                name: key.name.clone(),
                help: self.help.get(&key.name).cloned().unwrap_or_default(),
                labels: key.labels.clone(),
                value: *value,
            })
            .collect();

        MetricsSnapshot {
            started_at: self.started_at,
            total_requests: self.total_requests,
            total_errors: self.total_errors,
            timers,
            counters,
        }
    }
}

fn nanos_to_seconds(nanos: u128) -> f64 {
    nanos as f64 / 1_000_000_000.0
}
