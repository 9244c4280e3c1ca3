//! Prometheus text exposition, in the classic 0.0.4 format and OpenMetrics 1.0.0.
//!
//! Request timers are written as summaries (`_count`, `_sum` in seconds)
//! with a companion `_max` gauge; counters get the `_total` suffix.
//!
//! ```text
//! # HELP http_server_requests_seconds HTTP server request timings
//! # TYPE http_server_requests_seconds summary
//! http_server_requests_seconds_count{method="GET",status="200",uri="/api/metrics"} 3.0
//! http_server_requests_seconds_sum{method="GET",status="200",uri="/api/metrics"} 0.0042
//! ```

use std::fmt::Write;

use crate::negotiation::{MimeType, Producible, Variant};

use super::collector::{CounterSnapshot, MetricsSnapshot, TimerSnapshot};

pub const REQUEST_TIMER: &str = "http_server_requests_seconds";
const REQUEST_TIMER_HELP: &str = "HTTP server request timings";

/// The text formats the scrape endpoint can produce.
///
/// Declaration order sets precedence: with no `Accept` header, or one that
/// matches both, the classic Prometheus format is served.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextOutputFormat {
    /// `application/openmetrics-text; version=1.0.0`
    OpenMetrics100,
    /// `text/plain; version=0.0.4`
    Prometheus004,
}

impl TextOutputFormat {
    pub const ALL: [Self; 2] = [Self::OpenMetrics100, Self::Prometheus004];

    pub fn name(self) -> &'static str {
        match self {
            Self::OpenMetrics100 => "CONTENT_TYPE_OPENMETRICS_100",
            Self::Prometheus004 => "CONTENT_TYPE_004",
        }
    }

    /// Declaration position; later formats win ties.
    pub fn precedence(self) -> u32 {
        match self {
            Self::OpenMetrics100 => 0,
            Self::Prometheus004 => 1,
        }
    }

    pub fn produced_mime_type(self) -> MimeType {
        match self {
            Self::OpenMetrics100 => MimeType::from_static(
                "application",
                "openmetrics-text",
                &[("version", "1.0.0"), ("charset", "utf-8")],
            ),
            Self::Prometheus004 => MimeType::from_static(
                "text",
                "plain",
                &[("version", "0.0.4"), ("charset", "utf-8")],
            ),
        }
    }

    /// `Content-Type` header value for responses in this format.
    pub fn content_type(self) -> &'static str {
        match self {
            Self::OpenMetrics100 => "application/openmetrics-text; version=1.0.0; charset=utf-8",
            Self::Prometheus004 => "text/plain; version=0.0.4; charset=utf-8",
        }
    }
}

impl Producible for TextOutputFormat {
    fn variants() -> Vec<Variant> {
        Self::ALL
            .iter()
            .map(|f| Variant::new(f.name(), f.produced_mime_type(), f.precedence()))
            .collect()
    }

    fn from_variant(variant: &Variant) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.name() == variant.name())
    }
}

/// Render a snapshot in the requested format.
pub fn render(snapshot: &MetricsSnapshot, format: TextOutputFormat) -> String {
    let mut out = String::with_capacity(1024);
    let open = format == TextOutputFormat::OpenMetrics100;

    write_timers(&mut out, &snapshot.timers, open);
    for family in counter_families(&snapshot.counters) {
        write_counter_family(&mut out, family, open);
    }
    if open {
        out.push_str("# EOF\n");
    }
    out
}

fn write_timers(out: &mut String, timers: &[TimerSnapshot], open: bool) {
    if timers.is_empty() {
        return;
    }

    write_header(out, REQUEST_TIMER, REQUEST_TIMER_HELP, "summary", open);
    for t in timers {
        let labels = timer_labels(t);
        let _ = writeln!(out, "{REQUEST_TIMER}_count{labels} {}", fmt_value(t.count as f64));
        let _ = writeln!(out, "{REQUEST_TIMER}_sum{labels} {}", fmt_value(t.total_seconds));
    }

    let max = format!("{REQUEST_TIMER}_max");
    write_header(out, &max, REQUEST_TIMER_HELP, "gauge", open);
    for t in timers {
        let _ = writeln!(out, "{max}{} {}", timer_labels(t), fmt_value(t.max_seconds));
    }
}

fn write_counter_family(out: &mut String, family: &[CounterSnapshot], open: bool) {
    let Some(first) = family.first() else {
        return;
    };
    let sample_name = format!("{}_total", first.name);
    // OpenMetrics names the family without the suffix; 0.0.4 uses the sample name.
    let family_name = if open { first.name.as_str() } else { sample_name.as_str() };

    write_header(out, family_name, &first.help, "counter", open);
    for series in family {
        let _ = writeln!(
            out,
            "{sample_name}{} {}",
            format_labels(&series.labels),
            fmt_value(series.value as f64)
        );
    }
}

fn write_header(out: &mut String, name: &str, help: &str, kind: &str, open: bool) {
    let help = escape_help(help);
    if open {
        let _ = writeln!(out, "# TYPE {name} {kind}");
        let _ = writeln!(out, "# HELP {name} {help}");
    } else {
        let _ = writeln!(out, "# HELP {name} {help}");
        let _ = writeln!(out, "# TYPE {name} {kind}");
    }
}

/// Counters arrive sorted by name, so families are contiguous runs.
fn counter_families(counters: &[CounterSnapshot]) -> impl Iterator<Item = &[CounterSnapshot]> {
    counters.chunk_by(|a, b| a.name == b.name)
}

fn timer_labels(t: &TimerSnapshot) -> String {
    format_labels(&[
        ("method".to_owned(), t.method.clone()),
        ("status".to_owned(), t.status.to_string()),
        ("uri".to_owned(), t.uri.clone()),
    ])
}

fn format_labels(labels: &[(String, String)]) -> String {
    if labels.is_empty() {
        return String::new();
    }
    let body: Vec<String> = labels
        .iter()
        .map(|(k, v)| format!("{k}=\"{}\"", escape_label(v)))
        .collect();
    format!("{{{}}}", body.join(","))
}

fn escape_label(value: &str) -> String {
    value
        .replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace('\n', "\\n")
}

fn escape_help(help: &str) -> String {
    help.replace('\\', "\\\\").replace('\n', "\\n")
}

/// Integral values keep a trailing `.0`, like the Java client prints them.
fn fmt_value(v: f64) -> String {
    if v.is_finite() && v.fract() == 0.0 && v.abs() < 1e15 {
        format!("{v:.1}")
    } else {
        format!("{v}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::{MetricsCollector, Sample};
    use std::time::Duration;

    fn populated() -> MetricsSnapshot {
        let c = MetricsCollector::new();
        c.record(Sample {
            method: "GET".into(),
            uri: "/api/metrics".into(),
            status: 200,
            elapsed: Duration::from_millis(250),
        });
        c.increment(
            "content_negotiation",
            "Content negotiation outcomes",
            &[("endpoint", "prometheus"), ("result", "CONTENT_TYPE_004")],
        );
        c.snapshot()
    }

    #[test]
    fn prometheus_004_format() {
        let text = render(&populated(), TextOutputFormat::Prometheus004);
        let expected = "\
# HELP http_server_requests_seconds HTTP server request timings
# TYPE http_server_requests_seconds summary
http_server_requests_seconds_count{method=\"GET\",status=\"200\",uri=\"/api/metrics\"} 1.0
http_server_requests_seconds_sum{method=\"GET\",status=\"200\",uri=\"/api/metrics\"} 0.25
# HELP http_server_requests_seconds_max HTTP server request timings
# TYPE http_server_requests_seconds_max gauge
http_server_requests_seconds_max{method=\"GET\",status=\"200\",uri=\"/api/metrics\"} 0.25
# HELP content_negotiation_total Content negotiation outcomes
# TYPE content_negotiation_total counter
content_negotiation_total{endpoint=\"prometheus\",result=\"CONTENT_TYPE_004\"} 1.0
";
        assert_eq!(text, expected);
    }

    #[test]
    fn openmetrics_format() {
        let text = render(&populated(), TextOutputFormat::OpenMetrics100);
        assert!(text.starts_with("# TYPE http_server_requests_seconds summary\n"));
        assert!(text.contains("# TYPE content_negotiation counter\n"));
        assert!(text.contains("# HELP content_negotiation Content negotiation outcomes\n"));
        assert!(text.contains(
            "content_negotiation_total{endpoint=\"prometheus\",result=\"CONTENT_TYPE_004\"} 1.0\n"
        ));
        assert!(text.ends_with("# EOF\n"));
    }

    #[test]
    fn empty_snapshot() {
        let snap = MetricsCollector::new().snapshot();
        assert_eq!(render(&snap, TextOutputFormat::Prometheus004), "");
        assert_eq!(render(&snap, TextOutputFormat::OpenMetrics100), "# EOF\n");
    }

    #[test]
    fn label_values_are_escaped() {
        let labels = vec![("path".to_owned(), "a\"b\\c\nd".to_owned())];
        assert_eq!(format_labels(&labels), "{path=\"a\\\"b\\\\c\\nd\"}");
    }

    #[test]
    fn variants_follow_declaration_order() {
        let variants = TextOutputFormat::variants();
        let order: Vec<_> = variants.iter().map(|v| (v.name(), v.precedence())).collect();
        assert_eq!(
            order,
            [("CONTENT_TYPE_OPENMETRICS_100", 0), ("CONTENT_TYPE_004", 1)]
        );
    }

    #[test]
    fn default_format_is_prometheus_text() {
        assert_eq!(
            TextOutputFormat::negotiate::<&str>(&[]).unwrap(),
            Some(TextOutputFormat::Prometheus004)
        );
        assert_eq!(
            TextOutputFormat::negotiate(&["*/*"]).unwrap(),
            Some(TextOutputFormat::Prometheus004)
        );
    }

    #[test]
    fn openmetrics_only_when_it_is_the_sole_match() {
        assert_eq!(
            TextOutputFormat::negotiate(&["application/openmetrics-text; version=1.0.0"]).unwrap(),
            Some(TextOutputFormat::OpenMetrics100)
        );
        // A typical scraper Accept header lists both; the text format wins.
        assert_eq!(
            TextOutputFormat::negotiate(&[
                "application/openmetrics-text;version=1.0.0,text/plain;version=0.0.4;q=0.5,*/*;q=0.1"
            ])
            .unwrap(),
            Some(TextOutputFormat::Prometheus004)
        );
        assert_eq!(TextOutputFormat::negotiate(&["application/json"]).unwrap(), None);
    }
}
