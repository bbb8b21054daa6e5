//! Redaction engine.
//!
//! Built once from a [`RedactionConfig`], then shared read-only. Each call
//! walks one caller-owned batch in place and returns a fresh summary.

use crate::adapter::{LogData, LogItem, MetricData, MetricItem, SpanKind, TraceData, TraceItem};
use crate::config::RedactionConfig;
use crate::error::{Result, SanitizeError};
use crate::sanitize::Sanitized;
use crate::summary::{RedactionSummary, SummaryVerbosity, TelemetryShape};
use crate::value::{AttributeMap, AttributeValue};
use crate::walker::{walk, walk_map, WalkPolicies};
use tracing::{debug, trace};

/// Key under which a log body is judged.
pub const BODY_KEY: &str = "body";

/// Key recorded in the summary when a span name is sanitized.
pub const SPAN_NAME_KEY: &str = "span.name";

/// Applies key and value policies to telemetry batches.
#[derive(Debug, Clone)]
pub struct RedactionEngine {
    policies: WalkPolicies,
    verbosity: SummaryVerbosity,
    sanitize_span_names: bool,
}

impl RedactionEngine {
    /// Validate `config` and compile it.
    pub fn new(config: &RedactionConfig) -> Result<Self> {
        let policies = config.build_policies()?;
        let sanitizers = policies.values.sanitizers();

        debug!(
            blocked_values = policies.values.catalog().blocked().len(),
            allowed_values = policies.values.catalog().allowed().len(),
            blocked_key_patterns = policies.keys.blocked_patterns().len(),
            allow_all_keys = policies.keys.allows_all(),
            hash_function = %policies.values.digest().function(),
            keyed = policies.values.digest().is_keyed(),
            url_sanitizer = sanitizers.url().is_some(),
            sql_sanitizer = sanitizers.sql().is_some(),
            max_depth = policies.max_depth,
            "redaction engine built"
        );

        Ok(Self {
            policies,
            verbosity: config.summary,
            sanitize_span_names: config.sanitize_span_names,
        })
    }

    /// Build from already compiled policies.
    pub fn from_policies(policies: WalkPolicies, verbosity: SummaryVerbosity) -> Self {
        Self {
            policies,
            verbosity,
            sanitize_span_names: true,
        }
    }

    pub fn policies(&self) -> &WalkPolicies {
        &self.policies
    }

    pub fn verbosity(&self) -> SummaryVerbosity {
        self.verbosity
    }

    /// Redact resource and span attributes, then span names.
    pub fn redact_traces<T: TraceData + ?Sized>(&self, batch: &mut T) -> RedactionSummary {
        let mut summary = RedactionSummary::new();
        batch.visit_traces(&mut |item| match item {
            TraceItem::Resource(attributes) => walk_map(attributes, &self.policies, &mut summary),
            TraceItem::Span {
                name,
                kind,
                attributes,
            } => {
                walk_map(attributes, &self.policies, &mut summary);
                if self.sanitize_span_names {
                    self.sanitize_span_name(name, kind, &mut summary);
                }
            }
        });
        summary.emit(self.verbosity, TelemetryShape::Traces);
        summary
    }

    /// Redact resource and record attributes plus every record body.
    pub fn redact_logs<T: LogData + ?Sized>(&self, batch: &mut T) -> RedactionSummary {
        let mut summary = RedactionSummary::new();
        batch.visit_logs(&mut |item| match item {
            LogItem::Resource(attributes) => walk_map(attributes, &self.policies, &mut summary),
            LogItem::Record { body, attributes } => {
                if let Some(body) = body {
                    walk(body, BODY_KEY, &self.policies, &mut summary);
                }
                walk_map(attributes, &self.policies, &mut summary);
            }
        });
        summary.emit(self.verbosity, TelemetryShape::Logs);
        summary
    }

    /// Redact resource and data point attributes.
    pub fn redact_metrics<T: MetricData + ?Sized>(&self, batch: &mut T) -> RedactionSummary {
        let mut summary = RedactionSummary::new();
        batch.visit_metrics(&mut |item| match item {
            MetricItem::Resource(attributes) | MetricItem::DataPoint(attributes) => {
                walk_map(attributes, &self.policies, &mut summary)
            }
        });
        summary.emit(self.verbosity, TelemetryShape::Metrics);
        summary
    }

    /// Redact a single attribute collection. No summary is logged.
    pub fn redact_attributes(&self, attributes: &mut AttributeMap) -> RedactionSummary {
        let mut summary = RedactionSummary::new();
        walk_map(attributes, &self.policies, &mut summary);
        summary
    }

    /// Redact a single value held under `key`. No summary is logged.
    pub fn redact_value(&self, key: &str, value: &mut AttributeValue) -> RedactionSummary {
        let mut summary = RedactionSummary::new();
        walk(value, key, &self.policies, &mut summary);
        summary
    }

    fn sanitize_span_name(&self, name: &mut String, kind: SpanKind, summary: &mut RedactionSummary) {
        let sanitizers = self.policies.values.sanitizers();

        if kind.is_request() {
            if let Some(url) = sanitizers.url() {
                match url.sanitize_span_name(name) {
                    // Not a request line; the SQL sanitizer may still apply.
                    Err(SanitizeError::Unrecognised { .. }) => {}
                    result => {
                        apply_span_name(result, name, summary);
                        return;
                    }
                }
            }
        }

        if kind == SpanKind::Client {
            if let Some(sql) = sanitizers.sql() {
                let result = sql.sanitize(name);
                apply_span_name(result, name, summary);
            }
        }
    }
}

fn apply_span_name(
    result: std::result::Result<Sanitized, SanitizeError>,
    name: &mut String,
    summary: &mut RedactionSummary,
) {
    match result {
        Ok(out) if out.matched => {
            *name = out.value;
            summary.record_sanitized(SPAN_NAME_KEY);
        }
        Ok(_) => {}
        Err(error) => {
            trace!(%error, "span name sanitizer failed; name passed through");
            summary.record_sanitizer_failure();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hash::HashFunction;
    use crate::model::{DataPoint, LogRecord, Logs, Metric, MetricKind, Metrics, Span, Traces};

    const SSN: &str = r"\b(?P<mask>\d{3}-\d{2}-)(?:\d{4})\b";

    fn engine(config: RedactionConfig) -> RedactionEngine {
        RedactionEngine::new(&config).unwrap()
    }

    fn base() -> RedactionConfig {
        RedactionConfig {
            allow_all_keys: true,
            blocked_key_patterns: vec![".*password.*".to_string()],
            blocked_values: vec![SSN.to_string()],
            mask_token: "***".to_string(),
            ..RedactionConfig::default()
        }
    }

    #[test]
    fn test_new_rejects_invalid_config() {
        let config = RedactionConfig {
            blocked_values: vec!["(".to_string()],
            ..RedactionConfig::default()
        };
        assert!(RedactionEngine::new(&config).is_err());
    }

    #[test]
    fn test_traces_resource_and_span_attributes() {
        let e = engine(base());
        let mut traces = Traces::single(
            AttributeMap::new().with("host.password", "x").with("service.name", "api"),
            vec![Span::new("work", SpanKind::Internal).with_attributes(
                AttributeMap::new().with("ssn_number", "123-45-6789"),
            )],
        );
        let summary = e.redact_traces(&mut traces);

        let resource = &traces.resource_spans[0].resource.attributes;
        assert!(!resource.contains_key("host.password"));
        let span = traces.spans().next().unwrap();
        assert_eq!(
            span.attributes.get("ssn_number").and_then(AttributeValue::as_str),
            Some("***6789")
        );
        assert_eq!(summary.keys_removed, 1);
        assert_eq!(summary.values_masked, 1);
    }

    #[test]
    fn test_log_body_scalar_map_and_sequence() {
        let e = engine(base());
        let mut logs = Logs::single(
            AttributeMap::new(),
            vec![
                LogRecord::new("ssn 123-45-6789"),
                LogRecord::new(AttributeMap::new().with("password", "p").with("id", "123-45-6789")),
                LogRecord::new(vec![AttributeValue::from("123-45-6789"), AttributeValue::Int(5)]),
                LogRecord::default().with_attributes(AttributeMap::new().with("k", "v")),
            ],
        );
        let summary = e.redact_logs(&mut logs);

        let records: Vec<&LogRecord> = logs.records().collect();
        assert_eq!(records[0].body.as_ref().and_then(AttributeValue::as_str), Some("ssn ***6789"));
        let map = records[1].body.as_ref().and_then(AttributeValue::as_map).unwrap();
        assert!(!map.contains_key("password"));
        assert_eq!(map.get("id").and_then(AttributeValue::as_str), Some("***6789"));
        let seq = records[2].body.as_ref().and_then(AttributeValue::as_array).unwrap();
        assert_eq!(seq[0].as_str(), Some("***6789"));
        assert_eq!(seq[1], AttributeValue::Int(5));
        assert!(records[3].body.is_none());

        assert_eq!(summary.values_masked, 3);
        assert_eq!(summary.keys_removed, 1);
        assert!(summary.masked_keys.contains(BODY_KEY));
        assert!(summary.masked_keys.contains("id"));
    }

    #[test]
    fn test_metrics_data_points() {
        let e = engine(base());
        let mut metrics = Metrics::single(
            AttributeMap::new(),
            vec![Metric {
                name: "requests".to_string(),
                kind: MetricKind::Sum,
                data_points: vec![
                    DataPoint::new(AttributeMap::new().with("db_password", "x")),
                    DataPoint::new(AttributeMap::new().with("ssn", "123-45-6789")),
                ],
                ..Metric::default()
            }],
        );
        let summary = e.redact_metrics(&mut metrics);
        let points: Vec<&DataPoint> = metrics.data_points().collect();
        assert!(points[0].attributes.is_empty());
        assert_eq!(
            points[1].attributes.get("ssn").and_then(AttributeValue::as_str),
            Some("***6789")
        );
        assert_eq!(summary.total_changes(), 2);
    }

    #[test]
    fn test_hashed_counter() {
        let e = engine(RedactionConfig {
            hash_function: HashFunction::Md5,
            ..base()
        });
        let mut attrs = AttributeMap::new().with("ssn", "123-45-6789");
        let summary = e.redact_attributes(&mut attrs);
        assert_eq!(summary.values_hashed, 1);
        assert_eq!(summary.values_masked, 0);
        assert!(summary.hashed_keys.contains("ssn"));
    }

    #[test]
    fn test_span_name_sanitisation() {
        let mut config = base();
        config.url_sanitization.enabled = true;
        config.db_sanitizer.sql.enabled = true;
        let e = engine(config);

        let mut traces = Traces::single(
            AttributeMap::new(),
            vec![
                Span::new("GET /users/12345/orders", SpanKind::Server),
                Span::new("SELECT * FROM t WHERE id = 42", SpanKind::Client),
                Span::new("GET /users/12345", SpanKind::Internal),
                Span::new("checkout", SpanKind::Server),
            ],
        );
        let summary = e.redact_traces(&mut traces);
        let names: Vec<&str> = traces.spans().map(|s| s.name.as_str()).collect();
        assert_eq!(
            names,
            vec!["GET /users/*/orders", "SELECT * FROM t WHERE id = ?", "GET /users/12345", "checkout"]
        );
        assert_eq!(summary.values_sanitized, 2);
        assert_eq!(summary.sanitizer_failures, 0);
    }

    #[test]
    fn test_span_name_sanitisation_can_be_disabled() {
        let mut config = base();
        config.url_sanitization.enabled = true;
        config.sanitize_span_names = false;
        let e = engine(config);

        let mut traces = Traces::single(
            AttributeMap::new(),
            vec![Span::new("GET /users/12345", SpanKind::Server)],
        );
        e.redact_traces(&mut traces);
        assert_eq!(traces.spans().next().unwrap().name, "GET /users/12345");
    }

    #[test]
    fn test_sanitizer_failure_is_counted() {
        let mut config = base();
        config.db_sanitizer.sql.enabled = true;
        let e = engine(config);

        let mut attrs = AttributeMap::new().with("db.statement", "SELECT 'open");
        let summary = e.redact_attributes(&mut attrs);
        assert_eq!(summary.sanitizer_failures, 1);
        assert_eq!(
            attrs.get("db.statement").and_then(AttributeValue::as_str),
            Some("SELECT 'open")
        );
    }

    #[test]
    fn test_summary_fresh_per_call() {
        let e = engine(base());
        let mut a = AttributeMap::new().with("ssn", "123-45-6789");
        let mut b = AttributeMap::new().with("ssn", "987-65-4321");
        assert_eq!(e.redact_attributes(&mut a).values_masked, 1);
        assert_eq!(e.redact_attributes(&mut b).values_masked, 1);
    }
}
