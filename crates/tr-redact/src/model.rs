//! Reference telemetry containers.
//!
//! A small serde model shaped like OTLP/JSON with snake_case fields. It
//! implements the adapter traits so batches read from disk can be redacted
//! directly. Hosts with their own containers implement the traits themselves.

use crate::adapter::{LogData, LogItem, MetricData, MetricItem, SpanKind, TraceData, TraceItem};
use crate::value::{AttributeMap, AttributeValue};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Resource {
    pub attributes: AttributeMap,
}

/// Instrumentation scope. Scope metadata is not redacted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Scope {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

// ---------------------------------------------------------------------------
// Traces
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Traces {
    pub resource_spans: Vec<ResourceSpans>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResourceSpans {
    pub resource: Resource,
    pub scope_spans: Vec<ScopeSpans>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScopeSpans {
    pub scope: Scope,
    pub spans: Vec<Span>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Span {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub trace_id: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub span_id: String,
    pub name: String,
    pub kind: SpanKind,
    pub attributes: AttributeMap,
}

impl Span {
    pub fn new(name: impl Into<String>, kind: SpanKind) -> Self {
        Self {
            name: name.into(),
            kind,
            ..Self::default()
        }
    }

    pub fn with_attributes(mut self, attributes: AttributeMap) -> Self {
        self.attributes = attributes;
        self
    }
}

impl Traces {
    /// A batch holding a single resource and scope.
    pub fn single(resource: AttributeMap, spans: Vec<Span>) -> Self {
        Self {
            resource_spans: vec![ResourceSpans {
                resource: Resource { attributes: resource },
                scope_spans: vec![ScopeSpans {
                    scope: Scope::default(),
                    spans,
                }],
            }],
        }
    }

    pub fn span_count(&self) -> usize {
        self.resource_spans
            .iter()
            .flat_map(|rs| &rs.scope_spans)
            .map(|ss| ss.spans.len())
            .sum()
    }

    pub fn spans(&self) -> impl Iterator<Item = &Span> {
        self.resource_spans
            .iter()
            .flat_map(|rs| &rs.scope_spans)
            .flat_map(|ss| &ss.spans)
    }
}

impl TraceData for Traces {
    fn visit_traces(&mut self, f: &mut dyn FnMut(TraceItem<'_>)) {
        for rs in &mut self.resource_spans {
            f(TraceItem::Resource(&mut rs.resource.attributes));
            for ss in &mut rs.scope_spans {
                for span in &mut ss.spans {
                    f(TraceItem::Span {
                        name: &mut span.name,
                        kind: span.kind,
                        attributes: &mut span.attributes,
                    });
                }
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Logs
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Logs {
    pub resource_logs: Vec<ResourceLogs>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResourceLogs {
    pub resource: Resource,
    pub scope_logs: Vec<ScopeLogs>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScopeLogs {
    pub scope: Scope,
    pub log_records: Vec<LogRecord>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogRecord {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_unix_nano: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub severity_text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<AttributeValue>,
    pub attributes: AttributeMap,
}

impl LogRecord {
    pub fn new(body: impl Into<AttributeValue>) -> Self {
        Self {
            body: Some(body.into()),
            ..Self::default()
        }
    }

    pub fn with_attributes(mut self, attributes: AttributeMap) -> Self {
        self.attributes = attributes;
        self
    }
}

impl Logs {
    /// A batch holding a single resource and scope.
    pub fn single(resource: AttributeMap, log_records: Vec<LogRecord>) -> Self {
        Self {
            resource_logs: vec![ResourceLogs {
                resource: Resource { attributes: resource },
                scope_logs: vec![ScopeLogs {
                    scope: Scope::default(),
                    log_records,
                }],
            }],
        }
    }

    pub fn records(&self) -> impl Iterator<Item = &LogRecord> {
        self.resource_logs
            .iter()
            .flat_map(|rl| &rl.scope_logs)
            .flat_map(|sl| &sl.log_records)
    }
}

impl LogData for Logs {
    fn visit_logs(&mut self, f: &mut dyn FnMut(LogItem<'_>)) {
        for rl in &mut self.resource_logs {
            f(LogItem::Resource(&mut rl.resource.attributes));
            for sl in &mut rl.scope_logs {
                for record in &mut sl.log_records {
                    f(LogItem::Record {
                        body: record.body.as_mut(),
                        attributes: &mut record.attributes,
                    });
                }
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Metrics
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricKind {
    #[default]
    Gauge,
    Sum,
    Histogram,
    ExponentialHistogram,
    Summary,
}

/// One data point. Only the attributes are subject to redaction; the numeric
/// fields present depend on the metric kind.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DataPoint {
    pub attributes: AttributeMap,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_unix_nano: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub count: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sum: Option<f64>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub bucket_counts: Vec<u64>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub explicit_bounds: Vec<f64>,
}

impl DataPoint {
    pub fn new(attributes: AttributeMap) -> Self {
        Self {
            attributes,
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Metric {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    pub kind: MetricKind,
    pub data_points: Vec<DataPoint>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Metrics {
    pub resource_metrics: Vec<ResourceMetrics>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResourceMetrics {
    pub resource: Resource,
    pub scope_metrics: Vec<ScopeMetrics>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScopeMetrics {
    pub scope: Scope,
    pub metrics: Vec<Metric>,
}

impl Metrics {
    /// A batch holding a single resource and scope.
    pub fn single(resource: AttributeMap, metrics: Vec<Metric>) -> Self {
        Self {
            resource_metrics: vec![ResourceMetrics {
                resource: Resource { attributes: resource },
                scope_metrics: vec![ScopeMetrics {
                    scope: Scope::default(),
                    metrics,
                }],
            }],
        }
    }

    pub fn data_points(&self) -> impl Iterator<Item = &DataPoint> {
        self.resource_metrics
            .iter()
            .flat_map(|rm| &rm.scope_metrics)
            .flat_map(|sm| &sm.metrics)
            .flat_map(|m| &m.data_points)
    }
}

impl MetricData for Metrics {
    fn visit_metrics(&mut self, f: &mut dyn FnMut(MetricItem<'_>)) {
        for rm in &mut self.resource_metrics {
            f(MetricItem::Resource(&mut rm.resource.attributes));
            for sm in &mut rm.scope_metrics {
                for metric in &mut sm.metrics {
                    for dp in &mut metric.data_points {
                        f(MetricItem::DataPoint(&mut dp.attributes));
                    }
                }
            }
        }
    }
}
