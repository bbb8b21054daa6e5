//! Host data adapter.
//!
//! The engine never sees concrete telemetry containers. A host implements one
//! of these traits to hand out mutable views of every attribute collection in
//! a batch, in whatever order its own structure stores them.

use crate::value::{AttributeMap, AttributeValue};
use serde::{Deserialize, Serialize};

/// Span kind, as far as span-name sanitisation cares.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpanKind {
    #[default]
    Unspecified,
    Internal,
    Server,
    Client,
    Producer,
    Consumer,
}

impl SpanKind {
    /// Server and client spans may be named after a request line.
    pub fn is_request(&self) -> bool {
        matches!(self, SpanKind::Server | SpanKind::Client)
    }
}

/// One mutable view handed out while visiting a trace batch.
pub enum TraceItem<'a> {
    Resource(&'a mut AttributeMap),
    Span {
        name: &'a mut String,
        kind: SpanKind,
        attributes: &'a mut AttributeMap,
    },
}

/// One mutable view handed out while visiting a log batch.
pub enum LogItem<'a> {
    Resource(&'a mut AttributeMap),
    /// `body` is `None` when the record carries no body.
    Record {
        body: Option<&'a mut AttributeValue>,
        attributes: &'a mut AttributeMap,
    },
}

/// One mutable view handed out while visiting a metric batch.
pub enum MetricItem<'a> {
    Resource(&'a mut AttributeMap),
    DataPoint(&'a mut AttributeMap),
}

/// A batch of spans.
pub trait TraceData {
    fn visit_traces(&mut self, f: &mut dyn FnMut(TraceItem<'_>));
}

/// A batch of log records.
pub trait LogData {
    fn visit_logs(&mut self, f: &mut dyn FnMut(LogItem<'_>));
}

/// A batch of metric data points.
pub trait MetricData {
    fn visit_metrics(&mut self, f: &mut dyn FnMut(MetricItem<'_>));
}
