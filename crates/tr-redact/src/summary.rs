//! Per-call redaction counters and their log emission.

use crate::value_policy::Transform;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

macro_rules! counts_event {
    ($level:ident, $s:expr, $shape:expr) => {
        tracing::$level!(
            shape = %$shape,
            keys_removed = $s.keys_removed,
            values_masked = $s.values_masked,
            values_hashed = $s.values_hashed,
            values_sanitized = $s.values_sanitized,
            values_flagged = $s.values_flagged,
            sanitizer_failures = $s.sanitizer_failures,
            keys_ignored = $s.keys_ignored,
            "redaction summary"
        )
    };
}

macro_rules! keys_event {
    ($level:ident, $s:expr, $shape:expr) => {
        tracing::$level!(
            shape = %$shape,
            keys_removed = $s.keys_removed,
            values_masked = $s.values_masked,
            values_hashed = $s.values_hashed,
            values_sanitized = $s.values_sanitized,
            values_flagged = $s.values_flagged,
            sanitizer_failures = $s.sanitizer_failures,
            keys_ignored = $s.keys_ignored,
            removed_keys = ?$s.removed_keys,
            masked_keys = ?$s.masked_keys,
            hashed_keys = ?$s.hashed_keys,
            sanitized_keys = ?$s.sanitized_keys,
            "redaction summary"
        )
    };
}

/// How much of each call's summary is logged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SummaryVerbosity {
    /// No summary log.
    #[default]
    Silent,
    /// Counts only.
    Info,
    /// Counts plus the affected keys.
    Debug,
}

impl SummaryVerbosity {
    pub fn parse_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "" | "silent" => Some(SummaryVerbosity::Silent),
            "info" => Some(SummaryVerbosity::Info),
            "debug" => Some(SummaryVerbosity::Debug),
            _ => None,
        }
    }
}

impl std::fmt::Display for SummaryVerbosity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            SummaryVerbosity::Silent => "silent",
            SummaryVerbosity::Info => "info",
            SummaryVerbosity::Debug => "debug",
        };
        write!(f, "{}", s)
    }
}

/// The telemetry shape a call processed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TelemetryShape {
    Traces,
    Logs,
    Metrics,
}

impl std::fmt::Display for TelemetryShape {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            TelemetryShape::Traces => "traces",
            TelemetryShape::Logs => "logs",
            TelemetryShape::Metrics => "metrics",
        };
        write!(f, "{}", s)
    }
}

/// Counters for one redaction call. Created fresh per call.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RedactionSummary {
    pub keys_removed: usize,
    pub values_masked: usize,
    pub values_hashed: usize,
    pub values_sanitized: usize,
    /// Values a detect-only pattern matched without rewriting.
    pub values_flagged: usize,
    pub sanitizer_failures: usize,
    pub keys_ignored: usize,
    pub removed_keys: BTreeSet<String>,
    pub masked_keys: BTreeSet<String>,
    pub hashed_keys: BTreeSet<String>,
    pub sanitized_keys: BTreeSet<String>,
}

impl RedactionSummary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_removed(&mut self, key: &str) {
        self.keys_removed += 1;
        self.removed_keys.insert(key.to_string());
    }

    pub fn record_redacted(&mut self, key: &str, transform: Transform) {
        match transform {
            Transform::Mask => {
                self.values_masked += 1;
                self.masked_keys.insert(key.to_string());
            }
            Transform::Hash => {
                self.values_hashed += 1;
                self.hashed_keys.insert(key.to_string());
            }
        }
    }

    pub fn record_sanitized(&mut self, key: &str) {
        self.values_sanitized += 1;
        self.sanitized_keys.insert(key.to_string());
    }

    pub fn record_flagged(&mut self) {
        self.values_flagged += 1;
    }

    pub fn record_sanitizer_failure(&mut self) {
        self.sanitizer_failures += 1;
    }

    pub fn record_ignored(&mut self) {
        self.keys_ignored += 1;
    }

    /// Number of values removed or rewritten.
    pub fn total_changes(&self) -> usize {
        self.keys_removed + self.values_masked + self.values_hashed + self.values_sanitized
    }

    /// Fold another summary into this one.
    pub fn merge(&mut self, other: RedactionSummary) {
        self.keys_removed += other.keys_removed;
        self.values_masked += other.values_masked;
        self.values_hashed += other.values_hashed;
        self.values_sanitized += other.values_sanitized;
        self.values_flagged += other.values_flagged;
        self.sanitizer_failures += other.sanitizer_failures;
        self.keys_ignored += other.keys_ignored;
        self.removed_keys.extend(other.removed_keys);
        self.masked_keys.extend(other.masked_keys);
        self.hashed_keys.extend(other.hashed_keys);
        self.sanitized_keys.extend(other.sanitized_keys);
    }

    /// Log this summary at the configured verbosity as a single event.
    /// Any sanitizer failure raises that event to `warn`.
    pub fn emit(&self, verbosity: SummaryVerbosity, shape: TelemetryShape) {
        let failed = self.sanitizer_failures > 0;
        match verbosity {
            SummaryVerbosity::Silent => {}
            SummaryVerbosity::Info if failed => counts_event!(warn, self, shape),
            SummaryVerbosity::Info => counts_event!(info, self, shape),
            SummaryVerbosity::Debug if failed => keys_event!(warn, self, shape),
            SummaryVerbosity::Debug => keys_event!(debug, self, shape),
        }
    }
}
