//! Recursive attribute tree traversal.
//!
//! Mapping entries go through the key policy; scalars go through the value
//! policy under the key that holds them. Sequence elements inherit the key of
//! the entry owning the sequence, so `emails: ["a@x.io", "b@y.io"]` is judged
//! as `emails` rather than by index.

use crate::key_policy::{KeyDecision, KeyPolicy};
use crate::summary::RedactionSummary;
use crate::value::{AttributeMap, AttributeValue};
use crate::value_policy::{ValueOutcome, ValuePolicy};
use tracing::trace;

/// Default maximum nesting depth.
pub const DEFAULT_MAX_DEPTH: usize = 64;

/// Everything the walker consults. Immutable once built.
#[derive(Debug, Clone)]
pub struct WalkPolicies {
    pub keys: KeyPolicy,
    pub values: ValuePolicy,
    /// Stringify and inspect bool/int/double scalars too.
    pub redact_all_types: bool,
    /// Nodes nested deeper than this are left untouched.
    pub max_depth: usize,
}

impl WalkPolicies {
    pub fn new(keys: KeyPolicy, values: ValuePolicy) -> Self {
        Self {
            keys,
            values,
            redact_all_types: false,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

/// Redact one attribute collection in place.
pub fn walk_map(map: &mut AttributeMap, policies: &WalkPolicies, summary: &mut RedactionSummary) {
    walk_entries(map, policies, summary, 1);
}

/// Redact a free-standing value (such as a log body) held under `parent_key`.
pub fn walk(
    node: &mut AttributeValue,
    parent_key: &str,
    policies: &WalkPolicies,
    summary: &mut RedactionSummary,
) {
    walk_value(node, parent_key, policies, summary, 1);
}

fn walk_entries(
    map: &mut AttributeMap,
    policies: &WalkPolicies,
    summary: &mut RedactionSummary,
    depth: usize,
) {
    map.retain_mut(|key, value| match policies.keys.classify(key) {
        KeyDecision::Ignore => {
            summary.record_ignored();
            true
        }
        KeyDecision::Block => {
            summary.record_removed(key);
            false
        }
        KeyDecision::Allow => {
            walk_value(value, key, policies, summary, depth);
            true
        }
    });
}

fn walk_value(
    node: &mut AttributeValue,
    key: &str,
    policies: &WalkPolicies,
    summary: &mut RedactionSummary,
    depth: usize,
) {
    if depth > policies.max_depth {
        trace!(key, depth, "max depth reached; leaving subtree untouched");
        return;
    }

    match node {
        AttributeValue::Str(text) => {
            let outcome = policies.values.evaluate(key, text);
            if let Some(value) = record(outcome, key, summary) {
                *text = value;
            }
        }
        AttributeValue::Map(map) => walk_entries(map, policies, summary, depth + 1),
        AttributeValue::Array(items) => {
            for item in items.iter_mut() {
                walk_value(item, key, policies, summary, depth + 1);
            }
        }
        AttributeValue::Bool(_) | AttributeValue::Int(_) | AttributeValue::Double(_) => {
            if !policies.redact_all_types {
                return;
            }
            let Some(text) = node.stringify_scalar() else {
                return;
            };
            let outcome = policies.values.evaluate(key, &text);
            // A rewritten number or bool is stored back as a string.
            if let Some(value) = record(outcome, key, summary) {
                *node = AttributeValue::Str(value);
            }
        }
    }
}

/// Count an outcome and hand back the replacement value, if any.
fn record(outcome: ValueOutcome, key: &str, summary: &mut RedactionSummary) -> Option<String> {
    match outcome {
        ValueOutcome::Unchanged => None,
        ValueOutcome::Flagged => {
            summary.record_flagged();
            None
        }
        ValueOutcome::Redacted { value, transform } => {
            summary.record_redacted(key, transform);
            Some(value)
        }
        ValueOutcome::Sanitized { value, .. } => {
            summary.record_sanitized(key);
            Some(value)
        }
        ValueOutcome::SanitizerFailed { kind, error } => {
            trace!(key, sanitizer = %kind, %error, "sanitizer failed; value passed through");
            summary.record_sanitizer_failure();
            None
        }
    }
}
