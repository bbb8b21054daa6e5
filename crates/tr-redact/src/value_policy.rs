//! Scalar value evaluation.
//!
//! Decides whether a string carries sensitive content and rewrites only the
//! sensitive substrings. Keys owned by an enabled sanitizer are handed to that
//! sanitizer instead of the pattern catalog.

use crate::error::SanitizeError;
use crate::groups::GroupRedactor;
use crate::hash::HashDigest;
use crate::pattern::PatternCatalog;
use crate::sanitize::{SanitizerKind, Sanitizers};

/// Which transform rewrote a value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Transform {
    Mask,
    Hash,
}

/// Result of evaluating one scalar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValueOutcome {
    /// Nothing sensitive found.
    Unchanged,
    /// A blocked pattern matched but none of the matching patterns rewrite
    /// text.
    Flagged,
    /// Sensitive substrings were replaced.
    Redacted { value: String, transform: Transform },
    /// A sanitizer owning the key rewrote the value.
    Sanitized { value: String, kind: SanitizerKind },
    /// A sanitizer owning the key failed; the value passes through.
    SanitizerFailed { kind: SanitizerKind, error: SanitizeError },
}

impl ValueOutcome {
    /// The replacement value, if any.
    pub fn new_value(&self) -> Option<&str> {
        match self {
            ValueOutcome::Redacted { value, .. } | ValueOutcome::Sanitized { value, .. } => {
                Some(value)
            }
            _ => None,
        }
    }
}

/// Pattern catalog, transform, and sanitizers bound together.
#[derive(Debug, Clone, Default)]
pub struct ValuePolicy {
    catalog: PatternCatalog,
    digest: HashDigest,
    groups: GroupRedactor,
    sanitizers: Sanitizers,
}

impl ValuePolicy {
    pub fn new(
        catalog: PatternCatalog,
        digest: HashDigest,
        groups: GroupRedactor,
        sanitizers: Sanitizers,
    ) -> Self {
        Self {
            catalog,
            digest,
            groups,
            sanitizers,
        }
    }

    pub fn catalog(&self) -> &PatternCatalog {
        &self.catalog
    }

    pub fn digest(&self) -> &HashDigest {
        &self.digest
    }

    pub fn sanitizers(&self) -> &Sanitizers {
        &self.sanitizers
    }

    fn transform(&self) -> Transform {
        if self.digest.function().is_hashing() {
            Transform::Hash
        } else {
            Transform::Mask
        }
    }

    /// Evaluate `value` held under `key`.
    pub fn evaluate(&self, key: &str, value: &str) -> ValueOutcome {
        if let Some(sanitizer) = self.sanitizers.for_key(key) {
            return match sanitizer.sanitize(value) {
                Ok(out) if out.matched => ValueOutcome::Sanitized {
                    value: out.value,
                    kind: sanitizer.kind(),
                },
                Ok(_) => ValueOutcome::Unchanged,
                Err(error) => ValueOutcome::SanitizerFailed {
                    kind: sanitizer.kind(),
                    error,
                },
            };
        }

        self.redact_patterns(value)
    }

    /// Apply every blocked pattern in catalog order, each pass working on the
    /// previous pass's output.
    pub fn redact_patterns(&self, value: &str) -> ValueOutcome {
        let catalog = &self.catalog;
        let mut current: Option<String> = None;
        let mut sensitive = false;

        for pattern in catalog.blocked() {
            let text = current.as_deref().unwrap_or(value);
            if !catalog.matches_sensitive(pattern, text) {
                continue;
            }
            sensitive = true;
            if !self.groups.rewrites(pattern) {
                continue;
            }

            let next = self.groups.redact(
                text,
                pattern,
                |matched| !catalog.is_exempt(matched),
                |captured| self.digest.apply(captured),
            );
            if next != text {
                current = Some(next);
            }
        }

        match current {
            Some(value) => ValueOutcome::Redacted {
                value,
                transform: self.transform(),
            },
            None if sensitive => ValueOutcome::Flagged,
            None => ValueOutcome::Unchanged,
        }
    }
}
