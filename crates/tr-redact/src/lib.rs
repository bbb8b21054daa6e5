//! Policy-driven redaction for telemetry attributes.
//!
//! This crate strips or masks sensitive content in span attributes, log
//! bodies and attributes, and metric data point attributes before telemetry
//! leaves a trust boundary. Surrounding structure and unrelated data are left
//! byte-identical.
//!
//! # Key Features
//!
//! - **Partial-match substitution**: only the named capture groups of a
//!   blocked-value pattern are replaced; the rest of each match and all text
//!   between matches is copied verbatim.
//! - **Key policy**: allow-list, allow-all, blocked key patterns and an
//!   ignore-list with a fixed precedence.
//! - **Deterministic hashing**: MD5/SHA1/SHA3 digests (optionally keyed with
//!   HMAC) so identical plaintext correlates without being exposed.
//! - **Sanitizers**: URL and SQL sanitizers own the keys they claim.
//! - **Shape-agnostic**: the engine sees telemetry only through the
//!   [`adapter`] traits.
//!
//! # Example
//!
//! ```
//! use tr_redact::{AttributeMap, AttributeValue, RedactionConfig, RedactionEngine};
//!
//! let config = RedactionConfig {
//!     allow_all_keys: true,
//!     blocked_key_patterns: vec![".*password.*".to_string()],
//!     blocked_values: vec![r"\b(?P<mask>\d{3}-\d{2}-)(?:\d{4})\b".to_string()],
//!     mask_token: "***".to_string(),
//!     ..RedactionConfig::default()
//! };
//! let engine = RedactionEngine::new(&config).unwrap();
//!
//! let mut attributes = AttributeMap::new()
//!     .with("ssn_number", "123-45-6789")
//!     .with("password", "secret123");
//! let summary = engine.redact_attributes(&mut attributes);
//!
//! assert_eq!(
//!     attributes.get("ssn_number").and_then(AttributeValue::as_str),
//!     Some("***6789")
//! );
//! assert!(!attributes.contains_key("password"));
//! assert_eq!((summary.values_masked, summary.keys_removed), (1, 1));
//! ```

pub mod adapter;
pub mod config;
pub mod engine;
pub mod error;
pub mod groups;
pub mod hash;
pub mod key_policy;
pub mod model;
pub mod pattern;
pub mod sanitize;
pub mod summary;
pub mod value;
pub mod value_policy;
pub mod walker;

pub use adapter::{LogData, LogItem, MetricData, MetricItem, SpanKind, TraceData, TraceItem};
pub use config::{DbSanitizerConfig, RedactionConfig, SqlConfig, UrlSanitizationConfig};
pub use engine::RedactionEngine;
pub use error::{RedactionError, Result, SanitizeError};
pub use groups::{redact_groups, GroupRedactor, NestedGroupPolicy, UnnamedPatterns};
pub use hash::{HashDigest, HashFunction};
pub use key_policy::{KeyDecision, KeyPolicy};
pub use pattern::{CompiledPattern, PatternCatalog};
pub use sanitize::{Sanitizer, SanitizerKind, Sanitizers};
pub use summary::{RedactionSummary, SummaryVerbosity, TelemetryShape};
pub use value::{AttributeMap, AttributeValue};
pub use value_policy::{Transform, ValueOutcome, ValuePolicy};
pub use walker::WalkPolicies;
