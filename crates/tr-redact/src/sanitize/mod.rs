//! Pluggable sanitizers for structured value kinds.
//!
//! A sanitizer owns the keys on its attribute list: when it is enabled and
//! claims a key, generic pattern redaction is skipped for that key. The set of
//! sanitizers is closed and chosen at construction time.

pub mod sql;
pub mod url;

pub use self::sql::SqlSanitizer;
pub use self::url::UrlSanitizer;

use crate::error::SanitizeError;
use serde::{Deserialize, Serialize};

/// Output of a sanitizer run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sanitized {
    pub value: String,
    /// Whether the sanitizer rewrote anything.
    pub matched: bool,
}

impl Sanitized {
    pub(crate) fn compare(original: &str, value: String) -> Self {
        let matched = value != original;
        Self { value, matched }
    }
}

/// Which sanitizer produced a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SanitizerKind {
    Url,
    Sql,
}

impl std::fmt::Display for SanitizerKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SanitizerKind::Url => write!(f, "url"),
            SanitizerKind::Sql => write!(f, "sql"),
        }
    }
}

/// One configured sanitizer.
#[derive(Debug, Clone)]
pub enum Sanitizer {
    Url(UrlSanitizer),
    Sql(SqlSanitizer),
}

impl Sanitizer {
    pub fn kind(&self) -> SanitizerKind {
        match self {
            Sanitizer::Url(_) => SanitizerKind::Url,
            Sanitizer::Sql(_) => SanitizerKind::Sql,
        }
    }

    /// Whether this sanitizer owns `key`.
    pub fn claims(&self, key: &str) -> bool {
        let attributes = match self {
            Sanitizer::Url(s) => s.attributes(),
            Sanitizer::Sql(s) => s.attributes(),
        };
        attributes.iter().any(|a| a == key)
    }

    pub fn sanitize(&self, value: &str) -> Result<Sanitized, SanitizeError> {
        match self {
            Sanitizer::Url(s) => s.sanitize(value),
            Sanitizer::Sql(s) => s.sanitize(value),
        }
    }
}

/// The enabled sanitizers, in precedence order.
#[derive(Debug, Clone, Default)]
pub struct Sanitizers {
    enabled: Vec<Sanitizer>,
}

impl Sanitizers {
    pub fn new(enabled: Vec<Sanitizer>) -> Self {
        Self { enabled }
    }

    pub fn is_empty(&self) -> bool {
        self.enabled.is_empty()
    }

    /// First enabled sanitizer claiming `key`.
    pub fn for_key(&self, key: &str) -> Option<&Sanitizer> {
        self.enabled.iter().find(|s| s.claims(key))
    }

    pub fn url(&self) -> Option<&UrlSanitizer> {
        self.enabled.iter().find_map(|s| match s {
            Sanitizer::Url(u) => Some(u),
            _ => None,
        })
    }

    pub fn sql(&self) -> Option<&SqlSanitizer> {
        self.enabled.iter().find_map(|s| match s {
            Sanitizer::Sql(q) => Some(q),
            _ => None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn both() -> Sanitizers {
        Sanitizers::new(vec![
            Sanitizer::Url(UrlSanitizer::new(vec!["http.url".to_string()])),
            Sanitizer::Sql(SqlSanitizer::new(vec!["db.statement".to_string()])),
        ])
    }

    #[test]
    fn test_claims_by_attribute_list() {
        let sanitizers = both();
        assert_eq!(
            sanitizers.for_key("http.url").map(Sanitizer::kind),
            Some(SanitizerKind::Url)
        );
        assert_eq!(
            sanitizers.for_key("db.statement").map(Sanitizer::kind),
            Some(SanitizerKind::Sql)
        );
        assert!(sanitizers.for_key("user.email").is_none());
    }

    #[test]
    fn test_empty_claims_nothing() {
        let sanitizers = Sanitizers::default();
        assert!(sanitizers.is_empty());
        assert!(sanitizers.for_key("db.statement").is_none());
        assert!(sanitizers.url().is_none());
    }
}
