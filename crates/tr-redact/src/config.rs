//! Redaction configuration.
//!
//! One flat structure enumerating every option. It is validated eagerly when
//! an engine is built, so a bad pattern or a conflicting setting fails before
//! any batch is processed.

use crate::error::{RedactionError, Result};
use crate::groups::{GroupRedactor, NestedGroupPolicy, UnnamedPatterns};
use crate::hash::{HashDigest, HashFunction, DEFAULT_MASK_TOKEN};
use crate::key_policy::KeyPolicy;
use crate::pattern::{compile_all, PatternCatalog};
use crate::sanitize::sql::DEFAULT_SQL_ATTRIBUTES;
use crate::sanitize::url::DEFAULT_URL_ATTRIBUTES;
use crate::sanitize::{Sanitizer, Sanitizers, SqlSanitizer, UrlSanitizer};
use crate::summary::SummaryVerbosity;
use crate::value_policy::ValuePolicy;
use crate::walker::{WalkPolicies, DEFAULT_MAX_DEPTH};
use serde::{Deserialize, Serialize};
use std::path::Path;

fn default_mask_token() -> String {
    DEFAULT_MASK_TOKEN.to_string()
}

fn default_max_depth() -> usize {
    DEFAULT_MAX_DEPTH
}

fn default_true() -> bool {
    true
}

fn default_url_attributes() -> Vec<String> {
    DEFAULT_URL_ATTRIBUTES.iter().map(|s| s.to_string()).collect()
}

fn default_sql_attributes() -> Vec<String> {
    DEFAULT_SQL_ATTRIBUTES.iter().map(|s| s.to_string()).collect()
}

/// Every recognised redaction option.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RedactionConfig {
    /// Keep every key not matched by a blocked key pattern.
    pub allow_all_keys: bool,
    /// Keys permitted when `allow_all_keys` is off.
    pub allowed_keys: Vec<String>,
    /// Keys never inspected, not even recursed into.
    pub ignored_keys: Vec<String>,
    pub blocked_key_patterns: Vec<String>,
    /// Sensitive value patterns; named groups mark what gets rewritten.
    pub blocked_values: Vec<String>,
    /// Exceptions, tested against each blocked match.
    pub allowed_values: Vec<String>,
    pub hash_function: HashFunction,
    /// Base64 HMAC key. Requires a hashing function.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hash_key: Option<String>,
    #[serde(default = "default_mask_token")]
    pub mask_token: String,
    pub redact_all_types: bool,
    pub summary: SummaryVerbosity,
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,
    pub nested_groups: NestedGroupPolicy,
    pub unnamed_patterns: UnnamedPatterns,
    pub url_sanitization: UrlSanitizationConfig,
    pub db_sanitizer: DbSanitizerConfig,
    #[serde(default = "default_true")]
    pub sanitize_span_names: bool,
}

impl Default for RedactionConfig {
    fn default() -> Self {
        Self {
            allow_all_keys: false,
            allowed_keys: Vec::new(),
            ignored_keys: Vec::new(),
            blocked_key_patterns: Vec::new(),
            blocked_values: Vec::new(),
            allowed_values: Vec::new(),
            hash_function: HashFunction::None,
            hash_key: None,
            mask_token: default_mask_token(),
            redact_all_types: false,
            summary: SummaryVerbosity::Silent,
            max_depth: default_max_depth(),
            nested_groups: NestedGroupPolicy::Outermost,
            unnamed_patterns: UnnamedPatterns::DetectOnly,
            url_sanitization: UrlSanitizationConfig::default(),
            db_sanitizer: DbSanitizerConfig::default(),
            sanitize_span_names: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct UrlSanitizationConfig {
    pub enabled: bool,
    #[serde(default = "default_url_attributes")]
    pub attributes: Vec<String>,
}

impl Default for UrlSanitizationConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            attributes: default_url_attributes(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DbSanitizerConfig {
    pub sql: SqlConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SqlConfig {
    pub enabled: bool,
    #[serde(default = "default_sql_attributes")]
    pub attributes: Vec<String>,
}

impl Default for SqlConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            attributes: default_sql_attributes(),
        }
    }
}

impl RedactionConfig {
    /// Load from a file. `.yaml`/`.yml` is read as YAML, anything else as
    /// JSON.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        let is_yaml = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.eq_ignore_ascii_case("yaml") || e.eq_ignore_ascii_case("yml"))
            .unwrap_or(false);

        if is_yaml {
            Self::from_yaml_str(&content)
        } else {
            Self::from_json_str(&content)
        }
    }

    pub fn from_yaml_str(content: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(content)?)
    }

    pub fn from_json_str(content: &str) -> Result<Self> {
        Ok(serde_json::from_str(content)?)
    }

    /// Check every setting without keeping the compiled result.
    pub fn validate(&self) -> Result<()> {
        self.build_policies().map(|_| ())
    }

    /// Compile and cross-check every setting into the walker's policies.
    pub fn build_policies(&self) -> Result<WalkPolicies> {
        if self.mask_token.is_empty() {
            return Err(RedactionError::config("mask_token must not be empty"));
        }
        if self.max_depth == 0 {
            return Err(RedactionError::config("max_depth must be at least 1"));
        }
        if self.allow_all_keys && !self.allowed_keys.is_empty() {
            return Err(RedactionError::config(
                "allowed_keys has no effect when allow_all_keys is set",
            ));
        }

        let blocked_keys = compile_all("blocked_key_patterns", &self.blocked_key_patterns)?;
        for key in &self.allowed_keys {
            if let Some(p) = blocked_keys.iter().find(|p| p.is_match(key)) {
                return Err(RedactionError::config(format!(
                    "allowed key {:?} is blocked by pattern {:?}",
                    key,
                    p.source()
                )));
            }
        }

        let catalog = PatternCatalog::from_sources(&self.blocked_values, &self.allowed_values)?;
        let digest = match &self.hash_key {
            Some(key) => HashDigest::with_key(self.hash_function, self.mask_token.clone(), key)?,
            None => HashDigest::new(self.hash_function, self.mask_token.clone()),
        };

        let keys = KeyPolicy::new(
            self.allow_all_keys,
            self.allowed_keys.iter().cloned(),
            self.ignored_keys.iter().cloned(),
            blocked_keys,
        );
        let values = ValuePolicy::new(
            catalog,
            digest,
            GroupRedactor::new(self.nested_groups, self.unnamed_patterns),
            self.sanitizers(),
        );

        Ok(WalkPolicies {
            keys,
            values,
            redact_all_types: self.redact_all_types,
            max_depth: self.max_depth,
        })
    }

    fn sanitizers(&self) -> Sanitizers {
        let mut enabled = Vec::new();
        if self.url_sanitization.enabled {
            enabled.push(Sanitizer::Url(UrlSanitizer::new(
                self.url_sanitization.attributes.clone(),
            )));
        }
        if self.db_sanitizer.sql.enabled {
            enabled.push(Sanitizer::Sql(SqlSanitizer::new(
                self.db_sanitizer.sql.attributes.clone(),
            )));
        }
        Sanitizers::new(enabled)
    }
}
