//! Attribute key classification.

use crate::pattern::CompiledPattern;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Decision for one attribute key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeyDecision {
    /// Keep the entry and inspect its value.
    Allow,
    /// Remove the entry without reading its value.
    Block,
    /// Keep the entry and never inspect it.
    Ignore,
}

impl std::fmt::Display for KeyDecision {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            KeyDecision::Allow => "allow",
            KeyDecision::Block => "block",
            KeyDecision::Ignore => "ignore",
        };
        write!(f, "{}", s)
    }
}

/// Key allow/block/ignore rules.
///
/// Precedence is fixed: ignored keys short-circuit, then the allow-list (unless
/// `allow_all`), then the blocked key patterns.
#[derive(Debug, Clone, Default)]
pub struct KeyPolicy {
    allow_all: bool,
    allowed: HashSet<String>,
    ignored: HashSet<String>,
    blocked_patterns: Vec<CompiledPattern>,
}

impl KeyPolicy {
    pub fn new(
        allow_all: bool,
        allowed: impl IntoIterator<Item = String>,
        ignored: impl IntoIterator<Item = String>,
        blocked_patterns: Vec<CompiledPattern>,
    ) -> Self {
        Self {
            allow_all,
            allowed: allowed.into_iter().collect(),
            ignored: ignored.into_iter().collect(),
            blocked_patterns,
        }
    }

    /// A policy that allows every key and blocks nothing.
    pub fn allow_all() -> Self {
        Self {
            allow_all: true,
            ..Self::default()
        }
    }

    pub fn classify(&self, key: &str) -> KeyDecision {
        if self.ignored.contains(key) {
            return KeyDecision::Ignore;
        }
        if !self.allow_all && !self.allowed.contains(key) {
            return KeyDecision::Block;
        }
        if self.blocked_patterns.iter().any(|p| p.is_match(key)) {
            return KeyDecision::Block;
        }
        KeyDecision::Allow
    }

    pub fn allows_all(&self) -> bool {
        self.allow_all
    }

    pub fn blocked_patterns(&self) -> &[CompiledPattern] {
        &self.blocked_patterns
    }
}
