//! Selective capture-group substitution.
//!
//! A blocked-value pattern describes the full shape of sensitive content, but
//! only its named groups are rewritten. Text outside matches, anonymous
//! groups, and the unnamed parts of each match are copied through verbatim:
//!
//! ```
//! use tr_redact::groups::redact_groups;
//! use tr_redact::pattern::CompiledPattern;
//!
//! let ssn = CompiledPattern::compile(r"\b(?P<mask>\d{3}-\d{2}-)(?:\d{4})\b", "example", 0).unwrap();
//! assert_eq!(redact_groups("123-45-6789", &ssn, |_| "***".to_string()), "***6789");
//! ```
//!
//! Matching uses the `regex` crate's leftmost-first, non-overlapping
//! iteration. A match that ends where the next could start is not rescanned,
//! so `(?P<first>\w+)\s+(?P<last>\w+)` over `"a b c d e"` pairs `a b` and
//! `c d` and leaves `e` alone.

use crate::pattern::CompiledPattern;
use regex::Captures;
use serde::{Deserialize, Serialize};

/// Which named groups are rewritten when named groups nest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NestedGroupPolicy {
    /// Replace the outer group; its replacement absorbs the inner groups.
    #[default]
    Outermost,
    /// Replace only groups that contain no other participating named group.
    Innermost,
}

impl NestedGroupPolicy {
    pub fn parse_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "outermost" | "outer" => Some(NestedGroupPolicy::Outermost),
            "innermost" | "inner" => Some(NestedGroupPolicy::Innermost),
            _ => None,
        }
    }
}

/// How a blocked pattern without named groups is treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnnamedPatterns {
    /// The pattern flags sensitive values but never rewrites them.
    #[default]
    DetectOnly,
    /// The whole match is replaced.
    MaskMatch,
}

/// Substitution settings shared by every blocked pattern of an engine.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GroupRedactor {
    pub nested: NestedGroupPolicy,
    pub unnamed: UnnamedPatterns,
}

impl GroupRedactor {
    pub fn new(nested: NestedGroupPolicy, unnamed: UnnamedPatterns) -> Self {
        Self { nested, unnamed }
    }

    /// Whether `pattern` can change text under these settings.
    pub fn rewrites(&self, pattern: &CompiledPattern) -> bool {
        pattern.has_named_groups() || self.unnamed == UnnamedPatterns::MaskMatch
    }

    /// Rewrite every match of `pattern` in `text` for which `accept` returns
    /// true. Rejected matches are copied verbatim.
    pub fn redact<A, F>(
        &self,
        text: &str,
        pattern: &CompiledPattern,
        mut accept: A,
        mut transform: F,
    ) -> String
    where
        A: FnMut(&str) -> bool,
        F: FnMut(&str) -> String,
    {
        if text.is_empty() || !self.rewrites(pattern) {
            return text.to_string();
        }
        let whole_match = !pattern.has_named_groups();

        let mut out = String::with_capacity(text.len());
        let mut last = 0;
        for caps in pattern.regex().captures_iter(text) {
            let Some(m) = caps.get(0) else { continue };
            if !accept(m.as_str()) {
                continue;
            }

            let spans = if whole_match {
                vec![(m.start(), m.end())]
            } else {
                self.select_spans(&caps, pattern)
            };

            for (start, end) in spans {
                // A group repeated inside a quantifier can report a span
                // overlapping one already written.
                if start < last {
                    continue;
                }
                out.push_str(&text[last..start]);
                out.push_str(&transform(&text[start..end]));
                last = end;
            }
        }
        out.push_str(&text[last..]);
        out
    }

    /// Byte ranges to replace for one match, in text order.
    ///
    /// Nesting is decided by the pattern's group structure, so a zero-width
    /// group that merely touches a sibling's boundary is never swallowed.
    fn select_spans(
        &self,
        caps: &Captures<'_>,
        pattern: &CompiledPattern,
    ) -> Vec<(usize, usize)> {
        // Groups in a non-taken alternative branch do not participate.
        let present: Vec<(usize, (usize, usize))> = pattern
            .named_groups()
            .iter()
            .filter_map(|&i| caps.get(i).map(|g| (i, (g.start(), g.end()))))
            .collect();

        let contains = |outer: (usize, usize), inner: (usize, usize)| {
            outer.0 <= inner.0 && inner.1 <= outer.1
        };

        let mut spans: Vec<(usize, usize)> = present
            .iter()
            .filter(|&&(index, span)| {
                present.iter().all(|&(other, other_span)| match self.nested {
                    NestedGroupPolicy::Outermost => {
                        !(pattern.encloses(other, index) && contains(other_span, span))
                    }
                    NestedGroupPolicy::Innermost => {
                        !(pattern.encloses(index, other) && contains(span, other_span))
                    }
                })
            })
            .map(|&(_, span)| span)
            .collect();
        spans.sort();
        spans
    }
}

/// Rewrite every named group of every match with the default settings.
pub fn redact_groups<F>(text: &str, pattern: &CompiledPattern, transform: F) -> String
where
    F: FnMut(&str) -> String,
{
    GroupRedactor::default().redact(text, pattern, |_| true, transform)
}
