//! Compiled pattern catalog.
//!
//! Patterns are compiled once at construction and are immutable afterwards,
//! so a catalog can be shared read-only across concurrent redaction calls.

use crate::error::{RedactionError, Result};
use regex::Regex;
use regex_syntax::ast::{self, Ast};

/// A compiled regular expression together with its named capture groups.
#[derive(Debug, Clone)]
pub struct CompiledPattern {
    source: String,
    regex: Regex,
    /// Capture indices of the named groups, in declaration order.
    named_groups: Vec<usize>,
    /// For each capture index, the nearest enclosing named group.
    named_parents: Vec<Option<usize>>,
}

impl CompiledPattern {
    /// Compile a pattern. `field` and `index` only feed the error message.
    pub fn compile(source: &str, field: &'static str, index: usize) -> Result<Self> {
        let regex = Regex::new(source).map_err(|source| RedactionError::Pattern {
            field,
            index,
            source,
        })?;
        let named_groups = regex
            .capture_names()
            .enumerate()
            .filter_map(|(i, name)| name.map(|_| i))
            .collect();

        let mut named_parents = vec![None; regex.captures_len()];
        // `Regex::new` already accepted the source, so the parse only fails
        // on parser drift; every group is then treated as top-level.
        if let Ok(tree) = ast::parse::Parser::new().parse(source) {
            record_named_parents(&tree, None, &mut named_parents);
        }

        Ok(Self {
            source: source.to_string(),
            regex,
            named_groups,
            named_parents,
        })
    }

    /// The pattern text as configured.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// The underlying matcher.
    pub fn regex(&self) -> &Regex {
        &self.regex
    }

    /// Capture indices of every named group.
    pub fn named_groups(&self) -> &[usize] {
        &self.named_groups
    }

    /// The nearest named group that syntactically encloses capture `index`.
    pub fn named_parent(&self, index: usize) -> Option<usize> {
        self.named_parents.get(index).copied().flatten()
    }

    /// Whether named group `outer` encloses capture `inner` at any depth.
    pub fn encloses(&self, outer: usize, inner: usize) -> bool {
        let mut cur = self.named_parent(inner);
        while let Some(p) = cur {
            if p == outer {
                return true;
            }
            cur = self.named_parent(p);
        }
        false
    }

    /// Names of the named groups, in declaration order.
    pub fn group_names(&self) -> Vec<&str> {
        self.regex.capture_names().flatten().collect()
    }

    /// Whether this pattern can rewrite text (has at least one named group).
    pub fn has_named_groups(&self) -> bool {
        !self.named_groups.is_empty()
    }

    pub fn is_match(&self, text: &str) -> bool {
        self.regex.is_match(text)
    }

}

fn record_named_parents(node: &Ast, parent: Option<usize>, out: &mut [Option<usize>]) {
    match node {
        Ast::Group(group) => {
            let inner_parent = match &group.kind {
                ast::GroupKind::CaptureName { name, .. } => {
                    let index = name.index as usize;
                    if let Some(slot) = out.get_mut(index) {
                        *slot = parent;
                    }
                    Some(index)
                }
                ast::GroupKind::CaptureIndex(index) => {
                    if let Some(slot) = out.get_mut(*index as usize) {
                        *slot = parent;
                    }
                    parent
                }
                ast::GroupKind::NonCapturing(_) => parent,
            };
            record_named_parents(&group.ast, inner_parent, out);
        }
        Ast::Concat(concat) => {
            for child in &concat.asts {
                record_named_parents(child, parent, out);
            }
        }
        Ast::Alternation(alt) => {
            for child in &alt.asts {
                record_named_parents(child, parent, out);
            }
        }
        Ast::Repetition(rep) => record_named_parents(&rep.ast, parent, out),
        _ => {}
    }
}

/// Compile every source in order, failing on the first invalid one.
pub fn compile_all(field: &'static str, sources: &[String]) -> Result<Vec<CompiledPattern>> {
    sources
        .iter()
        .enumerate()
        .map(|(index, source)| CompiledPattern::compile(source, field, index))
        .collect()
}

/// Ordered blocked-value patterns plus their allowed-value exceptions.
#[derive(Debug, Clone, Default)]
pub struct PatternCatalog {
    blocked: Vec<CompiledPattern>,
    allowed: Vec<CompiledPattern>,
}

impl PatternCatalog {
    pub fn new(blocked: Vec<CompiledPattern>, allowed: Vec<CompiledPattern>) -> Self {
        Self { blocked, allowed }
    }

    /// Compile a catalog from configured sources.
    pub fn from_sources(blocked: &[String], allowed: &[String]) -> Result<Self> {
        Ok(Self::new(
            compile_all("blocked_values", blocked)?,
            compile_all("allowed_values", allowed)?,
        ))
    }

    pub fn blocked(&self) -> &[CompiledPattern] {
        &self.blocked
    }

    pub fn allowed(&self) -> &[CompiledPattern] {
        &self.allowed
    }

    pub fn is_empty(&self) -> bool {
        self.blocked.is_empty()
    }

    /// Whether a matched substring is excused by an allowed-value pattern.
    pub fn is_exempt(&self, matched: &str) -> bool {
        self.allowed.iter().any(|p| p.is_match(matched))
    }

    /// Whether `pattern` has at least one match in `value` that no
    /// allowed-value pattern excuses.
    pub fn matches_sensitive(&self, pattern: &CompiledPattern, value: &str) -> bool {
        pattern
            .regex()
            .find_iter(value)
            .any(|m| !self.is_exempt(m.as_str()))
    }

    /// Index of the first blocked pattern that finds sensitive content.
    pub fn first_sensitive(&self, value: &str) -> Option<usize> {
        self.blocked
            .iter()
            .position(|p| self.matches_sensitive(p, value))
    }
}
