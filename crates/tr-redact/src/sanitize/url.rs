//! URL sanitization.
//!
//! Keeps the shape of a URL (scheme, host, path layout, query keys) while
//! replacing identifier-like path segments and every query value with `*`.
//! Userinfo and fragments are dropped.

use super::Sanitized;
use crate::error::SanitizeError;
use once_cell::sync::Lazy;
use regex::Regex;

/// Attributes claimed when none are configured.
pub const DEFAULT_URL_ATTRIBUTES: &[&str] = &["http.url", "url.full", "http.target", "url.path"];

/// Replacement for identifier segments and query values.
pub const URL_PLACEHOLDER: &str = "*";

static RE_UUID: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[0-9a-fA-F]{8}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{12}$")
        .unwrap()
});

static RE_HTTP_METHOD: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(GET|HEAD|POST|PUT|PATCH|DELETE|OPTIONS|TRACE|CONNECT)$").unwrap());

#[derive(Debug, Clone)]
pub struct UrlSanitizer {
    attributes: Vec<String>,
}

impl UrlSanitizer {
    /// An empty attribute list falls back to [`DEFAULT_URL_ATTRIBUTES`].
    pub fn new(attributes: Vec<String>) -> Self {
        let attributes = if attributes.is_empty() {
            DEFAULT_URL_ATTRIBUTES.iter().map(|s| s.to_string()).collect()
        } else {
            attributes
        };
        Self { attributes }
    }

    pub fn attributes(&self) -> &[String] {
        &self.attributes
    }

    pub fn sanitize(&self, value: &str) -> Result<Sanitized, SanitizeError> {
        let unrecognised = SanitizeError::Unrecognised { kind: "url" };

        let (prefix, rest) = match value.find("://") {
            Some(idx) => {
                let scheme = &value[..idx];
                let after = &value[idx + 3..];
                let authority_end = after.find(['/', '?', '#']).unwrap_or(after.len());
                let authority = &after[..authority_end];
                // Drop userinfo, keep host and port.
                let host = authority.rsplit('@').next().unwrap_or(authority);
                if scheme.is_empty() || host.is_empty() {
                    return Err(unrecognised);
                }
                (format!("{}://{}", scheme, host), &after[authority_end..])
            }
            None if value.starts_with('/') => (String::new(), value),
            None => return Err(unrecognised),
        };

        let without_fragment = rest.split('#').next().unwrap_or("");
        let (path, query) = match without_fragment.split_once('?') {
            Some((path, query)) => (path, Some(query)),
            None => (without_fragment, None),
        };

        let mut out = prefix;
        out.push_str(&sanitize_path(path));
        if let Some(query) = query {
            out.push('?');
            out.push_str(&sanitize_query(query));
        }

        Ok(Sanitized::compare(value, out))
    }

    /// Sanitize a span name of the form `METHOD /path`. Names without an HTTP
    /// method prefix are reported as unrecognised.
    pub fn sanitize_span_name(&self, name: &str) -> Result<Sanitized, SanitizeError> {
        let Some((method, target)) = name.split_once(' ') else {
            return Err(SanitizeError::Unrecognised { kind: "url" });
        };
        if !RE_HTTP_METHOD.is_match(method) {
            return Err(SanitizeError::Unrecognised { kind: "url" });
        }
        let target = self.sanitize(target.trim())?;
        Ok(Sanitized::compare(name, format!("{} {}", method, target.value)))
    }
}

fn sanitize_path(path: &str) -> String {
    path.split('/')
        .map(|segment| {
            if is_identifier(segment) {
                URL_PLACEHOLDER
            } else {
                segment
            }
        })
        .collect::<Vec<_>>()
        .join("/")
}

fn sanitize_query(query: &str) -> String {
    query
        .split('&')
        .map(|pair| match pair.split_once('=') {
            Some((key, _)) => format!("{}={}", key, URL_PLACEHOLDER),
            None => pair.to_string(),
        })
        .collect::<Vec<_>>()
        .join("&")
}

/// Numeric ids, UUIDs, and digit-bearing tokens of four or more characters.
/// Short tokens such as `v1` are treated as route literals.
fn is_identifier(segment: &str) -> bool {
    if segment.is_empty() {
        return false;
    }
    if segment.bytes().all(|b| b.is_ascii_digit()) || RE_UUID.is_match(segment) {
        return true;
    }
    segment.len() >= 4 && segment.bytes().any(|b| b.is_ascii_digit())
}
