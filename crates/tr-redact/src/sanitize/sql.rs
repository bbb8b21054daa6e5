//! SQL statement obfuscation.
//!
//! Replaces string, numeric, and hex literals with `?` while keeping keywords,
//! identifiers (quoted or not), bind placeholders, and punctuation intact.

use super::Sanitized;
use crate::error::SanitizeError;

/// Attributes claimed when none are configured.
pub const DEFAULT_SQL_ATTRIBUTES: &[&str] = &["db.statement", "db.query.text"];

/// Replacement for every literal.
pub const SQL_PLACEHOLDER: &str = "?";

#[derive(Debug, Clone)]
pub struct SqlSanitizer {
    attributes: Vec<String>,
}

impl SqlSanitizer {
    /// An empty attribute list falls back to [`DEFAULT_SQL_ATTRIBUTES`].
    pub fn new(attributes: Vec<String>) -> Self {
        let attributes = if attributes.is_empty() {
            DEFAULT_SQL_ATTRIBUTES.iter().map(|s| s.to_string()).collect()
        } else {
            attributes
        };
        Self { attributes }
    }

    pub fn attributes(&self) -> &[String] {
        &self.attributes
    }

    pub fn sanitize(&self, value: &str) -> Result<Sanitized, SanitizeError> {
        let bytes = value.as_bytes();
        let len = bytes.len();
        let mut out = String::with_capacity(len);
        let mut last = 0;
        let mut i = 0;

        // Token boundaries are always ASCII bytes, so every slice below falls
        // on a char boundary.
        while i < len {
            let b = bytes[i];
            match b {
                b'\'' => {
                    let end = closing_quote(bytes, i, b'\'', true)?;
                    out.push_str(&value[last..i]);
                    out.push_str(SQL_PLACEHOLDER);
                    i = end + 1;
                    last = i;
                }
                b'"' | b'`' => {
                    i = closing_quote(bytes, i, b, false)? + 1;
                }
                b'$' => {
                    i += 1;
                    while i < len && bytes[i].is_ascii_digit() {
                        i += 1;
                    }
                }
                b'0'..=b'9' => {
                    let start = i;
                    if b == b'0' && i + 2 < len && matches!(bytes[i + 1], b'x' | b'X') {
                        i += 2;
                        while i < len && bytes[i].is_ascii_hexdigit() {
                            i += 1;
                        }
                    } else {
                        while i < len && (bytes[i].is_ascii_digit() || bytes[i] == b'.') {
                            i += 1;
                        }
                    }
                    out.push_str(&value[last..start]);
                    out.push_str(SQL_PLACEHOLDER);
                    last = i;
                }
                _ if is_ident_byte(b) => {
                    while i < len && (is_ident_byte(bytes[i]) || bytes[i].is_ascii_digit()) {
                        i += 1;
                    }
                }
                _ => i += 1,
            }
        }
        out.push_str(&value[last..]);

        Ok(Sanitized::compare(value, out))
    }
}

fn is_ident_byte(b: u8) -> bool {
    b.is_ascii_alphabetic() || b == b'_' || b >= 0x80
}

/// Index of the quote closing the one at `open`. Doubled quotes are escapes;
/// backslash escapes are honoured for string literals.
fn closing_quote(bytes: &[u8], open: usize, quote: u8, backslash: bool) -> Result<usize, SanitizeError> {
    let mut j = open + 1;
    while j < bytes.len() {
        let b = bytes[j];
        if backslash && b == b'\\' {
            j += 2;
            continue;
        }
        if b == quote {
            if j + 1 < bytes.len() && bytes[j + 1] == quote {
                j += 2;
                continue;
            }
            return Ok(j);
        }
        j += 1;
    }
    Err(SanitizeError::UnterminatedQuote { offset: open })
}
