//! Fuzz target for the URL and SQL sanitizers.
//!
//! Both scanners slice the input by byte offsets; arbitrary UTF-8 must never
//! land a slice inside a multi-byte character.

#![no_main]

use libfuzzer_sys::fuzz_target;
use tr_redact::sanitize::{SqlSanitizer, UrlSanitizer};

fuzz_target!(|data: &str| {
    let _ = UrlSanitizer::new(Vec::new()).sanitize(data);
    let _ = UrlSanitizer::new(Vec::new()).sanitize_span_name(data);
    let _ = SqlSanitizer::new(Vec::new()).sanitize(data);
});
