//! Fuzz target for redaction config parsing and validation.
//!
//! Tests that YAML and JSON config parsing, regex compilation, and hash key
//! decoding handle arbitrary input without panicking.

#![no_main]

use libfuzzer_sys::fuzz_target;
use tr_redact::RedactionConfig;

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };
    if let Ok(config) = RedactionConfig::from_json_str(text) {
        let _ = config.validate();
    }
    if let Ok(config) = RedactionConfig::from_yaml_str(text) {
        let _ = config.validate();
    }
});
