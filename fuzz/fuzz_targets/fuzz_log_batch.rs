//! Fuzz target for redacting arbitrary log batches.
//!
//! Deeply nested bodies must stop at the depth limit instead of overflowing,
//! and a second pass over a masked batch must not find anything new to mask.

#![no_main]

use libfuzzer_sys::fuzz_target;
use tr_redact::model::Logs;
use tr_redact::{RedactionConfig, RedactionEngine};

fuzz_target!(|data: &[u8]| {
    let Ok(mut logs) = serde_json::from_slice::<Logs>(data) else {
        return;
    };
    let config = RedactionConfig {
        allow_all_keys: true,
        blocked_key_patterns: vec![".*password.*".to_string()],
        blocked_values: vec![r"\b(?P<mask>\d{3}-\d{2}-)(?:\d{4})\b".to_string()],
        max_depth: 16,
        ..RedactionConfig::default()
    };
    let Ok(engine) = RedactionEngine::new(&config) else {
        return;
    };

    engine.redact_logs(&mut logs);
    let second = engine.redact_logs(&mut logs);
    assert_eq!(second.values_masked, 0);
    assert_eq!(second.keys_removed, 0);
});
