//! Fuzz target for named-group substitution.
//!
//! Arbitrary text against a fixed set of patterns under both nested-group
//! policies. Substitution must never panic, and text with no match must come
//! back unchanged.

#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use tr_redact::{CompiledPattern, GroupRedactor, NestedGroupPolicy, UnnamedPatterns};

const PATTERNS: &[&str] = &[
    r"\b(?P<mask>\d{3}-\d{2}-)(?:\d{4})\b",
    r"(?P<mask>[a-zA-Z0-9\._%+-]+)(?:@[a-zA-Z0-9\.-]+\.[a-zA-Z]{2,})",
    r"(?P<outer>\d{3}-(?P<inner>\d{2})-)\d{4}",
    r"(?:(?P<a>x+)|(?P<b>y+))z",
    r"(?P<empty>)q",
    r"4[0-9]{12}(?:[0-9]{3})?",
];

#[derive(Debug, Arbitrary)]
struct Input {
    pattern: u8,
    innermost: bool,
    mask_match: bool,
    text: String,
}

fuzz_target!(|input: Input| {
    let source = PATTERNS[input.pattern as usize % PATTERNS.len()];
    let Ok(pattern) = CompiledPattern::compile(source, "blocked_values", 0) else {
        return;
    };
    let redactor = GroupRedactor::new(
        if input.innermost {
            NestedGroupPolicy::Innermost
        } else {
            NestedGroupPolicy::Outermost
        },
        if input.mask_match {
            UnnamedPatterns::MaskMatch
        } else {
            UnnamedPatterns::DetectOnly
        },
    );

    let out = redactor.redact(&input.text, &pattern, |_| true, |s| format!("<{}>", s.len()));
    if !pattern.is_match(&input.text) {
        assert_eq!(out, input.text);
    }
});
