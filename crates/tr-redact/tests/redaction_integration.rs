//! Integration tests for tr-redact.
//!
//! These tests verify:
//! - End-to-end redaction over traces, logs, and metrics
//! - Key precedence and tree shape preservation
//! - Hash determinism and correlation across shapes
//! - Sanitizers owning their keys without double redaction

use tr_redact::model::{DataPoint, LogRecord, Logs, Metric, MetricKind, Metrics, Span, Traces};
use tr_redact::{
    AttributeMap, AttributeValue, HashFunction, RedactionConfig, RedactionEngine, SpanKind,
    SummaryVerbosity,
};

const SSN: &str = r"\b(?P<mask>\d{3}-\d{2}-)(?:\d{4})\b";
const EMAIL: &str = r"(?P<mask>[a-zA-Z0-9\._%+-]+)(?:@[a-zA-Z0-9\.-]+\.[a-zA-Z]{2,})";
const CARD: &str = r"\b(?:4[0-9]{3})[- ]?(?P<mid>[0-9]{4}[- ]?[0-9]{4})[- ]?(?:[0-9]{4})\b";

/// Plaintext that must never survive redaction.
const CANARIES: &[&str] = &["123-45-", "987-65-", "alice.smith", "4111-1111"];

fn config() -> RedactionConfig {
    RedactionConfig {
        allow_all_keys: true,
        blocked_key_patterns: vec![".*password.*".to_string(), ".*token.*".to_string()],
        blocked_values: vec![SSN.to_string(), EMAIL.to_string(), CARD.to_string()],
        mask_token: "***".to_string(),
        summary: SummaryVerbosity::Debug,
        ..RedactionConfig::default()
    }
}

fn str_of<'a>(map: &'a AttributeMap, key: &str) -> Option<&'a str> {
    map.get(key).and_then(AttributeValue::as_str)
}

fn assert_no_canary(json: &str) {
    for canary in CANARIES {
        assert!(!json.contains(canary), "canary {:?} leaked in {}", canary, json);
    }
}

#[test]
fn test_ssn_masked_end_to_end() {
    let engine = RedactionEngine::new(&RedactionConfig {
        allow_all_keys: true,
        blocked_values: vec![SSN.to_string()],
        mask_token: "***".to_string(),
        ..RedactionConfig::default()
    })
    .unwrap();

    let mut traces = Traces::single(
        AttributeMap::new(),
        vec![Span::new("op", SpanKind::Internal)
            .with_attributes(AttributeMap::new().with("ssn_number", "123-45-6789"))],
    );
    let summary = engine.redact_traces(&mut traces);

    let span = traces.spans().next().unwrap();
    assert_eq!(str_of(&span.attributes, "ssn_number"), Some("***6789"));
    assert_eq!(summary.values_masked, 1);
}

#[test]
fn test_password_key_removed_end_to_end() {
    let engine = RedactionEngine::new(&RedactionConfig {
        allow_all_keys: true,
        blocked_key_patterns: vec![".*password.*".to_string()],
        // Would match the value if it were ever inspected.
        blocked_values: vec!["(?P<all>secret.*)".to_string()],
        ..RedactionConfig::default()
    })
    .unwrap();

    let mut attributes = AttributeMap::new().with("password", "secret123");
    let summary = engine.redact_attributes(&mut attributes);

    assert!(attributes.is_empty());
    assert_eq!(summary.keys_removed, 1);
    assert_eq!(summary.values_masked, 0);
}

#[test]
fn test_ignored_key_never_inspected() {
    let mut cfg = config();
    cfg.ignored_keys = vec!["raw.ssn".to_string(), "session_token".to_string()];
    let engine = RedactionEngine::new(&cfg).unwrap();

    let mut attributes = AttributeMap::new()
        .with("raw.ssn", "123-45-6789")
        .with("session_token", "abc");
    let summary = engine.redact_attributes(&mut attributes);

    assert_eq!(str_of(&attributes, "raw.ssn"), Some("123-45-6789"));
    assert_eq!(str_of(&attributes, "session_token"), Some("abc"));
    assert_eq!(summary.keys_ignored, 2);
    assert_eq!(summary.total_changes(), 0);
}

#[test]
fn test_allow_list_mode() {
    let engine = RedactionEngine::new(&RedactionConfig {
        allowed_keys: vec!["http.method".to_string(), "user.email".to_string()],
        blocked_values: vec![EMAIL.to_string()],
        ..RedactionConfig::default()
    })
    .unwrap();

    let mut attributes = AttributeMap::new()
        .with("http.method", "GET")
        .with("user.email", "alice.smith@example.com")
        .with("user.name", "alice");
    let summary = engine.redact_attributes(&mut attributes);

    assert_eq!(attributes.keys().collect::<Vec<_>>(), vec!["http.method", "user.email"]);
    assert_eq!(str_of(&attributes, "user.email"), Some("****@example.com"));
    assert_eq!(summary.keys_removed, 1);
    assert!(summary.removed_keys.contains("user.name"));
}

#[test]
fn test_shape_preserved_and_single_entry_removed() {
    let engine = RedactionEngine::new(&config()).unwrap();
    let mut attributes = AttributeMap::new()
        .with("z", "1")
        .with("db_password", "x")
        .with("a", "2")
        .with("m", "3");
    engine.redact_attributes(&mut attributes);
    assert_eq!(attributes.keys().collect::<Vec<_>>(), vec!["z", "a", "m"]);
}

#[test]
fn test_all_shapes_no_canary_leak() {
    let engine = RedactionEngine::new(&config()).unwrap();

    let mut traces = Traces::single(
        AttributeMap::new().with("owner", "alice.smith@example.com"),
        vec![Span::new("checkout", SpanKind::Server).with_attributes(
            AttributeMap::new()
                .with("card", "4111-1111-1111-1111")
                .with("api_token", "tok_live"),
        )],
    );
    let mut logs = Logs::single(
        AttributeMap::new(),
        vec![
            LogRecord::new("user 123-45-6789 logged in as alice.smith@example.com"),
            LogRecord::new(
                AttributeMap::new().with(
                    "user",
                    AttributeMap::new()
                        .with("ssn", "987-65-4321")
                        .with("emails", vec![AttributeValue::from("alice.smith@x.io")]),
                ),
            ),
        ],
    );
    let mut metrics = Metrics::single(
        AttributeMap::new(),
        vec![Metric {
            name: "logins".to_string(),
            kind: MetricKind::Gauge,
            data_points: vec![DataPoint::new(AttributeMap::new().with("user", "alice.smith@example.com"))],
            ..Metric::default()
        }],
    );

    let t = engine.redact_traces(&mut traces);
    let l = engine.redact_logs(&mut logs);
    let m = engine.redact_metrics(&mut metrics);

    assert_no_canary(&serde_json::to_string(&traces).unwrap());
    assert_no_canary(&serde_json::to_string(&logs).unwrap());
    assert_no_canary(&serde_json::to_string(&metrics).unwrap());

    let span = traces.spans().next().unwrap();
    assert_eq!(str_of(&span.attributes, "card"), Some("4111-***-1111"));
    assert!(!span.attributes.contains_key("api_token"));
    assert_eq!(t.keys_removed, 1);
    assert_eq!(t.values_masked, 2);

    let body = logs.records().next().unwrap().body.as_ref().unwrap();
    assert_eq!(body.as_str(), Some("user ***6789 logged in as ***@example.com"));
    assert_eq!(l.values_masked, 3);
    assert_eq!(m.values_masked, 1);

    let mut total = t.clone();
    total.merge(l);
    total.merge(m);
    assert_eq!(total.values_masked, 6);
}

#[test]
fn test_hash_correlates_across_shapes() {
    let engine = RedactionEngine::new(&RedactionConfig {
        hash_function: HashFunction::Sha3,
        ..config()
    })
    .unwrap();

    let mut a = AttributeMap::new().with("user.email", "alice.smith@example.com");
    let mut logs = Logs::single(
        AttributeMap::new(),
        vec![LogRecord::new("contact alice.smith@other.org")],
    );
    let mut c = AttributeMap::new().with("user.email", "bob@example.com");

    let summary = engine.redact_attributes(&mut a);
    engine.redact_logs(&mut logs);
    engine.redact_attributes(&mut c);

    let hashed = str_of(&a, "user.email").unwrap();
    let (digest, domain) = hashed.split_once('@').unwrap();
    assert_eq!(digest.len(), 64);
    assert_eq!(domain, "example.com");

    let body = logs.records().next().unwrap().body.as_ref().unwrap().as_str().unwrap();
    assert_eq!(body, format!("contact {}@other.org", digest));
    assert!(!str_of(&c, "user.email").unwrap().starts_with(digest));
    assert_eq!(summary.values_hashed, 1);
}

#[test]
fn test_keyed_hash_differs_from_plain() {
    let plain = RedactionEngine::new(&RedactionConfig {
        hash_function: HashFunction::Sha1,
        ..config()
    })
    .unwrap();
    let keyed = RedactionEngine::new(&RedactionConfig {
        hash_function: HashFunction::Sha1,
        hash_key: Some("AAECAwQFBgcICQoLDA0ODw==".to_string()),
        ..config()
    })
    .unwrap();

    let mut a = AttributeMap::new().with("ssn", "123-45-6789");
    let mut b = a.clone();
    plain.redact_attributes(&mut a);
    keyed.redact_attributes(&mut b);

    let a = str_of(&a, "ssn").unwrap();
    let b = str_of(&b, "ssn").unwrap();
    assert_ne!(a, b);
    assert!(a.ends_with("6789") && b.ends_with("6789"));
    assert_eq!(a.len(), 40 + 4);
}

#[test]
fn test_db_sanitizer_precedence() {
    let mut cfg = config();
    cfg.db_sanitizer.sql.enabled = true;
    let engine = RedactionEngine::new(&cfg).unwrap();

    let mut attributes = AttributeMap::new()
        .with("db.statement", "SELECT * FROM users WHERE ssn = '123-45-6789' AND id = 7")
        .with("note", "ssn 123-45-6789");
    let summary = engine.redact_attributes(&mut attributes);

    assert_eq!(
        str_of(&attributes, "db.statement"),
        Some("SELECT * FROM users WHERE ssn = ? AND id = ?")
    );
    assert_eq!(str_of(&attributes, "note"), Some("ssn ***6789"));
    assert_eq!(summary.values_sanitized, 1);
    assert_eq!(summary.values_masked, 1);
}

#[test]
fn test_url_sanitizer_attributes_and_span_names() {
    let mut cfg = config();
    cfg.url_sanitization.enabled = true;
    let engine = RedactionEngine::new(&cfg).unwrap();

    let mut traces = Traces::single(
        AttributeMap::new(),
        vec![Span::new("GET /api/v1/users/123456", SpanKind::Client).with_attributes(
            AttributeMap::new()
                .with("http.url", "https://user:pw@shop.example.com/orders/98765?coupon=X1#top")
                .with("http.method", "GET"),
        )],
    );
    let summary = engine.redact_traces(&mut traces);

    let span = traces.spans().next().unwrap();
    assert_eq!(span.name, "GET /api/v1/users/*");
    assert_eq!(
        str_of(&span.attributes, "http.url"),
        Some("https://shop.example.com/orders/*?coupon=*")
    );
    assert_eq!(summary.values_sanitized, 2);
    assert!(summary.sanitized_keys.contains("span.name"));
}

#[test]
fn test_redact_all_types() {
    let mut cfg = config();
    cfg.blocked_values = vec![r"^(?P<year>\d{4})\d{4}$".to_string()];
    cfg.redact_all_types = true;
    let engine = RedactionEngine::new(&cfg).unwrap();

    let mut attributes = AttributeMap::new()
        .with("birth_date", 19800101i64)
        .with("retries", 3i64)
        .with("ok", true);
    let summary = engine.redact_attributes(&mut attributes);

    assert_eq!(str_of(&attributes, "birth_date"), Some("***0101"));
    assert_eq!(attributes.get("retries"), Some(&AttributeValue::Int(3)));
    assert_eq!(attributes.get("ok"), Some(&AttributeValue::Bool(true)));
    assert_eq!(summary.values_masked, 1);
}

#[test]
fn test_rerun_is_noop_for_masked_values() {
    let engine = RedactionEngine::new(&config()).unwrap();
    let mut attributes = AttributeMap::new()
        .with("ssn", "123-45-6789")
        .with("email", "alice.smith@example.com");
    engine.redact_attributes(&mut attributes);
    let once = attributes.clone();

    let summary = engine.redact_attributes(&mut attributes);
    assert_eq!(attributes, once);
    assert_eq!(summary.total_changes(), 0);
}

#[test]
fn test_batch_from_json_round_trip() {
    let engine = RedactionEngine::new(&config()).unwrap();
    let json = r#"{"resource_logs":[{
        "resource":{"attributes":{"service.name":"auth"}},
        "scope_logs":[{"log_records":[
            {"severity_text":"INFO","body":{"event":"login","ssn":"123-45-6789"},
             "attributes":{"password":"hunter2","attempt":2}}
        ]}]
    }]}"#;
    let mut logs: Logs = serde_json::from_str(json).unwrap();
    let summary = engine.redact_logs(&mut logs);

    let out = serde_json::to_value(&logs).unwrap();
    let record = &out["resource_logs"][0]["scope_logs"][0]["log_records"][0];
    assert_eq!(record["body"]["ssn"], "***6789");
    assert_eq!(record["body"]["event"], "login");
    assert_eq!(record["attributes"]["attempt"], 2);
    assert!(record["attributes"].get("password").is_none());
    assert_eq!(record["severity_text"], "INFO");
    assert_eq!(summary.keys_removed, 1);
}
