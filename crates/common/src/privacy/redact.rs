//! Credential redaction for API payloads
//!
//! Two passes: structured key redaction over a JSON value, then a regex
//! safety net over the serialized text that catches credentials embedded in
//! URLs, nested strings or payloads that were never valid JSON.

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

/// Replacement written in place of a sensitive value.
pub const REDACTED: &str = "[REDACTED]";

/// Keys whose values never leave the process unredacted (compared
/// case-insensitively).
pub const SENSITIVE_KEYS: &[&str] = &[
    "ticket",
    "password",
    "api_key",
    "token",
    "secret",
    "webhook_secret",
    "companysn",
    "company_sn",
    "authorization",
    "auth",
    "api_token",
];

const KEY_ALTERNATION: &str =
    "ticket|password|api_key|token|secret|webhook_secret|companysn|company_sn|authorization|auth|api_token";

static SAFETY_NET: Lazy<Vec<(Regex, String)>> = Lazy::new(|| {
    let patterns = [
        // "key": "value"
        (format!(r#"(?i)"({KEY_ALTERNATION})"\s*:\s*"(?:[^"\\]|\\.)*""#), format!(r#""${{1}}":"{REDACTED}""#)),
        // "key": 123 / true / false
        (format!(r#"(?i)"({KEY_ALTERNATION})"\s*:\s*(?:-?\d+(?:\.\d+)?|true|false)"#), format!(r#""${{1}}":"{REDACTED}""#)),
        // key=value in query strings
        (format!(r"(?i)\b({KEY_ALTERNATION})=[^&\s\x22']*"), format!("${{1}}={REDACTED}")),
    ];
    patterns
        .into_iter()
        .filter_map(|(pattern, replacement)| Regex::new(&pattern).ok().map(|re| (re, replacement)))
        .collect()
});

/// Whether `key` names a credential-like field.
pub fn is_sensitive_key(key: &str) -> bool {
    let lowered = key.to_ascii_lowercase();
    SENSITIVE_KEYS.contains(&lowered.as_str())
}

/// Copy of `value` with every sensitive key's value replaced, at any depth.
pub fn redact_value(value: &Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(
            map.iter()
                .map(|(key, inner)| {
                    let redacted = if is_sensitive_key(key) {
                        Value::String(REDACTED.to_string())
                    } else {
                        redact_value(inner)
                    };
                    (key.clone(), redacted)
                })
                .collect(),
        ),
        Value::Array(items) => Value::Array(items.iter().map(redact_value).collect()),
        other => other.clone(),
    }
}

/// Apply the regex safety net to arbitrary text.
pub fn redact_text(text: &str) -> String {
    SAFETY_NET.iter().fold(text.to_string(), |acc, (re, replacement)| {
        re.replace_all(&acc, replacement.as_str()).into_owned()
    })
}

/// Structured redaction followed by the safety net, serialized for storage.
pub fn redacted_json(value: &Value) -> String {
    let structured = redact_value(value);
    let text = serde_json::to_string(&structured).unwrap_or_default();
    redact_text(&text)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn nested_keys_are_redacted_case_insensitively() {
        let body = json!({
            "args": {"CompanySN": "SN-991", "Ticket": "abc", "EmailAddress_List": "a@b.c"},
            "list": [{"api_token": "t1"}, {"name": "ok"}]
        });
        let redacted = redact_value(&body);
        assert_eq!(redacted["args"]["CompanySN"], REDACTED);
        assert_eq!(redacted["args"]["Ticket"], REDACTED);
        assert_eq!(redacted["args"]["EmailAddress_List"], "a@b.c");
        assert_eq!(redacted["list"][0]["api_token"], REDACTED);
        assert_eq!(redacted["list"][1]["name"], "ok");
    }

    #[test]
    fn query_string_credentials_are_masked() {
        let url = "https://cloud3.evosus.com/api/method/Customer_Search?CompanySN=SN-991&ticket=s3cr3t";
        let redacted = redact_text(url);
        assert!(!redacted.contains("SN-991"));
        assert!(!redacted.contains("s3cr3t"));
        assert!(redacted.contains("CompanySN=[REDACTED]"));
        assert!(redacted.contains("ticket=[REDACTED]"));
    }

    #[test]
    fn safety_net_masks_scalar_values_in_text() {
        let text = r#"{"secret": 42, "Password" : "hunter2", "qty": 3}"#;
        let redacted = redact_text(text);
        assert!(!redacted.contains("42"));
        assert!(!redacted.contains("hunter2"));
        assert!(redacted.contains(r#""secret":"[REDACTED]""#));
        assert!(redacted.contains(r#""qty": 3"#));
    }

    #[test]
    fn redacted_json_never_contains_credential_values() {
        let body = json!({"ticket": "live-ticket-value", "args": {"ItemCode": "WIDGET-1"}});
        let stored = redacted_json(&body);
        assert!(!stored.contains("live-ticket-value"));
        assert!(stored.contains("WIDGET-1"));
    }

    #[test]
    fn unrelated_keys_containing_sensitive_words_survive() {
        assert!(!is_sensitive_key("author"));
        assert!(!is_sensitive_key("token_count"));
        assert!(is_sensitive_key("AUTH"));
    }
}
