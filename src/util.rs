//! Shared utility functions used across the codebase.

use std::any::Any;
use std::sync::OnceLock;

use regex::Regex;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Extract a JSON value from model output.
///
/// Accepts, in order: the whole text as JSON, the body of the first markdown
/// code fence, or the span from the first `{`/`[` to the last `}`/`]`.
pub fn extract_json(text: &str) -> Option<serde_json::Value> {
    let trimmed = text.trim();
    if let Ok(value) = serde_json::from_str(trimmed) {
        return Some(value);
    }

    static FENCE: OnceLock<Regex> = OnceLock::new();
    let fence = FENCE.get_or_init(|| {
        Regex::new(r"(?s)```(?:json)?\s*(.*?)\s*```").expect("fence pattern is valid")
    });
    if let Some(body) = fence.captures(trimmed).and_then(|c| c.get(1)) {
        if let Ok(value) = serde_json::from_str(body.as_str()) {
            return Some(value);
        }
    }

    let start = trimmed.find(['{', '['])?;
    let end = trimmed.rfind(['}', ']'])?;
    if end <= start {
        return None;
    }
    serde_json::from_str(&trimmed[start..=end]).ok()
}

/// Take at most `max_chars` characters from `text` (never splits a code point).
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

/// Normalize a user-supplied URL or bare domain into an absolute URL.
///
/// Bare domains get `https://`; an existing `http://` scheme is kept so the
/// audit can flag it.
pub fn normalize_url(input: &str) -> Result<url::Url, url::ParseError> {
    let trimmed = input.trim();
    if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
        url::Url::parse(trimmed)
    } else {
        url::Url::parse(&format!("https://{}", trimmed))
    }
}

/// Reduce a URL or domain to its bare host (`www.` stripped).
pub fn extract_domain(input: &str) -> String {
    normalize_url(input)
        .ok()
        .and_then(|url| url.host_str().map(|h| h.trim_start_matches("www.").to_string()))
        .unwrap_or_else(|| input.trim().to_string())
}

/// Best-effort text of a panic payload.
pub fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

/// Flatten a string-or-list model field into text. Lists become `- item` lines.
pub fn flatten_text(value: Value) -> Option<String> {
    let text = match value {
        Value::Null => return None,
        Value::String(s) => s,
        Value::Array(items) => items
            .into_iter()
            .filter_map(flatten_text)
            .map(|item| format!("- {}", item))
            .collect::<Vec<_>>()
            .join("\n"),
        Value::Object(fields) => ["action", "title", "text", "description", "recommendation"]
            .iter()
            .find_map(|key| fields.get(*key).and_then(Value::as_str).map(str::to_string))
            .unwrap_or_else(|| Value::Object(fields).to_string()),
        other => other.to_string(),
    };
    let text = text.trim().to_string();
    (!text.is_empty()).then_some(text)
}

/// Serde: treat an explicit `null` like a missing field.
pub fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Option::unwrap_or_default)
}

/// Serde: a 0-100 score given as a number or a numeric string, rounded and
/// clamped.
pub fn score_0_100<'de, D>(deserializer: D) -> Result<u8, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = match Value::deserialize(deserializer)? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().trim_end_matches('%').trim().parse::<f64>().ok(),
        _ => None,
    };
    raw.filter(|n| n.is_finite())
        .map(|n| n.round().clamp(0.0, 100.0) as u8)
        .ok_or_else(|| D::Error::custom("expected a 0-100 score"))
}

/// Serde: a list whose entries may be strings or objects, read as text
/// lines. `null` reads as empty.
pub fn text_items<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let items = match Option::<Value>::deserialize(deserializer)? {
        None => Vec::new(),
        Some(Value::Array(items)) => items,
        Some(single) => vec![single],
    };
    Ok(items.into_iter().filter_map(flatten_text).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn extract_json_plain() {
        assert_eq!(extract_json(r#"{"a": 1}"#), Some(json!({"a": 1})));
    }

    #[test]
    fn extract_json_fenced() {
        let text = "Here you go:\n```json\n{\"score\": 91}\n```\nThanks";
        assert_eq!(extract_json(text), Some(json!({"score": 91})));
    }

    #[test]
    fn extract_json_embedded_in_prose() {
        let text = "Result: [1, 2, 3] as requested";
        assert_eq!(extract_json(text), Some(json!([1, 2, 3])));
    }

    #[test]
    fn extract_json_none_for_prose() {
        assert_eq!(extract_json("no structure here"), None);
    }

    #[test]
    fn truncate_chars_is_utf8_safe() {
        assert_eq!(truncate_chars("héllo", 2), "hé");
        assert_eq!(truncate_chars("abc", 10), "abc");
        assert_eq!(truncate_chars("", 3), "");
    }

    #[test]
    fn normalize_url_adds_scheme() {
        assert_eq!(
            normalize_url("example.com").unwrap().as_str(),
            "https://example.com/"
        );
        assert_eq!(
            normalize_url("http://example.com/a").unwrap().scheme(),
            "http"
        );
    }

    #[test]
    fn extract_domain_strips_www() {
        assert_eq!(extract_domain("https://www.example.com/page"), "example.com");
        assert_eq!(extract_domain("example.org"), "example.org");
    }

    #[test]
    fn panic_message_reads_str_and_string() {
        let payload: Box<dyn Any + Send> = Box::new("boom");
        assert_eq!(panic_message(payload.as_ref()), "boom");
        let payload: Box<dyn Any + Send> = Box::new(format!("code {}", 7));
        assert_eq!(panic_message(payload.as_ref()), "code 7");
        let payload: Box<dyn Any + Send> = Box::new(42u8);
        assert_eq!(panic_message(payload.as_ref()), "unknown panic");
    }

    #[derive(Debug, Deserialize)]
    struct Reply {
        #[serde(deserialize_with = "score_0_100")]
        score: u8,
        #[serde(default, deserialize_with = "text_items")]
        items: Vec<String>,
        #[serde(default, deserialize_with = "null_as_default")]
        tags: Vec<String>,
    }

    #[test]
    fn score_accepts_numbers_and_numeric_strings() {
        let reply: Reply = serde_json::from_value(json!({"score": 72.6})).unwrap();
        assert_eq!(reply.score, 73);
        let reply: Reply = serde_json::from_value(json!({"score": " 95 "})).unwrap();
        assert_eq!(reply.score, 95);
        let reply: Reply = serde_json::from_value(json!({"score": "88%"})).unwrap();
        assert_eq!(reply.score, 88);
        let reply: Reply = serde_json::from_value(json!({"score": 140})).unwrap();
        assert_eq!(reply.score, 100);

        assert!(serde_json::from_value::<Reply>(json!({"score": "great"})).is_err());
        assert!(serde_json::from_value::<Reply>(json!({"score": null})).is_err());
        assert!(serde_json::from_value::<Reply>(json!({})).is_err());
    }

    #[test]
    fn text_items_reads_strings_and_objects() {
        let reply: Reply = serde_json::from_value(json!({
            "score": 1,
            "items": ["Ship docs", {"action": "Add FAQ", "priority": "high"}, {"impact": 3}, ""],
            "tags": null
        }))
        .unwrap();
        assert_eq!(reply.items, vec!["Ship docs", "Add FAQ", r#"{"impact":3}"#]);
        assert!(reply.tags.is_empty());

        let reply: Reply = serde_json::from_value(json!({"score": 1, "items": null})).unwrap();
        assert!(reply.items.is_empty());
    }

    #[test]
    fn flatten_text_joins_lists() {
        assert_eq!(
            flatten_text(json!(["Add stats", "Cite sources"])).as_deref(),
            Some("- Add stats\n- Cite sources")
        );
        assert_eq!(flatten_text(json!("  ")), None);
        assert_eq!(flatten_text(Value::Null), None);
    }
}
