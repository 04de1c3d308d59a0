//! Response normalization: turns raw backend text into a typed value, or
//! into a degraded result when the text does not fit the expected shape.

use serde::de::{DeserializeOwned, Deserializer};
use serde::Deserialize;
use thiserror::Error;
use tracing::warn;

use crate::outcome::{DegradeReason, Extraction};

/// Why raw text could not be read as the expected shape.
#[derive(Debug, Error)]
pub enum SchemaViolation {
    #[error("backend returned no text")]
    Empty,

    #[error("backend text is not valid JSON: {0}")]
    Malformed(serde_json::Error),

    #[error("backend JSON does not match the expected shape: {0}")]
    Mismatch(serde_json::Error),
}

impl SchemaViolation {
    pub fn reason(&self) -> DegradeReason {
        match self {
            SchemaViolation::Empty => DegradeReason::EmptyResponse,
            SchemaViolation::Malformed(_) => DegradeReason::MalformedJson,
            SchemaViolation::Mismatch(_) => DegradeReason::SchemaMismatch,
        }
    }
}

impl From<serde_json::Error> for SchemaViolation {
    fn from(e: serde_json::Error) -> Self {
        match e.classify() {
            serde_json::error::Category::Data => SchemaViolation::Mismatch(e),
            _ => SchemaViolation::Malformed(e),
        }
    }
}

/// Strips leading ```json / ``` and trailing ``` markers until none remain.
/// Idempotent: cleaning clean text returns it unchanged.
pub fn clean(raw: &str) -> &str {
    let mut text = raw.trim();
    loop {
        let before = text.len();

        if let Some(rest) = text.strip_prefix("```") {
            text = match rest.get(..4) {
                Some(tag) if tag.eq_ignore_ascii_case("json") => &rest[4..],
                _ => rest,
            };
            text = text.trim();
        }
        if let Some(rest) = text.strip_suffix("```") {
            text = rest.trim();
        }

        if text.len() == before {
            return text;
        }
    }
}

/// Strict parse of cleaned text, with one salvage attempt on the outermost
/// JSON object or array when the backend wrapped it in prose.
pub fn parse_structured<T: DeserializeOwned>(raw: &str) -> Result<T, SchemaViolation> {
    let text = clean(raw);
    if text.is_empty() {
        return Err(SchemaViolation::Empty);
    }

    let strict_error = match serde_json::from_str::<T>(text) {
        Ok(value) => return Ok(value),
        Err(e) => SchemaViolation::from(e),
    };

    match embedded_json(text) {
        Some(slice) if slice.len() < text.len() => {
            serde_json::from_str::<T>(slice).map_err(SchemaViolation::from)
        }
        _ => Err(strict_error),
    }
}

fn embedded_json(text: &str) -> Option<&str> {
    let start = text.find(['{', '['])?;
    let close = if text[start..].starts_with('{') { '}' } else { ']' };
    let end = text.rfind(close)?;
    (end > start).then(|| &text[start..=end])
}

/// Parses `raw` into `T`; on any violation returns `Degraded` carrying the
/// value built by `fallback`.
pub fn normalize<T: DeserializeOwned>(
    raw: &str,
    fallback: impl FnOnce() -> T,
    message: &str,
) -> Extraction<T> {
    match parse_structured(raw) {
        Ok(value) => Extraction::Parsed(value),
        Err(violation) => {
            warn!(
                "Backend output rejected ({violation}); raw prefix: {:?}",
                raw.chars().take(120).collect::<String>()
            );
            Extraction::degraded(fallback(), violation.reason(), message)
        }
    }
}

/// Accepts either a string or an array of strings (joined by newlines).
/// Unconstrained output often turns a prose field into a bullet list.
pub fn string_or_list<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum StringOrList {
        One(String),
        Many(Vec<String>),
    }

    Ok(match StringOrList::deserialize(deserializer)? {
        StringOrList::One(s) => s,
        StringOrList::Many(items) => items
            .iter()
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join("\n"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    #[derive(Debug, Deserialize, PartialEq)]
    struct Sample {
        a: i64,
    }

    #[test]
    fn test_clean_strips_json_fence() {
        assert_eq!(clean("```json\n{\"a\":1}\n```"), "{\"a\":1}");
    }

    #[test]
    fn test_clean_strips_bare_fence() {
        assert_eq!(clean("```\n[1,2]\n```"), "[1,2]");
    }

    #[test]
    fn test_clean_handles_uppercase_tag_and_missing_closer() {
        assert_eq!(clean("```JSON\n{\"a\":1}"), "{\"a\":1}");
    }

    #[test]
    fn test_clean_is_idempotent() {
        for input in [
            "```json\n{\"a\":1}\n```",
            "{\"a\":1}",
            "```json\n```json\n{}\n```\n```",
            "   plain prose   ",
            "```",
            "",
            "``` ```json ```",
        ] {
            let once = clean(input);
            assert_eq!(clean(once), once, "not idempotent for {input:?}");
        }
    }

    #[test]
    fn test_fenced_and_bare_parse_to_the_same_value() {
        let fenced: Value = parse_structured("```json\n{\"a\":1}\n```").unwrap();
        let bare: Value = parse_structured("{\"a\":1}").unwrap();
        assert_eq!(fenced, bare);
        assert_eq!(bare, json!({"a": 1}));
    }

    #[test]
    fn test_prose_around_json_is_salvaged() {
        let parsed: Sample =
            parse_structured("Here is the result you asked for:\n{\"a\": 7}\nGood luck!").unwrap();
        assert_eq!(parsed, Sample { a: 7 });
    }

    #[test]
    fn test_empty_text_is_empty_violation() {
        let err = parse_structured::<Sample>("```json\n```").unwrap_err();
        assert_eq!(err.reason(), DegradeReason::EmptyResponse);
    }

    #[test]
    fn test_truncated_json_is_malformed() {
        let err = parse_structured::<Sample>("{\"a\": ").unwrap_err();
        assert_eq!(err.reason(), DegradeReason::MalformedJson);
    }

    #[test]
    fn test_wrong_shape_is_mismatch() {
        let err = parse_structured::<Sample>("{\"b\": 1}").unwrap_err();
        assert_eq!(err.reason(), DegradeReason::SchemaMismatch);
    }

    #[test]
    fn test_normalize_uses_fallback_on_failure() {
        let result = normalize::<Vec<i64>>("definitely not json", Vec::new, "fallback used");
        match result {
            Extraction::Degraded(degraded) => {
                assert!(degraded.value.is_empty());
                assert_eq!(degraded.reason, DegradeReason::MalformedJson);
                assert_eq!(degraded.message, "fallback used");
            }
            Extraction::Parsed(_) => panic!("expected degraded result"),
        }
    }

    #[test]
    fn test_normalize_parsed_on_success() {
        let result = normalize::<Vec<i64>>("[1, 2, 3]", Vec::new, "unused");
        assert!(matches!(result, Extraction::Parsed(ref v) if v == &vec![1, 2, 3]));
    }

    #[test]
    fn test_string_or_list_accepts_both_forms() {
        #[derive(Deserialize)]
        struct Field {
            #[serde(deserialize_with = "string_or_list")]
            value: String,
        }

        let one: Field = serde_json::from_value(json!({"value": "single"})).unwrap();
        assert_eq!(one.value, "single");

        let many: Field =
            serde_json::from_value(json!({"value": ["- first ", "", "- second"]})).unwrap();
        assert_eq!(many.value, "- first\n- second");
    }
}
