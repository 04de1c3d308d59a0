//! Unified result model for AI extraction calls.
//!
//! Every orchestrator returns `Extraction<T>`: either the parsed value, or a
//! structurally valid fallback tagged with why the backend output was
//! unusable. Callers never see a parse error.

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DegradeReason {
    EmptyResponse,
    MalformedJson,
    SchemaMismatch,
    UnexpectedCount,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DegradedResult<T> {
    pub value: T,
    pub reason: DegradeReason,
    /// Human-readable (Vietnamese) description shown to the end user.
    pub message: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Extraction<T> {
    Parsed(T),
    Degraded(DegradedResult<T>),
}

/// Serialized next to `data` when the result is degraded.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Degradation {
    pub reason: DegradeReason,
    pub message: String,
}

impl<T> Extraction<T> {
    pub fn degraded(value: T, reason: DegradeReason, message: impl Into<String>) -> Self {
        Extraction::Degraded(DegradedResult {
            value,
            reason,
            message: message.into(),
        })
    }

    pub fn value(&self) -> &T {
        match self {
            Extraction::Parsed(value) => value,
            Extraction::Degraded(degraded) => &degraded.value,
        }
    }

    pub fn reason(&self) -> Option<DegradeReason> {
        match self {
            Extraction::Parsed(_) => None,
            Extraction::Degraded(degraded) => Some(degraded.reason),
        }
    }

    /// Applies domain post-processing to the value on either path.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Extraction<U> {
        match self {
            Extraction::Parsed(value) => Extraction::Parsed(f(value)),
            Extraction::Degraded(d) => Extraction::Degraded(DegradedResult {
                value: f(d.value),
                reason: d.reason,
                message: d.message,
            }),
        }
    }

    /// Post-processing that may itself downgrade a parsed value.
    pub fn and_then<U>(self, f: impl FnOnce(T) -> Extraction<U>) -> Extraction<U> {
        match self {
            Extraction::Parsed(value) => f(value),
            Extraction::Degraded(d) => {
                let message = d.message;
                let reason = d.reason;
                match f(d.value) {
                    Extraction::Parsed(value) | Extraction::Degraded(DegradedResult { value, .. }) => {
                        Extraction::Degraded(DegradedResult {
                            value,
                            reason,
                            message,
                        })
                    }
                }
            }
        }
    }

    pub fn into_parts(self) -> (T, Option<Degradation>) {
        match self {
            Extraction::Parsed(value) => (value, None),
            Extraction::Degraded(d) => (
                d.value,
                Some(Degradation {
                    reason: d.reason,
                    message: d.message,
                }),
            ),
        }
    }
}

/// JSON envelope for extraction endpoints:
/// `{"success": true, "data": T, "degraded": null | {"reason", "message"}}`.
#[derive(Debug, Serialize)]
pub struct ExtractionEnvelope<T: Serialize> {
    pub success: bool,
    pub data: T,
    pub degraded: Option<Degradation>,
}

impl<T: Serialize> From<Extraction<T>> for ExtractionEnvelope<T> {
    fn from(extraction: Extraction<T>) -> Self {
        let (data, degraded) = extraction.into_parts();
        Self {
            success: true,
            data,
            degraded,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_map_keeps_degradation() {
        let extraction = Extraction::degraded(2, DegradeReason::MalformedJson, "lỗi");
        let mapped = extraction.map(|v| v * 10);
        assert_eq!(*mapped.value(), 20);
        assert_eq!(mapped.reason(), Some(DegradeReason::MalformedJson));
    }

    #[test]
    fn test_and_then_can_downgrade_parsed_value() {
        let extraction = Extraction::Parsed(vec![1, 2]).and_then(|v| {
            Extraction::degraded(v, DegradeReason::UnexpectedCount, "thiếu câu hỏi")
        });
        assert!(extraction.reason().is_some());
        assert_eq!(extraction.reason(), Some(DegradeReason::UnexpectedCount));
    }

    #[test]
    fn test_and_then_keeps_original_reason_when_already_degraded() {
        let extraction: Extraction<Vec<i32>> =
            Extraction::degraded(vec![], DegradeReason::SchemaMismatch, "lỗi gốc").and_then(|v| {
                Extraction::degraded(v, DegradeReason::UnexpectedCount, "lỗi sau")
            });
        match extraction {
            Extraction::Degraded(d) => {
                assert_eq!(d.reason, DegradeReason::SchemaMismatch);
                assert_eq!(d.message, "lỗi gốc");
            }
            Extraction::Parsed(_) => panic!("expected degraded"),
        }
    }

    #[test]
    fn test_envelope_serialization() {
        let parsed = serde_json::to_value(ExtractionEnvelope::from(Extraction::Parsed(1))).unwrap();
        assert_eq!(parsed, json!({"success": true, "data": 1, "degraded": null}));

        let degraded = serde_json::to_value(ExtractionEnvelope::from(Extraction::degraded(
            0,
            DegradeReason::EmptyResponse,
            "trống",
        )))
        .unwrap();
        assert_eq!(
            degraded,
            json!({
                "success": true,
                "data": 0,
                "degraded": {"reason": "empty_response", "message": "trống"}
            })
        );
    }
}
