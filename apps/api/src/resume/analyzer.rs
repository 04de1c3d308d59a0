//! Resume analysis: source text in, three rewritten sections out.
//!
//! Unconstrained single-shot call. The backend payload is decoded leniently
//! and reshaped into `ResumeAnalysis`; anything unreadable degrades to a
//! single section that carries the original text unchanged.

use serde::Deserialize;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::errors::AppError;
use crate::llm_client::normalize::{parse_structured, string_or_list};
use crate::llm_client::prompts::MISSING_SECTION_MARKER;
use crate::llm_client::{GenerationBackend, GenerationRequest};
use crate::models::resume::{PersonalInfo, ResumeAnalysis, SectionAnalysis, SectionKind};
use crate::outcome::Extraction;
use crate::prompts::{build_prompt, PromptInput, PromptVariant};

const UNKNOWN: &str = "Chưa xác định";
const FALLBACK_RATIONALE: &str = "Cần phân tích thêm để đưa ra gợi ý cải thiện";
const DEGRADED_MESSAGE: &str =
    "Không thể phân tích chi tiết CV. Nội dung gốc được giữ nguyên, vui lòng thử lại.";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ResumePayload {
    #[serde(default)]
    personal_info: PersonalInfo,
    work_experience: SectionPayload,
    education: SectionPayload,
    skills: SectionPayload,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SectionPayload {
    #[serde(deserialize_with = "string_or_list")]
    current_content: String,
    #[serde(deserialize_with = "string_or_list")]
    improved_content: String,
    #[serde(default, deserialize_with = "string_or_list")]
    rationale: String,
    #[serde(default)]
    fit_summary: Option<String>,
}

impl SectionPayload {
    fn into_section(self, kind: SectionKind, with_job: bool) -> SectionAnalysis {
        let missing_in_source = self
            .current_content
            .to_ascii_lowercase()
            .contains(&MISSING_SECTION_MARKER.to_ascii_lowercase());
        let fit_summary = self
            .fit_summary
            .filter(|s| with_job && !s.trim().is_empty());

        SectionAnalysis {
            section: kind,
            title: kind.title().to_string(),
            current_content: self.current_content,
            improved_content: self.improved_content,
            rationale: self.rationale,
            fit_summary,
            missing_in_source,
        }
    }
}

impl ResumePayload {
    fn into_analysis(self, with_job: bool) -> ResumeAnalysis {
        ResumeAnalysis {
            personal_info: self.personal_info,
            sections: vec![
                self.work_experience
                    .into_section(SectionKind::WorkExperience, with_job),
                self.education.into_section(SectionKind::Education, with_job),
                self.skills.into_section(SectionKind::Skills, with_job),
            ],
        }
    }
}

/// Structurally valid analysis used when the backend output is unusable.
/// The whole source text is kept, byte for byte, in one general section.
pub fn fallback_analysis(source_text: &str) -> ResumeAnalysis {
    ResumeAnalysis {
        personal_info: PersonalInfo {
            name: UNKNOWN.to_string(),
            email: UNKNOWN.to_string(),
            phone: UNKNOWN.to_string(),
            address: UNKNOWN.to_string(),
        },
        sections: vec![SectionAnalysis {
            section: SectionKind::General,
            title: SectionKind::General.title().to_string(),
            current_content: source_text.to_string(),
            improved_content: String::new(),
            rationale: FALLBACK_RATIONALE.to_string(),
            fit_summary: None,
            missing_in_source: false,
        }],
    }
}

pub async fn analyze_resume(
    backend: &dyn GenerationBackend,
    source_text: &str,
    job_description: Option<&str>,
) -> Result<Extraction<ResumeAnalysis>, AppError> {
    if source_text.trim().is_empty() {
        return Err(AppError::Validation("Text CV không được để trống".to_string()));
    }

    let call_id = Uuid::new_v4();
    let variant = PromptVariant::for_resume_analysis(job_description);
    let with_job = variant == PromptVariant::ResumeAnalysisWithJob;
    let request = GenerationRequest::prompt(build_prompt(
        variant,
        &PromptInput::resume(source_text, job_description),
    ));
    debug!(
        "[{call_id}] Resume analysis prompt built: variant={variant:?}, chars={}",
        request.prompt_chars()
    );

    let raw = backend.generate(&request).await?;
    let analysis = match parse_structured::<ResumePayload>(&raw) {
        Ok(payload) => Extraction::Parsed(payload.into_analysis(with_job)),
        Err(violation) => {
            warn!("[{call_id}] Resume analysis output rejected: {violation}");
            Extraction::degraded(
                fallback_analysis(source_text),
                violation.reason(),
                DEGRADED_MESSAGE,
            )
        }
    };

    info!(
        "[{call_id}] Resume analysis finished: degraded={:?}, sections={}",
        analysis.reason(),
        analysis.value().sections.len()
    );
    Ok(analysis)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm_client::testing::ScriptedBackend;
    use crate::llm_client::LlmError;
    use crate::outcome::DegradeReason;

    const RESUME: &str = "Nguyễn Văn A\nEmail: a@example.com\nKinh nghiệm: 3 năm Java tại FPT Software\n{job_description}";

    fn payload(with_fit: bool) -> String {
        let fit = if with_fit {
            r#", "fitSummary": "Phù hợp một phần""#
        } else {
            ""
        };
        format!(
            r#"```json
{{
  "personalInfo": {{"name": "Nguyễn Văn A", "email": "a@example.com", "phone": "", "address": ""}},
  "workExperience": {{"currentContent": "3 năm Java", "improvedContent": ["- Phát triển dịch vụ Java", "- Tối ưu SQL"], "rationale": "Rõ ràng hơn"{fit}}},
  "education": {{"currentContent": "No information available", "improvedContent": "Cử nhân CNTT", "rationale": "Bổ sung"{fit}}},
  "skills": {{"currentContent": "Java", "improvedContent": "Java, Spring Boot", "rationale": "Cụ thể hơn"{fit}}}
}}
```"#
        )
    }

    #[tokio::test]
    async fn test_blank_text_is_rejected_without_backend_call() {
        let backend = ScriptedBackend::replying("{}");
        let result = analyze_resume(&backend, "   ", None).await;
        assert!(matches!(result, Err(AppError::Validation(_))));
        assert_eq!(backend.calls(), 0);
    }

    #[tokio::test]
    async fn test_parsed_payload_becomes_three_sections() {
        let backend = ScriptedBackend::replying(payload(false));
        let result = analyze_resume(&backend, RESUME, None).await.unwrap();
        assert_eq!(result.reason(), None);

        let analysis = result.value();
        assert_eq!(analysis.personal_info.name, "Nguyễn Văn A");
        let kinds: Vec<_> = analysis.sections.iter().map(|s| s.section).collect();
        assert_eq!(
            kinds,
            vec![SectionKind::WorkExperience, SectionKind::Education, SectionKind::Skills]
        );
        assert_eq!(
            analysis.sections[0].improved_content,
            "- Phát triển dịch vụ Java\n- Tối ưu SQL"
        );
        assert!(!analysis.sections[0].missing_in_source);
        assert!(analysis.sections[1].missing_in_source);
        assert!(analysis.sections.iter().all(|s| s.fit_summary.is_none()));
        assert!(!backend.last_request().unwrap().is_constrained());
    }

    #[tokio::test]
    async fn test_fit_summary_kept_only_with_job() {
        let backend = ScriptedBackend::replying(payload(true));
        let with_job = analyze_resume(&backend, RESUME, Some("Java backend developer"))
            .await
            .unwrap();
        assert!(with_job
            .value()
            .sections
            .iter()
            .all(|s| s.fit_summary.as_deref() == Some("Phù hợp một phần")));
        assert!(backend.last_prompt().contains("Java backend developer"));

        let without_job = analyze_resume(&backend, RESUME, Some("  ")).await.unwrap();
        assert!(without_job.value().sections.iter().all(|s| s.fit_summary.is_none()));
    }

    #[tokio::test]
    async fn test_malformed_output_keeps_original_text() {
        let backend = ScriptedBackend::replying("Xin lỗi, tôi không thể xử lý yêu cầu này.");
        let result = analyze_resume(&backend, RESUME, None).await.unwrap();

        match result {
            Extraction::Degraded(d) => {
                assert_eq!(d.reason, DegradeReason::MalformedJson);
                assert_eq!(d.value.personal_info.name, UNKNOWN);
                assert_eq!(d.value.sections.len(), 1);
                let section = &d.value.sections[0];
                assert_eq!(section.section, SectionKind::General);
                assert_eq!(section.current_content, RESUME);
                assert_eq!(section.rationale, FALLBACK_RATIONALE);
            }
            Extraction::Parsed(_) => panic!("expected degraded result"),
        }
    }

    #[tokio::test]
    async fn test_missing_section_is_schema_mismatch() {
        let backend = ScriptedBackend::replying(
            r#"{"workExperience": {"currentContent": "a", "improvedContent": "b"}}"#,
        );
        let result = analyze_resume(&backend, RESUME, None).await.unwrap();
        assert_eq!(result.reason(), Some(DegradeReason::SchemaMismatch));
        assert_eq!(result.value().sections[0].current_content, RESUME);
    }

    #[tokio::test]
    async fn test_empty_output_degrades() {
        let backend = ScriptedBackend::replying("");
        let result = analyze_resume(&backend, RESUME, None).await.unwrap();
        assert_eq!(result.reason(), Some(DegradeReason::EmptyResponse));
    }

    #[tokio::test]
    async fn test_backend_error_is_propagated() {
        let backend = ScriptedBackend::failing(LlmError::Timeout);
        let result = analyze_resume(&backend, RESUME, None).await;
        assert!(matches!(result, Err(AppError::Upstream(LlmError::Timeout))));
    }
}
