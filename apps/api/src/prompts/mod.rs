//! Prompt builder: the single entry point for every instruction document
//! sent to the generation backend.
//!
//! Caller text is inserted verbatim in a single pass: a resume that happens
//! to contain `{job_description}` is never re-substituted.

use crate::llm_client::prompts::{JSON_ONLY_RULE, LANGUAGE_RULE, MISSING_SECTION_MARKER};
use crate::models::interview::QuestionAnswerPair;

pub mod templates;

/// Number of questions every question-generation variant asks for.
pub const QUESTION_COUNT: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptVariant {
    ResumeAnalysisWithJob,
    ResumeAnalysisWithoutJob,
    InterviewQuestionsWithJob,
    InterviewQuestionsWithoutJob,
    InterviewQuestionsForRole,
    Grading,
    JobMatch,
}

impl PromptVariant {
    pub fn for_resume_analysis(job_description: Option<&str>) -> Self {
        if present(job_description).is_some() {
            PromptVariant::ResumeAnalysisWithJob
        } else {
            PromptVariant::ResumeAnalysisWithoutJob
        }
    }

    pub fn for_resume_questions(job_description: Option<&str>) -> Self {
        if present(job_description).is_some() {
            PromptVariant::InterviewQuestionsWithJob
        } else {
            PromptVariant::InterviewQuestionsWithoutJob
        }
    }

    fn template(self) -> &'static str {
        match self {
            PromptVariant::ResumeAnalysisWithJob => templates::RESUME_ANALYSIS_WITH_JOB,
            PromptVariant::ResumeAnalysisWithoutJob => templates::RESUME_ANALYSIS_WITHOUT_JOB,
            PromptVariant::InterviewQuestionsWithJob => templates::INTERVIEW_QUESTIONS_WITH_JOB,
            PromptVariant::InterviewQuestionsWithoutJob => {
                templates::INTERVIEW_QUESTIONS_WITHOUT_JOB
            }
            PromptVariant::InterviewQuestionsForRole => templates::INTERVIEW_QUESTIONS_FOR_ROLE,
            PromptVariant::Grading => templates::GRADING,
            PromptVariant::JobMatch => templates::JOB_MATCH,
        }
    }
}

/// A job description counts only when it has non-whitespace content.
pub fn present(text: Option<&str>) -> Option<&str> {
    text.filter(|t| !t.trim().is_empty())
}

/// Position, field and level of an interview, already validated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoleProfile<'a> {
    pub position: &'a str,
    pub field: &'a str,
    pub level: &'a str,
}

/// Everything a template may draw from. Absent pieces render as empty text.
#[derive(Debug, Clone, Copy, Default)]
pub struct PromptInput<'a> {
    pub source_text: &'a str,
    pub job_description: Option<&'a str>,
    pub role: Option<RoleProfile<'a>>,
    pub answers: &'a [QuestionAnswerPair],
}

impl<'a> PromptInput<'a> {
    pub fn resume(source_text: &'a str, job_description: Option<&'a str>) -> Self {
        Self {
            source_text,
            job_description,
            ..Default::default()
        }
    }

    pub fn role(role: RoleProfile<'a>) -> Self {
        Self {
            role: Some(role),
            ..Default::default()
        }
    }

    pub fn grading(role: RoleProfile<'a>, answers: &'a [QuestionAnswerPair]) -> Self {
        Self {
            role: Some(role),
            answers,
            ..Default::default()
        }
    }
}

pub fn build_prompt(variant: PromptVariant, input: &PromptInput<'_>) -> String {
    let role = input.role.unwrap_or(RoleProfile {
        position: "",
        field: "",
        level: "",
    });
    let answers = format_answers(input.answers);
    let question_count = QUESTION_COUNT.to_string();

    fill_template(
        variant.template(),
        &[
            ("language_rule", LANGUAGE_RULE),
            ("json_rule", JSON_ONLY_RULE),
            ("missing_marker", MISSING_SECTION_MARKER),
            ("question_count", &question_count),
            ("resume_text", input.source_text),
            ("job_description", present(input.job_description).unwrap_or("")),
            ("position", role.position.trim()),
            ("field", role.field.trim()),
            ("level", role.level.trim()),
            ("answers", &answers),
        ],
    )
}

fn format_answers(answers: &[QuestionAnswerPair]) -> String {
    answers
        .iter()
        .map(|a| {
            let answer = if a.answer_text.trim().is_empty() {
                "(no answer given)"
            } else {
                a.answer_text.as_str()
            };
            format!(
                "- Question ID: {}\n  Question: {}\n  Answer: {}",
                a.question_id, a.question_text, answer
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Replaces each `{key}` in `template` with its value in one left-to-right
/// pass. Inserted values are not scanned again; unknown braces are kept.
pub fn fill_template(template: &str, values: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len() + values.iter().map(|(_, v)| v.len()).sum::<usize>());
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let candidate = &rest[open + 1..];

        let matched = values.iter().find(|(key, _)| {
            candidate.starts_with(key) && candidate[key.len()..].starts_with('}')
        });

        match matched {
            Some((key, value)) => {
                out.push_str(value);
                rest = &candidate[key.len() + 1..];
            }
            None => {
                out.push('{');
                rest = candidate;
            }
        }
    }
    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    const RESUME: &str = "Nguyễn Văn A\nKinh nghiệm: 3 năm Java tại FPT Software";

    fn pair(id: u32, question: &str, answer: &str) -> QuestionAnswerPair {
        QuestionAnswerPair {
            question_id: id,
            question_text: question.to_string(),
            answer_text: answer.to_string(),
        }
    }

    #[test]
    fn test_empty_job_description_selects_without_job_variant() {
        assert_eq!(
            PromptVariant::for_resume_analysis(Some("")),
            PromptVariant::ResumeAnalysisWithoutJob
        );
        assert_eq!(
            PromptVariant::for_resume_analysis(Some("   \n")),
            PromptVariant::ResumeAnalysisWithoutJob
        );
        assert_eq!(
            PromptVariant::for_resume_analysis(None),
            PromptVariant::ResumeAnalysisWithoutJob
        );
        assert_eq!(
            PromptVariant::for_resume_analysis(Some("Rust engineer")),
            PromptVariant::ResumeAnalysisWithJob
        );
    }

    #[test]
    fn test_without_job_prompt_has_no_job_section() {
        let input = PromptInput::resume(RESUME, Some(""));
        let prompt = build_prompt(PromptVariant::for_resume_analysis(Some("")), &input);
        assert!(prompt.contains(RESUME));
        assert!(!prompt.to_lowercase().contains("job description"));
    }

    #[test]
    fn test_with_job_prompt_embeds_both_texts_verbatim() {
        let jd = "Backend Engineer: Go, Kafka, PostgreSQL";
        let input = PromptInput::resume(RESUME, Some(jd));
        let prompt = build_prompt(PromptVariant::ResumeAnalysisWithJob, &input);
        assert!(prompt.contains(RESUME));
        assert!(prompt.contains(jd));
        assert!(prompt.contains("JOB DESCRIPTION"));
        assert!(prompt.contains("\"fitSummary\""));
    }

    #[test]
    fn test_every_template_is_fully_filled() {
        let answers = [pair(1, "Q?", "A.")];
        let role = RoleProfile {
            position: "Backend Engineer",
            field: "Software",
            level: "Junior",
        };
        let input = PromptInput {
            source_text: RESUME,
            job_description: Some("JD"),
            role: Some(role),
            answers: &answers,
        };
        for variant in [
            PromptVariant::ResumeAnalysisWithJob,
            PromptVariant::ResumeAnalysisWithoutJob,
            PromptVariant::InterviewQuestionsWithJob,
            PromptVariant::InterviewQuestionsWithoutJob,
            PromptVariant::InterviewQuestionsForRole,
            PromptVariant::Grading,
            PromptVariant::JobMatch,
        ] {
            let prompt = build_prompt(variant, &input);
            for key in [
                "{language_rule}",
                "{json_rule}",
                "{missing_marker}",
                "{question_count}",
                "{resume_text}",
                "{job_description}",
                "{position}",
                "{field}",
                "{level}",
                "{answers}",
            ] {
                assert!(!prompt.contains(key), "{variant:?} left {key} unfilled");
            }
        }
    }

    #[test]
    fn test_resume_prompts_carry_language_rule_and_missing_marker() {
        let prompt = build_prompt(
            PromptVariant::ResumeAnalysisWithoutJob,
            &PromptInput::resume(RESUME, None),
        );
        assert!(prompt.contains(LANGUAGE_RULE));
        assert!(prompt.contains(MISSING_SECTION_MARKER));
    }

    #[test]
    fn test_role_prompt_names_profile_and_count() {
        let prompt = build_prompt(
            PromptVariant::InterviewQuestionsForRole,
            &PromptInput::role(RoleProfile {
                position: " Backend Engineer ",
                field: "Software",
                level: "Junior",
            }),
        );
        assert!(prompt.contains("- Position: Backend Engineer\n"));
        assert!(prompt.contains("- Experience level: Junior"));
        assert!(prompt.contains("set of 10 interview questions"));
    }

    #[test]
    fn test_grading_prompt_lists_answers() {
        let answers = [
            pair(1, "Explain ACID.", "Atomicity, consistency..."),
            pair(2, "Tell me about a conflict.", "  "),
        ];
        let role = RoleProfile {
            position: "Backend Engineer",
            field: "Software",
            level: "Junior",
        };
        let prompt = build_prompt(PromptVariant::Grading, &PromptInput::grading(role, &answers));
        assert!(prompt.contains(
            "- Question ID: 1\n  Question: Explain ACID.\n  Answer: Atomicity, consistency..."
        ));
        assert!(prompt.contains("- Question ID: 2\n  Question: Tell me about a conflict.\n  Answer: (no answer given)"));
    }

    #[test]
    fn test_fill_template_does_not_rescan_inserted_text() {
        let filled = fill_template(
            "A={a} B={b}",
            &[("a", "{b}"), ("b", "bee")],
        );
        assert_eq!(filled, "A={b} B=bee");
    }

    #[test]
    fn test_fill_template_keeps_unknown_braces() {
        let filled = fill_template("{\"score\": {x}} {unknown", &[("x", "1")]);
        assert_eq!(filled, "{\"score\": 1} {unknown");
    }
}
