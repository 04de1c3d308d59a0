use serde::{Deserialize, Serialize};

/// Role the candidate is interviewing for. Every field is required by the
/// orchestrators; they are optional here so a missing field reaches
/// validation instead of failing JSON extraction.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InterviewRequest {
    pub position: Option<String>,
    pub field: Option<String>,
    pub level: Option<String>,
}

/// A generated interview question. `hint` points at how to approach the
/// answer, never at the answer itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InterviewQuestion {
    pub question_id: u32,
    pub question_text: String,
    pub hint: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionAnswerPair {
    pub question_id: u32,
    #[serde(default)]
    pub question_text: String,
    #[serde(default)]
    pub answer_text: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswerSubmission {
    pub position: Option<String>,
    pub field: Option<String>,
    pub level: Option<String>,
    #[serde(default)]
    pub answers: Vec<QuestionAnswerPair>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionScore {
    pub question_id: u32,
    /// 0 – 100
    pub score: u8,
    pub feedback: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GradingResult {
    /// round(mean(question_scores.score)) whenever question_scores is non-empty.
    pub total_score: u8,
    pub question_scores: Vec<QuestionScore>,
    pub general_feedback: String,
    pub improvement_suggestions: String,
}
