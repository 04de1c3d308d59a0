use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PersonalInfo {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SectionKind {
    WorkExperience,
    Education,
    Skills,
    /// Whole-resume section, only produced by the degraded fallback.
    General,
}

impl SectionKind {
    pub fn title(self) -> &'static str {
        match self {
            SectionKind::WorkExperience => "Kinh nghiệm làm việc",
            SectionKind::Education => "Học vấn",
            SectionKind::Skills => "Kỹ năng",
            SectionKind::General => "Thông tin CV",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SectionAnalysis {
    pub section: SectionKind,
    pub title: String,
    pub current_content: String,
    pub improved_content: String,
    pub rationale: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fit_summary: Option<String>,
    /// The resume had nothing for this section; `improved_content` is a sample.
    pub missing_in_source: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResumeAnalysis {
    pub personal_info: PersonalInfo,
    pub sections: Vec<SectionAnalysis>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JobMatchResult {
    /// 0.0 – 100.0
    pub score: f64,
    pub analysis: String,
    pub strengths: String,
    pub improvements: String,
}
