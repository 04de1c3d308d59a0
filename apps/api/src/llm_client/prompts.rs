// Shared prompt fragments. The variant templates that use them live in
// `crate::prompts`.

/// Language-preservation rule, placed near the top of every template.
pub const LANGUAGE_RULE: &str = "\
    IMPORTANT: Detect the natural language of the source text below and write \
    EVERY generated string in exactly that language. Never translate the \
    candidate's content into another language.";

/// Output rule for calls that expect a JSON document back.
pub const JSON_ONLY_RULE: &str = "\
    You MUST respond with valid JSON only. \
    Do NOT include any text outside the JSON value. \
    Do NOT use markdown code fences. \
    Do NOT include explanations or apologies.";

/// Literal written into `currentContent` when a resume section is missing.
/// Kept untranslated so the service can detect it.
pub const MISSING_SECTION_MARKER: &str = "No information available";
