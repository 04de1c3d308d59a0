pub mod analyzer;
pub mod handlers;
pub mod job_match;
