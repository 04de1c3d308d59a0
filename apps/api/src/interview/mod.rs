pub mod grading;
pub mod handlers;
pub mod questions;

use crate::errors::AppError;
use crate::prompts::RoleProfile;

fn required<'a>(value: Option<&'a str>, message: &str) -> Result<&'a str, AppError> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or_else(|| AppError::Validation(message.to_string()))
}

/// Position, field and level are all mandatory; blank counts as missing.
pub fn require_role<'a>(
    position: Option<&'a str>,
    field: Option<&'a str>,
    level: Option<&'a str>,
) -> Result<RoleProfile<'a>, AppError> {
    Ok(RoleProfile {
        position: required(position, "Vị trí ứng tuyển không được để trống")?,
        field: required(field, "Lĩnh vực không được để trống")?,
        level: required(level, "Cấp độ kinh nghiệm không được để trống")?,
    })
}
