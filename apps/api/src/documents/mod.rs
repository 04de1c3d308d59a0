//! Document-to-text extraction for uploaded resumes.
//!
//! PDF goes through `pdf-extract`; DOCX is read straight from the zip
//! container (`word/document.xml`, text runs only). Legacy binary `.doc`
//! passes the type check so the user gets a precise message instead of a
//! generic "unsupported" one.

use std::io::{Cursor, Read};

use thiserror::Error;
use zip::ZipArchive;

pub const MAX_SIZE_BYTES: usize = 10 * 1024 * 1024;

const SUPPORTED_EXTENSIONS: [&str; 3] = ["pdf", "doc", "docx"];

#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("uploaded file is empty")]
    Empty,

    #[error("unsupported file type: {0:?}")]
    UnsupportedType(String),

    #[error("file is {size} bytes, limit is {MAX_SIZE_BYTES}")]
    TooLarge { size: usize },

    #[error("legacy binary .doc files cannot be read")]
    LegacyWordFormat,

    #[error("PDF parsing failed: {0}")]
    Pdf(String),

    #[error("DOCX parsing failed: {0}")]
    Docx(String),

    #[error("no text could be extracted")]
    NoText,

    #[error("extracted text has {chars} characters, minimum is {min}")]
    TooShort { chars: usize, min: usize },
}

impl DocumentError {
    /// Message shown to the end user.
    pub fn user_message(&self) -> &'static str {
        match self {
            DocumentError::Empty => "File không được để trống",
            DocumentError::UnsupportedType(_) => "Chỉ hỗ trợ file PDF, DOC, DOCX",
            DocumentError::TooLarge { .. } => "File quá lớn (tối đa 10MB)",
            DocumentError::LegacyWordFormat => {
                "Định dạng .doc cũ chưa được hỗ trợ. Vui lòng lưu CV dưới dạng PDF hoặc DOCX rồi tải lên lại."
            }
            DocumentError::Pdf(_) | DocumentError::Docx(_) => {
                "Không thể đọc nội dung file. File có thể bị hỏng hoặc được bảo vệ bằng mật khẩu."
            }
            DocumentError::NoText => {
                "Không thể trích xuất text từ file. File có thể là PDF dạng scan hoặc không chứa text."
            }
            DocumentError::TooShort { .. } => {
                "Nội dung text quá ngắn. File có thể là PDF dạng scan chứ không phải dạng text. Điều này có thể bị loại bởi hệ thống lọc CV tự động. Vui lòng chuyển CV thành dạng text trước khi upload."
            }
        }
    }
}

fn extension(filename: &str) -> Option<String> {
    let (stem, ext) = filename.rsplit_once('.')?;
    (!stem.is_empty() && !ext.is_empty()).then(|| ext.to_ascii_lowercase())
}

/// True for `.pdf`, `.doc` and `.docx`, case-insensitive.
pub fn is_supported_type(filename: &str) -> bool {
    extension(filename)
        .map(|ext| SUPPORTED_EXTENSIONS.contains(&ext.as_str()))
        .unwrap_or(false)
}

/// Checks the upload and returns its raw text. CPU-bound for PDFs; call it
/// from `spawn_blocking` inside async code.
pub fn extract_text(filename: &str, bytes: &[u8]) -> Result<String, DocumentError> {
    if bytes.is_empty() {
        return Err(DocumentError::Empty);
    }
    if !is_supported_type(filename) {
        return Err(DocumentError::UnsupportedType(filename.to_string()));
    }
    if bytes.len() > MAX_SIZE_BYTES {
        return Err(DocumentError::TooLarge { size: bytes.len() });
    }

    match extension(filename).as_deref() {
        Some("pdf") => pdf_extract::extract_text_from_mem(bytes)
            .map_err(|e| DocumentError::Pdf(e.to_string())),
        Some("docx") => docx_text(bytes),
        _ => Err(DocumentError::LegacyWordFormat),
    }
}

/// Rejects extractions that are empty or shorter than `min_chars` once
/// trimmed; those are almost always scanned images.
pub fn require_text(text: String, min_chars: usize) -> Result<String, DocumentError> {
    let chars = text.trim().chars().count();
    if chars == 0 {
        return Err(DocumentError::NoText);
    }
    if chars < min_chars {
        return Err(DocumentError::TooShort {
            chars,
            min: min_chars,
        });
    }
    Ok(text)
}

fn docx_text(bytes: &[u8]) -> Result<String, DocumentError> {
    let mut archive =
        ZipArchive::new(Cursor::new(bytes)).map_err(|e| DocumentError::Docx(e.to_string()))?;
    let mut xml = String::new();
    archive
        .by_name("word/document.xml")
        .map_err(|e| DocumentError::Docx(e.to_string()))?
        .read_to_string(&mut xml)
        .map_err(|e| DocumentError::Docx(e.to_string()))?;
    Ok(runs_text(&xml))
}

/// Concatenates `<w:t>` runs. Paragraph ends and `<w:br/>` become newlines,
/// `<w:tab/>` a tab. Everything else in the markup is ignored.
fn runs_text(xml: &str) -> String {
    let mut out = String::new();
    let mut rest = xml;

    while let Some(open) = rest.find('<') {
        let after = &rest[open + 1..];
        let Some(close) = after.find('>') else { break };
        let tag = &after[..close];
        rest = &after[close + 1..];

        if tag == "/w:p" {
            out.push('\n');
            continue;
        }
        let name = tag
            .split(|c: char| c.is_whitespace() || c == '/')
            .next()
            .unwrap_or("");
        match name {
            "w:t" if !tag.ends_with('/') => {
                let end = rest.find("</w:t>").unwrap_or(rest.len());
                out.push_str(&unescape(&rest[..end]));
                rest = &rest[end..];
            }
            "w:tab" => out.push('\t'),
            "w:br" | "w:cr" => out.push('\n'),
            _ => {}
        }
    }

    out.trim().to_string()
}

/// Decodes the five predefined XML entities and `&#N;` / `&#xN;` character
/// references in one pass. Anything unrecognised is kept as written.
fn unescape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;

    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        let tail = &rest[amp..];
        let decoded = tail
            .find(';')
            .and_then(|end| entity_char(&tail[1..end]).map(|c| (c, end)));
        match decoded {
            Some((c, end)) => {
                out.push(c);
                rest = &tail[end + 1..];
            }
            None => {
                out.push('&');
                rest = &tail[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

fn entity_char(name: &str) -> Option<char> {
    match name {
        "lt" => Some('<'),
        "gt" => Some('>'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        "amp" => Some('&'),
        _ => {
            let reference = name.strip_prefix('#')?;
            let code = match reference.strip_prefix(['x', 'X']) {
                Some(hex) => u32::from_str_radix(hex, 16).ok()?,
                None => reference.parse().ok()?,
            };
            char::from_u32(code)
        }
    }
}

/// Minimal DOCX container holding only `word/document.xml`.
#[cfg(test)]
pub(crate) fn make_docx(document_xml: &str) -> Vec<u8> {
    use std::io::Write;
    use zip::write::SimpleFileOptions;
    use zip::{CompressionMethod, ZipWriter};

    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Stored);
    writer.start_file("word/document.xml", options).unwrap();
    writer.write_all(document_xml.as_bytes()).unwrap();
    writer.finish().unwrap().into_inner()
}
