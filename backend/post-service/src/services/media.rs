/// Media resolution - turns an upload or an external link into a post's `fileUrl`
use crate::error::{AppError, Result};
use base64::prelude::*;

/// MIME types accepted for uploaded files
pub const ALLOWED_MEDIA_TYPES: [&str; 4] = ["image/jpeg", "image/png", "image/gif", "video/webm"];

/// An uploaded file held in memory
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub content_type: String,
    pub bytes: Vec<u8>,
}

/// Media attached to a post submission. The upload wins when both are present.
#[derive(Debug, Clone, Default)]
pub struct MediaInput {
    pub file: Option<UploadedFile>,
    pub url: Option<String>,
}

pub fn is_allowed_media_type(content_type: &str) -> bool {
    ALLOWED_MEDIA_TYPES
        .iter()
        .any(|allowed| allowed.eq_ignore_ascii_case(content_type))
}

/// Resolve the submitted media into a single URL string.
///
/// Uploads become `data:<mime>;base64,<payload>` URIs; links pass through unchanged.
pub fn resolve_media(input: &MediaInput) -> Result<String> {
    if let Some(file) = input.file.as_ref().filter(|f| !f.bytes.is_empty()) {
        let content_type = file.content_type.trim().to_ascii_lowercase();
        if !is_allowed_media_type(&content_type) {
            return Err(AppError::InvalidMediaType(file.content_type.clone()));
        }

        return Ok(format!(
            "data:{};base64,{}",
            content_type,
            BASE64_STANDARD.encode(&file.bytes)
        ));
    }

    match input.url.as_deref().map(str::trim) {
        Some(url) if !url.is_empty() => Ok(url.to_string()),
        _ => Err(AppError::MissingMedia),
    }
}
