use uuid::Uuid;

use super::IntakeError;

/// The document formats accepted for a resume.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    Pdf,
    Doc,
    Docx,
}

impl DocumentKind {
    pub fn from_mime(mime_type: &str) -> Option<Self> {
        // Ignore parameters such as `; charset=binary`.
        let essence = mime_type.split(';').next().unwrap_or("").trim();
        match essence.to_ascii_lowercase().as_str() {
            "application/pdf" => Some(Self::Pdf),
            "application/msword" => Some(Self::Doc),
            "application/vnd.openxmlformats-officedocument.wordprocessingml.document" => {
                Some(Self::Docx)
            }
            _ => None,
        }
    }

    pub fn mime_type(self) -> &'static str {
        match self {
            Self::Pdf => "application/pdf",
            Self::Doc => "application/msword",
            Self::Docx => "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            Self::Pdf => "pdf",
            Self::Doc => "doc",
            Self::Docx => "docx",
        }
    }
}

/// Checks type and size. Runs before any external call.
pub fn validate_upload(
    mime_type: &str,
    size: usize,
    max_bytes: usize,
) -> Result<DocumentKind, IntakeError> {
    let kind = DocumentKind::from_mime(mime_type).ok_or_else(|| IntakeError::InvalidFileType {
        mime_type: mime_type.to_string(),
    })?;
    if size == 0 {
        return Err(IntakeError::EmptyFile);
    }
    if size > max_bytes {
        return Err(IntakeError::FileTooLarge {
            size,
            max: max_bytes,
        });
    }
    Ok(kind)
}

/// Strips any directory components a browser may send with the file name.
pub fn display_name(original_name: &str, kind: DocumentKind) -> String {
    let base = original_name
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or("")
        .trim();
    if base.is_empty() {
        format!("resume.{}", kind.extension())
    } else {
        base.to_string()
    }
}

/// `{uuid}.{ext}`. The client's name only contributes a sanitised extension.
pub fn storage_key(original_name: &str, kind: DocumentKind) -> String {
    format!("{}.{}", Uuid::new_v4(), extension_for(original_name, kind))
}

fn extension_for(original_name: &str, kind: DocumentKind) -> String {
    let base = original_name.rsplit(['/', '\\']).next().unwrap_or("");
    match base.rsplit_once('.') {
        Some((stem, ext))
            if !stem.is_empty()
                && (1..=8).contains(&ext.len())
                && ext.chars().all(|c| c.is_ascii_alphanumeric()) =>
        {
            ext.to_ascii_lowercase()
        }
        _ => kind.extension().to_string(),
    }
}
