//! Upload validation — filename sanitization, extension allow-list, and the
//! size ceiling. Pure decision functions; nothing here touches the
//! filesystem, so a rejected upload provably leaves no trace on disk.

use thiserror::Error;

/// Hard ceiling on upload size, enforced here against the declared length
/// and again at the transport layer via `DefaultBodyLimit`.
pub const MAX_UPLOAD_BYTES: u64 = 16 * 1024 * 1024;

/// Document formats the external processor understands (compared
/// case-insensitively against the sanitized filename's extension).
pub const ALLOWED_EXTENSIONS: [&str; 11] = [
    "txt", "pdf", "doc", "docx", "ppt", "pptx", "xls", "xlsx", "odt", "odp", "ods",
];

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("no file selected")]
    MissingFile,
    #[error("invalid filename")]
    InvalidFilename,
    #[error("unsupported file type `{0}`")]
    UnsupportedType(String),
    #[error("file of {size} bytes exceeds the {limit} byte limit")]
    TooLarge { size: u64, limit: u64 },
}

/// Validate a declared filename and byte length before anything is
/// persisted. Returns the sanitized filename used everywhere downstream.
pub fn validate_upload(
    declared_filename: Option<&str>,
    declared_len: u64,
) -> Result<String, ValidationError> {
    let raw = match declared_filename {
        Some(name) if !name.is_empty() => name,
        _ => return Err(ValidationError::MissingFile),
    };

    let sanitized = sanitize_filename(raw).ok_or(ValidationError::InvalidFilename)?;

    match sanitized.rsplit_once('.') {
        Some((stem, ext))
            if !stem.is_empty()
                && ALLOWED_EXTENSIONS
                    .iter()
                    .any(|allowed| allowed.eq_ignore_ascii_case(ext)) => {}
        _ => return Err(ValidationError::UnsupportedType(sanitized)),
    }

    if declared_len > MAX_UPLOAD_BYTES {
        return Err(ValidationError::TooLarge {
            size: declared_len,
            limit: MAX_UPLOAD_BYTES,
        });
    }

    Ok(sanitized)
}

/// Reduce an untrusted filename to a single safe path component.
///
/// Strips directory components (both separator styles), maps everything
/// outside `[A-Za-z0-9._-]` to `_`, and trims leading dots and underscores
/// so the result can never be a dotfile or a traversal component. Returns
/// `None` when nothing usable remains.
pub fn sanitize_filename(raw: &str) -> Option<String> {
    let base = raw.rsplit(['/', '\\']).next().unwrap_or(raw);

    let cleaned: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();

    let trimmed = cleaned.trim_start_matches(['.', '_']).to_string();
    if trimmed.is_empty() {
        return None;
    }
    Some(trimmed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_allowed_extensions_case_insensitively() {
        assert_eq!(validate_upload(Some("report.pdf"), 10), Ok("report.pdf".into()));
        assert_eq!(validate_upload(Some("deck.PPTX"), 10), Ok("deck.PPTX".into()));
        assert_eq!(validate_upload(Some("notes.Txt"), 10), Ok("notes.Txt".into()));
    }

    #[test]
    fn rejects_missing_or_empty_filename() {
        assert_eq!(validate_upload(None, 10), Err(ValidationError::MissingFile));
        assert_eq!(validate_upload(Some(""), 10), Err(ValidationError::MissingFile));
    }

    #[test]
    fn rejects_disallowed_or_absent_extension() {
        assert!(matches!(
            validate_upload(Some("malware.exe"), 10),
            Err(ValidationError::UnsupportedType(_))
        ));
        assert!(matches!(
            validate_upload(Some("README"), 10),
            Err(ValidationError::UnsupportedType(_))
        ));
        // Bare extension has an empty stem.
        assert!(matches!(
            validate_upload(Some(".pdf"), 10),
            Err(ValidationError::UnsupportedType(_)) | Err(ValidationError::InvalidFilename)
        ));
    }

    #[test]
    fn rejects_oversized_declared_length() {
        assert!(matches!(
            validate_upload(Some("big.pdf"), MAX_UPLOAD_BYTES + 1),
            Err(ValidationError::TooLarge { .. })
        ));
        assert!(validate_upload(Some("ok.pdf"), MAX_UPLOAD_BYTES).is_ok());
    }

    #[test]
    fn sanitize_strips_directories_and_unsafe_characters() {
        assert_eq!(sanitize_filename("../../etc/passwd"), Some("passwd".into()));
        assert_eq!(sanitize_filename("..\\..\\boot.ini"), Some("boot.ini".into()));
        assert_eq!(sanitize_filename("my report (v2).pdf"), Some("my_report__v2_.pdf".into()));
        assert_eq!(sanitize_filename("tmp/evil name.pdf"), Some("evil_name.pdf".into()));
    }

    #[test]
    fn sanitize_rejects_names_with_no_substance() {
        assert_eq!(sanitize_filename(""), None);
        assert_eq!(sanitize_filename(".."), None);
        assert_eq!(sanitize_filename("..."), None);
        assert_eq!(sanitize_filename("____"), None);
        assert_eq!(sanitize_filename("a/b/"), None);
    }

    #[test]
    fn sanitized_output_is_a_fixed_point() {
        for raw in ["report.pdf", "../../etc/passwd", "my file.docx"] {
            let first = sanitize_filename(raw).unwrap();
            assert_eq!(sanitize_filename(&first), Some(first.clone()));
        }
    }
}
