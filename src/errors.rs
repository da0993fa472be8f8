//! Boundary error handling.
//!
//! Core operations return typed errors; this module unifies them into
//! `AppError` and maps each kind to exactly one user-facing notice. Every
//! user-facing route converts failures into a redirect back to `/` carrying
//! the notice code — no raw failure page ever reaches the end user.

use crate::services::{
    layout::LayoutError, processor::ProcessorError, validation::ValidationError,
};
use axum::response::{IntoResponse, Redirect, Response};
use std::io;
use thiserror::Error;
use tracing::{debug, error, warn};

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Layout(#[from] LayoutError),
    #[error("request body exceeds the upload limit")]
    BodyTooLarge,
    #[error("failed to persist upload: {0}")]
    Persistence(#[source] io::Error),
    #[error(transparent)]
    Processing(#[from] ProcessorError),
    #[error("processing finished without producing a viewer entry point")]
    IncompleteOutput,
    #[error("document not found")]
    NotFound,
    #[error("no active session")]
    NoSession,
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Unexpected(#[from] anyhow::Error),
}

/// User-facing notices, one per error kind plus the success message.
///
/// Codes travel in the redirect query string; messages are rendered by the
/// index page. This table is the single place where outcomes become words.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Notice {
    Uploaded,
    NoFile,
    InvalidFilename,
    InvalidType,
    FileTooLarge,
    PersistFailed,
    ProcessingFailed,
    ProcessingIncomplete,
    NotFound,
    NoSession,
    InvalidPath,
    Internal,
}

const NOTICES: [(Notice, &str, &str); 12] = [
    (Notice::Uploaded, "uploaded", "File successfully uploaded."),
    (Notice::NoFile, "no_file", "No file selected."),
    (Notice::InvalidFilename, "invalid_filename", "Invalid filename."),
    (
        Notice::InvalidType,
        "invalid_type",
        "Invalid file type. Please upload a supported document.",
    ),
    (
        Notice::FileTooLarge,
        "file_too_large",
        "File is too large. Maximum size is 16MB.",
    ),
    (
        Notice::PersistFailed,
        "persist_failed",
        "Failed to save uploaded file. Please try again.",
    ),
    (
        Notice::ProcessingFailed,
        "processing_failed",
        "Failed to process document. Please try again or use a different file.",
    ),
    (
        Notice::ProcessingIncomplete,
        "processing_incomplete",
        "Document processing incomplete. Please try again.",
    ),
    (Notice::NotFound, "not_found", "File not found."),
    (Notice::NoSession, "no_session", "No active session."),
    (Notice::InvalidPath, "invalid_path", "Invalid file path."),
    (
        Notice::Internal,
        "internal_error",
        "An unexpected error occurred. Please try again.",
    ),
];

impl Notice {
    pub fn code(self) -> &'static str {
        NOTICES
            .iter()
            .find(|(n, ..)| *n == self)
            .map(|(_, c, _)| *c)
            .unwrap_or("internal_error")
    }

    pub fn message(self) -> &'static str {
        NOTICES
            .iter()
            .find(|(n, ..)| *n == self)
            .map(|(.., m)| *m)
            .unwrap_or("An unexpected error occurred.")
    }

    pub fn from_code(code: &str) -> Option<Self> {
        NOTICES.iter().find(|(_, c, _)| *c == code).map(|(n, ..)| *n)
    }

    /// Redirect to the index page carrying this notice.
    pub fn redirect(self) -> Redirect {
        Redirect::to(&format!("/?notice={}", self.code()))
    }
}

impl AppError {
    pub fn notice(&self) -> Notice {
        match self {
            AppError::Validation(ValidationError::MissingFile) => Notice::NoFile,
            AppError::Validation(ValidationError::InvalidFilename) => Notice::InvalidFilename,
            AppError::Validation(ValidationError::UnsupportedType(_)) => Notice::InvalidType,
            AppError::Validation(ValidationError::TooLarge { .. }) | AppError::BodyTooLarge => {
                Notice::FileTooLarge
            }
            AppError::Layout(LayoutError::Containment(_) | LayoutError::InvalidAssetName) => {
                Notice::InvalidPath
            }
            AppError::Layout(LayoutError::InvalidIdentifier(_)) => Notice::NotFound,
            AppError::Persistence(_) => Notice::PersistFailed,
            AppError::Processing(_) => Notice::ProcessingFailed,
            AppError::IncompleteOutput => Notice::ProcessingIncomplete,
            AppError::NotFound => Notice::NotFound,
            AppError::NoSession => Notice::NoSession,
            AppError::Io(_) | AppError::Unexpected(_) => Notice::Internal,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match &self {
            AppError::Layout(LayoutError::Containment(path)) => {
                warn!(path = %path.display(), "containment violation rejected");
            }
            AppError::Validation(err) => {
                debug!(%err, "upload rejected");
            }
            AppError::NotFound | AppError::NoSession | AppError::BodyTooLarge => {
                debug!(err = %self, "request refused");
            }
            other => {
                error!(err = %other, "request failed");
            }
        }
        self.notice().redirect().into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_round_trip_through_the_table() {
        for (notice, code, _) in NOTICES {
            assert_eq!(Notice::from_code(code), Some(notice));
            assert_eq!(notice.code(), code);
        }
        assert_eq!(Notice::from_code("nonsense"), None);
    }

    #[test]
    fn each_error_kind_maps_to_one_notice() {
        assert_eq!(
            AppError::from(ValidationError::MissingFile).notice(),
            Notice::NoFile
        );
        assert_eq!(
            AppError::from(LayoutError::Containment("x".into())).notice(),
            Notice::InvalidPath
        );
        // Unusable asset components are a path problem, not a missing file.
        assert_eq!(
            AppError::from(LayoutError::InvalidAssetName).notice(),
            Notice::InvalidPath
        );
        assert_eq!(
            AppError::from(LayoutError::InvalidIdentifier("x".into())).notice(),
            Notice::NotFound
        );
        assert_eq!(
            AppError::IncompleteOutput.notice(),
            Notice::ProcessingIncomplete
        );
        assert_eq!(AppError::NoSession.notice(), Notice::NoSession);
    }
}
