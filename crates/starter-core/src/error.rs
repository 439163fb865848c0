//! Error types for project creation

use thiserror::Error;

/// Errors raised while turning a request into a project archive.
///
/// The first three variants are caller mistakes; the rest are server side.
#[derive(Debug, Error)]
pub enum ProjectError {
    #[error("Invalid {field}: '{value}'")]
    InvalidField { field: &'static str, value: String },

    #[error("Unknown short extension id: '{0}'")]
    UnknownShortId(String),

    #[error("Unknown extension: '{0}'")]
    UnknownExtension(String),

    #[error("Error during project creation")]
    Generation(#[from] GenerationError),

    #[error("I/O error during project creation: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to package project: {0}")]
    Archive(#[from] zip::result::ZipError),
}

impl ProjectError {
    pub(crate) fn invalid(field: &'static str, value: impl Into<String>) -> Self {
        Self::InvalidField {
            field,
            value: value.into(),
        }
    }

    /// True for errors caused by the request itself rather than the server
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidField { .. } | Self::UnknownShortId(_) | Self::UnknownExtension(_)
        )
    }
}

/// Failure reported by a [`ProjectGenerator`](crate::generator::ProjectGenerator)
#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("generator reported an unsuccessful result: {0}")]
    Unsuccessful(String),

    #[error("codestart '{codestart}' references missing file '{file}'")]
    MissingFile { codestart: String, file: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
