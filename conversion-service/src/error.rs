//! Domain errors for the upload and conversion steps, and their mapping onto
//! the HTTP error type shared through `service_core`.

use service_core::error::AppError;
use thiserror::Error;

/// Rejections raised while receiving an upload. None of them leave a file behind.
#[derive(Debug, Error)]
pub enum UploadError {
    #[error("Invalid file type: {0}. Only Word documents are allowed.")]
    InvalidFileType(String),

    #[error("File is too large. Maximum size is {}MB", .limit / (1024 * 1024))]
    FileTooLarge { limit: usize },

    #[error("No file uploaded")]
    NoFileUploaded,

    /// A file part other than the single `file` field.
    #[error("Unexpected field")]
    UnexpectedField(String),

    #[error("Malformed multipart request: {0}")]
    Multipart(String),

    #[error("Failed to store upload: {0}")]
    Storage(#[from] std::io::Error),
}

impl UploadError {
    /// Label used for the `upload_rejections_total` metric.
    pub fn reason(&self) -> &'static str {
        match self {
            UploadError::InvalidFileType(_) => "invalid_file_type",
            UploadError::FileTooLarge { .. } => "file_too_large",
            UploadError::NoFileUploaded => "no_file",
            UploadError::UnexpectedField(_) => "unexpected_field",
            UploadError::Multipart(_) => "malformed",
            UploadError::Storage(_) => "storage",
        }
    }
}

impl From<UploadError> for AppError {
    fn from(err: UploadError) -> Self {
        match err {
            UploadError::Storage(e) => AppError::InternalError(anyhow::Error::new(e)),
            UploadError::NoFileUploaded => AppError::ProcessingError {
                message: "Error processing file".to_string(),
                details: UploadError::NoFileUploaded.to_string(),
            },
            other => AppError::BadRequest(anyhow::anyhow!(other.to_string())),
        }
    }
}

/// Failure reported by the external conversion tool. The message is kept as
/// the tool produced it.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{0}")]
pub struct ConversionError(pub String);

impl ConversionError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }

    pub fn message(&self) -> &str {
        &self.0
    }
}

impl From<ConversionError> for AppError {
    fn from(err: ConversionError) -> Self {
        AppError::ProcessingError {
            message: "Error processing file".to_string(),
            details: err.0,
        }
    }
}
