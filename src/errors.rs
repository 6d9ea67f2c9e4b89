/*!
 * Error types for the subtitler application.
 *
 * This module contains custom error types for different parts of the application,
 * using the thiserror crate for ergonomic error definitions.
 */

use thiserror::Error;

use crate::timeline::EntryId;

/// Errors raised by the subtitle timeline engine
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SubtitleError {
    /// Malformed timestamp or structurally invalid block
    #[error("Format error: {0}")]
    Format(String),

    /// Mutation referenced an id that is not in the timeline
    #[error("Subtitle entry not found: {0}")]
    NotFound(EntryId),

    /// A start or end time that can never be encoded
    #[error("Invalid time value: {0}")]
    InvalidTime(f64),

    /// A batch handed to the timeline reuses an id
    #[error("Duplicate subtitle entry id: {0}")]
    DuplicateId(EntryId),
}

impl SubtitleError {
    /// Shorthand for building a format error
    pub fn format(message: impl Into<String>) -> Self {
        Self::Format(message.into())
    }
}

/// Errors that can occur when talking to the transcription or burn-in backend
#[derive(Error, Debug)]
pub enum CollaboratorError {
    /// Error when making an API request fails
    #[error("API request failed: {0}")]
    RequestFailed(String),

    /// Error when parsing an API response fails
    #[error("Failed to parse API response: {0}")]
    ParseError(String),

    /// Error returned by the backend itself
    #[error("API responded with error: {status_code} - {message}")]
    ApiError {
        /// HTTP status code
        status_code: u16,
        /// Error message from the backend
        message: String,
    },

    /// Error establishing or maintaining a connection
    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// The request could not be built from local input
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl CollaboratorError {
    /// Whether a caller may reasonably try the same request again
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::ConnectionError(_) | Self::RequestFailed(_) => true,
            Self::ApiError { status_code, .. } => *status_code == 429 || *status_code >= 500,
            Self::ParseError(_) | Self::InvalidInput(_) => false,
        }
    }
}

/// Main application error type that wraps all other errors
#[derive(Error, Debug)]
pub enum AppError {
    /// Error from a file operation
    #[error("File error: {0}")]
    File(String),

    /// Error from the timeline engine
    #[error("Subtitle error: {0}")]
    Subtitle(#[from] SubtitleError),

    /// Error from a backend collaborator
    #[error("Collaborator error: {0}")]
    Collaborator(#[from] CollaboratorError),

    /// Any other error
    #[error("Unknown error: {0}")]
    Unknown(String),
}

// Utility functions for error conversion
impl From<anyhow::Error> for AppError {
    fn from(error: anyhow::Error) -> Self {
        Self::Unknown(error.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(error: std::io::Error) -> Self {
        Self::File(error.to_string())
    }
}
