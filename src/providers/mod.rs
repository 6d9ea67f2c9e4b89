/*!
 * Clients for the transcription and burn-in backend.
 *
 * - `backend`: HTTP client for the `/api/transcribe` and `/api/burn` endpoints
 * - `mock`: scriptable in-memory backend for tests and offline runs
 * - `retry`: caller-side retry policy wrapped around any backend
 */

use async_trait::async_trait;
use bytes::Bytes;
use std::fmt::Debug;
use std::path::Path;

use crate::errors::CollaboratorError;
use crate::style::StyleOptions;

pub mod backend;
pub mod mock;
pub mod retry;

/// Video file contents ready to be uploaded
#[derive(Debug, Clone, PartialEq)]
pub struct VideoUpload {
    /// File name reported to the backend
    pub file_name: String,
    /// Raw file contents
    pub bytes: Bytes,
}

impl VideoUpload {
    pub fn new(file_name: impl Into<String>, bytes: impl Into<Bytes>) -> Self {
        Self {
            file_name: file_name.into(),
            bytes: bytes.into(),
        }
    }

    /// Read a video from disk
    pub async fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, CollaboratorError> {
        let path = path.as_ref();
        let bytes = tokio::fs::read(path).await.map_err(|e| {
            CollaboratorError::InvalidInput(format!("Failed to read video {}: {}", path.display(), e))
        })?;

        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "video".to_string());

        Ok(Self::new(file_name, bytes))
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Result of a transcription request
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Transcription {
    /// Generated subtitles in SRT format
    pub srt: String,
    /// Duration of the video in seconds
    pub duration: f64,
}

/// Common trait for transcription and burn-in backends
///
/// Implementations report failures and never retry on their own; retry
/// policy belongs to the caller.
#[async_trait]
pub trait SubtitleBackend: Send + Sync + Debug {
    /// Generate subtitles for a video
    async fn transcribe(&self, video: &VideoUpload) -> Result<Transcription, CollaboratorError>;

    /// Render `srt` into the video with the given style, returning the new video bytes
    async fn burn(&self, video: &VideoUpload, srt: &str, style: &StyleOptions) -> Result<Bytes, CollaboratorError>;
}
