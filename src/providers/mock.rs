/*!
 * Mock backend implementation for testing.
 *
 * - `MockBackend::working(srt, duration)` - Always succeeds
 * - `MockBackend::failing(status)` - Always fails with an API error
 * - `MockBackend::intermittent(fail_first)` - Fails with connection errors, then succeeds
 */

use async_trait::async_trait;
use bytes::Bytes;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::errors::CollaboratorError;
use crate::providers::{SubtitleBackend, Transcription, VideoUpload};
use crate::style::StyleOptions;

/// Behavior mode for the mock backend
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MockBehavior {
    /// Always succeeds
    Working,
    /// Always fails with the given HTTP status
    Failing { status_code: u16 },
    /// Fails with a connection error for the first `fail_first` calls
    Intermittent { fail_first: usize },
}

/// A request received by the mock
#[derive(Debug, Clone, PartialEq)]
pub enum MockCall {
    Transcribe { file_name: String },
    Burn { file_name: String, srt: String, style: StyleOptions },
}

/// Mock backend for testing session and controller workflows
#[derive(Debug)]
pub struct MockBackend {
    behavior: MockBehavior,
    transcription: Transcription,
    rendered: Bytes,
    calls: Mutex<Vec<MockCall>>,
    request_count: AtomicUsize,
}

impl MockBackend {
    pub fn new(behavior: MockBehavior, transcription: Transcription) -> Self {
        Self {
            behavior,
            transcription,
            rendered: Bytes::from_static(b"rendered video"),
            calls: Mutex::new(Vec::new()),
            request_count: AtomicUsize::new(0),
        }
    }

    /// Backend that always returns `srt` and `duration`
    pub fn working(srt: impl Into<String>, duration: f64) -> Self {
        Self::new(
            MockBehavior::Working,
            Transcription {
                srt: srt.into(),
                duration,
            },
        )
    }

    /// Backend that always fails with `status_code`
    pub fn failing(status_code: u16) -> Self {
        Self::new(MockBehavior::Failing { status_code }, Transcription::default())
    }

    /// Backend that drops the first `fail_first` requests
    pub fn intermittent(fail_first: usize, srt: impl Into<String>, duration: f64) -> Self {
        Self::new(
            MockBehavior::Intermittent { fail_first },
            Transcription {
                srt: srt.into(),
                duration,
            },
        )
    }

    /// Bytes returned by a successful burn
    pub fn with_rendered(mut self, rendered: impl Into<Bytes>) -> Self {
        self.rendered = rendered.into();
        self
    }

    /// Requests received so far, in order
    pub fn calls(&self) -> Vec<MockCall> {
        self.calls.lock().clone()
    }

    pub fn request_count(&self) -> usize {
        self.request_count.load(Ordering::SeqCst)
    }

    fn check_behavior(&self) -> Result<(), CollaboratorError> {
        let attempt = self.request_count.fetch_add(1, Ordering::SeqCst);
        match self.behavior {
            MockBehavior::Working => Ok(()),
            MockBehavior::Failing { status_code } => Err(CollaboratorError::ApiError {
                status_code,
                message: "mock failure".to_string(),
            }),
            MockBehavior::Intermittent { fail_first } if attempt < fail_first => {
                Err(CollaboratorError::ConnectionError("mock connection reset".to_string()))
            }
            MockBehavior::Intermittent { .. } => Ok(()),
        }
    }
}

#[async_trait]
impl SubtitleBackend for MockBackend {
    async fn transcribe(&self, video: &VideoUpload) -> Result<Transcription, CollaboratorError> {
        self.calls.lock().push(MockCall::Transcribe {
            file_name: video.file_name.clone(),
        });
        self.check_behavior()?;
        Ok(self.transcription.clone())
    }

    async fn burn(&self, video: &VideoUpload, srt: &str, style: &StyleOptions) -> Result<Bytes, CollaboratorError> {
        self.calls.lock().push(MockCall::Burn {
            file_name: video.file_name.clone(),
            srt: srt.to_string(),
            style: style.clone(),
        });
        self.check_behavior()?;
        Ok(self.rendered.clone())
    }
}
