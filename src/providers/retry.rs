use async_trait::async_trait;
use bytes::Bytes;
use log::warn;
use std::future::Future;
use std::time::Duration;

use crate::app_config::BackendConfig;
use crate::errors::CollaboratorError;
use crate::providers::{SubtitleBackend, Transcription, VideoUpload};
use crate::style::StyleOptions;

/// How often and how patiently a caller retries a failed backend request
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetryPolicy {
    /// Extra attempts after the first failure
    pub max_retries: u32,
    /// Base backoff time in milliseconds, doubled on each retry
    pub backoff_base_ms: u64,
}

impl RetryPolicy {
    pub fn none() -> Self {
        Self {
            max_retries: 0,
            backoff_base_ms: 0,
        }
    }

    pub fn from_config(config: &BackendConfig) -> Self {
        Self {
            max_retries: config.retry_count,
            backoff_base_ms: config.retry_backoff_ms,
        }
    }

    /// Delay before retry number `attempt` (1-based)
    pub fn backoff(&self, attempt: u32) -> Duration {
        let factor = 1u64 << attempt.saturating_sub(1).min(16);
        Duration::from_millis(self.backoff_base_ms.saturating_mul(factor))
    }

    /// Run `operation` until it succeeds, fails permanently, or retries run out
    pub async fn run<T, F, Fut>(&self, what: &str, mut operation: F) -> Result<T, CollaboratorError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, CollaboratorError>>,
    {
        let mut attempt = 0;
        loop {
            match operation().await {
                Ok(value) => return Ok(value),
                Err(e) if e.is_retryable() && attempt < self.max_retries => {
                    attempt += 1;
                    let delay = self.backoff(attempt);
                    warn!("{} failed ({}), retrying in {:?} ({}/{})", what, e, delay, attempt, self.max_retries);
                    tokio::time::sleep(delay).await;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

/// Backend wrapper that applies a `RetryPolicy` to every request
#[derive(Debug)]
pub struct RetryingBackend<B> {
    inner: B,
    policy: RetryPolicy,
}

impl<B: SubtitleBackend> RetryingBackend<B> {
    pub fn new(inner: B, policy: RetryPolicy) -> Self {
        Self { inner, policy }
    }

    pub fn inner(&self) -> &B {
        &self.inner
    }
}

#[async_trait]
impl<B: SubtitleBackend> SubtitleBackend for RetryingBackend<B> {
    async fn transcribe(&self, video: &VideoUpload) -> Result<Transcription, CollaboratorError> {
        self.policy.run("Transcription", || self.inner.transcribe(video)).await
    }

    async fn burn(&self, video: &VideoUpload, srt: &str, style: &StyleOptions) -> Result<Bytes, CollaboratorError> {
        self.policy.run("Burn-in", || self.inner.burn(video, srt, style)).await
    }
}
