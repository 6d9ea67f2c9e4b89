/*!
 * In-memory state of one subtitle editing session.
 *
 * A session owns the selected video, its timeline, the burn-in style and
 * the last rendered output, and drives the transcription and burn-in
 * workflows against a `SubtitleBackend`. Nothing is persisted.
 */

use anyhow::Context;
use bytes::Bytes;
use log::{error, info};

use crate::errors::{AppError, CollaboratorError, SubtitleError};
use crate::providers::{SubtitleBackend, VideoUpload};
use crate::style::{StyleOptions, StylePatch};
use crate::timeline::TimelineStore;

pub const MSG_GENERATING: &str = "Generating subtitles...";
pub const MSG_GENERATED: &str = "Subtitles generated. Review and edit as needed.";
pub const MSG_TRANSCRIBE_FAILED: &str = "Failed to transcribe. Please try again.";
pub const MSG_BURNING: &str = "Burning subtitles into video...";
pub const MSG_BURNED: &str = "Done! Your video is ready below.";
pub const MSG_BURN_FAILED: &str = "Failed to burn subtitles. Please try again.";

/// User-facing state of the last workflow
#[derive(Debug, Clone, PartialEq, Default)]
pub enum SessionStatus {
    #[default]
    Idle,
    /// A backend request is in flight
    Processing(String),
    /// The last workflow finished
    Done(String),
    /// The last workflow failed; the user may retry
    Failed(String),
}

impl SessionStatus {
    pub fn message(&self) -> Option<&str> {
        match self {
            Self::Idle => None,
            Self::Processing(msg) | Self::Done(msg) | Self::Failed(msg) => Some(msg),
        }
    }

    pub fn is_processing(&self) -> bool {
        matches!(self, Self::Processing(_))
    }
}

/// One video plus the subtitles being edited for it
#[derive(Debug, Default)]
pub struct EditorSession {
    video: Option<VideoUpload>,
    duration: f64,
    timeline: TimelineStore,
    style: StyleOptions,
    rendered: Option<Bytes>,
    status: SessionStatus,
}

impl EditorSession {
    pub fn new(timeline: TimelineStore, style: StyleOptions) -> Self {
        Self {
            timeline,
            style,
            ..Default::default()
        }
    }

    /// Select the video to work on; any earlier rendered output is dropped
    pub fn select_video(&mut self, video: VideoUpload) {
        info!("Selected video {} ({:.1} MB)", video.file_name, video.len() as f64 / (1024.0 * 1024.0));
        self.video = Some(video);
        self.rendered = None;
        self.status = SessionStatus::Idle;
    }

    pub fn video(&self) -> Option<&VideoUpload> {
        self.video.as_ref()
    }

    /// Duration reported by the last transcription, 0 if unknown
    pub fn duration(&self) -> f64 {
        self.duration
    }

    pub fn timeline(&self) -> &TimelineStore {
        &self.timeline
    }

    pub fn timeline_mut(&mut self) -> &mut TimelineStore {
        &mut self.timeline
    }

    pub fn style(&self) -> &StyleOptions {
        &self.style
    }

    /// Apply a partial style change; invalid results are rejected
    pub fn update_style(&mut self, patch: StylePatch) -> anyhow::Result<()> {
        let merged = self.style.merged(patch);
        merged.validate().context("Rejected style change")?;
        self.style = merged;
        Ok(())
    }

    pub fn rendered(&self) -> Option<&Bytes> {
        self.rendered.as_ref()
    }

    pub fn status(&self) -> &SessionStatus {
        &self.status
    }

    /// Whether a burn-in request may be sent right now
    pub fn can_burn(&self) -> bool {
        self.video.is_some() && !self.timeline.is_empty() && !self.status.is_processing()
    }

    /// Replace the timeline with the contents of an SRT file
    pub fn import_srt(&mut self, content: &str) -> Result<usize, SubtitleError> {
        let count = self.timeline.load_srt(content)?;
        info!("Imported {} subtitle entries", count);
        Ok(count)
    }

    /// Canonical SRT text of the timeline
    pub fn export_srt(&self) -> Result<String, SubtitleError> {
        self.timeline.to_srt()
    }

    /// Generate subtitles for the selected video, replacing the timeline
    pub async fn transcribe(&mut self, backend: &dyn SubtitleBackend) -> Result<usize, AppError> {
        let video = self
            .video
            .clone()
            .ok_or_else(|| CollaboratorError::InvalidInput("No video selected".to_string()))?;

        self.status = SessionStatus::Processing(MSG_GENERATING.to_string());

        let transcription = match backend.transcribe(&video).await {
            Ok(transcription) => transcription,
            Err(e) => {
                error!("Transcription failed: {}", e);
                self.status = SessionStatus::Failed(MSG_TRANSCRIBE_FAILED.to_string());
                return Err(e.into());
            }
        };

        // A malformed transcript leaves the previous timeline in place
        let count = match self.timeline.load_srt(&transcription.srt) {
            Ok(count) => count,
            Err(e) => {
                error!("Transcription returned unusable subtitles: {}", e);
                self.status = SessionStatus::Failed(MSG_TRANSCRIBE_FAILED.to_string());
                return Err(e.into());
            }
        };

        self.duration = transcription.duration;
        self.status = SessionStatus::Done(MSG_GENERATED.to_string());
        info!("Generated {} subtitle entries for {:.1}s of video", count, self.duration);
        Ok(count)
    }

    /// Burn the current timeline into the selected video
    pub async fn burn(&mut self, backend: &dyn SubtitleBackend) -> Result<Bytes, AppError> {
        let video = match (&self.video, self.timeline.is_empty()) {
            (None, _) => {
                return Err(CollaboratorError::InvalidInput("No video selected".to_string()).into());
            }
            (Some(_), true) => {
                return Err(CollaboratorError::InvalidInput("There are no subtitles to burn".to_string()).into());
            }
            (Some(video), false) => video.clone(),
        };

        let srt = self.timeline.to_srt()?;
        self.status = SessionStatus::Processing(MSG_BURNING.to_string());

        match backend.burn(&video, &srt, &self.style).await {
            Ok(rendered) => {
                info!("Received rendered video ({} bytes)", rendered.len());
                self.rendered = Some(rendered.clone());
                self.status = SessionStatus::Done(MSG_BURNED.to_string());
                Ok(rendered)
            }
            Err(e) => {
                error!("Burn-in failed: {}", e);
                self.status = SessionStatus::Failed(MSG_BURN_FAILED.to_string());
                Err(e.into())
            }
        }
    }
}
