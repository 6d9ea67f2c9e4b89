/*!
 * Tests for the editing session workflows against the mock backend
 */

use anyhow::Result;
use bytes::Bytes;

use subtitler::errors::{AppError, CollaboratorError};
use subtitler::providers::mock::{MockBackend, MockCall};
use subtitler::providers::retry::{RetryPolicy, RetryingBackend};
use subtitler::providers::VideoUpload;
use subtitler::session::{
    EditorSession, SessionStatus, MSG_BURNED, MSG_BURN_FAILED, MSG_GENERATED, MSG_TRANSCRIBE_FAILED,
};
use subtitler::style::{StyleOptions, StylePatch, SubtitlePosition};
use subtitler::subtitle_processor::EntryField;
use crate::common;

fn session() -> EditorSession {
    EditorSession::new(common::sequential_timeline(), StyleOptions::default())
}

fn video() -> VideoUpload {
    VideoUpload::new("clip.mp4", Bytes::from_static(b"video"))
}

fn fast_retries(max_retries: u32) -> RetryPolicy {
    RetryPolicy { max_retries, backoff_base_ms: 1 }
}

/// Test a successful transcription
#[tokio::test]
async fn test_transcribe_withWorkingBackend_shouldFillTimeline() -> Result<()> {
    common::init_test_logger();
    let backend = MockBackend::working(common::SHUFFLED_SRT, 14.0);
    let mut session = session();
    session.select_video(video());

    let count = session.transcribe(&backend).await?;

    assert_eq!(count, 3);
    assert_eq!(session.duration(), 14.0);
    assert_eq!(session.status(), &SessionStatus::Done(MSG_GENERATED.to_string()));
    assert_eq!(session.export_srt()?, common::SAMPLE_SRT);
    assert_eq!(backend.calls(), vec![MockCall::Transcribe { file_name: "clip.mp4".to_string() }]);
    Ok(())
}

/// Test that transcription needs a video
#[tokio::test]
async fn test_transcribe_withoutVideo_shouldNotCallBackend() {
    let backend = MockBackend::working(common::SAMPLE_SRT, 14.0);
    let mut session = session();

    let result = session.transcribe(&backend).await;

    assert!(matches!(result, Err(AppError::Collaborator(CollaboratorError::InvalidInput(_)))));
    assert_eq!(backend.request_count(), 0);
}

/// Test that a failed transcription keeps the existing timeline
#[tokio::test]
async fn test_transcribe_withFailingBackend_shouldKeepTimelineAndReportFailure() -> Result<()> {
    let backend = MockBackend::failing(500);
    let mut session = session();
    session.import_srt(common::SAMPLE_SRT)?;
    session.select_video(video());

    let result = session.transcribe(&backend).await;

    assert!(result.is_err());
    assert_eq!(session.timeline().len(), 3);
    assert_eq!(session.status().message(), Some(MSG_TRANSCRIBE_FAILED));
    Ok(())
}

/// Test that an unusable transcript is treated as a failure
#[tokio::test]
async fn test_transcribe_withMalformedTranscript_shouldKeepTimeline() -> Result<()> {
    let backend = MockBackend::working("1\nnonsense --> 00:00:02,000\nHi", 2.0);
    let mut session = session();
    session.import_srt(common::SAMPLE_SRT)?;
    session.select_video(video());

    let result = session.transcribe(&backend).await;

    assert!(matches!(result, Err(AppError::Subtitle(_))));
    assert_eq!(session.timeline().len(), 3);
    assert_eq!(session.status().message(), Some(MSG_TRANSCRIBE_FAILED));
    Ok(())
}

/// Test a successful burn-in with edited subtitles and style
#[tokio::test]
async fn test_burn_afterEdits_shouldSendCurrentTimelineAndStyle() -> Result<()> {
    let backend = MockBackend::working(common::SAMPLE_SRT, 14.0).with_rendered(&b"mp4"[..]);
    let mut session = session();
    session.select_video(video());
    session.transcribe(&backend).await?;

    let first = session.timeline().view()[0].id.clone();
    session.timeline_mut().update_field(&first, EntryField::Text("Edited".to_string()))?;
    session.update_style(StylePatch { position: Some(SubtitlePosition::Top), ..Default::default() })?;

    let rendered = session.burn(&backend).await?;

    assert_eq!(rendered, Bytes::from_static(b"mp4"));
    assert_eq!(session.rendered(), Some(&rendered));
    assert_eq!(session.status().message(), Some(MSG_BURNED));

    match backend.calls().last() {
        Some(MockCall::Burn { file_name, srt, style }) => {
            assert_eq!(file_name, "clip.mp4");
            assert!(srt.starts_with("1\n00:00:01,000 --> 00:00:04,000\nEdited"));
            assert_eq!(style.position, SubtitlePosition::Top);
        }
        other => panic!("expected a burn call, got {:?}", other),
    }
    Ok(())
}

/// Test that burn-in is refused locally without subtitles
#[tokio::test]
async fn test_burn_withEmptyTimeline_shouldNotCallBackend() {
    let backend = MockBackend::working("", 0.0);
    let mut session = session();
    session.select_video(video());
    assert!(!session.can_burn());

    let result = session.burn(&backend).await;

    assert!(matches!(result, Err(AppError::Collaborator(CollaboratorError::InvalidInput(_)))));
    assert_eq!(backend.request_count(), 0);
}

/// Test that burn-in is refused locally without a video
#[tokio::test]
async fn test_burn_withoutVideo_shouldNotCallBackend() -> Result<()> {
    let backend = MockBackend::working("", 0.0);
    let mut session = session();
    session.import_srt(common::SAMPLE_SRT)?;
    assert!(!session.can_burn());

    assert!(session.burn(&backend).await.is_err());
    assert_eq!(backend.request_count(), 0);
    Ok(())
}

/// Test the failure notice of a burn-in
#[tokio::test]
async fn test_burn_withFailingBackend_shouldReportFailure() -> Result<()> {
    let backend = MockBackend::failing(503);
    let mut session = session();
    session.import_srt(common::SAMPLE_SRT)?;
    session.select_video(video());

    assert!(session.burn(&backend).await.is_err());
    assert_eq!(session.status().message(), Some(MSG_BURN_FAILED));
    assert!(session.rendered().is_none());
    Ok(())
}

/// Test that picking another video drops the rendered output
#[tokio::test]
async fn test_select_video_afterBurn_shouldClearRenderedOutput() -> Result<()> {
    let backend = MockBackend::working("", 0.0);
    let mut session = session();
    session.import_srt(common::SAMPLE_SRT)?;
    session.select_video(video());
    session.burn(&backend).await?;
    assert!(session.rendered().is_some());

    session.select_video(VideoUpload::new("other.mp4", Bytes::from_static(b"other")));

    assert!(session.rendered().is_none());
    assert_eq!(session.status(), &SessionStatus::Idle);
    assert_eq!(session.timeline().len(), 3);
    Ok(())
}

/// Test that an invalid style change is refused and the old style kept
#[test]
fn test_update_style_withInvalidColor_shouldKeepPreviousStyle() {
    let mut session = session();

    let result = session.update_style(StylePatch { color: Some("red".to_string()), ..Default::default() });

    assert!(result.is_err());
    assert_eq!(session.style(), &StyleOptions::default());
}

/// Test that transient failures are retried by the wrapper
#[tokio::test]
async fn test_retrying_backend_withIntermittentFailures_shouldEventuallySucceed() -> Result<()> {
    let backend = RetryingBackend::new(MockBackend::intermittent(2, common::SAMPLE_SRT, 14.0), fast_retries(2));
    let mut session = session();
    session.select_video(video());

    let count = session.transcribe(&backend).await?;

    assert_eq!(count, 3);
    assert_eq!(backend.inner().request_count(), 3);
    Ok(())
}

/// Test that retries stop after the configured count
#[tokio::test]
async fn test_retrying_backend_withTooManyFailures_shouldGiveUp() {
    let backend = RetryingBackend::new(MockBackend::intermittent(5, common::SAMPLE_SRT, 14.0), fast_retries(2));
    let mut session = session();
    session.select_video(video());

    let result = session.transcribe(&backend).await;

    assert!(matches!(result, Err(AppError::Collaborator(CollaboratorError::ConnectionError(_)))));
    assert_eq!(backend.inner().request_count(), 3);
}

/// Test that permanent failures are not retried
#[tokio::test]
async fn test_retrying_backend_withClientError_shouldNotRetry() {
    let backend = RetryingBackend::new(MockBackend::failing(400), fast_retries(3));
    let mut session = session();
    session.select_video(video());

    assert!(session.transcribe(&backend).await.is_err());
    assert_eq!(backend.inner().request_count(), 1);
}
