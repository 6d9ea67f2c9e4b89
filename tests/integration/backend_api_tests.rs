/*!
 * Tests for the HTTP backend client against a local mock server
 */

use std::time::Duration;
use bytes::Bytes;
use serde_json::json;
use wiremock::{
    matchers::{method, path},
    Mock, MockServer, ResponseTemplate,
};

use subtitler::errors::CollaboratorError;
use subtitler::providers::backend::HttpBackend;
use subtitler::providers::{SubtitleBackend, VideoUpload};
use subtitler::style::{StyleOptions, SubtitlePosition};
use crate::common;

fn sample_video() -> VideoUpload {
    VideoUpload::new("clip.mp4", Bytes::from_static(b"fake video bytes"))
}

fn backend_for(server: &MockServer) -> HttpBackend {
    HttpBackend::new(server.uri(), Duration::from_secs(5))
}

async fn single_request_body(server: &MockServer) -> String {
    let requests = server.received_requests().await.unwrap_or_default();
    assert_eq!(requests.len(), 1, "expected exactly one request");
    String::from_utf8_lossy(&requests[0].body).into_owned()
}

/// Test a successful transcription
#[tokio::test]
async fn test_transcribe_withValidResponse_shouldReturnSrtAndDuration() {
    common::init_test_logger();
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/transcribe"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "srt": common::SAMPLE_SRT,
            "duration": 14.5
        })))
        .expect(1)
        .mount(&server)
        .await;

    let transcription = backend_for(&server).transcribe(&sample_video()).await.unwrap();

    assert_eq!(transcription.srt, common::SAMPLE_SRT);
    assert_eq!(transcription.duration, 14.5);

    let body = single_request_body(&server).await;
    assert!(body.contains("name=\"file\""));
    assert!(body.contains("filename=\"clip.mp4\""));
    assert!(body.contains("fake video bytes"));
}

/// Test that missing response fields fall back to empty values
#[tokio::test]
async fn test_transcribe_withEmptyObject_shouldDefaultFields() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/transcribe"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .mount(&server)
        .await;

    let transcription = backend_for(&server).transcribe(&sample_video()).await.unwrap();

    assert_eq!(transcription.srt, "");
    assert_eq!(transcription.duration, 0.0);
}

/// Test that a non-JSON body is reported as a parse error
#[tokio::test]
async fn test_transcribe_withGarbageBody_shouldReturnParseError() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/transcribe"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&server)
        .await;

    let result = backend_for(&server).transcribe(&sample_video()).await;

    assert!(matches!(result, Err(CollaboratorError::ParseError(_))));
}

/// Test that backend failures carry the status and body
#[tokio::test]
async fn test_transcribe_withServerError_shouldReturnApiError() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/transcribe"))
        .respond_with(ResponseTemplate::new(500).set_body_string("whisper crashed"))
        .mount(&server)
        .await;

    let result = backend_for(&server).transcribe(&sample_video()).await;

    match result {
        Err(error @ CollaboratorError::ApiError { .. }) => {
            assert!(error.is_retryable());
            if let CollaboratorError::ApiError { status_code, message } = error {
                assert_eq!(status_code, 500);
                assert_eq!(message, "whisper crashed");
            }
        }
        other => panic!("expected an API error, got {:?}", other),
    }
}

/// Test a successful burn-in request and its form fields
#[tokio::test]
async fn test_burn_withStyle_shouldSendAllFieldsAndReturnBytes() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/burn"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "video/mp4")
                .set_body_bytes(b"rendered mp4".to_vec()),
        )
        .expect(1)
        .mount(&server)
        .await;

    let style = StyleOptions {
        position: SubtitlePosition::Top,
        color: "#FF0000".to_string(),
        font_size: 32,
        bg_opacity: 0.25,
    };
    let rendered = backend_for(&server)
        .burn(&sample_video(), common::SAMPLE_SRT, &style)
        .await
        .unwrap();

    assert_eq!(rendered, Bytes::from_static(b"rendered mp4"));

    let body = single_request_body(&server).await;
    for (name, value) in [
        ("srt", "00:00:01,000 --> 00:00:04,000"),
        ("position", "top"),
        ("color", "#FF0000"),
        ("font_size", "32"),
        ("bg_opacity", "0.25"),
    ] {
        assert!(body.contains(&format!("name=\"{}\"", name)), "missing field {}", name);
        assert!(body.contains(value), "missing value {} for {}", value, name);
    }
    assert!(body.contains("filename=\"clip.mp4\""));
}

/// Test that a rejected burn-in is not retryable
#[tokio::test]
async fn test_burn_withBadRequest_shouldReturnPermanentError() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/burn"))
        .respond_with(ResponseTemplate::new(422).set_body_string("invalid srt"))
        .mount(&server)
        .await;

    let result = backend_for(&server)
        .burn(&sample_video(), "", &StyleOptions::default())
        .await;

    match result {
        Err(error) => {
            assert!(!error.is_retryable());
            assert!(error.to_string().contains("422"));
        }
        Ok(_) => panic!("expected the burn-in to fail"),
    }
}

/// Test that an unreachable backend is a connection error
#[tokio::test]
async fn test_transcribe_withUnreachableBackend_shouldReturnConnectionError() {
    let backend = HttpBackend::new("http://127.0.0.1:1", Duration::from_secs(2));

    let result = backend.transcribe(&sample_video()).await;

    assert!(matches!(result, Err(CollaboratorError::ConnectionError(_))));
}

/// Test that a slow backend hits the request timeout
#[tokio::test]
async fn test_transcribe_withSlowBackend_shouldTimeOut() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/transcribe"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(3)))
        .mount(&server)
        .await;

    let backend = HttpBackend::new(server.uri(), Duration::from_millis(300));
    let result = backend.transcribe(&sample_video()).await;

    assert!(matches!(result, Err(CollaboratorError::ConnectionError(_))));
}
