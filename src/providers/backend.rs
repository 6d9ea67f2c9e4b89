use async_trait::async_trait;
use bytes::Bytes;
use log::{debug, error};
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Response};
use serde::Deserialize;
use std::time::Duration;

use crate::app_config::BackendConfig;
use crate::errors::CollaboratorError;
use crate::providers::{SubtitleBackend, Transcription, VideoUpload};
use crate::style::StyleOptions;

/// HTTP client for the subtitle backend
#[derive(Debug, Clone)]
pub struct HttpBackend {
    /// Base URL without trailing slash
    base_url: String,
    /// HTTP client for making requests
    client: Client,
}

/// Response body of `/api/transcribe`
#[derive(Debug, Deserialize)]
struct TranscribeResponse {
    #[serde(default)]
    srt: Option<String>,
    #[serde(default)]
    duration: Option<f64>,
}

impl HttpBackend {
    /// Create a client for `endpoint` with a per-request timeout
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Self {
        let endpoint = endpoint.into();
        Self {
            base_url: endpoint.trim_end_matches('/').to_string(),
            client: Client::builder()
                .timeout(timeout)
                .pool_idle_timeout(Duration::from_secs(90))
                .build()
                .unwrap_or_default(),
        }
    }

    /// Create a client from the backend section of the config
    pub fn from_config(config: &BackendConfig) -> anyhow::Result<Self> {
        let url = config.base_url()?;
        Ok(Self::new(url.as_str(), Duration::from_secs(config.timeout_secs)))
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    fn video_part(video: &VideoUpload) -> Part {
        Part::bytes(video.bytes.to_vec()).file_name(video.file_name.clone())
    }

    async fn post(&self, path: &str, form: Form) -> Result<Response, CollaboratorError> {
        let url = self.url(path);
        debug!("POST {}", url);

        let response = self.client.post(&url)
            .multipart(form)
            .send()
            .await
            .map_err(|e| {
                if e.is_connect() || e.is_timeout() {
                    CollaboratorError::ConnectionError(format!("{}: {}", url, e))
                } else {
                    CollaboratorError::RequestFailed(format!("{}: {}", url, e))
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await
                .unwrap_or_else(|_| "Failed to get error response text".to_string());
            error!("Backend error on {} ({}): {}", path, status, error_text);
            return Err(CollaboratorError::ApiError {
                status_code: status.as_u16(),
                message: error_text,
            });
        }

        Ok(response)
    }
}

#[async_trait]
impl SubtitleBackend for HttpBackend {
    async fn transcribe(&self, video: &VideoUpload) -> Result<Transcription, CollaboratorError> {
        let form = Form::new().part("file", Self::video_part(video));
        let response = self.post("api/transcribe", form).await?;

        let body = response.text().await
            .map_err(|e| CollaboratorError::RequestFailed(format!("Failed to read transcription response: {}", e)))?;
        let parsed: TranscribeResponse = serde_json::from_str(&body)
            .map_err(|e| CollaboratorError::ParseError(format!("Invalid transcription response: {}", e)))?;

        Ok(Transcription {
            srt: parsed.srt.unwrap_or_default(),
            duration: parsed.duration.unwrap_or(0.0),
        })
    }

    async fn burn(&self, video: &VideoUpload, srt: &str, style: &StyleOptions) -> Result<Bytes, CollaboratorError> {
        let mut form = Form::new()
            .part("file", Self::video_part(video))
            .text("srt", srt.to_string());
        for (name, value) in style.to_form_fields() {
            form = form.text(name, value);
        }

        let response = self.post("api/burn", form).await?;
        response.bytes().await
            .map_err(|e| CollaboratorError::RequestFailed(format!("Failed to read rendered video: {}", e)))
    }
}
