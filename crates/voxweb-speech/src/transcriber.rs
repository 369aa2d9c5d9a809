//! OpenAI-compatible speech transcription client.

use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use voxweb_protocols::error::SpeechError;
use voxweb_protocols::speech::Transcriber;

const DEFAULT_API_URL: &str = "https://api.openai.com/v1/audio/transcriptions";
const DEFAULT_MODEL: &str = "whisper-1";

#[derive(Debug, Deserialize)]
struct TranscriptionResponse {
    text: String,
}

/// Transcriber backed by an OpenAI-compatible transcription endpoint.
pub struct WhisperTranscriber {
    api_key: String,
    api_url: String,
    model: String,
    client: reqwest::Client,
}

impl WhisperTranscriber {
    pub fn new(api_key: String) -> Self {
        Self {
            api_key,
            api_url: DEFAULT_API_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            client: reqwest::Client::new(),
        }
    }

    /// Use a custom endpoint (for OpenAI-compatible APIs).
    pub fn with_url(mut self, api_url: String) -> Self {
        self.api_url = api_url;
        self
    }

    pub fn with_model(mut self, model: String) -> Self {
        self.model = model;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());
        self
    }
}

#[async_trait]
impl Transcriber for WhisperTranscriber {
    async fn transcribe(&self, wav: &Path) -> Result<Option<String>, SpeechError> {
        let bytes = tokio::fs::read(wav).await?;
        // The recording is consumed whatever the outcome
        let _ = tokio::fs::remove_file(wav).await;

        let part = reqwest::multipart::Part::bytes(bytes)
            .file_name("speech.wav")
            .mime_str("audio/wav")
            .map_err(|e| SpeechError::TranscriptionFailed(e.to_string()))?;
        let form = reqwest::multipart::Form::new()
            .text("model", self.model.clone())
            .part("file", part);

        let response = self
            .client
            .post(&self.api_url)
            .bearer_auth(&self.api_key)
            .multipart(form)
            .send()
            .await
            .map_err(|e| SpeechError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SpeechError::TranscriptionFailed(format!(
                "{}: {}",
                status, body
            )));
        }

        let body: TranscriptionResponse = response
            .json()
            .await
            .map_err(|e| SpeechError::Network(e.to_string()))?;

        let text = body.text.trim().to_string();
        if text.is_empty() {
            debug!("Transcription returned no speech");
            Ok(None)
        } else {
            debug!(text = %text, "Transcribed");
            Ok(Some(text))
        }
    }
}
