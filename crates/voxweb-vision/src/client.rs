//! OpenAI-compatible vision client.

use std::time::Duration;

use async_trait::async_trait;
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use tracing::debug;

use voxweb_protocols::error::VisionError;
use voxweb_protocols::vision::{AnalysisMode, VisionAnalyzer};

use crate::api::{ApiMessage, ApiRequest, ApiResponse, ContentPart, ImageUrl};

const DEFAULT_API_URL: &str = "https://api.openai.com/v1/chat/completions";
const DEFAULT_MODEL: &str = "gpt-4o";
const DEFAULT_MAX_TOKENS: u32 = 300;

/// Prompt for page descriptions.
pub const DESCRIBE_PROMPT: &str = "Describe this webpage briefly. Focus on key navigation \
     elements and main content. Keep it concise.";

/// Prompt for main-content summaries.
pub const CONTENT_PROMPT: &str = "Summarize the main content of this page. Ignore menus, \
     ads, and navigation. Be brief and direct.";

/// Vision analyzer backed by an OpenAI-compatible chat-completions endpoint.
pub struct OpenAiVision {
    api_key: String,
    api_url: String,
    model: String,
    max_tokens: u32,
    client: reqwest::Client,
}

impl OpenAiVision {
    pub fn new(api_key: String) -> Self {
        Self {
            api_key,
            api_url: DEFAULT_API_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            max_tokens: DEFAULT_MAX_TOKENS,
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

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    /// Set an overall request timeout. Hung analyses surface as one
    /// [`VisionError::Network`] outcome instead of blocking the caller.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());
        self
    }

    fn prompt_for(mode: AnalysisMode) -> &'static str {
        match mode {
            AnalysisMode::Describe => DESCRIBE_PROMPT,
            AnalysisMode::Content => CONTENT_PROMPT,
        }
    }

    fn build_request(&self, image_png: &[u8], mode: AnalysisMode) -> ApiRequest {
        let data_url = format!("data:image/png;base64,{}", BASE64.encode(image_png));
        ApiRequest {
            model: self.model.clone(),
            messages: vec![ApiMessage {
                role: "user".to_string(),
                content: vec![
                    ContentPart::Text {
                        text: Self::prompt_for(mode).to_string(),
                    },
                    ContentPart::ImageUrl {
                        image_url: ImageUrl { url: data_url },
                    },
                ],
            }],
            max_tokens: self.max_tokens,
        }
    }

    async fn send_request(&self, api_request: &ApiRequest) -> Result<ApiResponse, VisionError> {
        let response = self
            .client
            .post(&self.api_url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(api_request)
            .send()
            .await
            .map_err(|e| VisionError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            // Error JSON shape: {"error": {"message": "...", "type": "..."}}
            let message = serde_json::from_str::<serde_json::Value>(&body)
                .ok()
                .and_then(|v| v["error"]["message"].as_str().map(String::from))
                .unwrap_or(body);
            return Err(match status.as_u16() {
                401 | 403 => VisionError::AuthenticationFailed(message),
                429 => VisionError::RateLimited,
                code => VisionError::ApiError {
                    status: code,
                    message,
                },
            });
        }

        response
            .json()
            .await
            .map_err(|e| VisionError::Network(e.to_string()))
    }
}

#[async_trait]
impl VisionAnalyzer for OpenAiVision {
    async fn analyze(&self, image_png: &[u8], mode: AnalysisMode) -> Result<String, VisionError> {
        if image_png.is_empty() {
            return Err(VisionError::Image("empty screenshot".to_string()));
        }

        let request = self.build_request(image_png, mode);
        debug!(model = %self.model, ?mode, bytes = image_png.len(), "Sending analysis request");
        let response = self.send_request(&request).await?;

        let text = response
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .ok_or_else(|| VisionError::InvalidResponse("no completion text".to_string()))?;

        Ok(text)
    }
}

#[cfg(test)]
#[path = "client_tests.rs"]
mod tests;
