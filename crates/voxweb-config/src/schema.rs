//! Configuration schema definitions.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Root configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub vision: VisionConfig,

    #[serde(default)]
    pub browser: BrowserConfig,

    #[serde(default)]
    pub speech: SpeechConfig,

    #[serde(default)]
    pub session: SessionConfig,
}

impl Config {
    /// Validate cross-field constraints that serde cannot express.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(key) = &self.vision.api_key {
            if !key.is_empty() && !VisionConfig::key_format_ok(key) {
                return Err(ConfigError::InvalidValue {
                    field: "vision.api_key".to_string(),
                    message: "must start with sk- and be at least 40 characters".to_string(),
                });
            }
        }
        if self.browser.settle_seconds > 60 {
            return Err(ConfigError::InvalidValue {
                field: "browser.settle_seconds".to_string(),
                message: "must be at most 60".to_string(),
            });
        }
        Ok(())
    }
}

/// Vision analysis configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VisionConfig {
    /// API key. Leave unset to disable vision analysis entirely.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    #[serde(default = "default_vision_url")]
    pub api_url: String,

    #[serde(default = "default_vision_model")]
    pub model: String,

    #[serde(default = "default_vision_max_tokens")]
    pub max_tokens: u32,

    #[serde(default = "default_vision_timeout")]
    pub timeout_seconds: u64,
}

impl Default for VisionConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            api_url: default_vision_url(),
            model: default_vision_model(),
            max_tokens: default_vision_max_tokens(),
            timeout_seconds: default_vision_timeout(),
        }
    }
}

impl VisionConfig {
    /// Whether a usable API key is present.
    pub fn is_configured(&self) -> bool {
        self.api_key
            .as_deref()
            .is_some_and(Self::key_format_ok)
    }

    fn key_format_ok(key: &str) -> bool {
        key.starts_with("sk-") && key.len() >= 40
    }
}

fn default_vision_url() -> String {
    "https://api.openai.com/v1/chat/completions".to_string()
}

fn default_vision_model() -> String {
    "gpt-4o".to_string()
}

fn default_vision_max_tokens() -> u32 {
    300
}

fn default_vision_timeout() -> u64 {
    60
}

/// Browser driver configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrowserConfig {
    /// Chrome remote debugging port.
    #[serde(default = "default_debug_port")]
    pub debug_port: u16,

    #[serde(default)]
    pub headless: bool,

    #[serde(default = "default_viewport_width")]
    pub viewport_width: u32,

    #[serde(default = "default_viewport_height")]
    pub viewport_height: u32,

    /// Profile directory for persistent login state.
    /// Default: ~/.voxweb/browser-profile
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile_dir: Option<PathBuf>,

    /// Seconds to wait for a page to settle after a mutating action.
    #[serde(default = "default_settle_seconds")]
    pub settle_seconds: u64,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            debug_port: default_debug_port(),
            headless: false,
            viewport_width: default_viewport_width(),
            viewport_height: default_viewport_height(),
            profile_dir: None,
            settle_seconds: default_settle_seconds(),
        }
    }
}

fn default_debug_port() -> u16 {
    9222
}

fn default_viewport_width() -> u32 {
    1280
}

fn default_viewport_height() -> u32 {
    720
}

fn default_settle_seconds() -> u64 {
    2
}

/// Speech recording, transcription and synthesis configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpeechConfig {
    /// Recording command. Auto-detected per platform when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recorder_command: Option<String>,

    #[serde(default = "default_sample_rate")]
    pub sample_rate: u32,

    #[serde(default = "default_channels")]
    pub channels: u8,

    /// Synthesis command. Auto-detected per platform when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tts_command: Option<String>,

    #[serde(default = "default_transcribe_url")]
    pub transcribe_url: String,

    #[serde(default = "default_transcribe_model")]
    pub transcribe_model: String,
}

impl Default for SpeechConfig {
    fn default() -> Self {
        Self {
            recorder_command: None,
            sample_rate: default_sample_rate(),
            channels: default_channels(),
            tts_command: None,
            transcribe_url: default_transcribe_url(),
            transcribe_model: default_transcribe_model(),
        }
    }
}

fn default_sample_rate() -> u32 {
    44100
}

fn default_channels() -> u8 {
    1
}

fn default_transcribe_url() -> String {
    "https://api.openai.com/v1/audio/transcriptions".to_string()
}

fn default_transcribe_model() -> String {
    "whisper-1".to_string()
}

/// Session-level configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Directory for screenshot and speech temp files.
    /// Default: the system temp directory under a voxweb subfolder.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temp_dir: Option<PathBuf>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self { temp_dir: None }
    }
}

impl SessionConfig {
    /// Resolve the temp directory, falling back to the system default.
    pub fn resolve_temp_dir(&self) -> PathBuf {
        self.temp_dir
            .clone()
            .unwrap_or_else(|| std::env::temp_dir().join("voxweb"))
    }
}
