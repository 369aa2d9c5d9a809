//! # voxweb Config
//!
//! TOML configuration for the voxweb assistant: typed schema with defaults,
//! `${VAR}` environment expansion and API-key validation.

pub mod error;
pub mod loader;
pub mod schema;

pub use error::ConfigError;
pub use loader::ConfigLoader;
pub use schema::{BrowserConfig, Config, SessionConfig, SpeechConfig, VisionConfig};
