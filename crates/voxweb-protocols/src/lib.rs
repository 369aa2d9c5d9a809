//! # voxweb Protocols
//!
//! Collaborator contracts for the voxweb assistant. Contains only interface
//! definitions and shared value types - no implementations.
//!
//! ## Core Traits
//!
//! - [`BrowserControl`] - browser driver (navigate, click, scroll, history)
//! - [`VisionAnalyzer`] - screenshot-to-text analysis
//! - [`PageCapture`] - full-page screenshot capture
//! - [`SpeechOutput`] - text-to-speech playback
//! - [`Transcriber`] - speech-to-text
//! - [`StatusSink`] - transient one-line status display

pub mod action;
pub mod browser;
pub mod capture;
pub mod error;
pub mod speech;
pub mod status;
pub mod vision;

pub use action::CommandOutcome;
pub use browser::{BrowserControl, ScrollAmount, ScrollDirection};
pub use capture::{CaptureHandle, PageCapture};
pub use error::{BrowserError, SpeechError, VisionError};
pub use speech::{SpeechOutput, Transcriber};
pub use status::{NullStatusSink, StatusSink};
pub use vision::{AnalysisMode, VisionAnalyzer};
