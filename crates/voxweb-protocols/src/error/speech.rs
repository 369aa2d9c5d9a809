//! Speech input/output errors.

use thiserror::Error;

/// Speech pipeline error types.
#[derive(Debug, Error)]
pub enum SpeechError {
    /// The capture process could not be started.
    #[error("Recorder failed: {0}")]
    RecorderFailed(String),

    /// A recording is already in progress.
    #[error("Already recording")]
    AlreadyRecording,

    /// The transcription service rejected or failed the request.
    #[error("Transcription failed: {0}")]
    TranscriptionFailed(String),

    /// Transport-level failure.
    #[error("Network error: {0}")]
    Network(String),

    /// The playback process could not be started.
    #[error("Playback failed: {0}")]
    PlaybackFailed(String),

    /// Audio file I/O failure.
    #[error("Audio file error: {0}")]
    Io(#[from] std::io::Error),
}
