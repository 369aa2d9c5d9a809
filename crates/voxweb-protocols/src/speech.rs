//! Speech input/output contracts.

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;

use crate::error::SpeechError;
use crate::status::StatusSink;

/// Text-to-speech playback.
///
/// `speak` is fire-and-forget: it returns once playback has been scheduled on
/// its own task, so the command loop is never blocked by narration. A new
/// `speak` or an explicit `stop` interrupts whatever is playing.
#[async_trait]
pub trait SpeechOutput: Send + Sync {
    async fn speak(&self, text: &str, status: Arc<dyn StatusSink>);

    /// Interrupt any ongoing playback.
    async fn stop(&self);
}

/// Speech-to-text.
#[async_trait]
pub trait Transcriber: Send + Sync {
    /// Transcribe a recorded WAV file.
    ///
    /// Returns `Ok(None)` when the audio contained no recognizable speech.
    /// The audio file is consumed (deleted) by the call.
    async fn transcribe(&self, wav: &Path) -> Result<Option<String>, SpeechError>;
}
