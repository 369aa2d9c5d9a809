//! # voxweb Speech
//!
//! Thin audio collaborators: a process-based push-to-talk recorder, an
//! OpenAI-compatible transcription client, and process-based text-to-speech
//! with interruption.

mod recorder;
mod synth;
mod transcriber;

pub use recorder::{ProcessRecorder, RecorderConfig};
pub use synth::ProcessSynth;
pub use transcriber::WhisperTranscriber;
