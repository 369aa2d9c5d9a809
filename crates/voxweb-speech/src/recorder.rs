//! Push-to-talk audio recorder.

use std::path::{Path, PathBuf};
use std::process::Stdio;

use tokio::process::{Child, Command};
use tokio::sync::Mutex;
use tracing::{debug, warn};
use uuid::Uuid;

use voxweb_protocols::error::SpeechError;

/// Recorder configuration.
#[derive(Debug, Clone)]
pub struct RecorderConfig {
    /// Recording command. Auto-detected per platform when unset
    /// (`arecord` on Linux, `rec` elsewhere).
    pub command: Option<String>,
    pub sample_rate: u32,
    pub channels: u8,
    /// Directory for recorded WAV files.
    pub temp_dir: PathBuf,
}

impl RecorderConfig {
    pub fn new(temp_dir: PathBuf) -> Self {
        Self {
            command: None,
            sample_rate: 44100,
            channels: 1,
            temp_dir,
        }
    }

    fn resolve_command(&self) -> String {
        self.command.clone().unwrap_or_else(|| {
            if cfg!(target_os = "linux") {
                "arecord".to_string()
            } else {
                "rec".to_string()
            }
        })
    }
}

/// Records microphone audio to a WAV file via an external capture process.
///
/// Start spawns the process; stop kills it and hands back the file. One
/// recording at a time.
pub struct ProcessRecorder {
    config: RecorderConfig,
    active: Mutex<Option<(Child, PathBuf)>>,
}

impl ProcessRecorder {
    pub fn new(config: RecorderConfig) -> Self {
        if let Err(e) = std::fs::create_dir_all(&config.temp_dir) {
            warn!(dir = %config.temp_dir.display(), error = %e, "Failed to create recording dir");
        }
        Self {
            config,
            active: Mutex::new(None),
        }
    }

    fn build_command(&self, path: &Path) -> Command {
        let program = self.config.resolve_command();
        let mut command = Command::new(&program);
        if program.ends_with("arecord") {
            command
                .arg("-q")
                .arg("-f")
                .arg("S16_LE")
                .arg("-r")
                .arg(self.config.sample_rate.to_string())
                .arg("-c")
                .arg(self.config.channels.to_string())
                .arg(path);
        } else {
            // sox-style: rec -q -r RATE -c CH FILE
            command
                .arg("-q")
                .arg("-r")
                .arg(self.config.sample_rate.to_string())
                .arg("-c")
                .arg(self.config.channels.to_string())
                .arg(path);
        }
        command
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true);
        command
    }

    /// Start capturing. Fails if a recording is already in progress.
    pub async fn start(&self) -> Result<(), SpeechError> {
        let mut active = self.active.lock().await;
        if active.is_some() {
            return Err(SpeechError::AlreadyRecording);
        }

        let path = self
            .config
            .temp_dir
            .join(format!("recording_{}.wav", Uuid::new_v4()));
        let child = self
            .build_command(&path)
            .spawn()
            .map_err(|e| SpeechError::RecorderFailed(e.to_string()))?;

        debug!(path = %path.display(), "Recording started");
        *active = Some((child, path));
        Ok(())
    }

    /// Stop capturing and return the recorded file.
    ///
    /// Returns `None` when no recording was active or nothing usable was
    /// captured.
    pub async fn stop(&self) -> Option<PathBuf> {
        let (mut child, path) = self.active.lock().await.take()?;
        let _ = child.kill().await;
        let _ = child.wait().await;

        // A WAV header alone is 44 bytes; anything at or below that is an
        // empty take.
        match std::fs::metadata(&path) {
            Ok(meta) if meta.len() > 44 => {
                debug!(path = %path.display(), bytes = meta.len(), "Recording stopped");
                Some(path)
            }
            _ => {
                let _ = std::fs::remove_file(&path);
                None
            }
        }
    }

    /// Whether a recording is in progress.
    pub async fn is_recording(&self) -> bool {
        self.active.lock().await.is_some()
    }
}
