//! Process-based text-to-speech.

use std::process::Stdio;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use tokio::process::{Child, Command};
use tokio::sync::Mutex;
use tracing::{info, warn};

use voxweb_protocols::speech::SpeechOutput;
use voxweb_protocols::status::StatusSink;

/// Speaks text by piping it to an external TTS command (`say` on macOS,
/// `espeak` elsewhere).
///
/// Playback runs on its own task so the command loop never waits on audio;
/// a new utterance or an explicit stop interrupts the current one.
pub struct ProcessSynth {
    command: String,
    speaking: Arc<AtomicBool>,
    child: Arc<Mutex<Option<Child>>>,
}

impl ProcessSynth {
    pub fn new(command: Option<String>) -> Self {
        let command = command.unwrap_or_else(|| {
            if cfg!(target_os = "macos") {
                "say".to_string()
            } else {
                "espeak".to_string()
            }
        });
        Self {
            command,
            speaking: Arc::new(AtomicBool::new(false)),
            child: Arc::new(Mutex::new(None)),
        }
    }

    /// Whether playback is in progress.
    pub fn is_speaking(&self) -> bool {
        self.speaking.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SpeechOutput for ProcessSynth {
    async fn speak(&self, text: &str, status: Arc<dyn StatusSink>) {
        info!("Assistant: {}", text);
        self.stop().await;

        let command = self.command.clone();
        let text = text.to_string();
        let speaking = self.speaking.clone();
        let slot = self.child.clone();

        tokio::spawn(async move {
            speaking.store(true, Ordering::SeqCst);
            status.update("Speaking...");

            let spawned = Command::new(&command)
                .arg(&text)
                .stdin(Stdio::null())
                .stdout(Stdio::null())
                .stderr(Stdio::null())
                .kill_on_drop(true)
                .spawn();

            match spawned {
                Ok(child) => {
                    *slot.lock().await = Some(child);
                    // Poll rather than own the child, so stop() can take and
                    // kill it from outside this task.
                    loop {
                        tokio::time::sleep(Duration::from_millis(100)).await;
                        let mut guard = slot.lock().await;
                        let exited = match guard.as_mut() {
                            // Interrupted by stop()
                            None => break,
                            Some(child) => !matches!(child.try_wait(), Ok(None)),
                        };
                        if exited {
                            guard.take();
                            break;
                        }
                    }
                }
                Err(e) => {
                    // The text was already logged above, which is the fallback
                    warn!(command = %command, error = %e, "TTS unavailable");
                }
            }

            speaking.store(false, Ordering::SeqCst);
            status.update("Ready");
        });
    }

    async fn stop(&self) {
        if let Some(mut child) = self.child.lock().await.take() {
            let _ = child.kill().await;
        }
        self.speaking.store(false, Ordering::SeqCst);
    }
}
