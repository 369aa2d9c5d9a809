//! Interactive session orchestrator.
//!
//! Wires the dispatcher, the analysis engine and the collaborators into a
//! terminal loop: typed lines are dispatched as commands, `:listen` records
//! push-to-talk voice input, and page-mutating outcomes schedule a background
//! capture and analysis once the page has settled.

use std::sync::Arc;
use std::time::Duration;

use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};
use tracing::{debug, info, warn};

use voxweb_dispatch::CommandDispatcher;
use voxweb_enrich::AnalysisEngine;
use voxweb_protocols::browser::BrowserControl;
use voxweb_protocols::capture::PageCapture;
use voxweb_protocols::speech::{SpeechOutput, Transcriber};
use voxweb_protocols::status::StatusSink;
use voxweb_speech::ProcessRecorder;

/// One interactive assistant session.
pub struct Session {
    dispatcher: CommandDispatcher,
    engine: Arc<AnalysisEngine>,
    browser: Arc<dyn BrowserControl>,
    capture: Arc<dyn PageCapture>,
    speech: Arc<dyn SpeechOutput>,
    status: Arc<dyn StatusSink>,
    settle: Duration,
    recorder: Option<ProcessRecorder>,
    transcriber: Option<Arc<dyn Transcriber>>,
}

impl Session {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        dispatcher: CommandDispatcher,
        engine: Arc<AnalysisEngine>,
        browser: Arc<dyn BrowserControl>,
        capture: Arc<dyn PageCapture>,
        speech: Arc<dyn SpeechOutput>,
        status: Arc<dyn StatusSink>,
        settle: Duration,
    ) -> Self {
        Self {
            dispatcher,
            engine,
            browser,
            capture,
            speech,
            status,
            settle,
            recorder: None,
            transcriber: None,
        }
    }

    /// Enable voice input.
    pub fn with_voice(mut self, recorder: ProcessRecorder, transcriber: Arc<dyn Transcriber>) -> Self {
        self.recorder = Some(recorder);
        self.transcriber = Some(transcriber);
        self
    }

    /// Run the interactive loop until `:quit` or end of input.
    pub async fn run(&self) -> std::io::Result<()> {
        self.speech
            .speak("Voice assistant ready", self.status.clone())
            .await;
        println!("voxweb ready. Type a command, or :listen, :refresh, :clear, :cookies, :quit");

        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        loop {
            prompt();
            let Some(line) = lines.next_line().await? else {
                break;
            };
            let line = line.trim();
            match line {
                "" => continue,
                ":quit" | ":q" => break,
                ":listen" | ":l" => self.listen(&mut lines).await,
                ":refresh" => self.refresh_page().await,
                ":clear" => self.clear_cache().await,
                ":cookies" => self.toggle_auto_cookies().await,
                ":status" => self.print_status().await,
                command => self.handle_command(command).await,
            }
        }

        self.shutdown().await;
        Ok(())
    }

    /// Dispatch one command and schedule enrichment when warranted.
    pub async fn handle_command(&self, text: &str) {
        let outcome = self.dispatcher.dispatch(text, &self.status).await;

        if outcome.success {
            if let Some(url) = self.browser.current_location().await {
                self.status.update(&format!("On {}", url));
                if outcome.should_enrich {
                    self.schedule_enrichment(url);
                }
            }
        }
    }

    /// Capture and enqueue in the background once the page has settled;
    /// the command loop moves on immediately.
    fn schedule_enrichment(&self, url: String) {
        let capture = self.capture.clone();
        let engine = self.engine.clone();
        let settle = self.settle;

        tokio::spawn(async move {
            tokio::time::sleep(settle).await;
            let Some(handle) = capture.capture_full_page().await else {
                debug!(url, "No capture for background analysis");
                return;
            };
            engine.enqueue_background(&url, handle).await;
        });
    }

    /// Record until Enter, transcribe, and dispatch the result.
    async fn listen(&self, lines: &mut Lines<BufReader<Stdin>>) {
        let (Some(recorder), Some(transcriber)) = (&self.recorder, &self.transcriber) else {
            self.speech
                .speak("Voice input is not configured", self.status.clone())
                .await;
            return;
        };

        // Don't record our own narration
        self.speech.stop().await;

        if let Err(e) = recorder.start().await {
            warn!(error = %e, "Recording failed");
            self.speech.speak("Recording failed", self.status.clone()).await;
            return;
        }
        self.status.update("Recording... press Enter to stop");
        let _ = lines.next_line().await;

        let Some(wav) = recorder.stop().await else {
            self.status.update("Ready");
            return;
        };
        self.status.update("Processing...");

        match transcriber.transcribe(&wav).await {
            Ok(Some(text)) => {
                info!(command = %text, "Heard");
                println!("heard: {}", text);
                self.handle_command(&text).await;
            }
            Ok(None) => {
                self.speech
                    .speak("Didn't catch that", self.status.clone())
                    .await;
            }
            Err(e) => {
                warn!(error = %e, "Transcription failed");
                self.speech
                    .speak("Didn't catch that", self.status.clone())
                    .await;
            }
        }
    }

    /// Reload the page; its analyses are stale, so drop them and re-enrich.
    async fn refresh_page(&self) {
        let Some(url) = self.browser.current_location().await else {
            self.speech
                .speak("No page to refresh", self.status.clone())
                .await;
            return;
        };

        match self.browser.refresh().await {
            Ok(message) => {
                self.engine.invalidate(&url).await;
                self.speech.speak(&message, self.status.clone()).await;
                self.schedule_enrichment(url);
            }
            Err(e) => {
                warn!(error = %e, "Refresh failed");
                self.speech.speak("Refresh failed", self.status.clone()).await;
            }
        }
    }

    async fn clear_cache(&self) {
        self.engine.clear_all().await;
        self.speech.speak("Cache cleared", self.status.clone()).await;
    }

    async fn toggle_auto_cookies(&self) {
        let enabled = !self.browser.auto_cookies().await;
        self.browser.set_auto_cookies(enabled).await;
        let message = if enabled {
            "Auto cookies enabled for all pages"
        } else {
            "Auto cookies disabled"
        };
        self.speech.speak(message, self.status.clone()).await;
    }

    async fn print_status(&self) {
        let site = self
            .browser
            .current_location()
            .await
            .unwrap_or_else(|| "no site".to_string());
        println!(
            "site: {} | queued analyses: {} | vision: {}",
            site,
            self.engine.queued_len(),
            if self.engine.vision_available() { "on" } else { "off" }
        );
    }

    async fn shutdown(&self) {
        self.status.update("Exiting...");
        self.speech.stop().await;
        self.browser.close().await;
    }
}

fn prompt() {
    use std::io::Write;
    print!("> ");
    let _ = std::io::stdout().flush();
}
