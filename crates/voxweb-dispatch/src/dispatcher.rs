//! Command dispatch state machine.

use std::sync::Arc;

use tracing::{debug, info, warn};

use voxweb_enrich::AnalysisEngine;
use voxweb_protocols::action::CommandOutcome;
use voxweb_protocols::browser::BrowserControl;
use voxweb_protocols::capture::PageCapture;
use voxweb_protocols::speech::SpeechOutput;
use voxweb_protocols::status::StatusSink;
use voxweb_protocols::vision::AnalysisMode;

use crate::phrase;

/// Spoken in response to "help".
const HELP_TEXT: &str = "Available commands: navigate to, describe, read, click on, scroll, \
     back, forward, accept cookies, help";

/// Maps one recognized command string to collaborator calls.
///
/// Categories are matched in a fixed priority order; the first match wins.
/// That ordering is load-bearing - categories overlap in keywords ("read and
/// describe" matches both describe and read, "click the back button" matches
/// both click and back).
///
/// Every branch speaks exactly one confirmation or failure phrase and
/// returns a [`CommandOutcome`]; collaborator failures are normalized here
/// and never propagate to the caller.
pub struct CommandDispatcher {
    browser: Arc<dyn BrowserControl>,
    speech: Arc<dyn SpeechOutput>,
    capture: Arc<dyn PageCapture>,
    engine: Arc<AnalysisEngine>,
}

impl CommandDispatcher {
    pub fn new(
        browser: Arc<dyn BrowserControl>,
        speech: Arc<dyn SpeechOutput>,
        capture: Arc<dyn PageCapture>,
        engine: Arc<AnalysisEngine>,
    ) -> Self {
        Self {
            browser,
            speech,
            capture,
            engine,
        }
    }

    /// Dispatch one recognized command.
    pub async fn dispatch(&self, raw: &str, status: &Arc<dyn StatusSink>) -> CommandOutcome {
        let text = raw.to_lowercase();
        let text = text.trim();
        info!(command = text, "Dispatching command");

        if let Some(target) = phrase::navigation_target(text) {
            return self.navigate(&target, status).await;
        }
        if phrase::contains_any(text, phrase::DESCRIBE_KEYWORDS) {
            return self.analyze_page(AnalysisMode::Describe, status).await;
        }
        if phrase::contains_any(text, phrase::READ_KEYWORDS) {
            return self.analyze_page(AnalysisMode::Content, status).await;
        }
        if text.contains("click") {
            return self.click(text, status).await;
        }
        if text.contains("scroll") {
            return self.scroll(text, status).await;
        }
        if text.contains("back") {
            return self.history(false, status).await;
        }
        if text.contains("forward") {
            return self.history(true, status).await;
        }
        if text.contains("accept cookie") {
            return self.accept_cookies(status).await;
        }
        if text.contains("help") {
            self.say(HELP_TEXT, status).await;
            return CommandOutcome::ok(false);
        }

        self.say("Command not recognized", status).await;
        CommandOutcome::failed()
    }

    async fn navigate(&self, target: &str, status: &Arc<dyn StatusSink>) -> CommandOutcome {
        match self.browser.navigate(target).await {
            Ok(message) => {
                self.say(&message, status).await;
                CommandOutcome::ok(true)
            }
            Err(e) => {
                warn!(target, error = %e, "Navigation failed");
                self.say("Navigation failed", status).await;
                CommandOutcome::failed()
            }
        }
    }

    /// Cache-aware describe/read. Enrichment is warranted only when the
    /// cache missed; a served cache hit costs nothing and changes nothing.
    async fn analyze_page(
        &self,
        mode: AnalysisMode,
        status: &Arc<dyn StatusSink>,
    ) -> CommandOutcome {
        let Some(key) = self.browser.current_location().await else {
            self.say("Not on any webpage", status).await;
            return CommandOutcome::failed();
        };

        let cached = match mode {
            AnalysisMode::Describe => self.engine.lookup_description(&key).await,
            AnalysisMode::Content => self.engine.lookup_content(&key).await,
        };
        if let Some(text) = cached {
            debug!(key, ?mode, "Serving cached analysis");
            self.say(&text, status).await;
            return CommandOutcome::ok(false);
        }

        status.update(match mode {
            AnalysisMode::Describe => "Analyzing page...",
            AnalysisMode::Content => "Reading content...",
        });

        let Some(capture) = self.capture.capture_full_page().await else {
            self.say("Cannot capture page", status).await;
            return CommandOutcome::failed_after_miss();
        };

        let analysis = match mode {
            AnalysisMode::Describe => self.engine.get_or_analyze_description(&key, capture).await,
            AnalysisMode::Content => self.engine.get_or_analyze_content(&key, capture).await,
        };
        self.say(&analysis.text, status).await;

        if analysis.success() {
            CommandOutcome::ok(!analysis.from_cache())
        } else {
            CommandOutcome::failed_after_miss()
        }
    }

    async fn click(&self, text: &str, status: &Arc<dyn StatusSink>) -> CommandOutcome {
        let target = phrase::click_target(text);
        if target.is_empty() {
            self.say("What should I click?", status).await;
            return CommandOutcome::failed();
        }

        match self.browser.click(&target).await {
            Ok(message) => {
                self.say(&message, status).await;
                CommandOutcome::ok(true)
            }
            Err(e) => {
                warn!(target, error = %e, "Click failed");
                self.say(&e.to_string(), status).await;
                CommandOutcome::failed()
            }
        }
    }

    async fn scroll(&self, text: &str, status: &Arc<dyn StatusSink>) -> CommandOutcome {
        let (direction, amount) = phrase::parse_scroll(text);
        match self.browser.scroll(direction, amount).await {
            Ok(message) => {
                self.say(&message, status).await;
                CommandOutcome::ok(false)
            }
            Err(e) => {
                warn!(error = %e, "Scroll failed");
                self.say(&e.to_string(), status).await;
                CommandOutcome::failed()
            }
        }
    }

    async fn history(&self, forward: bool, status: &Arc<dyn StatusSink>) -> CommandOutcome {
        let result = if forward {
            self.browser.forward().await
        } else {
            self.browser.back().await
        };
        match result {
            Ok(message) => {
                self.say(&message, status).await;
                CommandOutcome::ok(true)
            }
            Err(e) => {
                warn!(forward, error = %e, "History navigation failed");
                self.say(&e.to_string(), status).await;
                CommandOutcome::failed()
            }
        }
    }

    async fn accept_cookies(&self, status: &Arc<dyn StatusSink>) -> CommandOutcome {
        match self.browser.accept_cookies().await {
            Ok(message) => {
                self.say(&message, status).await;
                CommandOutcome::ok(false)
            }
            Err(e) => {
                self.say(&e.to_string(), status).await;
                CommandOutcome::failed()
            }
        }
    }

    async fn say(&self, text: &str, status: &Arc<dyn StatusSink>) {
        self.speech.speak(text, status.clone()).await;
    }
}

#[cfg(test)]
#[path = "dispatcher_tests.rs"]
mod tests;
