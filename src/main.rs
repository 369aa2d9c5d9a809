//! voxweb - voice-driven web browsing assistant.
//!
//! Main entry point: configuration, tracing and component wiring.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tracing::{info, warn};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use voxweb_browser::{ChromeDriver, DriverConfig, ScreenshotCapture};
use voxweb_config::{Config, ConfigLoader};
use voxweb_dispatch::CommandDispatcher;
use voxweb_enrich::AnalysisEngine;
use voxweb_protocols::speech::SpeechOutput;
use voxweb_protocols::status::StatusSink;
use voxweb_protocols::vision::VisionAnalyzer;
use voxweb_speech::{ProcessRecorder, ProcessSynth, RecorderConfig, WhisperTranscriber};
use voxweb_vision::OpenAiVision;

mod session;
mod status;

use session::Session;
use status::ConsoleStatus;

/// voxweb CLI.
#[derive(Parser)]
#[command(name = "voxweb")]
#[command(about = "Voice-driven web browsing assistant")]
#[command(version)]
struct Cli {
    /// Configuration file path (default: ~/.voxweb/config.toml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Run the browser headless
    #[arg(long)]
    headless: bool,

    /// Chrome remote debugging port override
    #[arg(long)]
    debug_port: Option<u16>,
}

/// Get the .voxweb directory path.
fn voxweb_dir() -> PathBuf {
    dirs::home_dir()
        .map(|h| h.join(".voxweb"))
        .unwrap_or_else(|| PathBuf::from(".voxweb"))
}

/// Initialize tracing with console and file output.
///
/// Log files are written to ~/.voxweb/debug/ with daily rotation. Console
/// output goes to stderr so stdout stays clean for the prompt.
fn init_tracing() -> Result<(), Box<dyn std::error::Error>> {
    let log_dir = voxweb_dir().join("debug");
    std::fs::create_dir_all(&log_dir)?;

    let file_appender = RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix("voxweb")
        .filename_suffix("log")
        .max_log_files(30)
        .build(&log_dir)?;

    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    // Keep the writer guard alive for the program duration
    static GUARD: std::sync::OnceLock<tracing_appender::non_blocking::WorkerGuard> =
        std::sync::OnceLock::new();
    let _ = GUARD.set(guard);

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .with_ansi(true),
        )
        .with(fmt::layer().with_writer(non_blocking).with_ansi(false))
        .init();

    Ok(())
}

fn build_vision(config: &Config) -> Option<Arc<dyn VisionAnalyzer>> {
    if !config.vision.is_configured() {
        warn!("No vision API key configured; describe and read will be unavailable");
        return None;
    }
    let api_key = config.vision.api_key.clone()?;
    Some(Arc::new(
        OpenAiVision::new(api_key)
            .with_url(config.vision.api_url.clone())
            .with_model(config.vision.model.clone())
            .with_max_tokens(config.vision.max_tokens)
            .with_timeout(Duration::from_secs(config.vision.timeout_seconds)),
    ))
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing()?;

    let cli = Cli::parse();
    let config_path = cli
        .config
        .unwrap_or_else(|| voxweb_dir().join("config.toml"));
    let mut config = ConfigLoader::load_or_default(&config_path)?;
    if cli.headless {
        config.browser.headless = true;
    }
    if let Some(port) = cli.debug_port {
        config.browser.debug_port = port;
    }

    info!("Starting voxweb v{}", env!("CARGO_PKG_VERSION"));
    let temp_dir = config.session.resolve_temp_dir();
    let settle = Duration::from_secs(config.browser.settle_seconds);

    let browser = Arc::new(ChromeDriver::new(DriverConfig {
        debug_port: config.browser.debug_port,
        headless: config.browser.headless,
        viewport_width: config.browser.viewport_width,
        viewport_height: config.browser.viewport_height,
        profile_dir: config.browser.profile_dir.clone(),
        settle,
        chrome_binary: None,
    }));
    let capture = Arc::new(ScreenshotCapture::new(
        browser.clone(),
        temp_dir.join("screenshots"),
    ));

    let engine = Arc::new(AnalysisEngine::new(build_vision(&config)));
    let speech: Arc<dyn SpeechOutput> = Arc::new(ProcessSynth::new(config.speech.tts_command.clone()));
    let status: Arc<dyn StatusSink> = Arc::new(ConsoleStatus);

    let dispatcher = CommandDispatcher::new(
        browser.clone(),
        speech.clone(),
        capture.clone(),
        engine.clone(),
    );

    let mut session = Session::new(
        dispatcher,
        engine,
        browser,
        capture,
        speech,
        status,
        settle,
    );

    // Voice input shares the vision credentials (same provider account)
    if config.vision.is_configured() {
        if let Some(api_key) = config.vision.api_key.clone() {
            let recorder = ProcessRecorder::new(RecorderConfig {
                command: config.speech.recorder_command.clone(),
                sample_rate: config.speech.sample_rate,
                channels: config.speech.channels,
                temp_dir: temp_dir.join("speech"),
            });
            let transcriber = WhisperTranscriber::new(api_key)
                .with_url(config.speech.transcribe_url.clone())
                .with_model(config.speech.transcribe_model.clone());
            session = session.with_voice(recorder, Arc::new(transcriber));
        }
    } else {
        warn!("Voice input disabled (no transcription credentials)");
    }

    session.run().await?;
    info!("Shutting down");
    Ok(())
}
