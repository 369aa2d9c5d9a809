//! Full-page screenshot capture.

use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::warn;
use uuid::Uuid;

use voxweb_protocols::capture::{CaptureHandle, PageCapture};

use crate::driver::ChromeDriver;

/// Captures full-page PNGs into a temp directory.
///
/// Each capture becomes an exclusively owned [`CaptureHandle`]; the file is
/// deleted when the handle is dropped, wherever that happens.
pub struct ScreenshotCapture {
    driver: Arc<ChromeDriver>,
    dir: PathBuf,
}

impl ScreenshotCapture {
    pub fn new(driver: Arc<ChromeDriver>, dir: PathBuf) -> Self {
        if let Err(e) = std::fs::create_dir_all(&dir) {
            warn!(dir = %dir.display(), error = %e, "Failed to create screenshot dir");
        }
        Self { driver, dir }
    }
}

#[async_trait]
impl PageCapture for ScreenshotCapture {
    async fn capture_full_page(&self) -> Option<CaptureHandle> {
        let conn = match self.driver.connection().await {
            Ok(conn) => conn,
            Err(e) => {
                warn!(error = %e, "No browser connection for capture");
                return None;
            }
        };

        let png = match conn.capture_png(true).await {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!(error = %e, "Screenshot failed");
                return None;
            }
        };

        let path = self.dir.join(format!("screenshot_{}.png", Uuid::new_v4()));
        if let Err(e) = tokio::fs::write(&path, &png).await {
            warn!(path = %path.display(), error = %e, "Failed to write screenshot");
            return None;
        }

        Some(CaptureHandle::new(path))
    }
}
