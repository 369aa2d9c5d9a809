//! Screenshot capture contract and handle ownership.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::{debug, warn};

/// Exclusive owner of a captured screenshot file.
///
/// The handle is moved, never cloned: from the capture layer into either an
/// inline analysis call or an enrichment queue entry. Dropping the handle
/// deletes the backing file, so a handle can never outlive its owner or leak
/// when an enqueue turns out to be a no-op.
#[derive(Debug)]
pub struct CaptureHandle {
    path: PathBuf,
}

impl CaptureHandle {
    /// Take ownership of the file at `path`.
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// Location of the captured image.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the captured image bytes.
    pub fn read(&self) -> std::io::Result<Vec<u8>> {
        std::fs::read(&self.path)
    }
}

impl Drop for CaptureHandle {
    fn drop(&mut self) {
        match std::fs::remove_file(&self.path) {
            Ok(()) => debug!("Released capture {}", self.path.display()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => warn!("Failed to release capture {}: {}", self.path.display(), e),
        }
    }
}

/// Full-page screenshot capture.
#[async_trait]
pub trait PageCapture: Send + Sync {
    /// Capture the current page as one PNG.
    ///
    /// Returns `None` when no page is available or the capture failed;
    /// failures are logged, not propagated.
    async fn capture_full_page(&self) -> Option<CaptureHandle>;
}
