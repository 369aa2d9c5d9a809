//! Enrichment task definition.

use chrono::{DateTime, Utc};

use voxweb_protocols::capture::CaptureHandle;

/// A unit of deferred analysis work.
///
/// Created when a page-mutating action completes and at least one cache
/// lacks an entry for the resulting page. Consumed exactly once by the
/// background worker; dropping the task releases the capture file.
#[derive(Debug)]
pub struct EnrichmentTask {
    /// Page the capture belongs to.
    pub page_key: String,
    /// Screenshot to analyze. Exclusively owned by this task.
    pub capture: CaptureHandle,
    /// Submission time.
    pub enqueued_at: DateTime<Utc>,
}

impl EnrichmentTask {
    /// Create a new task, taking ownership of the capture.
    pub fn new(page_key: impl Into<String>, capture: CaptureHandle) -> Self {
        Self {
            page_key: page_key.into(),
            capture,
            enqueued_at: Utc::now(),
        }
    }

    /// How long the task has been waiting.
    pub fn age(&self) -> chrono::Duration {
        Utc::now() - self.enqueued_at
    }
}
