//! Analysis cache and enrichment engine.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use voxweb_protocols::capture::CaptureHandle;
use voxweb_protocols::vision::{AnalysisMode, VisionAnalyzer};

use crate::cache::AnalysisCache;
use crate::task::EnrichmentTask;
use crate::worker;

/// Text returned when a page description cannot be produced. Never cached.
pub const DESCRIBE_FAILED: &str = "Could not analyze page";

/// Text returned when a content summary cannot be produced. Never cached.
pub const CONTENT_FAILED: &str = "Could not read content";

/// Text returned when no vision client is configured.
pub const NOT_CONFIGURED: &str = "Vision analysis is not configured";

/// Where an analysis result came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnalysisSource {
    /// Served from the cache, no external call made.
    Cache,
    /// Freshly analyzed and now cached.
    Fresh,
    /// Analysis could not be produced; the text is a sentinel phrase.
    Failed,
}

/// An analysis result with its provenance.
#[derive(Debug, Clone)]
pub struct Analysis {
    pub text: String,
    pub source: AnalysisSource,
}

impl Analysis {
    pub fn success(&self) -> bool {
        self.source != AnalysisSource::Failed
    }

    pub fn from_cache(&self) -> bool {
        self.source == AnalysisSource::Cache
    }
}

/// Owns the two analysis caches and the background enrichment queue.
///
/// All cache mutation happens either inline through `get_or_analyze_*` or in
/// the single background worker; callers outside this crate only read.
/// Construction takes the vision client explicitly - there is no ambient
/// configuration lookup.
pub struct AnalysisEngine {
    cache: Arc<AnalysisCache>,
    vision: Option<Arc<dyn VisionAnalyzer>>,
    queue_tx: Option<mpsc::UnboundedSender<EnrichmentTask>>,
    queued: Arc<AtomicUsize>,
}

impl AnalysisEngine {
    /// Create the engine and start its worker.
    ///
    /// With `vision: None` the engine still serves lookups (always absent)
    /// and direct calls return the unconfigured sentinel; no worker is
    /// spawned and `enqueue_background` is a guaranteed no-op, so the queue
    /// can never grow unserviceable.
    pub fn new(vision: Option<Arc<dyn VisionAnalyzer>>) -> Self {
        let cache = Arc::new(AnalysisCache::new());
        let queued = Arc::new(AtomicUsize::new(0));

        let queue_tx = vision.clone().map(|client| {
            let (tx, rx) = mpsc::unbounded_channel();
            tokio::spawn(worker::run(cache.clone(), client, rx, queued.clone()));
            info!("Enrichment worker started");
            tx
        });
        if queue_tx.is_none() {
            warn!("No vision client configured; page analysis is disabled");
        }

        Self {
            cache,
            vision,
            queue_tx,
            queued,
        }
    }

    /// Cached description for `key`, if any. No side effects.
    pub async fn lookup_description(&self, key: &str) -> Option<String> {
        self.cache.get(AnalysisMode::Describe, key).await
    }

    /// Cached content summary for `key`, if any. No side effects.
    pub async fn lookup_content(&self, key: &str) -> Option<String> {
        self.cache.get(AnalysisMode::Content, key).await
    }

    /// Whether both analyses are cached for `key`.
    pub async fn has_both(&self, key: &str) -> bool {
        self.cache.has_both(key).await
    }

    /// Cached or freshly analyzed description for `key`.
    ///
    /// The only user-latency-visible analysis path: runs the external call
    /// inline on a cache miss. Failures yield the fixed sentinel text and
    /// are not cached, so a later call retries.
    pub async fn get_or_analyze_description(
        &self,
        key: &str,
        capture: CaptureHandle,
    ) -> Analysis {
        self.get_or_analyze(AnalysisMode::Describe, key, capture)
            .await
    }

    /// Cached or freshly analyzed content summary for `key`.
    pub async fn get_or_analyze_content(&self, key: &str, capture: CaptureHandle) -> Analysis {
        self.get_or_analyze(AnalysisMode::Content, key, capture)
            .await
    }

    async fn get_or_analyze(
        &self,
        mode: AnalysisMode,
        key: &str,
        capture: CaptureHandle,
    ) -> Analysis {
        if let Some(text) = self.cache.get(mode, key).await {
            debug!(key, ?mode, "Cache hit, no analysis needed");
            return Analysis {
                text,
                source: AnalysisSource::Cache,
            };
        }

        let Some(vision) = &self.vision else {
            return Analysis {
                text: NOT_CONFIGURED.to_string(),
                source: AnalysisSource::Failed,
            };
        };

        let image = match capture.read() {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!(key, error = %e, "Failed to read capture");
                return Analysis {
                    text: Self::sentinel(mode).to_string(),
                    source: AnalysisSource::Failed,
                };
            }
        };

        match vision.analyze(&image, mode).await {
            Ok(text) => {
                self.cache.insert(mode, key, text.clone()).await;
                debug!(key, ?mode, "Cached fresh analysis");
                Analysis {
                    text,
                    source: AnalysisSource::Fresh,
                }
            }
            Err(e) => {
                warn!(key, ?mode, error = %e, "Analysis failed");
                Analysis {
                    text: Self::sentinel(mode).to_string(),
                    source: AnalysisSource::Failed,
                }
            }
        }
        // capture dropped here: the file is released whichever path ran
    }

    fn sentinel(mode: AnalysisMode) -> &'static str {
        match mode {
            AnalysisMode::Describe => DESCRIBE_FAILED,
            AnalysisMode::Content => CONTENT_FAILED,
        }
    }

    /// Queue a background analysis for `key`, taking ownership of `capture`.
    ///
    /// Non-blocking. A guaranteed no-op - with the capture released
    /// immediately - when no vision client is configured or both caches
    /// already hold the key; both checks happen here, at enqueue time.
    pub async fn enqueue_background(&self, key: &str, capture: CaptureHandle) {
        let Some(tx) = &self.queue_tx else {
            debug!(key, "Vision client not configured, dropping capture");
            return;
        };

        if self.cache.has_both(key).await {
            debug!(key, "Both analyses cached, skipping background analysis");
            return;
        }

        debug!(key, "Queuing background analysis");
        if tx.send(EnrichmentTask::new(key, capture)).is_ok() {
            self.queued.fetch_add(1, Ordering::SeqCst);
        }
    }

    /// Remove `key` from both caches (e.g. after a page refresh).
    pub async fn invalidate(&self, key: &str) {
        if self.cache.invalidate(key).await {
            debug!(key, "Invalidated cached analyses");
        }
    }

    /// Empty both caches.
    pub async fn clear_all(&self) {
        self.cache.clear().await;
        info!("Analysis cache cleared");
    }

    /// Number of tasks waiting in the enrichment queue.
    pub fn queued_len(&self) -> usize {
        self.queued.load(Ordering::SeqCst)
    }

    /// Whether a vision client is available.
    pub fn vision_available(&self) -> bool {
        self.vision.is_some()
    }
}

#[cfg(test)]
#[path = "engine_tests.rs"]
mod tests;
