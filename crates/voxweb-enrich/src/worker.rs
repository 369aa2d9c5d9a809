//! Background enrichment worker.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use tokio::sync::mpsc;
use tracing::{debug, warn};

use voxweb_protocols::vision::{AnalysisMode, VisionAnalyzer};

use crate::cache::AnalysisCache;
use crate::task::EnrichmentTask;

/// Worker loop: drain the queue one task at a time.
///
/// The single consumer serializes all external calls (at most one analysis
/// in flight per process) and all background cache writes. `recv` parks the
/// task while the queue is empty; the loop only ends when every sender is
/// gone, i.e. when the engine is dropped.
pub(crate) async fn run(
    cache: Arc<AnalysisCache>,
    vision: Arc<dyn VisionAnalyzer>,
    mut rx: mpsc::UnboundedReceiver<EnrichmentTask>,
    queued: Arc<AtomicUsize>,
) {
    while let Some(task) = rx.recv().await {
        queued.fetch_sub(1, Ordering::SeqCst);
        process(&cache, vision.as_ref(), task).await;
    }
    debug!("Enrichment worker stopped");
}

/// Run both analyses for one task, writing each cache entry independently.
///
/// Partial success is allowed: a description success and content failure
/// still cache the description. Failures never poison the queue. The task
/// (and with it the capture file) is dropped on return, success or not.
async fn process(cache: &AnalysisCache, vision: &dyn VisionAnalyzer, task: EnrichmentTask) {
    debug!(
        key = %task.page_key,
        waited_ms = task.age().num_milliseconds(),
        "Processing enrichment task"
    );

    let image = match task.capture.read() {
        Ok(bytes) => bytes,
        Err(e) => {
            warn!(key = %task.page_key, error = %e, "Failed to read capture, dropping task");
            return;
        }
    };

    for mode in [AnalysisMode::Describe, AnalysisMode::Content] {
        // A direct lookup may have raced ahead and filled this entry; its
        // value is just as fresh, so skip the call.
        if cache.contains(mode, &task.page_key).await {
            continue;
        }

        match vision.analyze(&image, mode).await {
            Ok(text) => {
                cache.insert(mode, &task.page_key, text).await;
                debug!(key = %task.page_key, ?mode, "Cached background analysis");
            }
            Err(e) => {
                warn!(key = %task.page_key, ?mode, error = %e, "Background analysis failed");
            }
        }
    }
}
