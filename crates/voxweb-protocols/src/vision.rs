//! Vision analysis contract.

use async_trait::async_trait;

use crate::error::VisionError;

/// Which analysis to run against a page screenshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AnalysisMode {
    /// Brief description of the page layout and navigation.
    Describe,
    /// Summary of the main content, ignoring chrome and ads.
    Content,
}

/// Screenshot-to-text analysis collaborator.
#[async_trait]
pub trait VisionAnalyzer: Send + Sync {
    /// Analyze a PNG screenshot and return the resulting text.
    async fn analyze(&self, image_png: &[u8], mode: AnalysisMode) -> Result<String, VisionError>;
}
