//! Browser driver contract.

use async_trait::async_trait;

use crate::error::BrowserError;

/// Scroll direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollDirection {
    Up,
    Down,
}

/// Scroll magnitude.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollAmount {
    /// One viewport height.
    Page,
    /// All the way to the top of the document.
    Top,
    /// All the way to the bottom of the document.
    Bottom,
}

/// Browser automation primitives.
///
/// Implementations return the user-facing confirmation message on success;
/// failures carry their own spoken phrase via [`BrowserError`]'s `Display`.
#[async_trait]
pub trait BrowserControl: Send + Sync {
    /// Navigate to a target (URL fragment or free-text search terms).
    async fn navigate(&self, target: &str) -> Result<String, BrowserError>;

    /// Click the visible interactive element best matching `element_text`.
    async fn click(&self, element_text: &str) -> Result<String, BrowserError>;

    /// Scroll the page.
    async fn scroll(
        &self,
        direction: ScrollDirection,
        amount: ScrollAmount,
    ) -> Result<String, BrowserError>;

    /// Go back in session history.
    async fn back(&self) -> Result<String, BrowserError>;

    /// Go forward in session history.
    async fn forward(&self) -> Result<String, BrowserError>;

    /// Reload the current page.
    async fn refresh(&self) -> Result<String, BrowserError>;

    /// Try to dismiss a cookie consent banner.
    async fn accept_cookies(&self) -> Result<String, BrowserError>;

    /// URL of the page currently displayed, if any navigation happened yet.
    async fn current_location(&self) -> Option<String>;

    /// Enable or disable automatic cookie acceptance after page changes.
    async fn set_auto_cookies(&self, enabled: bool);

    /// Whether automatic cookie acceptance is enabled.
    async fn auto_cookies(&self) -> bool;

    /// Release the underlying browser (kill the child process if owned).
    async fn close(&self);
}
