//! Browser driver errors.
//!
//! `Display` strings double as the spoken failure phrases, so they are worded
//! for narration rather than for logs.

use thiserror::Error;

/// Browser driver error types.
#[derive(Debug, Error)]
pub enum BrowserError {
    /// No browser connection is available.
    #[error("Browser not available")]
    NotAvailable,

    /// Chrome executable could not be located.
    #[error("Chrome not found")]
    ChromeNotFound,

    /// Chrome was found but failed to start.
    #[error("Failed to launch browser: {0}")]
    LaunchFailed(String),

    /// Connecting to the debugging endpoint failed.
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// Navigation did not complete.
    #[error("Navigation failed: {0}")]
    NavigationFailed(String),

    /// Navigation target was empty after keyword stripping.
    #[error("Empty website")]
    EmptyTarget,

    /// No interactive element matched the requested text.
    #[error("Element not found")]
    ElementNotFound,

    /// No cookie consent banner was present.
    #[error("No cookie popup found")]
    NoCookieBanner,

    /// A page-side action failed.
    #[error("Action failed: {0}")]
    ActionFailed(String),

    /// Debugging protocol error.
    #[error("Protocol error {code}: {message}")]
    Protocol { code: i64, message: String },

    /// A driver call timed out.
    #[error("Timeout: {0}")]
    Timeout(String),
}
