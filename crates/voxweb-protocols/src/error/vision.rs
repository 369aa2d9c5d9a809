//! Vision analysis errors.

use thiserror::Error;

/// Vision analysis error types.
#[derive(Debug, Error)]
pub enum VisionError {
    /// No vision client is configured (missing API key).
    #[error("Vision client not configured")]
    NotConfigured,

    /// The API rejected the credentials.
    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    /// The API asked us to back off.
    #[error("Rate limited")]
    RateLimited,

    /// Any other non-success API status.
    #[error("API error: {status} - {message}")]
    ApiError { status: u16, message: String },

    /// Transport-level failure.
    #[error("Network error: {0}")]
    Network(String),

    /// The response body did not carry analysis text.
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// The screenshot could not be read or encoded.
    #[error("Image error: {0}")]
    Image(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_display() {
        let err = VisionError::ApiError {
            status: 500,
            message: "Internal Server Error".to_string(),
        };
        assert!(err.to_string().contains("500"));
        assert!(err.to_string().contains("Internal Server Error"));
    }

    #[test]
    fn test_not_configured_display() {
        assert!(
            VisionError::NotConfigured
                .to_string()
                .contains("not configured")
        );
    }
}
