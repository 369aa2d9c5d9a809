//! Transient status display contract.

/// Receives one-line state updates ("Recording...", "Analyzing page...").
///
/// Implementations must be cheap and non-blocking; callers fire updates from
/// latency-sensitive paths.
pub trait StatusSink: Send + Sync {
    fn update(&self, status: &str);
}

/// Sink that discards all updates.
pub struct NullStatusSink;

impl StatusSink for NullStatusSink {
    fn update(&self, _status: &str) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_null_sink_accepts_updates() {
        let sink = NullStatusSink;
        sink.update("Ready");
    }
}
