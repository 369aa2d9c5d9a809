//! Dispatch outcome type.

/// Outcome of dispatching one recognized command.
///
/// `should_enrich` marks actions that may have changed the visible page
/// (navigation, clicks, history moves) or describe/read requests that missed
/// the analysis cache - the session layer schedules a background capture and
/// analysis for those.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommandOutcome {
    /// Whether the command ran to completion.
    pub success: bool,
    /// Whether a background page analysis should be scheduled.
    pub should_enrich: bool,
}

impl CommandOutcome {
    /// Successful command.
    pub fn ok(should_enrich: bool) -> Self {
        Self {
            success: true,
            should_enrich,
        }
    }

    /// Failed command that still warrants a background analysis
    /// (a cache miss occurred before the failure).
    pub fn failed_after_miss() -> Self {
        Self {
            success: false,
            should_enrich: true,
        }
    }

    /// Failed command, nothing to analyze.
    pub fn failed() -> Self {
        Self {
            success: false,
            should_enrich: false,
        }
    }
}
