//! Terminal status line.

use voxweb_protocols::status::StatusSink;

/// Prints transient state to stderr, keeping stdout for the prompt.
pub struct ConsoleStatus;

impl StatusSink for ConsoleStatus {
    fn update(&self, status: &str) {
        eprintln!("  [{}]", status);
    }
}
