//! Apply context passed to resources

use crate::types::Diagnostics;

/// Context passed to resource apply operations
#[derive(Debug, Default)]
pub struct ApplyContext {
    /// Output of every mutating command run so far
    pub diagnostics: Diagnostics,
}

impl ApplyContext {
    /// Create a new apply context
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the output of a mutating command
    pub fn record(&mut self, stdout: &str, stderr: &str) {
        self.diagnostics.record(stdout, stderr);
    }

    /// Take the captured diagnostics
    pub fn into_diagnostics(self) -> Diagnostics {
        self.diagnostics
    }
}
