//! Core types for declarative resource management

use serde::{Deserialize, Serialize};

/// Current or desired state of a resource
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResourceState {
    /// Resource exists/is configured
    Present { details: Option<String> },
    /// Resource does not exist/is not configured
    Absent,
    /// Resource exists but differs from desired
    Modified { from: String, to: String },
}

impl ResourceState {
    /// Short rendering for diffs: the details, or `absent`
    pub fn render(&self) -> String {
        match self {
            Self::Present { details: Some(d) } => d.clone(),
            Self::Present { details: None } => "present".to_string(),
            Self::Absent => "absent".to_string(),
            Self::Modified { from, .. } => from.clone(),
        }
    }
}

/// Result of applying a resource
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ApplyResult {
    /// No changes needed
    NoChange,
    /// Resource was created
    Created,
    /// Resource was modified
    Modified,
    /// Resource was removed
    Removed,
    /// Apply was skipped (check mode)
    Skipped { reason: String },
}

impl ApplyResult {
    /// Check if the result represents a change
    pub fn is_change(&self) -> bool {
        matches!(self, Self::Created | Self::Modified | Self::Removed)
    }
}

/// Captured output of the mutating commands an apply ran
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostics {
    pub stdout: String,
    pub stderr: String,
}

impl Diagnostics {
    /// Append the output of one command
    pub fn record(&mut self, stdout: &str, stderr: &str) {
        append(&mut self.stdout, stdout);
        append(&mut self.stderr, stderr);
    }
}

fn append(buffer: &mut String, output: &str) {
    if output.is_empty() {
        return;
    }
    if !buffer.is_empty() && !buffer.ends_with('\n') {
        buffer.push('\n');
    }
    buffer.push_str(output);
}

/// Options for reconciliation
#[derive(Debug, Clone, Copy, Default)]
pub struct ApplyOptions {
    /// Don't make changes, just report whether they would be made
    pub check_mode: bool,
}
