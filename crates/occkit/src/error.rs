//! Error types for occ operations.
//!
//! Every failure is terminal for the current invocation. The variants keep
//! the exit code and captured streams of the failed command so callers can
//! report them verbatim.

use thiserror::Error;

/// Categories of occ errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// A read-only query failed before anything was changed
    Observation,
    /// A mutating subcommand failed
    Action,
    /// The requested parameters are inconsistent
    Validation,
    /// occ could not be started or its output could not be read
    Execution,
}

impl ErrorCategory {
    /// Whether the managed system may have been changed before the failure.
    pub fn may_have_mutated(&self) -> bool {
        matches!(self, Self::Action)
    }
}

/// Errors that can occur while talking to occ.
#[derive(Debug, Error)]
pub enum Error {
    /// A read-only subcommand exited with a non-zero status
    #[error("occ query failed ({command}): {}", stderr.trim())]
    Observation {
        /// The command line that was run
        command: String,
        /// Exit code, if the process was not killed by a signal
        code: Option<i32>,
        /// Standard error output of the failed command
        stderr: String,
    },

    /// A mutating subcommand exited with a non-zero status
    #[error("occ {action} failed for {name}: {}", stderr.trim())]
    Action {
        /// The subcommand, e.g. `app:install`
        action: String,
        /// The resource the action was applied to
        name: String,
        /// Exit code, if the process was not killed by a signal
        code: Option<i32>,
        /// Standard output of the failed command
        stdout: String,
        /// Standard error output of the failed command
        stderr: String,
    },

    /// Missing or contradictory parameters
    #[error("{0}")]
    Validation(String),

    /// occ could not be spawned
    #[error("failed to execute {command}: {source}")]
    Spawn {
        /// The command line that was attempted
        command: String,
        /// Underlying IO error
        #[source]
        source: std::io::Error,
    },

    /// occ printed something that is not the JSON we expected
    #[error("unexpected occ output: {0}")]
    Json(#[from] serde_json::Error),

    /// IO error (temporary import documents)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Get the error category.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Error::Observation { .. } => ErrorCategory::Observation,
            Error::Action { .. } => ErrorCategory::Action,
            Error::Validation(_) => ErrorCategory::Validation,
            Error::Spawn { .. } | Error::Json(_) | Error::Io(_) => ErrorCategory::Execution,
        }
    }

    /// Exit code of the failed command, when there was one.
    pub fn exit_code(&self) -> Option<i32> {
        match self {
            Error::Observation { code, .. } | Error::Action { code, .. } => *code,
            _ => None,
        }
    }

    /// Captured standard error of the failed command.
    pub fn stderr(&self) -> Option<&str> {
        match self {
            Error::Observation { stderr, .. } | Error::Action { stderr, .. } => Some(stderr),
            _ => None,
        }
    }

    /// Captured standard output of the failed command.
    pub fn stdout(&self) -> Option<&str> {
        match self {
            Error::Action { stdout, .. } => Some(stdout),
            _ => None,
        }
    }

    /// Shorthand for a validation failure.
    pub fn validation(message: impl Into<String>) -> Self {
        Error::Validation(message.into())
    }
}

/// Result type for occ operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_mutation() {
        assert!(ErrorCategory::Action.may_have_mutated());
        assert!(!ErrorCategory::Observation.may_have_mutated());
        assert!(!ErrorCategory::Validation.may_have_mutated());
    }

    #[test]
    fn test_action_error_keeps_streams() {
        let err = Error::Action {
            action: "app:install".to_string(),
            name: "calendar".to_string(),
            code: Some(1),
            stdout: String::new(),
            stderr: "App not found\n".to_string(),
        };
        assert_eq!(err.category(), ErrorCategory::Action);
        assert_eq!(err.exit_code(), Some(1));
        assert_eq!(err.stderr(), Some("App not found\n"));
        assert_eq!(err.to_string(), "occ app:install failed for calendar: App not found");
    }

    #[test]
    fn test_observation_error_message() {
        let err = Error::Observation {
            command: "php occ app:list --output=json".to_string(),
            code: Some(2),
            stderr: "Nextcloud is not installed".to_string(),
        };
        assert_eq!(err.category(), ErrorCategory::Observation);
        assert!(err.to_string().contains("Nextcloud is not installed"));
        assert_eq!(err.stdout(), None);
    }

    #[test]
    fn test_validation_has_no_streams() {
        let err = Error::validation("owner is required when type=app");
        assert_eq!(err.category(), ErrorCategory::Validation);
        assert_eq!(err.exit_code(), None);
        assert_eq!(err.stderr(), None);
    }
}
