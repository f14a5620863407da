//! Result and error types for uimatch.

use thiserror::Error;

use crate::diagnostics::DiagnosticFormat;

/// Result type for uimatch operations
pub type MatchResult<T> = Result<T, MatchError>;

/// Errors that can occur while matching, asserting or waiting
#[derive(Debug, Error)]
pub enum MatchError {
    /// Invalid construction input (empty combinator, bad poll spec, ...)
    #[error("Configuration error: {message}")]
    Configuration {
        /// Error message
        message: String,
    },

    /// No element matched the selector
    #[error("No element matches {selector}")]
    NotFound {
        /// Description of the selector
        selector: String,
    },

    /// A strict selector matched more than one element
    #[error("{count} elements match {selector}; select an index to disambiguate")]
    Ambiguous {
        /// Description of the selector
        selector: String,
        /// Number of matching elements
        count: usize,
    },

    /// The element does not expose the requested attribute
    #[error("Element does not expose {attribute}")]
    NotSupported {
        /// Attribute name (e.g. `text`)
        attribute: String,
    },

    /// The located element did not satisfy the assertion
    #[error("Assertion {assertion} failed for element matching {selector}")]
    AssertionFailed {
        /// Name of the assertion predicate
        assertion: String,
        /// Description of the selector
        selector: String,
    },

    /// The engine could not perform an action
    #[error("Action {action} failed: {message}")]
    ActionFailed {
        /// Action description
        action: String,
        /// Error message
        message: String,
    },

    /// Poll deadline elapsed without the condition holding
    #[error("Timed out after {ms}ms ({attempts} attempt(s)): {last_error}")]
    Timeout {
        /// Timeout in milliseconds
        ms: u64,
        /// Number of evaluations made
        attempts: usize,
        /// Last diagnostic observed from the check
        last_error: String,
    },

    /// Poll was cancelled through its token
    #[error("Wait cancelled after {attempts} attempt(s)")]
    Cancelled {
        /// Number of evaluations made before cancellation
        attempts: usize,
    },

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml_ng::Error),
}

impl MatchError {
    /// Create a configuration error
    #[must_use]
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Create a not-found error
    #[must_use]
    pub fn not_found(selector: impl Into<String>) -> Self {
        Self::NotFound {
            selector: selector.into(),
        }
    }

    /// Create an unsupported-attribute error
    #[must_use]
    pub fn not_supported(attribute: impl Into<String>) -> Self {
        Self::NotSupported {
            attribute: attribute.into(),
        }
    }

    /// Create an action failure
    #[must_use]
    pub fn action_failed(action: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ActionFailed {
            action: action.into(),
            message: message.into(),
        }
    }

    /// Whether a poller may evaluate again after this error.
    ///
    /// Construction and parse errors are fatal; anything the live UI might
    /// still change is retryable.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        !matches!(
            self,
            Self::Configuration { .. } | Self::Cancelled { .. } | Self::Json(_) | Self::Yaml(_)
        )
    }

    /// Check if this is a not-found error
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Render the error for a user-facing report
    #[must_use]
    pub fn report(&self, format: &DiagnosticFormat) -> String {
        format.normalize(&self.to_string())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_display_not_found() {
        let err = MatchError::not_found("id('login')");
        assert_eq!(err.to_string(), "No element matches id('login')");
    }

    #[test]
    fn test_display_timeout() {
        let err = MatchError::Timeout {
            ms: 1000,
            attempts: 20,
            last_error: "not yet".into(),
        };
        let display = err.to_string();
        assert!(display.contains("1000ms"));
        assert!(display.contains("20 attempt(s)"));
        assert!(display.contains("not yet"));
    }

    #[test]
    fn test_retryable() {
        assert!(MatchError::not_found("x").is_retryable());
        assert!(MatchError::Ambiguous {
            selector: "x".into(),
            count: 2
        }
        .is_retryable());
        assert!(!MatchError::configuration("empty").is_retryable());
        assert!(!MatchError::Cancelled { attempts: 1 }.is_retryable());
    }

    #[test]
    fn test_json_from() {
        let err: MatchError = serde_json::from_str::<u32>("nope").unwrap_err().into();
        assert!(matches!(err, MatchError::Json(_)));
        assert!(!err.is_retryable());
    }

    #[test]
    fn test_report_normalizes() {
        let err = MatchError::action_failed("tap", "first line\nsecond && third");
        let report = err.report(&DiagnosticFormat::default());
        assert!(!report.contains('\n'));
        assert!(report.contains("AND"));
        assert!(!report.contains('&'));
    }
}
