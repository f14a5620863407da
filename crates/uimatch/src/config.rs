//! Configuration threaded through sessions and waits.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::action::DEFAULT_SCROLL_STEP;
use crate::diagnostics::DiagnosticFormat;
use crate::poll::PollSpec;
use crate::result::{MatchError, MatchResult};

/// Default timeout for wait operations (30 seconds)
pub const DEFAULT_TIMEOUT_MS: u64 = 30_000;

/// Default polling interval (50ms)
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 50;

/// Default number of scroll steps when searching for an element
pub const DEFAULT_MAX_SCROLL_ATTEMPTS: usize = 20;

/// Matching and waiting configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchConfig {
    /// Timeout for waits, in milliseconds
    pub timeout_ms: u64,
    /// Interval between poll attempts, in milliseconds
    pub poll_interval_ms: u64,
    /// Step used by directional scrolls, in points
    pub scroll_step: f64,
    /// Scroll steps before giving up a search
    pub max_scroll_attempts: usize,
    /// Failure message formatting
    pub diagnostics: DiagnosticFormat,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            timeout_ms: DEFAULT_TIMEOUT_MS,
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
            scroll_step: DEFAULT_SCROLL_STEP,
            max_scroll_attempts: DEFAULT_MAX_SCROLL_ATTEMPTS,
            diagnostics: DiagnosticFormat::default(),
        }
    }
}

impl MatchConfig {
    /// Create with defaults
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set timeout in milliseconds
    #[must_use]
    pub const fn with_timeout(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    /// Set polling interval in milliseconds
    #[must_use]
    pub const fn with_poll_interval(mut self, poll_interval_ms: u64) -> Self {
        self.poll_interval_ms = poll_interval_ms;
        self
    }

    /// Set maximum scroll attempts
    #[must_use]
    pub const fn with_max_scroll_attempts(mut self, attempts: usize) -> Self {
        self.max_scroll_attempts = attempts;
        self
    }

    /// Set diagnostic format
    #[must_use]
    pub fn with_diagnostics(mut self, diagnostics: DiagnosticFormat) -> Self {
        self.diagnostics = diagnostics;
        self
    }

    /// Get timeout as Duration
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Get poll interval as Duration
    #[must_use]
    pub const fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    /// Poll spec for the configured timeout
    ///
    /// # Errors
    ///
    /// Returns a configuration error for a zero interval or an interval
    /// longer than the timeout.
    pub fn poll_spec(&self) -> MatchResult<PollSpec> {
        PollSpec::new(self.timeout(), self.poll_interval())
    }

    /// Check the configuration for invalid values
    ///
    /// # Errors
    ///
    /// Returns a configuration error describing the first invalid field.
    pub fn validate(&self) -> MatchResult<()> {
        self.poll_spec()?;
        if !(self.scroll_step.is_finite() && self.scroll_step > 0.0) {
            return Err(MatchError::configuration(format!(
                "scroll_step must be positive, got {}",
                self.scroll_step
            )));
        }
        Ok(())
    }

    /// Parse and validate JSON configuration
    ///
    /// # Errors
    ///
    /// JSON syntax errors or invalid values.
    pub fn from_json_str(json: &str) -> MatchResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Parse and validate YAML configuration
    ///
    /// # Errors
    ///
    /// YAML syntax errors or invalid values.
    pub fn from_yaml_str(yaml: &str) -> MatchResult<Self> {
        let config: Self = serde_yaml_ng::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize to pretty JSON
    ///
    /// # Errors
    ///
    /// Serialization errors.
    pub fn to_json_string(&self) -> MatchResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    mod defaults {
        use super::*;

        #[test]
        fn test_default() {
            let config = MatchConfig::default();
            assert_eq!(config.timeout(), Duration::from_secs(30));
            assert_eq!(config.poll_interval(), Duration::from_millis(50));
            assert_eq!(config.max_scroll_attempts, 20);
            assert!(config.validate().is_ok());
        }

        #[test]
        fn test_builders() {
            let config = MatchConfig::new()
                .with_timeout(1000)
                .with_poll_interval(10)
                .with_max_scroll_attempts(3);
            let spec = config.poll_spec().unwrap();
            assert_eq!(spec.timeout(), Duration::from_secs(1));
            assert_eq!(spec.interval(), Duration::from_millis(10));
            assert_eq!(config.max_scroll_attempts, 3);
        }
    }

    mod validation {
        use super::*;

        #[test]
        fn test_zero_interval() {
            let config = MatchConfig::new().with_poll_interval(0);
            assert!(config.validate().is_err());
        }

        #[test]
        fn test_bad_scroll_step() {
            let mut config = MatchConfig::new();
            config.scroll_step = -5.0;
            assert!(config.validate().is_err());
        }
    }

    mod parsing {
        use super::*;

        #[test]
        fn test_json_partial() {
            let config = MatchConfig::from_json_str(r#"{"timeout_ms": 5000}"#).unwrap();
            assert_eq!(config.timeout_ms, 5000);
            assert_eq!(config.poll_interval_ms, DEFAULT_POLL_INTERVAL_MS);
        }

        #[test]
        fn test_json_invalid_values() {
            let err = MatchConfig::from_json_str(r#"{"timeout_ms": 10, "poll_interval_ms": 50}"#)
                .unwrap_err();
            assert!(matches!(err, MatchError::Configuration { .. }));
        }

        #[test]
        fn test_json_syntax_error() {
            let err = MatchConfig::from_json_str("{").unwrap_err();
            assert!(matches!(err, MatchError::Json(_)));
        }

        #[test]
        fn test_yaml() {
            let yaml = "timeout_ms: 2000\npoll_interval_ms: 25\ndiagnostics:\n  newline_replacement: ' | '\n";
            let config = MatchConfig::from_yaml_str(yaml).unwrap();
            assert_eq!(config.poll_interval_ms, 25);
            assert_eq!(config.diagnostics.newline_replacement, " | ");
            assert_eq!(config.diagnostics.ampersand_replacement, "AND");
        }

        #[test]
        fn test_json_roundtrip_preserves_values() {
            let config = MatchConfig::new().with_timeout(1234);
            let parsed = MatchConfig::from_json_str(&config.to_json_string().unwrap()).unwrap();
            assert_eq!(parsed, config);
        }
    }
}
