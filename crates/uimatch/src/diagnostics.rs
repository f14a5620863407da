//! Diagnostic text normalization for failure reports.
//!
//! Engine error descriptions are multi-line and may embed a full view
//! hierarchy dump. Report generators choke on raw newlines and `&`, so
//! user-visible messages go through [`DiagnosticFormat::normalize`].
//! Normalization is presentation only; errors keep their raw `Display`.

use serde::{Deserialize, Serialize};

/// Marker after which engines append the view hierarchy dump
pub const HIERARCHY_MARKER: &str = "UI Hierarchy (Back to front):";

/// How failure messages are rewritten for reports
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiagnosticFormat {
    /// Replacement for each line break
    pub newline_replacement: String,
    /// Replacement for `&&` and `&`
    pub ampersand_replacement: String,
    /// Everything from this marker onward is dropped
    pub truncate_at: Option<String>,
}

impl Default for DiagnosticFormat {
    fn default() -> Self {
        Self {
            newline_replacement: "\r".to_string(),
            ampersand_replacement: "AND".to_string(),
            truncate_at: Some(HIERARCHY_MARKER.to_string()),
        }
    }
}

impl DiagnosticFormat {
    /// Create the default format
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the newline replacement
    #[must_use]
    pub fn with_newline_replacement(mut self, replacement: impl Into<String>) -> Self {
        self.newline_replacement = replacement.into();
        self
    }

    /// Keep the full text, including any hierarchy dump
    #[must_use]
    pub fn without_truncation(mut self) -> Self {
        self.truncate_at = None;
        self
    }

    /// Normalize a diagnostic message
    #[must_use]
    pub fn normalize(&self, text: &str) -> String {
        let amp = &self.ampersand_replacement;
        // `&&` first, otherwise it would become "ANDAND"
        let mut out = text
            .replace("\r\n", "\n")
            .replace('\n', &self.newline_replacement)
            .replace("&&", amp)
            .replace('&', amp);

        if let Some(marker) = self.truncate_at.as_deref().filter(|m| !m.is_empty()) {
            if let Some(pos) = out.find(marker) {
                out.truncate(pos);
                let trimmed = out.trim_end().len();
                out.truncate(trimmed);
            }
        }
        out
    }
}
