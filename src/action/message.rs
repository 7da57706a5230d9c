//! Commit message rendering.

use chrono::{DateTime, Utc};
use serde::Deserialize;

/// Body line used when none is configured. `{file}` is replaced by the file name.
pub const DEFAULT_BODY: &str = "Auto-generated commit for {file} changes";

/// Attribution trailer used when none is configured. Set `trailers = []` to drop it.
pub const DEFAULT_TRAILER: &str = "Co-Authored-By: Claude <noreply@anthropic.com>";

/// Format a commit timestamp as `YYYY-MM-DD HH:MM:SS` in UTC.
pub fn commit_timestamp(at: DateTime<Utc>) -> String {
    at.format("%Y-%m-%d %H:%M:%S").to_string()
}

/// Shape of the generated commit message.
///
/// ```text
/// Update CLAUDE.md - 2024-05-01 09:30:00
///
/// Auto-generated commit for CLAUDE.md changes
///
/// Co-Authored-By: Claude <noreply@anthropic.com>
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct MessageTemplate {
    /// Body line; empty to omit.
    pub body: String,
    /// Trailer lines appended after a blank line (attribution and the like).
    pub trailers: Vec<String>,
}

impl Default for MessageTemplate {
    fn default() -> Self {
        Self {
            body: DEFAULT_BODY.to_string(),
            trailers: vec![DEFAULT_TRAILER.to_string()],
        }
    }
}

impl MessageTemplate {
    /// Render the message for `file_name` changed at `at`.
    pub fn render(&self, file_name: &str, at: DateTime<Utc>) -> String {
        let mut message = format!("Update {} - {}", file_name, commit_timestamp(at));

        let body = self.body.replace("{file}", file_name);
        if !body.trim().is_empty() {
            message.push_str("\n\n");
            message.push_str(body.trim_end());
        }

        let trailers: Vec<&str> =
            self.trailers.iter().map(|t| t.trim()).filter(|t| !t.is_empty()).collect();
        if !trailers.is_empty() {
            message.push_str("\n\n");
            message.push_str(&trailers.join("\n"));
        }

        message
    }
}
