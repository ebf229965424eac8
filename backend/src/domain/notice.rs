//! One-shot flash notices surfaced on the next rendered payload.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Severity of a flash notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum NoticeLevel {
    Success,
    Info,
    Warning,
    Error,
}

/// One-shot message queued in the session and drained into the next
/// rendered payload.
///
/// ## Invariants
/// - `message` is non-empty; constructors take `impl Into<String>` from
///   call sites that always pass literal or formatted text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Notice {
    level: NoticeLevel,
    message: String,
}

impl Notice {
    /// Construct a notice with an explicit level.
    pub fn new(level: NoticeLevel, message: impl Into<String>) -> Self {
        Self {
            level,
            message: message.into(),
        }
    }

    /// Convenience constructor for [`NoticeLevel::Success`].
    pub fn success(message: impl Into<String>) -> Self {
        Self::new(NoticeLevel::Success, message)
    }

    /// Convenience constructor for [`NoticeLevel::Info`].
    pub fn info(message: impl Into<String>) -> Self {
        Self::new(NoticeLevel::Info, message)
    }

    /// Convenience constructor for [`NoticeLevel::Warning`].
    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(NoticeLevel::Warning, message)
    }

    /// Convenience constructor for [`NoticeLevel::Error`].
    pub fn error(message: impl Into<String>) -> Self {
        Self::new(NoticeLevel::Error, message)
    }

    /// Notice severity.
    pub fn level(&self) -> NoticeLevel {
        self.level
    }

    /// User-visible text.
    pub fn message(&self) -> &str {
        self.message.as_str()
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;

    #[test]
    fn constructors_set_expected_levels() {
        assert_eq!(Notice::success("ok").level(), NoticeLevel::Success);
        assert_eq!(Notice::info("fyi").level(), NoticeLevel::Info);
        assert_eq!(Notice::warning("careful").level(), NoticeLevel::Warning);
        assert_eq!(Notice::error("nope").level(), NoticeLevel::Error);
    }

    #[test]
    fn serialises_level_as_snake_case() {
        let value = serde_json::to_value(Notice::warning("careful")).expect("serialise notice");
        assert_eq!(value.get("level").and_then(|v| v.as_str()), Some("warning"));
        assert_eq!(
            value.get("message").and_then(|v| v.as_str()),
            Some("careful")
        );
    }
}
