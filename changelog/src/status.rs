use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    Visible,
    /// Routine no-ops that should not notify anyone
    Hidden,
}

/// Outcome of handling one event: a code, a human-readable reason and
/// whether the result is worth showing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HandlerStatus {
    pub code: i32,
    pub reason: String,
    pub visibility: Visibility,
}

impl HandlerStatus {
    pub fn success(reason: impl Into<String>) -> Self {
        Self {
            code: 0,
            reason: reason.into(),
            visibility: Visibility::Visible,
        }
    }

    pub fn failure(reason: impl Into<String>) -> Self {
        Self {
            code: 1,
            reason: reason.into(),
            visibility: Visibility::Visible,
        }
    }

    #[must_use]
    pub fn hidden(mut self) -> Self {
        self.visibility = Visibility::Hidden;
        self
    }

    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.code == 0
    }

    #[must_use]
    pub fn is_hidden(&self) -> bool {
        self.visibility == Visibility::Hidden
    }
}

impl fmt::Display for HandlerStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.reason)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hidden_success_serializes_lowercase() {
        let status = HandlerStatus::success("Ignoring pushes to non-default branch").hidden();
        assert!(status.is_success());
        assert!(status.is_hidden());

        let json = serde_json::to_string(&status).unwrap();
        assert_eq!(
            json,
            r#"{"code":0,"reason":"Ignoring pushes to non-default branch","visibility":"hidden"}"#
        );
    }

    #[test]
    fn failure_is_visible() {
        let status = HandlerStatus::failure("disk full");
        assert!(!status.is_success());
        assert!(!status.is_hidden());
        assert_eq!(status.to_string(), "disk full");
    }
}
