//! Field-level validation shared by the input boundary and the save boundary.

use std::fmt;

use serde::{Deserialize, Serialize};

pub const EMPTY_TEXT: &str = "text must not be empty";
pub const WHITESPACE_TEXT: &str = "whitespace-only text is not allowed";
pub const POST_SENTINEL_TEXT: &str = "you found an easter egg! :)";
pub const COMMENT_SENTINEL_TEXT: &str = "congratulations, you are a troll! :)";

/// A single rejected field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldViolation {
    pub field: String,
    pub message: String,
}

/// Every violation found while validating one entity.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationErrors(Vec<FieldViolation>);

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn single(field: impl Into<String>, message: impl Into<String>) -> Self {
        let mut errors = Self::new();
        errors.push(field, message);
        errors
    }

    pub fn push(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.push(FieldViolation {
            field: field.into(),
            message: message.into(),
        });
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn violations(&self) -> &[FieldViolation] {
        &self.0
    }

    /// Messages recorded against `field`.
    pub fn messages_for(&self, field: &str) -> Vec<&str> {
        self.0
            .iter()
            .filter(|v| v.field == field)
            .map(|v| v.message.as_str())
            .collect()
    }

    /// `Ok(())` when nothing was recorded.
    pub fn into_result(self) -> Result<(), Self> {
        if self.is_empty() { Ok(()) } else { Err(self) }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rendered: Vec<String> = self
            .0
            .iter()
            .map(|v| format!("{}: {}", v.field, v.message))
            .collect();
        write!(f, "{}", rendered.join(", "))
    }
}

impl std::error::Error for ValidationErrors {}

/// Check a post or comment body.
///
/// Returns the rejection message, or `None` when the text is acceptable.
/// An exact match against `sentinel` is rejected with `sentinel_message`.
pub fn check_text(text: &str, sentinel: &str, sentinel_message: &'static str) -> Option<&'static str> {
    if text.is_empty() {
        Some(EMPTY_TEXT)
    } else if text == sentinel {
        Some(sentinel_message)
    } else if text.chars().all(char::is_whitespace) {
        Some(WHITESPACE_TEXT)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_text_accepts_regular_text() {
        assert_eq!(check_text("hello", "yandex", POST_SENTINEL_TEXT), None);
        // Containing the sentinel is fine, only an exact match is rejected.
        assert_eq!(check_text("yandex maps", "yandex", POST_SENTINEL_TEXT), None);
    }

    #[test]
    fn test_check_text_rejections() {
        assert_eq!(check_text("", "yandex", POST_SENTINEL_TEXT), Some(EMPTY_TEXT));
        assert_eq!(check_text(" \t\n", "yandex", POST_SENTINEL_TEXT), Some(WHITESPACE_TEXT));
        assert_eq!(
            check_text("yandex", "yandex", POST_SENTINEL_TEXT),
            Some(POST_SENTINEL_TEXT)
        );
    }

    #[test]
    fn test_errors_display_and_lookup() {
        let mut errors = ValidationErrors::new();
        errors.push("text", WHITESPACE_TEXT);
        errors.push("group", "unknown group");

        assert_eq!(errors.messages_for("text"), vec![WHITESPACE_TEXT]);
        assert_eq!(
            errors.to_string(),
            "text: whitespace-only text is not allowed, group: unknown group"
        );
        assert!(errors.into_result().is_err());
        assert!(ValidationErrors::new().into_result().is_ok());
    }
}
