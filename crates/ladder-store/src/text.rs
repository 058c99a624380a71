//! Input text rules for item texts and profile names

use once_cell::sync::Lazy;
use regex::Regex;

/// Maximum length of an item text or profile name, in characters
pub const MAX_INPUT_LENGTH: usize = 50;

static ALLOWED: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9 \-.,&()]+$").expect("static pattern compiles"));

/// Rejected input text
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    /// Nothing left after trimming
    #[error("Input cannot be empty")]
    Empty,

    /// Longer than [`MAX_INPUT_LENGTH`]
    #[error("Input must be {max} characters or less", max = MAX_INPUT_LENGTH)]
    TooLong {
        /// Length that was supplied
        length: usize,
    },

    /// Characters outside the allowed class
    #[error("Only letters, numbers, spaces, and basic punctuation allowed")]
    InvalidCharacters,
}

/// Trim and validate user input
///
/// Returns the trimmed text on success. The same rules apply to item texts
/// and profile names.
pub fn validate_text(input: &str) -> Result<String, ValidationError> {
    let text = input.trim();
    if text.is_empty() {
        return Err(ValidationError::Empty);
    }

    let length = text.chars().count();
    if length > MAX_INPUT_LENGTH {
        return Err(ValidationError::TooLong { length });
    }

    if !ALLOWED.is_match(text) {
        return Err(ValidationError::InvalidCharacters);
    }

    Ok(text.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_allowed_punctuation() {
        assert_eq!(validate_text("Feed pet (A.M.), & walk - 2").unwrap(), "Feed pet (A.M.), & walk - 2");
    }

    #[test]
    fn trims_before_validating() {
        assert_eq!(validate_text("  Shower  ").unwrap(), "Shower");
        assert_eq!(validate_text("   "), Err(ValidationError::Empty));
    }

    #[test]
    fn rejects_long_input() {
        let long = "a".repeat(MAX_INPUT_LENGTH + 1);
        assert_eq!(validate_text(&long), Err(ValidationError::TooLong { length: 51 }));
        assert!(validate_text(&"a".repeat(MAX_INPUT_LENGTH)).is_ok());
    }

    #[test]
    fn rejects_other_characters() {
        for bad in ["Brush teeth 2×", "tabs\tinside", "semi;colon", "quote'"] {
            assert_eq!(validate_text(bad), Err(ValidationError::InvalidCharacters), "{bad}");
        }
    }

    #[test]
    fn messages_match_user_copy() {
        assert_eq!(ValidationError::Empty.to_string(), "Input cannot be empty");
        assert_eq!(
            ValidationError::TooLong { length: 60 }.to_string(),
            "Input must be 50 characters or less"
        );
    }
}
