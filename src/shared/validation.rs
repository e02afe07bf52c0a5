use lazy_static::lazy_static;
use regex::Regex;
use std::borrow::Cow;
use validator::ValidationError;

use crate::shared::constants::{CATEGORY_NAME_MAX_LEN, CATEGORY_NAME_MIN_LEN};

lazy_static! {
    /// Runs of whitespace inside an uploaded file name
    /// - "my photo.png" -> "my_photo.png"
    pub static ref WHITESPACE_RUN_REGEX: Regex = Regex::new(r"\s+").unwrap();

    /// Characters that are not allowed in a stored file name
    /// - Kept: ASCII letters, digits, '.', '_', '-'
    /// - Dropped: path separators, quotes, unicode, control characters
    pub static ref UNSAFE_FILE_CHAR_REGEX: Regex = Regex::new(r"[^A-Za-z0-9._-]").unwrap();
}

/// Validator for category names: required after trimming, 2-50 characters.
pub fn validate_category_name(name: &str) -> Result<(), ValidationError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::new("required")
            .with_message(Cow::Borrowed("Category name is required.")));
    }

    let len = trimmed.chars().count();
    if len < CATEGORY_NAME_MIN_LEN {
        return Err(ValidationError::new("length")
            .with_message(Cow::Borrowed("Category name must be at least 2 characters")));
    }
    if len > CATEGORY_NAME_MAX_LEN {
        return Err(ValidationError::new("length")
            .with_message(Cow::Borrowed("Category name cannot exceed 50 characters")));
    }

    Ok(())
}

/// Flatten validator errors into the first human readable message
pub fn first_message(errors: &validator::ValidationErrors) -> String {
    errors
        .field_errors()
        .values()
        .flat_map(|errs| errs.iter())
        .find_map(|e| e.message.as_ref().map(|m| m.to_string()))
        .unwrap_or_else(|| errors.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_name_valid() {
        assert!(validate_category_name("Electronics").is_ok());
        assert!(validate_category_name("  TV  ").is_ok());
        assert!(validate_category_name(&"a".repeat(50)).is_ok());
    }

    #[test]
    fn test_category_name_invalid() {
        let err = validate_category_name("   ").unwrap_err();
        assert_eq!(err.code, "required");
        assert!(validate_category_name("a").is_err()); // too short
        assert!(validate_category_name(" b ").is_err()); // too short once trimmed
        assert!(validate_category_name(&"a".repeat(51)).is_err()); // too long
    }

    #[test]
    fn test_file_name_regexes() {
        assert_eq!(
            WHITESPACE_RUN_REGEX.replace_all("my  new\tphoto.png", "_"),
            "my_new_photo.png"
        );
        assert_eq!(
            UNSAFE_FILE_CHAR_REGEX.replace_all("../etc/passwd", ""),
            "..etcpasswd"
        );
    }
}
