//! Checks shared by every request payload after it has been deserialized.

use crate::error::AppError;

/// Field checks serde cannot express, run once a payload has been decoded.
pub trait Validate {
    fn validate(&self) -> Result<(), AppError> {
        Ok(())
    }
}

/// Rejects empty and whitespace-only values for a required field.
pub fn non_blank(value: &str, field: &str) -> Result<(), AppError> {
    if value.trim().is_empty() {
        Err(AppError::required(field))
    } else {
        Ok(())
    }
}

/// An optional text field, treating blank as absent.
pub fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_counts_as_missing() {
        assert_eq!(non_blank("  ", "name"), Err(AppError::required("name")));
        assert!(non_blank("Li", "name").is_ok());
        assert_eq!(present(&Some(" ".to_string())), None);
        assert_eq!(present(&Some("x".to_string())), Some("x"));
        assert_eq!(present(&None), None);
    }
}
