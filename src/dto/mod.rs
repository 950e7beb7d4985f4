use crate::error::AppError;

pub mod categories;
pub mod dishes;
pub mod reorder;
pub mod restaurant;

/// Blank optional text is stored as `None`.
pub fn normalize_optional(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

pub fn require_text(field: &str, value: &str) -> Result<(), AppError> {
    if value.trim().is_empty() {
        return Err(AppError::Validation(format!("{field} must not be empty")));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_optional_text_becomes_none() {
        assert_eq!(normalize_optional(Some("   ".into())), None);
        assert_eq!(normalize_optional(None), None);
        assert_eq!(
            normalize_optional(Some("  Cold starters ".into())),
            Some("Cold starters".into())
        );
    }

    #[test]
    fn required_text_rejects_whitespace() {
        assert!(require_text("name", " \t").is_err());
        assert!(require_text("name", "Soups").is_ok());
    }
}
