use crate::error::AppError;

/// Review and comment text is stored exactly as posted; it only has to
/// contain something besides whitespace.
pub fn ensure_not_blank(field: &str, input: &str) -> Result<(), AppError> {
    if input.trim().is_empty() {
        return Err(AppError::field(field, "This field may not be blank."));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn whitespace_only_text_is_rejected() {
        assert!(ensure_not_blank("text", " \n\t").is_err());
        assert!(ensure_not_blank("text", "Tom & Jerry <3").is_ok());
    }
}
