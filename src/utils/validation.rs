use validator::ValidationError;

/// Course slugs are lowercase alphanumeric segments separated by hyphens,
/// e.g. "rust-for-beginners".
pub fn validate_course_url(course_url: &str) -> Result<(), ValidationError> {
    if course_url.is_empty() || course_url.len() > 120 {
        return Err(ValidationError::new("course_url_length"));
    }
    let valid_chars = course_url
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-');
    if !valid_chars || course_url.starts_with('-') || course_url.ends_with('-') {
        return Err(ValidationError::new("course_url_format"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_plain_slugs() {
        assert!(validate_course_url("rust-for-beginners").is_ok());
        assert!(validate_course_url("cs101").is_ok());
    }

    #[test]
    fn rejects_bad_slugs() {
        assert!(validate_course_url("").is_err());
        assert!(validate_course_url("Rust-For-Beginners").is_err());
        assert!(validate_course_url("-leading").is_err());
        assert!(validate_course_url("trailing-").is_err());
        assert!(validate_course_url("spaces in slug").is_err());
    }
}
