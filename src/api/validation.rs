use super::ApiError;

/// The one truthy token set for boolean-ish form fields (`is_performer`,
/// `make_manager`, checkbox values). Everything else, including absence, is
/// false.
pub const TRUTHY_TOKENS: [&str; 5] = ["y", "yes", "true", "1", "on"];

#[must_use]
pub fn form_flag(value: Option<&str>) -> bool {
    match value {
        Some(v) => {
            let v = v.trim();
            TRUTHY_TOKENS.iter().any(|t| v.eq_ignore_ascii_case(t))
        }
        None => false,
    }
}

/// Requires a non-empty (after trimming) form field.
pub fn require_field<'a>(value: Option<&'a str>, field: &str) -> Result<&'a str, ApiError> {
    match value.map(str::trim).filter(|v| !v.is_empty()) {
        Some(v) => Ok(v),
        None => Err(ApiError::validation(format!("{field} is required."))),
    }
}

/// Trims an optional text field, mapping empty to None so blank form inputs
/// become NULL columns instead of empty strings.
#[must_use]
pub fn optional_text(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Performer listings need at least a genre and a location to be useful in
/// the directory.
pub fn validate_performer_fields(
    is_performer: bool,
    genre: Option<&str>,
    location: Option<&str>,
) -> Result<(), ApiError> {
    if is_performer && (genre.is_none() || location.is_none()) {
        return Err(ApiError::validation(
            "Genre and location are required if you want to appear as a performer.",
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn form_flag_truthy_tokens() {
        for token in ["Y", "y", "yes", "TRUE", "1", "on", " On "] {
            assert!(form_flag(Some(token)), "{token:?} should be truthy");
        }
        for token in ["", "n", "no", "false", "0", "off", "anything"] {
            assert!(!form_flag(Some(token)), "{token:?} should be falsy");
        }
        assert!(!form_flag(None));
    }

    #[test]
    fn require_field_trims() {
        assert_eq!(require_field(Some("  alice  "), "name").unwrap(), "alice");
        assert!(require_field(Some("   "), "name").is_err());
        assert!(require_field(None, "name").is_err());
    }

    #[test]
    fn optional_text_maps_blank_to_none() {
        assert_eq!(optional_text(Some("  jazz ".to_string())), Some("jazz".to_string()));
        assert_eq!(optional_text(Some("   ".to_string())), None);
        assert_eq!(optional_text(None), None);
    }

    #[test]
    fn performer_requires_genre_and_location() {
        assert!(validate_performer_fields(true, Some("jazz"), Some("NYC")).is_ok());
        assert!(validate_performer_fields(true, None, Some("NYC")).is_err());
        assert!(validate_performer_fields(true, Some("jazz"), None).is_err());
        assert!(validate_performer_fields(false, None, None).is_ok());
    }
}
