use lazy_static::lazy_static;
use regex::Regex;

/// Treats a missing or blank-after-trim field as absent.
pub fn required(field: Option<String>) -> Option<String> {
    field.filter(|v| !v.trim().is_empty())
}

pub fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

/// Checks a feedback submission against every acceptance rule and returns the
/// full list of violations in a fixed order. Both persistence targets rely on
/// this single validator, so a row can only ever reach the spreadsheet mirror
/// if it would also have been accepted by the feedback table.
pub fn validate_feedback(
    name: Option<&str>,
    email: Option<&str>,
    rating: Option<f64>,
    message: Option<&str>,
) -> Vec<String> {
    let mut errors = Vec::new();

    if name.map(|n| n.trim().len()).unwrap_or(0) < 2 {
        errors.push("Name must be at least 2 characters".to_string());
    }

    if !email.map(is_valid_email).unwrap_or(false) {
        errors.push("Valid email is required".to_string());
    }

    if !rating.map(|r| (1.0..=5.0).contains(&r)).unwrap_or(false) {
        errors.push("Rating must be between 1 and 5".to_string());
    }

    if message.map(|m| m.trim().len()).unwrap_or(0) < 5 {
        errors.push("Message must be at least 5 characters".to_string());
    }

    errors
}
