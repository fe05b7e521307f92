use once_cell::sync::Lazy;
use regex::Regex;

use crate::config::SchoolConfig;
use crate::models::users::entities::UserRole;

static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}$").expect("Invalid email regex")
});

pub const INVALID_WEIGHT_NUMERIC: &str = "Invalid weight. Must be a numeric value.";
pub const INVALID_WEIGHT_RANGE: &str =
    "Invalid weight. Must be between 0 (exclusive) and 1 (inclusive).";
pub const INVALID_GRADE_INTEGER: &str = "Invalid grade. Must be an integer value.";
pub const INVALID_GRADE_RANGE: &str =
    "Invalid grade. Must be an integer between 1 and 6 (inclusive).";

/// Capitalization convention for names and subjects.
///
/// The first character must be uppercase. The rest must contain at least one
/// lowercase letter and no uppercase letters, so a single letter fails.
pub fn check_word(word: &str) -> bool {
    let mut chars = word.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    if !first.is_uppercase() {
        return false;
    }

    let mut has_lower = false;
    for c in chars {
        if c.is_uppercase() {
            return false;
        }
        if c.is_lowercase() {
            has_lower = true;
        }
    }
    has_lower
}

pub fn validate_email(email: &str) -> Result<(), &'static str> {
    if !EMAIL_RE.is_match(email) {
        return Err("Email format is invalid");
    }
    Ok(())
}

/// Students and teachers each have their own email domain
pub fn validate_role_email(
    role: UserRole,
    email: &str,
    school: &SchoolConfig,
) -> Result<(), String> {
    let suffix = match role {
        UserRole::Student => &school.student_email_suffix,
        UserRole::Teacher => &school.teacher_email_suffix,
        UserRole::Admin => return Err("Invalid role".to_string()),
    };
    if !email.ends_with(suffix.as_str()) {
        return Err(format!("Invalid email. Must be {suffix}."));
    }
    validate_email(email).map_err(str::to_string)
}

/// Grade weight, a real number in (0, 1]
pub fn parse_weight(input: &str) -> Result<f64, &'static str> {
    let weight: f64 = input.trim().parse().map_err(|_| INVALID_WEIGHT_NUMERIC)?;
    if weight.is_finite() && weight > 0.0 && weight <= 1.0 {
        Ok(weight)
    } else {
        Err(INVALID_WEIGHT_RANGE)
    }
}

/// Grade value, an integer in [1, 6]. A blank cell means "no grade".
pub fn parse_grade(input: &str) -> Result<Option<i32>, &'static str> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    let value: i32 = trimmed.parse().map_err(|_| INVALID_GRADE_INTEGER)?;
    if (1..=6).contains(&value) {
        Ok(Some(value))
    } else {
        Err(INVALID_GRADE_RANGE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_word() {
        assert!(check_word("Jan"));
        assert!(check_word("Łukasz"));
        assert!(check_word("Nowak-kowalska"));
        assert!(!check_word("jan"));
        assert!(!check_word("JAN"));
        assert!(!check_word("JaN"));
        assert!(!check_word("J"));
        assert!(!check_word(""));
        assert!(!check_word("J1"));
    }

    #[test]
    fn test_role_email_suffixes() {
        let school = SchoolConfig::default();
        assert!(validate_role_email(UserRole::Student, "jan@student.uw.edu.pl", &school).is_ok());
        assert!(validate_role_email(UserRole::Teacher, "anna@uw.edu.pl", &school).is_ok());
        assert_eq!(
            validate_role_email(UserRole::Student, "jan@uw.edu.pl", &school),
            Err("Invalid email. Must be @student.uw.edu.pl.".to_string())
        );
        assert_eq!(
            validate_role_email(UserRole::Teacher, "anna@gmail.com", &school),
            Err("Invalid email. Must be @uw.edu.pl.".to_string())
        );
        assert!(validate_role_email(UserRole::Student, "@student.uw.edu.pl", &school).is_err());
        assert!(validate_role_email(UserRole::Admin, "root@uw.edu.pl", &school).is_err());
    }

    #[test]
    fn test_parse_weight() {
        assert_eq!(parse_weight("0.5"), Ok(0.5));
        assert_eq!(parse_weight(" 1 "), Ok(1.0));
        assert_eq!(parse_weight("0"), Err(INVALID_WEIGHT_RANGE));
        assert_eq!(parse_weight("1.5"), Err(INVALID_WEIGHT_RANGE));
        assert_eq!(parse_weight("-0.2"), Err(INVALID_WEIGHT_RANGE));
        assert_eq!(parse_weight("NaN"), Err(INVALID_WEIGHT_RANGE));
        assert_eq!(parse_weight("heavy"), Err(INVALID_WEIGHT_NUMERIC));
        assert_eq!(parse_weight(""), Err(INVALID_WEIGHT_NUMERIC));
    }

    #[test]
    fn test_parse_grade() {
        assert_eq!(parse_grade("4"), Ok(Some(4)));
        assert_eq!(parse_grade(""), Ok(None));
        assert_eq!(parse_grade("   "), Ok(None));
        assert_eq!(parse_grade("0"), Err(INVALID_GRADE_RANGE));
        assert_eq!(parse_grade("7"), Err(INVALID_GRADE_RANGE));
        assert_eq!(parse_grade("4.5"), Err(INVALID_GRADE_INTEGER));
        assert_eq!(parse_grade("five"), Err(INVALID_GRADE_INTEGER));
    }
}
