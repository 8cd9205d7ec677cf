//! Declarative form validation
//!
//! One rule evaluator shared by every form, so the phone/email rules are
//! stated once instead of drifting between screens. A rule pairs a field
//! name with a predicate and the message shown inline when it fails.
//! Validation failures block submission only; they are fully recoverable
//! locally.

use std::sync::OnceLock;

use regex::Regex;

/// Predicate applied to one field value
#[derive(Debug, Clone, Copy)]
pub enum Check {
    /// Non-empty after trimming
    Required,
    /// Exactly `n` ASCII digits; passes on empty (compose with `Required`
    /// for mandatory fields)
    ExactDigits(usize),
    /// Loose email shape; passes on empty
    Email,
    /// At most `n` characters; passes on empty
    MaxLen(usize),
}

impl Check {
    fn passes(&self, value: &str) -> bool {
        match self {
            Check::Required => !value.trim().is_empty(),
            Check::ExactDigits(n) => {
                value.is_empty() || (value.len() == *n && value.bytes().all(|b| b.is_ascii_digit()))
            }
            Check::Email => value.is_empty() || email_regex().is_match(value),
            Check::MaxLen(n) => value.chars().count() <= *n,
        }
    }
}

fn email_regex() -> &'static Regex {
    static EMAIL: OnceLock<Regex> = OnceLock::new();
    EMAIL.get_or_init(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("email regex"))
}

/// One field-level validation rule
#[derive(Debug, Clone, Copy)]
pub struct Rule {
    pub field: &'static str,
    pub check: Check,
    pub message: &'static str,
}

impl Rule {
    pub const fn new(field: &'static str, check: Check, message: &'static str) -> Self {
        Self {
            field,
            check,
            message,
        }
    }
}

/// A failed rule, for inline display next to its field
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: &'static str,
    pub message: &'static str,
}

/// Evaluate every rule against the form's field values
///
/// `fields` maps field name to current value; a field missing from the
/// slice evaluates as empty.
pub fn validate(fields: &[(&str, &str)], rules: &[Rule]) -> Vec<FieldError> {
    rules
        .iter()
        .filter(|rule| {
            let value = fields
                .iter()
                .find(|(name, _)| *name == rule.field)
                .map(|(_, value)| *value)
                .unwrap_or("");
            !rule.check.passes(value)
        })
        .map(|rule| FieldError {
            field: rule.field,
            message: rule.message,
        })
        .collect()
}

/// Keystroke sanitizer for numeric fields: strips non-digit characters and
/// truncates to `max` digits before the value reaches state
pub fn digits_only(input: &str, max: usize) -> String {
    input
        .chars()
        .filter(|c| c.is_ascii_digit())
        .take(max)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const RULES: &[Rule] = &[
        Rule::new("name", Check::Required, "name is required"),
        Rule::new("phone", Check::Required, "phone is required"),
        Rule::new("phone", Check::ExactDigits(10), "phone must be 10 digits"),
        Rule::new("email", Check::Email, "email is invalid"),
        Rule::new("name", Check::MaxLen(64), "name is too long"),
    ];

    #[test]
    fn test_valid_form_has_no_errors() {
        let fields = [
            ("name", "An Nguyen"),
            ("phone", "0901234567"),
            ("email", "an@example.com"),
        ];
        assert!(validate(&fields, RULES).is_empty());
    }

    #[test]
    fn test_missing_field_evaluates_as_empty() {
        let errors = validate(&[("phone", "0901234567")], RULES);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "name");
    }

    #[test]
    fn test_phone_length_and_content() {
        let errors = validate(&[("name", "x"), ("phone", "12345")], RULES);
        assert!(errors.iter().any(|e| e.message == "phone must be 10 digits"));

        let errors = validate(&[("name", "x"), ("phone", "09012345ab")], RULES);
        assert!(errors.iter().any(|e| e.message == "phone must be 10 digits"));
    }

    #[test]
    fn test_email_is_optional_but_checked_when_present() {
        let fields = [("name", "x"), ("phone", "0901234567"), ("email", "")];
        assert!(validate(&fields, RULES).is_empty());

        let fields = [("name", "x"), ("phone", "0901234567"), ("email", "not-an-email")];
        let errors = validate(&fields, RULES);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "email");
    }

    #[test]
    fn test_digits_only_strips_and_truncates() {
        assert_eq!(digits_only("0901234567890", 10), "0901234567");
        assert_eq!(digits_only("abc123", 10), "123");
        assert_eq!(digits_only("(090) 123-4567", 10), "0901234567");
        assert_eq!(digits_only("", 10), "");
    }
}
