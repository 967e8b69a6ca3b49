//! Field-level validation primitives and the error accumulator shared by
//! every form in the app.

use std::collections::HashMap;

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    pub static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
}

/// Accumulates errors over one validation pass. A form is valid when
/// neither collection has an entry.
#[derive(Debug, Default)]
pub struct Validator {
    pub field_errors: HashMap<String, String>,
    pub non_field_errors: Vec<String>,
}

impl Validator {
    pub fn is_valid(&self) -> bool {
        self.field_errors.is_empty() && self.non_field_errors.is_empty()
    }

    /// Records `message` under `field` when `ok` is false. The first error
    /// recorded for a field wins; later calls for the same field are no-ops.
    pub fn check_field(&mut self, ok: bool, field: &str, message: &str) {
        if !ok {
            self.add_field_error(field, message);
        }
    }

    pub fn add_field_error(&mut self, field: &str, message: &str) {
        self.field_errors
            .entry(field.to_string())
            .or_insert_with(|| message.to_string());
    }

    pub fn add_non_field_error(&mut self, message: &str) {
        self.non_field_errors.push(message.to_string());
    }

    pub fn field_error(&self, field: &str) -> Option<&str> {
        self.field_errors.get(field).map(String::as_str)
    }
}

pub fn not_blank(value: &str) -> bool {
    !value.trim().is_empty()
}

// Length checks count characters, not bytes, so multi-byte input is
// measured the way users see it.
pub fn max_chars(value: &str, n: usize) -> bool {
    value.chars().count() <= n
}

pub fn min_chars(value: &str, n: usize) -> bool {
    value.chars().count() >= n
}

pub fn permitted_value<T: PartialEq>(value: &T, permitted: &[T]) -> bool {
    permitted.contains(value)
}

pub fn matches(value: &str, re: &Regex) -> bool {
    re.is_match(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_values_fail_not_blank() {
        assert!(!not_blank(""));
        assert!(!not_blank("   "));
        assert!(!not_blank("\t\n"));
        assert!(not_blank("hi"));
        assert!(not_blank("  hi  "));
    }

    #[test]
    fn length_checks_count_chars_not_bytes() {
        // four chars, twelve bytes
        let s = "日本語字";
        assert_eq!(s.len(), 12);
        assert!(max_chars(s, 4));
        assert!(!max_chars(s, 3));
        assert!(min_chars(s, 4));
        assert!(!min_chars(s, 5));
    }

    #[test]
    fn permitted_value_checks_membership() {
        assert!(permitted_value(&365, &[1, 7, 365]));
        assert!(!permitted_value(&30, &[1, 7, 365]));
        assert!(permitted_value(&"b", &["a", "b"]));
    }

    #[test]
    fn email_pattern() {
        assert!(matches("alice@example.com", &EMAIL_RE));
        assert!(matches("a@b.co", &EMAIL_RE));
        assert!(!matches("alice@example", &EMAIL_RE));
        assert!(!matches("@example.com", &EMAIL_RE));
        assert!(!matches("alice example@b.com", &EMAIL_RE));
        assert!(!matches("", &EMAIL_RE));
    }

    #[test]
    fn first_field_error_wins() {
        let mut v = Validator::default();
        v.check_field(false, "title", "first");
        v.check_field(false, "title", "second");
        v.add_field_error("title", "third");
        assert_eq!(v.field_error("title"), Some("first"));
        assert!(!v.is_valid());
    }

    #[test]
    fn passing_checks_record_nothing() {
        let mut v = Validator::default();
        v.check_field(true, "title", "nope");
        assert!(v.is_valid());
        assert_eq!(v.field_error("title"), None);
    }

    #[test]
    fn non_field_errors_invalidate() {
        let mut v = Validator::default();
        assert!(v.is_valid());
        v.add_non_field_error("Email or password is incorrect");
        assert!(!v.is_valid());
        assert_eq!(v.non_field_errors.len(), 1);
    }
}
