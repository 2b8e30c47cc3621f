//! Field validation for member dossiers and dispatch forms
//!
//! - `rules`: the catalog mapping field names to rule classes
//! - `normalize`: on-change formatting
//! - `dates`: date parsing, age and minor status
//!
//! Every field is optional here. An empty or whitespace-only value always
//! passes; "required" is decided by the form that owns the field.

pub mod dates;
pub mod normalize;
pub mod rules;

use chrono::NaiveDate;
use serde::Serialize;
use std::collections::BTreeMap;

pub use normalize::normalize;
pub use rules::{rule_for, EnumKind, FieldRule};

pub type ValidationResult = Result<(), String>;

/// Outcome of checking one field value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldCheck {
    pub valid: bool,
    pub message: String,
}

impl FieldCheck {
    pub fn ok() -> Self {
        Self { valid: true, message: String::new() }
    }

    pub fn fail(message: impl Into<String>) -> Self {
        Self { valid: false, message: message.into() }
    }
}

/// Validate `raw` for `field` against today's date.
pub fn validate(field: &str, raw: &str) -> FieldCheck {
    validate_at(field, raw, dates::today())
}

/// Validate `raw` for `field`, with `today` as the reference date for
/// date rules.
pub fn validate_at(field: &str, raw: &str, today: NaiveDate) -> FieldCheck {
    let value = raw.trim();
    if value.is_empty() {
        return FieldCheck::ok();
    }

    let Some(rule) = rule_for(field) else {
        return FieldCheck::ok();
    };

    let outcome = match rule {
        FieldRule::DateOfBirth => dates::check_date_of_birth(value, today),
        FieldRule::PastDate => dates::check_past_date(value, today),
        other if rules::check_pattern(other, value) => Ok(()),
        other => Err(other.message()),
    };

    match outcome {
        Ok(()) => FieldCheck::ok(),
        Err(message) => FieldCheck::fail(message),
    }
}

/// Build the error-map key for row `index` of a repeated section.
pub fn row_key(field: &str, index: usize) -> String {
    format!("{}_{}", field, index)
}

/// Field key -> message. A key is present only while its field is invalid.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationErrors {
    errors: BTreeMap<String, String>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set or clear `key` from a check outcome.
    pub fn record(&mut self, key: impl Into<String>, check: &FieldCheck) {
        let key = key.into();
        if check.valid {
            self.errors.remove(&key);
        } else {
            self.errors.insert(key, check.message.clone());
        }
    }

    pub fn set(&mut self, key: impl Into<String>, message: impl Into<String>) {
        self.errors.insert(key.into(), message.into());
    }

    pub fn clear(&mut self, key: &str) {
        self.errors.remove(key);
    }

    /// Drop every key matching `predicate`.
    pub fn clear_where(&mut self, mut predicate: impl FnMut(&str) -> bool) {
        self.errors.retain(|k, _| !predicate(k));
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.errors.get(key).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn reset(&mut self) {
        self.errors.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.errors.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// One line per error, used for logs and rejected submissions.
    pub fn summary(&self) -> String {
        self.iter()
            .map(|(k, v)| format!("{}: {}", k, v))
            .collect::<Vec<_>>()
            .join("; ")
    }
}

/// Strip control characters from free text such as notice bodies.
pub fn sanitize_string(input: &str) -> String {
    input
        .chars()
        .filter(|c| !c.is_control() || *c == '\n' || *c == '\t')
        .collect()
}

/// A dispatch recipient must be a valid email address.
pub fn validate_email_recipient(email: &str) -> ValidationResult {
    let email = email.trim();
    if email.is_empty() {
        return Err("Recipient email cannot be empty".into());
    }
    if !rules::check_pattern(FieldRule::Email, email) {
        return Err(format!("Invalid recipient email: {}", email));
    }
    Ok(())
}

/// A WhatsApp recipient must be a valid Indian mobile number. A leading
/// `+91`/`91` country code is accepted.
pub fn validate_mobile_recipient(number: &str) -> ValidationResult {
    let mut digits: String = number.chars().filter(|c| c.is_ascii_digit()).collect();
    if digits.len() == 12 && digits.starts_with("91") {
        digits.drain(..2);
    }
    if digits.is_empty() {
        return Err("Recipient number cannot be empty".into());
    }
    if !rules::check_pattern(FieldRule::Mobile, &digits) {
        return Err(format!("Invalid recipient number: {}", number.trim()));
    }
    Ok(())
}
