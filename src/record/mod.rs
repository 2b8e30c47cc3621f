//! Nested record access for partially filled member dossiers.
//!
//! A record is a `serde_json::Value` tree addressed by dotted paths such as
//! `personalDetails.nameOfMember`. Reads never fail: an absent field is
//! `None`. Writes return a new record and leave the old one as it was.

pub mod format;
pub mod missing;
pub mod path;

use serde_json::Value;

use crate::models::member::DossierField;

pub use format::{format_value, Rendered};
pub use missing::is_missing;
pub use path::{get_value_by_path, set_value_by_path, PathError};

/// The in-progress record owned by one form.
#[derive(Debug, Clone, PartialEq)]
pub struct FormState {
    record: Value,
}

impl FormState {
    pub fn new(record: Value) -> Self {
        Self { record }
    }

    pub fn record(&self) -> &Value {
        &self.record
    }

    pub fn into_record(self) -> Value {
        self.record
    }

    pub fn get(&self, path: &str) -> Option<&Value> {
        get_value_by_path(&self.record, path)
    }

    /// A new state with `value` at `path`.
    pub fn set(&self, path: &str, value: Value) -> Result<FormState, PathError> {
        set_value_by_path(&self.record, path, value).map(FormState::new)
    }

    /// The string at a typed field, `None` when absent or not a string.
    pub fn text(&self, field: DossierField) -> Option<&str> {
        self.get(field.path()).and_then(Value::as_str)
    }

    pub fn flag(&self, field: DossierField) -> bool {
        self.get(field.path()).and_then(Value::as_bool).unwrap_or(false)
    }

    pub fn is_missing(&self, path: &str) -> bool {
        is_missing(self.get(path))
    }

    pub fn display(&self, path: &str) -> Rendered {
        format_value(self.get(path))
    }
}
