use reqwest::multipart::{Form, Part};
use serde_json::Value;

use super::upload::Upload;
use crate::errors::AppResult;

#[derive(Debug, Clone, PartialEq)]
pub enum PartValue {
    Text(String),
    File(Upload),
}

/// Ordered multipart fields, built before any request exists so the payload
/// can be inspected and logged.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MultipartPayload {
    parts: Vec<(String, PartValue)>,
}

impl MultipartPayload {
    pub fn new() -> Self {
        Self::default()
    }

    /// Flatten a record into bracket keys: `personalDetails[nameOfMember]`,
    /// `bankDetails[0][ifscCode]`, `remarks[1]`. Nulls are skipped.
    pub fn from_record(record: &Value) -> Self {
        let mut payload = Self::new();
        if let Value::Object(map) = record {
            for (key, value) in map {
                payload.push_flattened(key.clone(), value);
            }
        }
        payload
    }

    fn push_flattened(&mut self, key: String, value: &Value) {
        match value {
            Value::Null => {}
            Value::Bool(b) => self.text(key, b.to_string()),
            Value::Number(n) => self.text(key, n.to_string()),
            Value::String(s) => self.text(key, s.clone()),
            Value::Array(items) => {
                for (i, item) in items.iter().enumerate() {
                    self.push_flattened(format!("{}[{}]", key, i), item);
                }
            }
            Value::Object(map) => {
                for (child, item) in map {
                    self.push_flattened(format!("{}[{}]", key, child), item);
                }
            }
        }
    }

    pub fn text(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.parts.push((key.into(), PartValue::Text(value.into())));
    }

    /// Attach a file, replacing any text field under the same key.
    pub fn file(&mut self, key: impl Into<String>, upload: Upload) {
        let key = key.into();
        self.parts.retain(|(k, v)| !(k == &key && matches!(v, PartValue::Text(_))));
        self.parts.push((key, PartValue::File(upload)));
    }

    pub fn get_text(&self, key: &str) -> Option<&str> {
        self.parts.iter().find_map(|(k, v)| match v {
            PartValue::Text(s) if k == key => Some(s.as_str()),
            _ => None,
        })
    }

    pub fn get_file(&self, key: &str) -> Option<&Upload> {
        self.parts.iter().find_map(|(k, v)| match v {
            PartValue::File(u) if k == key => Some(u),
            _ => None,
        })
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.parts.iter().map(|(k, _)| k.as_str())
    }

    pub fn len(&self) -> usize {
        self.parts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }

    pub fn file_count(&self) -> usize {
        self.parts.iter().filter(|(_, v)| matches!(v, PartValue::File(_))).count()
    }

    pub fn into_form(self) -> AppResult<Form> {
        let mut form = Form::new();
        for (key, value) in self.parts {
            form = match value {
                PartValue::Text(s) => form.text(key, s),
                PartValue::File(upload) => {
                    let content_type = upload.content_type();
                    let part = Part::bytes(upload.bytes)
                        .file_name(upload.file_name)
                        .mime_str(content_type)?;
                    form.part(key, part)
                }
            };
        }
        Ok(form)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_flattens_nested_record() {
        let payload = MultipartPayload::from_record(&json!({
            "personalDetails": { "nameOfMember": "Asha", "minor": false, "spouse": null },
            "bankDetails": [{ "ifscCode": "SBIN0001234" }],
            "remarks": ["first", "second"],
            "creditDetails": { "cibilScore": 750 }
        }));

        assert_eq!(payload.get_text("personalDetails[nameOfMember]"), Some("Asha"));
        assert_eq!(payload.get_text("personalDetails[minor]"), Some("false"));
        assert_eq!(payload.get_text("personalDetails[spouse]"), None);
        assert_eq!(payload.get_text("bankDetails[0][ifscCode]"), Some("SBIN0001234"));
        assert_eq!(payload.get_text("remarks[1]"), Some("second"));
        assert_eq!(payload.get_text("creditDetails[cibilScore]"), Some("750"));
    }

    #[test]
    fn test_file_replaces_text_part() {
        let mut payload = MultipartPayload::from_record(&json!({
            "documents": { "passportSize": "" }
        }));
        payload.file("documents[passportSize]", Upload::new("me.jpg", vec![1, 2]));

        assert_eq!(payload.get_text("documents[passportSize]"), None);
        assert_eq!(payload.get_file("documents[passportSize]").map(|u| u.file_name.as_str()), Some("me.jpg"));
        assert_eq!(payload.len(), 1);
        assert_eq!(payload.file_count(), 1);
    }

    #[test]
    fn test_into_form_builds() {
        let mut payload = MultipartPayload::new();
        payload.text("subject", "AGM");
        payload.file("attachments[0]", Upload::new("agenda.pdf", b"%PDF".to_vec()));
        assert!(payload.into_form().is_ok());
    }
}
