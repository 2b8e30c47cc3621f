use serde_json::{Map, Value};
use thiserror::Error;

/// A dotted path could not be written.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PathError {
    /// An intermediate segment holds a primitive or an array.
    #[error("segment '{segment}' is not an object")]
    NotAnObject { segment: String },
}

/// Read the value at a dotted path.
///
/// Returns `None` as soon as a segment is absent or the current node is not an
/// object. An explicit `null` at the final segment comes back as
/// `Some(&Value::Null)`.
pub fn get_value_by_path<'a>(record: &'a Value, path: &str) -> Option<&'a Value> {
    path.split('.')
        .try_fold(record, |node, segment| node.as_object()?.get(segment))
}

/// Return a copy of `record` with `value` written at `path`.
///
/// Absent and `null` segments along the way become empty objects. The input
/// is left untouched.
pub fn set_value_by_path(record: &Value, path: &str, value: Value) -> Result<Value, PathError> {
    let mut root = match record {
        Value::Null => Value::Object(Map::new()),
        other => other.clone(),
    };

    let mut parents: Vec<&str> = path.split('.').collect();
    let last = parents.pop().unwrap_or_default();

    let mut node = &mut root;
    let mut walked = String::new();
    for segment in &parents {
        if !walked.is_empty() {
            walked.push('.');
        }
        walked.push_str(segment);

        let map = node
            .as_object_mut()
            .ok_or_else(|| PathError::NotAnObject { segment: parent_of(&walked) })?;

        let child = map
            .entry(segment.to_string())
            .or_insert_with(|| Value::Object(Map::new()));
        if child.is_null() {
            *child = Value::Object(Map::new());
        }
        node = child;
    }

    node.as_object_mut()
        .ok_or_else(|| PathError::NotAnObject { segment: walked.clone() })?
        .insert(last.to_string(), value);

    Ok(root)
}

fn parent_of(walked: &str) -> String {
    match walked.rsplit_once('.') {
        Some((parent, _)) => parent.to_string(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_get_nested() {
        let r = json!({ "professionalDetails": { "serviceDetails": { "monthlyIncome": "42000" } } });
        assert_eq!(
            get_value_by_path(&r, "professionalDetails.serviceDetails.monthlyIncome"),
            Some(&json!("42000"))
        );
    }

    #[test]
    fn test_get_missing_segment_is_none() {
        let r = json!({ "x": 1 });
        assert_eq!(get_value_by_path(&r, "a.b.c"), None);
        assert_eq!(get_value_by_path(&Value::Null, "a.b.c"), None);
    }

    #[test]
    fn test_get_through_null_or_primitive_is_none() {
        let r = json!({ "a": null, "s": "text", "rows": [{ "b": 1 }] });
        assert_eq!(get_value_by_path(&r, "a.b"), None);
        assert_eq!(get_value_by_path(&r, "s.length"), None);
        assert_eq!(get_value_by_path(&r, "rows.0.b"), None);
        assert_eq!(get_value_by_path(&r, "a"), Some(&Value::Null));
    }

    #[test]
    fn test_set_leaves_input_untouched() {
        let before = json!({ "personalDetails": { "nameOfMember": "Old" } });
        let snapshot = before.clone();
        let after = set_value_by_path(&before, "personalDetails.nameOfMember", json!("New")).unwrap();

        assert_eq!(before, snapshot);
        assert_ne!(after, before);
        assert_eq!(get_value_by_path(&after, "personalDetails.nameOfMember"), Some(&json!("New")));
    }

    #[test]
    fn test_set_creates_missing_and_null_segments() {
        let r = json!({ "addressDetails": null });
        let out = set_value_by_path(&r, "addressDetails.permanentAddress.city", json!("Pune")).unwrap();
        assert_eq!(out, json!({ "addressDetails": { "permanentAddress": { "city": "Pune" } } }));

        let from_null = set_value_by_path(&Value::Null, "a.b", json!(true)).unwrap();
        assert_eq!(from_null, json!({ "a": { "b": true } }));
    }

    #[test]
    fn test_set_then_get_round_trip() {
        let r = json!({ "a": { "keep": 1 } });
        for (path, v) in [("a.b", json!(3)), ("a.c.d", json!([1, 2])), ("z", json!(null))] {
            let out = set_value_by_path(&r, path, v.clone()).unwrap();
            assert_eq!(get_value_by_path(&out, path), Some(&v));
            assert_eq!(get_value_by_path(&out, "a.keep"), Some(&json!(1)));
        }
    }

    #[test]
    fn test_set_through_primitive_is_rejected() {
        let r = json!({ "personalDetails": "flat" });
        let err = set_value_by_path(&r, "personalDetails.nameOfMember", json!("x")).unwrap_err();
        assert_eq!(err, PathError::NotAnObject { segment: "personalDetails".to_string() });
        assert_eq!(err.to_string(), "segment 'personalDetails' is not an object");

        let rows = json!({ "bankDetails": [] });
        assert!(set_value_by_path(&rows, "bankDetails.bankName", json!("SBI")).is_err());
    }
}
