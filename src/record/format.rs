use chrono::NaiveDate;
use lazy_static::lazy_static;
use regex::Regex;
use serde::Serialize;
use serde_json::{Map, Value};
use std::fmt;

use super::missing::is_missing;

lazy_static! {
    static ref ISO_DATE: Regex = Regex::new(r"^[0-9]{4}-[0-9]{2}-[0-9]{2}(?:[T ].*)?$").unwrap();
}

/// Address parts in the order they are printed.
const ADDRESS_ORDER: &[&str] = &[
    "flatHouseNo",
    "areaStreet",
    "landmark",
    "city",
    "district",
    "state",
    "pincode",
    "country",
];

const ADDRESS_MARKERS: &[&str] = &["flatHouseNo", "areaStreet", "city", "pincode"];

/// A field value prepared for read-only display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "camelCase")]
pub enum Rendered {
    Missing,
    Text(String),
    Date(String),
    Image { url: String },
}

impl Rendered {
    pub fn is_missing(&self) -> bool {
        matches!(self, Rendered::Missing)
    }
}

impl fmt::Display for Rendered {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rendered::Missing => f.write_str("Missing"),
            Rendered::Text(s) | Rendered::Date(s) => f.write_str(s),
            Rendered::Image { url } => f.write_str(url),
        }
    }
}

pub fn format_value(value: Option<&Value>) -> Rendered {
    if is_missing(value) {
        return Rendered::Missing;
    }

    match value {
        None | Some(Value::Null) => Rendered::Missing,
        Some(Value::Bool(b)) => Rendered::Text(if *b { "Yes" } else { "No" }.to_string()),
        Some(Value::Number(n)) => Rendered::Text(n.to_string()),
        Some(Value::String(s)) => format_string(s),
        Some(Value::Array(items)) => Rendered::Text(format_array(items)),
        Some(Value::Object(map)) if is_address(map) => Rendered::Text(format_address(map)),
        Some(Value::Object(map)) => Rendered::Text(format_object(map)),
    }
}

fn format_string(s: &str) -> Rendered {
    let s = s.trim();

    if ISO_DATE.is_match(s) {
        if let Some(Ok(date)) = s.get(..10).map(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d")) {
            return Rendered::Date(date.format("%d/%m/%Y").to_string());
        }
    }

    if s.starts_with("http://") || s.starts_with("https://") {
        return Rendered::Image { url: s.to_string() };
    }

    Rendered::Text(s.to_string())
}

fn format_array(items: &[Value]) -> String {
    if items.iter().all(Value::is_object) {
        return items
            .iter()
            .filter_map(Value::as_object)
            .map(format_object)
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(" | ");
    }

    items
        .iter()
        .map(|v| format_value(Some(v)))
        .filter(|r| !r.is_missing())
        .map(|r| r.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

fn format_object(map: &Map<String, Value>) -> String {
    map.iter()
        .filter_map(|(key, val)| {
            let rendered = format_value(Some(val));
            (!rendered.is_missing()).then(|| format!("{}: {}", key, rendered))
        })
        .collect::<Vec<_>>()
        .join(", ")
}

fn is_address(map: &Map<String, Value>) -> bool {
    ADDRESS_MARKERS.iter().any(|k| map.contains_key(*k))
}

fn format_address(map: &Map<String, Value>) -> String {
    ADDRESS_ORDER
        .iter()
        .filter_map(|key| {
            let rendered = format_value(map.get(*key));
            (!rendered.is_missing()).then(|| rendered.to_string())
        })
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn show(v: Value) -> String {
        format_value(Some(&v)).to_string()
    }

    #[test]
    fn test_missing_marker() {
        assert_eq!(format_value(None), Rendered::Missing);
        assert_eq!(show(json!("  ")), "Missing");
        assert_eq!(show(json!({})), "Missing");
    }

    #[test]
    fn test_scalars() {
        assert_eq!(show(json!(true)), "Yes");
        assert_eq!(show(json!(false)), "No");
        assert_eq!(show(json!(0)), "0");
        assert_eq!(show(json!("Farmer")), "Farmer");
    }

    #[test]
    fn test_dates_render_day_first() {
        assert_eq!(format_value(Some(&json!("1990-04-07"))), Rendered::Date("07/04/1990".to_string()));
        assert_eq!(show(json!("2024-01-15T10:30:00.000Z")), "15/01/2024");
        assert_eq!(show(json!("2024-13-45")), "2024-13-45");
    }

    #[test]
    fn test_non_ascii_digits_stay_text() {
        assert_eq!(
            format_value(Some(&json!("٢٠٢٤-٠١-١٥"))),
            Rendered::Text("٢٠٢٤-٠١-١٥".to_string())
        );
        assert_eq!(show(json!("२०२४-०१-१५T10:00")), "२०२४-०१-१५T10:00");
    }

    #[test]
    fn test_urls_become_images() {
        assert_eq!(
            format_value(Some(&json!("https://cdn.example.org/p.jpg"))),
            Rendered::Image { url: "https://cdn.example.org/p.jpg".to_string() }
        );
    }

    #[test]
    fn test_address_single_line() {
        let addr = json!({
            "pincode": "411001",
            "city": "Pune",
            "flatHouseNo": "12B",
            "landmark": "",
            "state": "Maharashtra"
        });
        assert_eq!(show(addr), "12B, Pune, Maharashtra, 411001");
    }

    #[test]
    fn test_rows_and_objects() {
        let rows = json!([
            { "bankName": "SBI", "ifscCode": "SBIN0001234" },
            { "bankName": "HDFC", "ifscCode": "" }
        ]);
        assert_eq!(show(rows), "bankName: SBI, ifscCode: SBIN0001234 | bankName: HDFC");
        assert_eq!(show(json!(["a", "", "b"])), "a, b");
    }
}
