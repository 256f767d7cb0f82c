//! JSON rendering of decoded EURING records.
//!
//! The rendering carries both views of the record: `fields` is keyed by
//! stable field key and holds the full detail of each field, `by_name` maps
//! official field names to raw values. Both are in schema order.
//!
//! # Examples
//!
//! ```
//! use euring::{decode, json};
//!
//! let raw = "DERA0CD...5206514ZZ1877018770N0ZUFF02U-----120719760----SV55+584200+01348000101030100202301739";
//! let record = decode(raw, None)?;
//! let value = json::record_to_json(&record);
//! assert_eq!(value["format"], "euring2000");
//! assert_eq!(value["fields"]["place_code"]["value"], "SV55");
//! assert_eq!(value["by_name"]["Place Code"], "SV55");
//! # Ok::<(), euring::DecodeError>(())
//! ```

use crate::record::{DecodedField, DecodedRecord};
use serde_json::{json, Map, Value};

/// Convert one decoded field to JSON.
#[must_use]
pub fn field_to_json(field: &DecodedField) -> Value {
    let mut object = Map::new();
    object.insert("name".to_string(), json!(field.name()));
    object.insert("value".to_string(), json!(field.raw()));
    if let Some(value) = field.value() {
        object.insert("typed".to_string(), json!(value));
    }
    if let Some(description) = field.description() {
        object.insert("description".to_string(), json!(description));
    }
    if !field.is_valid() {
        object.insert("issues".to_string(), json!(field.issues()));
    }
    Value::Object(object)
}

/// Convert a decoded record to JSON.
///
/// Optional keys (`typed`, `description`, `issues`) are left out of a field
/// when they have nothing to say.
#[must_use]
pub fn record_to_json(record: &DecodedRecord) -> Value {
    let fields: Map<String, Value> = record
        .fields()
        .iter()
        .map(|field| (field.key().to_string(), field_to_json(field)))
        .collect();
    let by_name: Map<String, Value> = record
        .fields()
        .iter()
        .map(|field| (field.name().to_string(), json!(field.raw())))
        .collect();
    json!({
        "format": record.format().as_str(),
        "format_name": record.format().display_name(),
        "raw": record.raw(),
        "is_valid": record.is_valid(),
        "fields": fields,
        "by_name": by_name,
    })
}

/// Render a decoded record as a JSON string, optionally indented.
#[must_use]
pub fn record_to_json_string(record: &DecodedRecord, pretty: bool) -> String {
    let value = record_to_json(record);
    if pretty {
        format!("{value:#}")
    } else {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decoder::decode;

    const EURING2000_RECORD: &str =
        "DERA0CD...5206514ZZ1877018770N0ZUFF02U-----120719760----SV55+584200+01348000101030100202301739";

    #[test]
    fn test_record_to_json() {
        let record = decode(EURING2000_RECORD, None).unwrap();
        let value = record_to_json(&record);
        assert_eq!(value["format_name"], "EURING2000");
        assert_eq!(value["is_valid"], true);
        let fields = value["fields"].as_object().unwrap();
        assert_eq!(fields.len(), 33);
        assert_eq!(fields.keys().next().map(String::as_str), Some("ringing_scheme"));
        assert_eq!(fields["ringing_scheme"]["description"], "Radolfzell, Germany");
        assert_eq!(fields["date"]["typed"]["type"], "date");
        assert!(fields["date"].get("issues").is_none());
    }

    #[test]
    fn test_issues_are_rendered() {
        let broken = EURING2000_RECORD.replacen("12071976", "32071976", 1);
        let record = decode(&broken, None).unwrap();
        let value = record_to_json(&record);
        assert_eq!(value["is_valid"], false);
        assert_eq!(value["fields"]["date"]["issues"][0]["kind"], "range");
        assert!(value["fields"]["date"].get("typed").is_none());
    }

    #[test]
    fn test_json_string_parses_back() {
        let record = decode(EURING2000_RECORD, None).unwrap();
        for pretty in [false, true] {
            let text = record_to_json_string(&record, pretty);
            let parsed: Value = serde_json::from_str(&text).unwrap();
            assert_eq!(parsed["raw"], EURING2000_RECORD);
            assert_eq!(parsed["by_name"].as_object().unwrap().len(), 33);
        }
    }
}
