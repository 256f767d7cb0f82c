//! Decoded EURING records.
//!
//! A [`DecodedRecord`] holds one [`DecodedField`] per schema field, in schema
//! order. Fields can be reached by stable key or by official name; both views
//! index the same list, so they can never disagree.
//!
//! Decoding is permissive: a field that fails validation still appears in the
//! record, carrying its raw text and the [`FieldIssue`]s that explain the
//! failure.

use crate::code_tables::CodeTables;
use crate::field_type::{FieldIssue, FieldType, FieldValue, IssueKind};
use crate::format::EuringFormat;
use crate::schema::{schema_for, FieldDefinition, RecordSchema};
use indexmap::IndexMap;

/// One field of a decoded record.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedField {
    definition: &'static FieldDefinition,
    raw: String,
    value: Option<FieldValue>,
    issues: Vec<FieldIssue>,
    description: Option<String>,
}

impl DecodedField {
    /// Validate a raw value against its definition.
    #[must_use]
    pub fn decode(definition: &'static FieldDefinition, raw: &str, tables: &CodeTables) -> Self {
        let (value, issues) = match definition.check_with(raw, tables) {
            Ok(value) => (value, Vec::new()),
            Err(issue) => (None, vec![issue]),
        };
        let description = match (&value, definition.field_type) {
            (Some(FieldValue::Code(code)), FieldType::CodeTable(table)) => {
                tables.describe(table, code).map(str::to_string)
            },
            _ => None,
        };
        DecodedField {
            definition,
            raw: raw.to_string(),
            value,
            issues,
            description,
        }
    }

    pub(crate) fn push_issue(&mut self, issue: FieldIssue) {
        self.issues.push(issue);
    }

    /// Schema definition of the field.
    #[must_use]
    pub fn definition(&self) -> &'static FieldDefinition {
        self.definition
    }

    /// Stable snake_case key.
    #[must_use]
    pub fn key(&self) -> &'static str {
        self.definition.key
    }

    /// Official field name.
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.definition.name
    }

    /// Raw text exactly as it appeared in the record.
    #[must_use]
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// Typed value, when the field is valid and not empty.
    #[must_use]
    pub fn value(&self) -> Option<&FieldValue> {
        self.value.as_ref()
    }

    /// Validation failures; empty when the field is valid.
    #[must_use]
    pub fn issues(&self) -> &[FieldIssue] {
        &self.issues
    }

    /// Code-table description of the value, when one is known.
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Whether the field passed validation.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.issues.is_empty()
    }

    /// Whether the field failed with the given reason.
    #[must_use]
    pub fn has_issue(&self, kind: IssueKind) -> bool {
        self.issues.iter().any(|issue| issue.kind == kind)
    }
}

/// A decoded EURING record.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedRecord {
    format: EuringFormat,
    raw: String,
    fields: Vec<DecodedField>,
}

impl DecodedRecord {
    pub(crate) fn new(format: EuringFormat, raw: &str, fields: Vec<DecodedField>) -> Self {
        debug_assert_eq!(fields.len(), schema_for(format).len());
        DecodedRecord {
            format,
            raw: raw.to_string(),
            fields,
        }
    }

    /// Format the record was decoded as.
    #[must_use]
    pub fn format(&self) -> EuringFormat {
        self.format
    }

    /// Schema of the record's format.
    #[must_use]
    pub fn schema(&self) -> &'static RecordSchema {
        schema_for(self.format)
    }

    /// The raw record text.
    #[must_use]
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// Fields in schema order.
    #[must_use]
    pub fn fields(&self) -> &[DecodedField] {
        &self.fields
    }

    #[cfg(test)]
    pub(crate) fn fields_mut(&mut self) -> &mut [DecodedField] {
        &mut self.fields
    }

    /// Field with the given stable key.
    #[must_use]
    pub fn field(&self, key: &str) -> Option<&DecodedField> {
        self.schema().position(key).map(|i| &self.fields[i])
    }

    /// Field with the given official name.
    #[must_use]
    pub fn field_by_name(&self, name: &str) -> Option<&DecodedField> {
        self.schema()
            .field_by_name(name)
            .and_then(|definition| self.field(definition.key))
    }

    /// Raw text of the field with the given key.
    #[must_use]
    pub fn value(&self, key: &str) -> Option<&str> {
        self.field(key).map(DecodedField::raw)
    }

    /// Typed value of the field with the given key.
    #[must_use]
    pub fn typed_value(&self, key: &str) -> Option<&FieldValue> {
        self.field(key).and_then(DecodedField::value)
    }

    /// Key view: stable key to field, in schema order.
    #[must_use]
    pub fn by_key(&self) -> IndexMap<&'static str, &DecodedField> {
        self.fields.iter().map(|f| (f.key(), f)).collect()
    }

    /// Name view: official name to field, in schema order.
    #[must_use]
    pub fn by_name(&self) -> IndexMap<&'static str, &DecodedField> {
        self.fields.iter().map(|f| (f.name(), f)).collect()
    }

    /// Raw values keyed by stable key, in schema order.
    #[must_use]
    pub fn values_by_key(&self) -> IndexMap<&'static str, &str> {
        self.fields.iter().map(|f| (f.key(), f.raw())).collect()
    }

    /// Whether every field passed validation.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.fields.iter().all(DecodedField::is_valid)
    }

    /// Fields that failed validation.
    pub fn invalid_fields(&self) -> impl Iterator<Item = &DecodedField> {
        self.fields.iter().filter(|f| !f.is_valid())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::code_tables::code_tables;

    fn fixed_record() -> DecodedRecord {
        let schema = schema_for(EuringFormat::Euring2000);
        let raw = "DERA0CD...5206514ZZ1877018770N0ZUFF02U-----120719760----SV55+584200+01348000101030100202301739";
        let mut fields = Vec::new();
        let mut offset = 0;
        for definition in schema {
            let width = definition.length.fixed().unwrap();
            fields.push(DecodedField::decode(
                definition,
                &raw[offset..offset + width],
                code_tables(),
            ));
            offset += width;
        }
        DecodedRecord::new(EuringFormat::Euring2000, raw, fields)
    }

    #[test]
    fn test_views_reference_same_fields() {
        let record = fixed_record();
        let by_key = record.by_key();
        let by_name = record.by_name();
        assert_eq!(by_key.len(), 33);
        for (key, field) in &by_key {
            let named = by_name[field.name()];
            assert!(std::ptr::eq(*field, named), "{key}");
        }
    }

    #[test]
    fn test_field_accessors() {
        let record = fixed_record();
        assert_eq!(record.value("ringing_scheme"), Some("DER"));
        assert_eq!(
            record.field_by_name("Ringing Scheme").map(DecodedField::raw),
            Some("DER")
        );
        assert_eq!(
            record.field("ringing_scheme").unwrap().description(),
            Some("Radolfzell, Germany")
        );
        assert_eq!(
            record.typed_value("identification_number"),
            Some(&FieldValue::Text("CD52065".to_string()))
        );
        assert!(record.field("latitude").is_none());
    }

    #[test]
    fn test_validity_aggregate() {
        let mut record = fixed_record();
        assert!(record.is_valid(), "{:?}", record.invalid_fields().collect::<Vec<_>>());
        record.fields_mut()[0].push_issue(FieldIssue::new(IssueKind::RecordRule, "test"));
        assert!(!record.is_valid());
        let invalid: Vec<_> = record.invalid_fields().map(DecodedField::key).collect();
        assert_eq!(invalid, vec!["ringing_scheme"]);
    }
}
