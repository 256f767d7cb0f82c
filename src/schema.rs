//! Per-version record schemas.
//!
//! A [`RecordSchema`] is the ordered list of [`FieldDefinition`]s of one
//! [`EuringFormat`], with the position of each field in the raw record: a
//! column span for the fixed-width EURING2000 layout and an ordinal position
//! for the delimited layouts. The three schemas are built once from the
//! master field table and shared for the life of the process.

use crate::code_tables::{code_tables, CodeTables};
use crate::field_type::{Constraint, FieldIssue, FieldType, FieldValue, IssueKind};
use crate::fields::{FieldSpec, Length, EURING_FIELDS};
use crate::format::{EuringFormat, EURING2000_RECORD_LENGTH};
use indexmap::IndexMap;
use lazy_static::lazy_static;
use serde::Serialize;

lazy_static! {
    static ref EURING2000_SCHEMA: RecordSchema = RecordSchema::new(EuringFormat::Euring2000);
    static ref EURING2000_PLUS_SCHEMA: RecordSchema = RecordSchema::new(EuringFormat::Euring2000Plus);
    static ref EURING2020_SCHEMA: RecordSchema = RecordSchema::new(EuringFormat::Euring2020);
}

/// Schema of a EURING format.
#[must_use]
pub fn schema_for(format: EuringFormat) -> &'static RecordSchema {
    match format {
        EuringFormat::Euring2000 => &EURING2000_SCHEMA,
        EuringFormat::Euring2000Plus => &EURING2000_PLUS_SCHEMA,
        EuringFormat::Euring2020 => &EURING2020_SCHEMA,
    }
}

/// Where a field sits in a raw record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldLayout {
    /// Character span in a fixed-width record
    Span {
        /// Zero-based start column
        start: usize,
        /// Number of characters
        width: usize,
    },
    /// Ordinal position in a delimited record
    Position(usize),
}

/// A field as it appears in one schema.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldDefinition {
    /// Official name as printed in the EURING manual
    pub name: &'static str,
    /// Stable snake_case key
    pub key: &'static str,
    /// Value type
    pub field_type: FieldType,
    /// Whether an empty value is invalid in this schema
    pub required: bool,
    /// Allowed length
    pub length: Length,
    /// Declared "not recorded" token
    pub placeholder: Option<&'static str>,
    /// Extra numeric limits
    pub constraint: Option<Constraint>,
    /// Position in the raw record
    pub layout: FieldLayout,
}

impl FieldDefinition {
    fn from_spec(spec: &FieldSpec, format: EuringFormat, index: usize, start: usize) -> Self {
        let layout = match (format.is_fixed_width(), spec.length) {
            (true, Length::Fixed(width)) => FieldLayout::Span { start, width },
            _ => FieldLayout::Position(index),
        };
        // EURING2020 lets latitude/longitude stand in for the combined field.
        let required = spec.required
            && !(format == EuringFormat::Euring2020 && spec.key == "geographical_coordinates");
        FieldDefinition {
            name: spec.name,
            key: spec.key,
            field_type: spec.field_type,
            required,
            length: spec.length,
            placeholder: spec.placeholder,
            constraint: spec.constraint,
            layout,
        }
    }

    /// Zero-based index of the field within its schema.
    #[must_use]
    pub fn index(&self) -> usize {
        match self.layout {
            FieldLayout::Position(index) => index,
            FieldLayout::Span { .. } => EURING_FIELDS
                .iter()
                .position(|spec| spec.key == self.key)
                .unwrap_or_default(),
        }
    }

    /// Check a raw value against this definition using the process-wide code
    /// tables.
    ///
    /// Returns `Ok(None)` for an empty optional value.
    ///
    /// # Errors
    ///
    /// Returns the first [`FieldIssue`] found: missing value, wrong length,
    /// invalid type, or constraint violation.
    pub fn check(&self, raw: &str) -> Result<Option<FieldValue>, FieldIssue> {
        self.check_with(raw, code_tables())
    }

    /// Check a raw value against this definition using the given code tables.
    ///
    /// # Errors
    ///
    /// See [`FieldDefinition::check`].
    pub fn check_with(&self, raw: &str, tables: &CodeTables) -> Result<Option<FieldValue>, FieldIssue> {
        if self.is_unrecorded(raw) {
            return if self.required {
                Err(FieldIssue::new(
                    IssueKind::Missing,
                    "Required field, empty value \"\" is not permitted.",
                ))
            } else {
                Ok(None)
            };
        }
        let length = raw.chars().count();
        match self.length {
            Length::Fixed(width) if length != width => {
                return Err(FieldIssue::new(
                    IssueKind::Length,
                    format!("Value \"{raw}\" is length {length} instead of {width}."),
                ));
            },
            Length::Max(max) if length > max => {
                return Err(FieldIssue::new(
                    IssueKind::Length,
                    format!("Value \"{raw}\" is length {length}, should be at most {max}."),
                ));
            },
            _ => {},
        }
        if self.placeholder == Some(raw) {
            return Ok(Some(FieldValue::Unknown));
        }
        let value = self.field_type.validate_with(raw, tables)?;
        if let Some(constraint) = &self.constraint {
            constraint.check(raw, &value)?;
        }
        Ok(Some(value))
    }

    /// Value written for an unset optional field in the given format.
    ///
    /// Fixed-width records need every column filled, so they get the declared
    /// placeholder or the type's fill characters; delimited records leave the
    /// field empty.
    #[must_use]
    pub fn fill_value(&self, format: EuringFormat) -> String {
        if !format.is_fixed_width() {
            return String::new();
        }
        match (self.placeholder, self.length) {
            (Some(placeholder), _) => placeholder.to_string(),
            (None, Length::Fixed(width)) => self.field_type.placeholder(width),
            (None, _) => String::new(),
        }
    }

    /// Whether a raw value means "no value at all".
    ///
    /// That is the empty string, or in a fixed-width record the run of spaces
    /// the field's type is filled with. Any other text, spaces included, is a
    /// value and goes through validation.
    #[must_use]
    pub fn is_unrecorded(&self, raw: &str) -> bool {
        match self.layout {
            _ if raw.is_empty() => true,
            FieldLayout::Span { width, .. } => {
                raw.starts_with(' ') && self.field_type.placeholder(width) == raw
            },
            FieldLayout::Position(_) => false,
        }
    }

    /// Whether a raw value carries information: it is recorded and not the
    /// declared placeholder.
    #[must_use]
    pub fn is_populated(&self, raw: &str) -> bool {
        !self.is_unrecorded(raw) && self.placeholder != Some(raw)
    }

    /// Description of a coded value from the process-wide tables.
    #[must_use]
    pub fn describe(&self, raw: &str) -> Option<&'static str> {
        match self.field_type {
            FieldType::CodeTable(table) => code_tables().describe(table, raw),
            _ => None,
        }
    }
}

/// Ordered field definitions of one EURING format.
#[derive(Debug, Clone)]
pub struct RecordSchema {
    format: EuringFormat,
    fields: Vec<FieldDefinition>,
    by_key: IndexMap<&'static str, usize>,
    by_name: IndexMap<&'static str, usize>,
}

impl RecordSchema {
    fn new(format: EuringFormat) -> Self {
        let mut fields = Vec::with_capacity(format.field_count());
        let mut start = 0;
        for (index, spec) in EURING_FIELDS.iter().filter(|s| s.since <= format).enumerate() {
            fields.push(FieldDefinition::from_spec(spec, format, index, start));
            start += spec.length.fixed().unwrap_or(0);
        }
        let by_key = fields.iter().enumerate().map(|(i, f)| (f.key, i)).collect();
        let by_name = fields.iter().enumerate().map(|(i, f)| (f.name, i)).collect();
        log::trace!("built {format} schema with {} fields", fields.len());
        RecordSchema {
            format,
            fields,
            by_key,
            by_name,
        }
    }

    /// Format described by this schema.
    #[must_use]
    pub fn format(&self) -> EuringFormat {
        self.format
    }

    /// Field definitions in declared order.
    #[must_use]
    pub fn fields(&self) -> &[FieldDefinition] {
        &self.fields
    }

    /// Iterate over the field definitions in declared order.
    pub fn iter(&self) -> std::slice::Iter<'_, FieldDefinition> {
        self.fields.iter()
    }

    /// Number of fields.
    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Always false; every schema has fields.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Field with the given key.
    #[must_use]
    pub fn field(&self, key: &str) -> Option<&FieldDefinition> {
        self.position(key).map(|i| &self.fields[i])
    }

    /// Field with the given official name.
    #[must_use]
    pub fn field_by_name(&self, name: &str) -> Option<&FieldDefinition> {
        self.by_name.get(name).map(|&i| &self.fields[i])
    }

    /// Index of the field with the given key.
    #[must_use]
    pub fn position(&self, key: &str) -> Option<usize> {
        self.by_key.get(key).copied()
    }

    /// Whether the schema has a field with the given key.
    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.by_key.contains_key(key)
    }

    /// Total width for the fixed-width layout.
    #[must_use]
    pub fn record_length(&self) -> Option<usize> {
        self.format
            .is_fixed_width()
            .then_some(EURING2000_RECORD_LENGTH)
    }

    /// Field separator for delimited layouts.
    #[must_use]
    pub fn separator(&self) -> Option<char> {
        self.format.separator()
    }
}

impl<'a> IntoIterator for &'a RecordSchema {
    type Item = &'a FieldDefinition;
    type IntoIter = std::slice::Iter<'a, FieldDefinition>;

    fn into_iter(self) -> Self::IntoIter {
        self.fields.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_counts() {
        assert_eq!(schema_for(EuringFormat::Euring2000).len(), 33);
        assert_eq!(schema_for(EuringFormat::Euring2000Plus).len(), 60);
        assert_eq!(schema_for(EuringFormat::Euring2020).len(), 64);
    }

    #[test]
    fn test_euring2000_spans_are_contiguous() {
        let schema = schema_for(EuringFormat::Euring2000);
        let mut expected_start = 0;
        for field in schema {
            match field.layout {
                FieldLayout::Span { start, width } => {
                    assert_eq!(start, expected_start, "{}", field.key);
                    expected_start += width;
                },
                FieldLayout::Position(_) => panic!("{} has no span", field.key),
            }
        }
        assert_eq!(expected_start, 94);
        assert_eq!(schema.record_length(), Some(94));
        assert_eq!(schema.separator(), None);
    }

    #[test]
    fn test_delimited_positions() {
        let schema = schema_for(EuringFormat::Euring2020);
        for (index, field) in schema.iter().enumerate() {
            assert_eq!(field.layout, FieldLayout::Position(index));
            assert_eq!(field.index(), index);
        }
        assert_eq!(schema.record_length(), None);
        assert_eq!(schema.separator(), Some('|'));
    }

    #[test]
    fn test_key_and_name_views_agree() {
        for format in EuringFormat::ALL {
            let schema = schema_for(format);
            for field in schema {
                assert_eq!(schema.field(field.key), Some(field));
                assert_eq!(schema.field_by_name(field.name), Some(field));
            }
        }
    }

    #[test]
    fn test_coordinates_optional_only_in_2020() {
        let required = |format| {
            schema_for(format)
                .field("geographical_coordinates")
                .unwrap()
                .required
        };
        assert!(required(EuringFormat::Euring2000));
        assert!(required(EuringFormat::Euring2000Plus));
        assert!(!required(EuringFormat::Euring2020));
    }

    #[test]
    fn test_check_order() {
        let schema = schema_for(EuringFormat::Euring2000Plus);
        let scheme = schema.field("ringing_scheme").unwrap();
        assert_eq!(scheme.check("").unwrap_err().kind, IssueKind::Missing);
        assert_eq!(scheme.check("DERA").unwrap_err().kind, IssueKind::Length);
        assert_eq!(scheme.check("DE1").unwrap_err().kind, IssueKind::Type);

        let brood = schema.field("brood_size").unwrap();
        assert_eq!(brood.check("--"), Ok(Some(FieldValue::Unknown)));
        assert_eq!(brood.check(""), Ok(None));

        let direction = schema.field("direction").unwrap();
        assert_eq!(direction.check("359"), Ok(Some(FieldValue::Integer(359))));
        assert_eq!(direction.check("360").unwrap_err().kind, IssueKind::Range);

        let latitude = schema_for(EuringFormat::Euring2020).field("latitude").unwrap();
        assert_eq!(
            latitude.check("-0.0000").unwrap_err().kind,
            IssueKind::NegativeZero
        );
        assert_eq!(latitude.check("-90.00001").unwrap_err().kind, IssueKind::Length);
        assert_eq!(latitude.check("10.00001").unwrap_err().kind, IssueKind::Range);
        assert_eq!(latitude.check("91.0").unwrap_err().kind, IssueKind::Range);
    }

    #[test]
    fn test_fill_values() {
        let fixed = schema_for(EuringFormat::Euring2000);
        assert_eq!(fixed.field("time").unwrap().fill_value(EuringFormat::Euring2000), "----");
        assert_eq!(
            fixed.field("direction").unwrap().fill_value(EuringFormat::Euring2000),
            "---"
        );
        let delimited = schema_for(EuringFormat::Euring2000Plus);
        assert_eq!(
            delimited.field("time").unwrap().fill_value(EuringFormat::Euring2000Plus),
            ""
        );
    }

    #[test]
    fn test_spaces_are_unrecorded_only_where_they_are_the_fill() {
        let fixed = schema_for(EuringFormat::Euring2000);
        let accuracy = fixed.field("accuracy_of_pullus_age").unwrap();
        assert!(accuracy.is_unrecorded(" "));
        assert_eq!(accuracy.check(" "), Ok(None));

        let brood = fixed.field("brood_size").unwrap();
        assert!(!brood.is_unrecorded("  "));
        assert_eq!(brood.check("  ").unwrap_err().kind, IssueKind::Type);

        let scheme = fixed.field("ringing_scheme").unwrap();
        assert_eq!(scheme.check("   ").unwrap_err().kind, IssueKind::Missing);

        let delimited = schema_for(EuringFormat::Euring2020);
        let remarks = delimited.field("remarks").unwrap();
        assert!(remarks.is_unrecorded(""));
        assert!(!remarks.is_unrecorded(" "));
        assert_eq!(remarks.check(" "), Ok(Some(FieldValue::Text(" ".to_string()))));
        let wing = delimited.field("wing_length").unwrap();
        assert_eq!(wing.check(" ").unwrap_err().kind, IssueKind::Type);
    }

    #[test]
    fn test_is_populated() {
        let schema = schema_for(EuringFormat::Euring2020);
        let distance = schema.field("distance").unwrap();
        assert!(!distance.is_populated(""));
        assert!(!distance.is_populated("-----"));
        assert!(distance.is_populated("00123"));
    }
}
