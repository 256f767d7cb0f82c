//! Conversion between EURING formats.
//!
//! Each field of the target schema is filled by a [`ConversionRule`]. Rules
//! are declared per ordered pair of formats and per target field; a pair and
//! its reverse are independent. Fields without an explicit rule are copied
//! when the source has them and filled with their placeholder otherwise.
//!
//! A conversion is lossy when a populated source value has nowhere to go in
//! the target, or can only be written approximately. Lossy conversions are
//! refused unless forced. Every converted record is rebuilt and re-decoded in
//! the target schema, so a conversion never returns an invalid record.
//!
//! # Examples
//!
//! ```
//! use euring::{convert_str, ConvertOptions, EuringFormat};
//!
//! let raw = "DERA0CD...5206514ZZ1877018770N0ZUFF02U-----120719760----SV55+584200+01348000101030100202301739";
//! let options = ConvertOptions::default()
//!     .with_target(EuringFormat::Euring2020)
//!     .with_split_coordinates(true);
//! let converted = convert_str(raw, &options)?;
//! let fields: Vec<&str> = converted.split('|').collect();
//! assert_eq!(fields.len(), 64);
//! assert_eq!(fields[24], "...............");
//! assert_eq!(&fields[60..62], ["58.7000", "13.8000"]);
//! # Ok::<(), euring::ConversionError>(())
//! ```

use crate::builder::{BuildMode, RecordBuilder};
use crate::code_tables::CodeTableName;
use crate::coordinates::{
    format_coordinates, format_decimal_degrees, parse_coordinates, parse_decimal_degrees,
    UNKNOWN_COORDINATES,
};
use crate::decoder::{decode, RecordDecoder};
use crate::error::ConversionError;
use crate::format::EuringFormat;
use crate::record::DecodedRecord;
use crate::schema::schema_for;
use indexmap::{IndexMap, IndexSet};
use lazy_static::lazy_static;

/// Part of a position written by a coordinate split.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoordinatePart {
    /// The combined `±DDMMSS±DDDMMSS` field
    Combined,
    /// Decimal latitude
    Latitude,
    /// Decimal longitude
    Longitude,
}

/// Change of representation between formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reformat {
    /// Combined co-ordinates from split latitude/longitude
    MergeCoordinates,
    /// One part of split latitude/longitude from combined co-ordinates
    SplitCoordinates {
        /// Part this target field receives
        part: CoordinatePart,
    },
}

/// How one target field is derived from a source record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConversionRule {
    /// Copy the raw value of a source field
    Identity {
        /// Source field key
        source_key: &'static str,
    },
    /// Derive the value by changing its representation
    Reformat(Reformat),
    /// Translate a code into the code set of the target format
    CodeRemap {
        /// Source field key
        source_key: &'static str,
        /// Table the code belongs to
        table: CodeTableName,
    },
    /// Target-only field, written with its placeholder
    Default,
}

type RuleKey = (EuringFormat, EuringFormat, &'static str);

lazy_static! {
    static ref RULES: IndexMap<RuleKey, ConversionRule> = {
        let mut rules = IndexMap::new();
        for target in [EuringFormat::Euring2000, EuringFormat::Euring2000Plus] {
            rules.insert(
                (EuringFormat::Euring2020, target, "geographical_coordinates"),
                ConversionRule::Reformat(Reformat::MergeCoordinates),
            );
            rules.insert(
                (EuringFormat::Euring2020, target, "accuracy_of_coordinates"),
                ConversionRule::CodeRemap {
                    source_key: "accuracy_of_coordinates",
                    table: CodeTableName::AccuracyOfCoordinates,
                },
            );
        }
        for source in [EuringFormat::Euring2000, EuringFormat::Euring2000Plus] {
            for (key, part) in [
                ("geographical_coordinates", CoordinatePart::Combined),
                ("latitude", CoordinatePart::Latitude),
                ("longitude", CoordinatePart::Longitude),
            ] {
                rules.insert(
                    (source, EuringFormat::Euring2020, key),
                    ConversionRule::Reformat(Reformat::SplitCoordinates { part }),
                );
            }
        }
        rules
    };
}

/// Nearest older code for a code only EURING2020 defines.
fn downgraded_code(table: CodeTableName, code: &str) -> Option<&'static str> {
    match (table, code) {
        // Radii of 10 m to 2 km all fall inside the 5 km circle of code 1.
        (CodeTableName::AccuracyOfCoordinates, "A" | "B" | "C" | "D" | "E") => Some("1"),
        _ => None,
    }
}

/// Rule deriving `key` of `target` from a `source` record.
///
/// An explicit rule for the exact (source, target, key) triple wins. Without
/// one the value is copied when the source schema has the key, and defaulted
/// otherwise.
#[must_use]
pub fn rule_for(source: EuringFormat, target: EuringFormat, key: &'static str) -> ConversionRule {
    if let Some(rule) = RULES.get(&(source, target, key)) {
        return *rule;
    }
    match schema_for(source).field(key) {
        Some(definition) => ConversionRule::Identity {
            source_key: definition.key,
        },
        None => ConversionRule::Default,
    }
}

/// Options for [`Converter`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConvertOptions {
    /// Format of raw input; detected when `None`
    pub source: Option<EuringFormat>,
    /// Format to convert to
    pub target: EuringFormat,
    /// Accept lossy conversions, dropping what cannot be represented
    pub force: bool,
    /// When downgrading, write latitude/longitude into the combined field
    /// instead of the fifteen-dot placeholder
    pub merge_coordinates: bool,
    /// When upgrading, split the combined field into latitude/longitude
    pub split_coordinates: bool,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        ConvertOptions {
            source: None,
            target: EuringFormat::Euring2020,
            force: false,
            merge_coordinates: false,
            split_coordinates: false,
        }
    }
}

impl ConvertOptions {
    /// Decode raw input as this format.
    #[must_use]
    pub fn with_source(mut self, source: EuringFormat) -> Self {
        self.source = Some(source);
        self
    }

    /// Convert to this format.
    #[must_use]
    pub fn with_target(mut self, target: EuringFormat) -> Self {
        self.target = target;
        self
    }

    /// Accept or refuse lossy conversions.
    #[must_use]
    pub fn with_force(mut self, force: bool) -> Self {
        self.force = force;
        self
    }

    /// Merge latitude/longitude into the combined field when downgrading.
    #[must_use]
    pub fn with_merge_coordinates(mut self, merge: bool) -> Self {
        self.merge_coordinates = merge;
        self
    }

    /// Split the combined field into latitude/longitude when upgrading.
    #[must_use]
    pub fn with_split_coordinates(mut self, split: bool) -> Self {
        self.split_coordinates = split;
        self
    }
}

/// Tracks which source fields a conversion used and which it could not keep.
#[derive(Debug, Default)]
struct Loss {
    consumed: IndexSet<&'static str>,
    lossy: Vec<String>,
}

impl Loss {
    fn consume(&mut self, key: &'static str) {
        self.consumed.insert(key);
    }

    fn flag(&mut self, key: &str) {
        if !self.lossy.iter().any(|k| k == key) {
            self.lossy.push(key.to_string());
        }
    }
}

/// Converts decoded records according to a set of [`ConvertOptions`].
#[derive(Debug, Clone, Copy, Default)]
pub struct Converter {
    options: ConvertOptions,
}

impl Converter {
    /// Create a converter.
    #[must_use]
    pub fn new(options: ConvertOptions) -> Self {
        Converter { options }
    }

    /// Options in use.
    #[must_use]
    pub fn options(&self) -> &ConvertOptions {
        &self.options
    }

    /// Convert a decoded record to the target format.
    ///
    /// # Errors
    ///
    /// Returns [`ConversionError::Lossy`] when information would be lost and
    /// the conversion is not forced, and [`ConversionError::InvalidField`]
    /// when a converted value does not validate in the target schema.
    pub fn convert(&self, record: &DecodedRecord) -> Result<DecodedRecord, ConversionError> {
        let source = record.format();
        let target = self.options.target;
        let mut loss = Loss::default();
        let mut builder = RecordBuilder::new(target).with_mode(BuildMode::Lenient);

        for definition in schema_for(target) {
            let rule = rule_for(source, target, definition.key);
            log::trace!("{source} -> {target}: {} by {rule:?}", definition.key);
            let value = self.apply(rule, definition.key, record, &mut loss);
            builder.set(definition.key, value)?;
        }

        for field in record.fields() {
            if !loss.consumed.contains(field.key()) && field.definition().is_populated(field.raw()) {
                loss.flag(field.key());
            }
        }
        if !loss.lossy.is_empty() {
            if !self.options.force {
                return Err(ConversionError::Lossy {
                    source_format: source,
                    target_format: target,
                    fields: loss.lossy,
                });
            }
            log::debug!(
                "forced {source} -> {target} conversion drops {}",
                loss.lossy.join(", ")
            );
        }

        let raw = builder.build()?;
        let converted = RecordDecoder::new().with_format(target).decode(&raw)?;
        if let Some(field) = converted.invalid_fields().next() {
            let issue = &field.issues()[0];
            return Err(ConversionError::InvalidField {
                key: field.key().to_string(),
                value: field.raw().to_string(),
                kind: issue.kind,
                message: issue.message.clone(),
            });
        }
        Ok(converted)
    }

    /// Decode raw text and convert it, returning the converted raw text.
    ///
    /// # Errors
    ///
    /// Returns [`ConversionError::Decode`] when the input cannot be decoded,
    /// otherwise see [`Converter::convert`].
    pub fn convert_str(&self, raw: &str) -> Result<String, ConversionError> {
        let record = decode(raw, self.options.source)?;
        Ok(self.convert(&record)?.raw().to_string())
    }

    fn apply(
        &self,
        rule: ConversionRule,
        key: &'static str,
        record: &DecodedRecord,
        loss: &mut Loss,
    ) -> String {
        match rule {
            ConversionRule::Identity { source_key } => {
                loss.consume(source_key);
                recorded_value(record, source_key).to_string()
            },
            ConversionRule::Reformat(Reformat::MergeCoordinates) => {
                self.merge_coordinates(record, loss)
            },
            ConversionRule::Reformat(Reformat::SplitCoordinates { part }) => {
                self.split_coordinates(part, record, loss)
            },
            ConversionRule::CodeRemap { source_key, table } => {
                loss.consume(source_key);
                let code = recorded_value(record, source_key);
                match downgraded_code(table, code) {
                    Some(replacement) => {
                        loss.flag(source_key);
                        replacement.to_string()
                    },
                    None => code.to_string(),
                }
            },
            ConversionRule::Default => {
                log::trace!("{key} has no source in {}", record.format());
                String::new()
            },
        }
    }

    fn merge_coordinates(&self, record: &DecodedRecord, loss: &mut Loss) -> String {
        loss.consume("geographical_coordinates");
        loss.consume("latitude");
        loss.consume("longitude");
        let combined = record.value("geographical_coordinates").unwrap_or_default();
        let latitude = record.value("latitude").unwrap_or_default();
        let longitude = record.value("longitude").unwrap_or_default();
        if latitude.is_empty() && longitude.is_empty() {
            return combined.to_string();
        }
        let parts_valid = ["latitude", "longitude"]
            .iter()
            .all(|key| record.field(key).is_some_and(|field| field.is_valid()));
        if self.options.merge_coordinates && parts_valid {
            if let (Some(lat), Some(lng)) = (
                parse_decimal_degrees(latitude),
                parse_decimal_degrees(longitude),
            ) {
                return format_coordinates(lat, lng);
            }
        }
        for (key, value) in [("latitude", latitude), ("longitude", longitude)] {
            if !value.is_empty() {
                loss.flag(key);
            }
        }
        UNKNOWN_COORDINATES.to_string()
    }

    fn split_coordinates(&self, part: CoordinatePart, record: &DecodedRecord, loss: &mut Loss) -> String {
        loss.consume("geographical_coordinates");
        let combined = record.value("geographical_coordinates").unwrap_or_default();
        let split = if self.options.split_coordinates {
            parse_coordinates(combined).ok().flatten()
        } else {
            None
        };
        match (part, split) {
            (CoordinatePart::Combined, None) => combined.to_string(),
            (CoordinatePart::Combined, Some(_)) => UNKNOWN_COORDINATES.to_string(),
            (CoordinatePart::Latitude, Some((lat, _))) => format_decimal_degrees(lat),
            (CoordinatePart::Longitude, Some((_, lng))) => format_decimal_degrees(lng),
            (_, None) => String::new(),
        }
    }
}

/// Convert a decoded record to another format.
///
/// # Errors
///
/// See [`Converter::convert`].
pub fn convert(
    record: &DecodedRecord,
    target: EuringFormat,
    force: bool,
) -> Result<DecodedRecord, ConversionError> {
    let options = ConvertOptions::default()
        .with_target(target)
        .with_force(force);
    Converter::new(options).convert(record)
}

/// Convert raw text according to the given options.
///
/// # Errors
///
/// See [`Converter::convert_str`].
pub fn convert_str(raw: &str, options: &ConvertOptions) -> Result<String, ConversionError> {
    Converter::new(*options).convert_str(raw)
}

/// Convert raw text with textual format names such as `"2000plus"`.
///
/// # Errors
///
/// Returns [`ConversionError::UnknownSourceFormat`] or
/// [`ConversionError::UnknownTargetFormat`] for unresolvable names, otherwise
/// see [`Converter::convert_str`].
pub fn convert_text(
    raw: &str,
    source: Option<&str>,
    target: &str,
    force: bool,
) -> Result<String, ConversionError> {
    let source = source
        .map(|name| {
            name.parse::<EuringFormat>()
                .map_err(|_| ConversionError::UnknownSourceFormat(name.to_string()))
        })
        .transpose()?;
    let target = target
        .parse::<EuringFormat>()
        .map_err(|_| ConversionError::UnknownTargetFormat(target.to_string()))?;
    let mut options = ConvertOptions::default()
        .with_target(target)
        .with_force(force);
    options.source = source;
    convert_str(raw, &options)
}

/// Raw value of a source field, empty when the field is not recorded.
fn recorded_value<'a>(record: &'a DecodedRecord, key: &str) -> &'a str {
    record
        .field(key)
        .filter(|field| !field.definition().is_unrecorded(field.raw()))
        .map_or("", |field| field.raw())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::build;
    use crate::field_type::IssueKind;

    const EURING2000_RECORD: &str =
        "DERA0CD...5206514ZZ1877018770N0ZUFF02U-----120719760----SV55+584200+01348000101030100202301739";

    fn euring2020(extra: &[(&'static str, &'static str)]) -> String {
        let mut values = vec![
            ("ringing_scheme", "GBB"),
            ("primary_identification_method", "A0"),
            ("identification_number", "1234567890"),
            ("verification_of_the_metal_ring", "0"),
            ("metal_ring_information", "1"),
            ("other_marks_information", "ZZ"),
            ("species_mentioned", "00010"),
            ("species_concluded", "00010"),
            ("manipulated", "N"),
            ("moved_before_the_encounter", "0"),
            ("catching_method", "M"),
            ("catching_lures", "U"),
            ("sex_mentioned", "U"),
            ("sex_concluded", "U"),
            ("age_mentioned", "2"),
            ("age_concluded", "2"),
            ("status", "U"),
            ("date", "01012024"),
            ("accuracy_of_date", "0"),
            ("time", "0000"),
            ("place_code", "AB00"),
            ("geographical_coordinates", "+000000+0000000"),
            ("accuracy_of_coordinates", "1"),
            ("condition", "9"),
            ("circumstances", "99"),
            ("circumstances_presumed", "0"),
            ("euring_code_identifier", "4"),
        ];
        for &(key, value) in extra {
            match values.iter_mut().find(|(k, _)| *k == key) {
                Some(entry) => entry.1 = value,
                None => values.push((key, value)),
            }
        }
        build(EuringFormat::Euring2020, values, false).unwrap()
    }

    #[test]
    fn test_rule_precedence() {
        assert_eq!(
            rule_for(EuringFormat::Euring2020, EuringFormat::Euring2000Plus, "geographical_coordinates"),
            ConversionRule::Reformat(Reformat::MergeCoordinates)
        );
        assert_eq!(
            rule_for(EuringFormat::Euring2020, EuringFormat::Euring2000Plus, "date"),
            ConversionRule::Identity { source_key: "date" }
        );
        assert_eq!(
            rule_for(EuringFormat::Euring2000, EuringFormat::Euring2000Plus, "wing_length"),
            ConversionRule::Default
        );
        assert_eq!(
            rule_for(EuringFormat::Euring2020, EuringFormat::Euring2020, "geographical_coordinates"),
            ConversionRule::Identity {
                source_key: "geographical_coordinates"
            }
        );
    }

    #[test]
    fn test_forced_downgrade_writes_dotted_coordinates() {
        let raw = euring2020(&[
            ("geographical_coordinates", UNKNOWN_COORDINATES),
            ("latitude", "52.3760"),
            ("longitude", "4.9000"),
        ]);
        let options = ConvertOptions::default()
            .with_source(EuringFormat::Euring2020)
            .with_target(EuringFormat::Euring2000Plus);

        match convert_str(&raw, &options).unwrap_err() {
            ConversionError::Lossy { fields, .. } => assert_eq!(fields, vec!["latitude", "longitude"]),
            other => panic!("unexpected error: {other:?}"),
        }

        let converted = convert_str(&raw, &options.with_force(true)).unwrap();
        let values: Vec<&str> = converted.split('|').collect();
        assert_eq!(values.len(), 60);
        assert_eq!(values[24], UNKNOWN_COORDINATES);
    }

    #[test]
    fn test_merge_coordinates_is_not_lossy() {
        let raw = euring2020(&[
            ("geographical_coordinates", UNKNOWN_COORDINATES),
            ("latitude", "52.3760"),
            ("longitude", "4.9000"),
        ]);
        let options = ConvertOptions::default()
            .with_target(EuringFormat::Euring2000Plus)
            .with_merge_coordinates(true);
        let converted = convert_str(&raw, &options).unwrap();
        assert_eq!(converted.split('|').nth(24), Some("+522234+0045400"));
    }

    #[test]
    fn test_merge_skips_invalid_lat_long() {
        let raw = euring2020(&[
            ("geographical_coordinates", UNKNOWN_COORDINATES),
            ("latitude", "52.3760"),
            ("longitude", "4.9000"),
        ])
        .replace("|52.3760|", "|1e1|");
        let options = ConvertOptions::default()
            .with_target(EuringFormat::Euring2000Plus)
            .with_merge_coordinates(true);

        match convert_str(&raw, &options).unwrap_err() {
            ConversionError::Lossy { fields, .. } => assert!(fields.iter().any(|f| f == "latitude")),
            other => panic!("unexpected error: {other:?}"),
        }

        let converted = convert_str(&raw, &options.with_force(true)).unwrap();
        assert_eq!(converted.split('|').nth(24), Some(UNKNOWN_COORDINATES));
    }

    #[test]
    fn test_space_filled_fixed_width_value_converts_as_unrecorded() {
        let mut raw = EURING2000_RECORD.to_string();
        raw.replace_range(42..43, " ");
        let options = ConvertOptions::default().with_target(EuringFormat::Euring2000Plus);
        let converted = convert_str(&raw, &options).unwrap();
        assert_eq!(converted.split('|').nth(19), Some(""));
    }

    #[test]
    fn test_round_trip_through_2000_plus() {
        let raw = euring2020(&[("wing_length", "123.5"), ("remarks", "ring worn")]);
        let down = convert_str(
            &raw,
            &ConvertOptions::default().with_target(EuringFormat::Euring2000Plus),
        )
        .unwrap();
        let up = convert_str(&down, &ConvertOptions::default()).unwrap();
        assert_eq!(up, raw);
    }

    #[test]
    fn test_modern_only_fields_are_lossy() {
        let record = decode(&euring2020(&[("more_other_marks", "blue flag")]), None).unwrap();
        match convert(&record, EuringFormat::Euring2000Plus, false).unwrap_err() {
            ConversionError::Lossy { fields, .. } => assert_eq!(fields, vec!["more_other_marks"]),
            other => panic!("unexpected error: {other:?}"),
        }
        let converted = convert(&record, EuringFormat::Euring2000Plus, true).unwrap();
        assert!(converted.field("more_other_marks").is_none());
        assert!(converted.is_valid());
    }

    #[test]
    fn test_alphabetic_accuracy_is_remapped() {
        let record = decode(&euring2020(&[("accuracy_of_coordinates", "B")]), None).unwrap();
        assert!(matches!(
            convert(&record, EuringFormat::Euring2000, false),
            Err(ConversionError::Lossy { .. })
        ));
        let converted = convert(&record, EuringFormat::Euring2000, true).unwrap();
        assert_eq!(converted.value("accuracy_of_coordinates"), Some("1"));
        assert_eq!(converted.raw().chars().count(), 94);
    }

    #[test]
    fn test_upgrade_splits_coordinates_on_request() {
        let record = decode(EURING2000_RECORD, None).unwrap();
        let copied = convert(&record, EuringFormat::Euring2020, false).unwrap();
        assert_eq!(copied.value("geographical_coordinates"), Some("+584200+0134800"));
        assert_eq!(copied.value("latitude"), Some(""));

        let options = ConvertOptions::default().with_split_coordinates(true);
        let split = Converter::new(options).convert(&record).unwrap();
        assert_eq!(split.value("geographical_coordinates"), Some(UNKNOWN_COORDINATES));
        assert_eq!(split.value("latitude"), Some("58.7000"));
        assert_eq!(split.value("longitude"), Some("13.8000"));
    }

    #[test]
    fn test_downgrade_to_fixed_width_uses_placeholders() {
        let raw = euring2020(&[]);
        let record = decode(&raw, None).unwrap();
        let converted = convert(&record, EuringFormat::Euring2000, false).unwrap();
        assert_eq!(converted.value("brood_size"), Some("--"));
        assert_eq!(converted.value("distance"), Some("-----"));
        assert!(converted.is_valid());
    }

    #[test]
    fn test_invalid_source_value_surfaces() {
        let raw = euring2020(&[]).replacen("01012024", "32012024", 1);
        let record = decode(&raw, None).unwrap();
        match convert(&record, EuringFormat::Euring2000Plus, true).unwrap_err() {
            ConversionError::InvalidField { key, kind, .. } => {
                assert_eq!(key, "date");
                assert_eq!(kind, IssueKind::Range);
            },
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_text_surface_hints() {
        assert_eq!(
            convert_text(EURING2000_RECORD, Some("1999"), "2020", false),
            Err(ConversionError::UnknownSourceFormat("1999".to_string()))
        );
        assert_eq!(
            convert_text(EURING2000_RECORD, None, "euring2021", false),
            Err(ConversionError::UnknownTargetFormat("euring2021".to_string()))
        );
        let converted = convert_text(EURING2000_RECORD, Some("euring2000"), "2000plus", false).unwrap();
        assert_eq!(converted.split('|').count(), 60);
    }
}
