//! Decoding raw EURING text into [`DecodedRecord`]s.
//!
//! # Examples
//!
//! ```
//! use euring::{decode, EuringFormat};
//!
//! let raw = "DERA0CD...5206514ZZ1877018770N0ZUFF02U-----120719760----SV55+584200+01348000101030100202301739";
//! let record = decode(raw, None)?;
//! assert_eq!(record.format(), EuringFormat::Euring2000);
//! assert_eq!(record.value("species_mentioned"), Some("18770"));
//! # Ok::<(), euring::DecodeError>(())
//! ```

use crate::code_tables::{code_tables, CodeTables};
use crate::error::DecodeError;
use crate::field_type::{FieldIssue, IssueKind};
use crate::format::{detect_format, EuringFormat, SEPARATOR};
use crate::record::{DecodedField, DecodedRecord};
use crate::record_rules;
use crate::schema::{schema_for, FieldLayout, RecordSchema};

/// Decodes raw records, optionally forcing a format.
///
/// Field-level failures never abort decoding; they are recorded on the
/// returned record. Only structural problems (empty input, wrong width or
/// field count, misplaced separators) are errors.
#[derive(Debug, Clone, Copy)]
pub struct RecordDecoder<'t> {
    format: Option<EuringFormat>,
    tables: &'t CodeTables,
}

impl Default for RecordDecoder<'static> {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordDecoder<'static> {
    /// Decoder that detects the format of each record and uses the
    /// process-wide code tables.
    #[must_use]
    pub fn new() -> Self {
        RecordDecoder {
            format: None,
            tables: code_tables(),
        }
    }
}

impl<'t> RecordDecoder<'t> {
    /// Decode every record as the given format, skipping detection.
    #[must_use]
    pub fn with_format(mut self, format: EuringFormat) -> Self {
        self.format = Some(format);
        self
    }

    /// Validate codes against the given tables instead of the process-wide ones.
    #[must_use]
    pub fn with_code_tables<'u>(self, tables: &'u CodeTables) -> RecordDecoder<'u> {
        RecordDecoder {
            format: self.format,
            tables,
        }
    }

    /// Format forced on every record, if any.
    #[must_use]
    pub fn format(&self) -> Option<EuringFormat> {
        self.format
    }

    /// Decode one raw record.
    ///
    /// # Errors
    ///
    /// Returns a [`DecodeError`] when the record is empty, has the wrong width
    /// or field count for its format, or uses the separator inconsistently.
    pub fn decode(&self, raw: &str) -> Result<DecodedRecord, DecodeError> {
        if raw.is_empty() {
            return Err(DecodeError::EmptyRecord);
        }
        let format = match self.format {
            Some(format) => format,
            None => {
                let detected = detect_format(raw)?;
                log::debug!("detected format {detected}");
                detected
            },
        };
        let schema = schema_for(format);
        let values = split(schema, raw)?;

        let mut fields: Vec<DecodedField> = schema
            .iter()
            .zip(values)
            .map(|(definition, value)| DecodedField::decode(definition, value, self.tables))
            .collect();

        let mut record_values = indexmap::IndexMap::with_capacity(fields.len());
        for field in &fields {
            record_values.insert(field.key(), field.raw());
        }
        let violations = record_rules::check(format, &record_values);
        for violation in violations {
            if let Some(index) = schema.position(violation.key) {
                fields[index].push_issue(FieldIssue::new(IssueKind::RecordRule, violation.message));
            }
        }

        let record = DecodedRecord::new(format, raw, fields);
        if !record.is_valid() {
            log::debug!(
                "decoded {format} record with {} invalid field(s)",
                record.invalid_fields().count()
            );
        }
        Ok(record)
    }
}

/// Split a raw record into one value per schema field.
fn split<'r>(schema: &RecordSchema, raw: &'r str) -> Result<Vec<&'r str>, DecodeError> {
    let format = schema.format();
    if let Some(expected) = schema.record_length() {
        if raw.contains(SEPARATOR) {
            return Err(DecodeError::UnexpectedSeparator(format));
        }
        // Column spans count characters, not bytes.
        let offsets: Vec<usize> = raw
            .char_indices()
            .map(|(offset, _)| offset)
            .chain(std::iter::once(raw.len()))
            .collect();
        let actual = offsets.len() - 1;
        if actual != expected {
            return Err(DecodeError::LengthMismatch {
                format,
                expected,
                actual,
            });
        }
        return Ok(schema
            .iter()
            .map(|definition| match definition.layout {
                FieldLayout::Span { start, width } => &raw[offsets[start]..offsets[start + width]],
                FieldLayout::Position(_) => "",
            })
            .collect());
    }

    if !raw.contains(SEPARATOR) {
        return Err(DecodeError::MissingSeparator(format));
    }
    let values: Vec<&str> = raw.split(SEPARATOR).collect();
    if values.len() != schema.len() {
        return Err(DecodeError::FieldCountMismatch {
            format,
            expected: schema.len(),
            actual: values.len(),
        });
    }
    Ok(values)
}

/// Decode a raw record, detecting its format unless one is given.
///
/// # Errors
///
/// See [`RecordDecoder::decode`].
pub fn decode(raw: &str, format: Option<EuringFormat>) -> Result<DecodedRecord, DecodeError> {
    let decoder = RecordDecoder::new();
    match format {
        Some(format) => decoder.with_format(format).decode(raw),
        None => decoder.decode(raw),
    }
}

/// Decode a raw record with an optional textual format hint such as
/// `"2000plus"`.
///
/// # Errors
///
/// Returns [`DecodeError::UnknownFormat`] for an unresolvable hint, otherwise
/// see [`RecordDecoder::decode`].
pub fn decode_with_hint(raw: &str, hint: Option<&str>) -> Result<DecodedRecord, DecodeError> {
    let format = hint
        .map(|hint| {
            hint.parse::<EuringFormat>()
                .map_err(|_| DecodeError::UnknownFormat(hint.to_string()))
        })
        .transpose()?;
    decode(raw, format)
}
