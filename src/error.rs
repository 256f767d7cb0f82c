//! Error types for EURING operations.
//!
//! Each producing or consuming operation has its own error type so callers can
//! tell a malformed record ([`DecodeError`]) apart from a rejected build
//! ([`BuildError`]) or a refused conversion ([`ConversionError`]). [`EuringError`]
//! wraps all of them for code that does not care which stage failed.
//!
//! Field-level validation failures found while decoding are not errors: they are
//! recorded as [`FieldIssue`](crate::field_type::FieldIssue)s on the decoded
//! record.

use crate::field_type::IssueKind;
use crate::format::EuringFormat;
use thiserror::Error;

/// Error returned when a format name or alias cannot be resolved.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FormatError {
    /// The text names no known EURING format.
    #[error("Unknown format \"{0}\". Use euring2000, euring2000plus, or euring2020.")]
    Unknown(String),
}

/// Fatal error while splitting a raw record into fields.
///
/// No partial record is produced when decoding fails with one of these.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    /// The record string is empty.
    #[error("Record is an empty string")]
    EmptyRecord,

    /// An explicit format hint could not be resolved.
    #[error("Unknown format hint \"{0}\"")]
    UnknownFormat(String),

    /// A fixed-width record does not have the declared total width.
    #[error("Format {format} should be exactly {expected} characters, found {actual}")]
    LengthMismatch {
        /// Format the record was decoded as
        format: EuringFormat,
        /// Declared record width
        expected: usize,
        /// Width of the input
        actual: usize,
    },

    /// A delimited record does not have the schema's field count.
    #[error("Format {format} should have {expected} fields, found {actual}")]
    FieldCountMismatch {
        /// Format the record was decoded as
        format: EuringFormat,
        /// Number of fields in the schema
        expected: usize,
        /// Number of fields in the input
        actual: usize,
    },

    /// A fixed-width record contains the field separator.
    #[error("Format {0} should not contain pipe characters (\"|\")")]
    UnexpectedSeparator(EuringFormat),

    /// A delimited record contains no field separator.
    #[error("Format {0} should contain values separated by pipe characters (\"|\")")]
    MissingSeparator(EuringFormat),
}

/// Error while constructing a record from field values.
///
/// Building is fail-fast: the first offending field in schema order is reported.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BuildError {
    /// The key names no field in any EURING schema.
    #[error("Unknown field key \"{0}\"")]
    UnknownField(String),

    /// A required field is empty, or a strict build left a field unset.
    #[error("Missing required field \"{key}\"")]
    MissingField {
        /// Key of the missing field
        key: String,
    },

    /// A value failed its field validator.
    #[error("Invalid value \"{value}\" for \"{key}\": {message}")]
    InvalidValue {
        /// Key of the offending field
        key: String,
        /// Value as it would have been written
        value: String,
        /// Machine-readable reason
        kind: IssueKind,
        /// Human-readable reason
        message: String,
    },

    /// The values are individually valid but inconsistent as a record.
    #[error("Record rule failed for \"{key}\": {message}")]
    RecordRule {
        /// Key of the field the rule reports on
        key: String,
        /// Human-readable reason
        message: String,
    },
}

impl BuildError {
    /// Key of the field the error refers to.
    #[must_use]
    pub fn key(&self) -> &str {
        match self {
            BuildError::UnknownField(key)
            | BuildError::MissingField { key }
            | BuildError::InvalidValue { key, .. }
            | BuildError::RecordRule { key, .. } => key,
        }
    }

    /// Machine-readable reason for the failure.
    #[must_use]
    pub fn kind(&self) -> IssueKind {
        match self {
            BuildError::UnknownField(_) | BuildError::MissingField { .. } => IssueKind::Missing,
            BuildError::InvalidValue { kind, .. } => *kind,
            BuildError::RecordRule { .. } => IssueKind::RecordRule,
        }
    }
}

/// Error while converting a record between EURING formats.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConversionError {
    /// The source format hint could not be resolved.
    #[error("Unknown source format \"{0}\"")]
    UnknownSourceFormat(String),

    /// The target format hint could not be resolved.
    #[error("Unknown target format \"{0}\"")]
    UnknownTargetFormat(String),

    /// The source text could not be decoded.
    #[error(transparent)]
    Decode(#[from] DecodeError),

    /// The conversion would drop information and was not forced.
    #[error("Conversion from {source_format} to {target_format} would lose data in: {}", .fields.join(", "))]
    Lossy {
        /// Format of the source record
        source_format: EuringFormat,
        /// Requested target format
        target_format: EuringFormat,
        /// Keys of the source fields that cannot be represented
        fields: Vec<String>,
    },

    /// A synthesized target value failed validation.
    #[error("Converted value \"{value}\" for \"{key}\" is invalid: {message}")]
    InvalidField {
        /// Key of the target field
        key: String,
        /// Value that was synthesized
        value: String,
        /// Machine-readable reason
        kind: IssueKind,
        /// Human-readable reason
        message: String,
    },
}

impl From<BuildError> for ConversionError {
    fn from(error: BuildError) -> Self {
        match error {
            BuildError::InvalidValue {
                key,
                value,
                kind,
                message,
            } => ConversionError::InvalidField {
                key,
                value,
                kind,
                message,
            },
            other => ConversionError::InvalidField {
                key: other.key().to_string(),
                value: String::new(),
                kind: other.kind(),
                message: other.to_string(),
            },
        }
    }
}

/// Error while loading reference data.
#[derive(Error, Debug)]
pub enum LookupError {
    /// The name does not identify a code table.
    #[error("Unknown code table \"{0}\"")]
    UnknownTable(String),

    /// A table file could not be read.
    #[error("IO error reading {table}: {source}")]
    Io {
        /// Table being loaded
        table: String,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// A table file is not a JSON object of strings.
    #[error("Invalid JSON in {table}: {source}")]
    Json {
        /// Table being loaded
        table: String,
        /// Underlying error
        #[source]
        source: serde_json::Error,
    },
}

/// Error type covering every EURING library operation.
#[derive(Error, Debug)]
pub enum EuringError {
    /// Format resolution failure
    #[error(transparent)]
    Format(#[from] FormatError),

    /// Decoding failure
    #[error(transparent)]
    Decode(#[from] DecodeError),

    /// Build failure
    #[error(transparent)]
    Build(#[from] BuildError),

    /// Conversion failure
    #[error(transparent)]
    Conversion(#[from] ConversionError),

    /// Reference data failure
    #[error(transparent)]
    Lookup(#[from] LookupError),

    /// IO error from the underlying source.
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Convenience type alias for [`std::result::Result`] with [`EuringError`].
pub type Result<T> = std::result::Result<T, EuringError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_length_mismatch_message_names_expected_and_actual() {
        let err = DecodeError::LengthMismatch {
            format: EuringFormat::Euring2000,
            expected: 94,
            actual: 90,
        };
        let message = err.to_string();
        assert!(message.contains("94"), "got: {message}");
        assert!(message.contains("90"), "got: {message}");
        assert!(message.contains("EURING2000"), "got: {message}");
    }

    #[test]
    fn test_build_error_key_and_kind() {
        let err = BuildError::InvalidValue {
            key: "date".to_string(),
            value: "32132024".to_string(),
            kind: IssueKind::Type,
            message: "not a date".to_string(),
        };
        assert_eq!(err.key(), "date");
        assert_eq!(err.kind(), IssueKind::Type);

        let missing = BuildError::MissingField {
            key: "ringing_scheme".to_string(),
        };
        assert_eq!(missing.kind(), IssueKind::Missing);
    }

    #[test]
    fn test_build_error_into_conversion_error_keeps_key() {
        let err: ConversionError = BuildError::RecordRule {
            key: "latitude".to_string(),
            message: "needs longitude".to_string(),
        }
        .into();
        match err {
            ConversionError::InvalidField { key, kind, .. } => {
                assert_eq!(key, "latitude");
                assert_eq!(kind, IssueKind::RecordRule);
            },
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_lossy_message_lists_fields() {
        let err = ConversionError::Lossy {
            source_format: EuringFormat::Euring2020,
            target_format: EuringFormat::Euring2000Plus,
            fields: vec!["latitude".to_string(), "longitude".to_string()],
        };
        assert!(err.to_string().contains("latitude, longitude"));
    }
}
