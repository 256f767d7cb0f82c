//! Field value types and their validators.
//!
//! Every EURING field declares a [`FieldType`]. Validation turns the raw text of
//! a field into a typed [`FieldValue`] or a [`FieldIssue`] explaining why the
//! text is not acceptable. Validators are pure and total: any input string gives
//! a deterministic outcome and nothing panics.
//!
//! The EURING manuals use runs of hyphens as the "unknown" marker for numbers,
//! dates and times; those validate to [`FieldValue::Unknown`].

use crate::code_tables::{code_tables, CodeTableName, CodeTables};
use crate::coordinates;
use crate::export;
use chrono::NaiveDate;
use lazy_static::lazy_static;
use regex::Regex;
use serde::Serialize;
use std::fmt;

lazy_static! {
    static ref DECIMAL_PATTERN: Regex = Regex::new(r"^[0-9]+(\.[0-9]+)?$").unwrap();
    static ref SIGNED_PATTERN: Regex = Regex::new(r"^-?[0-9]+(\.[0-9]+)?$").unwrap();
    static ref TIME_PATTERN: Regex = Regex::new(r"^([0-9]{2})([0-9]{2}|--)$").unwrap();
}

/// Primitive value kind of a EURING field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldType {
    /// Letters only
    Alphabetic,
    /// Letters and digits
    Alphanumeric,
    /// Free text (anything but the `|` separator)
    Text,
    /// Digits only; leading zeros are significant
    Numeric,
    /// Unsigned decimal number, e.g. `123.5`
    Decimal,
    /// Decimal number with an optional leading minus sign
    NumericSigned,
    /// `ddmmyyyy` date
    Date,
    /// `hhmm` time of day
    Time,
    /// Combined `±DDMMSS±DDDMMSS` geographical co-ordinates
    Coordinates,
    /// Ring identification number, padded with dots
    Identifier,
    /// Code bound to a reference table
    CodeTable(CodeTableName),
}

/// Typed result of a successful validation.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum FieldValue {
    /// Textual value (for ring numbers, without padding dots)
    Text(String),
    /// Unsigned integer
    Integer(u64),
    /// Decimal number
    Decimal(f64),
    /// Calendar date
    Date(NaiveDate),
    /// Time of day; the minute is absent for `hh--`
    Time {
        /// Hour (0-23)
        hour: u8,
        /// Minute (0-59), if recorded
        minute: Option<u8>,
    },
    /// Decoded geographical co-ordinates in decimal degrees
    Coordinates {
        /// Latitude, positive north
        latitude: f64,
        /// Longitude, positive east
        longitude: f64,
    },
    /// Code found in its reference table
    Code(String),
    /// Well-formed code absent from an open reference table
    UnknownCode(String),
    /// Placeholder meaning the value was not recorded
    Unknown,
}

/// Machine-readable reason for a field validation failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueKind {
    /// Required value is empty
    Missing,
    /// Value has the wrong length
    Length,
    /// Value contains characters its type does not allow
    Type,
    /// Signed value is a negative zero
    NegativeZero,
    /// Value is well formed but out of range
    Range,
    /// Code is absent from a closed reference table
    UnknownCode,
    /// Value conflicts with other fields of the record
    RecordRule,
}

impl IssueKind {
    /// Stable snake_case name of the reason.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            IssueKind::Missing => "missing",
            IssueKind::Length => "length",
            IssueKind::Type => "type",
            IssueKind::NegativeZero => "negative_zero",
            IssueKind::Range => "range",
            IssueKind::UnknownCode => "unknown_code",
            IssueKind::RecordRule => "record_rule",
        }
    }
}

impl fmt::Display for IssueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why a field value was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldIssue {
    /// Machine-readable reason
    pub kind: IssueKind,
    /// Human-readable explanation
    pub message: String,
}

impl FieldIssue {
    /// Create an issue of the given kind.
    pub fn new(kind: IssueKind, message: impl Into<String>) -> Self {
        FieldIssue {
            kind,
            message: message.into(),
        }
    }

    fn invalid_type(raw: &str, field_type: FieldType) -> Self {
        FieldIssue::new(
            IssueKind::Type,
            format!("Value \"{raw}\" is not valid for type {}.", field_type.name()),
        )
    }
}

impl fmt::Display for FieldIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.message, self.kind)
    }
}

/// Additional numeric limits on top of a field's type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Constraint {
    /// Absolute value and number of decimals are bounded.
    Bounds {
        /// Largest allowed absolute value
        max_abs: u16,
        /// Largest allowed number of fractional digits
        max_decimals: u8,
    },
}

impl Constraint {
    /// Check an already type-validated value against the constraint.
    ///
    /// # Errors
    ///
    /// Returns a [`IssueKind::Range`] issue when the value is out of bounds.
    pub fn check(&self, raw: &str, value: &FieldValue) -> Result<(), FieldIssue> {
        match self {
            Constraint::Bounds {
                max_abs,
                max_decimals,
            } => {
                #[allow(clippy::cast_precision_loss)]
                let magnitude = match value {
                    FieldValue::Integer(n) => *n as f64,
                    FieldValue::Decimal(d) => d.abs(),
                    _ => return Ok(()),
                };
                if magnitude > f64::from(*max_abs) {
                    return Err(FieldIssue::new(
                        IssueKind::Range,
                        format!("Value \"{raw}\" must be between -{max_abs} and {max_abs}."),
                    ));
                }
                let decimals = raw.split_once('.').map_or(0, |(_, frac)| frac.len());
                if decimals > usize::from(*max_decimals) {
                    return Err(FieldIssue::new(
                        IssueKind::Range,
                        format!("Value \"{raw}\" must have at most {max_decimals} decimal places."),
                    ));
                }
                Ok(())
            },
        }
    }
}

/// Return true when a non-empty string consists only of hyphens.
#[must_use]
pub fn is_all_hyphens(value: &str) -> bool {
    !value.is_empty() && value.chars().all(|c| c == '-')
}

impl FieldType {
    /// Name of the type as used in messages.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            FieldType::Alphabetic => "Alphabetic",
            FieldType::Alphanumeric => "Alphanumeric",
            FieldType::Text => "Text",
            FieldType::Numeric => "Numeric",
            FieldType::Decimal => "Decimal",
            FieldType::NumericSigned => "Numeric signed",
            FieldType::Date => "Date",
            FieldType::Time => "Time",
            FieldType::Coordinates => "Co-ordinates",
            FieldType::Identifier => "Identifier",
            FieldType::CodeTable(_) => "Code",
        }
    }

    /// Validate raw text against this type using the process-wide code tables.
    ///
    /// # Errors
    ///
    /// Returns a [`FieldIssue`] describing why the text is not a valid value.
    pub fn validate(&self, raw: &str) -> Result<FieldValue, FieldIssue> {
        self.validate_with(raw, code_tables())
    }

    /// Validate raw text against this type using the given code tables.
    ///
    /// # Errors
    ///
    /// Returns a [`FieldIssue`] describing why the text is not a valid value.
    pub fn validate_with(&self, raw: &str, tables: &CodeTables) -> Result<FieldValue, FieldIssue> {
        match self {
            FieldType::Alphabetic => {
                if !raw.is_empty() && raw.chars().all(|c| c.is_ascii_alphabetic()) {
                    Ok(FieldValue::Text(raw.to_string()))
                } else {
                    Err(FieldIssue::invalid_type(raw, *self))
                }
            },
            FieldType::Alphanumeric => {
                if !raw.is_empty() && raw.chars().all(|c| c.is_ascii_alphanumeric()) {
                    Ok(FieldValue::Text(raw.to_string()))
                } else {
                    Err(FieldIssue::invalid_type(raw, *self))
                }
            },
            FieldType::Text => {
                if raw.is_empty() || raw.contains('|') {
                    Err(FieldIssue::invalid_type(raw, *self))
                } else {
                    Ok(FieldValue::Text(raw.to_string()))
                }
            },
            FieldType::Numeric => validate_numeric(raw),
            FieldType::Decimal => {
                if DECIMAL_PATTERN.is_match(raw) {
                    parse_decimal(raw)
                } else {
                    Err(FieldIssue::invalid_type(raw, *self))
                }
            },
            FieldType::NumericSigned => validate_signed(raw),
            FieldType::Date => validate_date(raw),
            FieldType::Time => validate_time(raw),
            FieldType::Coordinates => match coordinates::parse_coordinates(raw) {
                Ok(None) => Ok(FieldValue::Unknown),
                Ok(Some((latitude, longitude))) => Ok(FieldValue::Coordinates {
                    latitude,
                    longitude,
                }),
                Err(message) => Err(FieldIssue::new(IssueKind::Type, message)),
            },
            FieldType::Identifier => validate_identifier(raw),
            FieldType::CodeTable(table) => validate_code(raw, *table, tables),
        }
    }

    /// Placeholder written into a fixed-width field of this type whose value
    /// is not recorded.
    #[must_use]
    pub fn placeholder(&self, width: usize) -> String {
        let fill = match self {
            FieldType::Numeric | FieldType::Decimal | FieldType::NumericSigned => '0',
            FieldType::Date | FieldType::Time => '-',
            FieldType::Coordinates => '.',
            _ => ' ',
        };
        std::iter::repeat(fill).take(width).collect()
    }

    /// Pad a value shorter than `width` the way EURING exports pad it.
    ///
    /// Values of other types, and values that are not shorter, are returned
    /// unchanged so the validator can report them.
    #[must_use]
    pub fn pad(&self, value: &str, width: usize) -> String {
        if value.is_empty() || value.chars().count() >= width {
            return value.to_string();
        }
        match self {
            FieldType::Numeric | FieldType::CodeTable(CodeTableName::Species)
                if value.chars().all(|c| c.is_ascii_digit()) =>
            {
                format!("{value:0>width$}")
            },
            FieldType::Identifier => export::pad_identification(value, width),
            FieldType::CodeTable(CodeTableName::RingingScheme) => format!("{value:>width$}"),
            _ => value.to_string(),
        }
    }
}

fn validate_numeric(raw: &str) -> Result<FieldValue, FieldIssue> {
    if is_all_hyphens(raw) {
        return Ok(FieldValue::Unknown);
    }
    if raw.is_empty() || !raw.chars().all(|c| c.is_ascii_digit()) {
        return Err(FieldIssue::invalid_type(raw, FieldType::Numeric));
    }
    raw.parse::<u64>().map(FieldValue::Integer).map_err(|_| {
        FieldIssue::new(
            IssueKind::Range,
            format!("Value \"{raw}\" is too large for a number."),
        )
    })
}

fn validate_signed(raw: &str) -> Result<FieldValue, FieldIssue> {
    if !SIGNED_PATTERN.is_match(raw) {
        return Err(FieldIssue::invalid_type(raw, FieldType::NumericSigned));
    }
    if let Some(magnitude) = raw.strip_prefix('-') {
        if magnitude.chars().all(|c| c == '0' || c == '.') {
            return Err(FieldIssue::new(
                IssueKind::NegativeZero,
                format!("Value \"{raw}\" is a negative zero, which is not permitted."),
            ));
        }
    }
    parse_decimal(raw)
}

fn parse_decimal(raw: &str) -> Result<FieldValue, FieldIssue> {
    raw.parse::<f64>()
        .map(FieldValue::Decimal)
        .map_err(|_| FieldIssue::invalid_type(raw, FieldType::Decimal))
}

fn validate_date(raw: &str) -> Result<FieldValue, FieldIssue> {
    if is_all_hyphens(raw) {
        return Ok(FieldValue::Unknown);
    }
    if raw.len() != 8 || !raw.chars().all(|c| c.is_ascii_digit()) {
        return Err(FieldIssue::invalid_type(raw, FieldType::Date));
    }
    let day = raw[0..2].parse::<u32>().unwrap_or(0);
    let month = raw[2..4].parse::<u32>().unwrap_or(0);
    let year = raw[4..8].parse::<i32>().unwrap_or(0);
    NaiveDate::from_ymd_opt(year, month, day)
        .map(FieldValue::Date)
        .ok_or_else(|| {
            FieldIssue::new(
                IssueKind::Range,
                format!("Value \"{raw}\" is not a valid ddmmyyyy date."),
            )
        })
}

fn validate_time(raw: &str) -> Result<FieldValue, FieldIssue> {
    if raw == "----" {
        return Ok(FieldValue::Unknown);
    }
    let Some(caps) = TIME_PATTERN.captures(raw) else {
        return Err(FieldIssue::invalid_type(raw, FieldType::Time));
    };
    let hour = caps[1].parse::<u8>().unwrap_or(u8::MAX);
    let minute = match &caps[2] {
        "--" => None,
        digits => Some(digits.parse::<u8>().unwrap_or(u8::MAX)),
    };
    if hour > 23 || minute.is_some_and(|m| m > 59) {
        return Err(FieldIssue::new(
            IssueKind::Range,
            format!("Value \"{raw}\" is not a valid hhmm time."),
        ));
    }
    Ok(FieldValue::Time { hour, minute })
}

fn validate_identifier(raw: &str) -> Result<FieldValue, FieldIssue> {
    if raw.is_empty()
        || !raw
            .chars()
            .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || c == '.')
    {
        return Err(FieldIssue::invalid_type(raw, FieldType::Identifier));
    }
    if raw.contains('.') {
        // Padding dots sit immediately left of the rightmost run of digits,
        // or lead the value when it has no digits at all.
        let digits_start = raw
            .rfind(|c: char| c.is_ascii_digit())
            .map(|last| {
                raw[..=last]
                    .rfind(|c: char| !c.is_ascii_digit())
                    .map_or(0, |i| i + 1)
            });
        let misplaced = match digits_start {
            Some(start) => raw[..start].trim_end_matches('.').contains('.') || raw[start..].contains('.'),
            None => raw.trim_start_matches('.').contains('.'),
        };
        if misplaced {
            return Err(FieldIssue::new(
                IssueKind::Type,
                format!(
                    "Value \"{raw}\": identification number padding dots must be immediately before the rightmost digits."
                ),
            ));
        }
    }
    Ok(FieldValue::Text(raw.replace('.', "")))
}

fn validate_code(raw: &str, table: CodeTableName, tables: &CodeTables) -> Result<FieldValue, FieldIssue> {
    if !table.is_well_formed(raw) {
        return Err(FieldIssue::new(
            IssueKind::Type,
            format!("Value \"{raw}\" is not a valid {} code format.", table.as_str()),
        ));
    }
    if tables.contains(table, raw) {
        Ok(FieldValue::Code(raw.to_string()))
    } else if table.is_closed() {
        Err(FieldIssue::new(
            IssueKind::UnknownCode,
            format!("Value \"{raw}\" is not a valid {} code.", table.as_str()),
        ))
    } else {
        Ok(FieldValue::UnknownCode(raw.to_string()))
    }
}
