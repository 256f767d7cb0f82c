//! EURING exchange-code versions and format detection.

use crate::error::{DecodeError, FormatError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Field separator of the delimited formats.
pub const SEPARATOR: char = '|';

/// Total width of a EURING2000 record.
pub const EURING2000_RECORD_LENGTH: usize = 94;

/// Number of fields in a EURING2000+ record.
pub const EURING2000_PLUS_FIELD_COUNT: usize = 60;

/// Number of fields in a EURING2020 record.
pub const EURING2020_FIELD_COUNT: usize = 64;

/// Zero-based position of "Accuracy of Co-ordinates" in every layout.
const ACCURACY_OF_COORDINATES_INDEX: usize = 25;

/// A EURING exchange-code version.
///
/// Versions are ordered by age, so `Euring2000 < Euring2000Plus < Euring2020`,
/// and each later version carries every field of the earlier ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EuringFormat {
    /// Fixed-width, 94 characters, 33 fields
    Euring2000,
    /// Pipe-delimited, 60 fields
    #[serde(rename = "euring2000plus")]
    Euring2000Plus,
    /// Pipe-delimited, 64 fields, with decimal latitude/longitude
    Euring2020,
}

impl EuringFormat {
    /// Every format, oldest first.
    pub const ALL: [EuringFormat; 3] = [
        EuringFormat::Euring2000,
        EuringFormat::Euring2000Plus,
        EuringFormat::Euring2020,
    ];

    /// Formal name as printed in the EURING manuals.
    #[must_use]
    pub const fn display_name(&self) -> &'static str {
        match self {
            EuringFormat::Euring2000 => "EURING2000",
            EuringFormat::Euring2000Plus => "EURING2000+",
            EuringFormat::Euring2020 => "EURING2020",
        }
    }

    /// Canonical lowercase identifier (`euring2000`, `euring2000plus`, `euring2020`).
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            EuringFormat::Euring2000 => "euring2000",
            EuringFormat::Euring2000Plus => "euring2000plus",
            EuringFormat::Euring2020 => "euring2020",
        }
    }

    /// Whether records are fixed-width rather than delimited.
    #[must_use]
    pub const fn is_fixed_width(&self) -> bool {
        matches!(self, EuringFormat::Euring2000)
    }

    /// Field separator, for delimited formats.
    #[must_use]
    pub const fn separator(&self) -> Option<char> {
        if self.is_fixed_width() {
            None
        } else {
            Some(SEPARATOR)
        }
    }

    /// Number of fields in a record of this format.
    #[must_use]
    pub const fn field_count(&self) -> usize {
        match self {
            EuringFormat::Euring2000 => 33,
            EuringFormat::Euring2000Plus => EURING2000_PLUS_FIELD_COUNT,
            EuringFormat::Euring2020 => EURING2020_FIELD_COUNT,
        }
    }
}

impl fmt::Display for EuringFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

impl FromStr for EuringFormat {
    type Err = FormatError;

    /// Resolve a format name case-insensitively, accepting the short aliases
    /// (`2000`, `2000+`, `2000plus`, `2000p`, `2020`, ...).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim().to_ascii_lowercase();
        let name = name.strip_prefix("euring").unwrap_or(&name);
        match name {
            "2000" => Ok(EuringFormat::Euring2000),
            "2000+" | "2000plus" | "2000p" => Ok(EuringFormat::Euring2000Plus),
            "2020" => Ok(EuringFormat::Euring2020),
            _ => Err(FormatError::Unknown(s.to_string())),
        }
    }
}

/// Detect the format of a raw record.
///
/// Records without a separator are EURING2000. Delimited records are decided
/// by field count: 60 fields are EURING2000+ and 64 fields EURING2020. Other
/// counts resolve to the nearest layout so that decoding can report the
/// mismatch; an alphabetic accuracy-of-coordinates code (only EURING2020
/// allows one) then points to EURING2020.
///
/// # Errors
///
/// Returns [`DecodeError::EmptyRecord`] for an empty string.
pub fn detect_format(raw: &str) -> Result<EuringFormat, DecodeError> {
    if raw.is_empty() {
        return Err(DecodeError::EmptyRecord);
    }
    if !raw.contains(SEPARATOR) {
        return Ok(EuringFormat::Euring2000);
    }
    let values: Vec<&str> = raw.split(SEPARATOR).collect();
    let format = match values.len() {
        EURING2000_PLUS_FIELD_COUNT => EuringFormat::Euring2000Plus,
        EURING2020_FIELD_COUNT => EuringFormat::Euring2020,
        count => {
            let accuracy_is_alphabetic = values
                .get(ACCURACY_OF_COORDINATES_INDEX)
                .is_some_and(|v| !v.is_empty() && v.chars().all(|c| c.is_ascii_alphabetic()));
            if count > EURING2000_PLUS_FIELD_COUNT || accuracy_is_alphabetic {
                EuringFormat::Euring2020
            } else {
                EuringFormat::Euring2000Plus
            }
        },
    };
    log::trace!(
        "detected {format} from {} delimited fields",
        values.len()
    );
    Ok(format)
}
