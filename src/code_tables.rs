//! EURING reference code tables.
//!
//! Each coded field is bound to a table mapping a code to its description.
//! The tables ship with the crate as JSON files under `data/` and are parsed
//! once, on first use, into an immutable [`CodeTables`] shared by the whole
//! process. A refreshed data directory can be loaded with
//! [`CodeTables::from_dir`].
//!
//! Some tables are *open*: the EURING manual allows codes that the shipped
//! data may not list yet (new species, schemes and places). A well-formed code
//! that is missing from an open table is still valid; missing from a closed
//! table it is an error.

use crate::error::LookupError;
use indexmap::IndexMap;
use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::Path;
use std::str::FromStr;

lazy_static! {
    static ref SCHEME_PATTERN: Regex = Regex::new(r"^ {0,2}[A-Z]+$").unwrap();
    static ref PLACE_PATTERN: Regex = Regex::new(r"^[A-Z]{2}([A-Z]{2}|[0-9]{2}|--)$").unwrap();
    static ref CODE_TABLES: CodeTables = CodeTables::embedded().expect("embedded code tables are valid");
}

/// Declares the table enum together with its name, data file, embedded JSON
/// and open/closed status.
macro_rules! code_table_names {
    ($($variant:ident => $name:literal, $open:literal;)+) => {
        /// Name of a EURING reference code table.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
        #[serde(rename_all = "snake_case")]
        pub enum CodeTableName {
            $(
                #[allow(missing_docs)]
                $variant,
            )+
        }

        impl CodeTableName {
            /// Every table, in declaration order.
            pub const ALL: &'static [CodeTableName] = &[$(CodeTableName::$variant),+];

            /// Canonical snake_case name, also the data file stem.
            #[must_use]
            pub const fn as_str(&self) -> &'static str {
                match self {
                    $(CodeTableName::$variant => $name,)+
                }
            }

            /// Whether codes absent from the table are still valid.
            #[must_use]
            pub const fn is_open(&self) -> bool {
                match self {
                    $(CodeTableName::$variant => $open,)+
                }
            }

            fn embedded_json(&self) -> &'static str {
                match self {
                    $(CodeTableName::$variant => include_str!(concat!("../data/", $name, ".json")),)+
                }
            }
        }
    };
}

code_table_names! {
    RingingScheme => "ringing_scheme", true;
    PrimaryIdentificationMethod => "primary_identification_method", false;
    VerificationOfTheMetalRing => "verification_of_the_metal_ring", false;
    MetalRingInformation => "metal_ring_information", false;
    OtherMarksInformation => "other_marks_information", false;
    Species => "species", true;
    Manipulated => "manipulated", false;
    MovedBeforeTheEncounter => "moved_before_the_encounter", false;
    CatchingMethod => "catching_method", false;
    CatchingLures => "catching_lures", false;
    Sex => "sex", false;
    Age => "age", false;
    Status => "status", false;
    AccuracyOfPullusAge => "accuracy_of_pullus_age", false;
    AccuracyOfDate => "accuracy_of_date", false;
    PlaceCode => "place_code", true;
    AccuracyOfCoordinates => "accuracy_of_coordinates", false;
    Condition => "condition", false;
    Circumstances => "circumstances", true;
    CircumstancesPresumed => "circumstances_presumed", false;
    EuringCodeIdentifier => "euring_code_identifier", false;
    StateOfWingPoint => "state_of_wing_point", false;
    Moult => "moult", false;
    PlumageCode => "plumage_code", false;
    BillMethod => "bill_method", false;
    TarsusMethod => "tarsus_method", false;
    FatScoreMethod => "fat_score_method", false;
    PectoralMuscleScore => "pectoral_muscle_score", false;
    BroodPatch => "brood_patch", false;
    OldGreaterCoverts => "old_greater_coverts", false;
    CarpalCovert => "carpal_covert", false;
    SexingMethod => "sexing_method", false;
}

impl CodeTableName {
    /// Whether codes absent from the table are invalid.
    #[must_use]
    pub const fn is_closed(&self) -> bool {
        !self.is_open()
    }

    /// Check the shape of a code, independently of the table contents.
    #[must_use]
    pub fn is_well_formed(&self, code: &str) -> bool {
        match self {
            CodeTableName::RingingScheme => code.len() == 3 && SCHEME_PATTERN.is_match(code),
            CodeTableName::Species => code.len() == 5 && code.bytes().all(|b| b.is_ascii_digit()),
            CodeTableName::PlaceCode => PLACE_PATTERN.is_match(code),
            CodeTableName::Circumstances => code.len() == 2 && code.bytes().all(|b| b.is_ascii_digit()),
            CodeTableName::OtherMarksInformation => {
                code.len() == 2
                    && code
                        .bytes()
                        .all(|b| b.is_ascii_uppercase() || b.is_ascii_digit() || b == b'-')
            },
            _ => {
                (1..=2).contains(&code.len())
                    && code
                        .bytes()
                        .all(|b| b.is_ascii_alphanumeric() || b == b'-')
            },
        }
    }

    /// Normalize a code the way the table stores it.
    fn normalize<'a>(&self, code: &'a str) -> &'a str {
        match self {
            CodeTableName::RingingScheme => code.trim_start(),
            _ => code,
        }
    }
}

impl fmt::Display for CodeTableName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CodeTableName {
    type Err = LookupError;

    /// Resolve a table name, accepting the short aliases `place`, `scheme`
    /// and `species`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim().to_ascii_lowercase().replace('-', "_");
        match name.as_str() {
            "place" | "places" => return Ok(CodeTableName::PlaceCode),
            "scheme" | "schemes" => return Ok(CodeTableName::RingingScheme),
            "species_code" => return Ok(CodeTableName::Species),
            _ => {},
        }
        CodeTableName::ALL
            .iter()
            .find(|table| table.as_str() == name)
            .copied()
            .ok_or_else(|| LookupError::UnknownTable(s.to_string()))
    }
}

/// One row of a code table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CodeEntry {
    /// The code as written in records
    pub code: String,
    /// Human-readable meaning
    pub description: String,
}

impl fmt::Display for CodeEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code, self.description)
    }
}

#[derive(Deserialize)]
struct OtherMarksData {
    special_cases: IndexMap<String, String>,
    first_character: IndexMap<String, String>,
    second_character: IndexMap<String, String>,
}

const OTHER_MARKS_UNKNOWN_CHANGE: &str =
    "unknown if it was already present, removed, added or changed at this encounter";

/// Immutable set of loaded code tables.
#[derive(Debug, Clone)]
pub struct CodeTables {
    tables: IndexMap<CodeTableName, IndexMap<String, String>>,
}

impl CodeTables {
    /// Parse the tables shipped with the crate.
    ///
    /// # Errors
    ///
    /// Returns [`LookupError::Json`] if an embedded file is malformed.
    pub fn embedded() -> Result<Self, LookupError> {
        let mut tables = IndexMap::with_capacity(CodeTableName::ALL.len());
        for table in CodeTableName::ALL {
            tables.insert(*table, parse_table(*table, table.embedded_json())?);
        }
        log::debug!("loaded {} embedded code tables", tables.len());
        Ok(CodeTables { tables })
    }

    /// Load tables from a directory holding one `<table>.json` per table.
    ///
    /// Tables without a file in the directory keep their embedded data.
    ///
    /// # Errors
    ///
    /// Returns [`LookupError::Io`] when a present file cannot be read and
    /// [`LookupError::Json`] when a file is not a valid table.
    pub fn from_dir(dir: impl AsRef<Path>) -> Result<Self, LookupError> {
        let dir = dir.as_ref();
        let mut tables = IndexMap::with_capacity(CodeTableName::ALL.len());
        for table in CodeTableName::ALL {
            let path = dir.join(format!("{}.json", table.as_str()));
            let entries = if path.is_file() {
                let text = fs::read_to_string(&path).map_err(|source| LookupError::Io {
                    table: table.as_str().to_string(),
                    source,
                })?;
                log::debug!("loading code table {table} from {}", path.display());
                parse_table(*table, &text)?
            } else {
                log::trace!("no {table} file in {}, using embedded data", dir.display());
                parse_table(*table, table.embedded_json())?
            };
            tables.insert(*table, entries);
        }
        Ok(CodeTables { tables })
    }

    /// Description of a code, or `None` when the table does not list it.
    #[must_use]
    pub fn describe(&self, table: CodeTableName, code: &str) -> Option<&str> {
        self.tables
            .get(&table)?
            .get(table.normalize(code))
            .map(String::as_str)
    }

    /// Whether the table lists the code.
    #[must_use]
    pub fn contains(&self, table: CodeTableName, code: &str) -> bool {
        self.describe(table, code).is_some()
    }

    /// Compact code/description pair for a listed code.
    #[must_use]
    pub fn entry(&self, table: CodeTableName, code: &str) -> Option<CodeEntry> {
        let code = table.normalize(code);
        self.describe(table, code).map(|description| CodeEntry {
            code: code.to_string(),
            description: description.to_string(),
        })
    }

    /// Every entry of a table, in file order.
    #[must_use]
    pub fn list(&self, table: CodeTableName) -> Vec<CodeEntry> {
        self.tables
            .get(&table)
            .map(|entries| {
                entries
                    .iter()
                    .map(|(code, description)| CodeEntry {
                        code: code.clone(),
                        description: description.clone(),
                    })
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Number of entries in a table.
    #[must_use]
    pub fn len(&self, table: CodeTableName) -> usize {
        self.tables.get(&table).map_or(0, IndexMap::len)
    }

    /// Whether no table holds any entry.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tables.values().all(IndexMap::is_empty)
    }
}

fn parse_table(table: CodeTableName, text: &str) -> Result<IndexMap<String, String>, LookupError> {
    let json_error = |source| LookupError::Json {
        table: table.as_str().to_string(),
        source,
    };
    if table != CodeTableName::OtherMarksInformation {
        return serde_json::from_str(text).map_err(json_error);
    }

    // Other marks codes combine two positions; expand every combination so
    // lookups stay a single map access.
    let data: OtherMarksData = serde_json::from_str(text).map_err(json_error)?;
    let mut entries = data.special_cases;
    for (first, first_description) in &data.first_character {
        let second_codes = data
            .second_character
            .iter()
            .map(|(code, description)| (code.as_str(), description.as_str()))
            .chain(std::iter::once(("-", OTHER_MARKS_UNKNOWN_CHANGE)));
        for (second, second_description) in second_codes {
            let code = format!("{first}{second}");
            if entries.contains_key(&code) {
                continue;
            }
            let description = format!(
                "{}, {}.",
                first_description.trim_matches('.'),
                second_description.trim_matches('.')
            );
            entries.insert(code, description);
        }
    }
    Ok(entries)
}

/// Process-wide code tables, parsed from the embedded data on first use.
#[must_use]
pub fn code_tables() -> &'static CodeTables {
    &CODE_TABLES
}

/// Describe a code in the named table using the process-wide tables.
///
/// An unknown table name or an unlisted code both give `None`.
#[must_use]
pub fn lookup(table_name: &str, code: &str) -> Option<&'static str> {
    let table = table_name.parse::<CodeTableName>().ok()?;
    code_tables().describe(table, code)
}

/// Full ordered contents of the named table.
///
/// # Errors
///
/// Returns [`LookupError::UnknownTable`] when the name is not a table.
pub fn list_table(table_name: &str) -> Result<Vec<CodeEntry>, LookupError> {
    let table = table_name.parse::<CodeTableName>()?;
    Ok(code_tables().list(table))
}
