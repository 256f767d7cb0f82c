//! Master table of EURING fields.
//!
//! Fields are listed in exchange-code order. The first 33 make up EURING2000,
//! the first 60 EURING2000+, and all 64 EURING2020. Each later version only
//! appends fields, so a schema is a prefix of this table.

use crate::code_tables::CodeTableName as T;
use crate::field_type::{Constraint, FieldType};
use crate::format::EuringFormat;
use serde::Serialize;

/// Allowed length of a field value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "length", rename_all = "snake_case")]
pub enum Length {
    /// Exactly this many characters
    Fixed(usize),
    /// At most this many characters
    Max(usize),
    /// Any length
    Unbounded,
}

impl Length {
    /// Fixed width, if any.
    #[must_use]
    pub const fn fixed(&self) -> Option<usize> {
        match self {
            Length::Fixed(width) => Some(*width),
            _ => None,
        }
    }
}

/// Static description of one field, independent of any schema.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FieldSpec {
    /// Official name as printed in the EURING manual
    pub name: &'static str,
    /// Stable snake_case key
    pub key: &'static str,
    /// Value type
    pub field_type: FieldType,
    /// Whether an empty value is invalid
    pub required: bool,
    /// Allowed length
    pub length: Length,
    /// Declared "not recorded" token, e.g. `--`
    pub placeholder: Option<&'static str>,
    /// Extra numeric limits
    pub constraint: Option<Constraint>,
    /// First version carrying the field
    pub since: EuringFormat,
}

impl FieldSpec {
    const fn new(name: &'static str, key: &'static str, field_type: FieldType, length: Length) -> Self {
        FieldSpec {
            name,
            key,
            field_type,
            required: true,
            length,
            placeholder: None,
            constraint: None,
            since: EuringFormat::Euring2000,
        }
    }

    const fn optional(self) -> Self {
        FieldSpec {
            required: false,
            ..self
        }
    }

    const fn unknown_as(self, placeholder: &'static str) -> Self {
        FieldSpec {
            placeholder: Some(placeholder),
            ..self.optional()
        }
    }

    const fn bounded(self, max_abs: u16, max_decimals: u8) -> Self {
        FieldSpec {
            constraint: Some(Constraint::Bounds {
                max_abs,
                max_decimals,
            }),
            ..self
        }
    }

    const fn since(self, format: EuringFormat) -> Self {
        FieldSpec {
            since: format,
            ..self.optional()
        }
    }
}

const fn code(name: &'static str, key: &'static str, table: T, width: usize) -> FieldSpec {
    FieldSpec::new(name, key, FieldType::CodeTable(table), Length::Fixed(width))
}

const fn fixed(name: &'static str, key: &'static str, field_type: FieldType, width: usize) -> FieldSpec {
    FieldSpec::new(name, key, field_type, Length::Fixed(width))
}

const fn plus(name: &'static str, key: &'static str, field_type: FieldType, length: Length) -> FieldSpec {
    FieldSpec::new(name, key, field_type, length).since(EuringFormat::Euring2000Plus)
}

const fn plus_code(name: &'static str, key: &'static str, table: T) -> FieldSpec {
    plus(name, key, FieldType::CodeTable(table), Length::Fixed(1))
}

const fn modern(name: &'static str, key: &'static str, field_type: FieldType, length: Length) -> FieldSpec {
    FieldSpec::new(name, key, field_type, length).since(EuringFormat::Euring2020)
}

/// Every EURING field, in exchange-code order.
pub const EURING_FIELDS: [FieldSpec; 64] = [
    // EURING2000
    code("Ringing Scheme", "ringing_scheme", T::RingingScheme, 3),
    code("Primary Identification Method", "primary_identification_method", T::PrimaryIdentificationMethod, 2),
    fixed("Identification Number (ring)", "identification_number", FieldType::Identifier, 10),
    code("Verification of the Metal Ring", "verification_of_the_metal_ring", T::VerificationOfTheMetalRing, 1),
    code("Metal Ring Information", "metal_ring_information", T::MetalRingInformation, 1),
    code("Other Marks Information", "other_marks_information", T::OtherMarksInformation, 2),
    code("Species Mentioned", "species_mentioned", T::Species, 5),
    code("Species Concluded", "species_concluded", T::Species, 5),
    code("Manipulated", "manipulated", T::Manipulated, 1),
    code("Moved Before the Encounter", "moved_before_the_encounter", T::MovedBeforeTheEncounter, 1),
    code("Catching Method", "catching_method", T::CatchingMethod, 1),
    code("Catching Lures", "catching_lures", T::CatchingLures, 1),
    code("Sex Mentioned", "sex_mentioned", T::Sex, 1),
    code("Sex Concluded", "sex_concluded", T::Sex, 1),
    code("Age Mentioned", "age_mentioned", T::Age, 1),
    code("Age Concluded", "age_concluded", T::Age, 1),
    code("Status", "status", T::Status, 1),
    fixed("Brood Size", "brood_size", FieldType::Numeric, 2).unknown_as("--"),
    fixed("Pullus Age", "pullus_age", FieldType::Numeric, 2).unknown_as("--"),
    code("Accuracy of Pullus Age", "accuracy_of_pullus_age", T::AccuracyOfPullusAge, 1).unknown_as("-"),
    fixed("Date", "date", FieldType::Date, 8),
    code("Accuracy of Date", "accuracy_of_date", T::AccuracyOfDate, 1),
    fixed("Time", "time", FieldType::Time, 4).unknown_as("----"),
    code("Place Code", "place_code", T::PlaceCode, 4),
    fixed("Geographical Co-ordinates", "geographical_coordinates", FieldType::Coordinates, 15),
    code("Accuracy of Co-ordinates", "accuracy_of_coordinates", T::AccuracyOfCoordinates, 1),
    code("Condition", "condition", T::Condition, 1),
    code("Circumstances", "circumstances", T::Circumstances, 2),
    code("Circumstances Presumed", "circumstances_presumed", T::CircumstancesPresumed, 1),
    code("EURING Code Identifier", "euring_code_identifier", T::EuringCodeIdentifier, 1),
    fixed("Derived Data - Distance", "distance", FieldType::Numeric, 5).unknown_as("-----"),
    fixed("Derived Data - Direction", "direction", FieldType::Numeric, 3)
        .unknown_as("---")
        .bounded(359, 0),
    fixed("Derived Data - Elapsed Time", "elapsed_time", FieldType::Numeric, 5).unknown_as("-----"),
    // EURING2000+
    plus("Wing Length", "wing_length", FieldType::Decimal, Length::Max(5)),
    plus("Third Primary", "third_primary", FieldType::Decimal, Length::Max(5)),
    plus_code("State of Wing Point", "state_of_wing_point", T::StateOfWingPoint),
    plus("Mass", "mass", FieldType::Decimal, Length::Max(6)),
    plus_code("Moult", "moult", T::Moult),
    plus_code("Plumage Code", "plumage_code", T::PlumageCode),
    plus("Hind Claw", "hind_claw", FieldType::Decimal, Length::Max(5)),
    plus("Bill Length", "bill_length", FieldType::Decimal, Length::Max(5)),
    plus_code("Bill Method", "bill_method", T::BillMethod),
    plus("Total Head Length", "total_head_length", FieldType::Decimal, Length::Max(5)),
    plus("Tarsus", "tarsus", FieldType::Decimal, Length::Max(5)),
    plus_code("Tarsus Method", "tarsus_method", T::TarsusMethod),
    plus("Tail Length", "tail_length", FieldType::Decimal, Length::Max(5)),
    plus("Tail Difference", "tail_difference", FieldType::NumericSigned, Length::Max(5)),
    plus("Fat Score", "fat_score", FieldType::Numeric, Length::Fixed(1)),
    plus_code("Fat Score Method", "fat_score_method", T::FatScoreMethod),
    plus_code("Pectoral Muscle Score", "pectoral_muscle", T::PectoralMuscleScore),
    plus_code("Brood Patch", "brood_patch", T::BroodPatch),
    plus("Primary Score", "primary_score", FieldType::Numeric, Length::Max(2)),
    plus("Primary Moult", "primary_moult", FieldType::Alphanumeric, Length::Fixed(10)),
    plus_code("Old Greater Coverts", "old_greater_coverts", T::OldGreaterCoverts),
    plus("Alula", "alula", FieldType::Numeric, Length::Fixed(1)),
    plus_code("Carpal Covert", "carpal_covert", T::CarpalCovert),
    plus_code("Sexing Method", "sexing_method", T::SexingMethod),
    plus("Place Name", "place_name", FieldType::Text, Length::Unbounded),
    plus("Remarks", "remarks", FieldType::Text, Length::Unbounded),
    plus("Reference", "reference", FieldType::Text, Length::Unbounded),
    // EURING2020
    modern("Latitude", "latitude", FieldType::NumericSigned, Length::Max(8)).bounded(90, 4),
    modern("Longitude", "longitude", FieldType::NumericSigned, Length::Max(9)).bounded(180, 4),
    modern("Current Place Code", "current_place_code", FieldType::CodeTable(T::PlaceCode), Length::Fixed(4)),
    modern("More Other Marks", "more_other_marks", FieldType::Text, Length::Unbounded),
];

/// Look up a field by key across all versions.
#[must_use]
pub fn field_spec(key: &str) -> Option<&'static FieldSpec> {
    EURING_FIELDS.iter().find(|spec| spec.key == key)
}

/// Keys of the fields a format does not carry but a later one does.
pub fn keys_beyond(format: EuringFormat) -> impl Iterator<Item = &'static str> {
    EURING_FIELDS
        .iter()
        .filter(move |spec| spec.since > format)
        .map(|spec| spec.key)
}
