//! Common fixtures shared across the integration test suite.

#![allow(dead_code)]

use euring::{build, EuringFormat};

/// A valid EURING2000 record.
pub const EURING2000_RECORD: &str =
    "DERA0CD...5206514ZZ1877018770N0ZUFF02U-----120719760----SV55+584200+01348000101030100202301739";

/// Fifteen dots: combined co-ordinates replaced by latitude/longitude.
pub const DOTTED_COORDINATES: &str = "...............";

/// Values of every required field, valid in all three formats.
pub fn base_values() -> Vec<(&'static str, &'static str)> {
    vec![
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
        ("distance", "00000"),
        ("direction", "000"),
        ("elapsed_time", "00000"),
    ]
}

/// Base values with some entries replaced or added.
pub fn values_with(extra: &[(&'static str, &'static str)]) -> Vec<(&'static str, &'static str)> {
    let mut values = base_values();
    for &(key, value) in extra {
        match values.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => values.push((key, value)),
        }
    }
    values
}

/// Build a record leniently from base values plus overrides.
pub fn record_with(format: EuringFormat, extra: &[(&'static str, &'static str)]) -> String {
    build(format, values_with(extra), false).expect("fixture values must build")
}

/// EURING2020 record with split latitude/longitude, an empty combined
/// co-ordinates field and an alphabetic accuracy code.
pub fn euring2020_split_record() -> String {
    record_with(
        EuringFormat::Euring2020,
        &[
            ("geographical_coordinates", ""),
            ("accuracy_of_coordinates", "A"),
            ("latitude", "52.3760"),
            ("longitude", "4.9000"),
        ],
    )
}
