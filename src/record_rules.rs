//! Record-level consistency rules.
//!
//! Field validators look at one value at a time. The rules here look at the
//! record as a whole: co-ordinate representations that exclude each other, and
//! values that only a later format can carry.

use crate::coordinates::UNKNOWN_COORDINATES;
use crate::fields::{field_spec, keys_beyond};
use crate::format::EuringFormat;
use indexmap::IndexMap;

/// A record rule broken by a set of values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleViolation {
    /// Key of the field the violation is reported on
    pub key: &'static str,
    /// Human-readable reason
    pub message: String,
}

impl RuleViolation {
    fn new(key: &'static str, message: impl Into<String>) -> Self {
        RuleViolation {
            key,
            message: message.into(),
        }
    }
}

fn present<'a>(values: &IndexMap<&str, &'a str>, key: &str) -> Option<&'a str> {
    values.get(key).copied().filter(|value| !value.is_empty())
}

fn accuracy_is_alphabetic(values: &IndexMap<&str, &str>) -> bool {
    present(values, "accuracy_of_coordinates")
        .is_some_and(|v| v.chars().all(|c| c.is_ascii_alphabetic()))
}

/// Whether only EURING2000 fields carry values.
#[must_use]
pub fn matches_euring2000(values: &IndexMap<&str, &str>) -> bool {
    keys_beyond(EuringFormat::Euring2000).all(|key| present(values, key).is_none())
}

/// Whether the values can only be expressed in EURING2020.
#[must_use]
pub fn requires_euring2020(values: &IndexMap<&str, &str>) -> bool {
    accuracy_is_alphabetic(values)
        || keys_beyond(EuringFormat::Euring2000Plus).any(|key| present(values, key).is_some())
}

/// Check the record-level rules of a format against raw values keyed by field
/// key.
#[must_use]
pub fn check(format: EuringFormat, values: &IndexMap<&str, &str>) -> Vec<RuleViolation> {
    let mut violations = Vec::new();
    if format == EuringFormat::Euring2020 {
        let coordinates = present(values, "geographical_coordinates");
        let latitude = present(values, "latitude");
        let longitude = present(values, "longitude");
        if latitude.is_some() || longitude.is_some() {
            if coordinates.is_some_and(|c| c != UNKNOWN_COORDINATES) {
                violations.push(RuleViolation::new(
                    "geographical_coordinates",
                    "When Latitude/Longitude are provided, Geographical Co-ordinates must be 15 dots.",
                ));
            }
        } else if coordinates.is_none() {
            violations.push(RuleViolation::new(
                "geographical_coordinates",
                "Geographical Co-ordinates or Latitude/Longitude are required.",
            ));
        }
        if latitude.is_some() && longitude.is_none() {
            violations.push(RuleViolation::new(
                "longitude",
                "Longitude is required when Latitude is provided.",
            ));
        }
        if longitude.is_some() && latitude.is_none() {
            violations.push(RuleViolation::new(
                "latitude",
                "Latitude is required when Longitude is provided.",
            ));
        }
        return violations;
    }

    if accuracy_is_alphabetic(values) {
        violations.push(RuleViolation::new(
            "accuracy_of_coordinates",
            "Alphabetic accuracy codes are only valid in EURING2020.",
        ));
    }
    for key in keys_beyond(format) {
        if present(values, key).is_some() {
            let since = field_spec(key).map_or(EuringFormat::Euring2020, |spec| spec.since);
            violations.push(RuleViolation::new(
                key,
                format!("{since} fields cannot be written in {format}."),
            ));
        }
    }
    violations
}

#[cfg(test)]
mod tests {
    use super::*;

    fn values<'a>(pairs: &[(&'a str, &'a str)]) -> IndexMap<&'a str, &'a str> {
        pairs.iter().copied().collect()
    }

    #[test]
    fn test_lat_long_require_dotted_coordinates() {
        let v = values(&[
            ("geographical_coordinates", "+420500-0044500"),
            ("latitude", "42.0833"),
            ("longitude", "-4.7500"),
        ]);
        let violations = check(EuringFormat::Euring2020, &v);
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].key, "geographical_coordinates");

        let v = values(&[
            ("geographical_coordinates", UNKNOWN_COORDINATES),
            ("latitude", "42.0833"),
            ("longitude", "-4.7500"),
        ]);
        assert!(check(EuringFormat::Euring2020, &v).is_empty());
    }

    #[test]
    fn test_lat_long_require_each_other() {
        let v = values(&[("geographical_coordinates", ""), ("latitude", "42.0833")]);
        let keys: Vec<_> = check(EuringFormat::Euring2020, &v)
            .into_iter()
            .map(|violation| violation.key)
            .collect();
        assert_eq!(keys, vec!["longitude"]);

        let v = values(&[("longitude", "-4.7500")]);
        let keys: Vec<_> = check(EuringFormat::Euring2020, &v)
            .into_iter()
            .map(|violation| violation.key)
            .collect();
        assert_eq!(keys, vec!["latitude"]);
    }

    #[test]
    fn test_some_position_required_in_2020() {
        let v = values(&[("geographical_coordinates", ""), ("latitude", ""), ("longitude", "")]);
        let violations = check(EuringFormat::Euring2020, &v);
        assert_eq!(violations[0].key, "geographical_coordinates");
    }

    #[test]
    fn test_alphabetic_accuracy_outside_2020() {
        let v = values(&[("accuracy_of_coordinates", "A")]);
        assert_eq!(check(EuringFormat::Euring2000Plus, &v)[0].key, "accuracy_of_coordinates");
        assert_eq!(check(EuringFormat::Euring2000, &v)[0].key, "accuracy_of_coordinates");
        assert!(requires_euring2020(&v));
    }

    #[test]
    fn test_later_fields_flagged() {
        let v = values(&[("wing_length", "123.5"), ("latitude", "1.0")]);
        let keys: Vec<_> = check(EuringFormat::Euring2000, &v)
            .into_iter()
            .map(|violation| violation.key)
            .collect();
        assert_eq!(keys, vec!["wing_length", "latitude"]);
        let keys: Vec<_> = check(EuringFormat::Euring2000Plus, &v)
            .into_iter()
            .map(|violation| violation.key)
            .collect();
        assert_eq!(keys, vec!["latitude"]);
    }

    #[test]
    fn test_format_helpers() {
        let plain = values(&[("ringing_scheme", "GBB"), ("wing_length", "")]);
        assert!(matches_euring2000(&plain));
        assert!(!requires_euring2020(&plain));

        let plus = values(&[("wing_length", "123.5")]);
        assert!(!matches_euring2000(&plus));
        assert!(!requires_euring2020(&plus));

        let modern = values(&[("more_other_marks", "blue flag")]);
        assert!(requires_euring2020(&modern));
    }
}
