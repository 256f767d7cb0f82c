//! Building raw EURING records from field values.
//!
//! [`RecordBuilder`] collects values by field key and serializes them into the
//! layout of one format. Building is fail-fast: the first field (in schema
//! order) that is missing or invalid stops the build, and record-level rules
//! are checked last.
//!
//! # Examples
//!
//! ```
//! use euring::{BuildMode, EuringFormat, RecordBuilder};
//!
//! let mut builder = RecordBuilder::new(EuringFormat::Euring2000Plus).with_mode(BuildMode::Lenient);
//! builder
//!     .set("ringing_scheme", "GBB")?
//!     .set("primary_identification_method", "A0")?
//!     .set("identification_number", "1234567890")?
//!     .set("species_mentioned", "10")?;
//! let err = builder.build().unwrap_err();
//! assert_eq!(err.key(), "verification_of_the_metal_ring");
//! # Ok::<(), euring::BuildError>(())
//! ```

use crate::error::BuildError;
use crate::fields::{field_spec, Length};
use crate::format::{EuringFormat, SEPARATOR};
use crate::record_rules;
use crate::schema::schema_for;
use indexmap::IndexMap;

/// How a builder treats fields that were never set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BuildMode {
    /// Every field of the schema must be set (default)
    #[default]
    Strict,
    /// Unset optional fields are filled with their placeholder
    Lenient,
}

/// Builder for one raw EURING record.
#[derive(Debug, Clone)]
pub struct RecordBuilder {
    format: EuringFormat,
    mode: BuildMode,
    values: IndexMap<&'static str, String>,
}

impl RecordBuilder {
    /// Create a strict builder for the given format.
    #[must_use]
    pub fn new(format: EuringFormat) -> Self {
        RecordBuilder {
            format,
            mode: BuildMode::default(),
            values: IndexMap::new(),
        }
    }

    /// Set the build mode.
    #[must_use]
    pub fn with_mode(mut self, mode: BuildMode) -> Self {
        self.mode = mode;
        self
    }

    /// Target format.
    #[must_use]
    pub fn format(&self) -> EuringFormat {
        self.format
    }

    /// Build mode.
    #[must_use]
    pub fn mode(&self) -> BuildMode {
        self.mode
    }

    /// Value set for a key, if any.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    /// Set the value of a field.
    ///
    /// Keys of fields that only a later format carries are accepted here and
    /// rejected by [`build`](Self::build) when they hold a value.
    ///
    /// # Errors
    ///
    /// Returns [`BuildError::UnknownField`] when no EURING format has the key.
    pub fn set(&mut self, key: &str, value: impl Into<String>) -> Result<&mut Self, BuildError> {
        let spec = field_spec(key).ok_or_else(|| BuildError::UnknownField(key.to_string()))?;
        self.values.insert(spec.key, value.into());
        Ok(self)
    }

    /// Set several values at once.
    ///
    /// # Errors
    ///
    /// Returns [`BuildError::UnknownField`] for the first unknown key; values
    /// before it stay set.
    pub fn update<K, V, I>(&mut self, pairs: I) -> Result<&mut Self, BuildError>
    where
        K: AsRef<str>,
        V: Into<String>,
        I: IntoIterator<Item = (K, V)>,
    {
        for (key, value) in pairs {
            self.set(key.as_ref(), value)?;
        }
        Ok(self)
    }

    /// Validate the values and serialize them.
    ///
    /// # Errors
    ///
    /// Returns the first [`BuildError`] in schema order, then any record rule
    /// violation.
    pub fn build(&self) -> Result<String, BuildError> {
        let schema = schema_for(self.format);
        let mut written: Vec<String> = Vec::with_capacity(schema.len());

        for definition in schema {
            let value = match (self.values.get(definition.key), self.mode) {
                (None, BuildMode::Strict) => {
                    return Err(BuildError::MissingField {
                        key: definition.key.to_string(),
                    });
                },
                (Some(value), _) if !value.is_empty() => value.clone(),
                _ if definition.required => {
                    return Err(BuildError::MissingField {
                        key: definition.key.to_string(),
                    });
                },
                _ => definition.fill_value(self.format),
            };
            let value = match definition.length {
                Length::Fixed(width) => definition.field_type.pad(&value, width),
                _ => value,
            };
            if let Err(issue) = definition.check(&value) {
                return Err(BuildError::InvalidValue {
                    key: definition.key.to_string(),
                    value,
                    kind: issue.kind,
                    message: issue.message,
                });
            }
            written.push(value);
        }

        let mut record_values: IndexMap<&str, &str> = schema
            .iter()
            .map(|definition| definition.key)
            .zip(written.iter().map(String::as_str))
            .collect();
        for (key, value) in &self.values {
            if !schema.contains_key(key) {
                record_values.insert(*key, value.as_str());
            }
        }
        if let Some(violation) = record_rules::check(self.format, &record_values).into_iter().next() {
            return Err(BuildError::RecordRule {
                key: violation.key.to_string(),
                message: violation.message,
            });
        }

        let raw = if self.format.is_fixed_width() {
            written.concat()
        } else {
            written.join(&SEPARATOR.to_string())
        };
        log::trace!("built {} record of {} characters", self.format, raw.chars().count());
        Ok(raw)
    }
}

/// Build a raw record from key/value pairs.
///
/// `strict` selects [`BuildMode::Strict`], otherwise [`BuildMode::Lenient`].
///
/// # Errors
///
/// See [`RecordBuilder::set`] and [`RecordBuilder::build`].
pub fn build<K, V, I>(format: EuringFormat, values: I, strict: bool) -> Result<String, BuildError>
where
    K: AsRef<str>,
    V: Into<String>,
    I: IntoIterator<Item = (K, V)>,
{
    let mode = if strict {
        BuildMode::Strict
    } else {
        BuildMode::Lenient
    };
    let mut builder = RecordBuilder::new(format).with_mode(mode);
    builder.update(values)?;
    builder.build()
}
