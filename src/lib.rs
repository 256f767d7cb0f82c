#![doc = include_str!("../README.md")]
#![warn(missing_docs)]

//! # euring: EURING record codec
//!
//! Decoding, validation, construction and conversion of bird-ringing
//! encounter records in the EURING exchange code.
//!
//! ## Quick Start
//!
//! ### Decoding a record
//!
//! ```
//! use euring::{decode, EuringFormat};
//!
//! let raw = "DERA0CD...5206514ZZ1877018770N0ZUFF02U-----120719760----SV55+584200+01348000101030100202301739";
//! let record = decode(raw, None)?;
//! assert_eq!(record.format(), EuringFormat::Euring2000);
//! assert!(record.is_valid());
//!
//! let scheme = record.field("ringing_scheme").unwrap();
//! assert_eq!(scheme.raw(), "DER");
//! assert_eq!(scheme.description(), Some("Radolfzell, Germany"));
//! # Ok::<(), euring::DecodeError>(())
//! ```
//!
//! ### Converting between versions
//!
//! ```
//! use euring::{decode, convert, EuringFormat};
//!
//! let raw = "DERA0CD...5206514ZZ1877018770N0ZUFF02U-----120719760----SV55+584200+01348000101030100202301739";
//! let record = decode(raw, None)?;
//! let upgraded = convert(&record, EuringFormat::Euring2020, false)?;
//! assert_eq!(upgraded.fields().len(), 64);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Modules
//!
//! - [`format`]: Format tags, aliases and detection
//! - [`fields`] / [`schema`]: Field table and per-version schemas
//! - [`field_type`]: Field value types and validators
//! - [`code_tables`]: Reference code tables
//! - [`decoder`] / [`reader`]: Decoding single records and streams
//! - [`builder`]: Building raw records from values
//! - [`converter`]: Conversion between versions
//! - [`json`]: JSON rendering of decoded records
//! - [`batch`]: Parallel decoding with rayon
//! - [`export`]: Export formatting of ring numbers, schemes and species
//! - [`error`]: Error types and result type

pub mod batch;
pub mod builder;
pub mod code_tables;
pub mod converter;
pub mod coordinates;
pub mod decoder;
pub mod error;
pub mod export;
pub mod field_type;
pub mod fields;
pub mod format;
pub mod json;
pub mod reader;
pub mod record;
pub mod record_rules;
pub mod schema;

pub use builder::{build, BuildMode, RecordBuilder};
pub use code_tables::{code_tables, list_table, lookup, CodeEntry, CodeTableName, CodeTables};
pub use converter::{
    convert, convert_str, convert_text, rule_for, ConversionRule, ConvertOptions, Converter,
};
pub use decoder::{decode, decode_with_hint, RecordDecoder};
pub use error::{
    BuildError, ConversionError, DecodeError, EuringError, FormatError, LookupError, Result,
};
pub use field_type::{FieldIssue, FieldType, FieldValue, IssueKind};
pub use format::{detect_format, EuringFormat};
pub use reader::EuringReader;
pub use record::{DecodedField, DecodedRecord};
pub use schema::{schema_for, FieldDefinition, RecordSchema};
