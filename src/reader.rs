//! Reading EURING records from line-oriented streams.
//!
//! This module provides [`EuringReader`] for decoding one record per line from
//! any source that implements [`std::io::BufRead`].
//!
//! # Examples
//!
//! Reading records from a file:
//!
//! ```no_run
//! use euring::EuringReader;
//! use std::fs::File;
//! use std::io::BufReader;
//!
//! let file = File::open("encounters.psv")?;
//! let mut reader = EuringReader::new(BufReader::new(file));
//!
//! while let Some(record) = reader.read_record()? {
//!     println!("{}: valid = {}", record.format(), record.is_valid());
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! Reading from a buffer:
//!
//! ```
//! use euring::EuringReader;
//! use std::io::Cursor;
//!
//! let data = "DERA0CD...5206514ZZ1877018770N0ZUFF02U-----120719760----SV55+584200+01348000101030100202301739\n";
//! let mut reader = EuringReader::new(Cursor::new(data));
//! let record = reader.read_record()?.unwrap();
//! assert_eq!(record.value("place_code"), Some("SV55"));
//! # Ok::<(), euring::EuringError>(())
//! ```

use crate::decoder::RecordDecoder;
use crate::error::Result;
use crate::format::EuringFormat;
use crate::record::DecodedRecord;
use std::io::BufRead;

/// Reader decoding one EURING record per line.
///
/// Blank lines are skipped and line endings (`\n` or `\r\n`) are stripped. A
/// line that cannot be decoded stops iteration with an error; field-level
/// issues do not.
#[derive(Debug)]
pub struct EuringReader<R: BufRead> {
    reader: R,
    decoder: RecordDecoder<'static>,
    line: String,
    lines_read: usize,
}

impl<R: BufRead> EuringReader<R> {
    /// Create a reader that detects the format of each line.
    pub fn new(reader: R) -> Self {
        EuringReader {
            reader,
            decoder: RecordDecoder::new(),
            line: String::new(),
            lines_read: 0,
        }
    }

    /// Decode every line as the given format.
    ///
    /// # Examples
    ///
    /// ```
    /// use euring::{EuringFormat, EuringReader};
    /// use std::io::Cursor;
    ///
    /// let reader = EuringReader::new(Cursor::new(""))
    ///     .with_format(EuringFormat::Euring2020);
    /// ```
    #[must_use]
    pub fn with_format(mut self, format: EuringFormat) -> Self {
        self.decoder = self.decoder.with_format(format);
        self
    }

    /// Number of lines consumed so far, blank lines included.
    #[must_use]
    pub fn lines_read(&self) -> usize {
        self.lines_read
    }

    /// Read and decode the next record.
    ///
    /// Returns `Ok(None)` at end of input.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying source fails or the line is not a
    /// structurally valid record.
    pub fn read_record(&mut self) -> Result<Option<DecodedRecord>> {
        loop {
            self.line.clear();
            if self.reader.read_line(&mut self.line)? == 0 {
                return Ok(None);
            }
            self.lines_read += 1;
            let raw = self.line.trim_end_matches(['\n', '\r']);
            if raw.trim().is_empty() {
                continue;
            }
            let record = self.decoder.decode(raw).map_err(|err| {
                log::debug!("line {}: {err}", self.lines_read);
                err
            })?;
            return Ok(Some(record));
        }
    }
}

impl<R: BufRead> Iterator for EuringReader<R> {
    type Item = Result<DecodedRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        self.read_record().transpose()
    }
}
