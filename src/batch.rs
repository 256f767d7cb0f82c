//! Parallel decoding of many EURING records using Rayon.
//!
//! Records are independent, so each one is an independent task on Rayon's
//! work-stealing pool. Results keep the input order.
//!
//! # Examples
//!
//! ```
//! use euring::batch::decode_batch;
//!
//! let raw = "DERA0CD...5206514ZZ1877018770N0ZUFF02U-----120719760----SV55+584200+01348000101030100202301739";
//! let results = decode_batch(&[raw, "", raw], None);
//! assert!(results[0].is_ok());
//! assert!(results[1].is_err());
//! assert!(results[2].is_ok());
//! ```

use crate::decoder::RecordDecoder;
use crate::error::DecodeError;
use crate::format::EuringFormat;
use crate::record::DecodedRecord;
use rayon::prelude::*;

fn decoder(format: Option<EuringFormat>) -> RecordDecoder<'static> {
    match format {
        Some(format) => RecordDecoder::new().with_format(format),
        None => RecordDecoder::new(),
    }
}

/// Decode a batch of raw records in parallel, one result per record.
pub fn decode_batch<S>(records: &[S], format: Option<EuringFormat>) -> Vec<Result<DecodedRecord, DecodeError>>
where
    S: AsRef<str> + Sync,
{
    let decoder = decoder(format);
    records
        .par_iter()
        .map(|raw| decoder.decode(raw.as_ref()))
        .collect()
}

/// Decode newline-separated records in parallel, skipping blank lines.
///
/// # Errors
///
/// Returns a [`DecodeError`] if any line fails to decode. When several lines
/// fail, which error is returned is unspecified.
pub fn decode_lines_parallel(
    text: &str,
    format: Option<EuringFormat>,
) -> Result<Vec<DecodedRecord>, DecodeError> {
    let decoder = decoder(format);
    let lines: Vec<&str> = text
        .lines()
        .filter(|line| !line.trim().is_empty())
        .collect();
    log::debug!("decoding {} lines in parallel", lines.len());
    lines
        .par_iter()
        .map(|line| decoder.decode(line))
        .collect()
}
