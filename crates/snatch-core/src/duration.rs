//! Segment count derived from media length and per-segment duration.

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DurationError {
    #[error("invalid time format {0:?}; expected hh:mm:ss")]
    Format(String),
    #[error("seconds per segment must be greater than zero")]
    ZeroSegmentLength,
}

/// Parses a strict `hh:mm:ss` string (two digits per field) into seconds.
pub fn parse_hms(text: &str) -> Result<u64, DurationError> {
    let bad = || DurationError::Format(text.to_string());
    let fields: Vec<&str> = text.split(':').collect();
    if fields.len() != 3 {
        return Err(bad());
    }
    let mut total = 0u64;
    for (field, scale) in fields.iter().zip([3600u64, 60, 1]) {
        if field.len() != 2 || !field.bytes().all(|b| b.is_ascii_digit()) {
            return Err(bad());
        }
        let n: u64 = field.parse().map_err(|_| bad())?;
        total += n * scale;
    }
    Ok(total)
}

/// Number of whole segments in a video of length `hms` when each segment
/// covers `secs_per_segment` seconds. Remainders are dropped.
pub fn segments_for_duration(hms: &str, secs_per_segment: u64) -> Result<u64, DurationError> {
    if secs_per_segment == 0 {
        return Err(DurationError::ZeroSegmentLength);
    }
    Ok(parse_hms(hms)? / secs_per_segment)
}
