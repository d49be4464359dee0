//! The legacy 31-byte ASCII float form.
//!
//! Old emulators wrote floats as `printf("%.20e")` into a fixed 31 byte field, padded
//! with NULs (or spaces, depending on who wrote them). Newer streams use the 8 byte
//! IEEE-754 form, which is what the encoder always emits.

use crate::errors::{Error, Result};

/// Width of the legacy float field.
pub const LEGACY_FLOAT_LEN: usize = 31;

/// Parses a legacy float field.
///
/// Leading whitespace and trailing NUL or space padding are ignored.
///
/// # Example
///
/// ```
/// use etfpack::float::parse_legacy;
///
/// let mut field = [0u8; 31];
/// field[..3].copy_from_slice(b"1.5");
///
/// assert_eq!(parse_legacy(&field).unwrap(), 1.5);
/// ```
pub fn parse_legacy(field: &[u8]) -> Result<f64> {
    let end = field.iter().position(|&b| b == 0).unwrap_or(field.len());
    let text = std::str::from_utf8(&field[..end])
        .map_err(|_| Error::InvalidFloat(String::from_utf8_lossy(field).into_owned()))?;
    let trimmed = text.trim();
    trimmed
        .parse::<f64>()
        .map_err(|_| Error::InvalidFloat(trimmed.to_owned()))
}

/// Formats `f` into a legacy float field, the way old emulators did.
///
/// # Example
///
/// ```
/// use etfpack::float::{format_legacy, parse_legacy};
///
/// let field = format_legacy(0.1);
/// assert_eq!(parse_legacy(&field).unwrap(), 0.1);
/// ```
pub fn format_legacy(f: f64) -> [u8; LEGACY_FLOAT_LEN] {
    let mut out = [0u8; LEGACY_FLOAT_LEN];
    let text = format!("{:.20e}", f);
    let len = text.len().min(LEGACY_FLOAT_LEN);
    out[..len].copy_from_slice(&text.as_bytes()[..len]);
    out
}
