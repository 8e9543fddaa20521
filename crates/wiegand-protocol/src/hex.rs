//! Hex-as-decimal reinterpretation.
//!
//! Some readers emit card numbers whose hexadecimal digits are meant to be
//! read as a decimal numeral: a badge printed `1234` arrives as `0x1234`
//! (4660). [`cast_hex_as_dec`] undoes that.

/// Maximum number of nibbles consumed by [`cast_hex_as_dec`].
pub const MAX_HEX_DIGITS: usize = 8;

/// Reinterpret the hex digits of `value` as a decimal number.
///
/// Nibbles are consumed least-significant first and placed at increasing
/// decimal positions. Processing stops once the remaining input is zero or
/// after [`MAX_HEX_DIGITS`] nibbles, so wider inputs are truncated. Nibbles
/// above 9 are not decimal digits and contribute 0.
///
/// # Examples
///
/// ```
/// use wiegand_protocol::cast_hex_as_dec;
///
/// assert_eq!(cast_hex_as_dec(0x1234), 1234);
/// assert_eq!(cast_hex_as_dec(0x1A2), 102);
/// assert_eq!(cast_hex_as_dec(0x1_2345_6789), 23_456_789);
/// ```
#[must_use]
pub fn cast_hex_as_dec(value: u64) -> u64 {
    let mut remaining = value;
    let mut result = 0u64;
    let mut factor = 1u64;

    for _ in 0..MAX_HEX_DIGITS {
        let digit = remaining & 0xF;
        if digit <= 9 {
            result += digit * factor;
        }

        remaining >>= 4;
        if remaining == 0 {
            break;
        }
        factor *= 10;
    }

    result
}
