//! Packed binary-coded decimal, two digits per byte.

/// Encodes a decimal value in 0..=99 as packed BCD.
///
/// Callers validate the range first; values above 99 do not produce a
/// meaningful byte.
#[must_use]
pub const fn decimal_to_bcd(decimal: u8) -> u8 {
    decimal.wrapping_add(6u8.wrapping_mul(decimal / 10))
}

/// Decodes a packed BCD byte. Malformed nibbles are not rejected.
#[must_use]
pub const fn bcd_to_decimal(bcd: u8) -> u8 {
    bcd - 6 * (bcd >> 4)
}
