//! # Bit Order and Polarity
//!
//! The shift-capture unit shifts the line level in from the bottom, so the
//! first bit on the wire ends up in the MSB. LANC sends LSB first and pulls
//! the line low for a logical 1, so a captured byte has to be bit-reversed
//! and inverted before it means anything.

/// Reverse the bit order of a byte
///
/// Swaps adjacent bits, then bit pairs, then nibbles. Applying it twice
/// returns the original byte.
///
/// # Examples
///
/// ```
/// use lanc_zoom::lanc::bits::reverse_byte;
///
/// assert_eq!(reverse_byte(0b0000_0001), 0b1000_0000);
/// assert_eq!(reverse_byte(0b1100_1010), 0b0101_0011);
/// ```
pub const fn reverse_byte(x: u8) -> u8 {
    let x = ((x >> 1) & 0x55) | ((x << 1) & 0xAA);
    let x = ((x >> 2) & 0x33) | ((x << 2) & 0xCC);
    ((x >> 4) & 0x0F) | ((x << 4) & 0xF0)
}

/// Turn a raw shift-register value into the transmitted byte
pub const fn decode_captured(raw: u8) -> u8 {
    !reverse_byte(raw)
}

/// Raw shift-register value that a transmitted byte produces
///
/// Inverse of [`decode_captured`].
pub const fn captured_from(byte: u8) -> u8 {
    reverse_byte(!byte)
}

/// Bit-by-bit reversal, used to check the swap network
#[allow(dead_code)]
fn reverse_byte_slow(x: u8) -> u8 {
    let mut out = 0u8;

    for i in 0..8 {
        if x & (1 << i) != 0 {
            out |= 1 << (7 - i);
        }
    }

    out
}
