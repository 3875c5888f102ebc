//! Hexadecimal literal decoding.

use crate::error::{Error, Result};

/// Maximum number of hex digits that fit in a 32-bit pattern.
const MAX_DIGITS: usize = 8;

/// Decodes a `0x`-prefixed literal into a 32-bit pattern.
///
/// Digits are read from the end of the string backwards and at most eight
/// are consumed, so longer literals keep only their low-order nybbles and
/// anything before that window is never examined. An empty digit run
/// decodes to zero.
///
/// # Examples
///
/// ```
/// use hexarith::decode_hex;
///
/// assert_eq!(decode_hex("0x7F800000"), Ok(0x7f80_0000));
/// assert_eq!(decode_hex("0x123456789"), Ok(0x2345_6789));
/// assert!(decode_hex("7F800000").is_err());
/// ```
pub fn decode_hex(text: &str) -> Result<u32> {
    let digits = text
        .strip_prefix("0x")
        .ok_or_else(|| Error::InvalidHex(text.to_string()))?;

    let mut bits = 0_u32;
    for (i, c) in digits.bytes().rev().take(MAX_DIGITS).enumerate() {
        let nybble = match c {
            b'0'..=b'9' => c - b'0',
            b'a'..=b'f' => c - b'a' + 10,
            b'A'..=b'F' => c - b'A' + 10,
            _ => return Err(Error::InvalidHex(text.to_string())),
        };
        bits |= (nybble as u32) << (4 * i);
    }
    Ok(bits)
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn lower_and_upper_case_agree(v in any::<u32>()) {
            let lower = decode_hex(&format!("0x{:x}", v));
            let upper = decode_hex(&format!("0x{:X}", v));
            prop_assert_eq!(lower, Ok(v));
            prop_assert_eq!(upper, Ok(v));
        }

        #[test]
        fn extra_leading_digits_are_ignored(v in any::<u32>(), high in 1_u32..0xffff) {
            let text = format!("0x{:x}{:08x}", high, v);
            prop_assert_eq!(decode_hex(&text), Ok(v));
        }

        #[test]
        fn never_panics(s in "\\PC*") {
            let _ = decode_hex(&s);
        }
    }
}
