//! Half and single precision bit layouts and decoded values.
//!
//! A [`FloatValue`] keeps the sign, the unbiased exponent and the fraction
//! bits of a pattern. Subnormal patterns are normalized on decode: the
//! fraction is shifted up until the implicit leading bit appears and the
//! exponent is allowed to drop below the normal range. Every value except
//! zero therefore reads as `1.<mantissa> * 2^exponent`, which is also how
//! results are rendered.

use crate::error::{Error, Result};
use crate::hex::decode_hex;

/// IEEE 754 format parameters.
///
/// Built by a const constructor from the total width and the number of
/// stored fraction bits, so both tables are compile-time constants.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct FloatFormat {
    /// Total bits in a pattern (16 or 32)
    pub bits: u32,
    /// Stored fraction bits (10 for half, 23 for single)
    pub mantissa_bits: i32,
    /// Exponent field bits (5 for half, 8 for single)
    pub exponent_bits: i32,
    pub exponent_bias: i32,
    /// Unbiased exponent of the inf/nan encodings
    pub max_exponent: i32,
    /// Unbiased exponent of the zero/subnormal encodings
    pub min_exponent: i32,
    /// Hex digits used to render the mantissa
    digits: u32,
    /// Tag used in mode selection (`h` or `f`)
    tag: char,
}

impl FloatFormat {
    const fn new(bits: u32, mantissa_bits: u32, tag: char) -> Self {
        let exponent_bits = bits - mantissa_bits - 1;
        let max_exponent = 1 << (exponent_bits - 1);
        let min_exponent = -max_exponent + 1;
        Self {
            bits,
            mantissa_bits: mantissa_bits as i32,
            exponent_bits: exponent_bits as i32,
            exponent_bias: -min_exponent,
            max_exponent,
            min_exponent,
            digits: mantissa_bits.div_ceil(4),
            tag,
        }
    }

    /// Looks up a format by its one-character mode tag.
    ///
    /// # Examples
    ///
    /// ```
    /// use hexarith::{FloatFormat, HALF, SINGLE};
    ///
    /// assert_eq!(FloatFormat::from_tag("f"), Ok(&SINGLE));
    /// assert_eq!(FloatFormat::from_tag("h"), Ok(&HALF));
    /// assert!(FloatFormat::from_tag("d").is_err());
    /// ```
    pub fn from_tag(tag: &str) -> Result<&'static FloatFormat> {
        match tag {
            "f" => Ok(&SINGLE),
            "h" => Ok(&HALF),
            _ => Err(Error::InvalidMode(tag.to_string())),
        }
    }

    pub fn tag(&self) -> char {
        self.tag
    }

    fn pattern_mask(&self) -> u32 {
        u32::MAX >> (32 - self.bits)
    }

    pub(crate) fn mantissa_mask(&self) -> u32 {
        (1 << self.mantissa_bits) - 1
    }

    fn exponent_mask(&self) -> u32 {
        (1 << self.exponent_bits) - 1
    }

    /// Smallest exponent a non-zero value can carry (the smallest subnormal).
    pub fn min_finite_exponent(&self) -> i32 {
        self.min_exponent - self.mantissa_bits + 1
    }
}

/// IEEE 754 single precision (8 exponent bits, 23 fraction bits).
pub const SINGLE: FloatFormat = FloatFormat::new(32, 23, 'f');
/// IEEE 754 half precision (5 exponent bits, 10 fraction bits).
pub const HALF: FloatFormat = FloatFormat::new(16, 10, 'h');

const HEX_DIGITS: &[u8] = b"0123456789abcdef";

/// One decoded floating-point operand or result.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FloatValue {
    pub format: &'static FloatFormat,
    pub sign: bool,
    /// Unbiased exponent; below `min_exponent` for subnormals
    pub exponent: i32,
    /// Fraction bits without the implicit leading bit
    pub mantissa: u32,
    pub is_zero: bool,
}

impl FloatValue {
    /// Decodes a raw pattern, keeping only the low `format.bits` bits.
    ///
    /// # Examples
    ///
    /// ```
    /// use hexarith::{FloatValue, SINGLE};
    ///
    /// let one = FloatValue::from_bits(&SINGLE, 0x3f80_0000);
    /// assert_eq!((one.sign, one.exponent, one.mantissa), (false, 0, 0));
    ///
    /// // smallest subnormal, normalized below the normal exponent range
    /// let tiny = FloatValue::from_bits(&SINGLE, 0x0000_0001);
    /// assert_eq!((tiny.exponent, tiny.mantissa), (-149, 0));
    /// ```
    pub fn from_bits(format: &'static FloatFormat, bits: u32) -> Self {
        let bits = bits & format.pattern_mask();
        let mut mantissa = bits & format.mantissa_mask();
        let mut exponent =
            ((bits >> format.mantissa_bits) & format.exponent_mask()) as i32 - format.exponent_bias;
        let sign = bits >> (format.bits - 1) != 0;
        let is_zero = exponent == format.min_exponent && mantissa == 0;

        if exponent == format.min_exponent && mantissa != 0 {
            // Subnormal; shift the fraction up until the implicit 1 appears
            let leading = 31 - mantissa.leading_zeros() as i32;
            let shift = format.mantissa_bits - leading;
            mantissa = (mantissa << shift) & format.mantissa_mask();
            exponent = format.min_exponent + 1 - shift;
        }

        Self {
            format,
            sign,
            exponent,
            mantissa,
            is_zero,
        }
    }

    /// Decodes a `0x` literal in this format.
    pub fn decode(format: &'static FloatFormat, text: &str) -> Result<Self> {
        Ok(Self::from_bits(format, decode_hex(text)?))
    }

    pub fn zero(format: &'static FloatFormat, sign: bool) -> Self {
        Self {
            format,
            sign,
            exponent: format.min_exponent,
            mantissa: 0,
            is_zero: true,
        }
    }

    pub fn infinity(format: &'static FloatFormat, sign: bool) -> Self {
        Self {
            format,
            sign,
            exponent: format.max_exponent,
            mantissa: 0,
            is_zero: false,
        }
    }

    pub fn nan(format: &'static FloatFormat) -> Self {
        Self {
            format,
            sign: false,
            exponent: format.max_exponent,
            mantissa: 1,
            is_zero: false,
        }
    }

    /// Largest finite magnitude with the given sign.
    pub fn max_finite(format: &'static FloatFormat, sign: bool) -> Self {
        Self {
            format,
            sign,
            exponent: format.max_exponent - 1,
            mantissa: format.mantissa_mask(),
            is_zero: false,
        }
    }

    /// Smallest non-zero (subnormal) magnitude with the given sign.
    pub fn min_finite(format: &'static FloatFormat, sign: bool) -> Self {
        Self {
            format,
            sign,
            exponent: format.min_finite_exponent(),
            mantissa: 0,
            is_zero: false,
        }
    }

    pub fn is_nan(&self) -> bool {
        self.exponent == self.format.max_exponent && self.mantissa != 0
    }

    pub fn is_infinite(&self) -> bool {
        self.exponent == self.format.max_exponent && self.mantissa == 0
    }

    pub fn is_negative(&self) -> bool {
        self.sign
    }

    pub fn negated(self) -> Self {
        Self {
            sign: !self.sign,
            ..self
        }
    }

    /// Mantissa with the implicit leading bit restored.
    pub fn significand(&self) -> u64 {
        (1_u64 << self.format.mantissa_bits) | self.mantissa as u64
    }

    /// True when both values have the same magnitude, ignoring sign.
    pub fn same_magnitude(&self, other: &Self) -> bool {
        self.is_zero == other.is_zero
            && self.exponent == other.exponent
            && self.mantissa == other.mantissa
    }

    /// Encodes the value back into a raw pattern of its format.
    ///
    /// NaN always encodes as the positive quiet NaN.
    pub fn to_bits(&self) -> u32 {
        let format = self.format;
        let sign = (self.sign as u32) << (format.bits - 1);
        let inf_exponent = format.exponent_mask() << format.mantissa_bits;
        if self.is_nan() {
            return inf_exponent | (1 << (format.mantissa_bits - 1));
        }
        if self.is_infinite() {
            return sign | inf_exponent;
        }
        if self.is_zero {
            return sign;
        }
        if self.exponent <= format.min_exponent {
            let shift = format.min_exponent + 1 - self.exponent;
            return sign | (self.significand() >> shift) as u32;
        }
        let biased = (self.exponent + format.exponent_bias) as u32;
        sign | (biased << format.mantissa_bits) | self.mantissa
    }

    /// Renders the value as `nan`, `[-]inf`, or a hex float whose mantissa
    /// always carries the full number of digits for the format, e.g.
    /// `0x1.800000p+1` or `-0x0.000p+0`.
    ///
    /// # Examples
    ///
    /// ```
    /// use hexarith::{FloatValue, HALF, SINGLE};
    ///
    /// assert_eq!(FloatValue::from_bits(&SINGLE, 0x4040_0000).render(), "0x1.800000p+1");
    /// assert_eq!(FloatValue::from_bits(&HALF, 0xbc00).render(), "-0x1.000p+0");
    /// assert_eq!(FloatValue::from_bits(&HALF, 0x7c00).render(), "inf");
    /// ```
    pub fn render(&self) -> String {
        if self.is_nan() {
            return "nan".to_string();
        }

        let mut buffer = String::new();
        if self.sign {
            buffer.push('-');
        }

        if self.is_infinite() {
            buffer.push_str("inf");
        } else if self.is_zero {
            buffer.push_str("0x0.");
            for _ in 0..self.format.digits {
                buffer.push('0');
            }
            buffer.push_str("p+0");
        } else {
            buffer.push_str("0x1.");
            write_mantissa(&mut buffer, self.mantissa, self.format);
            write_exponent(&mut buffer, self.exponent);
        }
        buffer
    }
}

/// Write the fraction as a fixed number of nybbles, padding the fraction
/// on the right up to a whole number of hex digits.
fn write_mantissa(buffer: &mut String, mantissa: u32, format: &FloatFormat) {
    let width = format.digits * 4;
    let mantissa = mantissa << (width - format.mantissa_bits as u32);
    for i in (0..format.digits).rev() {
        let nybble = (mantissa >> (4 * i)) & 0xf;
        buffer.push(HEX_DIGITS[nybble as usize] as char);
    }
}

/// Write the exponent part of a hex float (e.g., "p+10", "p-149").
fn write_exponent(buffer: &mut String, mut exponent: i32) {
    buffer.push('p');
    if exponent < 0 {
        buffer.push('-');
        exponent = -exponent;
    } else {
        buffer.push('+');
    }
    // exponents stay within -149..=127, so at most three digits
    if exponent >= 100 {
        let digit = (exponent / 100) % 10;
        buffer.push((b'0' + digit as u8) as char);
    }
    if exponent >= 10 {
        let digit = (exponent / 10) % 10;
        buffer.push((b'0' + digit as u8) as char);
    }
    let digit = exponent % 10;
    buffer.push((b'0' + digit as u8) as char);
}
