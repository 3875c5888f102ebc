//! Fixed-point arithmetic on raw bit patterns.
//!
//! A pattern is interpreted under a [`FixedFormat`] of `I.F` bits: the top
//! bit of the `I + F` bit window is the sign, the value is the pattern read
//! as a two's complement integer scaled by `2^-F`. Every result is reduced
//! modulo `2^(I + F)`, so overflow wraps.
//!
//! Multiplication and division work on a sign and magnitude pair so the
//! rounding policy can see which way the exact result points.

use std::str::FromStr;

use tracing::trace;

use crate::error::{Error, Result};
use crate::hex::decode_hex;
use crate::op::Operator;
use crate::rounding::RoundingPolicy;

/// Widest supported format; wider patterns do not fit the 32-bit operands.
pub const MAX_WIDTH: u32 = 32;

/// Integer/fractional bit split of a fixed-point format.
///
/// # Examples
///
/// ```
/// use hexarith::FixedFormat;
///
/// let format: FixedFormat = "8.8".parse().unwrap();
/// assert_eq!(format.width(), 16);
/// assert_eq!(format.wrap(0x1_2345), 0x2345);
/// assert_eq!(format.negate(0x0100), 0xff00);
/// assert!("16.17".parse::<FixedFormat>().is_err());
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct FixedFormat {
    pub integer_bits: u8,
    pub fractional_bits: u8,
}

impl FixedFormat {
    /// Creates a format, rejecting empty formats and those wider than
    /// [`MAX_WIDTH`].
    pub fn new(integer_bits: u32, fractional_bits: u32) -> Result<Self> {
        let width = integer_bits.saturating_add(fractional_bits);
        if width == 0 || width > MAX_WIDTH {
            return Err(Error::WidthOverflow(width));
        }
        Ok(Self {
            integer_bits: integer_bits as u8,
            fractional_bits: fractional_bits as u8,
        })
    }

    /// Total width `W` of the format in bits.
    pub fn width(self) -> u32 {
        self.integer_bits as u32 + self.fractional_bits as u32
    }

    fn mask(self) -> u64 {
        (1_u64 << self.width()) - 1
    }

    /// Reduces a value modulo `2^W`.
    pub fn wrap(self, value: u64) -> u32 {
        (value & self.mask()) as u32
    }

    /// Two's complement negation within the format width; zero stays zero.
    pub fn negate(self, value: u32) -> u32 {
        self.wrap((1_u64 << self.width()).wrapping_sub(value as u64))
    }

    pub fn is_negative(self, value: u32) -> bool {
        (value >> (self.width() - 1)) & 1 == 1
    }

    fn split(self, value: u32) -> SignMagnitude {
        if self.is_negative(value) {
            SignMagnitude {
                magnitude: self.negate(value),
                negative: true,
            }
        } else {
            SignMagnitude {
                magnitude: value,
                negative: false,
            }
        }
    }

    fn join(self, magnitude: u64, negative: bool) -> u32 {
        let value = self.wrap(magnitude);
        if negative {
            self.negate(value)
        } else {
            value
        }
    }
}

impl FromStr for FixedFormat {
    type Err = Error;

    /// Parses a `<integer_bits>.<fractional_bits>` descriptor such as `16.16`.
    fn from_str(s: &str) -> Result<Self> {
        let invalid = || Error::InvalidFormat(s.to_string());
        let (integer, fractional) = s.split_once('.').ok_or_else(invalid)?;
        let integer_bits = parse_bit_count(integer).ok_or_else(invalid)?;
        let fractional_bits = parse_bit_count(fractional).ok_or_else(invalid)?;
        Self::new(integer_bits, fractional_bits)
    }
}

/// Parses a run of decimal digits, saturating on overflow so an absurdly
/// long run is reported as too wide rather than malformed. An empty run
/// counts as zero bits.
fn parse_bit_count(digits: &str) -> Option<u32> {
    if !digits.bytes().all(|c| c.is_ascii_digit()) {
        return None;
    }
    Some(digits.bytes().fold(0_u32, |acc, c| {
        acc.saturating_mul(10).saturating_add((c - b'0') as u32)
    }))
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct SignMagnitude {
    magnitude: u32,
    negative: bool,
}

/// Fixed-point engine for one format and rounding policy.
///
/// # Examples
///
/// ```
/// use hexarith::{FixedFormat, FixedPoint, RoundingPolicy};
///
/// let engine = FixedPoint::new("4.4".parse().unwrap(), RoundingPolicy::NearestEven);
/// let sum = engine.add(0x05, 0x03);
/// assert_eq!(engine.render(sum), "0.500");
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FixedPoint {
    format: FixedFormat,
    policy: RoundingPolicy,
}

impl FixedPoint {
    pub fn new(format: FixedFormat, policy: RoundingPolicy) -> Self {
        Self { format, policy }
    }

    pub fn format(&self) -> FixedFormat {
        self.format
    }

    pub fn policy(&self) -> RoundingPolicy {
        self.policy
    }

    /// Decodes a hex literal and wraps it to the format width.
    pub fn decode(&self, text: &str) -> Result<u32> {
        let bits = decode_hex(text)?;
        Ok(self.format.wrap(bits as u64))
    }

    pub fn add(&self, lhs: u32, rhs: u32) -> u32 {
        self.format.wrap(lhs as u64 + rhs as u64)
    }

    pub fn sub(&self, lhs: u32, rhs: u32) -> u32 {
        self.add(lhs, self.format.negate(rhs))
    }

    pub fn mul(&self, lhs: u32, rhs: u32) -> u32 {
        let lhs = self.format.split(lhs);
        let rhs = self.format.split(rhs);
        let negative = lhs.negative ^ rhs.negative;

        let product = lhs.magnitude as u64 * rhs.magnitude as u64;
        let scale = 1_u64 << self.format.fractional_bits;
        let magnitude = self.policy.divide(product, scale, negative);
        trace!(product, magnitude, negative, "fixed-point multiply");

        self.format.join(magnitude, negative)
    }

    /// Divides `lhs` by `rhs`, failing when `rhs` is zero.
    pub fn div(&self, lhs: u32, rhs: u32) -> Result<u32> {
        if rhs == 0 {
            return Err(Error::DivisionByZero);
        }
        let lhs = self.format.split(lhs);
        let rhs = self.format.split(rhs);
        let negative = lhs.negative ^ rhs.negative;

        // magnitudes are at most 2^31, so the widened dividend stays below 2^64
        let dividend = (lhs.magnitude as u64) << self.format.fractional_bits;
        let magnitude = self.policy.divide(dividend, rhs.magnitude as u64, negative);
        trace!(dividend, magnitude, negative, "fixed-point divide");

        Ok(self.format.join(magnitude, negative))
    }

    /// Applies `op` to the operands; without an operator `lhs` is returned.
    pub fn apply(&self, lhs: u32, rhs: Option<(Operator, u32)>) -> Result<u32> {
        let Some((op, rhs)) = rhs else {
            return Ok(lhs);
        };
        match op {
            Operator::Add => Ok(self.add(lhs, rhs)),
            Operator::Sub => Ok(self.sub(lhs, rhs)),
            Operator::Mul => Ok(self.mul(lhs, rhs)),
            Operator::Div => self.div(lhs, rhs),
        }
    }

    /// Renders a pattern as a decimal with exactly three fractional digits.
    ///
    /// The fraction is rounded with the engine's policy; a fraction that
    /// rounds up to a whole unit carries into the integer part. A value that
    /// renders as zero never carries a minus sign.
    pub fn render(&self, value: u32) -> String {
        let SignMagnitude {
            magnitude,
            negative,
        } = self.format.split(value);
        let fractional_bits = self.format.fractional_bits as u32;
        let scale = 1_u64 << fractional_bits;

        let magnitude = magnitude as u64;
        let mut integer = magnitude >> fractional_bits;
        let remainder = magnitude & (scale - 1);
        let mut thousandths = self.policy.divide(remainder * 1000, scale, negative);
        if thousandths == 1000 {
            integer += 1;
            thousandths = 0;
        }

        let sign = if negative && (integer != 0 || thousandths != 0) {
            "-"
        } else {
            ""
        };
        format!("{}{}.{:03}", sign, integer, thousandths)
    }
}
