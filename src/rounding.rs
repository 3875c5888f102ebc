//! Rounding policies shared by both engines.

use std::str::FromStr;

use crate::error::Error;

/// How a quotient with a non-zero remainder is resolved.
///
/// | Digit | Policy                          |
/// |-------|---------------------------------|
/// | `0`   | toward zero (truncate)          |
/// | `1`   | to nearest, ties to even        |
/// | `2`   | toward positive infinity        |
/// | `3`   | toward negative infinity        |
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum RoundingPolicy {
    #[default]
    TowardZero = 0,
    NearestEven = 1,
    TowardPositive = 2,
    TowardNegative = 3,
}

impl RoundingPolicy {
    /// Decodes the single-digit policy selector.
    pub fn from_digit(digit: u8) -> Option<Self> {
        match digit {
            0 => Some(Self::TowardZero),
            1 => Some(Self::NearestEven),
            2 => Some(Self::TowardPositive),
            3 => Some(Self::TowardNegative),
            _ => None,
        }
    }

    /// Divides a magnitude and rounds the quotient under this policy.
    ///
    /// `negative` is the sign of the value the magnitude came from; the
    /// directed policies round the magnitude up only when that sign points
    /// away from zero in their direction.
    ///
    /// # Examples
    ///
    /// ```
    /// use hexarith::RoundingPolicy;
    ///
    /// assert_eq!(RoundingPolicy::NearestEven.divide(5, 2, false), 2);
    /// assert_eq!(RoundingPolicy::NearestEven.divide(7, 2, false), 4);
    /// assert_eq!(RoundingPolicy::TowardPositive.divide(5, 2, true), 2);
    /// assert_eq!(RoundingPolicy::TowardNegative.divide(5, 2, true), 3);
    /// ```
    pub fn divide(self, value: u64, divisor: u64, negative: bool) -> u64 {
        let quotient = value / divisor;
        let remainder = value % divisor;
        if remainder == 0 {
            return quotient;
        }
        let round_up = match self {
            Self::TowardZero => false,
            Self::NearestEven => {
                // remainder < divisor <= 2^64, compare halves without overflow
                let twice = remainder as u128 * 2;
                let divisor = divisor as u128;
                twice > divisor || (twice == divisor && quotient % 2 == 1)
            }
            Self::TowardPositive => !negative,
            Self::TowardNegative => negative,
        };
        if round_up {
            quotient + 1
        } else {
            quotient
        }
    }
}

impl FromStr for RoundingPolicy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let policy = match s.as_bytes() {
            [digit @ b'0'..=b'9'] => Self::from_digit(digit - b'0'),
            _ => None,
        };
        policy.ok_or_else(|| Error::InvalidRounding(s.to_string()))
    }
}
