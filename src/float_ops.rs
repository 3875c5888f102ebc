//! Floating-point arithmetic on [`FloatValue`]s.
//!
//! Every operation resolves special operands first, then produces an exact
//! (or, for division, exact-remainder-carrying) integer significand and
//! exponent which a single normalize step rounds into the format. Since
//! decoded subnormals already use an extended exponent range, normals,
//! subnormals and results all go through the same rounding path.

use tracing::{debug, trace};

use crate::error::Result;
use crate::float::{FloatFormat, FloatValue};
use crate::op::Operator;
use crate::rounding::RoundingPolicy;

/// Exact dividend and divisor behind a truncated quotient, so rounding can
/// see the true remainder.
#[derive(Clone, Copy, Debug)]
struct Quotient {
    dividend: u64,
    divisor: u64,
}

/// Floating-point engine for one format and rounding policy.
///
/// # Examples
///
/// ```
/// use hexarith::{FloatingPoint, RoundingPolicy, HALF};
///
/// let engine = FloatingPoint::new(&HALF, RoundingPolicy::NearestEven);
/// let one = engine.decode("0x3C00").unwrap();
/// let two = engine.decode("0x4000").unwrap();
/// assert_eq!(engine.mul(one, two).render(), "0x1.000p+1");
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FloatingPoint {
    format: &'static FloatFormat,
    policy: RoundingPolicy,
}

impl FloatingPoint {
    pub fn new(format: &'static FloatFormat, policy: RoundingPolicy) -> Self {
        Self { format, policy }
    }

    pub fn format(&self) -> &'static FloatFormat {
        self.format
    }

    pub fn policy(&self) -> RoundingPolicy {
        self.policy
    }

    pub fn decode(&self, text: &str) -> Result<FloatValue> {
        let value = FloatValue::decode(self.format, text)?;
        trace!(?value, "decoded operand");
        Ok(value)
    }

    /// Applies `op` to the operands; without an operator `lhs` is returned.
    pub fn apply(&self, lhs: FloatValue, rhs: Option<(Operator, FloatValue)>) -> FloatValue {
        let Some((op, rhs)) = rhs else {
            return lhs;
        };
        match op {
            Operator::Add => self.add(lhs, rhs),
            Operator::Sub => self.sub(lhs, rhs),
            Operator::Mul => self.mul(lhs, rhs),
            Operator::Div => self.div(lhs, rhs),
        }
    }

    pub fn add(&self, lhs: FloatValue, rhs: FloatValue) -> FloatValue {
        if lhs.is_nan() || rhs.is_nan() {
            return self.nan();
        }
        if lhs.is_infinite() && rhs.is_infinite() && lhs.sign != rhs.sign {
            return self.nan();
        }
        if lhs.is_infinite() {
            return FloatValue::infinity(self.format, lhs.sign);
        }
        if rhs.is_infinite() {
            return FloatValue::infinity(self.format, rhs.sign);
        }
        if lhs.same_magnitude(&rhs) && lhs.sign != rhs.sign {
            // exact cancellation is +0 unless rounding toward -inf
            let sign = self.policy == RoundingPolicy::TowardNegative;
            return FloatValue::zero(self.format, sign);
        }
        if lhs.is_zero {
            return rhs;
        }
        if rhs.is_zero {
            return lhs;
        }

        let (large, small) = if rhs.exponent > lhs.exponent {
            (rhs, lhs)
        } else {
            (lhs, rhs)
        };
        let gap = large.exponent - small.exponent;
        let mantissa_bits = self.format.mantissa_bits;
        if gap > mantissa_bits + 2 {
            return self.add_negligible(large, large.sign == small.sign);
        }

        let large_sig = large.significand() << gap;
        let small_sig = small.significand();
        let exponent = small.exponent - mantissa_bits;
        let (significand, negative) = if large.sign == small.sign {
            (large_sig + small_sig, large.sign)
        } else if large_sig > small_sig {
            (large_sig - small_sig, large.sign)
        } else {
            (small_sig - large_sig, small.sign)
        };
        self.normalize(significand, exponent, negative, None)
    }

    /// The smaller operand lies below a quarter of the larger one's last
    /// place, so it only matters to the directed policies: they move the
    /// larger operand one unit toward the smaller one's direction when that
    /// is the way they round.
    fn add_negligible(&self, large: FloatValue, same_sign: bool) -> FloatValue {
        let negative = large.sign;
        let exponent = large.exponent - self.format.mantissa_bits;
        let (up, down) = match self.policy {
            RoundingPolicy::TowardZero => (false, !same_sign),
            RoundingPolicy::NearestEven => (false, false),
            RoundingPolicy::TowardPositive => (same_sign && !negative, !same_sign && negative),
            RoundingPolicy::TowardNegative => (same_sign && negative, !same_sign && !negative),
        };
        trace!(up, down, "negligible addend");
        if up {
            self.normalize(large.significand() + 1, exponent, negative, None)
        } else if down {
            // one half unit below, so the next binade down keeps its last place
            let significand = (large.significand() << 1) - 1;
            self.normalize(significand, exponent - 1, negative, None)
        } else {
            large
        }
    }

    pub fn sub(&self, lhs: FloatValue, rhs: FloatValue) -> FloatValue {
        self.add(lhs, rhs.negated())
    }

    pub fn mul(&self, lhs: FloatValue, rhs: FloatValue) -> FloatValue {
        if lhs.is_nan() || rhs.is_nan() {
            return self.nan();
        }
        if (lhs.is_zero && rhs.is_infinite()) || (rhs.is_zero && lhs.is_infinite()) {
            return self.nan();
        }
        let negative = lhs.sign ^ rhs.sign;
        if lhs.is_infinite() || rhs.is_infinite() {
            return FloatValue::infinity(self.format, negative);
        }
        if lhs.is_zero || rhs.is_zero {
            return FloatValue::zero(self.format, negative);
        }

        let exponent = lhs.exponent + rhs.exponent - 2 * self.format.mantissa_bits;
        let significand = lhs.significand() * rhs.significand();
        self.normalize(significand, exponent, negative, None)
    }

    pub fn div(&self, lhs: FloatValue, rhs: FloatValue) -> FloatValue {
        if lhs.is_nan() || rhs.is_nan() {
            return self.nan();
        }
        if (lhs.is_zero && rhs.is_zero) || (lhs.is_infinite() && rhs.is_infinite()) {
            return self.nan();
        }
        let negative = lhs.sign ^ rhs.sign;
        if lhs.is_infinite() || rhs.is_zero {
            return FloatValue::infinity(self.format, negative);
        }
        if lhs.is_zero || rhs.is_infinite() {
            return FloatValue::zero(self.format, negative);
        }

        // widen so the quotient keeps a guard bit past the mantissa
        let widen = self.format.mantissa_bits + 1;
        let dividend = lhs.significand() << widen;
        let divisor = rhs.significand();
        let exponent = lhs.exponent - rhs.exponent - widen;
        self.normalize(
            dividend / divisor,
            exponent,
            negative,
            Some(Quotient { dividend, divisor }),
        )
    }

    fn nan(&self) -> FloatValue {
        FloatValue::nan(self.format)
    }

    /// Rounds `significand * 2^exponent` into the format.
    ///
    /// The significand must be non-zero. When `exact` is given, the
    /// significand is the truncated quotient of `exact` and rounding uses
    /// the full dividend and divisor instead.
    fn normalize(
        &self,
        mut significand: u64,
        mut exponent: i32,
        negative: bool,
        exact: Option<Quotient>,
    ) -> FloatValue {
        debug_assert!(significand != 0);
        let format = self.format;
        let mantissa_bits = format.mantissa_bits;

        // Move the leading bit to at least `mantissa_bits` past the point
        let mut point_shift = 63 - significand.leading_zeros() as i32;
        if point_shift < mantissa_bits {
            significand <<= mantissa_bits - point_shift;
            exponent -= mantissa_bits - point_shift;
            point_shift = mantissa_bits;
        }
        exponent += point_shift;

        if exponent >= format.max_exponent {
            return self.overflow(negative);
        }
        if exponent < format.min_finite_exponent() {
            let dropped = significand & ((1_u64 << point_shift) - 1);
            let remainder = exact.is_some_and(|q| q.dividend % q.divisor != 0);
            return self.underflow(negative, exponent, dropped != 0 || remainder);
        }

        // Subnormal results lose low bits on top of the usual ones
        let denormal_digits = if exponent <= format.min_exponent {
            format.min_exponent - exponent + 1
        } else {
            0
        };
        let shift = point_shift - mantissa_bits + denormal_digits;
        let mut rounded = match exact {
            Some(q) => self.policy.divide(q.dividend, q.divisor << shift, negative),
            None => self.policy.divide(significand, 1_u64 << shift, negative),
        };
        if rounded >= 1_u64 << (mantissa_bits - denormal_digits + 1) {
            // rounding carried into a new leading bit
            exponent += 1;
            if exponent >= format.max_exponent {
                return self.overflow(negative);
            }
            rounded >>= 1;
        }
        rounded <<= denormal_digits;

        FloatValue {
            format,
            sign: negative,
            exponent,
            mantissa: rounded as u32 & format.mantissa_mask(),
            is_zero: false,
        }
    }

    fn overflow(&self, negative: bool) -> FloatValue {
        let to_infinity = match self.policy {
            RoundingPolicy::TowardZero => false,
            RoundingPolicy::NearestEven => true,
            RoundingPolicy::TowardPositive => !negative,
            RoundingPolicy::TowardNegative => negative,
        };
        debug!(negative, to_infinity, "overflow");
        if to_infinity {
            FloatValue::infinity(self.format, negative)
        } else {
            FloatValue::max_finite(self.format, negative)
        }
    }

    /// Resolves a non-zero result below the smallest subnormal. `sticky`
    /// records whether any bit below the leading one was set.
    fn underflow(&self, negative: bool, exponent: i32, sticky: bool) -> FloatValue {
        let to_min = match self.policy {
            RoundingPolicy::TowardZero => false,
            // only a value above half the smallest subnormal rounds up to it
            RoundingPolicy::NearestEven => {
                exponent == self.format.min_finite_exponent() - 1 && sticky
            }
            RoundingPolicy::TowardPositive => !negative,
            RoundingPolicy::TowardNegative => negative,
        };
        debug!(negative, exponent, sticky, to_min, "underflow");
        if to_min {
            FloatValue::min_finite(self.format, negative)
        } else {
            FloatValue::zero(self.format, negative)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::float::{HALF, SINGLE};

    fn compute(tag: &str, policy: u8, lhs: &str, op: &str, rhs: &str) -> String {
        let format = FloatFormat::from_tag(tag).unwrap();
        let engine = FloatingPoint::new(format, RoundingPolicy::from_digit(policy).unwrap());
        let lhs = engine.decode(lhs).unwrap();
        let rhs = engine.decode(rhs).unwrap();
        engine.apply(lhs, Some((op.parse::<Operator>().unwrap(), rhs))).render()
    }

    fn check(cases: &[(&str, u8, &str, &str, &str, &str)]) {
        for (tag, policy, lhs, op, rhs, expected) in cases {
            let result = compute(tag, *policy, lhs, op, rhs);
            assert_eq!(
                &result, expected,
                "{} {} {} {} {}",
                tag, policy, lhs, op, rhs
            );
        }
    }

    #[test]
    fn test_identity() {
        let engine = FloatingPoint::new(&SINGLE, RoundingPolicy::NearestEven);
        let value = engine.decode("0x7F800000").unwrap();
        assert_eq!(engine.apply(value, None).render(), "inf");

        let engine = FloatingPoint::new(&HALF, RoundingPolicy::TowardZero);
        let value = engine.decode("0x0001").unwrap();
        assert_eq!(engine.apply(value, None).render(), "0x1.000p-24");
    }

    #[test]
    fn test_basic_arithmetic() {
        check(&[
            ("h", 1, "0x3C00", "*", "0x4000", "0x1.000p+1"),
            ("h", 1, "0x3C00", "+", "0x3800", "0x1.800p+0"),
            ("h", 1, "0x3C00", "/", "0x4200", "0x1.554p-2"),
            ("h", 1, "0x4200", "-", "0x3C00", "0x1.000p+1"),
            ("f", 1, "0x3F800000", "+", "0x3F800000", "0x1.000000p+1"),
            ("f", 1, "0x40400000", "*", "0xC0000000", "-0x1.800000p+2"),
            ("f", 1, "0x3F800000", "-", "0x40000000", "-0x1.000000p+0"),
            ("f", 1, "0x3F800000", "/", "0x40400000", "0x1.555556p-2"),
            ("f", 0, "0x3F800000", "/", "0x40400000", "0x1.555554p-2"),
            ("f", 2, "0x3F800000", "/", "0x40400000", "0x1.555556p-2"),
            ("f", 3, "0x3F800000", "/", "0x40400000", "0x1.555554p-2"),
            ("f", 2, "0xBF800000", "/", "0x40400000", "-0x1.555554p-2"),
            ("f", 3, "0xBF800000", "/", "0x40400000", "-0x1.555556p-2"),
        ]);
    }

    #[test]
    fn test_cancellation() {
        check(&[
            ("f", 0, "0x3F800000", "-", "0x3F800000", "0x0.000000p+0"),
            ("f", 1, "0x3F800000", "-", "0x3F800000", "0x0.000000p+0"),
            ("f", 2, "0x3F800000", "-", "0x3F800000", "0x0.000000p+0"),
            ("f", 3, "0x3F800000", "-", "0x3F800000", "-0x0.000000p+0"),
            ("h", 3, "0x3C00", "+", "0xBC00", "-0x0.000p+0"),
            ("f", 1, "0x00000000", "+", "0x80000000", "0x0.000000p+0"),
            ("f", 1, "0x80000000", "+", "0x80000000", "-0x0.000000p+0"),
            ("f", 1, "0x80000000", "+", "0x3F800000", "0x1.000000p+0"),
            // a zero does not cancel 2^-127 even though the fields match
            ("f", 1, "0x00000000", "+", "0x80400000", "-0x1.000000p-127"),
        ]);
    }

    #[test]
    fn test_special_operands() {
        check(&[
            ("f", 1, "0x7FC00000", "+", "0x3F800000", "nan"),
            ("f", 1, "0x3F800000", "*", "0x7FC00000", "nan"),
            ("f", 1, "0xFFC00000", "/", "0x00000000", "nan"),
            ("f", 1, "0x7F800000", "-", "0x7F800000", "nan"),
            ("f", 1, "0x7F800000", "+", "0xFF800000", "nan"),
            ("f", 1, "0x7F800000", "+", "0x7F800000", "inf"),
            ("f", 1, "0xFF800000", "+", "0x3F800000", "-inf"),
            ("f", 1, "0x3F800000", "-", "0x7F800000", "-inf"),
            ("f", 1, "0x00000000", "*", "0x7F800000", "nan"),
            ("f", 1, "0xFF800000", "*", "0x3F800000", "-inf"),
            ("f", 1, "0xFF800000", "*", "0xBF800000", "inf"),
            ("f", 1, "0x80000000", "*", "0x3F800000", "-0x0.000000p+0"),
            ("f", 1, "0x00000000", "/", "0x00000000", "nan"),
            ("f", 1, "0x7F800000", "/", "0x7F800000", "nan"),
            ("f", 1, "0x3F800000", "/", "0x00000000", "inf"),
            ("f", 1, "0xBF800000", "/", "0x00000000", "-inf"),
            ("f", 1, "0x3F800000", "/", "0x80000000", "-inf"),
            ("f", 1, "0x7F800000", "/", "0x3F800000", "inf"),
            ("f", 1, "0x80000000", "/", "0x3F800000", "-0x0.000000p+0"),
            ("f", 1, "0x3F800000", "/", "0xFF800000", "-0x0.000000p+0"),
            ("h", 1, "0x7C00", "*", "0x0000", "nan"),
            ("h", 1, "0xFC00", "/", "0x0000", "-inf"),
        ]);
    }

    #[test]
    fn test_overflow() {
        check(&[
            ("f", 0, "0x7F7FFFFF", "*", "0x40000000", "0x1.fffffep+127"),
            ("f", 1, "0x7F7FFFFF", "*", "0x40000000", "inf"),
            ("f", 2, "0x7F7FFFFF", "*", "0x40000000", "inf"),
            ("f", 3, "0x7F7FFFFF", "*", "0x40000000", "0x1.fffffep+127"),
            ("f", 0, "0xFF7FFFFF", "*", "0x40000000", "-0x1.fffffep+127"),
            ("f", 1, "0xFF7FFFFF", "*", "0x40000000", "-inf"),
            ("f", 2, "0xFF7FFFFF", "*", "0x40000000", "-0x1.fffffep+127"),
            ("f", 3, "0xFF7FFFFF", "*", "0x40000000", "-inf"),
            ("f", 1, "0x7F7FFFFF", "+", "0x7F7FFFFF", "inf"),
            ("f", 0, "0x7F7FFFFF", "+", "0x7F7FFFFF", "0x1.fffffep+127"),
            // exactly half a unit above the largest finite: ties to even carries out
            ("f", 1, "0x7F7FFFFF", "+", "0x73000000", "inf"),
            ("f", 0, "0x7F7FFFFF", "+", "0x73000000", "0x1.fffffep+127"),
            ("f", 1, "0x7F7FFFFF", "/", "0x3F000000", "inf"),
            ("h", 1, "0x7BFF", "+", "0x7BFF", "inf"),
            ("h", 0, "0x7BFF", "+", "0x7BFF", "0x1.ffcp+15"),
        ]);
    }

    #[test]
    fn test_underflow() {
        check(&[
            // exactly half the smallest subnormal ties to zero
            ("f", 1, "0x00000001", "*", "0x3F000000", "0x0.000000p+0"),
            ("f", 0, "0x00000001", "*", "0x3F000000", "0x0.000000p+0"),
            ("f", 2, "0x00000001", "*", "0x3F000000", "0x1.000000p-149"),
            ("f", 3, "0x00000001", "*", "0x3F000000", "0x0.000000p+0"),
            ("f", 2, "0x80000001", "*", "0x3F000000", "-0x0.000000p+0"),
            ("f", 3, "0x80000001", "*", "0x3F000000", "-0x1.000000p-149"),
            ("f", 1, "0x00000001", "*", "0x3F400000", "0x1.000000p-149"),
            ("f", 1, "0x00000001", "*", "0x3E800000", "0x0.000000p+0"),
            ("f", 1, "0x00000001", "/", "0x40000000", "0x0.000000p+0"),
            ("f", 1, "0x00000001", "/", "0x3FC00000", "0x1.000000p-149"),
            ("h", 1, "0x0001", "*", "0x3800", "0x0.000p+0"),
            ("h", 2, "0x0001", "*", "0x3800", "0x1.000p-24"),
        ]);
    }

    #[test]
    fn test_subnormal_results() {
        check(&[
            ("f", 1, "0x00800000", "*", "0x3F000000", "0x1.000000p-127"),
            ("f", 1, "0x00000001", "+", "0x00000001", "0x1.000000p-148"),
            ("f", 1, "0x007FFFFF", "+", "0x00000001", "0x1.000000p-126"),
            ("f", 1, "0x00800000", "-", "0x00000001", "0x1.fffffcp-127"),
            ("f", 1, "0x00000003", "*", "0x3F000000", "0x1.000000p-148"),
            ("f", 0, "0x00000003", "*", "0x3F000000", "0x1.000000p-149"),
            ("h", 1, "0x0400", "/", "0x4000", "0x1.000p-15"),
        ]);
    }

    #[test]
    fn test_negligible_addend() {
        check(&[
            ("f", 0, "0x3F800000", "+", "0x30800000", "0x1.000000p+0"),
            ("f", 1, "0x3F800000", "+", "0x30800000", "0x1.000000p+0"),
            ("f", 2, "0x3F800000", "+", "0x30800000", "0x1.000002p+0"),
            ("f", 3, "0x3F800000", "+", "0x30800000", "0x1.000000p+0"),
            ("f", 0, "0x3F800000", "-", "0x30800000", "0x1.fffffep-1"),
            ("f", 1, "0x3F800000", "-", "0x30800000", "0x1.000000p+0"),
            ("f", 2, "0x3F800000", "-", "0x30800000", "0x1.000000p+0"),
            ("f", 3, "0x3F800000", "-", "0x30800000", "0x1.fffffep-1"),
            ("f", 2, "0xBF800000", "+", "0x30800000", "-0x1.fffffep-1"),
            ("f", 3, "0xBF800000", "-", "0x30800000", "-0x1.000002p+0"),
            ("f", 0, "0x3FC00000", "-", "0x30800000", "0x1.7ffffep+0"),
            ("f", 2, "0x7F7FFFFF", "+", "0x3F800000", "inf"),
            ("f", 3, "0x7F7FFFFF", "+", "0x3F800000", "0x1.fffffep+127"),
            ("h", 2, "0x3C00", "+", "0x0001", "0x1.004p+0"),
        ]);
    }
}
