//! Bit-exact arithmetic on hexadecimal bit patterns.
//!
//! This crate emulates two families of binary arithmetic:
//! - [`FixedPoint`] for two's complement fixed-point numbers with a
//!   caller-chosen `integer.fractional` bit split of up to 32 bits
//! - [`FloatingPoint`] for IEEE 754 half and single precision
//!
//! Operands are raw bit patterns written as `0x` hex literals. Each
//! computation decodes one or two operands, optionally applies one of
//! `+ - * /`, and renders the result under one of four [`RoundingPolicy`]s.
//!
//! # Examples
//!
//! ```
//! use hexarith::{FixedPoint, FloatingPoint, RoundingPolicy, HALF};
//!
//! // Fixed point: 5/16 + 3/16 in a 4.4 format
//! let fixed = FixedPoint::new("4.4".parse().unwrap(), RoundingPolicy::NearestEven);
//! assert_eq!(fixed.render(fixed.add(0x05, 0x03)), "0.500");
//!
//! // Floating point: 1.0 * 2.0 in half precision
//! let float = FloatingPoint::new(&HALF, RoundingPolicy::NearestEven);
//! let product = float.mul(float.decode("0x3C00").unwrap(), float.decode("0x4000").unwrap());
//! assert_eq!(product.render(), "0x1.000p+1");
//! ```
//!
//! # Output format
//!
//! Fixed-point results render as `[-]<integer>.<ddd>` with exactly three
//! fractional digits.
//!
//! Floating-point results render as `±0x1.hhhp±d`, where:
//! - `±` is the sign (`-` for negative, omitted for positive)
//! - `h.hhh` is the significand in hexadecimal, always six digits for
//!   single precision and three for half precision
//! - `p±d` is the exponent in decimal (base 2), always signed
//!
//! Special values:
//! - `±0x0.000000p+0` (`±0x0.000p+0` in half precision) for zero
//! - `±inf` for infinity
//! - `nan` for any NaN
//!
//! Subnormal values render normalized, with an exponent below the format's
//! normal range (`0x1.000000p-149` is the smallest single precision value).

mod cli;
mod error;
mod fixed;
mod float;
mod float_ops;
mod hex;
mod op;
mod rounding;

pub use cli::{Cli, Invocation};
pub use error::{Error, Result};
pub use fixed::{FixedFormat, FixedPoint, MAX_WIDTH};
pub use float::{FloatFormat, FloatValue, HALF, SINGLE};
pub use float_ops::FloatingPoint;
pub use hex::decode_hex;
pub use op::Operator;
pub use rounding::RoundingPolicy;
