//! Command-line arguments and the computation they describe.

use std::ffi::OsString;

use clap::Parser;
use tracing::debug;

use crate::error::{Error, Result};
use crate::fixed::{FixedFormat, FixedPoint};
use crate::float::{FloatFormat, FloatValue};
use crate::float_ops::FloatingPoint;
use crate::op::Operator;
use crate::rounding::RoundingPolicy;

#[derive(Parser, Debug, Clone, PartialEq, Eq)]
#[command(
    name = "hexarith",
    about = "Bit-exact fixed-point and floating-point arithmetic on hex bit patterns",
    long_about = None,
    disable_help_flag = true,
    disable_version_flag = true
)]
pub struct Cli {
    /// `f` (single) or `h` (half) for floating point, `<integer>.<fractional>` bits for fixed point
    #[arg(allow_hyphen_values = true)]
    pub format: String,

    /// 0 toward zero, 1 nearest (ties to even), 2 toward +inf, 3 toward -inf
    #[arg(allow_hyphen_values = true)]
    pub rounding: String,

    /// First operand as a `0x` hex literal
    #[arg(allow_hyphen_values = true)]
    pub lhs: String,

    /// One of `+ - * /`
    #[arg(requires = "rhs", allow_hyphen_values = true)]
    pub operator: Option<String>,

    /// Second operand as a `0x` hex literal
    #[arg(allow_hyphen_values = true)]
    pub rhs: Option<String>,
}

impl Cli {
    fn arg_count(&self) -> usize {
        3 + self.operator.is_some() as usize + self.rhs.is_some() as usize
    }
}

/// A fully validated computation: engine, decoded operands and operator.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Invocation {
    Fixed {
        engine: FixedPoint,
        lhs: u32,
        rhs: Option<(Operator, u32)>,
    },
    Float {
        engine: FloatingPoint,
        lhs: FloatValue,
        rhs: Option<(Operator, FloatValue)>,
    },
}

impl Invocation {
    /// Parses a full argument list, program name first.
    ///
    /// Every word after the program name is a positional value, so
    /// flag-shaped words like `-h` are rejected by the field they land in.
    ///
    /// # Examples
    ///
    /// ```
    /// use hexarith::Invocation;
    ///
    /// let invocation = Invocation::from_args(["hexarith", "4.4", "1", "0x05", "+", "0x03"]).unwrap();
    /// assert_eq!(invocation.evaluate().unwrap(), "0.500");
    /// ```
    pub fn from_args<I, T>(args: I) -> Result<Self>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        let args: Vec<OsString> = args.into_iter().map(Into::into).collect();
        let count = args.len().saturating_sub(1);
        if count != 3 && count != 5 {
            return Err(Error::ArgumentCount(count));
        }
        let cli = Cli::try_parse_from(args).map_err(|err| {
            debug!(kind = ?err.kind(), "argument parsing failed");
            Error::Usage(err.kind().to_string())
        })?;
        Self::try_from(cli)
    }

    /// Runs the computation and renders the result.
    ///
    /// The only error is a fixed-point division by zero.
    pub fn evaluate(&self) -> Result<String> {
        match self {
            Invocation::Fixed { engine, lhs, rhs } => {
                let result = engine.apply(*lhs, *rhs)?;
                Ok(engine.render(result))
            }
            Invocation::Float { engine, lhs, rhs } => Ok(engine.apply(*lhs, *rhs).render()),
        }
    }
}

impl TryFrom<Cli> for Invocation {
    type Error = Error;

    fn try_from(cli: Cli) -> Result<Self> {
        let operator = match (&cli.operator, &cli.rhs) {
            (Some(op), Some(_)) => Some(op.as_str()),
            (None, None) => None,
            _ => return Err(Error::ArgumentCount(cli.arg_count())),
        };

        // a one-character selector always means floating point
        if cli.format.chars().count() == 1 {
            let format = FloatFormat::from_tag(&cli.format)?;
            let engine = FloatingPoint::new(format, cli.rounding.parse::<RoundingPolicy>()?);
            let lhs = engine.decode(&cli.lhs)?;
            let rhs = match (operator, &cli.rhs) {
                (Some(op), Some(rhs)) => Some((op.parse::<Operator>()?, engine.decode(rhs)?)),
                _ => None,
            };
            debug!(format = %format.tag(), policy = ?engine.policy(), "floating-point mode");
            Ok(Invocation::Float { engine, lhs, rhs })
        } else {
            let format: FixedFormat = cli.format.parse()?;
            let policy: RoundingPolicy = cli.rounding.parse()?;
            let engine = FixedPoint::new(format, policy);
            let lhs = engine.decode(&cli.lhs)?;
            let rhs = match (operator, &cli.rhs) {
                (Some(op), Some(rhs)) => Some((op.parse::<Operator>()?, engine.decode(rhs)?)),
                _ => None,
            };
            debug!(?format, ?policy, "fixed-point mode");
            Ok(Invocation::Fixed { engine, lhs, rhs })
        }
    }
}
