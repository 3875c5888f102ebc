//! Error types

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("expected 3 or 5 arguments, got {0}")]
    ArgumentCount(usize),

    #[error("unparseable arguments: {0}")]
    Usage(String),

    #[error("invalid floating-point mode `{0}` (must be `f` or `h`)")]
    InvalidMode(String),

    #[error("invalid hex literal `{0}`")]
    InvalidHex(String),

    #[error("invalid fixed-point format `{0}` (expected `<integer>.<fractional>`)")]
    InvalidFormat(String),

    #[error("fixed-point width {0} is out of range (must be 1-32 bits)")]
    WidthOverflow(u32),

    #[error("invalid rounding policy `{0}` (must be 0-3)")]
    InvalidRounding(String),

    #[error("invalid operator `{0}` (must be one of + - * /)")]
    InvalidOperator(String),

    #[error("division by zero")]
    DivisionByZero,
}

impl Error {
    /// Domain errors come out of the arithmetic itself; everything else is
    /// a malformed argument rejected before any arithmetic runs.
    pub fn is_domain(&self) -> bool {
        matches!(self, Error::DivisionByZero)
    }
}

pub type Result<T> = std::result::Result<T, Error>;
