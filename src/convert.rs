//! Type-specific conversion routines.
//!
//! Each routine receives a trimmed, non-blank value and the converter resolved
//! for its field. Routines return `Ok(None)` only where a value can be
//! legitimately absent, which is the tri-state boolean.

pub mod boolean;
pub mod datetime;
pub mod number;

use std::num::{ParseFloatError, ParseIntError};

use thiserror::Error;

use crate::{resolve::ResolvedConverter, value::Value};

/// Underlying cause of a failed conversion.
#[derive(Debug, Error)]
pub enum ConvertError {
    /// The value was empty where a character was expected.
    #[error("no character present")]
    Empty,
    #[error(transparent)]
    Integer(#[from] ParseIntError),
    /// The parsed integer does not fit the target width.
    #[error("integer out of range")]
    IntegerRange,
    #[error(transparent)]
    Decimal(#[from] rust_decimal::Error),
    #[error(transparent)]
    Float(#[from] ParseFloatError),
    /// The value is not a number in invariant notation.
    #[error("invalid number")]
    Number,
    #[error(transparent)]
    DateTime(#[from] chrono::ParseError),
    /// The value does not fit its date/time pattern position by position.
    #[error("value does not match the date/time pattern")]
    Pattern,
    /// A date/time converter was built without a compiled pattern.
    #[error("no date/time pattern compiled")]
    MissingPattern,
}

/// A conversion routine, selected once per field.
pub type Routine = fn(&str, &ResolvedConverter) -> Result<Option<Value>, ConvertError>;

pub fn text(value: &str, _: &ResolvedConverter) -> Result<Option<Value>, ConvertError> {
    Ok(Some(Value::String(value.to_string())))
}

pub fn character(value: &str, _: &ResolvedConverter) -> Result<Option<Value>, ConvertError> {
    let c = value.chars().next().ok_or(ConvertError::Empty)?;
    Ok(Some(Value::Char(c)))
}
