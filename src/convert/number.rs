//! Integer and decimal routines.
//!
//! A minus sign anywhere in the value negates it, so fixed-width columns may
//! carry the sign in leading, trailing, or embedded position. Formats
//! containing `;` mark an implicit decimal point `format length - 2` digits
//! from the right.

use std::{borrow::Cow, num::ParseFloatError, str::FromStr};

use rust_decimal::Decimal;

use crate::{catalog::SemanticType, resolve::ResolvedConverter, value::Value};

use super::ConvertError;

pub fn integer(value: &str, c: &ResolvedConverter) -> Result<Option<Value>, ConvertError> {
    let (negative, digits) = strip_sign(value);

    let magnitude = i128::from(digits.trim().parse::<u64>()?);
    let signed = if negative { -magnitude } else { magnitude };

    let value = match c.semantic {
        SemanticType::Int32 => {
            Value::Int32(i32::try_from(signed).map_err(|_| ConvertError::IntegerRange)?)
        }
        _ => Value::Int64(i64::try_from(signed).map_err(|_| ConvertError::IntegerRange)?),
    };

    Ok(Some(value))
}

pub fn decimal(value: &str, c: &ResolvedConverter) -> Result<Option<Value>, ConvertError> {
    let (negative, digits) = strip_sign(value);
    let digits = digits.trim();
    let shift = implied_shift(&c.format);

    let value = match c.semantic {
        SemanticType::Float => {
            let mut v = parse_float::<f32>(digits)?;
            if negative {
                v = -v;
            }
            if let Some(shift) = shift {
                v /= 10f32.powi(shift);
            }
            Value::Float(v)
        }
        SemanticType::Double => {
            let mut v = parse_float::<f64>(digits)?;
            if negative {
                v = -v;
            }
            if let Some(shift) = shift {
                v /= 10f64.powi(shift);
            }
            Value::Double(v)
        }
        _ => {
            if !digits.bytes().all(|b| b.is_ascii_digit() || matches!(b, b'.' | b'+')) {
                Err(ConvertError::Number)?
            }
            let mut v = digits.parse::<Decimal>()?;
            if negative {
                v.set_sign_negative(true);
            }
            if let Some(shift) = shift {
                v = shift_decimal(v, shift)?;
            }
            Value::Decimal(v)
        }
    };

    Ok(Some(value))
}

/// Parse a float in invariant notation. Only `Infinity` and `NaN` are
/// accepted as words; `str::parse` would also take `inf` or `nan` in any case.
fn parse_float<F: FromStr<Err = ParseFloatError>>(digits: &str) -> Result<F, ConvertError> {
    let numeric = digits
        .bytes()
        .all(|b| b.is_ascii_digit() || matches!(b, b'.' | b'+' | b'e' | b'E'));

    if !numeric && !matches!(digits, "Infinity" | "NaN") {
        Err(ConvertError::Number)?
    }

    Ok(digits.parse()?)
}

/// Remove every minus sign, reporting whether one was present.
fn strip_sign(value: &str) -> (bool, Cow<'_, str>) {
    if value.contains('-') {
        (true, Cow::Owned(value.replace('-', "")))
    } else {
        (false, Cow::Borrowed(value))
    }
}

/// Power of ten an implicit-point format divides by, if the format has one.
fn implied_shift(format: &str) -> Option<i32> {
    if format.contains(';') {
        Some(format.chars().count() as i32 - 2)
    } else {
        None
    }
}

/// Divide exactly by `10^shift` by moving the decimal scale.
fn shift_decimal(mut v: Decimal, shift: i32) -> Result<Decimal, ConvertError> {
    if shift >= 0 {
        v.set_scale(v.scale() + shift as u32)?;
        Ok(v)
    } else {
        let factor = Decimal::from_i128_with_scale(10i128.pow(shift.unsigned_abs()), 0);
        v.checked_mul(factor)
            .ok_or(ConvertError::Decimal(rust_decimal::Error::ExceedsMaximumPossibleValue))
    }
}
