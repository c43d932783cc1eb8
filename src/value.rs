use chrono::NaiveDateTime;
use rust_decimal::Decimal;

/// A converted field value, ready for assignment into a record.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    String(String),
    Char(char),
    Int32(i32),
    Int64(i64),
    Decimal(Decimal),
    Float(f32),
    Double(f64),
    Boolean(bool),
    DateTime(NaiveDateTime),
}

impl Value {
    /// Extract a typed value, if the variant matches.
    pub fn into_field<T: FromValue>(self) -> Option<T> {
        T::from_value(self)
    }
}

/// Types a [`Value`] can be assigned into.
///
/// Implemented for every supported field type, and for `Option` of each.
pub trait FromValue: Sized {
    fn from_value(value: Value) -> Option<Self>;
}

macro_rules! from_value {
    ($t:ty, $variant:ident) => {
        impl FromValue for $t {
            fn from_value(value: Value) -> Option<Self> {
                match value {
                    Value::$variant(v) => Some(v),
                    _ => None,
                }
            }
        }
    };
}

from_value!(String, String);
from_value!(char, Char);
from_value!(i32, Int32);
from_value!(i64, Int64);
from_value!(Decimal, Decimal);
from_value!(f32, Float);
from_value!(f64, Double);
from_value!(bool, Boolean);
from_value!(NaiveDateTime, DateTime);

impl<T: FromValue> FromValue for Option<T> {
    fn from_value(value: Value) -> Option<Self> {
        T::from_value(value).map(Some)
    }
}
