//! Tri-state boolean routine.
//!
//! The format holds three `;`-separated literals: true, blank, and false. The
//! trimmed value is compared against each untrimmed segment. The first segment
//! decodes to `true`, the third to `false`, and anything else (a match on the
//! blank segment, or no match at all) leaves the field absent.

use crate::{resolve::ResolvedConverter, value::Value};

use super::ConvertError;

pub fn parse(value: &str, c: &ResolvedConverter) -> Result<Option<Value>, ConvertError> {
    let index = c.format.split(';').position(|segment| segment == value);

    Ok(match index {
        Some(0) => Some(Value::Boolean(true)),
        Some(2) => Some(Value::Boolean(false)),
        _ => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{catalog::SemanticType, resolve::test_converter};

    fn convert(value: &str, format: &str) -> Option<Value> {
        let c = test_converter(SemanticType::Boolean, format);
        parse(value, &c).unwrap()
    }

    #[test]
    fn default_literals() {
        assert_eq!(convert("1", "1; ;0"), Some(Value::Boolean(true)));
        assert_eq!(convert("0", "1; ;0"), Some(Value::Boolean(false)));
        assert_eq!(convert(" ", "1; ;0"), None);
        assert_eq!(convert("X", "1; ;0"), None);
    }

    #[test]
    fn custom_literals() {
        assert_eq!(convert("Y", "Y;?;N"), Some(Value::Boolean(true)));
        assert_eq!(convert("N", "Y;?;N"), Some(Value::Boolean(false)));
        assert_eq!(convert("?", "Y;?;N"), None);
        assert_eq!(convert("y", "Y;?;N"), None);
    }

    #[test]
    fn segments_are_not_trimmed() {
        assert_eq!(convert("T", " T;;F"), None);
        assert_eq!(convert("F", " T;;F"), Some(Value::Boolean(false)));
    }

    #[test]
    fn missing_false_segment_is_never_false() {
        assert_eq!(convert("0", "1;0"), None);
    }
}
