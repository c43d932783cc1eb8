//! Per-field selection of a conversion routine and its effective format.

use tracing::trace;

use crate::{
    catalog::{ConfigError, DeclaredType, FieldSpec, SemanticType},
    convert::{
        self, Routine, boolean,
        datetime::{self, DatePattern},
        number,
    },
};

/// Formats used by fields that do not declare their own.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct DefaultFormats {
    /// Integer and decimal fields.
    pub number: String,
    /// Boolean fields, as `true;blank;false` literals.
    pub boolean: String,
    /// Date/time fields.
    pub date_time: String,
}

impl Default for DefaultFormats {
    fn default() -> Self {
        Self {
            number: "0.00".to_string(),
            boolean: "1; ;0".to_string(),
            date_time: "yyyyMMdd".to_string(),
        }
    }
}

impl DefaultFormats {
    pub fn with_number(mut self, format: impl Into<String>) -> Self {
        self.number = format.into();
        self
    }

    pub fn with_boolean(mut self, format: impl Into<String>) -> Self {
        self.boolean = format.into();
        self
    }

    pub fn with_date_time(mut self, format: impl Into<String>) -> Self {
        self.date_time = format.into();
        self
    }
}

/// The routine and effective format for one field.
#[derive(Debug, Clone)]
pub struct ResolvedConverter {
    pub routine: Routine,
    pub semantic: SemanticType,
    pub nullable: bool,
    /// The explicit format if declared, else the type's default. Empty for
    /// types that take no format.
    pub format: String,
    pub(crate) pattern: Option<DatePattern>,
}

/// Select a field's routine and freeze its effective format.
pub fn resolve(
    field: &FieldSpec,
    defaults: &DefaultFormats,
) -> Result<ResolvedConverter, ConfigError> {
    let (semantic, nullable) = match &field.declared {
        DeclaredType::Known { semantic, nullable } => (*semantic, *nullable),
        DeclaredType::Other(type_name) => Err(ConfigError::UnsupportedType {
            field: field.identifier.clone(),
            type_name: type_name.clone(),
        })?,
    };

    let or_default = |default: &String| field.format.clone().unwrap_or_else(|| default.clone());

    let routine: Routine = match semantic {
        SemanticType::String => convert::text,
        SemanticType::Char => convert::character,
        SemanticType::Int32 | SemanticType::Int64 => number::integer,
        SemanticType::Decimal | SemanticType::Float | SemanticType::Double => number::decimal,
        SemanticType::Boolean => boolean::parse,
        SemanticType::DateTime => datetime::parse,
    };

    let format = match semantic {
        SemanticType::String | SemanticType::Char => field.format.clone().unwrap_or_default(),
        SemanticType::Boolean => or_default(&defaults.boolean),
        SemanticType::DateTime => or_default(&defaults.date_time),
        _ => or_default(&defaults.number),
    };

    let pattern = if semantic == SemanticType::DateTime {
        let pattern = DatePattern::compile(&format).map_err(|reason| {
            ConfigError::InvalidFormat {
                field: field.identifier.clone(),
                format: format.clone(),
                reason,
            }
        })?;
        Some(pattern)
    } else {
        None
    };

    trace!(
        field = %field.identifier,
        kind = %semantic,
        nullable,
        format = %format,
        "Resolved field converter"
    );

    Ok(ResolvedConverter {
        routine,
        semantic,
        nullable,
        format,
        pattern,
    })
}

/// Resolve a converter for a routine test without declaring a field.
#[cfg(test)]
pub(crate) fn test_converter(semantic: SemanticType, format: &str) -> ResolvedConverter {
    let field = FieldSpec::new("test", DeclaredType::required(semantic), 1, 1).with_format(format);
    match resolve(&field, &DefaultFormats::default()) {
        Ok(c) => c,
        Err(err) => panic!("{err}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_format_wins() {
        let field = FieldSpec::new("amount", DeclaredType::required(SemanticType::Decimal), 1, 5)
            .with_format("0;00");
        let c = resolve(&field, &DefaultFormats::default()).unwrap();
        assert_eq!(c.format, "0;00");
    }

    #[test]
    fn defaults_by_category() {
        let defaults = DefaultFormats::default()
            .with_number("0;000")
            .with_date_time("ddMMyyyy");

        let cases = [
            (SemanticType::Int32, "0;000"),
            (SemanticType::Int64, "0;000"),
            (SemanticType::Double, "0;000"),
            (SemanticType::Boolean, "1; ;0"),
            (SemanticType::DateTime, "ddMMyyyy"),
            (SemanticType::String, ""),
        ];

        for (semantic, expected) in cases {
            let field = FieldSpec::new("f", DeclaredType::nullable(semantic), 1, 1);
            let c = resolve(&field, &defaults).unwrap();
            assert_eq!(c.format, expected, "{semantic}");
            assert!(c.nullable);
        }
    }

    #[test]
    fn unsupported_type_is_rejected() {
        let field = FieldSpec::new("flags", DeclaredType::Other("u8".to_string()), 1, 1);
        let err = resolve(&field, &DefaultFormats::default()).unwrap_err();
        assert_eq!(
            err,
            ConfigError::UnsupportedType {
                field: "flags".to_string(),
                type_name: "u8".to_string()
            }
        );
    }

    #[test]
    fn invalid_date_pattern_is_rejected() {
        let field = FieldSpec::new("when", DeclaredType::required(SemanticType::DateTime), 1, 8)
            .with_format("MMdd");
        let err = resolve(&field, &DefaultFormats::default()).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidFormat { .. }));
    }
}
