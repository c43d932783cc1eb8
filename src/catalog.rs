//! Field declarations and the ordered catalog built from them.

use std::{collections::HashSet, fmt};

use thiserror::Error;

/// Target value type of a field after conversion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SemanticType {
    String,
    Char,
    Int32,
    Int64,
    Decimal,
    Float,
    Double,
    Boolean,
    DateTime,
}

impl SemanticType {
    /// Whether an empty value may be stored without a nullable wrapper.
    pub fn accepts_blank(self) -> bool {
        self == Self::String
    }
}

impl fmt::Display for SemanticType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::String => "String",
            Self::Char => "Char",
            Self::Int32 => "Int32",
            Self::Int64 => "Int64",
            Self::Decimal => "Decimal",
            Self::Float => "Float",
            Self::Double => "Double",
            Self::Boolean => "Boolean",
            Self::DateTime => "DateTime",
        };
        f.write_str(name)
    }
}

/// The type a record declares for a field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeclaredType {
    /// A type with a conversion routine, possibly wrapped in `Option`.
    Known { semantic: SemanticType, nullable: bool },
    /// Any other type, named for diagnostics. Rejected when a decoder is built.
    Other(String),
}

impl DeclaredType {
    pub fn required(semantic: SemanticType) -> Self {
        Self::Known {
            semantic,
            nullable: false,
        }
    }

    pub fn nullable(semantic: SemanticType) -> Self {
        Self::Known {
            semantic,
            nullable: true,
        }
    }
}

/// Position and format metadata for one record field.
///
/// `start` is 1-based and counts characters. A `length` of zero declares a
/// marker field, which is never assigned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldSpec {
    pub identifier: String,
    pub declared: DeclaredType,
    pub start: usize,
    pub length: usize,
    pub format: Option<String>,
}

impl FieldSpec {
    pub fn new(
        identifier: impl Into<String>,
        declared: DeclaredType,
        start: usize,
        length: usize,
    ) -> Self {
        Self {
            identifier: identifier.into(),
            declared,
            start,
            length,
            format: None,
        }
    }

    /// Attach an explicit format, overriding the type's default.
    pub fn with_format(mut self, format: impl Into<String>) -> Self {
        self.format = Some(format.into());
        self
    }

    /// Zero-based character range covered by the field, if representable.
    pub fn range(&self) -> Option<(usize, usize)> {
        let from = self.start.checked_sub(1)?;
        Some((from, from.checked_add(self.length)?))
    }
}

/// Errors in a record's field declarations, found while building a decoder.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// The same identifier was declared for more than one field.
    #[error("Field `{field}` is declared more than once.")]
    DuplicateField { field: String },
    /// A field starts before the first position.
    #[error("Field `{field}` must start at position 1 or later.")]
    InvalidStart { field: String },
    /// A field's end position overflows.
    #[error("Field `{field}` extends past the largest representable position.")]
    InvalidLength { field: String },
    /// No conversion routine exists for a field's type.
    #[error("Field `{field}` has unsupported type `{type_name}`.")]
    UnsupportedType { field: String, type_name: String },
    /// A date/time pattern could not be compiled.
    #[error("Field `{field}` has invalid date/time format `{format}`: {reason}.")]
    InvalidFormat {
        field: String,
        format: String,
        reason: String,
    },
}

/// Field declarations of one record type, ordered by start position.
#[derive(Debug, Clone)]
pub struct FieldCatalog(Vec<FieldSpec>);

impl FieldCatalog {
    /// Validate declarations and order them ascending by `start`.
    ///
    /// The sort is stable, so fields sharing a start keep declaration order.
    pub fn build(mut fields: Vec<FieldSpec>) -> Result<Self, ConfigError> {
        let mut seen = HashSet::new();

        for field in &fields {
            if field.start == 0 {
                Err(ConfigError::InvalidStart {
                    field: field.identifier.clone(),
                })?
            }

            if field.range().is_none() {
                Err(ConfigError::InvalidLength {
                    field: field.identifier.clone(),
                })?
            }

            if !seen.insert(field.identifier.clone()) {
                Err(ConfigError::DuplicateField {
                    field: field.identifier.clone(),
                })?
            }
        }

        fields.sort_by_key(|f| f.start);

        Ok(Self(fields))
    }

    pub fn iter(&self) -> impl Iterator<Item = &FieldSpec> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec(id: &str, start: usize) -> FieldSpec {
        FieldSpec::new(id, DeclaredType::required(SemanticType::String), start, 2)
    }

    #[test]
    fn orders_by_start_regardless_of_declaration() {
        let catalog =
            FieldCatalog::build(vec![spec("c", 9), spec("a", 1), spec("b", 4)]).unwrap();
        let ids: Vec<_> = catalog.iter().map(|f| f.identifier.as_str()).collect();
        assert_eq!(ids, ["a", "b", "c"]);
    }

    #[test]
    fn shared_start_keeps_declaration_order() {
        let catalog =
            FieldCatalog::build(vec![spec("late", 5), spec("x", 1), spec("y", 1)]).unwrap();
        let ids: Vec<_> = catalog.iter().map(|f| f.identifier.as_str()).collect();
        assert_eq!(ids, ["x", "y", "late"]);
    }

    #[test]
    fn rejects_duplicate_identifier() {
        let err = FieldCatalog::build(vec![spec("a", 1), spec("a", 3)]).unwrap_err();
        assert_eq!(
            err,
            ConfigError::DuplicateField {
                field: "a".to_string()
            }
        );
    }

    #[test]
    fn rejects_zero_start() {
        let err = FieldCatalog::build(vec![spec("a", 0)]).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidStart { .. }));
        assert_eq!(spec("a", 0).range(), None);
    }

    #[test]
    fn rejects_overflowing_length() {
        let mut long = spec("a", 2);
        long.length = usize::MAX;
        assert_eq!(long.range(), None);

        let err = FieldCatalog::build(vec![long]).unwrap_err();
        assert_eq!(
            err,
            ConfigError::InvalidLength {
                field: "a".to_string()
            }
        );

        long = spec("b", 1);
        long.length = usize::MAX;
        assert_eq!(long.range(), Some((0, usize::MAX)));
    }
}
