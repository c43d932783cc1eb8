//! Line decoder implementation.

use std::{fmt, marker::PhantomData};

use thiserror::Error;
use tracing::{debug, trace};

use crate::{
    FromLine,
    catalog::{ConfigError, FieldCatalog, FieldSpec, SemanticType},
    convert::ConvertError,
    resolve::{DefaultFormats, ResolvedConverter, resolve},
};

/// Errors occurring while decoding a line.
#[derive(Debug, Error)]
pub enum Error {
    /// The record's field declarations are invalid.
    #[error("Invalid field configuration: {0}")]
    Configuration(#[from] ConfigError),
    /// The line ends before a field's range.
    #[error(
        "Line of {line_length} characters is too short for field `{field}` at positions {start} to {end}."
    )]
    Range {
        field: String,
        start: usize,
        end: usize,
        line_length: usize,
    },
    /// A value could not be converted to its field's type.
    #[error("Field `{field}` value `{value}` with format `{format}` cannot be converted to {target}.")]
    Conversion {
        field: String,
        value: String,
        format: String,
        target: SemanticType,
        #[source]
        source: ConvertError,
    },
    /// A blank value was found for a field that cannot be left empty.
    #[error("Empty value cannot populate non-nullable field `{field}` of type {target}.")]
    Blank { field: String, target: SemanticType },
}

/// A cataloged field and its resolved converter.
#[derive(Debug)]
struct Slot {
    spec: FieldSpec,
    converter: ResolvedConverter,
}

/// Decoder of fixed-width lines into records of type `T`.
///
/// Field declarations are cataloged and every converter is resolved once, on
/// construction. Decoding borrows the decoder immutably, so one instance can
/// serve any number of lines, from any number of threads.
pub struct LineDecoder<T> {
    slots: Vec<Slot>,
    defaults: DefaultFormats,
    _record: PhantomData<fn() -> T>,
}

impl<T: FromLine> LineDecoder<T> {
    /// Build a decoder using the default formats.
    pub fn new() -> Result<Self, ConfigError> {
        Self::with_defaults(DefaultFormats::default())
    }

    /// Build a decoder, consulting `defaults` for fields without a format.
    pub fn with_defaults(defaults: DefaultFormats) -> Result<Self, ConfigError> {
        let catalog = FieldCatalog::build(T::fields())?;

        let slots = catalog
            .iter()
            .map(|spec| {
                Ok(Slot {
                    converter: resolve(spec, &defaults)?,
                    spec: spec.clone(),
                })
            })
            .collect::<Result<Vec<_>, ConfigError>>()?;

        debug!(
            record = std::any::type_name::<T>(),
            fields = slots.len(),
            "Built line decoder"
        );

        Ok(Self {
            slots,
            defaults,
            _record: PhantomData,
        })
    }

    /// Decode one line into a new record.
    ///
    /// Fields are assigned in ascending start order. Any failure abandons the
    /// whole record.
    pub fn decode(&self, line: &str) -> Result<T, Error> {
        let mut record = T::default();

        for Slot { spec, converter } in &self.slots {
            let raw = slice(line, spec)?;

            if raw.is_empty() {
                continue;
            }

            let value = raw.trim();

            if value.is_empty() {
                if !converter.nullable && !converter.semantic.accepts_blank() {
                    Err(Error::Blank {
                        field: spec.identifier.clone(),
                        target: converter.semantic,
                    })?
                }
                continue;
            }

            let converted = (converter.routine)(value, converter).map_err(|source| {
                Error::Conversion {
                    field: spec.identifier.clone(),
                    value: value.to_string(),
                    format: converter.format.clone(),
                    target: converter.semantic,
                    source,
                }
            })?;

            if let Some(converted) = converted {
                record.set_field(&spec.identifier, converted);
            }
        }

        trace!(length = line.len(), "Decoded line");

        Ok(record)
    }

    /// Fields in decoding order.
    pub fn fields(&self) -> impl Iterator<Item = &FieldSpec> {
        self.slots.iter().map(|s| &s.spec)
    }

    /// The converter resolved for a field, by identifier.
    pub fn converter(&self, identifier: &str) -> Option<&ResolvedConverter> {
        self.slots
            .iter()
            .find(|s| s.spec.identifier == identifier)
            .map(|s| &s.converter)
    }

    pub fn defaults(&self) -> &DefaultFormats {
        &self.defaults
    }
}

impl<T> fmt::Debug for LineDecoder<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LineDecoder")
            .field("slots", &self.slots)
            .field("defaults", &self.defaults)
            .finish()
    }
}

/// Take a field's character range from a line.
fn slice<'a>(line: &'a str, spec: &FieldSpec) -> Result<&'a str, Error> {
    let out_of_range = || Error::Range {
        field: spec.identifier.clone(),
        start: spec.start,
        end: spec.start.saturating_add(spec.length).saturating_sub(1),
        line_length: line.chars().count(),
    };

    let (from, to) = spec.range().ok_or_else(out_of_range)?;

    if line.is_ascii() {
        return line.get(from..to).ok_or_else(out_of_range);
    }

    // Byte offsets of every character boundary, including the end of the line.
    let mut bounds = line
        .char_indices()
        .map(|(i, _)| i)
        .chain(std::iter::once(line.len()));

    let a = bounds.nth(from).ok_or_else(out_of_range)?;
    let b = if to == from {
        a
    } else {
        bounds.nth(to - from - 1).ok_or_else(out_of_range)?
    };

    Ok(&line[a..b])
}
