//! A decoder for fixed-width text lines into strongly typed records.
//!
//! A record type declares, per field, a character range (1-based start and
//! length) and an optional format. A [`LineDecoder`] catalogs those
//! declarations once, resolves a conversion routine for every field, and then
//! slices, trims and converts each line it is given.
//!
//! Most users should begin with the [`FromLine`](macro@FromLine) derive macro
//! and [`LineDecoder::decode`]. For decoding whole files, see the [`reader`]
//! module.
//!
//! ## Cargo Features
//!
//! The following crate feature flags are available:
//!
//! - `derive`: enable the derive macro (default).
//! - `serde`: implement `Serialize` and `Deserialize` for [`DefaultFormats`].

pub mod catalog;
pub mod convert;
pub mod decoder;
pub mod reader;
pub mod resolve;
mod value;

pub use catalog::{ConfigError, DeclaredType, FieldCatalog, FieldSpec, SemanticType};
pub use decoder::{Error, LineDecoder};
pub use resolve::{DefaultFormats, ResolvedConverter};
pub use value::{FromValue, Value};

pub use chrono::NaiveDateTime;
pub use rust_decimal::Decimal;

/// Derive [`FromLine`] for a struct representing one line.
///
/// _Requires Cargo feature `derive`._
///
/// # Examples
///
/// Add the `field(START, LENGTH)` attribute to each struct field taking part
/// in decoding, where `START` is the 1-based position of its first character.
/// An explicit format may follow as a string literal. Fields without the
/// attribute keep their default value.
///
/// ```
/// #[derive(Debug, Default, FromLine)]
/// struct Payment {
///     #[field(1, 8)]
///     account: String,
///     #[field(9, 7, "0;00")]
///     amount: Decimal,
///     #[field(16, 8)]
///     booked: Option<NaiveDateTime>,
///     #[field(24, 1)]
///     reversed: Option<bool>,
/// }
/// ```
///
/// Supported types are `String`, `char`, `i32`, `i64`, [`Decimal`], `f32`,
/// `f64`, `bool` and [`NaiveDateTime`], each optionally wrapped in `Option`.
/// A blank value leaves an `Option` (or `String`) field untouched, and is an
/// error for any other type.
#[cfg(feature = "derive")]
pub use fixwidth_derive::FromLine;

/// Describe and receive the fields of a record decoded from one line.
///
/// See the [`FromLine`](macro@FromLine) derive macro for an automatic
/// implementation of this trait.
pub trait FromLine: Default {
    /// Declare the fields taking part in decoding, in any order.
    fn fields() -> Vec<FieldSpec>;

    /// Assign a converted value to a field, by identifier.
    ///
    /// Implementations should ignore unknown identifiers and values of an
    /// unexpected variant.
    fn set_field(&mut self, field: &str, value: Value);
}
