//! Decoding many lines at once, from text or a reader.

use std::io::{self, BufRead};

use thiserror::Error;
use tracing::debug;

use crate::{FromLine, decoder::LineDecoder};

/// Errors occurring while decoding a sequence of lines.
#[derive(Debug, Error)]
pub enum Error {
    /// An error from the supplied reader.
    #[error(transparent)]
    Io(#[from] io::Error),
    /// A line failed to decode.
    #[error("Line {number}: {source}")]
    Line {
        /// One-based line number.
        number: usize,
        #[source]
        source: crate::decoder::Error,
    },
}

/// Decode every line of a text, yielding one result per line.
///
/// A failing line does not end iteration.
pub fn decode_str<'a, T: FromLine>(
    decoder: &'a LineDecoder<T>,
    text: &'a str,
) -> impl Iterator<Item = Result<T, Error>> {
    text.lines()
        .enumerate()
        .map(move |(i, line)| decode_numbered(decoder, i + 1, line))
}

/// Decode every line from a reader, yielding one result per line.
///
/// Line terminators (`\n` or `\r\n`) are removed before decoding. A failing
/// line does not end iteration. Read errors are yielded as items.
pub fn decode_reader<T: FromLine, R: BufRead>(
    decoder: &LineDecoder<T>,
    r: R,
) -> impl Iterator<Item = Result<T, Error>> {
    r.lines().enumerate().map(move |(i, line)| {
        let line = line?;
        decode_numbered(decoder, i + 1, &line)
    })
}

fn decode_numbered<T: FromLine>(
    decoder: &LineDecoder<T>,
    number: usize,
    line: &str,
) -> Result<T, Error> {
    decoder.decode(line).map_err(|source| {
        debug!(line = number, error = %source, "Failed to decode line");
        Error::Line { number, source }
    })
}
