//! The line-oriented text syntax shared by vCard 2.1, 3.0 and 4.0.

pub mod lexer;
mod reader;
mod writer;

pub use reader::{MAX_NESTING, TextReader};
pub use writer::{TextOptions, TextWriter};

use crate::core::VCard;
use crate::error::VCardResult;
use crate::io::{CardReader, CardWriter};

/// Reads every card in `input`, discarding warnings.
///
/// ## Errors
/// Returns an error only if reading fails outright.
pub fn read_str(input: &str) -> VCardResult<Vec<VCard>> {
    TextReader::new(input.as_bytes()).read_all()
}

/// Writes `cards` to a string with the given options.
///
/// ## Errors
/// Returns an error if a card cannot be written.
pub fn write_string(cards: &[VCard], options: TextOptions) -> VCardResult<String> {
    let mut writer = TextWriter::with_options(Vec::new(), options);
    writer.write_all(cards)?;
    writer.finish()?;
    Ok(String::from_utf8_lossy(&writer.into_inner()).into_owned())
}
