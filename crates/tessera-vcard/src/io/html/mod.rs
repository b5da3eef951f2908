//! hCard, the HTML microformat for vCard.
//!
//! Properties are elements carrying a class named after the property
//! (`fn`, `tel`, `adr`, ...) somewhere inside an element with the `vcard`
//! class. Values are read and written with vCard 3.0 rules.

mod reader;
mod writer;

pub use reader::HtmlReader;
pub use writer::HtmlWriter;

use crate::core::VCard;
use crate::error::VCardResult;
use crate::io::{CardReader, CardWriter};

/// Class marking the root element of a card.
pub const CARD_CLASS: &str = "vcard";

/// Reads every hCard on a page, discarding warnings.
///
/// ## Errors
/// Returns an error only if reading the input fails.
pub fn read_str(input: &str) -> VCardResult<Vec<VCard>> {
    HtmlReader::new(input.as_bytes()).read_all()
}

/// Writes `cards` as consecutive hCard fragments.
///
/// ## Errors
/// Returns an error if a card cannot be written.
pub fn write_string(cards: &[VCard]) -> VCardResult<String> {
    let mut writer = HtmlWriter::new(Vec::new());
    writer.write_all(cards)?;
    writer.finish()?;
    Ok(String::from_utf8_lossy(&writer.into_inner()).into_owned())
}
