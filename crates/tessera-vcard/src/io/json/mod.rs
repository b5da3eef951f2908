//! jCard, the JSON syntax of vCard 4.0 (RFC 7095).
//!
//! A card is `["vcard", [property, ...]]` and a property is
//! `[name, {parameters}, data-type, value, ...]`. The property group travels
//! as a `group` parameter.

mod reader;
mod writer;

pub use reader::JsonReader;
pub use writer::JsonWriter;

use crate::core::VCard;
use crate::error::VCardResult;
use crate::io::{CardReader, CardWriter};

const VCARD_TAG: &str = "vcard";
const GROUP_PARAMETER: &str = "group";
const UNKNOWN_TYPE: &str = "unknown";

/// Reads every card in a jCard document, discarding warnings.
///
/// ## Errors
/// Returns an error if the input is not a jCard document.
pub fn read_str(input: &str) -> VCardResult<Vec<VCard>> {
    JsonReader::new(input.as_bytes()).read_all()
}

/// Writes `cards` as one jCard document.
///
/// ## Errors
/// Returns an error if a card cannot be written.
pub fn write_string(cards: &[VCard], pretty: bool) -> VCardResult<String> {
    let mut writer = JsonWriter::new(Vec::new()).with_pretty_print(pretty);
    writer.write_all(cards)?;
    writer.finish()?;
    Ok(String::from_utf8_lossy(&writer.into_inner()).into_owned())
}
