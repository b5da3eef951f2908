//! xCard, the XML syntax of vCard 4.0 (RFC 6351).
//!
//! ```xml
//! <vcards xmlns="urn:ietf:params:xml:ns:vcard-4.0">
//!   <vcard>
//!     <group name="item1">
//!       <tel>
//!         <parameters><type><text>cell</text></type></parameters>
//!         <uri>tel:+1-555-555-0100</uri>
//!       </tel>
//!     </group>
//!   </vcard>
//! </vcards>
//! ```

mod reader;
mod writer;

pub use reader::XmlReader;
pub use writer::XmlWriter;

use crate::core::VCard;
use crate::error::VCardResult;
use crate::io::{CardReader, CardWriter};

/// Reads every card in an xCard document, discarding warnings.
///
/// ## Errors
/// Returns an error if the document is not well-formed xCard.
pub fn read_str(input: &str) -> VCardResult<Vec<VCard>> {
    XmlReader::new(input.as_bytes()).read_all()
}

/// Writes `cards` as one xCard document.
///
/// ## Errors
/// Returns an error if a card cannot be written.
pub fn write_string(cards: &[VCard], pretty: bool) -> VCardResult<String> {
    let mut writer = if pretty {
        XmlWriter::pretty(Vec::new())
    } else {
        XmlWriter::new(Vec::new())
    };
    writer.write_all(cards)?;
    writer.finish()?;
    Ok(String::from_utf8_lossy(&writer.into_inner()).into_owned())
}
