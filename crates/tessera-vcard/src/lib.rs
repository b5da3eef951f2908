//! vCard property marshaling for vCard 2.1, 3.0 and 4.0.
//!
//! Cards are read and written in four syntaxes: the line-oriented text
//! format, xCard (XML), jCard (JSON) and hCard (HTML microformat). Every
//! property is converted by a [`Scribe`](scribe::Scribe) looked up in a
//! [`ScribeRegistry`]; applications can register their own scribes to
//! handle extension properties or override the defaults.
//!
//! ```
//! use tessera_vcard::{CardWriter, JsonWriter, TextReader, CardReader};
//!
//! let input = "BEGIN:VCARD\r\nVERSION:3.0\r\nFN:Jane Doe\r\nEND:VCARD\r\n";
//! let cards = TextReader::new(input.as_bytes()).read_all().unwrap();
//! assert_eq!(cards[0].formatted_name(), Some("Jane Doe"));
//!
//! let mut writer = JsonWriter::new(Vec::new()).with_prodid(false);
//! writer.write_all(&cards).unwrap();
//! writer.finish().unwrap();
//! let json = String::from_utf8(writer.into_inner()).unwrap();
//! assert!(json.contains(r#"["fn",{},"text","Jane Doe"]"#));
//! ```

pub mod codec;
pub mod core;
pub mod error;
pub mod io;
pub mod registry;
pub mod scribe;

pub use crate::core::{PropertyKind, PropertyValue, VCard, VCardProperty, VCardVersion, Warning};
pub use error::{VCardError, VCardResult};
pub use io::{
    CardReader, CardWriter, HtmlReader, HtmlWriter, JsonReader, JsonWriter, ReadCard, TextOptions,
    TextReader, TextWriter, XmlReader, XmlWriter,
};
pub use registry::ScribeRegistry;
