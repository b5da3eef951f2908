//! Custom scribes registered on readers and writers.

use std::sync::Arc;

use tessera_test::{FULL_CARD_4_0, Syntax, read};
use tessera_vcard::codec::escape::{escape_text, unescape_text};
use tessera_vcard::core::{VCardDataType, VCardParameters};
use tessera_vcard::error::VCardResult;
use tessera_vcard::registry::LookupStatus;
use tessera_vcard::scribe::{ParseContext, ParseOutcome, Scribe, WriteOutcome};
use tessera_vcard::{
    CardReader, CardWriter, JsonWriter, PropertyKind, PropertyValue, ScribeRegistry,
    TextOptions, TextReader, TextWriter, VCard, VCardProperty, VCardVersion,
};

/// Private `X-SHOE-SIZE` property holding a whole number.
#[derive(Debug)]
struct ShoeSizeScribe;

impl Scribe for ShoeSizeScribe {
    fn kind(&self) -> PropertyKind {
        PropertyKind::Extension
    }

    fn property_name(&self) -> &str {
        "X-SHOE-SIZE"
    }

    fn default_data_type(&self, _version: VCardVersion) -> Option<VCardDataType> {
        Some(VCardDataType::Integer)
    }

    fn encode_text(
        &self,
        property: &VCardProperty,
        _version: VCardVersion,
    ) -> VCardResult<WriteOutcome<String>> {
        Ok(match property.value().as_text() {
            Some(size) => WriteOutcome::Value(size.to_string()),
            None => WriteOutcome::Skip,
        })
    }

    fn parse_text(
        &self,
        value: &str,
        _data_type: Option<&VCardDataType>,
        parameters: VCardParameters,
        _ctx: &mut ParseContext,
    ) -> ParseOutcome {
        if value.is_empty() || !value.bytes().all(|b| b.is_ascii_digit()) {
            return ParseOutcome::cannot_parse(value, format!("\"{value}\" is not a shoe size"));
        }
        let mut property =
            VCardProperty::extension(self.property_name(), PropertyValue::Text(value.into()));
        property.parameters = parameters;
        ParseOutcome::Property(property)
    }
}

/// NOTE written in capitals.
#[derive(Debug)]
struct LoudNoteScribe;

impl Scribe for LoudNoteScribe {
    fn kind(&self) -> PropertyKind {
        PropertyKind::Note
    }

    fn property_name(&self) -> &str {
        "NOTE"
    }

    fn default_data_type(&self, _version: VCardVersion) -> Option<VCardDataType> {
        Some(VCardDataType::Text)
    }

    fn encode_text(
        &self,
        property: &VCardProperty,
        version: VCardVersion,
    ) -> VCardResult<WriteOutcome<String>> {
        let note = property.value().as_text().unwrap_or_default();
        Ok(WriteOutcome::Value(escape_text(&note.to_uppercase(), version)))
    }

    fn parse_text(
        &self,
        value: &str,
        _data_type: Option<&VCardDataType>,
        parameters: VCardParameters,
        _ctx: &mut ParseContext,
    ) -> ParseOutcome {
        ParseOutcome::property(
            PropertyKind::Note,
            PropertyValue::Text(unescape_text(value).to_uppercase()),
            parameters,
        )
    }
}

const SHOES: &str = "BEGIN:VCARD\r\nVERSION:4.0\r\nFN:A\r\n\
                     X-SHOE-SIZE:42\r\nX-SHOE-SIZE:huge\r\nEND:VCARD\r\n";

#[test_log::test]
fn extension_scribe_parses_its_property() {
    let mut reader = TextReader::new(SHOES.as_bytes());
    reader.register_scribe(Arc::new(ShoeSizeScribe));
    let card = reader.read_next().unwrap().unwrap();

    let sizes = card.properties_named("X-SHOE-SIZE");
    assert_eq!(sizes.len(), 2);
    assert_eq!(sizes[0].value(), &PropertyValue::Text("42".into()));
    assert!(sizes[1].value().as_raw().is_some());
    assert_eq!(reader.warnings().len(), 1);
    assert!(reader.warnings()[0].message.contains("not a shoe size"));
}

#[test]
fn extension_scribe_supplies_the_jcard_data_type() {
    let mut card = VCard::new();
    card.add_property(VCardProperty::extension(
        "X-SHOE-SIZE",
        PropertyValue::Text("42".into()),
    ));

    let mut writer = JsonWriter::new(Vec::new()).with_prodid(false);
    writer.register_scribe(Arc::new(ShoeSizeScribe));
    writer.write(&card).unwrap();
    writer.finish().unwrap();
    let json: serde_json::Value = serde_json::from_slice(&writer.into_inner()).unwrap();
    assert_eq!(json[1][1], serde_json::json!(["x-shoe-size", {}, "integer", "42"]));
}

#[test]
fn without_the_scribe_extensions_stay_raw() {
    let cards = read(Syntax::Text(VCardVersion::V4_0), SHOES).unwrap();
    assert!(cards[0].warnings.is_empty(), "{:?}", cards[0].warnings);
    let sizes = cards[0].card.properties_named("X-SHOE-SIZE");
    assert!(sizes.iter().all(|p| p.value().as_raw().is_some()));
}

#[test]
fn shadowing_a_default_affects_one_registry_only() {
    let mut loud = ScribeRegistry::new();
    loud.register(Arc::new(LoudNoteScribe));
    let stock = ScribeRegistry::new();
    assert_eq!(loud.lookup("NOTE").status, LookupStatus::Registered);

    let read_with = |registry: ScribeRegistry| {
        let mut reader = TextReader::new(FULL_CARD_4_0.as_bytes()).with_registry(registry);
        let card = reader.read_next().unwrap().unwrap();
        card.property(PropertyKind::Note)
            .and_then(|note| note.value().as_text().map(str::to_string))
    };
    assert_eq!(
        read_with(loud.clone()).as_deref(),
        Some("LINE ONE\nLINE TWO, WITH A COMMA")
    );
    assert_eq!(
        read_with(stock.clone()).as_deref(),
        Some("Line one\nLine two, with a comma")
    );

    let mut card = VCard::new();
    card.add_property(VCardProperty::text(PropertyKind::Note, "quiet"));
    let write_with = |registry: ScribeRegistry| {
        let options = TextOptions::new(VCardVersion::V4_0).with_prodid(false);
        let mut writer = TextWriter::with_options(Vec::new(), options).with_registry(registry);
        writer.write(&card).unwrap();
        String::from_utf8(writer.into_inner()).unwrap()
    };
    assert!(write_with(loud).contains("NOTE:QUIET\r\n"));
    assert!(write_with(stock).contains("NOTE:quiet\r\n"));
}

#[test]
fn unknown_properties_are_preserved_verbatim() {
    let input = "BEGIN:VCARD\r\nVERSION:4.0\r\nFN:A\r\n\
                 X-CUSTOM;X-P=1:a\\,b;c\r\nFOO:bar\r\nEND:VCARD\r\n";
    let cards = read(Syntax::Text(VCardVersion::V4_0), input).unwrap();
    assert_eq!(cards[0].warnings.len(), 1);
    assert_eq!(cards[0].warnings[0].property.as_deref(), Some("FOO"));

    let options = TextOptions::new(VCardVersion::V4_0).with_prodid(false);
    let mut writer = TextWriter::with_options(Vec::new(), options);
    writer.write(&cards[0].card).unwrap();
    let text = String::from_utf8(writer.into_inner()).unwrap();
    assert!(text.contains("\r\nX-CUSTOM;X-P=1:a\\,b;c\r\n"), "{text}");
    assert!(text.contains("\r\nFOO:bar\r\n"), "{text}");
}
