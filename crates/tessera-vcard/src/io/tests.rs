use std::sync::Arc;

use super::*;
use crate::codec::escape::{escape_text, unescape_text};
use crate::core::{
    PropertyKind, PropertyValue, VCardDataType, VCardParameters, VCardProperty, VCardVersion,
};
use crate::scribe::{ParseContext, ParseOutcome, WriteOutcome};

/// NOTE values stored reversed, to tell this scribe apart from the default.
#[derive(Debug)]
struct ReversedNote;

impl Scribe for ReversedNote {
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
        let text = property.value().as_text().unwrap_or_default();
        Ok(WriteOutcome::Value(escape_text(
            &text.chars().rev().collect::<String>(),
            version,
        )))
    }

    fn parse_text(
        &self,
        value: &str,
        _data_type: Option<&VCardDataType>,
        parameters: VCardParameters,
        _ctx: &mut ParseContext,
    ) -> ParseOutcome {
        let text: String = unescape_text(value).chars().rev().collect();
        ParseOutcome::property(PropertyKind::Note, PropertyValue::Text(text), parameters)
    }
}

const TWO_CARDS: &str = "BEGIN:VCARD\r\nVERSION:3.0\r\nFN:A\r\nNOTE:olleh\r\nEND:VCARD\r\n\
                         BEGIN:VCARD\r\nFN:B\r\nEND:VCARD\r\n";

#[test]
fn read_all_with_warnings_keeps_each_cards_warnings() {
    let cards = TextReader::new(TWO_CARDS.as_bytes())
        .read_all_with_warnings()
        .unwrap();
    assert_eq!(cards.len(), 2);
    assert!(cards[0].warnings.is_empty());
    assert_eq!(cards[1].warnings.len(), 1);
    assert_eq!(cards[1].card.formatted_name(), Some("B"));
}

#[test]
fn registered_scribe_shadows_default_for_that_reader_only() {
    let mut custom = TextReader::new(TWO_CARDS.as_bytes());
    custom.register_scribe(Arc::new(ReversedNote));
    let card = custom.read_next().unwrap().unwrap();
    let note = card.property(PropertyKind::Note).unwrap();
    assert_eq!(note.value().as_text(), Some("hello"));

    let mut plain = TextReader::new(TWO_CARDS.as_bytes());
    let card = plain.read_next().unwrap().unwrap();
    let note = card.property(PropertyKind::Note).unwrap();
    assert_eq!(note.value().as_text(), Some("olleh"));
}

#[test]
fn registered_scribe_is_used_by_writers() {
    let mut card = VCard::with_version(VCardVersion::V3_0);
    card.add_property(VCardProperty::text(PropertyKind::Note, "hello"));

    let options = TextOptions::new(VCardVersion::V3_0).with_prodid(false);
    let mut writer = TextWriter::with_options(Vec::new(), options);
    writer.register_scribe(Arc::new(ReversedNote));
    writer.write_all([&card]).unwrap();
    writer.finish().unwrap();
    let text = String::from_utf8(writer.into_inner()).unwrap();
    assert!(text.contains("NOTE:olleh\r\n"));
}

#[test]
fn write_all_feeds_every_card() {
    let cards: Vec<VCard> = ["A", "B", "C"]
        .into_iter()
        .map(|name| {
            let mut card = VCard::new();
            card.add_property(VCardProperty::text(PropertyKind::FormattedName, name));
            card
        })
        .collect();

    let mut writer = JsonWriter::new(Vec::new()).with_prodid(false);
    writer.write_all(&cards).unwrap();
    writer.finish().unwrap();
    let json = String::from_utf8(writer.into_inner()).unwrap();
    let read = JsonReader::new(json.as_bytes()).read_all().unwrap();
    assert_eq!(read, cards);
}

/// NOTE parsed into a URI, a shape NOTE does not accept.
#[derive(Debug)]
struct MisshapenNote;

impl Scribe for MisshapenNote {
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
        let text = property.value().as_text().unwrap_or_default();
        Ok(WriteOutcome::Value(escape_text(text, version)))
    }

    fn parse_text(
        &self,
        value: &str,
        _data_type: Option<&VCardDataType>,
        parameters: VCardParameters,
        _ctx: &mut ParseContext,
    ) -> ParseOutcome {
        ParseOutcome::property(PropertyKind::Note, PropertyValue::Uri(value.into()), parameters)
    }
}

#[test]
fn tree_readers_keep_the_source_of_misshapen_values() {
    let xml = r#"<vcards xmlns="urn:ietf:params:xml:ns:vcard-4.0"><vcard>
        <note><text>hello, world</text></note></vcard></vcards>"#;
    let json = r#"["vcard",[["note",{},"text","hello, world"]]]"#;
    let html = r#"<div class="vcard"><span class="note">hello, world</span></div>"#;

    let mut readers: Vec<Box<dyn CardReader + '_>> = vec![
        Box::new(XmlReader::new(xml.as_bytes())),
        Box::new(JsonReader::new(json.as_bytes())),
        Box::new(HtmlReader::new(html.as_bytes())),
    ];
    for reader in &mut readers {
        reader.register_scribe(Arc::new(MisshapenNote));
        let card = reader.read_next().unwrap().unwrap();
        let notes = card.properties_named("NOTE");
        let note = notes[0];
        assert_eq!(note.kind(), PropertyKind::Extension);
        assert_eq!(
            note.value().as_raw().map(|raw| raw.value.as_str()),
            Some("hello\\, world")
        );
        assert_eq!(reader.warnings().len(), 1, "{:?}", reader.warnings());
    }
}

#[test]
fn filled_raw_text_only_replaces_an_empty_one() {
    let built = ParseOutcome::property(
        PropertyKind::Note,
        PropertyValue::Uri("x".into()),
        VCardParameters::new(),
    );
    let ParseOutcome::CannotParse { raw, .. } = built.or_raw(|| "source".into()) else {
        panic!("expected a parse failure");
    };
    assert_eq!(raw, "source");

    let kept = ParseOutcome::cannot_parse("original", "bad").or_raw(|| "source".into());
    assert_eq!(kept, ParseOutcome::cannot_parse("original", "bad"));
}
