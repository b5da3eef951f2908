//! Cards written in one syntax and read back.

use tessera_test::{FULL_CARD_4_0, Syntax, read, read_cards, round_trip, write};
use tessera_vcard::{PropertyKind, VCard, VCardVersion};

fn full_card() -> VCard {
    let cards = read(Syntax::Text(VCardVersion::V4_0), FULL_CARD_4_0).unwrap();
    assert_eq!(cards.len(), 1);
    assert!(cards[0].warnings.is_empty(), "{:?}", cards[0].warnings);
    cards[0].card.clone()
}

// ============================================================================
// Same-syntax round trips
// ============================================================================

#[test_log::test]
fn text_round_trip_is_stable() {
    let card = full_card();
    let syntax = Syntax::Text(VCardVersion::V4_0);
    let again = round_trip(syntax, std::slice::from_ref(&card)).unwrap();
    assert_eq!(again, vec![card]);
}

#[test_log::test]
fn xcard_round_trip_preserves_the_card() {
    let card = full_card();
    let again = round_trip(Syntax::Xml, std::slice::from_ref(&card)).unwrap();
    assert_eq!(again, vec![card]);
}

#[test_log::test]
fn jcard_round_trip_preserves_the_card() {
    let card = full_card();
    let again = round_trip(Syntax::Json, std::slice::from_ref(&card)).unwrap();
    assert_eq!(again, vec![card]);
}

#[test]
fn address_line_is_rewritten_unchanged() {
    let input = "BEGIN:VCARD\r\nVERSION:3.0\r\nFN:A\r\n\
                 ADR;TYPE=home:;;123 Main St.;Austin;TX;12345;\r\nEND:VCARD\r\n";
    let cards = read_cards(Syntax::Text(VCardVersion::V3_0), input).unwrap();
    let (text, warnings) = write(Syntax::Text(VCardVersion::V3_0), &cards).unwrap();
    assert!(warnings[0].is_empty());
    assert!(
        text.contains("\r\nADR;TYPE=home:;;123 Main St.;Austin;TX;12345;\r\n"),
        "{text}"
    );
}

// ============================================================================
// Cross-syntax conversion
// ============================================================================

#[test_log::test]
fn text_to_xcard_to_jcard_to_text() {
    let card = full_card();
    let (xml, _) = write(Syntax::Xml, std::slice::from_ref(&card)).unwrap();
    let from_xml = read_cards(Syntax::Xml, &xml).unwrap();
    let (json, _) = write(Syntax::Json, &from_xml).unwrap();
    let from_json = read_cards(Syntax::Json, &json).unwrap();
    let (text, _) = write(Syntax::Text(VCardVersion::V4_0), &from_json).unwrap();
    let from_text = read_cards(Syntax::Text(VCardVersion::V4_0), &text).unwrap();
    assert_eq!(from_text, vec![card]);
}

#[test_log::test]
fn hcard_keeps_the_common_properties() {
    let card = full_card();
    let (html, _) = write(Syntax::Html, std::slice::from_ref(&card)).unwrap();
    let cards = read_cards(Syntax::Html, &html).unwrap();
    assert_eq!(cards.len(), 1);
    let read = &cards[0];
    assert_eq!(read.version, VCardVersion::V3_0);
    assert_eq!(read.formatted_name(), Some("Jane Doe"));
    assert_eq!(
        read.property(PropertyKind::Email).unwrap().value().as_text(),
        Some("jane@example.com")
    );
    assert_eq!(
        read.property(PropertyKind::Url).unwrap().value().as_uri(),
        Some("http://example.com/jane")
    );
    assert_eq!(
        read.property(PropertyKind::Note).unwrap().value().as_text(),
        Some("Line one\nLine two, with a comma")
    );
    assert_eq!(
        read.property(PropertyKind::Categories).unwrap().value().as_text_list(),
        Some(["friends".to_string(), "colleagues".to_string()].as_slice())
    );
}

#[test]
fn several_cards_survive_every_syntax() {
    let input = "BEGIN:VCARD\r\nVERSION:4.0\r\nFN:A\r\nEND:VCARD\r\n\
                 BEGIN:VCARD\r\nVERSION:4.0\r\nFN:B\r\nEND:VCARD\r\n";
    let cards = read_cards(Syntax::Text(VCardVersion::V4_0), input).unwrap();
    for syntax in [Syntax::Text(VCardVersion::V4_0), Syntax::Xml, Syntax::Json] {
        assert_eq!(round_trip(syntax, &cards).unwrap(), cards, "{syntax:?}");
    }
    let names: Vec<_> = round_trip(Syntax::Html, &cards)
        .unwrap()
        .iter()
        .map(|card| card.formatted_name().map(str::to_string))
        .collect();
    assert_eq!(names, [Some("A".to_string()), Some("B".to_string())]);
}
