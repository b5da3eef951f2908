//! vCard 2.1 and 3.0 specifics: labels, quoted-printable and embedded cards.

use tessera_test::{LABELED_CARD_3_0, Syntax, read, read_cards, round_trip, write};
use tessera_vcard::core::Agent;
use tessera_vcard::{PropertyKind, PropertyValue, VCard, VCardProperty, VCardVersion};

const V2_1: Syntax = Syntax::Text(VCardVersion::V2_1);
const V3_0: Syntax = Syntax::Text(VCardVersion::V3_0);
const V4_0: Syntax = Syntax::Text(VCardVersion::V4_0);

// ============================================================================
// Address labels
// ============================================================================

#[test_log::test]
fn label_is_folded_into_its_address() {
    let cards = read(V3_0, LABELED_CARD_3_0).unwrap();
    assert!(cards[0].warnings.is_empty());
    let card = &cards[0].card;
    assert_eq!(card.properties_of(PropertyKind::Label).count(), 0);
    let adr = card.property(PropertyKind::Address).unwrap();
    assert_eq!(adr.parameters.label(), Some("123 Main St.\nAustin, TX 12345"));
}

#[test]
fn label_round_trips_through_3_0() {
    let cards = read_cards(V3_0, LABELED_CARD_3_0).unwrap();
    let (text, _) = write(V3_0, &cards).unwrap();
    assert!(text.contains("\r\nLABEL;TYPE=home:"), "{text}");
    assert!(!text.contains("LABEL=\""), "{text}");
    assert_eq!(read_cards(V3_0, &text).unwrap(), cards);
}

#[test]
fn label_becomes_a_parameter_in_4_0() {
    let cards = read_cards(V3_0, LABELED_CARD_3_0).unwrap();
    let (text, _) = write(V4_0, &cards).unwrap();
    assert!(!text.contains("\r\nLABEL"), "{text}");
    assert!(
        text.contains("LABEL=\"123 Main St.^nAustin, TX 12345\""),
        "{text}"
    );
}

// ============================================================================
// Quoted-printable
// ============================================================================

#[test_log::test]
fn quoted_printable_values_are_decoded_and_reencoded() {
    let input = "BEGIN:VCARD\r\n\
                 VERSION:2.1\r\n\
                 FN:Jose\r\n\
                 NOTE;ENCODING=QUOTED-PRINTABLE;CHARSET=UTF-8:Caf=C3=A9=0D=0A=\r\n\
                 au lait\r\n\
                 TEL;WORK;VOICE:555-1234\r\n\
                 END:VCARD\r\n";
    let cards = read(V2_1, input).unwrap();
    assert!(cards[0].warnings.is_empty(), "{:?}", cards[0].warnings);
    let card = &cards[0].card;
    assert_eq!(
        card.property(PropertyKind::Note).unwrap().value().as_text(),
        Some("Café\nau lait")
    );
    let tel = card.property(PropertyKind::Telephone).unwrap();
    assert_eq!(tel.parameters.types(), ["WORK", "VOICE"]);

    let (text, _) = write(V2_1, std::slice::from_ref(card)).unwrap();
    assert!(
        text.contains("NOTE;ENCODING=QUOTED-PRINTABLE;CHARSET=UTF-8:Caf=C3=A9=0D=0Aau lait\r\n"),
        "{text}"
    );
    assert!(text.contains("TEL;TYPE=WORK;TYPE=VOICE:555-1234\r\n"), "{text}");
    assert_eq!(read_cards(V2_1, &text).unwrap(), vec![card.clone()]);
}

// ============================================================================
// Embedded cards
// ============================================================================

fn card_with_agent() -> VCard {
    let mut assistant = VCard::with_version(VCardVersion::V3_0);
    assistant.add_property(VCardProperty::text(PropertyKind::FormattedName, "Assistant"));
    assistant.add_property(VCardProperty::text(PropertyKind::Email, "help@example.com"));
    let mut card = VCard::with_version(VCardVersion::V3_0);
    card.add_property(VCardProperty::text(PropertyKind::FormattedName, "Boss"));
    card.add_property(VCardProperty::agent(Agent::Card(Box::new(assistant))));
    card
}

fn nested(card: &VCard) -> &VCard {
    match card.property(PropertyKind::Agent).map(VCardProperty::value) {
        Some(PropertyValue::Agent(Agent::Card(nested))) => nested,
        other => panic!("expected an embedded card, got {other:?}"),
    }
}

#[test_log::test]
fn agent_reads_the_same_from_2_1_and_3_0() {
    let card = card_with_agent();
    let from_2_1 = round_trip(V2_1, std::slice::from_ref(&card)).unwrap();
    let from_3_0 = round_trip(V3_0, std::slice::from_ref(&card)).unwrap();
    assert_eq!(from_2_1.len(), 1);
    assert_eq!(from_3_0.len(), 1);

    assert_eq!(nested(&from_2_1[0]).version, VCardVersion::V2_1);
    assert_eq!(nested(&from_3_0[0]).version, VCardVersion::V3_0);
    assert_eq!(nested(&from_2_1[0]).properties, nested(&from_3_0[0]).properties);
    assert_eq!(nested(&from_3_0[0]).properties, nested(&card).properties);
    assert_eq!(from_3_0, vec![card]);
}

#[test]
fn agent_inline_card_does_not_end_the_outer_card() {
    let (text, _) = write(V2_1, &[card_with_agent()]).unwrap();
    let outer = read(V2_1, &text).unwrap();
    assert_eq!(outer.len(), 1);
    assert!(outer[0].warnings.is_empty(), "{:?}", outer[0].warnings);
    assert_eq!(outer[0].card.formatted_name(), Some("Boss"));
}
