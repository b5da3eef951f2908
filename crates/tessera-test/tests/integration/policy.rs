//! Version policy applied by every writer.

use tessera_test::{Syntax, read_cards, write};
use tessera_vcard::io::policy::PRODUCT_ID;
use tessera_vcard::{
    CardWriter, JsonWriter, PropertyKind, TextOptions, TextWriter, VCard, VCardProperty,
    VCardVersion,
};

fn member_card(kind: Option<&str>) -> VCard {
    let mut card = VCard::new();
    card.add_property(VCardProperty::text(PropertyKind::FormattedName, "Book club"));
    if let Some(kind) = kind {
        card.add_property(VCardProperty::text(PropertyKind::Kind, kind));
    }
    card.add_property(VCardProperty::uri(
        PropertyKind::Member,
        "urn:uuid:03a0e51f-d1aa-4385-8a53-e29025acd8af",
    ));
    card
}

#[test_log::test]
fn member_without_group_kind_is_dropped_with_one_warning() {
    for syntax in [Syntax::Text(VCardVersion::V4_0), Syntax::Xml, Syntax::Json] {
        let (document, warnings) = write(syntax, &[member_card(None)]).unwrap();
        assert_eq!(warnings[0].len(), 1, "{syntax:?}: {:?}", warnings[0]);
        assert_eq!(warnings[0][0].property.as_deref(), Some("MEMBER"));
        assert!(!document.to_ascii_lowercase().contains("urn:uuid"), "{document}");
    }
}

#[test]
fn member_of_a_group_is_kept() {
    let (text, warnings) =
        write(Syntax::Text(VCardVersion::V4_0), &[member_card(Some("group"))]).unwrap();
    assert!(warnings[0].is_empty());
    assert!(text.contains("MEMBER:urn:uuid:03a0e51f-d1aa-4385-8a53-e29025acd8af\r\n"));
}

#[test]
fn kinds_missing_from_the_target_version_are_dropped() {
    let mut card = VCard::new();
    card.add_property(VCardProperty::text(PropertyKind::FormattedName, "A"));
    card.add_property(VCardProperty::text(PropertyKind::Kind, "individual"));
    card.add_property(VCardProperty::text(PropertyKind::Mailer, "Mail 1.0"));

    let (text, warnings) = write(Syntax::Text(VCardVersion::V3_0), std::slice::from_ref(&card))
        .unwrap();
    assert!(!text.contains("KIND"));
    assert!(text.contains("MAILER:Mail 1.0\r\n"));
    assert_eq!(warnings[0].len(), 1);
    assert!(warnings[0][0].message.contains("4.0"), "{}", warnings[0][0]);

    let (text, warnings) = write(Syntax::Text(VCardVersion::V4_0), &[card]).unwrap();
    assert!(text.contains("KIND:individual\r\n"));
    assert!(!text.contains("MAILER"));
    assert_eq!(warnings[0].len(), 1);
}

#[test]
fn pref_moves_between_parameter_and_type() {
    let input = "BEGIN:VCARD\r\nVERSION:4.0\r\nFN:A\r\n\
                 EMAIL;PREF=2:b@example.com\r\n\
                 EMAIL;PREF=1:a@example.com\r\n\
                 END:VCARD\r\n";
    let cards = read_cards(Syntax::Text(VCardVersion::V4_0), input).unwrap();
    let (text, _) = write(Syntax::Text(VCardVersion::V3_0), &cards).unwrap();
    assert!(text.contains("\r\nEMAIL:b@example.com\r\n"), "{text}");
    assert!(text.contains("\r\nEMAIL;TYPE=pref:a@example.com\r\n"), "{text}");

    let legacy = read_cards(Syntax::Text(VCardVersion::V3_0), &text).unwrap();
    let (text, _) = write(Syntax::Text(VCardVersion::V4_0), &legacy).unwrap();
    assert!(text.contains("\r\nEMAIL;PREF=1:a@example.com\r\n"), "{text}");
}

#[test]
fn product_id_replaces_any_existing_one() {
    let mut card = VCard::new();
    card.add_property(VCardProperty::text(PropertyKind::FormattedName, "A"));
    card.add_property(VCardProperty::text(PropertyKind::ProductId, "-//Other//EN"));

    let mut writer = TextWriter::with_options(Vec::new(), TextOptions::new(VCardVersion::V3_0));
    writer.write(&card).unwrap();
    writer.finish().unwrap();
    let text = String::from_utf8(writer.into_inner()).unwrap();
    assert_eq!(text.matches("PRODID:").count(), 1, "{text}");
    assert!(text.contains(&format!("PRODID:{PRODUCT_ID}")), "{text}");

    let mut writer = TextWriter::with_options(Vec::new(), TextOptions::new(VCardVersion::V2_1));
    writer.write(&card).unwrap();
    let text = String::from_utf8(writer.into_inner()).unwrap();
    assert!(text.contains(&format!("X-PRODID:{PRODUCT_ID}")), "{text}");
    assert!(!text.contains("\r\nPRODID"), "{text}");

    let mut writer = JsonWriter::new(Vec::new());
    writer.write(&card).unwrap();
    writer.finish().unwrap();
    let json: serde_json::Value = serde_json::from_slice(&writer.into_inner()).unwrap();
    let prodids: Vec<_> = json[1]
        .as_array()
        .unwrap()
        .iter()
        .filter(|entry| entry[0] == "prodid")
        .collect();
    assert_eq!(prodids.len(), 1);
    assert_eq!(prodids[0][3], PRODUCT_ID);
}

#[test]
fn partial_dates_are_left_out_of_legacy_output_silently() {
    let input = "BEGIN:VCARD\r\nVERSION:4.0\r\nFN:A\r\nBDAY:--0415\r\nEND:VCARD\r\n";
    let cards = read_cards(Syntax::Text(VCardVersion::V4_0), input).unwrap();
    for syntax in [
        Syntax::Text(VCardVersion::V3_0),
        Syntax::Text(VCardVersion::V2_1),
        Syntax::Html,
    ] {
        let (document, warnings) = write(syntax, &cards).unwrap();
        assert!(!document.to_ascii_lowercase().contains("bday"), "{document}");
        assert!(warnings[0].is_empty(), "{syntax:?}: {:?}", warnings[0]);
    }
}
