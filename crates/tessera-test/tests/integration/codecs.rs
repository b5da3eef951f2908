//! Temporal and geo values end to end.

use tessera_test::{Syntax, read, read_cards, round_trip, write};
use tessera_vcard::codec::geo::GeoUri;
use tessera_vcard::codec::iso8601::{DateFormat, IsoDateTime};
use tessera_vcard::{PropertyKind, PropertyValue, VCard, VCardProperty, VCardVersion};

#[test]
fn hcard_date_time_converts_to_extended_utc() {
    let (format, value) = DateFormat::parse("2009-08-08 14:30:00 -0500").unwrap();
    assert_eq!(format, DateFormat::HCardDateTime);
    assert_eq!(
        DateFormat::UtcDateTimeExtended.format(&value),
        "2009-08-08T19:30:00Z"
    );
    assert_eq!(
        IsoDateTime::parse("2009-08-08 14:30:00 -0500")
            .unwrap()
            .format_utc(true)
            .as_deref(),
        Some("2009-08-08T19:30:00Z")
    );
}

#[test_log::test]
fn hcard_revision_is_written_to_jcard_in_utc() {
    let html = r#"<div class="vcard"><span class="fn">A</span>
<abbr class="rev" title="2009-08-08 14:30:00 -0500">August 8th</abbr></div>"#;
    let cards = read(Syntax::Html, html).unwrap();
    assert!(cards[0].warnings.is_empty(), "{:?}", cards[0].warnings);
    let card = cards[0].card.clone();

    let (json, _) = write(Syntax::Json, std::slice::from_ref(&card)).unwrap();
    let json: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert!(
        json[1]
            .as_array()
            .unwrap()
            .contains(&serde_json::json!(["rev", {}, "timestamp", "2009-08-08T19:30:00Z"])),
        "{json}"
    );

    let (text, _) = write(Syntax::Text(VCardVersion::V4_0), &[card]).unwrap();
    assert!(text.contains("REV:20090808T193000Z\r\n"), "{text}");
}

#[test]
fn geo_uri_suppresses_the_default_crs() {
    let geo = GeoUri::new(46.772_673, -71.282_945);
    assert_eq!(geo.to_uri(), "geo:46.772673,-71.282945");
    assert_eq!(
        GeoUri::parse("geo:46.772673,-71.282945;crs=wgs84").unwrap().to_uri(),
        "geo:46.772673,-71.282945"
    );
}

#[test]
fn geo_changes_shape_between_versions() {
    let input = "BEGIN:VCARD\r\nVERSION:3.0\r\nFN:A\r\nGEO:46.772673;-71.282945\r\nEND:VCARD\r\n";
    let cards = read_cards(Syntax::Text(VCardVersion::V3_0), input).unwrap();
    let geo = cards[0].property(PropertyKind::Geo).unwrap().value().as_geo().unwrap();
    assert_eq!(geo, &GeoUri::new(46.772_673, -71.282_945));

    let (text, _) = write(Syntax::Text(VCardVersion::V4_0), &cards).unwrap();
    assert!(text.contains("\r\nGEO:geo:46.772673,-71.282945\r\n"), "{text}");
    let (text, _) = write(Syntax::Text(VCardVersion::V3_0), &cards).unwrap();
    assert!(text.contains("\r\nGEO:46.772673;-71.282945\r\n"), "{text}");
}

#[test]
fn partial_dates_keep_their_shape() {
    let input = "BEGIN:VCARD\r\nVERSION:4.0\r\nFN:A\r\n\
                 BDAY:--0415\r\nANNIVERSARY:2009\r\nDEATHDATE:T1030\r\nEND:VCARD\r\n";
    let cards = read_cards(Syntax::Text(VCardVersion::V4_0), input).unwrap();
    let (text, warnings) = write(Syntax::Text(VCardVersion::V4_0), &cards).unwrap();
    assert!(warnings[0].is_empty(), "{:?}", warnings[0]);
    for line in ["BDAY:--0415\r\n", "ANNIVERSARY:2009\r\n", "DEATHDATE:T1030\r\n"] {
        assert!(text.contains(line), "{line} missing from {text}");
    }

    let (json, _) = write(Syntax::Json, &cards).unwrap();
    assert!(json.contains(r#"["bday",{},"date","--04-15"]"#), "{json}");
    assert_eq!(round_trip(Syntax::Json, &cards).unwrap(), cards);
    assert_eq!(round_trip(Syntax::Xml, &cards).unwrap(), cards);
}

#[test]
fn long_values_fold_and_unfold() {
    let note = "Lorem ipsum dolor sit amet, consectetur adipiscing elit; "
        .repeat(6)
        .trim_end()
        .to_string();
    let mut card = VCard::new();
    card.add_property(VCardProperty::text(PropertyKind::Note, note.clone()));
    let syntax = Syntax::Text(VCardVersion::V4_0);
    let (text, _) = write(syntax, std::slice::from_ref(&card)).unwrap();
    assert!(text.split("\r\n").all(|line| line.chars().count() <= 75), "{text}");

    let cards = read_cards(syntax, &text).unwrap();
    assert_eq!(
        cards[0].property(PropertyKind::Note).unwrap().value(),
        &PropertyValue::Text(note)
    );
    assert_eq!(cards, vec![card]);
}
