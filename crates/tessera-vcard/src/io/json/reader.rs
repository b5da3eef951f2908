use std::collections::VecDeque;
use std::io::Read;

use serde_json::Value;

use crate::codec::escape::escape_text;
use crate::core::{
    PropertyValue, RawValue, VCard, VCardDataType, VCardParameters, VCardProperty, VCardVersion,
    Warning,
};
use crate::error::{VCardError, VCardResult};
use crate::io::{CardReader, record};
use crate::registry::{LookupStatus, ScribeRegistry};
use crate::scribe::{JCardValue, ParseContext, ParseOutcome};

use super::{GROUP_PARAMETER, UNKNOWN_TYPE, VCARD_TAG};

/// Reads jCard documents (RFC 7095).
///
/// Accepts a single `["vcard", [...]]` card or an array of them. Every
/// card is version 4.0.
pub struct JsonReader<R> {
    source: Option<R>,
    pending: VecDeque<Value>,
    registry: ScribeRegistry,
    warnings: Vec<Warning>,
}

impl<R: Read> JsonReader<R> {
    pub fn new(source: R) -> Self {
        Self {
            source: Some(source),
            pending: VecDeque::new(),
            registry: ScribeRegistry::default(),
            warnings: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_registry(mut self, registry: ScribeRegistry) -> Self {
        self.registry = registry;
        self
    }

    #[tracing::instrument(skip(self))]
    fn load(&mut self) -> VCardResult<()> {
        let Some(source) = self.source.take() else {
            return Ok(());
        };
        let document: Value = serde_json::from_reader(source)?;
        match document {
            Value::Array(items) if is_card(&items) => self.pending.push_back(Value::Array(items)),
            Value::Array(items) => self.pending.extend(items),
            other => {
                return Err(VCardError::InvalidValue(format!(
                    "expected a jCard array, found {}",
                    json_kind(&other)
                )));
            }
        }
        tracing::debug!(cards = self.pending.len(), "jCard document parsed");
        Ok(())
    }

    fn warn(&mut self, warning: Warning) {
        record(&mut self.warnings, warning);
    }

    fn read_card(&mut self, value: Value) -> VCard {
        let mut card = VCard::with_version(VCardVersion::V4_0);
        let properties = match value {
            Value::Array(mut items) if is_card(&items) && items.len() == 2 => items.remove(1),
            _ => Value::Null,
        };
        let Value::Array(properties) = properties else {
            self.warn(Warning::new("not a jCard card; read as empty"));
            return card;
        };
        for entry in properties {
            if let Some(property) = self.read_property(entry) {
                card.add_property(property);
            }
        }
        tracing::debug!(properties = card.properties.len(), "jCard card read");
        card
    }

    fn read_property(&mut self, entry: Value) -> Option<VCardProperty> {
        let Value::Array(mut items) = entry else {
            self.warn(Warning::new("property entry is not an array; skipped"));
            return None;
        };
        let (
            Some(Value::String(name)),
            Some(Value::Object(params)),
            Some(Value::String(type_name)),
        ) = (items.first(), items.get(1), items.get(2))
        else {
            self.warn(Warning::new(
                "property entry needs a name, parameters and a type; skipped",
            ));
            return None;
        };
        let name = name.to_ascii_uppercase();
        let data_type = (!type_name.eq_ignore_ascii_case(UNKNOWN_TYPE))
            .then(|| VCardDataType::get(type_name));

        let mut group = None;
        let mut parameters = VCardParameters::new();
        for (key, value) in params {
            if key.eq_ignore_ascii_case(GROUP_PARAMETER) {
                group = Some(scalar_text(value));
                continue;
            }
            match value {
                Value::Array(values) => {
                    parameters.put_all(&key.to_ascii_uppercase(), values.iter().map(scalar_text));
                }
                other => parameters.put(&key.to_ascii_uppercase(), scalar_text(other)),
            }
        }
        let value = JCardValue::from_values(items.split_off(3));

        if name == "VERSION" {
            if value.as_single() != VCardVersion::V4_0.as_str() {
                self.warn(Warning::for_property(
                    "VERSION",
                    format!("jCard is always 4.0; ignoring \"{}\"", value.as_single()),
                ));
            }
            return None;
        }

        let lookup = self.registry.lookup(&name);
        if lookup.status == LookupStatus::Unrecognized {
            self.warn(Warning::for_property(
                &name,
                "unrecognized property; kept as raw text",
            ));
        }

        let mut ctx = ParseContext::new(VCardVersion::V4_0, name.clone());
        let outcome = lookup
            .scribe
            .parse_json(&value, data_type.as_ref(), parameters.clone(), &mut ctx)
            .or_raw(|| escape_text(&value.as_single(), VCardVersion::V4_0));
        for warning in ctx.take_warnings() {
            self.warn(warning);
        }

        let mut property = match outcome {
            ParseOutcome::Property(property) => property,
            ParseOutcome::CannotParse { raw, reason } => {
                self.warn(Warning::for_property(
                    &name,
                    format!("{reason}; kept as raw text"),
                ));
                let mut property = VCardProperty::extension(
                    &name,
                    PropertyValue::Raw(RawValue::typed(raw, data_type)),
                );
                property.parameters = parameters;
                property
            }
            ParseOutcome::EmbeddedCard { .. } => {
                self.warn(Warning::for_property(
                    &name,
                    "embedded cards have no jCard form; property dropped",
                ));
                return None;
            }
        };
        property.group = group;
        Some(property)
    }
}

impl<R: Read> CardReader for JsonReader<R> {
    fn read_next(&mut self) -> VCardResult<Option<VCard>> {
        self.load()?;
        self.warnings.clear();
        Ok(self.pending.pop_front().map(|value| self.read_card(value)))
    }

    fn warnings(&self) -> &[Warning] {
        &self.warnings
    }

    fn registry_mut(&mut self) -> &mut ScribeRegistry {
        &mut self.registry
    }
}

impl<R: Read> Iterator for JsonReader<R> {
    type Item = VCardResult<VCard>;

    fn next(&mut self) -> Option<Self::Item> {
        self.read_next().transpose()
    }
}

fn is_card(items: &[Value]) -> bool {
    matches!(items.first(), Some(Value::String(tag)) if tag.eq_ignore_ascii_case(VCARD_TAG))
}

fn scalar_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{DateOrTime, PropertyKind};

    fn read(json: &str) -> (Vec<VCard>, Vec<Vec<Warning>>) {
        let mut reader = JsonReader::new(json.as_bytes());
        let mut cards = Vec::new();
        let mut warnings = Vec::new();
        while let Some(card) = reader.read_next().unwrap() {
            cards.push(card);
            warnings.push(reader.warnings().to_vec());
        }
        (cards, warnings)
    }

    #[test_log::test]
    fn reads_a_single_card() {
        let (cards, warnings) = read(
            r#"["vcard", [
                ["version", {}, "text", "4.0"],
                ["fn", {}, "text", "Simon Perreault"],
                ["n", {}, "text", ["Perreault", "Simon", "", "", ["ing. jr", "M.Sc."]]],
                ["bday", {}, "date-and-or-time", "--02-03"],
                ["email", {"type": "work", "group": "item1"}, "text", "simon@example.com"],
                ["tel", {"type": ["work", "voice"], "pref": "1"}, "uri", "tel:+1-418-656-9254"]
            ]]"#,
        );
        assert_eq!(cards.len(), 1);
        assert!(warnings[0].is_empty(), "{:?}", warnings[0]);
        let card = &cards[0];
        assert_eq!(card.formatted_name(), Some("Simon Perreault"));

        let name = card.property(PropertyKind::StructuredName).unwrap();
        let name = name.value().as_structured_name().unwrap();
        assert_eq!(name.family, ["Perreault"]);
        assert_eq!(name.suffixes, ["ing. jr", "M.Sc."]);

        let bday = card.property(PropertyKind::Birthday).unwrap();
        assert!(matches!(
            bday.value().as_date_or_time(),
            Some(DateOrTime::Partial(_))
        ));

        let email = card.property(PropertyKind::Email).unwrap();
        assert_eq!(email.group.as_deref(), Some("item1"));
        assert!(!email.parameters.contains(GROUP_PARAMETER));

        let tel = card.property(PropertyKind::Telephone).unwrap();
        assert_eq!(tel.parameters.types(), ["work", "voice"]);
        assert_eq!(tel.parameters.pref(), Some(1));
    }

    #[test]
    fn reads_an_array_of_cards() {
        let (cards, _) = read(
            r#"[
                ["vcard", [["fn", {}, "text", "A"]]],
                ["vcard", [["fn", {}, "text", "B"]]]
            ]"#,
        );
        assert_eq!(cards.len(), 2);
        assert_eq!(cards[1].formatted_name(), Some("B"));
    }

    #[test]
    fn unknown_and_unparsable_properties_become_raw() {
        let (cards, warnings) = read(
            r#"["vcard", [
                ["x-karma", {}, "integer", 42],
                ["hobby", {}, "unknown", "chess; go"],
                ["geo", {}, "uri", "somewhere"]
            ]]"#,
        );
        let card = &cards[0];
        let karma = card.properties_named("X-KARMA")[0].value().as_raw().unwrap();
        assert_eq!(karma.value, "42");
        assert_eq!(karma.data_type, Some(VCardDataType::Integer));

        let hobby = card.properties_named("HOBBY")[0].value().as_raw().unwrap();
        assert_eq!(hobby.value, "chess\\; go");
        assert!(hobby.data_type.is_none());

        assert_eq!(card.properties_named("GEO")[0].kind(), PropertyKind::Extension);
        assert_eq!(warnings[0].len(), 2);
    }

    #[test]
    fn malformed_entries_are_warnings() {
        let (cards, warnings) = read(r#"["vcard", [["fn"], "x", ["version", {}, "text", "3.0"]]]"#);
        assert!(cards[0].properties.is_empty());
        assert_eq!(warnings[0].len(), 3);
    }

    #[test]
    fn non_array_documents_are_errors() {
        let mut reader = JsonReader::new(&br#"{"vcard": []}"#[..]);
        assert!(matches!(reader.read_next(), Err(VCardError::InvalidValue(_))));

        let mut reader = JsonReader::new(&b"[\"vcard\""[..]);
        assert!(matches!(reader.read_next(), Err(VCardError::Json(_))));
    }
}
