use std::collections::VecDeque;
use std::io::Read;

use crate::codec::escape::escape_text;
use crate::core::{
    PropertyValue, RawValue, VCard, VCardParameters, VCardProperty, VCardVersion, Warning,
};
use crate::error::{VCardError, VCardResult};
use crate::io::tree::{self, Dialect};
use crate::io::{CardReader, record};
use crate::registry::{LookupStatus, ScribeRegistry};
use crate::scribe::wire::{Element, Node, PARAMETERS_ELEMENT, VCARD_NS, XmlElement};
use crate::scribe::{ParseContext, ParseOutcome};

/// Reads xCard documents (RFC 6351).
///
/// The whole document is parsed on the first read; cards are then handed
/// out one per call. Every card is version 4.0.
pub struct XmlReader<R> {
    source: Option<R>,
    pending: VecDeque<Element>,
    registry: ScribeRegistry,
    warnings: Vec<Warning>,
}

impl<R: Read> XmlReader<R> {
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
        let Some(mut source) = self.source.take() else {
            return Ok(());
        };
        let mut input = Vec::new();
        source.read_to_end(&mut input)?;
        let document = tree::parse(&input, Dialect::Xml)?;

        let Some(root) = child_elements(document).next() else {
            tracing::debug!("empty xCard document");
            return Ok(());
        };
        if root.namespace.as_deref().is_some_and(|ns| ns != VCARD_NS) {
            tracing::warn!(namespace = ?root.namespace, "root element outside the vCard namespace");
        }
        match root.name.as_str() {
            "vcards" => self
                .pending
                .extend(child_elements(root).filter(|e| e.name == "vcard")),
            "vcard" => self.pending.push_back(root),
            other => {
                return Err(VCardError::Xml(format!(
                    "expected a <vcards> root element, found <{other}>"
                )));
            }
        }
        tracing::debug!(cards = self.pending.len(), "xCard document parsed");
        Ok(())
    }

    fn warn(&mut self, warning: Warning) {
        record(&mut self.warnings, warning);
    }

    fn read_card(&mut self, element: Element) -> VCard {
        let mut card = VCard::with_version(VCardVersion::V4_0);
        for child in child_elements(element) {
            if child.name == "group" {
                let group = child.attr("name").map(str::to_string);
                for member in child_elements(child) {
                    if let Some(property) = self.read_property(member, group.clone()) {
                        card.add_property(property);
                    }
                }
            } else if let Some(property) = self.read_property(child, None) {
                card.add_property(property);
            }
        }
        tracing::debug!(properties = card.properties.len(), "xCard card read");
        card
    }

    fn read_property(&mut self, element: Element, group: Option<String>) -> Option<VCardProperty> {
        let name = element.name.to_ascii_uppercase();
        if element.namespace.as_deref().is_some_and(|ns| ns != VCARD_NS) {
            self.warn(Warning::for_property(
                &name,
                "element outside the vCard namespace skipped",
            ));
            return None;
        }

        let parameters = read_parameters(&element);
        let lookup = self.registry.lookup_xml(&element.name);
        if lookup.status == LookupStatus::Unrecognized {
            self.warn(Warning::for_property(
                &name,
                "unrecognized property; kept as raw text",
            ));
        }

        let xml = XmlElement::from_element(element);
        let mut ctx = ParseContext::new(VCardVersion::V4_0, name.clone());
        let outcome = lookup
            .scribe
            .parse_xml(&xml, parameters.clone(), &mut ctx)
            .or_raw(|| {
                let text = xml
                    .first_typed_value()
                    .map_or_else(|| xml.element().text(), |(_, value)| value);
                escape_text(&text, VCardVersion::V4_0)
            });
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
                let data_type = xml.first_typed_value().and_then(|(data_type, _)| data_type);
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
                    "embedded cards have no xCard form; property dropped",
                ));
                return None;
            }
        };
        property.group = group;
        Some(property)
    }
}

impl<R: Read> CardReader for XmlReader<R> {
    fn read_next(&mut self) -> VCardResult<Option<VCard>> {
        self.load()?;
        self.warnings.clear();
        Ok(self
            .pending
            .pop_front()
            .map(|element| self.read_card(element)))
    }

    fn warnings(&self) -> &[Warning] {
        &self.warnings
    }

    fn registry_mut(&mut self) -> &mut ScribeRegistry {
        &mut self.registry
    }
}

impl<R: Read> Iterator for XmlReader<R> {
    type Item = VCardResult<VCard>;

    fn next(&mut self) -> Option<Self::Item> {
        self.read_next().transpose()
    }
}

fn child_elements(element: Element) -> impl Iterator<Item = Element> {
    element.children.into_iter().filter_map(|node| match node {
        Node::Element(e) => Some(e),
        Node::Text(_) => None,
    })
}

/// Collects `<parameters>`: one child per parameter, one typed child per
/// value. A parameter with no typed children contributes its own text.
fn read_parameters(element: &Element) -> VCardParameters {
    let mut parameters = VCardParameters::new();
    for wrapper in element.elements_named(PARAMETERS_ELEMENT) {
        for parameter in wrapper.elements() {
            let name = parameter.name.to_ascii_uppercase();
            if parameter.elements().next().is_some() {
                parameters.put_all(&name, parameter.elements().map(Element::text));
            } else {
                parameters.put(&name, parameter.text().trim());
            }
        }
    }
    parameters
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{PropertyKind, param_names};

    fn read(xml: &str) -> (Vec<VCard>, Vec<Vec<Warning>>) {
        let mut reader = XmlReader::new(xml.as_bytes());
        let mut cards = Vec::new();
        let mut warnings = Vec::new();
        while let Some(card) = reader.read_next().unwrap() {
            cards.push(card);
            warnings.push(reader.warnings().to_vec());
        }
        (cards, warnings)
    }

    #[test_log::test]
    fn reads_properties_parameters_and_groups() {
        let (cards, warnings) = read(
            r#"<?xml version="1.0" encoding="UTF-8"?>
<vcards xmlns="urn:ietf:params:xml:ns:vcard-4.0">
  <vcard>
    <fn><text>Jane Doe</text></fn>
    <group name="item1">
      <email>
        <parameters>
          <type><text>work</text><text>internet</text></type>
          <pref><integer>1</integer></pref>
        </parameters>
        <text>jane@example.com</text>
      </email>
    </group>
  </vcard>
</vcards>"#,
        );
        assert_eq!(cards.len(), 1);
        assert!(warnings[0].is_empty());
        let card = &cards[0];
        assert_eq!(card.version, VCardVersion::V4_0);
        assert_eq!(card.formatted_name(), Some("Jane Doe"));

        let email = card.property(PropertyKind::Email).unwrap();
        assert_eq!(email.group.as_deref(), Some("item1"));
        assert_eq!(email.parameters.types(), ["work", "internet"]);
        assert_eq!(email.parameters.pref(), Some(1));
        assert_eq!(email.value().as_text(), Some("jane@example.com"));
    }

    #[test]
    fn unknown_elements_are_kept_raw() {
        let (cards, warnings) = read(
            r#"<vcards xmlns="urn:ietf:params:xml:ns:vcard-4.0"><vcard>
<x-shoe-size><unknown>9, wide</unknown></x-shoe-size>
<hobby><text>chess</text></hobby>
</vcard></vcards>"#,
        );
        let card = &cards[0];
        let shoe = card.properties_named("X-SHOE-SIZE")[0];
        assert_eq!(shoe.value().as_raw().unwrap().value, "9\\, wide");
        assert_eq!(card.properties_named("HOBBY").len(), 1);
        assert_eq!(warnings[0].len(), 1);
        assert_eq!(warnings[0][0].property.as_deref(), Some("HOBBY"));
    }

    #[test]
    fn unparsable_values_fall_back_to_raw() {
        let (cards, warnings) = read(
            r#"<vcards xmlns="urn:ietf:params:xml:ns:vcard-4.0"><vcard>
<geo><uri>not a geo uri</uri></geo>
</vcard></vcards>"#,
        );
        let geo = cards[0].properties_named("GEO")[0];
        assert_eq!(geo.kind(), PropertyKind::Extension);
        assert!(geo.value().as_raw().is_some());
        assert_eq!(warnings[0].len(), 1);
        assert!(warnings[0][0].message.ends_with("kept as raw text"));
    }

    #[test]
    fn foreign_namespace_elements_are_skipped() {
        let (cards, warnings) = read(
            r#"<vcards xmlns="urn:ietf:params:xml:ns:vcard-4.0"><vcard>
<fn><text>A</text></fn>
<x:note xmlns:x="urn:example"><x:text>other</x:text></x:note>
</vcard></vcards>"#,
        );
        assert_eq!(cards[0].properties.len(), 1);
        assert_eq!(warnings[0].len(), 1);
    }

    #[test]
    fn several_cards_and_bare_vcard_root() {
        let (cards, _) = read(
            r#"<vcards xmlns="urn:ietf:params:xml:ns:vcard-4.0">
<vcard><fn><text>A</text></fn></vcard>
<vcard><fn><text>B</text></fn></vcard>
</vcards>"#,
        );
        assert_eq!(cards.len(), 2);
        assert_eq!(cards[1].formatted_name(), Some("B"));

        let (cards, _) = read(
            r#"<vcard xmlns="urn:ietf:params:xml:ns:vcard-4.0"><fn><text>C</text></fn></vcard>"#,
        );
        assert_eq!(cards.len(), 1);
    }

    #[test]
    fn parameters_without_typed_children() {
        let element = tree::parse(
            b"<tel><parameters><type>cell</type></parameters><uri>tel:+1</uri></tel>",
            Dialect::Xml,
        )
        .unwrap();
        let tel = child_elements(element).next().unwrap();
        assert_eq!(read_parameters(&tel).get_all(param_names::TYPE), ["cell"]);
    }

    #[test]
    fn wrong_root_and_malformed_documents_are_errors() {
        let mut reader = XmlReader::new(&b"<html><body/></html>"[..]);
        assert!(matches!(reader.read_next(), Err(VCardError::Xml(_))));

        let mut reader = XmlReader::new(&b"<vcards><vcard>"[..]);
        assert!(reader.read_next().is_err());
    }
}
