use std::collections::VecDeque;
use std::io::Read;
use std::sync::Arc;

use crate::codec::escape::escape_text;
use crate::core::{
    Agent, PropertyValue, RawValue, VCard, VCardParameters, VCardProperty, VCardVersion, Warning,
};
use crate::error::VCardResult;
use crate::io::tree::{self, Dialect};
use crate::io::{CardReader, record};
use crate::registry::ScribeRegistry;
use crate::scribe::wire::{Element, HtmlElement, element_classes, has_class};
use crate::scribe::{NestedCard, ParseContext, ParseOutcome, Scribe};

use super::CARD_CLASS;

/// Reads hCard microformats out of an HTML page.
///
/// Every element with the `vcard` class that is not inside another one is a
/// card. Its descendants are matched to scribes by class name; a `vcard`
/// element nested inside it belongs to an AGENT property or is ignored.
/// Cards are read with vCard 3.0 rules.
pub struct HtmlReader<R> {
    source: Option<R>,
    pending: VecDeque<Element>,
    registry: ScribeRegistry,
    warnings: Vec<Warning>,
}

impl<R: Read> HtmlReader<R> {
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
        let document = tree::parse(&input, Dialect::Html)?;
        let mut roots = Vec::new();
        collect_cards(&document, &mut roots);
        self.pending.extend(roots.into_iter().cloned());
        tracing::debug!(cards = self.pending.len(), "hCard page parsed");
        Ok(())
    }

    fn warn(&mut self, warning: Warning) {
        record(&mut self.warnings, warning);
    }

    fn read_card(&mut self, root: &Element) -> VCardResult<VCard> {
        let mut card = VCard::with_version(VCardVersion::V3_0);
        self.visit(root, &mut card)?;
        tracing::debug!(properties = card.properties.len(), "hCard card read");
        Ok(card)
    }

    fn visit(&mut self, element: &Element, card: &mut VCard) -> VCardResult<()> {
        for child in element.elements() {
            for class in element_classes(child) {
                if let Some(scribe) = self.registry.lookup_html_class(&class) {
                    let html = HtmlElement::from_element(child.clone());
                    self.read_property(&scribe, &html, card)?;
                }
            }
            if !has_class(child, CARD_CLASS) {
                self.visit(child, card)?;
            }
        }
        Ok(())
    }

    fn read_property(
        &mut self,
        scribe: &Arc<dyn Scribe>,
        element: &HtmlElement,
        card: &mut VCard,
    ) -> VCardResult<()> {
        let name = scribe.property_name().to_string();
        let mut ctx = ParseContext::new(VCardVersion::V3_0, name.clone());
        let outcome = scribe
            .parse_html(element, VCardParameters::new(), &mut ctx)
            .or_raw(|| escape_text(&element.value(), VCardVersion::V3_0));
        for warning in ctx.take_warnings() {
            self.warn(warning);
        }

        match outcome {
            ParseOutcome::Property(property) => card.add_property(property),
            ParseOutcome::CannotParse { raw, reason } => {
                self.warn(Warning::for_property(
                    &name,
                    format!("{reason}; kept as raw text"),
                ));
                card.add_property(VCardProperty::extension(
                    &name,
                    PropertyValue::Raw(RawValue::new(raw)),
                ));
            }
            ParseOutcome::EmbeddedCard {
                mut property,
                nested: NestedCard::Html(nested),
            } => {
                let outer = std::mem::take(&mut self.warnings);
                let nested_card = self.read_card(nested.element())?;
                let inner = std::mem::replace(&mut self.warnings, outer);
                self.warnings.extend(inner);
                property.set_value(PropertyValue::Agent(Agent::Card(Box::new(nested_card))))?;
                card.add_property(property);
            }
            ParseOutcome::EmbeddedCard { .. } => {
                self.warn(Warning::for_property(
                    &name,
                    "embedded card is not an hCard; property dropped",
                ));
            }
        }
        Ok(())
    }
}

impl<R: Read> CardReader for HtmlReader<R> {
    fn read_next(&mut self) -> VCardResult<Option<VCard>> {
        self.load()?;
        self.warnings.clear();
        match self.pending.pop_front() {
            Some(root) => self.read_card(&root).map(Some),
            None => Ok(None),
        }
    }

    fn warnings(&self) -> &[Warning] {
        &self.warnings
    }

    fn registry_mut(&mut self) -> &mut ScribeRegistry {
        &mut self.registry
    }
}

impl<R: Read> Iterator for HtmlReader<R> {
    type Item = VCardResult<VCard>;

    fn next(&mut self) -> Option<Self::Item> {
        self.read_next().transpose()
    }
}

/// Outermost `vcard` elements, in document order.
fn collect_cards<'a>(element: &'a Element, out: &mut Vec<&'a Element>) {
    for child in element.elements() {
        if has_class(child, CARD_CLASS) {
            out.push(child);
        } else {
            collect_cards(child, out);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{PropertyKind, Telephone};

    fn read(html: &str) -> (Vec<VCard>, Vec<Vec<Warning>>) {
        let mut reader = HtmlReader::new(html.as_bytes());
        let mut cards = Vec::new();
        let mut warnings = Vec::new();
        while let Some(card) = reader.read_next().unwrap() {
            cards.push(card);
            warnings.push(reader.warnings().to_vec());
        }
        (cards, warnings)
    }

    #[test_log::test]
    fn reads_an_hcard() {
        let (cards, warnings) = read(
            r#"<!DOCTYPE html>
<html><head><meta charset="utf-8"><title>Contact</title></head>
<body>
<div class="vcard">
  <a class="url fn" href="http://example.com/jane">Jane   Doe</a>
  <div class="tel"><span class="type">Work</span> <span class="value">+1-555-555-0100</span></div>
  <a class="email" href="mailto:jane@example.com">Write to Jane</a>
  <div class="note">First line<br>Second line</div>
  <span class="category">friends</span>, <span class="category">colleagues</span>
</div>
</body></html>"#,
        );
        assert_eq!(cards.len(), 1);
        assert!(warnings[0].is_empty(), "{:?}", warnings[0]);
        let card = &cards[0];
        assert_eq!(card.version, VCardVersion::V3_0);
        assert_eq!(card.formatted_name(), Some("Jane Doe"));
        assert_eq!(
            card.property(PropertyKind::Url).unwrap().value().as_uri(),
            Some("http://example.com/jane")
        );
        let tel = card.property(PropertyKind::Telephone).unwrap();
        assert_eq!(tel.parameters.types(), ["work"]);
        assert_eq!(
            tel.value(),
            &PropertyValue::Telephone(Telephone::Text("+1-555-555-0100".into()))
        );
        assert_eq!(
            card.property(PropertyKind::Email).unwrap().value().as_text(),
            Some("jane@example.com")
        );
        assert_eq!(
            card.property(PropertyKind::Note).unwrap().value().as_text(),
            Some("First line\nSecond line")
        );
        assert_eq!(card.properties_of(PropertyKind::Categories).count(), 2);
    }

    #[test]
    fn several_cards_and_nested_agent() {
        let (cards, _) = read(
            r#"<ul>
<li class="vcard"><span class="fn">Boss</span>
  <div class="agent vcard"><span class="fn">Assistant</span></div>
</li>
<li class="vcard"><span class="fn">Other</span></li>
</ul>"#,
        );
        assert_eq!(cards.len(), 2);
        let boss = &cards[0];
        assert_eq!(boss.properties_of(PropertyKind::FormattedName).count(), 1);
        let agent = boss.property(PropertyKind::Agent).unwrap();
        let PropertyValue::Agent(Agent::Card(nested)) = agent.value() else {
            panic!("expected an embedded card, got {:?}", agent.value());
        };
        assert_eq!(nested.formatted_name(), Some("Assistant"));
        assert_eq!(cards[1].formatted_name(), Some("Other"));
    }

    #[test]
    fn unparsable_values_become_raw() {
        let (cards, warnings) = read(
            r#"<div class="vcard"><span class="fn">A</span><span class="geo">nowhere</span></div>"#,
        );
        let geo = cards[0].properties_named("GEO")[0];
        assert_eq!(geo.kind(), PropertyKind::Extension);
        assert_eq!(warnings[0].len(), 1);
    }

    #[test]
    fn pages_without_cards_are_empty() {
        let (cards, _) = read("<html><body><p>Nothing here</body></html>");
        assert!(cards.is_empty());
    }
}
