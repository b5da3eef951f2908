use std::io::Write;

use quick_xml::Writer;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, Event};
use tessera_core::config::Settings;

use crate::core::{
    ParameterCatalog, VCard, VCardParameters, VCardProperty, VCardVersion, Warning, param_names,
};
use crate::error::VCardResult;
use crate::io::policy::WritePolicy;
use crate::io::tree::{self, Dialect};
use crate::io::{CardWriter, record};
use crate::registry::ScribeRegistry;
use crate::scribe::WriteOutcome;
use crate::scribe::wire::{Element, Node, PARAMETERS_ELEMENT, VCARD_NS, XmlElement};

const ROOT: &str = "vcards";

/// Writes xCard documents (RFC 6351).
///
/// Cards are streamed inside one `<vcards>` root; [`finish`](CardWriter::finish)
/// closes it.
pub struct XmlWriter<W: Write> {
    writer: Writer<W>,
    registry: ScribeRegistry,
    catalog: ParameterCatalog,
    policy: WritePolicy,
    warnings: Vec<Warning>,
    started: bool,
    finished: bool,
}

impl<W: Write> XmlWriter<W> {
    pub fn new(out: W) -> Self {
        Self::with_writer(Writer::new(out))
    }

    /// A writer that indents nested elements by two spaces.
    pub fn pretty(out: W) -> Self {
        Self::with_writer(Writer::new_with_indent(out, b' ', 2))
    }

    pub fn from_settings(out: W, settings: &Settings) -> Self {
        let writer = if settings.output.pretty_print {
            Self::pretty(out)
        } else {
            Self::new(out)
        };
        writer.with_policy(WritePolicy::from_settings(settings))
    }

    fn with_writer(writer: Writer<W>) -> Self {
        Self {
            writer,
            registry: ScribeRegistry::default(),
            catalog: ParameterCatalog::new(),
            policy: WritePolicy::default(),
            warnings: Vec::new(),
            started: false,
            finished: false,
        }
    }

    #[must_use]
    pub fn with_registry(mut self, registry: ScribeRegistry) -> Self {
        self.registry = registry;
        self
    }

    #[must_use]
    pub fn with_policy(mut self, policy: WritePolicy) -> Self {
        self.policy = policy;
        self
    }

    #[must_use]
    pub fn with_prodid(mut self, include: bool) -> Self {
        self.policy.include_prodid = include;
        self
    }

    pub fn into_inner(self) -> W {
        self.writer.into_inner()
    }

    fn start_document(&mut self) -> VCardResult<()> {
        if self.started {
            return Ok(());
        }
        self.writer
            .write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
        let mut root = BytesStart::new(ROOT);
        root.push_attribute(("xmlns", VCARD_NS));
        self.writer.write_event(Event::Start(root))?;
        self.started = true;
        Ok(())
    }

    fn card_element(&mut self, card: &VCard) -> VCardResult<Element> {
        let properties = self
            .policy
            .prepare(card, VCardVersion::V4_0, &mut self.warnings);
        let mut vcard = XmlElement::new("vcard").into_element();
        for property in &properties {
            let Some(element) = self.property_element(property, card)? else {
                continue;
            };
            match &property.group {
                Some(group) => push_grouped(&mut vcard, group, element),
                None => vcard.push_element(element),
            }
        }
        Ok(vcard)
    }

    fn property_element(
        &mut self,
        property: &VCardProperty,
        card: &VCard,
    ) -> VCardResult<Option<Element>> {
        let scribe = self.registry.scribe_for(property);
        let mut parameters = scribe.prepare_parameters(property, VCardVersion::V4_0, card);
        parameters.remove_all(param_names::VALUE);

        match scribe.write_xml(property, VCardVersion::V4_0)? {
            WriteOutcome::Value(xml) => {
                let mut element = xml.into_element();
                if !parameters.is_empty() {
                    let wrapper = self.parameters_element(&parameters);
                    element.children.insert(0, Node::Element(wrapper));
                }
                Ok(Some(element))
            }
            WriteOutcome::Skip => {
                tracing::debug!(name = property.name(), "No xCard value; property skipped");
                Ok(None)
            }
            WriteOutcome::EmbeddedCard(_) => {
                record(
                    &mut self.warnings,
                    Warning::for_property(property.name(), "embedded cards have no xCard form"),
                );
                Ok(None)
            }
        }
    }

    /// `<parameters>` with one element per parameter and one typed child
    /// per value.
    fn parameters_element(&self, parameters: &VCardParameters) -> Element {
        let mut wrapper = XmlElement::new(PARAMETERS_ELEMENT).into_element();
        for (name, values) in parameters {
            let data_type = self.catalog.xml_data_type(name);
            let mut parameter = XmlElement::new(name.to_ascii_lowercase());
            for value in values {
                parameter.append_typed(data_type, value.as_str());
            }
            wrapper.push_element(parameter.into_element());
        }
        wrapper
    }
}

/// Appends `element` to the `<group name="...">` child of `vcard`, creating
/// the group on first use.
fn push_grouped(vcard: &mut Element, name: &str, element: Element) {
    let existing = vcard.children.iter_mut().find_map(|node| match node {
        Node::Element(e) if e.name == "group" && e.attr("name") == Some(name) => Some(e),
        _ => None,
    });
    match existing {
        Some(group) => group.push_element(element),
        None => {
            let mut group = XmlElement::new("group").into_element();
            group.set_attr("name", name);
            group.push_element(element);
            vcard.push_element(group);
        }
    }
}

impl<W: Write> CardWriter for XmlWriter<W> {
    #[tracing::instrument(skip(self, card), fields(properties = card.properties.len()))]
    fn write(&mut self, card: &VCard) -> VCardResult<()> {
        self.warnings.clear();
        self.start_document()?;
        let element = self.card_element(card)?;
        tree::write_element(&mut self.writer, &element, Dialect::Xml, Some(VCARD_NS))?;
        tracing::debug!(warnings = self.warnings.len(), "xCard card written");
        Ok(())
    }

    fn warnings(&self) -> &[Warning] {
        &self.warnings
    }

    fn registry_mut(&mut self) -> &mut ScribeRegistry {
        &mut self.registry
    }

    fn finish(&mut self) -> VCardResult<()> {
        if self.finished {
            return Ok(());
        }
        self.start_document()?;
        self.writer.write_event(Event::End(BytesEnd::new(ROOT)))?;
        self.writer.get_mut().flush()?;
        self.finished = true;
        Ok(())
    }
}
