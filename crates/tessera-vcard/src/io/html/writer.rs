use std::io::Write;

use quick_xml::Writer;
use tessera_core::config::Settings;

use crate::core::{VCard, VCardVersion, Warning};
use crate::error::VCardResult;
use crate::io::policy::WritePolicy;
use crate::io::tree::{self, Dialect};
use crate::io::CardWriter;
use crate::registry::ScribeRegistry;
use crate::scribe::WriteOutcome;
use crate::scribe::wire::{Element, HtmlElement};

use super::CARD_CLASS;

/// Writes hCard fragments, one `<div class="vcard">` per card.
///
/// Values follow vCard 3.0 rules; properties that do not exist in 3.0 are
/// dropped with a warning. Parameters other than TYPE have no hCard form.
pub struct HtmlWriter<W: Write> {
    out: W,
    registry: ScribeRegistry,
    policy: WritePolicy,
    warnings: Vec<Warning>,
}

impl<W: Write> HtmlWriter<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            registry: ScribeRegistry::default(),
            policy: WritePolicy::default(),
            warnings: Vec::new(),
        }
    }

    pub fn from_settings(out: W, settings: &Settings) -> Self {
        Self::new(out).with_policy(WritePolicy::from_settings(settings))
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
        self.out
    }

    fn card_element(&mut self, card: &VCard, policy: WritePolicy) -> VCardResult<Element> {
        let properties = policy.prepare(card, VCardVersion::V3_0, &mut self.warnings);
        let mut root = HtmlElement::new("div", CARD_CLASS);
        for property in &properties {
            let scribe = self.registry.scribe_for(property);
            match scribe.write_html(property, VCardVersion::V3_0)? {
                WriteOutcome::Value(element) => {
                    root.element_mut().push_element(element.into_element());
                }
                WriteOutcome::Skip => {
                    tracing::debug!(name = property.name(), "No hCard value; property skipped");
                }
                WriteOutcome::EmbeddedCard(nested) => {
                    let nested_policy = WritePolicy {
                        include_prodid: false,
                    };
                    let mut element = self.card_element(&nested, nested_policy)?;
                    element.set_attr("class", format!("{} {CARD_CLASS}", scribe.html_class()));
                    root.element_mut().push_element(element);
                }
            }
        }
        Ok(root.into_element())
    }
}

impl<W: Write> CardWriter for HtmlWriter<W> {
    #[tracing::instrument(skip(self, card), fields(properties = card.properties.len()))]
    fn write(&mut self, card: &VCard) -> VCardResult<()> {
        self.warnings.clear();
        let element = self.card_element(card, self.policy)?;
        let mut writer = Writer::new(&mut self.out);
        tree::write_element(&mut writer, &element, Dialect::Html, None)?;
        self.out.write_all(b"\n")?;
        tracing::debug!(warnings = self.warnings.len(), "hCard card written");
        Ok(())
    }

    fn warnings(&self) -> &[Warning] {
        &self.warnings
    }

    fn registry_mut(&mut self) -> &mut ScribeRegistry {
        &mut self.registry
    }

    fn finish(&mut self) -> VCardResult<()> {
        self.out.flush()?;
        Ok(())
    }
}
