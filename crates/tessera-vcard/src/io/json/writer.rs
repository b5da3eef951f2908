use std::io::Write;

use serde_json::{Map, Value, json};
use tessera_core::config::Settings;

use crate::core::{VCard, VCardDataType, VCardProperty, VCardVersion, Warning, param_names};
use crate::error::VCardResult;
use crate::io::policy::WritePolicy;
use crate::io::{CardWriter, record};
use crate::registry::ScribeRegistry;
use crate::scribe::WriteOutcome;

use super::{GROUP_PARAMETER, UNKNOWN_TYPE, VCARD_TAG};

/// Writes jCard documents (RFC 7095).
///
/// Cards are collected until [`finish`](CardWriter::finish): a single card
/// is written on its own, anything else inside an outer array.
pub struct JsonWriter<W: Write> {
    out: W,
    pretty: bool,
    registry: ScribeRegistry,
    policy: WritePolicy,
    cards: Vec<Value>,
    warnings: Vec<Warning>,
    finished: bool,
}

impl<W: Write> JsonWriter<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            pretty: false,
            registry: ScribeRegistry::default(),
            policy: WritePolicy::default(),
            cards: Vec::new(),
            warnings: Vec::new(),
            finished: false,
        }
    }

    pub fn from_settings(out: W, settings: &Settings) -> Self {
        Self::new(out)
            .with_pretty_print(settings.output.pretty_print)
            .with_policy(WritePolicy::from_settings(settings))
    }

    #[must_use]
    pub fn with_pretty_print(mut self, pretty: bool) -> Self {
        self.pretty = pretty;
        self
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

    fn card_value(&mut self, card: &VCard) -> VCardResult<Value> {
        let properties = self
            .policy
            .prepare(card, VCardVersion::V4_0, &mut self.warnings);
        let mut entries = vec![json!(["version", {}, "text", VCardVersion::V4_0.as_str()])];
        for property in &properties {
            if let Some(entry) = self.property_value(property, card)? {
                entries.push(entry);
            }
        }
        Ok(json!([VCARD_TAG, entries]))
    }

    fn property_value(
        &mut self,
        property: &VCardProperty,
        card: &VCard,
    ) -> VCardResult<Option<Value>> {
        let scribe = self.registry.scribe_for(property);
        let mut parameters = scribe.prepare_parameters(property, VCardVersion::V4_0, card);
        parameters.remove_all(param_names::VALUE);
        let data_type = scribe.data_type(property, VCardVersion::V4_0);

        let value = match scribe.write_json(property, VCardVersion::V4_0)? {
            WriteOutcome::Value(value) => value,
            WriteOutcome::Skip => {
                tracing::debug!(name = property.name(), "No jCard value; property skipped");
                return Ok(None);
            }
            WriteOutcome::EmbeddedCard(_) => {
                record(
                    &mut self.warnings,
                    Warning::for_property(property.name(), "embedded cards have no jCard form"),
                );
                return Ok(None);
            }
        };

        let mut params = Map::new();
        if let Some(group) = &property.group {
            params.insert(GROUP_PARAMETER.to_string(), Value::String(group.clone()));
        }
        for (name, values) in &parameters {
            let value = match values {
                [single] => Value::String(single.clone()),
                many => Value::Array(many.iter().cloned().map(Value::String).collect()),
            };
            params.insert(name.to_ascii_lowercase(), value);
        }

        let type_name = data_type
            .as_ref()
            .map_or(UNKNOWN_TYPE, VCardDataType::name)
            .to_string();
        let mut entry = vec![
            Value::String(property.name().to_ascii_lowercase()),
            Value::Object(params),
            Value::String(type_name),
        ];
        let values = value.into_values();
        if values.is_empty() {
            entry.push(Value::String(String::new()));
        } else {
            entry.extend(values);
        }
        Ok(Some(Value::Array(entry)))
    }
}

impl<W: Write> CardWriter for JsonWriter<W> {
    #[tracing::instrument(skip(self, card), fields(properties = card.properties.len()))]
    fn write(&mut self, card: &VCard) -> VCardResult<()> {
        self.warnings.clear();
        let value = self.card_value(card)?;
        self.cards.push(value);
        tracing::debug!(warnings = self.warnings.len(), "jCard card written");
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
        let document = match self.cards.len() {
            1 => self.cards.remove(0),
            _ => Value::Array(std::mem::take(&mut self.cards)),
        };
        if self.pretty {
            serde_json::to_writer_pretty(&mut self.out, &document)?;
        } else {
            serde_json::to_writer(&mut self.out, &document)?;
        }
        self.out.flush()?;
        self.finished = true;
        Ok(())
    }
}
