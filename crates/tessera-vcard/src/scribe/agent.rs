//! Scribe for AGENT (2.1 and 3.0).
//!
//! The value is usually a whole card. Writing hands it back as
//! [`WriteOutcome::EmbeddedCard`] and parsing asks the reader for it through
//! [`ParseOutcome::EmbeddedCard`]; the document readers and writers own the
//! nesting.

use super::{HtmlElement, NestedCard, ParseContext, ParseOutcome, Scribe, WriteOutcome};
use crate::codec::escape::unescape_text;
use crate::core::{
    Agent, PropertyKind, PropertyValue, VCard, VCardDataType, VCardParameters, VCardProperty,
    VCardVersion, param_names,
};
use crate::error::{VCardError, VCardResult};

#[derive(Debug, Clone, Copy, Default)]
pub struct AgentScribe;

impl AgentScribe {
    fn agent(property: &VCardProperty) -> VCardResult<&Agent> {
        match property.value() {
            PropertyValue::Agent(agent) => Ok(agent),
            other => Err(VCardError::InvalidValue(format!(
                "AGENT cannot write a {} value",
                other.shape()
            ))),
        }
    }

    /// Property the reader fills in once the nested card is parsed.
    fn placeholder(parameters: VCardParameters) -> VCardProperty {
        let mut property = VCardProperty::agent(Agent::Card(Box::default()));
        property.parameters = parameters;
        property
    }

    fn embedded(parameters: VCardParameters, nested: NestedCard) -> ParseOutcome {
        ParseOutcome::EmbeddedCard {
            property: Self::placeholder(parameters),
            nested,
        }
    }

    fn uri(value: &str, parameters: VCardParameters) -> ParseOutcome {
        ParseOutcome::property(
            PropertyKind::Agent,
            PropertyValue::Agent(Agent::Uri(value.to_string())),
            parameters,
        )
    }

    fn parse_value(
        value: &str,
        data_type: Option<&VCardDataType>,
        parameters: VCardParameters,
        ctx: &ParseContext,
    ) -> ParseOutcome {
        if matches!(data_type, Some(VCardDataType::Url | VCardDataType::Uri)) {
            return Self::uri(value.trim(), parameters);
        }
        let trimmed = value.trim();
        if trimmed.is_empty() && ctx.version == VCardVersion::V2_1 {
            return Self::embedded(parameters, NestedCard::Inline);
        }
        let starts_card = trimmed
            .get(..6)
            .is_some_and(|s| s.eq_ignore_ascii_case("BEGIN:"));
        if starts_card {
            return Self::embedded(parameters, NestedCard::Text(trimmed.to_string()));
        }
        ParseOutcome::cannot_parse(value, "AGENT value is neither a card nor a URI")
    }
}

impl Scribe for AgentScribe {
    fn kind(&self) -> PropertyKind {
        PropertyKind::Agent
    }

    fn property_name(&self) -> &str {
        "AGENT"
    }

    fn default_data_type(&self, _version: VCardVersion) -> Option<VCardDataType> {
        None
    }

    fn data_type(&self, property: &VCardProperty, version: VCardVersion) -> Option<VCardDataType> {
        match property.value() {
            PropertyValue::Agent(Agent::Uri(_)) if version == VCardVersion::V2_1 => {
                Some(VCardDataType::Url)
            }
            PropertyValue::Agent(Agent::Uri(_)) => Some(VCardDataType::Uri),
            _ => None,
        }
    }

    fn adjust_parameters(
        &self,
        _property: &VCardProperty,
        _version: VCardVersion,
        _card: &VCard,
        parameters: &mut VCardParameters,
    ) {
        parameters.remove_all(param_names::VALUE);
    }

    fn encode_text(
        &self,
        property: &VCardProperty,
        _version: VCardVersion,
    ) -> VCardResult<WriteOutcome<String>> {
        Ok(match Self::agent(property)? {
            Agent::Card(card) => WriteOutcome::EmbeddedCard(card.as_ref().clone()),
            Agent::Uri(uri) => WriteOutcome::Value(uri.clone()),
        })
    }

    fn encode_plain(
        &self,
        property: &VCardProperty,
        version: VCardVersion,
    ) -> VCardResult<WriteOutcome<String>> {
        self.encode_text(property, version)
    }

    fn encode_html(
        &self,
        property: &VCardProperty,
        _version: VCardVersion,
    ) -> VCardResult<WriteOutcome<HtmlElement>> {
        Ok(match Self::agent(property)? {
            Agent::Card(card) => WriteOutcome::EmbeddedCard(card.as_ref().clone()),
            Agent::Uri(uri) => {
                let mut link = HtmlElement::new("a", "agent");
                link.set_attr("href", uri.clone());
                link.push_text(uri.clone());
                WriteOutcome::Value(link)
            }
        })
    }

    fn parse_text(
        &self,
        value: &str,
        data_type: Option<&VCardDataType>,
        parameters: VCardParameters,
        ctx: &mut ParseContext,
    ) -> ParseOutcome {
        let value = if matches!(data_type, Some(VCardDataType::Url | VCardDataType::Uri)) {
            value.to_string()
        } else {
            unescape_text(value)
        };
        Self::parse_value(&value, data_type, parameters, ctx)
    }

    fn parse_plain(
        &self,
        value: &str,
        data_type: Option<&VCardDataType>,
        parameters: VCardParameters,
        ctx: &mut ParseContext,
    ) -> ParseOutcome {
        Self::parse_value(value, data_type, parameters, ctx)
    }

    fn parse_html(
        &self,
        element: &HtmlElement,
        parameters: VCardParameters,
        _ctx: &mut ParseContext,
    ) -> ParseOutcome {
        if element.has_class("vcard") {
            return Self::embedded(parameters, NestedCard::Html(element.clone()));
        }
        let uri = element.uri_value();
        if uri.is_empty() {
            let text = element.value();
            ParseOutcome::cannot_parse(text, "AGENT element is neither an hCard nor a link")
        } else {
            Self::uri(&uri, parameters)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(
        value: &str,
        data_type: Option<&VCardDataType>,
        version: VCardVersion,
    ) -> ParseOutcome {
        let mut ctx = ParseContext::new(version, "AGENT");
        AgentScribe.parse_text(value, data_type, VCardParameters::new(), &mut ctx)
    }

    #[test]
    fn empty_2_1_value_reads_inline() {
        let ParseOutcome::EmbeddedCard { property, nested } = parse("", None, VCardVersion::V2_1)
        else {
            panic!("expected embedded card");
        };
        assert_eq!(nested, NestedCard::Inline);
        assert_eq!(property.kind(), PropertyKind::Agent);
    }

    #[test]
    fn escaped_3_0_card_is_unescaped() {
        let outcome = parse(
            "BEGIN:VCARD\\nVERSION:3.0\\nFN:Jane\\, Assistant\\nEND:VCARD",
            None,
            VCardVersion::V3_0,
        );
        let ParseOutcome::EmbeddedCard { nested, .. } = outcome else {
            panic!("expected embedded card");
        };
        assert_eq!(
            nested,
            NestedCard::Text("BEGIN:VCARD\nVERSION:3.0\nFN:Jane, Assistant\nEND:VCARD".into())
        );
    }

    #[test]
    fn uri_values() {
        let ParseOutcome::Property(prop) =
            parse("CID:JQPUBLIC.part3", Some(&VCardDataType::Url), VCardVersion::V2_1)
        else {
            panic!("expected property");
        };
        assert_eq!(
            AgentScribe.value_parameter(&prop, VCardVersion::V2_1),
            Some(VCardDataType::Url)
        );
        assert_eq!(
            AgentScribe.value_parameter(&prop, VCardVersion::V3_0),
            Some(VCardDataType::Uri)
        );
        assert_eq!(
            AgentScribe.write_text(&prop, VCardVersion::V3_0).unwrap(),
            WriteOutcome::Value("CID:JQPUBLIC.part3".to_string())
        );
    }

    #[test]
    fn card_values_are_handed_back() {
        let mut nested = VCard::with_version(VCardVersion::V3_0);
        nested.add_property(VCardProperty::text(PropertyKind::FormattedName, "Jane"));
        let prop = VCardProperty::agent(Agent::Card(Box::new(nested.clone())));
        assert_eq!(
            AgentScribe.write_text(&prop, VCardVersion::V3_0).unwrap(),
            WriteOutcome::EmbeddedCard(nested)
        );
    }

    #[test]
    fn plain_text_cannot_parse() {
        assert!(matches!(
            parse("my assistant", None, VCardVersion::V3_0),
            ParseOutcome::CannotParse { .. }
        ));
    }
}
