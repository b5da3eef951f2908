//! Scribe for RELATED (4.0 only).

use super::text::strip_scheme;
use super::{HtmlElement, ParseContext, ParseOutcome, Scribe, WriteOutcome};
use crate::codec::escape::{escape_text, unescape_text};
use crate::core::{
    PropertyKind, PropertyValue, Related, VCard, VCardDataType, VCardParameters, VCardProperty,
    VCardVersion, param_names,
};
use crate::error::{VCardError, VCardResult};

#[derive(Debug, Clone, Copy, Default)]
pub struct RelatedScribe;

impl RelatedScribe {
    fn related(property: &VCardProperty) -> VCardResult<&Related> {
        match property.value() {
            PropertyValue::Related(related) => Ok(related),
            other => Err(VCardError::InvalidValue(format!(
                "RELATED cannot write a {} value",
                other.shape()
            ))),
        }
    }

    fn build(related: Related, parameters: VCardParameters) -> ParseOutcome {
        ParseOutcome::property(PropertyKind::Related, PropertyValue::Related(related), parameters)
    }
}

impl Scribe for RelatedScribe {
    fn kind(&self) -> PropertyKind {
        PropertyKind::Related
    }

    fn property_name(&self) -> &str {
        "RELATED"
    }

    fn default_data_type(&self, _version: VCardVersion) -> Option<VCardDataType> {
        Some(VCardDataType::Uri)
    }

    fn data_type(&self, property: &VCardProperty, _version: VCardVersion) -> Option<VCardDataType> {
        match property.value() {
            PropertyValue::Related(Related::Text(_)) => Some(VCardDataType::Text),
            _ => Some(VCardDataType::Uri),
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
        version: VCardVersion,
    ) -> VCardResult<WriteOutcome<String>> {
        Ok(WriteOutcome::Value(match Self::related(property)? {
            Related::Uri(uri) => uri.clone(),
            Related::Text(text) => escape_text(text, version),
        }))
    }

    fn encode_plain(
        &self,
        property: &VCardProperty,
        _version: VCardVersion,
    ) -> VCardResult<WriteOutcome<String>> {
        Ok(WriteOutcome::Value(match Self::related(property)? {
            Related::Uri(value) | Related::Text(value) => value.clone(),
        }))
    }

    fn encode_html(
        &self,
        property: &VCardProperty,
        _version: VCardVersion,
    ) -> VCardResult<WriteOutcome<HtmlElement>> {
        let mut element = match Self::related(property)? {
            Related::Uri(uri) => {
                let mut link = HtmlElement::new("a", "related");
                link.set_attr("href", uri.clone());
                link.push_text(strip_scheme(uri, "urn:uuid:"));
                link
            }
            Related::Text(text) => {
                let mut div = HtmlElement::new("div", "related");
                div.push_multiline(text);
                div
            }
        };
        let types = property.parameters.types();
        if !types.is_empty() {
            element.set_attr("rel", types.join(" "));
        }
        Ok(WriteOutcome::Value(element))
    }

    fn parse_text(
        &self,
        value: &str,
        data_type: Option<&VCardDataType>,
        parameters: VCardParameters,
        _ctx: &mut ParseContext,
    ) -> ParseOutcome {
        if data_type == Some(&VCardDataType::Text) {
            Self::build(Related::Text(unescape_text(value)), parameters)
        } else {
            Self::build(Related::Uri(value.to_string()), parameters)
        }
    }

    fn parse_plain(
        &self,
        value: &str,
        data_type: Option<&VCardDataType>,
        parameters: VCardParameters,
        _ctx: &mut ParseContext,
    ) -> ParseOutcome {
        if data_type == Some(&VCardDataType::Text) {
            Self::build(Related::Text(value.to_string()), parameters)
        } else {
            Self::build(Related::Uri(value.to_string()), parameters)
        }
    }

    fn parse_html(
        &self,
        element: &HtmlElement,
        mut parameters: VCardParameters,
        _ctx: &mut ParseContext,
    ) -> ParseOutcome {
        for rel in element.attr("rel").unwrap_or_default().split_whitespace() {
            parameters.add_type(rel.to_ascii_lowercase());
        }
        let uri = element.uri_value();
        if uri.is_empty() {
            Self::build(Related::Text(element.value()), parameters)
        } else {
            Self::build(Related::Uri(uri), parameters)
        }
    }
}
