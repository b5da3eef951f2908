//! Scribe for telephone numbers (TEL).

use super::text::strip_scheme;
use super::{HtmlElement, ParseContext, ParseOutcome, Scribe, WriteOutcome};
use crate::codec::escape::{escape_text, unescape_text};
use crate::core::{
    PropertyKind, PropertyValue, TelUri, Telephone, VCardDataType, VCardParameters,
    VCardProperty, VCardVersion,
};
use crate::error::{VCardError, VCardResult};

/// TEL holds free text in every version; 4.0 also allows a `tel:` URI.
#[derive(Debug, Clone, Copy, Default)]
pub struct TelephoneScribe;

impl TelephoneScribe {
    fn telephone(property: &VCardProperty) -> VCardResult<&Telephone> {
        match property.value() {
            PropertyValue::Telephone(tel) => Ok(tel),
            other => Err(VCardError::InvalidValue(format!(
                "TEL cannot write a {} value",
                other.shape()
            ))),
        }
    }

    /// The number as text for versions without `tel:` URIs.
    fn uri_as_text(uri: &TelUri) -> String {
        match &uri.extension {
            Some(ext) => format!("{} x{ext}", uri.number),
            None => uri.number.clone(),
        }
    }

    fn build(telephone: Telephone, parameters: VCardParameters) -> ParseOutcome {
        ParseOutcome::property(
            PropertyKind::Telephone,
            PropertyValue::Telephone(telephone),
            parameters,
        )
    }

    fn parse_value(
        value: String,
        data_type: Option<&VCardDataType>,
        parameters: VCardParameters,
        ctx: &mut ParseContext,
    ) -> ParseOutcome {
        let implied = ctx.version == VCardVersion::V4_0
            && data_type.is_none()
            && looks_like_tel_uri(&value);
        let wants_uri = implied || data_type == Some(&VCardDataType::Uri);
        if wants_uri {
            if let Some(uri) = TelUri::parse(&value) {
                return Self::build(Telephone::Uri(uri), parameters);
            }
            ctx.warn(format!("\"{value}\" is not a tel: URI; kept as text"));
        }
        Self::build(Telephone::Text(value), parameters)
    }
}

fn looks_like_tel_uri(value: &str) -> bool {
    value
        .get(..4)
        .is_some_and(|s| s.eq_ignore_ascii_case("tel:"))
}

impl Scribe for TelephoneScribe {
    fn kind(&self) -> PropertyKind {
        PropertyKind::Telephone
    }

    fn property_name(&self) -> &str {
        "TEL"
    }

    fn default_data_type(&self, _version: VCardVersion) -> Option<VCardDataType> {
        Some(VCardDataType::Text)
    }

    fn data_type(&self, property: &VCardProperty, version: VCardVersion) -> Option<VCardDataType> {
        match property.value() {
            PropertyValue::Telephone(Telephone::Uri(_)) if version == VCardVersion::V4_0 => {
                Some(VCardDataType::Uri)
            }
            _ => Some(VCardDataType::Text),
        }
    }

    fn encode_text(
        &self,
        property: &VCardProperty,
        version: VCardVersion,
    ) -> VCardResult<WriteOutcome<String>> {
        let value = match Self::telephone(property)? {
            Telephone::Text(text) => escape_text(text, version),
            Telephone::Uri(uri) if version == VCardVersion::V4_0 => uri.to_uri(),
            Telephone::Uri(uri) => escape_text(&Self::uri_as_text(uri), version),
        };
        Ok(WriteOutcome::Value(value))
    }

    fn encode_plain(
        &self,
        property: &VCardProperty,
        version: VCardVersion,
    ) -> VCardResult<WriteOutcome<String>> {
        let value = match Self::telephone(property)? {
            Telephone::Text(text) => text.clone(),
            Telephone::Uri(uri) if version == VCardVersion::V4_0 => uri.to_uri(),
            Telephone::Uri(uri) => Self::uri_as_text(uri),
        };
        Ok(WriteOutcome::Value(value))
    }

    fn encode_html(
        &self,
        property: &VCardProperty,
        _version: VCardVersion,
    ) -> VCardResult<WriteOutcome<HtmlElement>> {
        let mut element = HtmlElement::new("div", "tel");
        for t in property.parameters.types() {
            element.append_child("span", "type", t.clone());
        }
        match Self::telephone(property)? {
            Telephone::Text(text) => element.append_child("span", "value", text.clone()),
            Telephone::Uri(uri) => {
                let mut link = HtmlElement::new("a", "value");
                link.set_attr("href", uri.to_uri());
                link.push_text(Self::uri_as_text(uri));
                element.element_mut().push_element(link.into_element());
            }
        }
        Ok(WriteOutcome::Value(element))
    }

    fn parse_text(
        &self,
        value: &str,
        data_type: Option<&VCardDataType>,
        parameters: VCardParameters,
        ctx: &mut ParseContext,
    ) -> ParseOutcome {
        let value = if looks_like_tel_uri(value) {
            value.to_string()
        } else {
            unescape_text(value)
        };
        Self::parse_value(value, data_type, parameters, ctx)
    }

    fn parse_plain(
        &self,
        value: &str,
        data_type: Option<&VCardDataType>,
        parameters: VCardParameters,
        ctx: &mut ParseContext,
    ) -> ParseOutcome {
        Self::parse_value(value.to_string(), data_type, parameters, ctx)
    }

    fn parse_html(
        &self,
        element: &HtmlElement,
        mut parameters: VCardParameters,
        ctx: &mut ParseContext,
    ) -> ParseOutcome {
        for t in element.types() {
            parameters.add_type(t);
        }
        let links = element.with_class("value");
        let source = if element.tag() == "a" {
            Some(element.clone())
        } else {
            links.into_iter().find(|e| e.tag() == "a")
        };
        let number = match source {
            Some(link) => strip_scheme(&link.uri_value(), "tel:").to_string(),
            None => element.value(),
        };
        Self::parse_value(number, None, parameters, ctx)
    }
}
