//! Scribe for single text or URI values.

use super::{HtmlElement, ParseContext, ParseOutcome, Scribe, WriteOutcome};
use crate::codec::escape::{escape_text, unescape_text};
use crate::core::{
    PropertyKind, PropertyValue, VCard, VCardDataType, VCardParameters, VCardProperty,
    VCardVersion, param_names,
};
use crate::error::{VCardError, VCardResult};

/// Handles the plain text kinds (FN, NOTE, EMAIL, ...) and the URI kinds
/// (URL, SOURCE, MEMBER, ...).
///
/// A `VALUE` that differs from the kind's default is kept as a parameter so
/// it is written back unchanged.
#[derive(Debug, Clone)]
pub struct TextScribe {
    kind: PropertyKind,
}

impl TextScribe {
    #[must_use]
    pub fn new(kind: PropertyKind) -> Self {
        Self { kind }
    }

    fn is_uri(&self) -> bool {
        self.kind.accepts(&PropertyValue::Uri(String::new()))
    }

    fn value_of<'a>(&self, property: &'a VCardProperty) -> VCardResult<&'a str> {
        match property.value() {
            PropertyValue::Text(s) | PropertyValue::Uri(s) => Ok(s),
            other => Err(VCardError::InvalidValue(format!(
                "{} cannot write a {} value",
                self.kind,
                other.shape()
            ))),
        }
    }

    fn build(
        &self,
        value: String,
        data_type: Option<&VCardDataType>,
        mut parameters: VCardParameters,
        version: VCardVersion,
    ) -> ParseOutcome {
        if let Some(data_type) = data_type
            && Some(data_type) != self.default_data_type(version).as_ref()
        {
            parameters.set_value_type(data_type);
        }
        let value = if self.is_uri() {
            PropertyValue::Uri(value)
        } else {
            PropertyValue::Text(value)
        };
        ParseOutcome::property(self.kind, value, parameters)
    }
}

impl Scribe for TextScribe {
    fn kind(&self) -> PropertyKind {
        self.kind
    }

    fn property_name(&self) -> &str {
        self.kind.name()
    }

    fn default_data_type(&self, version: VCardVersion) -> Option<VCardDataType> {
        match self.kind {
            PropertyKind::Language if version == VCardVersion::V4_0 => {
                Some(VCardDataType::LanguageTag)
            }
            PropertyKind::Url if version == VCardVersion::V2_1 => None,
            _ if self.is_uri() => Some(VCardDataType::Uri),
            _ => Some(VCardDataType::Text),
        }
    }

    fn data_type(&self, property: &VCardProperty, version: VCardVersion) -> Option<VCardDataType> {
        property
            .parameters
            .value_type()
            .or_else(|| self.default_data_type(version))
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
        let value = self.value_of(property)?;
        if self.is_uri() {
            Ok(WriteOutcome::Value(value.to_string()))
        } else {
            Ok(WriteOutcome::Value(escape_text(value, version)))
        }
    }

    fn encode_plain(
        &self,
        property: &VCardProperty,
        _version: VCardVersion,
    ) -> VCardResult<WriteOutcome<String>> {
        Ok(WriteOutcome::Value(self.value_of(property)?.to_string()))
    }

    fn encode_html(
        &self,
        property: &VCardProperty,
        _version: VCardVersion,
    ) -> VCardResult<WriteOutcome<HtmlElement>> {
        let value = self.value_of(property)?;
        let class = self.html_class();
        let element = match self.kind {
            PropertyKind::Email => {
                let mut a = HtmlElement::new("a", &class);
                a.set_attr("href", format!("mailto:{value}"));
                a.push_text(value);
                a
            }
            _ if self.is_uri() => {
                let mut a = HtmlElement::new("a", &class);
                a.set_attr("href", value);
                a.push_text(value);
                a
            }
            _ => {
                let mut div = HtmlElement::new("div", &class);
                div.push_multiline(value);
                div
            }
        };
        Ok(WriteOutcome::Value(element))
    }

    fn parse_text(
        &self,
        value: &str,
        data_type: Option<&VCardDataType>,
        parameters: VCardParameters,
        ctx: &mut ParseContext,
    ) -> ParseOutcome {
        let value = if self.is_uri() {
            value.to_string()
        } else {
            unescape_text(value)
        };
        self.build(value, data_type, parameters, ctx.version)
    }

    fn parse_plain(
        &self,
        value: &str,
        data_type: Option<&VCardDataType>,
        parameters: VCardParameters,
        ctx: &mut ParseContext,
    ) -> ParseOutcome {
        self.build(value.to_string(), data_type, parameters, ctx.version)
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
        let value = match self.kind {
            PropertyKind::Email => {
                let href = element.uri_value();
                strip_scheme(&href, "mailto:").to_string()
            }
            _ if self.is_uri() => element.uri_value(),
            _ => element.value(),
        };
        self.build(value, None, parameters, ctx.version)
    }
}

/// Removes a case-insensitive URI scheme prefix and any query.
pub(super) fn strip_scheme<'a>(value: &'a str, scheme: &str) -> &'a str {
    match value.get(..scheme.len()) {
        Some(prefix) if prefix.eq_ignore_ascii_case(scheme) => {
            let rest = &value[scheme.len()..];
            rest.split_once('?').map_or(rest, |(head, _)| head)
        }
        _ => value,
    }
}
