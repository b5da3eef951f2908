//! Scribe for comma-separated text lists (NICKNAME, CATEGORIES).

use super::{
    HtmlElement, JCardValue, ParseContext, ParseOutcome, Scribe, WriteOutcome, XmlElement,
};
use crate::codec::escape::{parse_list, write_list};
use crate::core::{
    PropertyKind, PropertyValue, VCardDataType, VCardParameters, VCardProperty, VCardVersion,
};
use crate::error::{VCardError, VCardResult};

#[derive(Debug, Clone)]
pub struct ListScribe {
    kind: PropertyKind,
}

impl ListScribe {
    #[must_use]
    pub fn new(kind: PropertyKind) -> Self {
        Self { kind }
    }

    fn values<'a>(&self, property: &'a VCardProperty) -> VCardResult<&'a [String]> {
        property.value().as_text_list().ok_or_else(|| {
            VCardError::InvalidValue(format!(
                "{} cannot write a {} value",
                self.kind,
                property.value().shape()
            ))
        })
    }

    fn build(&self, values: Vec<String>, parameters: VCardParameters) -> ParseOutcome {
        ParseOutcome::property(self.kind, PropertyValue::TextList(values), parameters)
    }
}

impl Scribe for ListScribe {
    fn kind(&self) -> PropertyKind {
        self.kind
    }

    fn property_name(&self) -> &str {
        self.kind.name()
    }

    fn default_data_type(&self, _version: VCardVersion) -> Option<VCardDataType> {
        Some(VCardDataType::Text)
    }

    fn encode_text(
        &self,
        property: &VCardProperty,
        version: VCardVersion,
    ) -> VCardResult<WriteOutcome<String>> {
        Ok(WriteOutcome::Value(write_list(self.values(property)?, version)))
    }

    fn encode_xml(
        &self,
        property: &VCardProperty,
        _version: VCardVersion,
    ) -> VCardResult<WriteOutcome<XmlElement>> {
        let mut element = XmlElement::new(self.xml_name());
        element.append_all("text", self.values(property)?.iter().cloned());
        Ok(WriteOutcome::Value(element))
    }

    fn encode_json(
        &self,
        property: &VCardProperty,
        _version: VCardVersion,
    ) -> VCardResult<WriteOutcome<JCardValue>> {
        Ok(WriteOutcome::Value(JCardValue::multi(
            self.values(property)?.iter().cloned(),
        )))
    }

    /// One element listing every item; hCard pages usually carry one
    /// element per item, which reads back as one property each.
    fn encode_html(
        &self,
        property: &VCardProperty,
        _version: VCardVersion,
    ) -> VCardResult<WriteOutcome<HtmlElement>> {
        let mut element = HtmlElement::new("span", &self.html_class());
        element.push_text(self.values(property)?.join(", "));
        Ok(WriteOutcome::Value(element))
    }

    fn parse_text(
        &self,
        value: &str,
        _data_type: Option<&VCardDataType>,
        parameters: VCardParameters,
        _ctx: &mut ParseContext,
    ) -> ParseOutcome {
        self.build(parse_list(value), parameters)
    }

    fn parse_xml(
        &self,
        element: &XmlElement,
        parameters: VCardParameters,
        _ctx: &mut ParseContext,
    ) -> ParseOutcome {
        self.build(element.all("text"), parameters)
    }

    fn parse_json(
        &self,
        value: &JCardValue,
        _data_type: Option<&VCardDataType>,
        parameters: VCardParameters,
        _ctx: &mut ParseContext,
    ) -> ParseOutcome {
        let values = value.as_multi().into_iter().filter(|v| !v.is_empty()).collect();
        self.build(values, parameters)
    }

    fn parse_html(
        &self,
        element: &HtmlElement,
        parameters: VCardParameters,
        _ctx: &mut ParseContext,
    ) -> ParseOutcome {
        let values = element
            .value()
            .split(',')
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(str::to_string)
            .collect();
        self.build(values, parameters)
    }
}
