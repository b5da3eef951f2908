//! Scribe for the structured name (N).

use super::{
    HtmlElement, JCardValue, ParseContext, ParseOutcome, Scribe, StructuredBuilder,
    StructuredIterator, WriteOutcome, XmlElement,
};
use crate::core::{
    PropertyKind, PropertyValue, StructuredName, VCardDataType, VCardParameters, VCardProperty,
    VCardVersion,
};
use crate::error::{VCardError, VCardResult};

/// xCard element names, in component order.
const XML_NAMES: [&str; 5] = ["surname", "given", "additional", "prefix", "suffix"];

/// hCard class names, in component order.
const HTML_CLASSES: [&str; 5] = [
    "family-name",
    "given-name",
    "additional-name",
    "honorific-prefix",
    "honorific-suffix",
];

#[derive(Debug, Clone, Copy, Default)]
pub struct StructuredNameScribe;

impl StructuredNameScribe {
    fn name(property: &VCardProperty) -> VCardResult<&StructuredName> {
        property.value().as_structured_name().ok_or_else(|| {
            VCardError::InvalidValue(format!("N cannot write a {} value", property.value().shape()))
        })
    }

    fn builder(name: &StructuredName) -> StructuredBuilder {
        name.components()
            .into_iter()
            .fold(StructuredBuilder::new(), |b, values| {
                b.append_values(values.iter().cloned())
            })
    }

    fn build(mut it: StructuredIterator, parameters: VCardParameters) -> ParseOutcome {
        let components = (0..5).map(|_| it.next_values()).collect();
        let name = StructuredName::from_components(components);
        ParseOutcome::property(
            PropertyKind::StructuredName,
            PropertyValue::StructuredName(name),
            parameters,
        )
    }
}

impl Scribe for StructuredNameScribe {
    fn kind(&self) -> PropertyKind {
        PropertyKind::StructuredName
    }

    fn property_name(&self) -> &str {
        "N"
    }

    fn default_data_type(&self, _version: VCardVersion) -> Option<VCardDataType> {
        Some(VCardDataType::Text)
    }

    fn encode_text(
        &self,
        property: &VCardProperty,
        version: VCardVersion,
    ) -> VCardResult<WriteOutcome<String>> {
        let name = Self::name(property)?;
        Ok(WriteOutcome::Value(Self::builder(name).build_text(version)))
    }

    fn encode_xml(
        &self,
        property: &VCardProperty,
        _version: VCardVersion,
    ) -> VCardResult<WriteOutcome<XmlElement>> {
        let name = Self::name(property)?;
        let mut element = XmlElement::new("n");
        for (tag, values) in XML_NAMES.iter().zip(name.components()) {
            if values.is_empty() {
                element.append(tag, "");
            } else {
                element.append_all(tag, values.iter().cloned());
            }
        }
        Ok(WriteOutcome::Value(element))
    }

    fn encode_json(
        &self,
        property: &VCardProperty,
        _version: VCardVersion,
    ) -> VCardResult<WriteOutcome<JCardValue>> {
        let name = Self::name(property)?;
        Ok(WriteOutcome::Value(JCardValue::structured(
            Self::builder(name).into_components(),
        )))
    }

    fn encode_html(
        &self,
        property: &VCardProperty,
        _version: VCardVersion,
    ) -> VCardResult<WriteOutcome<HtmlElement>> {
        let name = Self::name(property)?;
        let mut element = HtmlElement::new("span", "n");
        for (class, values) in HTML_CLASSES.iter().zip(name.components()) {
            for value in values {
                element.append_child("span", class, value.clone());
            }
        }
        Ok(WriteOutcome::Value(element))
    }

    fn parse_text(
        &self,
        value: &str,
        _data_type: Option<&VCardDataType>,
        parameters: VCardParameters,
        _ctx: &mut ParseContext,
    ) -> ParseOutcome {
        Self::build(StructuredIterator::parse(value), parameters)
    }

    fn parse_xml(
        &self,
        element: &XmlElement,
        parameters: VCardParameters,
        _ctx: &mut ParseContext,
    ) -> ParseOutcome {
        let components = XML_NAMES.iter().map(|tag| element.all(tag)).collect();
        Self::build(StructuredIterator::from_components(components), parameters)
    }

    fn parse_json(
        &self,
        value: &JCardValue,
        _data_type: Option<&VCardDataType>,
        parameters: VCardParameters,
        _ctx: &mut ParseContext,
    ) -> ParseOutcome {
        Self::build(
            StructuredIterator::from_components(value.as_structured()),
            parameters,
        )
    }

    fn parse_html(
        &self,
        element: &HtmlElement,
        parameters: VCardParameters,
        _ctx: &mut ParseContext,
    ) -> ParseOutcome {
        let components = HTML_CLASSES
            .iter()
            .map(|class| element.with_class(class).iter().map(HtmlElement::value).collect())
            .collect();
        Self::build(StructuredIterator::from_components(components), parameters)
    }
}
