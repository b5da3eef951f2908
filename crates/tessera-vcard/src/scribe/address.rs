//! Scribe for delivery addresses (ADR).

use super::{
    HtmlElement, JCardValue, ParseContext, ParseOutcome, Scribe, StructuredBuilder,
    StructuredIterator, WriteOutcome, XmlElement,
};
use crate::core::{
    Address, PropertyKind, PropertyValue, VCard, VCardDataType, VCardParameters, VCardProperty,
    VCardVersion, param_names,
};
use crate::error::{VCardError, VCardResult};

const XML_NAMES: [&str; 7] = ["pobox", "ext", "street", "locality", "region", "code", "country"];

const HTML_CLASSES: [&str; 7] = [
    "post-office-box",
    "extended-address",
    "street-address",
    "locality",
    "region",
    "postal-code",
    "country-name",
];

#[derive(Debug, Clone, Copy, Default)]
pub struct AddressScribe;

impl AddressScribe {
    fn address(property: &VCardProperty) -> VCardResult<&Address> {
        property.value().as_address().ok_or_else(|| {
            VCardError::InvalidValue(format!(
                "ADR cannot write a {} value",
                property.value().shape()
            ))
        })
    }

    fn builder(address: &Address) -> StructuredBuilder {
        address
            .components()
            .into_iter()
            .fold(StructuredBuilder::new(), |b, values| {
                b.append_values(values.iter().cloned())
            })
    }

    fn build(mut it: StructuredIterator, parameters: VCardParameters) -> ParseOutcome {
        let components = (0..7).map(|_| it.next_values()).collect();
        ParseOutcome::property(
            PropertyKind::Address,
            PropertyValue::Address(Address::from_components(components)),
            parameters,
        )
    }
}

impl Scribe for AddressScribe {
    fn kind(&self) -> PropertyKind {
        PropertyKind::Address
    }

    fn property_name(&self) -> &str {
        "ADR"
    }

    fn default_data_type(&self, _version: VCardVersion) -> Option<VCardDataType> {
        Some(VCardDataType::Text)
    }

    /// The `LABEL` parameter only exists in 4.0; older versions carry the
    /// label as a separate property.
    fn adjust_parameters(
        &self,
        _property: &VCardProperty,
        version: VCardVersion,
        _card: &VCard,
        parameters: &mut VCardParameters,
    ) {
        if version < VCardVersion::V4_0 {
            parameters.remove_all(param_names::LABEL);
        }
    }

    fn encode_text(
        &self,
        property: &VCardProperty,
        version: VCardVersion,
    ) -> VCardResult<WriteOutcome<String>> {
        let address = Self::address(property)?;
        Ok(WriteOutcome::Value(Self::builder(address).build_text(version)))
    }

    fn encode_xml(
        &self,
        property: &VCardProperty,
        _version: VCardVersion,
    ) -> VCardResult<WriteOutcome<XmlElement>> {
        let address = Self::address(property)?;
        let mut element = XmlElement::new("adr");
        for (tag, values) in XML_NAMES.iter().zip(address.components()) {
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
        let address = Self::address(property)?;
        Ok(WriteOutcome::Value(JCardValue::structured(
            Self::builder(address).into_components(),
        )))
    }

    fn encode_html(
        &self,
        property: &VCardProperty,
        _version: VCardVersion,
    ) -> VCardResult<WriteOutcome<HtmlElement>> {
        let address = Self::address(property)?;
        let mut element = HtmlElement::new("div", "adr");
        for t in property.parameters.types() {
            element.append_child("span", "type", t.clone());
        }
        for (class, values) in HTML_CLASSES.iter().zip(address.components()) {
            for value in values {
                element.append_child("div", class, value.clone());
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
        mut parameters: VCardParameters,
        _ctx: &mut ParseContext,
    ) -> ParseOutcome {
        for t in element.types() {
            parameters.add_type(t);
        }
        let components = HTML_CLASSES
            .iter()
            .map(|class| element.with_class(class).iter().map(HtmlElement::value).collect())
            .collect();
        Self::build(StructuredIterator::from_components(components), parameters)
    }
}
