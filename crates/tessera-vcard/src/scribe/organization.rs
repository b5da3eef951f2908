//! Scribe for organization names (ORG).

use super::{HtmlElement, JCardValue, ParseContext, ParseOutcome, Scribe, WriteOutcome, XmlElement};
use crate::codec::escape::{parse_semi_structured, write_semi_structured};
use crate::core::{
    Organization, PropertyKind, PropertyValue, VCardDataType, VCardParameters, VCardProperty,
    VCardVersion,
};
use crate::error::{VCardError, VCardResult};

#[derive(Debug, Clone, Copy, Default)]
pub struct OrganizationScribe;

impl OrganizationScribe {
    fn organization(property: &VCardProperty) -> VCardResult<&Organization> {
        match property.value() {
            PropertyValue::Organization(org) => Ok(org),
            other => Err(VCardError::InvalidValue(format!(
                "ORG cannot write a {} value",
                other.shape()
            ))),
        }
    }

    fn build(values: Vec<String>, parameters: VCardParameters) -> ParseOutcome {
        ParseOutcome::property(
            PropertyKind::Organization,
            PropertyValue::Organization(Organization::from_values(values)),
            parameters,
        )
    }
}

impl Scribe for OrganizationScribe {
    fn kind(&self) -> PropertyKind {
        PropertyKind::Organization
    }

    fn property_name(&self) -> &str {
        "ORG"
    }

    fn default_data_type(&self, _version: VCardVersion) -> Option<VCardDataType> {
        Some(VCardDataType::Text)
    }

    fn encode_text(
        &self,
        property: &VCardProperty,
        version: VCardVersion,
    ) -> VCardResult<WriteOutcome<String>> {
        let values = Self::organization(property)?.values();
        Ok(WriteOutcome::Value(write_semi_structured(&values, version)))
    }

    fn encode_xml(
        &self,
        property: &VCardProperty,
        _version: VCardVersion,
    ) -> VCardResult<WriteOutcome<XmlElement>> {
        let mut element = XmlElement::new("org");
        element.append_all("text", Self::organization(property)?.values());
        Ok(WriteOutcome::Value(element))
    }

    fn encode_json(
        &self,
        property: &VCardProperty,
        _version: VCardVersion,
    ) -> VCardResult<WriteOutcome<JCardValue>> {
        let org = Self::organization(property)?;
        let value = if org.units.is_empty() {
            JCardValue::single(org.name.clone())
        } else {
            JCardValue::structured(org.values().into_iter().map(|v| vec![v]).collect())
        };
        Ok(WriteOutcome::Value(value))
    }

    fn encode_html(
        &self,
        property: &VCardProperty,
        _version: VCardVersion,
    ) -> VCardResult<WriteOutcome<HtmlElement>> {
        let org = Self::organization(property)?;
        let mut element = HtmlElement::new("div", "org");
        element.append_child("span", "organization-name", org.name.clone());
        for unit in &org.units {
            element.append_child("span", "organization-unit", unit.clone());
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
        Self::build(parse_semi_structured(value), parameters)
    }

    fn parse_xml(
        &self,
        element: &XmlElement,
        parameters: VCardParameters,
        _ctx: &mut ParseContext,
    ) -> ParseOutcome {
        Self::build(element.all("text"), parameters)
    }

    fn parse_json(
        &self,
        value: &JCardValue,
        _data_type: Option<&VCardDataType>,
        parameters: VCardParameters,
        _ctx: &mut ParseContext,
    ) -> ParseOutcome {
        let values = value
            .as_structured()
            .into_iter()
            .map(|c| c.into_iter().next().unwrap_or_default())
            .collect();
        Self::build(values, parameters)
    }

    fn parse_html(
        &self,
        element: &HtmlElement,
        parameters: VCardParameters,
        _ctx: &mut ParseContext,
    ) -> ParseOutcome {
        let names = element.with_class("organization-name");
        let values = match names.first() {
            Some(name) => std::iter::once(name.value())
                .chain(element.with_class("organization-unit").iter().map(HtmlElement::value))
                .collect(),
            None => vec![element.value()],
        };
        Self::build(values, parameters)
    }
}
