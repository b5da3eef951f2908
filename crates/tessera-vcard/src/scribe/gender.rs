//! Scribe for GENDER (vCard 4.0).

use super::{
    JCardValue, ParseContext, ParseOutcome, Scribe, StructuredBuilder, WriteOutcome, XmlElement,
};
use crate::codec::escape::parse_semi_structured;
use crate::core::{
    Gender, PropertyKind, PropertyValue, Sex, VCardDataType, VCardParameters, VCardProperty,
    VCardVersion,
};
use crate::error::{VCardError, VCardResult};

#[derive(Debug, Clone, Copy, Default)]
pub struct GenderScribe;

impl GenderScribe {
    fn gender(property: &VCardProperty) -> VCardResult<&Gender> {
        match property.value() {
            PropertyValue::Gender(g) => Ok(g),
            other => Err(VCardError::InvalidValue(format!(
                "GENDER cannot write a {} value",
                other.shape()
            ))),
        }
    }

    fn builder(gender: &Gender) -> StructuredBuilder {
        let sex = gender.sex.map(|s| s.as_char().to_string());
        let builder = StructuredBuilder::new().append_opt(sex);
        match &gender.identity {
            Some(identity) => builder.append(identity.clone()),
            None => builder,
        }
    }

    fn build(
        sex: Option<String>,
        identity: Option<String>,
        parameters: VCardParameters,
    ) -> ParseOutcome {
        let sex = match sex.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(code) => {
                let mut chars = code.chars();
                match (chars.next().and_then(Sex::from_char), chars.next()) {
                    (Some(sex), None) => Some(sex),
                    _ => {
                        return ParseOutcome::cannot_parse(
                            code,
                            format!("unknown sex code \"{code}\""),
                        );
                    }
                }
            }
        };
        let identity = identity.filter(|i| !i.is_empty());
        ParseOutcome::property(
            PropertyKind::Gender,
            PropertyValue::Gender(Gender { sex, identity }),
            parameters,
        )
    }
}

impl Scribe for GenderScribe {
    fn kind(&self) -> PropertyKind {
        PropertyKind::Gender
    }

    fn property_name(&self) -> &str {
        "GENDER"
    }

    fn default_data_type(&self, _version: VCardVersion) -> Option<VCardDataType> {
        Some(VCardDataType::Text)
    }

    fn encode_text(
        &self,
        property: &VCardProperty,
        version: VCardVersion,
    ) -> VCardResult<WriteOutcome<String>> {
        let gender = Self::gender(property)?;
        Ok(WriteOutcome::Value(Self::builder(gender).build_text(version)))
    }

    fn encode_xml(
        &self,
        property: &VCardProperty,
        _version: VCardVersion,
    ) -> VCardResult<WriteOutcome<XmlElement>> {
        let gender = Self::gender(property)?;
        let mut element = XmlElement::new("gender");
        element.append("sex", gender.sex.map(|s| s.as_char().to_string()).unwrap_or_default());
        if let Some(identity) = &gender.identity {
            element.append("identity", identity.clone());
        }
        Ok(WriteOutcome::Value(element))
    }

    fn encode_json(
        &self,
        property: &VCardProperty,
        _version: VCardVersion,
    ) -> VCardResult<WriteOutcome<JCardValue>> {
        let gender = Self::gender(property)?;
        let value = if gender.identity.is_some() {
            JCardValue::structured(Self::builder(gender).into_components())
        } else {
            JCardValue::single(gender.sex.map(|s| s.as_char().to_string()).unwrap_or_default())
        };
        Ok(WriteOutcome::Value(value))
    }

    fn parse_text(
        &self,
        value: &str,
        _data_type: Option<&VCardDataType>,
        parameters: VCardParameters,
        _ctx: &mut ParseContext,
    ) -> ParseOutcome {
        let mut parts = parse_semi_structured(value).into_iter();
        let sex = parts.next();
        Self::build(sex, parts.next(), parameters)
    }

    fn parse_xml(
        &self,
        element: &XmlElement,
        parameters: VCardParameters,
        _ctx: &mut ParseContext,
    ) -> ParseOutcome {
        Self::build(element.first("sex"), element.first("identity"), parameters)
    }

    fn parse_json(
        &self,
        value: &JCardValue,
        _data_type: Option<&VCardDataType>,
        parameters: VCardParameters,
        _ctx: &mut ParseContext,
    ) -> ParseOutcome {
        let mut parts = value.as_structured().into_iter().map(|c| c.into_iter().next());
        let sex = parts.next().flatten();
        Self::build(sex, parts.next().flatten(), parameters)
    }
}
