//! Scribe for TZ.

use super::{HtmlElement, JCardValue, ParseContext, ParseOutcome, Scribe, WriteOutcome};
use crate::codec::escape::{escape_text, unescape_text};
use crate::codec::offset::UtcOffset;
use crate::core::{
    PropertyKind, PropertyValue, Timezone, VCard, VCardDataType, VCardParameters, VCardProperty,
    VCardVersion, param_names,
};
use crate::error::{VCardError, VCardResult};

/// TZ is a UTC offset in every version. 3.0 also allows text and URIs; 4.0
/// makes text the default.
#[derive(Debug, Clone, Copy, Default)]
pub struct TimezoneScribe;

impl TimezoneScribe {
    fn timezone(property: &VCardProperty) -> VCardResult<&Timezone> {
        match property.value() {
            PropertyValue::Timezone(tz) => Ok(tz),
            other => Err(VCardError::InvalidValue(format!(
                "TZ cannot write a {} value",
                other.shape()
            ))),
        }
    }

    /// Unescaped value; `None` when the value cannot exist in `version`.
    fn plain(tz: &Timezone, version: VCardVersion, extended: bool) -> Option<String> {
        match tz {
            Timezone::Offset(offset) => Some(offset.format(extended)),
            Timezone::Text(_) | Timezone::Uri(_) if version == VCardVersion::V2_1 => None,
            Timezone::Text(value) | Timezone::Uri(value) => Some(value.clone()),
        }
    }

    fn build(tz: Timezone, parameters: VCardParameters) -> ParseOutcome {
        ParseOutcome::property(PropertyKind::Timezone, PropertyValue::Timezone(tz), parameters)
    }

    fn parse_value(
        value: &str,
        data_type: Option<&VCardDataType>,
        parameters: VCardParameters,
        ctx: &ParseContext,
    ) -> ParseOutcome {
        match data_type {
            Some(VCardDataType::Text) => {
                return Self::build(Timezone::Text(value.into()), parameters);
            }
            Some(VCardDataType::Uri) => {
                return Self::build(Timezone::Uri(value.into()), parameters);
            }
            _ => {}
        }
        if let Ok(offset) = UtcOffset::parse(value) {
            return Self::build(Timezone::Offset(offset), parameters);
        }
        if ctx.version == VCardVersion::V2_1 {
            return ParseOutcome::cannot_parse(value, format!("\"{value}\" is not a UTC offset"));
        }
        Self::build(Timezone::Text(value.into()), parameters)
    }
}

impl Scribe for TimezoneScribe {
    fn kind(&self) -> PropertyKind {
        PropertyKind::Timezone
    }

    fn property_name(&self) -> &str {
        "TZ"
    }

    fn default_data_type(&self, version: VCardVersion) -> Option<VCardDataType> {
        match version {
            VCardVersion::V4_0 => Some(VCardDataType::Text),
            VCardVersion::V2_1 | VCardVersion::V3_0 => Some(VCardDataType::UtcOffset),
        }
    }

    fn data_type(&self, property: &VCardProperty, _version: VCardVersion) -> Option<VCardDataType> {
        match property.value() {
            PropertyValue::Timezone(Timezone::Offset(_)) => Some(VCardDataType::UtcOffset),
            PropertyValue::Timezone(Timezone::Uri(_)) => Some(VCardDataType::Uri),
            _ => Some(VCardDataType::Text),
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
        let tz = Self::timezone(property)?;
        let extended = version != VCardVersion::V4_0;
        Ok(match (tz, Self::plain(tz, version, extended)) {
            (_, None) => WriteOutcome::Skip,
            (Timezone::Text(_), Some(text)) => WriteOutcome::Value(escape_text(&text, version)),
            (_, Some(value)) => WriteOutcome::Value(value),
        })
    }

    fn encode_plain(
        &self,
        property: &VCardProperty,
        version: VCardVersion,
    ) -> VCardResult<WriteOutcome<String>> {
        let tz = Self::timezone(property)?;
        let extended = version != VCardVersion::V4_0;
        Ok(Self::plain(tz, version, extended).map_or(WriteOutcome::Skip, WriteOutcome::Value))
    }

    fn encode_json(
        &self,
        property: &VCardProperty,
        version: VCardVersion,
    ) -> VCardResult<WriteOutcome<JCardValue>> {
        let tz = Self::timezone(property)?;
        Ok(Self::plain(tz, version, true)
            .map_or(WriteOutcome::Skip, |v| WriteOutcome::Value(JCardValue::single(v))))
    }

    fn encode_html(
        &self,
        property: &VCardProperty,
        version: VCardVersion,
    ) -> VCardResult<WriteOutcome<HtmlElement>> {
        let tz = Self::timezone(property)?;
        let Some(value) = Self::plain(tz, version, true) else {
            return Ok(WriteOutcome::Skip);
        };
        let mut element = HtmlElement::new("abbr", "tz");
        element.set_attr("title", value.clone());
        element.push_text(value);
        Ok(WriteOutcome::Value(element))
    }

    fn parse_text(
        &self,
        value: &str,
        data_type: Option<&VCardDataType>,
        parameters: VCardParameters,
        ctx: &mut ParseContext,
    ) -> ParseOutcome {
        let value = if data_type == Some(&VCardDataType::Uri) {
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
}
