//! Fallback scribe for extension properties and values no scribe could read.

use super::{ParseContext, ParseOutcome, Scribe, WriteOutcome};
use crate::codec::escape::{escape_text, unescape_text};
use crate::core::{
    PropertyKind, PropertyValue, RawValue, VCard, VCardDataType, VCardParameters, VCardProperty,
    VCardVersion, param_names,
};
use crate::error::{VCardError, VCardResult};

/// Keeps the wire value verbatim under an arbitrary property name.
///
/// Values are stored in their escaped text form whatever syntax they were
/// read from, so a raw property read from xCard writes back correctly as
/// text and vice versa.
#[derive(Debug, Clone)]
pub struct RawScribe {
    name: String,
}

impl RawScribe {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into().to_ascii_uppercase(),
        }
    }

    fn unsupported(property: &VCardProperty) -> VCardError {
        VCardError::InvalidValue(format!(
            "{} cannot write a {} value as raw text",
            property.name(),
            property.value().shape()
        ))
    }
}

impl Scribe for RawScribe {
    fn kind(&self) -> PropertyKind {
        PropertyKind::Extension
    }

    fn property_name(&self) -> &str {
        &self.name
    }

    fn html_class(&self) -> String {
        self.name.to_ascii_lowercase()
    }

    fn default_data_type(&self, _version: VCardVersion) -> Option<VCardDataType> {
        None
    }

    fn data_type(&self, property: &VCardProperty, _version: VCardVersion) -> Option<VCardDataType> {
        match property.value() {
            PropertyValue::Raw(raw) => raw.data_type.clone(),
            PropertyValue::Text(_) => Some(VCardDataType::Text),
            PropertyValue::Uri(_) => Some(VCardDataType::Uri),
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
        version: VCardVersion,
    ) -> VCardResult<WriteOutcome<String>> {
        match property.value() {
            PropertyValue::Raw(raw) => Ok(WriteOutcome::Value(raw.value.clone())),
            PropertyValue::Text(text) => Ok(WriteOutcome::Value(escape_text(text, version))),
            PropertyValue::Uri(uri) => Ok(WriteOutcome::Value(uri.clone())),
            _ => Err(Self::unsupported(property)),
        }
    }

    fn encode_plain(
        &self,
        property: &VCardProperty,
        _version: VCardVersion,
    ) -> VCardResult<WriteOutcome<String>> {
        match property.value() {
            PropertyValue::Raw(raw) => Ok(WriteOutcome::Value(unescape_text(&raw.value))),
            PropertyValue::Text(value) | PropertyValue::Uri(value) => {
                Ok(WriteOutcome::Value(value.clone()))
            }
            _ => Err(Self::unsupported(property)),
        }
    }

    /// Always succeeds: the value is kept as read under the name being parsed.
    fn parse_text(
        &self,
        value: &str,
        data_type: Option<&VCardDataType>,
        parameters: VCardParameters,
        ctx: &mut ParseContext,
    ) -> ParseOutcome {
        let name = if ctx.property_name.is_empty() {
            self.name.clone()
        } else {
            ctx.property_name.clone()
        };
        let mut property = VCardProperty::extension(
            name,
            PropertyValue::Raw(RawValue::typed(value, data_type.cloned())),
        );
        property.parameters = parameters;
        ParseOutcome::Property(property)
    }
}
