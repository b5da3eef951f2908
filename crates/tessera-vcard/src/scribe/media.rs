//! Scribe for binary-or-URI values (PHOTO, LOGO, SOUND, KEY).
//!
//! Inline data is base64 with an `ENCODING` parameter before 4.0 and a
//! `data:` URI in 4.0. The media type travels in `TYPE` (as a subtype) before
//! 4.0 and in `MEDIATYPE` or the `data:` URI in 4.0.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;

use super::{HtmlElement, ParseContext, ParseOutcome, Scribe, WriteOutcome};
use crate::core::{
    MediaValue, PropertyKind, PropertyValue, VCard, VCardDataType, VCardParameters,
    VCardProperty, VCardVersion, encodings, param_names,
};
use crate::error::{VCardError, VCardResult};

#[derive(Debug, Clone)]
pub struct MediaScribe {
    kind: PropertyKind,
}

impl MediaScribe {
    #[must_use]
    pub fn new(kind: PropertyKind) -> Self {
        Self { kind }
    }

    fn media<'a>(&self, property: &'a VCardProperty) -> VCardResult<&'a MediaValue> {
        property.value().as_media().ok_or_else(|| {
            VCardError::InvalidValue(format!(
                "{} cannot write a {} value",
                self.kind,
                property.value().shape()
            ))
        })
    }

    /// Top-level media type implied by the property kind.
    fn media_family(&self) -> &'static str {
        match self.kind {
            PropertyKind::Sound => "audio",
            PropertyKind::Key => "application",
            _ => "image",
        }
    }

    /// Expands a legacy TYPE value (`JPEG`) to a media type (`image/jpeg`).
    fn expand_type(&self, value: &str) -> String {
        if value.contains('/') {
            value.to_ascii_lowercase()
        } else {
            format!("{}/{}", self.media_family(), value.to_ascii_lowercase())
        }
    }

    /// Takes the media type out of the legacy TYPE parameter.
    fn take_legacy_type(&self, parameters: &mut VCardParameters) -> Option<String> {
        let value = parameters.types().first()?.clone();
        parameters.remove(param_names::TYPE, &value);
        Some(self.expand_type(&value))
    }

    fn build(&self, media: MediaValue, parameters: VCardParameters) -> ParseOutcome {
        ParseOutcome::property(self.kind, PropertyValue::Media(media), parameters)
    }

    fn parse_value(
        &self,
        value: &str,
        data_type: Option<&VCardDataType>,
        mut parameters: VCardParameters,
        ctx: &mut ParseContext,
    ) -> ParseOutcome {
        let value = value.trim();
        let base64 = parameters.encoding().is_some_and(encodings::is_base64);
        if base64 {
            parameters.remove_all(param_names::ENCODING);
            let media_type = self.take_legacy_type(&mut parameters);
            let compact: String = value.chars().filter(|c| !c.is_whitespace()).collect();
            return match STANDARD.decode(compact) {
                Ok(data) => self.build(MediaValue::binary(data, media_type.as_deref()), parameters),
                Err(e) => ParseOutcome::cannot_parse(value, format!("invalid base64 data: {e}")),
            };
        }

        if let Some(media) = MediaValue::from_data_uri(value) {
            return self.build(media, parameters);
        }

        let media_type = if ctx.version == VCardVersion::V4_0 {
            parameters.remove_all(param_names::MEDIATYPE).into_iter().next()
        } else {
            self.take_legacy_type(&mut parameters)
        };
        if data_type == Some(&VCardDataType::ContentId) {
            parameters.set_value_type(&VCardDataType::ContentId);
        }
        self.build(MediaValue::uri(value, media_type.as_deref()), parameters)
    }
}

impl Scribe for MediaScribe {
    fn kind(&self) -> PropertyKind {
        self.kind
    }

    fn property_name(&self) -> &str {
        self.kind.name()
    }

    fn default_data_type(&self, version: VCardVersion) -> Option<VCardDataType> {
        match version {
            VCardVersion::V2_1 => None,
            VCardVersion::V3_0 => Some(VCardDataType::Binary),
            VCardVersion::V4_0 => Some(VCardDataType::Uri),
        }
    }

    fn data_type(&self, property: &VCardProperty, version: VCardVersion) -> Option<VCardDataType> {
        if let Some(data_type) = property.parameters.value_type() {
            return Some(data_type);
        }
        match (property.value().as_media()?, version) {
            (_, VCardVersion::V4_0) => Some(VCardDataType::Uri),
            (MediaValue::Binary { .. }, VCardVersion::V3_0) => Some(VCardDataType::Binary),
            (MediaValue::Binary { .. }, VCardVersion::V2_1) => None,
            (MediaValue::Uri { .. }, VCardVersion::V3_0) => Some(VCardDataType::Uri),
            (MediaValue::Uri { .. }, VCardVersion::V2_1) => Some(VCardDataType::Url),
        }
    }

    fn adjust_parameters(
        &self,
        property: &VCardProperty,
        version: VCardVersion,
        _card: &VCard,
        parameters: &mut VCardParameters,
    ) {
        parameters.remove_all(param_names::VALUE);
        parameters.remove_all(param_names::ENCODING);
        let Some(media) = property.value().as_media() else {
            return;
        };
        match (media, version) {
            (MediaValue::Binary { .. }, VCardVersion::V4_0) => {}
            (MediaValue::Uri { media_type, .. }, VCardVersion::V4_0) => {
                if let Some(media_type) = media_type {
                    parameters.replace(param_names::MEDIATYPE, media_type.clone());
                }
            }
            (MediaValue::Binary { .. }, legacy) => {
                let encoding = if legacy == VCardVersion::V2_1 {
                    encodings::BASE64
                } else {
                    encodings::B
                };
                parameters.replace(param_names::ENCODING, encoding);
                if let Some(subtype) = media.subtype() {
                    parameters.add_type(subtype.to_string());
                }
            }
            (MediaValue::Uri { .. }, _) => {
                if let Some(subtype) = media.subtype() {
                    parameters.add_type(subtype.to_string());
                }
            }
        }
    }

    fn encode_text(
        &self,
        property: &VCardProperty,
        version: VCardVersion,
    ) -> VCardResult<WriteOutcome<String>> {
        let media = self.media(property)?;
        let value = match (media, version) {
            (MediaValue::Binary { data, .. }, VCardVersion::V2_1 | VCardVersion::V3_0) => {
                STANDARD.encode(data)
            }
            _ => media.to_uri(),
        };
        Ok(WriteOutcome::Value(value))
    }

    fn encode_plain(
        &self,
        property: &VCardProperty,
        version: VCardVersion,
    ) -> VCardResult<WriteOutcome<String>> {
        self.encode_text(property, version)
    }

    fn encode_html(
        &self,
        property: &VCardProperty,
        _version: VCardVersion,
    ) -> VCardResult<WriteOutcome<HtmlElement>> {
        let uri = self.media(property)?.to_uri();
        let class = self.html_class();
        let element = match self.kind {
            PropertyKind::Photo | PropertyKind::Logo => {
                let mut img = HtmlElement::new("img", &class);
                img.set_attr("src", uri);
                img
            }
            _ => {
                let mut a = HtmlElement::new("a", &class);
                a.set_attr("href", uri.clone());
                a.push_text(uri);
                a
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
        self.parse_value(value, data_type, parameters, ctx)
    }

    fn parse_plain(
        &self,
        value: &str,
        data_type: Option<&VCardDataType>,
        parameters: VCardParameters,
        ctx: &mut ParseContext,
    ) -> ParseOutcome {
        self.parse_value(value, data_type, parameters, ctx)
    }

    fn parse_html(
        &self,
        element: &HtmlElement,
        parameters: VCardParameters,
        ctx: &mut ParseContext,
    ) -> ParseOutcome {
        let mut parameters = parameters;
        if let Some(media_type) = element.attr("type") {
            parameters.add_type(media_type.to_string());
        }
        self.parse_value(&element.uri_value(), None, parameters, ctx)
    }
}
