//! Scribe for GEO.

use super::{HtmlElement, ParseContext, ParseOutcome, Scribe, WriteOutcome};
use crate::codec::geo::{GeoUri, format_number};
use crate::core::{
    PropertyKind, PropertyValue, VCardDataType, VCardParameters, VCardProperty, VCardVersion,
};
use crate::error::{VCardError, VCardResult};

/// GEO is a `geo:` URI in 4.0 and a coordinate pair before that
/// (`lat;lon` in 3.0, `lat,lon` in 2.1).
#[derive(Debug, Clone, Copy, Default)]
pub struct GeoScribe;

impl GeoScribe {
    fn geo(property: &VCardProperty) -> VCardResult<&GeoUri> {
        property.value().as_geo().ok_or_else(|| {
            VCardError::InvalidValue(format!(
                "GEO cannot write a {} value",
                property.value().shape()
            ))
        })
    }

    fn parse_value(value: &str, parameters: VCardParameters) -> ParseOutcome {
        let value = value.trim();
        let parsed = if value.get(..4).is_some_and(|s| s.eq_ignore_ascii_case("geo:")) {
            GeoUri::parse(value)
        } else {
            GeoUri::parse_pair(value)
        };
        match parsed {
            Ok(geo) => {
                ParseOutcome::property(PropertyKind::Geo, PropertyValue::Geo(geo), parameters)
            }
            Err(e) => ParseOutcome::cannot_parse(value, e.to_string()),
        }
    }
}

impl Scribe for GeoScribe {
    fn kind(&self) -> PropertyKind {
        PropertyKind::Geo
    }

    fn property_name(&self) -> &str {
        "GEO"
    }

    fn default_data_type(&self, version: VCardVersion) -> Option<VCardDataType> {
        match version {
            VCardVersion::V4_0 => Some(VCardDataType::Uri),
            VCardVersion::V2_1 | VCardVersion::V3_0 => None,
        }
    }

    fn encode_text(
        &self,
        property: &VCardProperty,
        version: VCardVersion,
    ) -> VCardResult<WriteOutcome<String>> {
        let geo = Self::geo(property)?;
        let (lat, lon) = (format_number(geo.latitude), format_number(geo.longitude));
        Ok(WriteOutcome::Value(match version {
            VCardVersion::V4_0 => geo.to_uri(),
            VCardVersion::V3_0 => format!("{lat};{lon}"),
            VCardVersion::V2_1 => format!("{lat},{lon}"),
        }))
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
        let geo = Self::geo(property)?;
        let mut element = HtmlElement::new("div", "geo");
        for (class, number) in [("latitude", geo.latitude), ("longitude", geo.longitude)] {
            let formatted = format_number(number);
            let mut abbr = HtmlElement::new("abbr", class);
            abbr.set_attr("title", formatted.clone());
            abbr.push_text(formatted);
            element.element_mut().push_element(abbr.into_element());
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
        Self::parse_value(value, parameters)
    }

    fn parse_plain(
        &self,
        value: &str,
        _data_type: Option<&VCardDataType>,
        parameters: VCardParameters,
        _ctx: &mut ParseContext,
    ) -> ParseOutcome {
        Self::parse_value(value, parameters)
    }

    fn parse_html(
        &self,
        element: &HtmlElement,
        parameters: VCardParameters,
        _ctx: &mut ParseContext,
    ) -> ParseOutcome {
        let latitude = element.with_class("latitude").first().map(HtmlElement::value);
        let longitude = element.with_class("longitude").first().map(HtmlElement::value);
        match (latitude, longitude) {
            (Some(lat), Some(lon)) => Self::parse_value(&format!("{lat};{lon}"), parameters),
            _ => Self::parse_value(&element.value(), parameters),
        }
    }
}
