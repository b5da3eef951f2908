//! Scribe for the revision timestamp (REV).

use chrono::{DateTime, Utc};

use super::{HtmlElement, JCardValue, ParseContext, ParseOutcome, Scribe, WriteOutcome};
use crate::codec::iso8601::{DateFormat, IsoDateTime};
use crate::core::{
    PropertyKind, PropertyValue, VCardDataType, VCardParameters, VCardProperty, VCardVersion,
};
use crate::error::{VCardError, VCardResult};

/// REV is always written in UTC: basic form in 4.0 text and xCard, extended
/// form everywhere else.
#[derive(Debug, Clone, Copy, Default)]
pub struct TimestampScribe;

impl TimestampScribe {
    fn instant(property: &VCardProperty) -> VCardResult<DateTime<Utc>> {
        match property.value() {
            PropertyValue::Timestamp(instant) => Ok(*instant),
            other => Err(VCardError::InvalidValue(format!(
                "REV cannot write a {} value",
                other.shape()
            ))),
        }
    }

    fn format(instant: DateTime<Utc>, extended: bool) -> String {
        let format = if extended {
            DateFormat::UtcDateTimeExtended
        } else {
            DateFormat::UtcDateTimeBasic
        };
        format.format(&IsoDateTime::from_utc(instant))
    }
}

impl Scribe for TimestampScribe {
    fn kind(&self) -> PropertyKind {
        PropertyKind::Revision
    }

    fn property_name(&self) -> &str {
        "REV"
    }

    fn default_data_type(&self, version: VCardVersion) -> Option<VCardDataType> {
        match version {
            VCardVersion::V4_0 => Some(VCardDataType::Timestamp),
            VCardVersion::V3_0 => Some(VCardDataType::DateTime),
            VCardVersion::V2_1 => None,
        }
    }

    fn encode_text(
        &self,
        property: &VCardProperty,
        version: VCardVersion,
    ) -> VCardResult<WriteOutcome<String>> {
        let instant = Self::instant(property)?;
        let extended = version != VCardVersion::V4_0;
        Ok(WriteOutcome::Value(Self::format(instant, extended)))
    }

    fn encode_json(
        &self,
        property: &VCardProperty,
        _version: VCardVersion,
    ) -> VCardResult<WriteOutcome<JCardValue>> {
        let instant = Self::instant(property)?;
        Ok(WriteOutcome::Value(JCardValue::single(Self::format(instant, true))))
    }

    fn encode_html(
        &self,
        property: &VCardProperty,
        _version: VCardVersion,
    ) -> VCardResult<WriteOutcome<HtmlElement>> {
        let formatted = Self::format(Self::instant(property)?, true);
        let mut element = HtmlElement::new("abbr", "rev");
        element.set_attr("title", formatted.clone());
        element.push_text(formatted);
        Ok(WriteOutcome::Value(element))
    }

    /// Accepts any ISO-8601 profile; a value without an offset is taken as
    /// UTC.
    fn parse_text(
        &self,
        value: &str,
        _data_type: Option<&VCardDataType>,
        parameters: VCardParameters,
        _ctx: &mut ParseContext,
    ) -> ParseOutcome {
        match IsoDateTime::parse(value).ok().and_then(|iso| iso.to_utc()) {
            Some(instant) => ParseOutcome::property(
                PropertyKind::Revision,
                PropertyValue::Timestamp(instant),
                parameters,
            ),
            None => ParseOutcome::cannot_parse(value, format!("\"{value}\" is not a timestamp")),
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn rev() -> VCardProperty {
        let instant = Utc.with_ymd_and_hms(2009, 8, 8, 19, 30, 0).unwrap();
        VCardProperty::new(PropertyKind::Revision, PropertyValue::Timestamp(instant)).unwrap()
    }

    #[test]
    fn offsets_are_normalized_to_utc() {
        let mut ctx = ParseContext::new(VCardVersion::V3_0, "REV");
        let outcome = TimestampScribe.parse_text(
            "2009-08-08 14:30:00 -0500",
            None,
            VCardParameters::new(),
            &mut ctx,
        );
        assert_eq!(outcome, ParseOutcome::Property(rev()));
    }

    #[test]
    fn formats_per_version() {
        assert_eq!(
            TimestampScribe.write_text(&rev(), VCardVersion::V4_0).unwrap(),
            WriteOutcome::Value("20090808T193000Z".to_string())
        );
        assert_eq!(
            TimestampScribe.write_text(&rev(), VCardVersion::V3_0).unwrap(),
            WriteOutcome::Value("2009-08-08T19:30:00Z".to_string())
        );
        let outcome = TimestampScribe.write_json(&rev(), VCardVersion::V4_0).unwrap();
        let WriteOutcome::Value(json) = outcome else {
            panic!("expected value");
        };
        assert_eq!(json.as_single(), "2009-08-08T19:30:00Z");
    }

    #[test]
    fn garbage_cannot_parse() {
        let mut ctx = ParseContext::new(VCardVersion::V4_0, "REV");
        assert!(matches!(
            TimestampScribe.parse_text("yesterday", None, VCardParameters::new(), &mut ctx),
            ParseOutcome::CannotParse { .. }
        ));
    }
}
