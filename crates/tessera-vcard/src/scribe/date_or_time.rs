//! Scribe for BDAY, ANNIVERSARY and DEATHDATE.
//!
//! A value is a full date/time, a partial date or free text. Only the first
//! exists before 4.0: the others are skipped on write and reported as
//! unparsable on read.

use super::{HtmlElement, JCardValue, ParseContext, ParseOutcome, Scribe, WriteOutcome};
use crate::codec::escape::{escape_text, unescape_text};
use crate::codec::iso8601::IsoDateTime;
use crate::codec::partial::PartialDate;
use crate::core::{
    DateOrTime, PropertyKind, PropertyValue, VCardDataType, VCardParameters, VCardProperty,
    VCardVersion,
};
use crate::error::{VCardError, VCardResult};

#[derive(Debug, Clone)]
pub struct DateOrTimeScribe {
    kind: PropertyKind,
}

impl DateOrTimeScribe {
    #[must_use]
    pub fn new(kind: PropertyKind) -> Self {
        Self { kind }
    }

    fn value<'a>(&self, property: &'a VCardProperty) -> VCardResult<&'a DateOrTime> {
        property.value().as_date_or_time().ok_or_else(|| {
            VCardError::InvalidValue(format!(
                "{} cannot write a {} value",
                self.kind,
                property.value().shape()
            ))
        })
    }

    /// Formats the value; `None` when it cannot exist in `version`.
    fn format(value: &DateOrTime, version: VCardVersion, extended: bool) -> Option<String> {
        match value {
            DateOrTime::Full(iso) if iso.date.is_none() && version < VCardVersion::V4_0 => None,
            DateOrTime::Full(iso) => Some(iso.format(extended)),
            DateOrTime::Partial(p) if version == VCardVersion::V4_0 => Some(p.format(extended)),
            DateOrTime::Text(t) if version == VCardVersion::V4_0 => Some(t.clone()),
            DateOrTime::Partial(_) | DateOrTime::Text(_) => None,
        }
    }

    fn parse_value(
        &self,
        value: &str,
        data_type: Option<&VCardDataType>,
        parameters: VCardParameters,
        ctx: &mut ParseContext,
    ) -> ParseOutcome {
        let modern = ctx.version == VCardVersion::V4_0;
        if data_type == Some(&VCardDataType::Text) {
            if !modern {
                return ParseOutcome::cannot_parse(value, "text dates require vCard 4.0");
            }
            return self.build(DateOrTime::Text(value.to_string()), parameters);
        }

        if let Ok(iso) = IsoDateTime::parse(value)
            && iso.date.is_some()
        {
            return self.build(DateOrTime::Full(iso), parameters);
        }
        if !modern {
            return ParseOutcome::cannot_parse(
                value,
                format!("\"{value}\" is not a date in vCard {}", ctx.version),
            );
        }
        if let Ok(partial) = PartialDate::parse(value) {
            return self.build(DateOrTime::Partial(partial), parameters);
        }
        ctx.warn(format!("\"{value}\" is not a date; kept as text"));
        self.build(DateOrTime::Text(value.to_string()), parameters)
    }

    fn build(&self, value: DateOrTime, parameters: VCardParameters) -> ParseOutcome {
        ParseOutcome::property(self.kind, PropertyValue::DateOrTime(value), parameters)
    }
}

impl Scribe for DateOrTimeScribe {
    fn kind(&self) -> PropertyKind {
        self.kind
    }

    fn property_name(&self) -> &str {
        self.kind.name()
    }

    fn default_data_type(&self, version: VCardVersion) -> Option<VCardDataType> {
        match version {
            VCardVersion::V4_0 => Some(VCardDataType::DateAndOrTime),
            VCardVersion::V2_1 | VCardVersion::V3_0 => Some(VCardDataType::Date),
        }
    }

    fn data_type(&self, property: &VCardProperty, version: VCardVersion) -> Option<VCardDataType> {
        let (has_date, has_time) = match property.value().as_date_or_time()? {
            DateOrTime::Text(_) => return Some(VCardDataType::Text),
            DateOrTime::Full(iso) => (iso.date.is_some(), iso.time.is_some()),
            DateOrTime::Partial(p) => (p.has_date(), p.has_time()),
        };
        Some(match (has_date, has_time) {
            (true, true) => VCardDataType::DateTime,
            (false, true) if version == VCardVersion::V4_0 => VCardDataType::Time,
            _ => VCardDataType::Date,
        })
    }

    fn encode_text(
        &self,
        property: &VCardProperty,
        version: VCardVersion,
    ) -> VCardResult<WriteOutcome<String>> {
        let value = self.value(property)?;
        let extended = version == VCardVersion::V3_0;
        Ok(match Self::format(value, version, extended) {
            Some(text) if value.as_text().is_some() => {
                WriteOutcome::Value(escape_text(&text, version))
            }
            Some(text) => WriteOutcome::Value(text),
            None => WriteOutcome::Skip,
        })
    }

    fn encode_plain(
        &self,
        property: &VCardProperty,
        version: VCardVersion,
    ) -> VCardResult<WriteOutcome<String>> {
        let value = self.value(property)?;
        Ok(Self::format(value, version, false).map_or(WriteOutcome::Skip, WriteOutcome::Value))
    }

    fn encode_json(
        &self,
        property: &VCardProperty,
        version: VCardVersion,
    ) -> VCardResult<WriteOutcome<JCardValue>> {
        let value = self.value(property)?;
        Ok(Self::format(value, version, true)
            .map_or(WriteOutcome::Skip, |v| WriteOutcome::Value(JCardValue::single(v))))
    }

    fn encode_html(
        &self,
        property: &VCardProperty,
        version: VCardVersion,
    ) -> VCardResult<WriteOutcome<HtmlElement>> {
        let value = self.value(property)?;
        let Some(formatted) = Self::format(value, version, true) else {
            return Ok(WriteOutcome::Skip);
        };
        let mut element = HtmlElement::new("abbr", &self.html_class());
        element.set_attr("title", formatted.clone());
        element.push_text(formatted);
        Ok(WriteOutcome::Value(element))
    }

    fn parse_text(
        &self,
        value: &str,
        data_type: Option<&VCardDataType>,
        parameters: VCardParameters,
        ctx: &mut ParseContext,
    ) -> ParseOutcome {
        self.parse_value(&unescape_text(value), data_type, parameters, ctx)
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
}

#[cfg(test)]
mod tests {
    use chrono::{NaiveDate, NaiveTime};

    use super::*;
    use crate::codec::offset::UtcOffset;

    fn scribe() -> DateOrTimeScribe {
        DateOrTimeScribe::new(PropertyKind::Birthday)
    }

    fn parse(
        value: &str,
        data_type: Option<&VCardDataType>,
        version: VCardVersion,
    ) -> ParseOutcome {
        let mut ctx = ParseContext::new(version, "BDAY");
        scribe().parse_text(value, data_type, VCardParameters::new(), &mut ctx)
    }

    fn bday(value: DateOrTime) -> VCardProperty {
        VCardProperty::new(PropertyKind::Birthday, PropertyValue::DateOrTime(value)).unwrap()
    }

    fn full_date() -> DateOrTime {
        DateOrTime::Full(IsoDateTime::date(NaiveDate::from_ymd_opt(1985, 4, 12).unwrap()))
    }

    #[test]
    fn full_dates_in_every_version() {
        for (version, text) in [
            (VCardVersion::V2_1, "19850412"),
            (VCardVersion::V3_0, "1985-04-12"),
            (VCardVersion::V4_0, "19850412"),
        ] {
            assert_eq!(parse(text, None, version), ParseOutcome::Property(bday(full_date())));
            assert_eq!(
                scribe().write_text(&bday(full_date()), version).unwrap(),
                WriteOutcome::Value(text.to_string())
            );
        }
    }

    #[test]
    fn date_time_with_offset() {
        let iso = IsoDateTime::date_time(
            NaiveDate::from_ymd_opt(1996, 4, 15).unwrap(),
            NaiveTime::from_hms_opt(23, 10, 0).unwrap(),
            Some(UtcOffset::new(false, 6, 0)),
        );
        let prop = bday(DateOrTime::Full(iso));
        assert_eq!(
            scribe().write_text(&prop, VCardVersion::V3_0).unwrap(),
            WriteOutcome::Value("1996-04-15T23:10:00-06:00".to_string())
        );
        assert_eq!(
            scribe().data_type(&prop, VCardVersion::V3_0),
            Some(VCardDataType::DateTime)
        );
        assert_eq!(scribe().value_parameter(&prop, VCardVersion::V4_0), None);
        assert_eq!(
            scribe().value_parameter(&prop, VCardVersion::V3_0),
            Some(VCardDataType::DateTime)
        );
    }

    #[test]
    fn partial_dates_only_in_4_0() {
        let ParseOutcome::Property(prop) = parse("--0412", None, VCardVersion::V4_0) else {
            panic!("expected property");
        };
        assert_eq!(
            prop.value(),
            &PropertyValue::DateOrTime(DateOrTime::Partial(PartialDate::month_day(4, 12)))
        );
        assert_eq!(
            scribe().write_text(&prop, VCardVersion::V4_0).unwrap(),
            WriteOutcome::Value("--0412".to_string())
        );
        assert_eq!(scribe().write_text(&prop, VCardVersion::V3_0).unwrap(), WriteOutcome::Skip);
        assert!(matches!(
            parse("--0412", None, VCardVersion::V3_0),
            ParseOutcome::CannotParse { .. }
        ));
    }

    #[test]
    fn text_only_in_4_0() {
        let text = bday(DateOrTime::Text("circa 1800".into()));
        assert_eq!(
            parse("circa 1800", Some(&VCardDataType::Text), VCardVersion::V4_0),
            ParseOutcome::Property(text.clone())
        );
        assert_eq!(
            scribe().value_parameter(&text, VCardVersion::V4_0),
            Some(VCardDataType::Text)
        );
        assert_eq!(scribe().write_text(&text, VCardVersion::V2_1).unwrap(), WriteOutcome::Skip);
        assert!(matches!(
            parse("circa 1800", Some(&VCardDataType::Text), VCardVersion::V3_0),
            ParseOutcome::CannotParse { .. }
        ));
    }

    #[test]
    fn unparsable_4_0_value_becomes_text() {
        let mut ctx = ParseContext::new(VCardVersion::V4_0, "BDAY");
        let outcome = scribe().parse_text("sometime", None, VCardParameters::new(), &mut ctx);
        assert_eq!(
            outcome,
            ParseOutcome::Property(bday(DateOrTime::Text("sometime".into())))
        );
        assert_eq!(ctx.warnings().len(), 1);
    }

    #[test]
    fn jcard_uses_extended_format() {
        let WriteOutcome::Value(json) = scribe()
            .write_json(&bday(full_date()), VCardVersion::V4_0)
            .unwrap()
        else {
            panic!("expected value");
        };
        assert_eq!(json.as_single(), "1985-04-12");
    }
}
