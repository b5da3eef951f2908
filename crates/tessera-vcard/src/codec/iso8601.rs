//! ISO-8601 date/time profiles.
//!
//! Values are recognized by their lexical shape (digit groups, separators and
//! zone designator) against a fixed, ordered list of profiles. Digits are
//! always ASCII and never locale-dependent.

use chrono::{DateTime, Datelike, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, Timelike, Utc};

use super::offset::UtcOffset;
use crate::error::{VCardError, VCardResult};

/// A full date, time or date-time value with an optional UTC offset.
///
/// A `Z` designator is stored as a zero offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IsoDateTime {
    pub date: Option<NaiveDate>,
    pub time: Option<NaiveTime>,
    pub offset: Option<UtcOffset>,
}

impl IsoDateTime {
    #[must_use]
    pub fn date(date: NaiveDate) -> Self {
        Self {
            date: Some(date),
            time: None,
            offset: None,
        }
    }

    #[must_use]
    pub fn date_time(date: NaiveDate, time: NaiveTime, offset: Option<UtcOffset>) -> Self {
        Self {
            date: Some(date),
            time: Some(time),
            offset,
        }
    }

    #[must_use]
    pub fn from_utc(instant: DateTime<Utc>) -> Self {
        Self::date_time(
            instant.date_naive(),
            instant.time(),
            Some(UtcOffset::UTC),
        )
    }

    #[must_use]
    pub fn from_fixed(instant: DateTime<FixedOffset>) -> Self {
        Self::date_time(
            instant.date_naive(),
            instant.time(),
            Some(UtcOffset::from_fixed(*instant.offset())),
        )
    }

    /// Parses any recognized profile.
    ///
    /// ## Errors
    /// Returns [`VCardError::InvalidValue`] if no profile matches.
    pub fn parse(s: &str) -> VCardResult<Self> {
        DateFormat::parse(s).map(|(_, value)| value)
    }

    /// Resolves to an instant. Missing times are midnight and a missing
    /// offset is taken as UTC.
    #[must_use]
    pub fn to_utc(&self) -> Option<DateTime<Utc>> {
        let date = self.date?;
        let naive = NaiveDateTime::new(date, self.time.unwrap_or(NaiveTime::MIN));
        let offset = self.offset.unwrap_or(UtcOffset::UTC).to_fixed()?;
        naive
            .and_local_timezone(offset)
            .single()
            .map(|dt| dt.with_timezone(&Utc))
    }

    /// Formats in the basic (`19960415T231000-0600`) or extended
    /// (`1996-04-15T23:10:00-06:00`) form.
    #[must_use]
    pub fn format(&self, extended: bool) -> String {
        write_value(self, Style::from_extended(extended), Zone::Offset(extended))
    }

    /// Formats as UTC with a `Z` designator.
    ///
    /// Returns `None` for values without a date.
    #[must_use]
    pub fn format_utc(&self, extended: bool) -> Option<String> {
        let utc = Self::from_utc(self.to_utc()?);
        Some(write_value(&utc, Style::from_extended(extended), Zone::Utc))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Style {
    Basic,
    Extended,
}

impl Style {
    fn from_extended(extended: bool) -> Self {
        if extended { Self::Extended } else { Self::Basic }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Zone {
    /// No designator.
    None,
    /// `Z`.
    Utc,
    /// A numeric offset; `true` for the colon form.
    Offset(bool),
}

/// The structure of a value: which parts exist and how each is written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Shape {
    date: Option<Style>,
    time: Option<Style>,
    zone: Zone,
}

/// The recognized ISO-8601 profiles, in matching order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DateFormat {
    /// `19960415`
    DateBasic,
    /// `1996-04-15`
    DateExtended,
    /// `19960415T231000-0600`
    DateTimeBasic,
    /// `19960415T231000`
    DateTimeBasicWithoutZone,
    /// `1996-04-15T23:10:00-06:00`
    DateTimeExtended,
    /// `1996-04-15T23:10:00`
    DateTimeExtendedWithoutZone,
    /// `19960415T231000Z`
    UtcDateTimeBasic,
    /// `1996-04-15T23:10:00Z`
    UtcDateTimeExtended,
    /// `1996-04-15T23:10:00-0600`, as produced by hCard publishers.
    HCardDateTime,
    /// `T231000`, `T231000Z` or `T231000-0600`
    TimeBasic,
    /// `T23:10:00`, `23:10:00Z` or `23:10:00-06:00`
    TimeExtended,
}

impl DateFormat {
    pub const ALL: [Self; 11] = [
        Self::DateBasic,
        Self::DateExtended,
        Self::DateTimeBasic,
        Self::DateTimeBasicWithoutZone,
        Self::DateTimeExtended,
        Self::DateTimeExtendedWithoutZone,
        Self::UtcDateTimeBasic,
        Self::UtcDateTimeExtended,
        Self::HCardDateTime,
        Self::TimeBasic,
        Self::TimeExtended,
    ];

    fn matches(self, shape: Shape) -> bool {
        use Style::{Basic, Extended};
        let Shape { date, time, zone } = shape;
        match self {
            Self::DateBasic => date == Some(Basic) && time.is_none(),
            Self::DateExtended => date == Some(Extended) && time.is_none(),
            Self::DateTimeBasic => {
                date == Some(Basic) && time == Some(Basic) && zone == Zone::Offset(false)
            }
            Self::DateTimeBasicWithoutZone => {
                date == Some(Basic) && time == Some(Basic) && zone == Zone::None
            }
            Self::DateTimeExtended => {
                date == Some(Extended) && time == Some(Extended) && zone == Zone::Offset(true)
            }
            Self::DateTimeExtendedWithoutZone => {
                date == Some(Extended) && time == Some(Extended) && zone == Zone::None
            }
            Self::UtcDateTimeBasic => {
                date == Some(Basic) && time == Some(Basic) && zone == Zone::Utc
            }
            Self::UtcDateTimeExtended => {
                date == Some(Extended) && time == Some(Extended) && zone == Zone::Utc
            }
            Self::HCardDateTime => {
                date == Some(Extended) && time == Some(Extended) && zone == Zone::Offset(false)
            }
            Self::TimeBasic => date.is_none() && time == Some(Basic),
            Self::TimeExtended => date.is_none() && time == Some(Extended),
        }
    }

    /// Finds the profile matching `s` and parses the value.
    ///
    /// A space is accepted in place of `T` and before the zone, so
    /// `2009-08-08 14:30:00 -0500` is read as an hCard date-time.
    ///
    /// ## Errors
    /// Returns [`VCardError::InvalidValue`] if no profile matches.
    pub fn parse(s: &str) -> VCardResult<(Self, IsoDateTime)> {
        let invalid = || VCardError::InvalidValue(format!("not an ISO-8601 date/time: {s}"));
        if !s.is_ascii() {
            return Err(invalid());
        }
        let lexed = lex(s.trim()).ok_or_else(invalid)?;
        let format = Self::ALL
            .into_iter()
            .find(|f| f.matches(lexed.shape))
            .ok_or_else(invalid)?;
        Ok((format, lexed.value))
    }

    /// Formats `value` in this profile.
    ///
    /// UTC profiles convert the value to UTC first; profiles without a zone
    /// drop the offset.
    #[must_use]
    pub fn format(self, value: &IsoDateTime) -> String {
        use Style::{Basic, Extended};
        let (style, zone) = match self {
            Self::DateBasic | Self::DateTimeBasicWithoutZone => (Basic, Zone::None),
            Self::DateExtended | Self::DateTimeExtendedWithoutZone => (Extended, Zone::None),
            Self::DateTimeBasic | Self::TimeBasic => (Basic, Zone::Offset(false)),
            Self::DateTimeExtended | Self::TimeExtended => (Extended, Zone::Offset(true)),
            Self::HCardDateTime => (Extended, Zone::Offset(false)),
            Self::UtcDateTimeBasic => (Basic, Zone::Utc),
            Self::UtcDateTimeExtended => (Extended, Zone::Utc),
        };
        let mut value = *value;
        match self {
            Self::DateBasic | Self::DateExtended => value.time = None,
            Self::TimeBasic | Self::TimeExtended => value.date = None,
            Self::UtcDateTimeBasic | Self::UtcDateTimeExtended => {
                if let Some(utc) = value.to_utc() {
                    value = IsoDateTime::from_utc(utc);
                }
            }
            _ => {}
        }
        write_value(&value, style, zone)
    }
}

struct Lexed {
    shape: Shape,
    value: IsoDateTime,
}

fn lex(s: &str) -> Option<Lexed> {
    let (date_part, time_part) = match s.find(['T', 't', ' ']) {
        Some(0) => ("", Some(&s[1..])),
        Some(pos) => (&s[..pos], Some(s[pos + 1..].trim_start())),
        None if s.contains(':') => ("", Some(s)),
        None => (s, None),
    };

    let (date_style, date) = if date_part.is_empty() {
        (None, None)
    } else {
        let (style, date) = lex_date(date_part)?;
        (Some(style), Some(date))
    };

    let (time_style, time, zone, offset) = match time_part {
        None => (None, None, Zone::None, None),
        Some(t) => {
            let (style, time, zone, offset) = lex_time(t)?;
            (Some(style), Some(time), zone, offset)
        }
    };

    if date.is_none() && time.is_none() {
        return None;
    }

    Some(Lexed {
        shape: Shape {
            date: date_style,
            time: time_style,
            zone,
        },
        value: IsoDateTime { date, time, offset },
    })
}

fn all_digits(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
}

fn lex_date(s: &str) -> Option<(Style, NaiveDate)> {
    let (style, y, m, d) = match s.len() {
        8 if all_digits(s) => (Style::Basic, &s[..4], &s[4..6], &s[6..]),
        10 if s.as_bytes()[4] == b'-' && s.as_bytes()[7] == b'-' => {
            (Style::Extended, &s[..4], &s[5..7], &s[8..])
        }
        _ => return None,
    };
    if ![y, m, d].iter().all(|p| all_digits(p)) {
        return None;
    }
    let date = NaiveDate::from_ymd_opt(y.parse().ok()?, m.parse().ok()?, d.parse().ok()?)?;
    Some((style, date))
}

fn lex_time(s: &str) -> Option<(Style, NaiveTime, Zone, Option<UtcOffset>)> {
    let (body, zone, offset) = if let Some(body) = s.strip_suffix(['Z', 'z']) {
        (body, Zone::Utc, Some(UtcOffset::UTC))
    } else if let Some(pos) = s.rfind(['+', '-']) {
        let designator = &s[pos..];
        let offset = UtcOffset::parse(designator).ok()?;
        (
            s[..pos].trim_end(),
            Zone::Offset(designator.contains(':')),
            Some(offset),
        )
    } else {
        (s, Zone::None, None)
    };

    let (body, nanos) = match body.find(['.', ',']) {
        Some(pos) => {
            let fraction = &body[pos + 1..];
            if !all_digits(fraction) {
                return None;
            }
            let padded: String = fraction.chars().chain("000000000".chars()).take(9).collect();
            (&body[..pos], padded.parse::<u32>().ok()?)
        }
        None => (body, 0),
    };

    let (style, h, m, sec) = match body.len() {
        6 if all_digits(body) => (Style::Basic, &body[..2], &body[2..4], &body[4..]),
        8 if body.as_bytes()[2] == b':' && body.as_bytes()[5] == b':' => {
            (Style::Extended, &body[..2], &body[3..5], &body[6..])
        }
        _ => return None,
    };
    if ![h, m, sec].iter().all(|p| all_digits(p)) {
        return None;
    }
    let time =
        NaiveTime::from_hms_nano_opt(h.parse().ok()?, m.parse().ok()?, sec.parse().ok()?, nanos)?;
    Some((style, time, zone, offset))
}

fn write_value(value: &IsoDateTime, style: Style, zone: Zone) -> String {
    let extended = style == Style::Extended;
    let mut out = String::with_capacity(25);

    if let Some(date) = value.date {
        if extended {
            out.push_str(&format!(
                "{:04}-{:02}-{:02}",
                date.year(),
                date.month(),
                date.day()
            ));
        } else {
            out.push_str(&format!(
                "{:04}{:02}{:02}",
                date.year(),
                date.month(),
                date.day()
            ));
        }
    }

    if let Some(time) = value.time {
        out.push('T');
        let sep = if extended { ":" } else { "" };
        out.push_str(&format!(
            "{:02}{sep}{:02}{sep}{:02}",
            time.hour(),
            time.minute(),
            time.second()
        ));
        let millis = time.nanosecond() / 1_000_000;
        if millis > 0 {
            out.push_str(&format!(".{millis:03}"));
        }

        match (zone, value.offset) {
            (Zone::Utc, _) => out.push('Z'),
            (Zone::Offset(_), Some(offset)) if offset.is_zero() => out.push('Z'),
            (Zone::Offset(colon), Some(offset)) => out.push_str(&offset.format(colon)),
            (Zone::None | Zone::Offset(_), None) | (Zone::None, Some(_)) => {}
        }
    }

    out
}
