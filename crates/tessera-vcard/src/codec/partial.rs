//! Reduced and truncated dates and times (vCard 4.0 `date-and-or-time`).
//!
//! Any subset of components may be present. Absent components are omitted
//! following the RFC 6350 patterns (`--0415`, `---15`, `T-2200`, ...) instead
//! of being zero-padded.

use std::fmt;

use super::offset::UtcOffset;
use crate::error::{VCardError, VCardResult};

/// A date and/or time with optional components.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PartialDate {
    pub year: Option<i32>,
    pub month: Option<u32>,
    pub day: Option<u32>,
    pub hour: Option<u32>,
    pub minute: Option<u32>,
    pub second: Option<u32>,
    pub offset: Option<UtcOffset>,
}

impl PartialDate {
    /// A month and day without a year (`--MMDD`).
    #[must_use]
    pub fn month_day(month: u32, day: u32) -> Self {
        Self {
            month: Some(month),
            day: Some(day),
            ..Self::default()
        }
    }

    /// A year alone (`YYYY`).
    #[must_use]
    pub fn year(year: i32) -> Self {
        Self {
            year: Some(year),
            ..Self::default()
        }
    }

    /// A year and month (`YYYY-MM`).
    #[must_use]
    pub fn year_month(year: i32, month: u32) -> Self {
        Self {
            year: Some(year),
            month: Some(month),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn has_date(&self) -> bool {
        self.year.is_some() || self.month.is_some() || self.day.is_some()
    }

    #[must_use]
    pub fn has_time(&self) -> bool {
        self.hour.is_some() || self.minute.is_some() || self.second.is_some()
    }

    /// Parses a basic or extended partial date/time.
    ///
    /// Time-only values are prefixed with `T`; an unprefixed value containing
    /// `:` is also read as a time.
    ///
    /// ## Errors
    /// Returns [`VCardError::InvalidValue`] if the value matches no pattern
    /// or a component is out of range.
    pub fn parse(s: &str) -> VCardResult<Self> {
        let s = s.trim();
        let invalid = || VCardError::InvalidValue(format!("not a partial date: {s}"));
        if !s.is_ascii() {
            return Err(invalid());
        }

        let (date_part, time_part) = match s.find(['T', 't']) {
            Some(pos) => (&s[..pos], Some(&s[pos + 1..])),
            None if s.contains(':') => ("", Some(s)),
            None => (s, None),
        };

        let mut value = Self::default();
        if !date_part.is_empty() {
            parse_date(date_part, &mut value).ok_or_else(invalid)?;
        }
        if let Some(time_part) = time_part {
            parse_time(time_part, &mut value).ok_or_else(invalid)?;
        }
        if !value.has_date() && !value.has_time() {
            return Err(invalid());
        }
        if !value.in_range() {
            return Err(invalid());
        }
        Ok(value)
    }

    fn in_range(&self) -> bool {
        self.month.is_none_or(|m| (1..=12).contains(&m))
            && self.day.is_none_or(|d| (1..=31).contains(&d))
            && self.hour.is_none_or(|h| h <= 23)
            && self.minute.is_none_or(|m| m <= 59)
            && self.second.is_none_or(|s| s <= 60)
    }

    /// Formats in basic (`--0415T10`) or extended (`--04-15T10`) form.
    #[must_use]
    pub fn format(&self, extended: bool) -> String {
        let mut out = String::new();
        self.write_date(&mut out, extended);
        if self.has_time() {
            out.push('T');
            self.write_time(&mut out, extended);
        }
        out
    }

    fn write_date(&self, out: &mut String, extended: bool) {
        match (self.year, self.month, self.day) {
            (Some(y), None, None) => out.push_str(&format!("{y:04}")),
            (Some(y), Some(m), None) => out.push_str(&format!("{y:04}-{m:02}")),
            (Some(y), Some(m), Some(d)) if extended => {
                out.push_str(&format!("{y:04}-{m:02}-{d:02}"));
            }
            (Some(y), Some(m), Some(d)) => out.push_str(&format!("{y:04}{m:02}{d:02}")),
            (None, Some(m), None) => out.push_str(&format!("--{m:02}")),
            (None, Some(m), Some(d)) if extended => out.push_str(&format!("--{m:02}-{d:02}")),
            (None, Some(m), Some(d)) => out.push_str(&format!("--{m:02}{d:02}")),
            (None, None, Some(d)) => out.push_str(&format!("---{d:02}")),
            // A year and day without a month has no lexical form.
            (Some(y), None, Some(_)) => out.push_str(&format!("{y:04}")),
            (None, None, None) => {}
        }
    }

    fn write_time(&self, out: &mut String, extended: bool) {
        let sep = if extended { ":" } else { "" };
        match (self.hour, self.minute, self.second) {
            (Some(h), None, _) => out.push_str(&format!("{h:02}")),
            (Some(h), Some(m), None) => out.push_str(&format!("{h:02}{sep}{m:02}")),
            (Some(h), Some(m), Some(s)) => out.push_str(&format!("{h:02}{sep}{m:02}{sep}{s:02}")),
            (None, Some(m), None) => out.push_str(&format!("-{m:02}")),
            (None, Some(m), Some(s)) => out.push_str(&format!("-{m:02}{sep}{s:02}")),
            (None, None, Some(s)) => out.push_str(&format!("--{s:02}")),
            (None, None, None) => {}
        }
        if let Some(offset) = self.offset {
            if offset.is_zero() {
                out.push('Z');
            } else {
                out.push_str(&offset.format(extended));
            }
        }
    }
}

impl fmt::Display for PartialDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.format(false))
    }
}

fn number<T: std::str::FromStr>(s: &str, len: usize) -> Option<T> {
    if s.len() == len && s.bytes().all(|b| b.is_ascii_digit()) {
        s.parse().ok()
    } else {
        None
    }
}

fn parse_date(s: &str, value: &mut PartialDate) -> Option<()> {
    if let Some(day) = s.strip_prefix("---") {
        value.day = Some(number(day, 2)?);
    } else if let Some(rest) = s.strip_prefix("--") {
        let rest = rest.replace('-', "");
        match rest.len() {
            2 => value.month = Some(number(&rest, 2)?),
            4 => {
                value.month = Some(number(&rest[..2], 2)?);
                value.day = Some(number(&rest[2..], 2)?);
            }
            _ => return None,
        }
    } else {
        match s.len() {
            4 => value.year = Some(number(s, 4)?),
            7 if s.as_bytes()[4] == b'-' => {
                value.year = Some(number(&s[..4], 4)?);
                value.month = Some(number(&s[5..], 2)?);
            }
            8 => {
                value.year = Some(number(&s[..4], 4)?);
                value.month = Some(number(&s[4..6], 2)?);
                value.day = Some(number(&s[6..], 2)?);
            }
            10 if s.as_bytes()[4] == b'-' && s.as_bytes()[7] == b'-' => {
                value.year = Some(number(&s[..4], 4)?);
                value.month = Some(number(&s[5..7], 2)?);
                value.day = Some(number(&s[8..], 2)?);
            }
            _ => return None,
        }
    }
    Some(())
}

fn parse_time(s: &str, value: &mut PartialDate) -> Option<()> {
    let (body, offset) = if let Some(body) = s.strip_suffix(['Z', 'z']) {
        (body, Some(UtcOffset::UTC))
    } else {
        // A leading '-' marks a truncated time, not an offset.
        let search_from = s.len() - s.trim_start_matches('-').len();
        match s[search_from..].rfind(['+', '-']) {
            Some(pos) => {
                let pos = search_from + pos;
                (&s[..pos], Some(UtcOffset::parse(&s[pos..]).ok()?))
            }
            None => (s, None),
        }
    };
    value.offset = offset;

    let dashes = body.len() - body.trim_start_matches('-').len();
    let digits = body[dashes..].replace(':', "");
    let pair = |i: usize| number::<u32>(digits.get(i..i + 2)?, 2);

    match (dashes, digits.len()) {
        (0, 2) => value.hour = Some(pair(0)?),
        (0, 4) => {
            value.hour = Some(pair(0)?);
            value.minute = Some(pair(2)?);
        }
        (0, 6) => {
            value.hour = Some(pair(0)?);
            value.minute = Some(pair(2)?);
            value.second = Some(pair(4)?);
        }
        (1, 2) => value.minute = Some(pair(0)?),
        (1, 4) => {
            value.minute = Some(pair(0)?);
            value.second = Some(pair(2)?);
        }
        (2, 2) => value.second = Some(pair(0)?),
        _ => return None,
    }
    Some(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rfc_6350_date_patterns() {
        assert_eq!(PartialDate::parse("1985").unwrap(), PartialDate::year(1985));
        assert_eq!(
            PartialDate::parse("1985-04").unwrap(),
            PartialDate::year_month(1985, 4)
        );
        assert_eq!(
            PartialDate::parse("--0412").unwrap(),
            PartialDate::month_day(4, 12)
        );
        assert_eq!(
            PartialDate::parse("--04-12").unwrap(),
            PartialDate::month_day(4, 12)
        );
        assert_eq!(PartialDate::parse("---12").unwrap().day, Some(12));
        assert_eq!(PartialDate::parse("--04").unwrap().month, Some(4));
    }

    #[test]
    fn rfc_6350_time_patterns() {
        let t = PartialDate::parse("T10").unwrap();
        assert_eq!((t.hour, t.minute), (Some(10), None));

        let t = PartialDate::parse("T-2200").unwrap();
        assert_eq!((t.hour, t.minute, t.second), (None, Some(22), Some(0)));

        let t = PartialDate::parse("T--00").unwrap();
        assert_eq!(t.second, Some(0));

        let t = PartialDate::parse("T102200-0800").unwrap();
        assert_eq!(t.offset, Some(UtcOffset::new(false, 8, 0)));

        let t = PartialDate::parse("10:22Z").unwrap();
        assert_eq!((t.hour, t.minute, t.offset), (Some(10), Some(22), Some(UtcOffset::UTC)));
    }

    #[test]
    fn date_time_combination() {
        let v = PartialDate::parse("--0415T23").unwrap();
        assert_eq!(v.month, Some(4));
        assert_eq!(v.hour, Some(23));
        assert_eq!(v.format(false), "--0415T23");
        assert_eq!(v.format(true), "--04-15T23");
    }

    #[test]
    fn formatting_reproduces_omission_pattern() {
        let inputs = [
            "1985", "1985-04", "--0412", "---12", "--04", "T10", "T-2200", "T--00", "T1022Z",
        ];
        for input in inputs {
            assert_eq!(PartialDate::parse(input).unwrap().format(false), input);
        }
    }

    #[test]
    fn rejects_out_of_range_and_garbage() {
        for bad in ["", "--1332", "T25", "abcd", "1985-4", "T"] {
            assert!(PartialDate::parse(bad).is_err(), "{bad}");
        }
        for bad in ["12日345", "--日x", "198日", "T1日"] {
            assert!(PartialDate::parse(bad).is_err(), "{bad}");
        }
    }
}
