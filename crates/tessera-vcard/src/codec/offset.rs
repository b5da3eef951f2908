//! UTC offsets (`-05:00`, `+0530`, `Z`).

use std::fmt;

use chrono::FixedOffset;

use crate::error::{VCardError, VCardResult};

/// A signed UTC offset.
///
/// Minutes are optional so that an hour-only offset such as `-05` keeps its
/// lexical form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct UtcOffset {
    pub positive: bool,
    pub hours: u8,
    pub minutes: Option<u8>,
}

impl UtcOffset {
    /// Zero offset.
    pub const UTC: Self = Self {
        positive: true,
        hours: 0,
        minutes: None,
    };

    #[must_use]
    pub const fn new(positive: bool, hours: u8, minutes: u8) -> Self {
        Self {
            positive,
            hours,
            minutes: Some(minutes),
        }
    }

    /// Offset from UTC in seconds.
    #[must_use]
    pub fn total_seconds(self) -> i32 {
        let magnitude =
            i32::from(self.hours) * 3600 + i32::from(self.minutes.unwrap_or(0)) * 60;
        if self.positive { magnitude } else { -magnitude }
    }

    #[must_use]
    pub fn is_zero(self) -> bool {
        self.total_seconds() == 0
    }

    /// Builds an offset from a chrono offset.
    #[must_use]
    pub fn from_fixed(offset: FixedOffset) -> Self {
        let seconds = offset.local_minus_utc();
        let minutes_total = seconds.unsigned_abs() / 60;
        Self {
            positive: seconds >= 0,
            hours: u8::try_from(minutes_total / 60).unwrap_or(u8::MAX),
            minutes: Some(u8::try_from(minutes_total % 60).unwrap_or(0)),
        }
    }

    /// Converts to a chrono offset; `None` if out of range.
    #[must_use]
    pub fn to_fixed(self) -> Option<FixedOffset> {
        FixedOffset::east_opt(self.total_seconds())
    }

    /// Parses `Z`, `±HH`, `±HHMM` or `±HH:MM`.
    ///
    /// ## Errors
    /// Returns [`VCardError::InvalidValue`] for anything else.
    pub fn parse(s: &str) -> VCardResult<Self> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("z") {
            return Ok(Self::UTC);
        }

        let invalid = || VCardError::InvalidValue(format!("invalid UTC offset: {s}"));
        let (positive, rest) = if let Some(rest) = s.strip_prefix('+') {
            (true, rest)
        } else if let Some(rest) = s.strip_prefix('-') {
            (false, rest)
        } else {
            return Err(invalid());
        };

        let digits: String = rest.chars().filter(|&c| c != ':').collect();
        if !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }
        let colon_ok = match rest.find(':') {
            None => true,
            Some(pos) => pos == 2 && rest.len() == 5,
        };
        if !colon_ok {
            return Err(invalid());
        }

        let number = |s: &str| s.parse::<u8>().ok().ok_or_else(invalid);
        let (hours, minutes) = match digits.len() {
            1 | 2 => (number(&digits)?, None),
            4 => (number(&digits[..2])?, Some(number(&digits[2..])?)),
            _ => return Err(invalid()),
        };
        if hours > 23 || minutes.is_some_and(|m| m > 59) {
            return Err(invalid());
        }

        Ok(Self {
            positive,
            hours,
            minutes,
        })
    }

    /// Formats with a leading sign and zero-padded hour.
    ///
    /// Minutes, when present, are colon-separated only in `extended` mode.
    #[must_use]
    pub fn format(self, extended: bool) -> String {
        let sign = if self.positive { '+' } else { '-' };
        match self.minutes {
            Some(m) if extended => format!("{sign}{:02}:{m:02}", self.hours),
            Some(m) => format!("{sign}{:02}{m:02}", self.hours),
            None => format!("{sign}{:02}", self.hours),
        }
    }
}

impl fmt::Display for UtcOffset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.format(true))
    }
}
