//! Date-or-time values (BDAY, ANNIVERSARY, DEATHDATE).

use crate::codec::iso8601::IsoDateTime;
use crate::codec::partial::PartialDate;

/// One of three mutually exclusive date representations.
///
/// Only [`Full`](Self::Full) exists before vCard 4.0.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DateOrTime {
    /// A complete date, optionally with a time and offset.
    Full(IsoDateTime),
    /// A reduced or truncated date and/or time (e.g. `--0415`).
    Partial(PartialDate),
    /// Free text (e.g. "circa 1800").
    Text(String),
}

impl DateOrTime {
    /// Whether this value has a time component.
    #[must_use]
    pub fn has_time(&self) -> bool {
        match self {
            Self::Full(dt) => dt.time.is_some(),
            Self::Partial(p) => p.has_time(),
            Self::Text(_) => false,
        }
    }

    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            Self::Full(_) | Self::Partial(_) => None,
        }
    }
}

impl From<IsoDateTime> for DateOrTime {
    fn from(value: IsoDateTime) -> Self {
        Self::Full(value)
    }
}

impl From<PartialDate> for DateOrTime {
    fn from(value: PartialDate) -> Self {
        Self::Partial(value)
    }
}
