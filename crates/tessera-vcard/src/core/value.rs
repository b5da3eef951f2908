//! Property value types.

use chrono::{DateTime, Utc};

use super::data_type::VCardDataType;
use super::datetime::DateOrTime;
use super::media::MediaValue;
use super::structured::{
    Address, Agent, Gender, Organization, Related, StructuredName, Telephone, Timezone,
};
use crate::codec::geo::GeoUri;

/// A typed property value.
///
/// Each [`PropertyKind`](super::PropertyKind) accepts exactly one of these
/// shapes; extension properties accept any.
#[derive(Debug, Clone, PartialEq)]
pub enum PropertyValue {
    /// Plain text (FN, NOTE, EMAIL, ...).
    Text(String),
    /// A URI (URL, SOURCE, MEMBER, ...).
    Uri(String),
    /// Comma-separated text (NICKNAME, CATEGORIES).
    TextList(Vec<String>),
    StructuredName(StructuredName),
    Address(Address),
    Organization(Organization),
    Gender(Gender),
    Telephone(Telephone),
    /// BDAY, ANNIVERSARY, DEATHDATE.
    DateOrTime(DateOrTime),
    /// REV; always normalized to UTC.
    Timestamp(DateTime<Utc>),
    /// PHOTO, LOGO, SOUND, KEY.
    Media(MediaValue),
    Related(Related),
    Agent(Agent),
    Geo(GeoUri),
    Timezone(Timezone),
    /// Unparsed wire text of an unrecognized or unparsable property.
    Raw(RawValue),
}

impl PropertyValue {
    /// A short name for the value's shape, used in error messages.
    #[must_use]
    pub fn shape(&self) -> &'static str {
        match self {
            Self::Text(_) => "text",
            Self::Uri(_) => "uri",
            Self::TextList(_) => "text-list",
            Self::StructuredName(_) => "structured-name",
            Self::Address(_) => "address",
            Self::Organization(_) => "organization",
            Self::Gender(_) => "gender",
            Self::Telephone(_) => "telephone",
            Self::DateOrTime(_) => "date-or-time",
            Self::Timestamp(_) => "timestamp",
            Self::Media(_) => "media",
            Self::Related(_) => "related",
            Self::Agent(_) => "agent",
            Self::Geo(_) => "geo",
            Self::Timezone(_) => "timezone",
            Self::Raw(_) => "raw",
        }
    }

    /// Returns the value as text if it is text or raw text.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            Self::Raw(raw) => Some(&raw.value),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_uri(&self) -> Option<&str> {
        match self {
            Self::Uri(s) => Some(s),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_text_list(&self) -> Option<&[String]> {
        match self {
            Self::TextList(list) => Some(list),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_address(&self) -> Option<&Address> {
        match self {
            Self::Address(a) => Some(a),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_structured_name(&self) -> Option<&StructuredName> {
        match self {
            Self::StructuredName(n) => Some(n),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_date_or_time(&self) -> Option<&DateOrTime> {
        match self {
            Self::DateOrTime(d) => Some(d),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_media(&self) -> Option<&MediaValue> {
        match self {
            Self::Media(m) => Some(m),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_geo(&self) -> Option<&GeoUri> {
        match self {
            Self::Geo(g) => Some(g),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_raw(&self) -> Option<&RawValue> {
        match self {
            Self::Raw(r) => Some(r),
            _ => None,
        }
    }
}

/// The literal wire value of a property no scribe understood.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawValue {
    /// The value exactly as read (still escaped for the text syntax).
    pub value: String,
    /// Explicit `VALUE` data type, if one was declared.
    pub data_type: Option<VCardDataType>,
}

impl RawValue {
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            data_type: None,
        }
    }

    #[must_use]
    pub fn typed(value: impl Into<String>, data_type: Option<VCardDataType>) -> Self {
        Self {
            value: value.into(),
            data_type,
        }
    }
}
