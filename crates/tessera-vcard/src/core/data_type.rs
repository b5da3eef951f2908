//! Property value data types (the `VALUE` parameter).

use std::fmt;

use super::vcard::VCardVersion;

/// The declared type of a property value.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum VCardDataType {
    Text,
    Uri,
    Date,
    Time,
    DateTime,
    DateAndOrTime,
    Timestamp,
    Boolean,
    Integer,
    Float,
    UtcOffset,
    LanguageTag,
    /// Inline binary data (3.0 only).
    Binary,
    /// Remote reference (2.1 only; 3.0 and 4.0 use `uri`).
    Url,
    /// MIME content-id reference (2.1 only).
    ContentId,
    /// Extension type, preserved verbatim in lowercase.
    Other(String),
}

impl VCardDataType {
    const KNOWN: [Self; 15] = [
        Self::Text,
        Self::Uri,
        Self::Date,
        Self::Time,
        Self::DateTime,
        Self::DateAndOrTime,
        Self::Timestamp,
        Self::Boolean,
        Self::Integer,
        Self::Float,
        Self::UtcOffset,
        Self::LanguageTag,
        Self::Binary,
        Self::Url,
        Self::ContentId,
    ];

    /// Returns the canonical lowercase name.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Text => "text",
            Self::Uri => "uri",
            Self::Date => "date",
            Self::Time => "time",
            Self::DateTime => "date-time",
            Self::DateAndOrTime => "date-and-or-time",
            Self::Timestamp => "timestamp",
            Self::Boolean => "boolean",
            Self::Integer => "integer",
            Self::Float => "float",
            Self::UtcOffset => "utc-offset",
            Self::LanguageTag => "language-tag",
            Self::Binary => "binary",
            Self::Url => "url",
            Self::ContentId => "content-id",
            Self::Other(name) => name,
        }
    }

    /// Looks up a registered data type by name (case-insensitive).
    #[must_use]
    pub fn find(name: &str) -> Option<Self> {
        if name.eq_ignore_ascii_case("cid") {
            return Some(Self::ContentId);
        }
        Self::KNOWN
            .iter()
            .find(|t| t.name().eq_ignore_ascii_case(name))
            .cloned()
    }

    /// Looks up a data type, creating an extension type if it is not registered.
    #[must_use]
    pub fn get(name: &str) -> Self {
        Self::find(name).unwrap_or_else(|| Self::Other(name.to_ascii_lowercase()))
    }

    /// Versions in which this data type may appear in a `VALUE` parameter.
    #[must_use]
    pub fn supported_versions(&self) -> &'static [VCardVersion] {
        use VCardVersion::{V2_1, V3_0, V4_0};
        match self {
            Self::Url | Self::ContentId => &[V2_1],
            Self::Binary => &[V3_0],
            Self::Uri | Self::Date | Self::Time | Self::DateTime | Self::Boolean => &[V3_0, V4_0],
            Self::Float | Self::Integer | Self::UtcOffset => &[V3_0, V4_0],
            Self::DateAndOrTime | Self::Timestamp | Self::LanguageTag => &[V4_0],
            Self::Text | Self::Other(_) => &VCardVersion::ALL,
        }
    }

    /// Whether `name` is a registered data type in any version.
    #[must_use]
    pub fn is_known(name: &str) -> bool {
        Self::find(name).is_some()
    }
}

impl fmt::Display for VCardDataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
