//! vCard properties and the closed set of property kinds.

use std::fmt;

use super::parameter::VCardParameters;
use super::structured::Agent;
use super::value::{PropertyValue, RawValue};
use super::vcard::VCardVersion;
use crate::error::{VCardError, VCardResult};

/// The kind of a property.
///
/// Every standard property has its own variant; anything else is an
/// [`Extension`](Self::Extension) whose name is carried by the property.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PropertyKind {
    FormattedName,
    StructuredName,
    Nickname,
    Address,
    Label,
    Telephone,
    Email,
    Mailer,
    Timezone,
    Geo,
    Title,
    Role,
    Organization,
    Member,
    Related,
    Kind,
    Categories,
    Note,
    ProductId,
    Revision,
    Uid,
    Url,
    Source,
    Gender,
    Language,
    SortString,
    Classification,
    Photo,
    Logo,
    Sound,
    Key,
    Agent,
    Birthday,
    Anniversary,
    Deathdate,
    FreeBusyUrl,
    CalendarUri,
    CalendarAddressUri,
    /// Unrecognized or extension (`X-`) property.
    Extension,
}

impl PropertyKind {
    /// Every standard kind, in the order their scribes are registered.
    pub const STANDARD: [Self; 38] = [
        Self::FormattedName,
        Self::StructuredName,
        Self::Nickname,
        Self::Address,
        Self::Label,
        Self::Telephone,
        Self::Email,
        Self::Mailer,
        Self::Timezone,
        Self::Geo,
        Self::Title,
        Self::Role,
        Self::Organization,
        Self::Member,
        Self::Related,
        Self::Kind,
        Self::Categories,
        Self::Note,
        Self::ProductId,
        Self::Revision,
        Self::Uid,
        Self::Url,
        Self::Source,
        Self::Gender,
        Self::Language,
        Self::SortString,
        Self::Classification,
        Self::Photo,
        Self::Logo,
        Self::Sound,
        Self::Key,
        Self::Agent,
        Self::Birthday,
        Self::Anniversary,
        Self::Deathdate,
        Self::FreeBusyUrl,
        Self::CalendarUri,
        Self::CalendarAddressUri,
    ];

    /// Returns the uppercase property name (`X-EXTENSION` for extensions).
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::FormattedName => "FN",
            Self::StructuredName => "N",
            Self::Nickname => "NICKNAME",
            Self::Address => "ADR",
            Self::Label => "LABEL",
            Self::Telephone => "TEL",
            Self::Email => "EMAIL",
            Self::Mailer => "MAILER",
            Self::Timezone => "TZ",
            Self::Geo => "GEO",
            Self::Title => "TITLE",
            Self::Role => "ROLE",
            Self::Organization => "ORG",
            Self::Member => "MEMBER",
            Self::Related => "RELATED",
            Self::Kind => "KIND",
            Self::Categories => "CATEGORIES",
            Self::Note => "NOTE",
            Self::ProductId => "PRODID",
            Self::Revision => "REV",
            Self::Uid => "UID",
            Self::Url => "URL",
            Self::Source => "SOURCE",
            Self::Gender => "GENDER",
            Self::Language => "LANG",
            Self::SortString => "SORT-STRING",
            Self::Classification => "CLASS",
            Self::Photo => "PHOTO",
            Self::Logo => "LOGO",
            Self::Sound => "SOUND",
            Self::Key => "KEY",
            Self::Agent => "AGENT",
            Self::Birthday => "BDAY",
            Self::Anniversary => "ANNIVERSARY",
            Self::Deathdate => "DEATHDATE",
            Self::FreeBusyUrl => "FBURL",
            Self::CalendarUri => "CALURI",
            Self::CalendarAddressUri => "CALADRURI",
            Self::Extension => "X-EXTENSION",
        }
    }

    /// Finds the standard kind for a property name (case-insensitive).
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::STANDARD
            .into_iter()
            .find(|k| k.name().eq_ignore_ascii_case(name))
    }

    /// Versions that define this property.
    #[must_use]
    pub const fn supported_versions(self) -> &'static [VCardVersion] {
        use VCardVersion::{V2_1, V3_0, V4_0};
        match self {
            Self::Label | Self::Mailer | Self::Agent => &[V2_1, V3_0],
            Self::SortString | Self::Classification => &[V3_0],
            Self::Nickname | Self::Categories | Self::ProductId | Self::Source => &[V3_0, V4_0],
            Self::Member
            | Self::Related
            | Self::Kind
            | Self::Gender
            | Self::Language
            | Self::Anniversary
            | Self::Deathdate
            | Self::FreeBusyUrl
            | Self::CalendarUri
            | Self::CalendarAddressUri => &[V4_0],
            Self::FormattedName
            | Self::StructuredName
            | Self::Address
            | Self::Telephone
            | Self::Email
            | Self::Timezone
            | Self::Geo
            | Self::Title
            | Self::Role
            | Self::Organization
            | Self::Note
            | Self::Revision
            | Self::Uid
            | Self::Url
            | Self::Photo
            | Self::Logo
            | Self::Sound
            | Self::Key
            | Self::Birthday
            | Self::Extension => &VCardVersion::ALL,
        }
    }

    /// Whether the property may appear in a card of `version`.
    #[must_use]
    pub fn is_supported_in(self, version: VCardVersion) -> bool {
        self.supported_versions().contains(&version)
    }

    /// The hCard class name.
    #[must_use]
    pub fn html_class(self) -> String {
        match self {
            Self::Categories => "category".to_string(),
            other => other.name().to_ascii_lowercase(),
        }
    }

    /// Whether `value` is a legal value shape for this kind.
    #[must_use]
    pub fn accepts(self, value: &PropertyValue) -> bool {
        use PropertyValue as V;
        match self {
            Self::Extension => true,
            Self::FormattedName
            | Self::Label
            | Self::Email
            | Self::Mailer
            | Self::Title
            | Self::Role
            | Self::Kind
            | Self::Note
            | Self::ProductId
            | Self::Uid
            | Self::Language
            | Self::SortString
            | Self::Classification => matches!(value, V::Text(_)),
            Self::Url
            | Self::Source
            | Self::Member
            | Self::FreeBusyUrl
            | Self::CalendarUri
            | Self::CalendarAddressUri => matches!(value, V::Uri(_)),
            Self::Nickname | Self::Categories => matches!(value, V::TextList(_)),
            Self::StructuredName => matches!(value, V::StructuredName(_)),
            Self::Address => matches!(value, V::Address(_)),
            Self::Organization => matches!(value, V::Organization(_)),
            Self::Gender => matches!(value, V::Gender(_)),
            Self::Telephone => matches!(value, V::Telephone(_)),
            Self::Timezone => matches!(value, V::Timezone(_)),
            Self::Geo => matches!(value, V::Geo(_)),
            Self::Birthday | Self::Anniversary | Self::Deathdate => {
                matches!(value, V::DateOrTime(_))
            }
            Self::Revision => matches!(value, V::Timestamp(_)),
            Self::Photo | Self::Logo | Self::Sound | Self::Key => matches!(value, V::Media(_)),
            Self::Related => matches!(value, V::Related(_)),
            Self::Agent => matches!(value, V::Agent(_)),
        }
    }
}

impl fmt::Display for PropertyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A single property of a card.
///
/// The value shape is checked against the kind on construction, so a
/// property never carries a value its scribe cannot write.
#[derive(Debug, Clone, PartialEq)]
pub struct VCardProperty {
    /// Optional property group (e.g., "item1" in "item1.TEL").
    pub group: Option<String>,
    /// Parameters in order of appearance.
    pub parameters: VCardParameters,
    kind: PropertyKind,
    name: String,
    value: PropertyValue,
}

impl VCardProperty {
    /// Creates a property of a standard kind.
    ///
    /// ## Errors
    /// Returns [`VCardError::InvalidValue`] if `value` does not fit `kind`.
    pub fn new(kind: PropertyKind, value: PropertyValue) -> VCardResult<Self> {
        if !kind.accepts(&value) {
            return Err(VCardError::InvalidValue(format!(
                "{kind} cannot hold a {} value",
                value.shape()
            )));
        }
        Ok(Self {
            group: None,
            parameters: VCardParameters::new(),
            kind,
            name: kind.name().to_string(),
            value,
        })
    }

    /// Creates an extension property with an arbitrary value.
    #[must_use]
    pub fn extension(name: impl Into<String>, value: PropertyValue) -> Self {
        Self {
            group: None,
            parameters: VCardParameters::new(),
            kind: PropertyKind::Extension,
            name: name.into().to_ascii_uppercase(),
            value,
        }
    }

    /// Creates a raw property that keeps its wire text verbatim.
    #[must_use]
    pub fn raw(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self::extension(name, PropertyValue::Raw(RawValue::new(value)))
    }

    /// Creates a text-valued property.
    ///
    /// Kinds that do not hold plain text become extension properties with the
    /// kind's name, which keeps this constructor infallible.
    #[must_use]
    pub fn text(kind: PropertyKind, value: impl Into<String>) -> Self {
        let value = PropertyValue::Text(value.into());
        if kind.accepts(&value) {
            Self {
                group: None,
                parameters: VCardParameters::new(),
                kind,
                name: kind.name().to_string(),
                value,
            }
        } else {
            Self::extension(kind.name(), value)
        }
    }

    /// Creates a URI-valued property (URL, SOURCE, MEMBER, ...).
    #[must_use]
    pub fn uri(kind: PropertyKind, value: impl Into<String>) -> Self {
        let value = PropertyValue::Uri(value.into());
        if kind.accepts(&value) {
            Self {
                group: None,
                parameters: VCardParameters::new(),
                kind,
                name: kind.name().to_string(),
                value,
            }
        } else {
            Self::extension(kind.name(), value)
        }
    }

    /// Creates an AGENT property.
    #[must_use]
    pub fn agent(agent: Agent) -> Self {
        Self {
            group: None,
            parameters: VCardParameters::new(),
            kind: PropertyKind::Agent,
            name: PropertyKind::Agent.name().to_string(),
            value: PropertyValue::Agent(agent),
        }
    }

    /// Builder-style group setter.
    #[must_use]
    pub fn with_group(mut self, group: impl Into<String>) -> Self {
        self.group = Some(group.into());
        self
    }

    /// Builder-style parameter setter.
    #[must_use]
    pub fn with_param(mut self, name: &str, value: impl Into<String>) -> Self {
        self.parameters.put(name, value);
        self
    }

    #[must_use]
    pub fn kind(&self) -> PropertyKind {
        self.kind
    }

    /// The uppercase property name as written on the wire.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn value(&self) -> &PropertyValue {
        &self.value
    }

    /// Replaces the value.
    ///
    /// ## Errors
    /// Returns [`VCardError::InvalidValue`] if `value` does not fit the kind.
    pub fn set_value(&mut self, value: PropertyValue) -> VCardResult<()> {
        if !self.kind.accepts(&value) {
            return Err(VCardError::InvalidValue(format!(
                "{} cannot hold a {} value",
                self.kind,
                value.shape()
            )));
        }
        self.value = value;
        Ok(())
    }

    /// Whether this property is defined for `version`.
    #[must_use]
    pub fn is_supported_in(&self, version: VCardVersion) -> bool {
        self.kind.is_supported_in(version)
    }
}
