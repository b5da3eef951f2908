//! Structured vCard value types.
//!
//! These are the compound values of N, ADR, ORG, GENDER, TEL, RELATED, AGENT
//! and TZ.

use super::vcard::VCard;
use crate::codec::offset::UtcOffset;

/// Structured name (N property).
///
/// All components are optional.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StructuredName {
    /// Family names (surnames).
    pub family: Vec<String>,
    /// Given names (first names).
    pub given: Vec<String>,
    /// Additional names (middle names).
    pub additional: Vec<String>,
    /// Honorific prefixes (e.g., "Mr.", "Dr.").
    pub prefixes: Vec<String>,
    /// Honorific suffixes (e.g., "Jr.", "M.D.").
    pub suffixes: Vec<String>,
}

impl StructuredName {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a structured name with family and given names.
    #[must_use]
    pub fn simple(family: impl Into<String>, given: impl Into<String>) -> Self {
        Self {
            family: vec![family.into()],
            given: vec![given.into()],
            ..Self::default()
        }
    }

    /// The components in wire order.
    #[must_use]
    pub fn components(&self) -> [&[String]; 5] {
        [
            &self.family,
            &self.given,
            &self.additional,
            &self.prefixes,
            &self.suffixes,
        ]
    }

    /// Builds a name from components in wire order; missing ones are empty.
    #[must_use]
    pub fn from_components(mut components: Vec<Vec<String>>) -> Self {
        components.resize(5, Vec::new());
        let mut it = components.into_iter();
        let mut next = || it.next().unwrap_or_default();
        Self {
            family: next(),
            given: next(),
            additional: next(),
            prefixes: next(),
            suffixes: next(),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.components().iter().all(|c| c.is_empty())
    }
}

/// Address (ADR property).
///
/// The delivery label, when present, lives in the property's `LABEL`
/// parameter rather than here.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Address {
    pub po_box: Vec<String>,
    /// Extended address (e.g., apartment or suite number).
    pub extended: Vec<String>,
    pub street: Vec<String>,
    /// City.
    pub locality: Vec<String>,
    /// State or province.
    pub region: Vec<String>,
    pub postal_code: Vec<String>,
    pub country: Vec<String>,
}

impl Address {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The components in wire order.
    #[must_use]
    pub fn components(&self) -> [&[String]; 7] {
        [
            &self.po_box,
            &self.extended,
            &self.street,
            &self.locality,
            &self.region,
            &self.postal_code,
            &self.country,
        ]
    }

    /// Builds an address from components in wire order.
    #[must_use]
    pub fn from_components(mut components: Vec<Vec<String>>) -> Self {
        components.resize(7, Vec::new());
        let mut it = components.into_iter();
        let mut next = || it.next().unwrap_or_default();
        Self {
            po_box: next(),
            extended: next(),
            street: next(),
            locality: next(),
            region: next(),
            postal_code: next(),
            country: next(),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.components().iter().all(|c| c.is_empty())
    }
}

/// Organization (ORG property).
///
/// First value is the organizational name, subsequent values are
/// organizational units in order of decreasing specificity.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Organization {
    pub name: String,
    pub units: Vec<String>,
}

impl Organization {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            units: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_units(name: impl Into<String>, units: Vec<String>) -> Self {
        Self {
            name: name.into(),
            units,
        }
    }

    /// Name followed by units.
    #[must_use]
    pub fn values(&self) -> Vec<String> {
        std::iter::once(self.name.clone())
            .chain(self.units.iter().cloned())
            .collect()
    }

    #[must_use]
    pub fn from_values(values: Vec<String>) -> Self {
        let mut it = values.into_iter();
        Self {
            name: it.next().unwrap_or_default(),
            units: it.collect(),
        }
    }
}

/// Gender (GENDER property).
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Gender {
    pub sex: Option<Sex>,
    /// Free-form gender identity.
    pub identity: Option<String>,
}

impl Gender {
    #[must_use]
    pub fn sex(sex: Sex) -> Self {
        Self {
            sex: Some(sex),
            identity: None,
        }
    }

    #[must_use]
    pub fn full(sex: Sex, identity: impl Into<String>) -> Self {
        Self {
            sex: Some(sex),
            identity: Some(identity.into()),
        }
    }
}

/// Sex component of GENDER.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sex {
    Male,
    Female,
    Other,
    None,
    Unknown,
}

impl Sex {
    #[must_use]
    pub fn from_char(c: char) -> Option<Self> {
        match c.to_ascii_uppercase() {
            'M' => Some(Self::Male),
            'F' => Some(Self::Female),
            'O' => Some(Self::Other),
            'N' => Some(Self::None),
            'U' => Some(Self::Unknown),
            _ => Option::None,
        }
    }

    #[must_use]
    pub const fn as_char(self) -> char {
        match self {
            Self::Male => 'M',
            Self::Female => 'F',
            Self::Other => 'O',
            Self::None => 'N',
            Self::Unknown => 'U',
        }
    }
}

/// Telephone value: free text or a `tel:` URI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Telephone {
    Text(String),
    Uri(TelUri),
}

/// A parsed `tel:` URI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TelUri {
    /// The telephone number (global or local).
    pub number: String,
    pub extension: Option<String>,
    /// Other URI parameters, in order.
    pub parameters: Vec<(String, String)>,
}

impl TelUri {
    #[must_use]
    pub fn new(number: impl Into<String>) -> Self {
        Self {
            number: number.into(),
            extension: None,
            parameters: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_extension(number: impl Into<String>, ext: impl Into<String>) -> Self {
        Self {
            extension: Some(ext.into()),
            ..Self::new(number)
        }
    }

    /// Parses a `tel:` URI; returns `None` when the scheme is missing.
    #[must_use]
    pub fn parse(uri: &str) -> Option<Self> {
        let scheme = uri.get(..4)?;
        if !scheme.eq_ignore_ascii_case("tel:") {
            return None;
        }
        let mut parts = uri[4..].split(';');
        let number = parts.next()?.to_string();
        if number.is_empty() {
            return None;
        }
        let mut tel = Self::new(number);
        for part in parts {
            let (name, value) = part.split_once('=').unwrap_or((part, ""));
            if name.eq_ignore_ascii_case("ext") {
                tel.extension = Some(value.to_string());
            } else {
                tel.parameters.push((name.to_string(), value.to_string()));
            }
        }
        Some(tel)
    }

    /// Formats as a `tel:` URI string.
    #[must_use]
    pub fn to_uri(&self) -> String {
        let mut out = format!("tel:{}", self.number);
        if let Some(ext) = &self.extension {
            out.push_str(";ext=");
            out.push_str(ext);
        }
        for (name, value) in &self.parameters {
            out.push(';');
            out.push_str(name);
            if !value.is_empty() {
                out.push('=');
                out.push_str(value);
            }
        }
        out
    }
}

/// Related contact (RELATED property).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Related {
    /// URI reference to another vCard.
    Uri(String),
    /// Free-text description.
    Text(String),
}

/// Agent (AGENT property): another card acting on behalf of this one.
#[derive(Debug, Clone, PartialEq)]
pub enum Agent {
    /// Nested card.
    Card(Box<VCard>),
    /// Reference to the agent's card.
    Uri(String),
}

/// Time zone (TZ property).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Timezone {
    Offset(UtcOffset),
    /// Free text, typically an Olson identifier.
    Text(String),
    Uri(String),
}
