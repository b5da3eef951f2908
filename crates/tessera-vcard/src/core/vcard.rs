//! vCard wrapper type.

use std::fmt;

use super::property::{PropertyKind, VCardProperty};
use super::value::PropertyValue;

/// vCard version.
///
/// Ordered oldest to newest so version policy can compare with `<`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum VCardVersion {
    /// vCard 2.1 (versit consortium).
    V2_1,
    /// vCard 3.0 (RFC 2426).
    V3_0,
    /// vCard 4.0 (RFC 6350).
    #[default]
    V4_0,
}

impl VCardVersion {
    /// All versions, oldest first.
    pub const ALL: [Self; 3] = [Self::V2_1, Self::V3_0, Self::V4_0];

    /// Parses from version string.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim() {
            "2.1" => Some(Self::V2_1),
            "3.0" => Some(Self::V3_0),
            "4.0" => Some(Self::V4_0),
            _ => None,
        }
    }

    /// Returns the version string.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::V2_1 => "2.1",
            Self::V3_0 => "3.0",
            Self::V4_0 => "4.0",
        }
    }

    /// Returns the xCard namespace, which only exists for 4.0.
    #[must_use]
    pub const fn xml_namespace(self) -> Option<&'static str> {
        match self {
            Self::V4_0 => Some(crate::scribe::wire::VCARD_NS),
            Self::V2_1 | Self::V3_0 => None,
        }
    }

    /// Whether values use the pre-RFC 2.1 conventions (no escaping of
    /// newlines, positional parameters, quoted-printable).
    #[must_use]
    pub const fn is_legacy(self) -> bool {
        matches!(self, Self::V2_1)
    }
}

impl fmt::Display for VCardVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl core::str::FromStr for VCardVersion {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or(())
    }
}

/// Formats a version set as `2.1, 3.0` for warnings.
#[must_use]
pub fn describe_versions(versions: &[VCardVersion]) -> String {
    versions
        .iter()
        .map(|v| v.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

/// A complete vCard.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct VCard {
    /// vCard version.
    pub version: VCardVersion,
    /// All properties in order of appearance.
    pub properties: Vec<VCardProperty>,
}

impl VCard {
    /// Creates a new vCard 4.0.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a vCard with the specified version.
    #[must_use]
    pub fn with_version(version: VCardVersion) -> Self {
        Self {
            version,
            properties: Vec::new(),
        }
    }

    /// Adds a property to the vCard.
    pub fn add_property(&mut self, prop: VCardProperty) {
        self.properties.push(prop);
    }

    /// Returns all properties of the given kind.
    pub fn properties_of(&self, kind: PropertyKind) -> impl Iterator<Item = &VCardProperty> {
        self.properties.iter().filter(move |p| p.kind() == kind)
    }

    /// Returns the first property of the given kind.
    #[must_use]
    pub fn property(&self, kind: PropertyKind) -> Option<&VCardProperty> {
        self.properties.iter().find(|p| p.kind() == kind)
    }

    /// Returns all properties with the given name (case-insensitive).
    #[must_use]
    pub fn properties_named(&self, name: &str) -> Vec<&VCardProperty> {
        self.properties
            .iter()
            .filter(|p| p.name().eq_ignore_ascii_case(name))
            .collect()
    }

    /// Removes every property of the given kind, returning them.
    pub fn remove_kind(&mut self, kind: PropertyKind) -> Vec<VCardProperty> {
        let (removed, kept) = std::mem::take(&mut self.properties)
            .into_iter()
            .partition(|p| p.kind() == kind);
        self.properties = kept;
        removed
    }

    /// Returns the FN (formatted name) value.
    #[must_use]
    pub fn formatted_name(&self) -> Option<&str> {
        self.property(PropertyKind::FormattedName)?.value().as_text()
    }

    /// Returns whether a KIND property marks this card as a group.
    #[must_use]
    pub fn is_group(&self) -> bool {
        self.properties_of(PropertyKind::Kind).any(|p| {
            matches!(p.value(), PropertyValue::Text(kind) if kind.eq_ignore_ascii_case("group"))
        })
    }
}
