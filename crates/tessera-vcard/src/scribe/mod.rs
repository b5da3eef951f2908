//! Per-property transcoders.
//!
//! A [`Scribe`] converts one property kind to and from each of the four
//! syntaxes (text, xCard, jCard, hCard) for every vCard version. Scribes are
//! stateless and shared through the [`ScribeRegistry`](crate::registry::ScribeRegistry).
//!
//! Recoverable conditions are outcomes, not errors: writing may
//! [`Skip`](WriteOutcome::Skip) a property or hand back an
//! [`EmbeddedCard`](WriteOutcome::EmbeddedCard); parsing may report
//! [`CannotParse`](ParseOutcome::CannotParse), which readers turn into a raw
//! property plus a warning.

mod address;
mod agent;
mod date_or_time;
mod gender;
mod geo;
mod list;
mod media;
mod name;
mod organization;
mod raw;
mod related;
pub mod structured;
mod telephone;
mod text;
mod timestamp;
mod timezone;
pub mod wire;


use std::fmt;
use std::sync::Arc;

pub use address::AddressScribe;
pub use agent::AgentScribe;
pub use date_or_time::DateOrTimeScribe;
pub use gender::GenderScribe;
pub use geo::GeoScribe;
pub use list::ListScribe;
pub use media::MediaScribe;
pub use name::StructuredNameScribe;
pub use organization::OrganizationScribe;
pub use raw::RawScribe;
pub use related::RelatedScribe;
pub use structured::{StructuredBuilder, StructuredIterator};
pub use telephone::TelephoneScribe;
pub use text::TextScribe;
pub use timestamp::TimestampScribe;
pub use timezone::TimezoneScribe;
pub use wire::{HtmlElement, JCardValue, XmlElement};

use crate::codec::escape::{escape_text, unescape_text};
use crate::core::{
    PropertyKind, PropertyValue, VCard, VCardDataType, VCardParameters, VCardProperty,
    VCardVersion, Warning,
};
use crate::error::{VCardError, VCardResult};

/// Result of writing one property.
#[derive(Debug, Clone, PartialEq)]
pub enum WriteOutcome<T> {
    /// The wire value.
    Value(T),
    /// The property has nothing to write in this version or syntax.
    Skip,
    /// The value is a nested card the document writer must serialize.
    EmbeddedCard(VCard),
}

impl<T> WriteOutcome<T> {
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> WriteOutcome<U> {
        match self {
            Self::Value(v) => WriteOutcome::Value(f(v)),
            Self::Skip => WriteOutcome::Skip,
            Self::EmbeddedCard(card) => WriteOutcome::EmbeddedCard(card),
        }
    }
}

/// Where the nested card of an [`EmbeddedCard`](ParseOutcome::EmbeddedCard)
/// outcome lives.
#[derive(Debug, Clone, PartialEq)]
pub enum NestedCard {
    /// The following lines of the same text stream (vCard 2.1).
    Inline,
    /// A complete serialized card (vCard 3.0).
    Text(String),
    /// An hCard element.
    Html(HtmlElement),
}

/// Result of parsing one property.
#[derive(Debug, Clone, PartialEq)]
pub enum ParseOutcome {
    Property(VCardProperty),
    /// The value is malformed for its kind or illegal in the version.
    CannotParse { raw: String, reason: String },
    /// The reader must parse `nested` and store it into `property`.
    EmbeddedCard {
        property: VCardProperty,
        nested: NestedCard,
    },
}

impl ParseOutcome {
    /// Builds a property of `kind`, falling back to
    /// [`CannotParse`](Self::CannotParse) if the value does not fit.
    ///
    /// The fallback has no raw text of its own; readers supply it with
    /// [`or_raw`](Self::or_raw).
    #[must_use]
    pub fn property(kind: PropertyKind, value: PropertyValue, parameters: VCardParameters) -> Self {
        match VCardProperty::new(kind, value) {
            Ok(mut property) => {
                property.parameters = parameters;
                Self::Property(property)
            }
            Err(e) => Self::CannotParse {
                raw: String::new(),
                reason: e.to_string(),
            },
        }
    }

    #[must_use]
    pub fn cannot_parse(raw: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::CannotParse {
            raw: raw.into(),
            reason: reason.into(),
        }
    }

    /// Fills an empty `CannotParse` raw value with the wire text it came from.
    #[must_use]
    pub fn or_raw(self, source: impl FnOnce() -> String) -> Self {
        match self {
            Self::CannotParse { raw, reason } if raw.is_empty() => Self::CannotParse {
                raw: source(),
                reason,
            },
            other => other,
        }
    }
}

/// Per-property state handed to parse operations.
#[derive(Debug, Clone)]
pub struct ParseContext {
    pub version: VCardVersion,
    /// 1-based line of the property in text input.
    pub line: Option<usize>,
    pub property_name: String,
    warnings: Vec<Warning>,
}

impl ParseContext {
    #[must_use]
    pub fn new(version: VCardVersion, property_name: impl Into<String>) -> Self {
        Self {
            version,
            line: None,
            property_name: property_name.into(),
            warnings: Vec::new(),
        }
    }

    #[must_use]
    pub fn at_line(mut self, line: usize) -> Self {
        self.line = Some(line);
        self
    }

    /// Records a warning against the current property.
    pub fn warn(&mut self, message: impl Into<String>) {
        self.warnings.push(
            Warning::for_property(self.property_name.clone(), message).at_line(self.line),
        );
    }

    #[must_use]
    pub fn warnings(&self) -> &[Warning] {
        &self.warnings
    }

    pub fn take_warnings(&mut self) -> Vec<Warning> {
        std::mem::take(&mut self.warnings)
    }
}

/// Transcoder for one property kind.
///
/// Implementors provide [`encode_text`](Self::encode_text) and
/// [`parse_text`](Self::parse_text). The tree syntaxes default to the
/// unescaped text value; kinds with a richer representation override the
/// `encode_*`/`parse_*` hooks. Callers use the `write_*` methods, which
/// reject properties of another kind.
pub trait Scribe: Send + Sync + fmt::Debug {
    fn kind(&self) -> PropertyKind;

    /// Uppercase property name.
    fn property_name(&self) -> &str;

    /// xCard element local name.
    fn xml_name(&self) -> String {
        self.property_name().to_ascii_lowercase()
    }

    /// hCard class name.
    fn html_class(&self) -> String {
        self.kind().html_class()
    }

    /// Data type of the value absent a `VALUE` parameter.
    fn default_data_type(&self, version: VCardVersion) -> Option<VCardDataType>;

    /// Data type of this particular value.
    fn data_type(&self, _property: &VCardProperty, version: VCardVersion) -> Option<VCardDataType> {
        self.default_data_type(version)
    }

    /// The `VALUE` parameter to write, if any.
    ///
    /// Written only when the value's data type differs from the default and
    /// exists in `version`. Date, date-time and time values are implied by a
    /// `date-and-or-time` default.
    fn value_parameter(
        &self,
        property: &VCardProperty,
        version: VCardVersion,
    ) -> Option<VCardDataType> {
        let data_type = self.data_type(property, version)?;
        let default = self.default_data_type(version);
        if default.as_ref() == Some(&data_type)
            || !data_type.supported_versions().contains(&version)
        {
            return None;
        }
        let implied = default == Some(VCardDataType::DateAndOrTime)
            && matches!(
                data_type,
                VCardDataType::Date | VCardDataType::DateTime | VCardDataType::Time
            );
        (!implied).then_some(data_type)
    }

    /// A copy of the property's parameters adjusted for `version`.
    fn prepare_parameters(
        &self,
        property: &VCardProperty,
        version: VCardVersion,
        card: &VCard,
    ) -> VCardParameters {
        let mut parameters = property.parameters.clone();
        self.adjust_parameters(property, version, card, &mut parameters);
        parameters
    }

    /// Kind-specific parameter adjustments applied by
    /// [`prepare_parameters`](Self::prepare_parameters).
    fn adjust_parameters(
        &self,
        _property: &VCardProperty,
        _version: VCardVersion,
        _card: &VCard,
        _parameters: &mut VCardParameters,
    ) {
    }

    /// ## Errors
    /// Returns [`VCardError::TypeMismatch`] for a property of another kind.
    fn check_kind(&self, property: &VCardProperty) -> VCardResult<()> {
        if property.kind() == self.kind() {
            Ok(())
        } else {
            Err(VCardError::TypeMismatch {
                expected: self.kind(),
                found: property.kind(),
            })
        }
    }

    /// ## Errors
    /// Returns [`VCardError::TypeMismatch`] for a property of another kind.
    fn write_text(
        &self,
        property: &VCardProperty,
        version: VCardVersion,
    ) -> VCardResult<WriteOutcome<String>> {
        self.check_kind(property)?;
        self.encode_text(property, version)
    }

    /// ## Errors
    /// Returns [`VCardError::TypeMismatch`] for a property of another kind.
    fn write_xml(
        &self,
        property: &VCardProperty,
        version: VCardVersion,
    ) -> VCardResult<WriteOutcome<XmlElement>> {
        self.check_kind(property)?;
        self.encode_xml(property, version)
    }

    /// ## Errors
    /// Returns [`VCardError::TypeMismatch`] for a property of another kind.
    fn write_json(
        &self,
        property: &VCardProperty,
        version: VCardVersion,
    ) -> VCardResult<WriteOutcome<JCardValue>> {
        self.check_kind(property)?;
        self.encode_json(property, version)
    }

    /// ## Errors
    /// Returns [`VCardError::TypeMismatch`] for a property of another kind.
    fn write_html(
        &self,
        property: &VCardProperty,
        version: VCardVersion,
    ) -> VCardResult<WriteOutcome<HtmlElement>> {
        self.check_kind(property)?;
        self.encode_html(property, version)
    }

    /// The value in text syntax, escaped for `version`.
    ///
    /// ## Errors
    /// Returns [`VCardError::InvalidValue`] for a value this scribe cannot
    /// represent at all.
    fn encode_text(
        &self,
        property: &VCardProperty,
        version: VCardVersion,
    ) -> VCardResult<WriteOutcome<String>>;

    /// The value as plain text, used by the tree syntaxes.
    ///
    /// ## Errors
    /// As [`encode_text`](Self::encode_text).
    fn encode_plain(
        &self,
        property: &VCardProperty,
        version: VCardVersion,
    ) -> VCardResult<WriteOutcome<String>> {
        Ok(self
            .encode_text(property, version)?
            .map(|text| unescape_text(&text)))
    }

    /// ## Errors
    /// As [`encode_text`](Self::encode_text).
    fn encode_xml(
        &self,
        property: &VCardProperty,
        version: VCardVersion,
    ) -> VCardResult<WriteOutcome<XmlElement>> {
        let data_type = self.data_type(property, version);
        Ok(self.encode_plain(property, version)?.map(|value| {
            let mut element = XmlElement::new(self.xml_name());
            element.append_typed(data_type.as_ref(), value);
            element
        }))
    }

    /// ## Errors
    /// As [`encode_text`](Self::encode_text).
    fn encode_json(
        &self,
        property: &VCardProperty,
        version: VCardVersion,
    ) -> VCardResult<WriteOutcome<JCardValue>> {
        Ok(self
            .encode_plain(property, version)?
            .map(JCardValue::single))
    }

    /// ## Errors
    /// As [`encode_text`](Self::encode_text).
    fn encode_html(
        &self,
        property: &VCardProperty,
        version: VCardVersion,
    ) -> VCardResult<WriteOutcome<HtmlElement>> {
        Ok(self.encode_plain(property, version)?.map(|value| {
            let mut element = HtmlElement::new("div", &self.html_class());
            element.push_multiline(&value);
            element
        }))
    }

    /// Parses a text-syntax value (still escaped).
    ///
    /// `data_type` is the declared `VALUE`, already removed from
    /// `parameters`.
    fn parse_text(
        &self,
        value: &str,
        data_type: Option<&VCardDataType>,
        parameters: VCardParameters,
        ctx: &mut ParseContext,
    ) -> ParseOutcome;

    /// Parses an unescaped value taken from a tree syntax.
    fn parse_plain(
        &self,
        value: &str,
        data_type: Option<&VCardDataType>,
        parameters: VCardParameters,
        ctx: &mut ParseContext,
    ) -> ParseOutcome {
        let escaped = escape_text(value, ctx.version);
        self.parse_text(&escaped, data_type, parameters, ctx)
    }

    fn parse_xml(
        &self,
        element: &XmlElement,
        parameters: VCardParameters,
        ctx: &mut ParseContext,
    ) -> ParseOutcome {
        match element.first_typed_value() {
            Some((data_type, value)) => {
                self.parse_plain(&value, data_type.as_ref(), parameters, ctx)
            }
            None => {
                let text = element.element().text();
                self.parse_plain(text.trim(), None, parameters, ctx)
            }
        }
    }

    fn parse_json(
        &self,
        value: &JCardValue,
        data_type: Option<&VCardDataType>,
        parameters: VCardParameters,
        ctx: &mut ParseContext,
    ) -> ParseOutcome {
        self.parse_plain(&value.as_single(), data_type, parameters, ctx)
    }

    fn parse_html(
        &self,
        element: &HtmlElement,
        parameters: VCardParameters,
        ctx: &mut ParseContext,
    ) -> ParseOutcome {
        self.parse_plain(&element.value(), None, parameters, ctx)
    }
}

/// A scribe for every standard property kind.
#[must_use]
pub fn standard_scribes() -> Vec<Arc<dyn Scribe>> {
    use PropertyKind as K;
    let mut scribes: Vec<Arc<dyn Scribe>> = vec![
        Arc::new(StructuredNameScribe),
        Arc::new(AddressScribe),
        Arc::new(OrganizationScribe),
        Arc::new(GenderScribe),
        Arc::new(TelephoneScribe),
        Arc::new(TimestampScribe),
        Arc::new(RelatedScribe),
        Arc::new(AgentScribe),
        Arc::new(GeoScribe),
        Arc::new(TimezoneScribe),
    ];
    for kind in [
        K::FormattedName,
        K::Label,
        K::Email,
        K::Mailer,
        K::Title,
        K::Role,
        K::Kind,
        K::Note,
        K::ProductId,
        K::Uid,
        K::Language,
        K::SortString,
        K::Classification,
        K::Url,
        K::Source,
        K::Member,
        K::FreeBusyUrl,
        K::CalendarUri,
        K::CalendarAddressUri,
    ] {
        scribes.push(Arc::new(TextScribe::new(kind)));
    }
    for kind in [K::Nickname, K::Categories] {
        scribes.push(Arc::new(ListScribe::new(kind)));
    }
    for kind in [K::Birthday, K::Anniversary, K::Deathdate] {
        scribes.push(Arc::new(DateOrTimeScribe::new(kind)));
    }
    for kind in [K::Photo, K::Logo, K::Sound, K::Key] {
        scribes.push(Arc::new(MediaScribe::new(kind)));
    }
    scribes
}
