//! Scribe lookup by property name, xCard element name, hCard class and kind.
//!
//! Every reader and writer owns a registry. It starts with a scribe for each
//! standard kind; registering another scribe for the same name or kind
//! shadows the default for that registry only. Names with no scribe resolve
//! to a [`RawScribe`] that keeps the wire value verbatim.

use std::collections::HashMap;
use std::sync::Arc;

use crate::core::{PropertyKind, VCardProperty};
use crate::scribe::{RawScribe, Scribe, standard_scribes};

/// Prefix that marks a property name as a private extension.
pub const EXTENSION_PREFIX: &str = "X-";

/// How a name was resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LookupStatus {
    /// A registered scribe matched.
    Registered,
    /// No scribe matched an `X-` name; the raw fallback is used.
    Extension,
    /// No scribe matched a name that is not an extension name; the raw
    /// fallback is used and readers record a warning.
    Unrecognized,
}

/// A resolved scribe together with how it was found.
#[derive(Debug, Clone)]
pub struct ScribeLookup {
    pub scribe: Arc<dyn Scribe>,
    pub status: LookupStatus,
}

impl ScribeLookup {
    #[must_use]
    pub fn is_fallback(&self) -> bool {
        self.status != LookupStatus::Registered
    }
}

/// Returns whether `name` carries the extension prefix.
#[must_use]
pub fn is_extension_name(name: &str) -> bool {
    name.get(..EXTENSION_PREFIX.len())
        .is_some_and(|prefix| prefix.eq_ignore_ascii_case(EXTENSION_PREFIX))
}

#[derive(Debug, Clone)]
pub struct ScribeRegistry {
    by_name: HashMap<String, Arc<dyn Scribe>>,
    by_xml_name: HashMap<String, Arc<dyn Scribe>>,
    by_html_class: HashMap<String, Arc<dyn Scribe>>,
    by_kind: HashMap<PropertyKind, Arc<dyn Scribe>>,
}

impl Default for ScribeRegistry {
    fn default() -> Self {
        let mut registry = Self::empty();
        for scribe in standard_scribes() {
            registry.register(scribe);
        }
        registry
    }
}

impl ScribeRegistry {
    /// A registry holding the standard scribes.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry with no scribes; every lookup falls back to raw.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            by_name: HashMap::new(),
            by_xml_name: HashMap::new(),
            by_html_class: HashMap::new(),
            by_kind: HashMap::new(),
        }
    }

    /// Registers `scribe`, replacing any scribe with the same name, xCard
    /// name or kind. Extension scribes are only keyed by name.
    pub fn register(&mut self, scribe: Arc<dyn Scribe>) {
        let name = scribe.property_name().to_ascii_uppercase();
        tracing::trace!(name = %name, kind = %scribe.kind(), "registering scribe");
        self.by_xml_name
            .insert(scribe.xml_name().to_ascii_lowercase(), Arc::clone(&scribe));
        self.by_html_class
            .insert(scribe.html_class().to_ascii_lowercase(), Arc::clone(&scribe));
        if scribe.kind() != PropertyKind::Extension {
            self.by_kind.insert(scribe.kind(), Arc::clone(&scribe));
        }
        self.by_name.insert(name, scribe);
    }

    /// Builder-style [`register`](Self::register).
    #[must_use]
    pub fn with_scribe(mut self, scribe: impl Scribe + 'static) -> Self {
        self.register(Arc::new(scribe));
        self
    }

    /// Removes the scribe registered under `name`, if any.
    pub fn unregister(&mut self, name: &str) -> Option<Arc<dyn Scribe>> {
        let scribe = self.by_name.remove(&name.to_ascii_uppercase())?;
        self.by_xml_name
            .retain(|_, s| !Arc::ptr_eq(s, &scribe));
        self.by_html_class
            .retain(|_, s| !Arc::ptr_eq(s, &scribe));
        self.by_kind.retain(|_, s| !Arc::ptr_eq(s, &scribe));
        Some(scribe)
    }

    fn fallback(name: &str) -> ScribeLookup {
        let status = if is_extension_name(name) {
            LookupStatus::Extension
        } else {
            LookupStatus::Unrecognized
        };
        ScribeLookup {
            scribe: Arc::new(RawScribe::new(name)),
            status,
        }
    }

    fn found(scribe: &Arc<dyn Scribe>) -> ScribeLookup {
        ScribeLookup {
            scribe: Arc::clone(scribe),
            status: LookupStatus::Registered,
        }
    }

    /// Looks up a text-syntax or jCard property name (case-insensitive).
    #[must_use]
    pub fn lookup(&self, name: &str) -> ScribeLookup {
        self.by_name
            .get(&name.to_ascii_uppercase())
            .map_or_else(|| Self::fallback(name), Self::found)
    }

    /// Looks up an xCard element by local name.
    #[must_use]
    pub fn lookup_xml(&self, local_name: &str) -> ScribeLookup {
        self.by_xml_name
            .get(&local_name.to_ascii_lowercase())
            .map_or_else(|| Self::fallback(local_name), Self::found)
    }

    /// Looks up the scribe for an hCard class name.
    #[must_use]
    pub fn lookup_html_class(&self, class: &str) -> Option<Arc<dyn Scribe>> {
        self.by_html_class.get(&class.to_ascii_lowercase()).cloned()
    }

    #[must_use]
    pub fn lookup_kind(&self, kind: PropertyKind) -> Option<Arc<dyn Scribe>> {
        self.by_kind.get(&kind).cloned()
    }

    /// The scribe that writes `property`.
    ///
    /// Standard kinds resolve by kind. Extension properties resolve by name
    /// to a registered extension scribe, otherwise to the raw fallback; a raw
    /// property that reuses a standard name therefore stays raw.
    #[must_use]
    pub fn scribe_for(&self, property: &VCardProperty) -> Arc<dyn Scribe> {
        if property.kind() != PropertyKind::Extension
            && let Some(scribe) = self.by_kind.get(&property.kind())
        {
            return Arc::clone(scribe);
        }
        match self.by_name.get(property.name()) {
            Some(scribe) if scribe.kind() == property.kind() => Arc::clone(scribe),
            _ => Arc::new(RawScribe::new(property.name())),
        }
    }

    /// Names of every registered scribe, sorted.
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.by_name.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}
