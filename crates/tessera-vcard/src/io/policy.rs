//! Version policy applied to every card before a writer emits it.

use std::collections::HashMap;

use tessera_core::config::Settings;

use super::record;
use crate::core::{
    PropertyKind, PropertyValue, VCard, VCardProperty, VCardVersion, Warning, describe_versions,
    param_names,
};

/// Value written to PRODID (X-PRODID in 2.1).
pub const PRODUCT_ID: &str =
    concat!("-//tessera//tessera-vcard ", env!("CARGO_PKG_VERSION"), "//EN");

/// Name of the PRODID stand-in for vCard 2.1.
pub const LEGACY_PRODUCT_ID: &str = "X-PRODID";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WritePolicy {
    /// Append a library identification property to every card.
    pub include_prodid: bool,
}

impl Default for WritePolicy {
    fn default() -> Self {
        Self {
            include_prodid: true,
        }
    }
}

impl WritePolicy {
    #[must_use]
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            include_prodid: settings.output.include_prodid,
        }
    }

    /// The properties of `card` as they should be written in `version`.
    ///
    /// The card itself is left untouched; warnings for dropped properties
    /// are appended to `warnings`.
    #[tracing::instrument(skip(self, card, warnings), fields(properties = card.properties.len()))]
    pub fn prepare(
        &self,
        card: &VCard,
        version: VCardVersion,
        warnings: &mut Vec<Warning>,
    ) -> Vec<VCardProperty> {
        let mut properties = card.properties.clone();
        if self.include_prodid {
            identify(&mut properties, version);
        }
        drop_unsupported(&mut properties, version, warnings);
        if version < VCardVersion::V4_0 {
            desugar_labels(&mut properties);
        }
        enforce_membership(&mut properties, warnings);
        if version == VCardVersion::V4_0 {
            promote_pref(&mut properties);
        } else {
            demote_pref(&mut properties);
        }
        properties
    }
}

fn is_product_id(property: &VCardProperty) -> bool {
    property.kind() == PropertyKind::ProductId
        || property.name().eq_ignore_ascii_case(LEGACY_PRODUCT_ID)
}

fn identify(properties: &mut Vec<VCardProperty>, version: VCardVersion) {
    properties.retain(|p| !is_product_id(p));
    let prodid = if version == VCardVersion::V2_1 {
        VCardProperty::extension(LEGACY_PRODUCT_ID, PropertyValue::Text(PRODUCT_ID.to_string()))
    } else {
        VCardProperty::text(PropertyKind::ProductId, PRODUCT_ID)
    };
    properties.push(prodid);
}

fn drop_unsupported(
    properties: &mut Vec<VCardProperty>,
    version: VCardVersion,
    warnings: &mut Vec<Warning>,
) {
    properties.retain(|property| {
        if property.is_supported_in(version) {
            return true;
        }
        let supported = describe_versions(property.kind().supported_versions());
        record(
            warnings,
            Warning::for_property(
                property.name(),
                format!("not written to a {version} card; supported in {supported}"),
            ),
        );
        false
    });
}

/// Writes each address label as a sibling LABEL with the address's types.
fn desugar_labels(properties: &mut Vec<VCardProperty>) {
    let mut out = Vec::with_capacity(properties.len());
    for mut property in properties.drain(..) {
        let label = (property.kind() == PropertyKind::Address)
            .then(|| property.parameters.remove_all(param_names::LABEL))
            .and_then(|values| values.into_iter().next());
        let types = property.parameters.types().to_vec();
        let group = property.group.clone();
        out.push(property);
        if let Some(label) = label {
            let mut sibling = VCardProperty::text(PropertyKind::Label, label);
            sibling.group = group;
            sibling.parameters.put_all(param_names::TYPE, types);
            out.push(sibling);
        }
    }
    *properties = out;
}

fn enforce_membership(properties: &mut Vec<VCardProperty>, warnings: &mut Vec<Warning>) {
    let has_members = properties.iter().any(|p| p.kind() == PropertyKind::Member);
    if !has_members {
        return;
    }
    let is_group = properties.iter().any(|p| {
        p.kind() == PropertyKind::Kind
            && p.value().as_text().is_some_and(|k| k.eq_ignore_ascii_case("group"))
    });
    if is_group {
        return;
    }
    properties.retain(|p| p.kind() != PropertyKind::Member);
    record(
        warnings,
        Warning::for_property(
            PropertyKind::Member.name(),
            "MEMBER requires KIND:group; members dropped",
        ),
    );
}

fn promote_pref(properties: &mut [VCardProperty]) {
    for property in properties {
        if property.parameters.remove(param_names::TYPE, "pref")
            && !property.parameters.contains(param_names::PREF)
        {
            property.parameters.set_pref(1);
        }
    }
}

fn demote_pref(properties: &mut [VCardProperty]) {
    let mut preferred: HashMap<String, (usize, u32)> = HashMap::new();
    for (index, property) in properties.iter().enumerate() {
        let Some(pref) = property.parameters.pref() else {
            continue;
        };
        preferred
            .entry(property.name().to_string())
            .and_modify(|best| {
                if pref < best.1 {
                    *best = (index, pref);
                }
            })
            .or_insert((index, pref));
    }
    for (index, property) in properties.iter_mut().enumerate() {
        property.parameters.remove_all(param_names::PREF);
        let chosen = preferred
            .get(property.name())
            .is_some_and(|(best, _)| *best == index);
        if chosen && !property.parameters.has_type("pref") {
            property.parameters.add_type("pref");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Address;

    fn prepare(card: &VCard, version: VCardVersion) -> (Vec<VCardProperty>, Vec<Warning>) {
        let mut warnings = Vec::new();
        let policy = WritePolicy {
            include_prodid: false,
        };
        let properties = policy.prepare(card, version, &mut warnings);
        (properties, warnings)
    }

    #[test]
    fn unsupported_kinds_are_dropped_with_warning() {
        let mut card = VCard::new();
        card.add_property(VCardProperty::text(PropertyKind::Mailer, "mutt"));
        card.add_property(VCardProperty::text(PropertyKind::FormattedName, "Jane"));

        let (properties, warnings) = prepare(&card, VCardVersion::V4_0);
        assert_eq!(properties.len(), 1);
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].message.contains("supported in 2.1, 3.0"));
    }

    #[test]
    fn member_without_group_kind_is_dropped_once() {
        let mut card = VCard::new();
        card.add_property(VCardProperty::uri(PropertyKind::Member, "urn:uuid:a"));
        card.add_property(VCardProperty::uri(PropertyKind::Member, "urn:uuid:b"));

        let (properties, warnings) = prepare(&card, VCardVersion::V4_0);
        assert!(properties.is_empty());
        assert_eq!(warnings.len(), 1);

        card.add_property(VCardProperty::text(PropertyKind::Kind, "group"));
        let (properties, warnings) = prepare(&card, VCardVersion::V4_0);
        assert_eq!(properties.len(), 3);
        assert!(warnings.is_empty());
    }

    #[test]
    fn address_label_becomes_sibling_before_4_0() {
        let mut card = VCard::with_version(VCardVersion::V3_0);
        let adr = VCardProperty::new(PropertyKind::Address, PropertyValue::Address(Address::new()))
            .unwrap()
            .with_param(param_names::TYPE, "home")
            .with_param(param_names::LABEL, "123 Main St.\nAustin");
        card.add_property(adr);

        let (properties, _) = prepare(&card, VCardVersion::V3_0);
        assert_eq!(properties.len(), 2);
        assert!(properties[0].parameters.label().is_none());
        assert_eq!(properties[1].kind(), PropertyKind::Label);
        assert_eq!(properties[1].value().as_text(), Some("123 Main St.\nAustin"));
        assert_eq!(properties[1].parameters.types(), ["home"]);

        let (properties, _) = prepare(&card, VCardVersion::V4_0);
        assert_eq!(properties.len(), 1);
        assert!(properties[0].parameters.label().is_some());
    }

    #[test]
    fn pref_is_promoted_and_demoted() {
        let mut card = VCard::new();
        card.add_property(
            VCardProperty::text(PropertyKind::Email, "a@example.com").with_param("TYPE", "PREF"),
        );
        let (properties, _) = prepare(&card, VCardVersion::V4_0);
        assert_eq!(properties[0].parameters.pref(), Some(1));
        assert!(properties[0].parameters.types().is_empty());

        let mut card = VCard::new();
        for (address, pref) in [("a@example.com", "2"), ("b@example.com", "1")] {
            card.add_property(
                VCardProperty::text(PropertyKind::Email, address).with_param("PREF", pref),
            );
        }
        let (properties, _) = prepare(&card, VCardVersion::V3_0);
        assert!(!properties[0].parameters.has_type("pref"));
        assert!(properties[1].parameters.has_type("pref"));
        assert!(properties.iter().all(|p| p.parameters.pref().is_none()));
    }

    #[test]
    fn product_id_replaces_existing() {
        let mut card = VCard::new();
        card.add_property(VCardProperty::text(PropertyKind::ProductId, "-//other//EN"));
        let policy = WritePolicy::default();
        let mut warnings = Vec::new();

        let properties = policy.prepare(&card, VCardVersion::V4_0, &mut warnings);
        assert_eq!(properties.len(), 1);
        assert_eq!(properties[0].value().as_text(), Some(PRODUCT_ID));

        let properties = policy.prepare(&card, VCardVersion::V2_1, &mut warnings);
        assert_eq!(properties.len(), 1);
        assert_eq!(properties[0].name(), LEGACY_PRODUCT_ID);
        assert!(warnings.is_empty());
    }
}
