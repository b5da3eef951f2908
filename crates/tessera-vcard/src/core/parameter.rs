//! vCard parameter set and the catalog of predefined parameter values.

use std::collections::{HashMap, HashSet};

use super::data_type::VCardDataType;

/// Well-known parameter names.
pub mod names {
    pub const ALTID: &str = "ALTID";
    pub const CALSCALE: &str = "CALSCALE";
    pub const CHARSET: &str = "CHARSET";
    pub const ENCODING: &str = "ENCODING";
    pub const GEO: &str = "GEO";
    pub const INDEX: &str = "INDEX";
    pub const LABEL: &str = "LABEL";
    pub const LANGUAGE: &str = "LANGUAGE";
    pub const LEVEL: &str = "LEVEL";
    pub const MEDIATYPE: &str = "MEDIATYPE";
    pub const PID: &str = "PID";
    pub const PREF: &str = "PREF";
    pub const SORT_AS: &str = "SORT-AS";
    pub const TYPE: &str = "TYPE";
    pub const TZ: &str = "TZ";
    pub const VALUE: &str = "VALUE";
}

/// Values of the `ENCODING` parameter.
pub mod encodings {
    pub const QUOTED_PRINTABLE: &str = "QUOTED-PRINTABLE";
    pub const BASE64: &str = "BASE64";
    pub const B: &str = "b";
    pub const SEVEN_BIT: &str = "7BIT";
    pub const EIGHT_BIT: &str = "8BIT";

    pub const ALL: [&str; 5] = [QUOTED_PRINTABLE, BASE64, B, SEVEN_BIT, EIGHT_BIT];

    /// Whether the encoding denotes base64 data (`b` or `BASE64`).
    #[must_use]
    pub fn is_base64(value: &str) -> bool {
        value.eq_ignore_ascii_case(B) || value.eq_ignore_ascii_case(BASE64)
    }
}

/// A case-insensitive, insertion-ordered multi-map of parameters.
///
/// Names are normalized to uppercase on insertion. Values keep their case and
/// order. Equality ignores the order of parameter *names* but not the order of
/// each name's values.
#[derive(Debug, Clone, Default)]
pub struct VCardParameters {
    entries: Vec<(String, Vec<String>)>,
}

fn normalize(name: &str) -> String {
    name.trim().to_ascii_uppercase()
}

impl VCardParameters {
    /// Creates an empty parameter set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn entry_mut(&mut self, name: &str) -> &mut Vec<String> {
        let name = normalize(name);
        let index = match self.entries.iter().position(|(n, _)| *n == name) {
            Some(i) => i,
            None => {
                self.entries.push((name, Vec::new()));
                self.entries.len() - 1
            }
        };
        &mut self.entries[index].1
    }

    fn entry(&self, name: &str) -> Option<&Vec<String>> {
        self.entries
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name.trim()))
            .map(|(_, v)| v)
    }

    /// Appends a value to a parameter.
    pub fn put(&mut self, name: &str, value: impl Into<String>) {
        self.entry_mut(name).push(value.into());
    }

    /// Appends several values to a parameter.
    pub fn put_all<I, S>(&mut self, name: &str, values: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let entry = self.entry_mut(name);
        entry.extend(values.into_iter().map(Into::into));
    }

    /// Replaces all values of a parameter with a single value.
    pub fn replace(&mut self, name: &str, value: impl Into<String>) {
        let entry = self.entry_mut(name);
        entry.clear();
        entry.push(value.into());
    }

    /// Returns the first value of a parameter.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.entry(name)?.first().map(String::as_str)
    }

    /// Returns all values of a parameter (empty if absent).
    #[must_use]
    pub fn get_all(&self, name: &str) -> &[String] {
        self.entry(name).map_or(&[], Vec::as_slice)
    }

    /// Whether the parameter is present.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.entry(name).is_some()
    }

    /// Removes a parameter, returning its values.
    pub fn remove_all(&mut self, name: &str) -> Vec<String> {
        let name = normalize(name);
        match self.entries.iter().position(|(n, _)| *n == name) {
            Some(i) => self.entries.remove(i).1,
            None => Vec::new(),
        }
    }

    /// Removes one value (case-insensitive) from a parameter.
    ///
    /// The parameter itself disappears once its last value is removed.
    pub fn remove(&mut self, name: &str, value: &str) -> bool {
        let name = normalize(name);
        let Some(index) = self.entries.iter().position(|(n, _)| *n == name) else {
            return false;
        };
        let values = &mut self.entries[index].1;
        let before = values.len();
        values.retain(|v| !v.eq_ignore_ascii_case(value));
        let removed = values.len() != before;
        if values.is_empty() {
            self.entries.remove(index);
        }
        removed
    }

    /// Iterates over `(name, values)` in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.entries.iter().map(|(n, v)| (n.as_str(), v.as_slice()))
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of distinct parameter names.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    // --- Typed accessors ---

    /// Returns the TYPE values.
    #[must_use]
    pub fn types(&self) -> &[String] {
        self.get_all(names::TYPE)
    }

    /// Adds a TYPE value.
    pub fn add_type(&mut self, value: impl Into<String>) {
        self.put(names::TYPE, value);
    }

    /// Whether a TYPE value is present (case-insensitive).
    #[must_use]
    pub fn has_type(&self, value: &str) -> bool {
        self.types().iter().any(|t| t.eq_ignore_ascii_case(value))
    }

    /// Returns the PREF value if present and numeric.
    #[must_use]
    pub fn pref(&self) -> Option<u32> {
        self.get(names::PREF)?.trim().parse().ok()
    }

    pub fn set_pref(&mut self, pref: u32) {
        self.replace(names::PREF, pref.to_string());
    }

    /// Returns the VALUE parameter as a data type.
    #[must_use]
    pub fn value_type(&self) -> Option<VCardDataType> {
        self.get(names::VALUE).map(VCardDataType::get)
    }

    pub fn set_value_type(&mut self, data_type: &VCardDataType) {
        self.replace(names::VALUE, data_type.name());
    }

    #[must_use]
    pub fn encoding(&self) -> Option<&str> {
        self.get(names::ENCODING)
    }

    #[must_use]
    pub fn charset(&self) -> Option<&str> {
        self.get(names::CHARSET)
    }

    /// Whether the value is declared quoted-printable.
    #[must_use]
    pub fn is_quoted_printable(&self) -> bool {
        self.encoding()
            .is_some_and(|e| e.eq_ignore_ascii_case(encodings::QUOTED_PRINTABLE))
    }

    #[must_use]
    pub fn label(&self) -> Option<&str> {
        self.get(names::LABEL)
    }

    #[must_use]
    pub fn media_type(&self) -> Option<&str> {
        self.get(names::MEDIATYPE)
    }

    #[must_use]
    pub fn language(&self) -> Option<&str> {
        self.get(names::LANGUAGE)
    }

    #[must_use]
    pub fn altid(&self) -> Option<&str> {
        self.get(names::ALTID)
    }
}

impl PartialEq for VCardParameters {
    fn eq(&self, other: &Self) -> bool {
        self.entries.len() == other.entries.len()
            && self
                .entries
                .iter()
                .all(|(name, values)| other.entry(name) == Some(values))
    }
}

impl Eq for VCardParameters {}

impl<'a> IntoIterator for &'a VCardParameters {
    type Item = (&'a str, &'a [String]);
    type IntoIter = Box<dyn Iterator<Item = Self::Item> + 'a>;

    fn into_iter(self) -> Self::IntoIter {
        Box::new(self.iter())
    }
}

/// Predefined parameter values and xCard parameter data types.
///
/// Built once by each reader or writer and passed explicitly to the code that
/// needs it.
#[derive(Debug, Clone)]
pub struct ParameterCatalog {
    known_types: HashSet<String>,
    known_encodings: HashSet<String>,
    xml_types: HashMap<&'static str, VCardDataType>,
}

impl Default for ParameterCatalog {
    fn default() -> Self {
        Self::new()
    }
}

impl ParameterCatalog {
    #[must_use]
    pub fn new() -> Self {
        const TYPES: &[&str] = &[
            // addresses, labels, communication
            "home", "work", "dom", "intl", "postal", "parcel", "pref", "voice", "fax", "msg",
            "cell", "pager", "bbs", "modem", "car", "isdn", "video", "pcs", "text", "textphone",
            "internet", "x400", "aol", "applelink", "attmail", "cis", "eworld", "ibmmail",
            "mcimail", "powershare", "prodigy", "tlx",
            // media formats
            "gif", "cgm", "wmf", "bmp", "met", "pmb", "dib", "pict", "tiff", "pdf", "ps", "jpeg",
            "qtime", "mpeg", "mpeg2", "avi", "wave", "aiff", "pcm", "x509", "pgp",
        ];

        let xml_types = HashMap::from([
            (names::ALTID, VCardDataType::Text),
            (names::CALSCALE, VCardDataType::Text),
            (names::GEO, VCardDataType::Uri),
            (names::INDEX, VCardDataType::Integer),
            (names::LABEL, VCardDataType::Text),
            (names::LANGUAGE, VCardDataType::LanguageTag),
            (names::LEVEL, VCardDataType::Text),
            (names::MEDIATYPE, VCardDataType::Text),
            (names::PID, VCardDataType::Text),
            (names::PREF, VCardDataType::Integer),
            (names::SORT_AS, VCardDataType::Text),
            (names::TYPE, VCardDataType::Text),
            (names::TZ, VCardDataType::Uri),
        ]);

        Self {
            known_types: TYPES.iter().map(|t| (*t).to_string()).collect(),
            known_encodings: encodings::ALL.iter().map(|e| e.to_ascii_lowercase()).collect(),
            xml_types,
        }
    }

    /// Infers the name of a positional (nameless) 2.1 parameter from its value.
    ///
    /// A registered data type wins over an encoding, and anything else is a
    /// TYPE value.
    #[must_use]
    pub fn infer_name(&self, value: &str) -> &'static str {
        if VCardDataType::is_known(value) {
            names::VALUE
        } else if self.known_encodings.contains(&value.to_ascii_lowercase()) {
            names::ENCODING
        } else {
            names::TYPE
        }
    }

    /// Whether `value` is one of the predefined TYPE values.
    #[must_use]
    pub fn is_known_type(&self, value: &str) -> bool {
        self.known_types.contains(&value.to_ascii_lowercase())
    }

    /// The xCard data-type element used for a parameter's values.
    ///
    /// Unregistered parameters have no data type and are written with the
    /// `unknown` element.
    #[must_use]
    pub fn xml_data_type(&self, name: &str) -> Option<&VCardDataType> {
        self.xml_types.get(normalize(name).as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_are_case_insensitive() {
        let mut params = VCardParameters::new();
        params.put("type", "home");
        params.put("Type", "work");
        assert_eq!(params.len(), 1);
        assert_eq!(params.get_all("TYPE"), ["home", "work"]);
        assert_eq!(params.iter().next().map(|(n, _)| n), Some("TYPE"));
    }

    #[test]
    fn values_keep_case_and_order() {
        let mut params = VCardParameters::new();
        params.put("LANGUAGE", "en-US");
        params.put("TYPE", "Work");
        params.put("TYPE", "HOME");
        assert_eq!(params.types(), ["Work", "HOME"]);
        assert!(params.has_type("home"));
        assert_eq!(params.language(), Some("en-US"));
    }

    #[test]
    fn remove_value_drops_empty_parameter() {
        let mut params = VCardParameters::new();
        params.add_type("pref");
        assert!(params.remove("type", "PREF"));
        assert!(params.is_empty());
        assert!(!params.remove("type", "pref"));
    }

    #[test]
    fn equality_ignores_name_order() {
        let mut a = VCardParameters::new();
        a.put("TYPE", "home");
        a.put("PREF", "1");
        let mut b = VCardParameters::new();
        b.put("pref", "1");
        b.put("type", "home");
        assert_eq!(a, b);

        b.put("TYPE", "work");
        assert_ne!(a, b);
    }

    #[test]
    fn pref_parses_number() {
        let mut params = VCardParameters::new();
        params.set_pref(3);
        assert_eq!(params.pref(), Some(3));
        params.replace("PREF", "high");
        assert_eq!(params.pref(), None);
    }

    #[test]
    fn quoted_printable_detection() {
        let mut params = VCardParameters::new();
        params.put("ENCODING", "quoted-printable");
        assert!(params.is_quoted_printable());
    }

    #[test]
    fn positional_inference_precedence() {
        let catalog = ParameterCatalog::new();
        assert_eq!(catalog.infer_name("URL"), names::VALUE);
        assert_eq!(catalog.infer_name("BASE64"), names::ENCODING);
        assert_eq!(catalog.infer_name("quoted-printable"), names::ENCODING);
        assert_eq!(catalog.infer_name("HOME"), names::TYPE);
        assert_eq!(catalog.infer_name("whatever"), names::TYPE);
        // "text" is both a data type and a TYPE value; the data type wins.
        assert_eq!(catalog.infer_name("TEXT"), names::VALUE);
    }

    #[test]
    fn xml_data_types() {
        let catalog = ParameterCatalog::new();
        assert_eq!(catalog.xml_data_type("pref"), Some(&VCardDataType::Integer));
        assert_eq!(catalog.xml_data_type("X-CUSTOM"), None);
        assert!(catalog.is_known_type("JPEG"));
    }
}
