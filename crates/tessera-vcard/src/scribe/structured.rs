//! Cursor and builder for semicolon-structured values.

use crate::codec::escape::{parse_structured, write_structured};
use crate::core::VCardVersion;

/// Yields the components of a structured value one at a time.
///
/// A short value is not an error: components past the end read as absent.
#[derive(Debug, Clone)]
pub struct StructuredIterator {
    components: std::vec::IntoIter<Vec<String>>,
}

impl StructuredIterator {
    /// Splits a text-syntax value on unescaped `;`, then each component on
    /// unescaped `,`, unescaping the results.
    #[must_use]
    pub fn parse(value: &str) -> Self {
        Self::from_components(parse_structured(value))
    }

    /// Wraps components that are already split (xCard, jCard).
    #[must_use]
    pub fn from_components(components: Vec<Vec<String>>) -> Self {
        Self {
            components: components.into_iter(),
        }
    }

    /// The first value of the next component; `None` if absent or empty.
    pub fn next_value(&mut self) -> Option<String> {
        self.components
            .next()
            .and_then(|c| c.into_iter().find(|v| !v.is_empty()))
    }

    /// All values of the next component; empty if absent.
    pub fn next_values(&mut self) -> Vec<String> {
        self.components
            .next()
            .map(|c| c.into_iter().filter(|v| !v.is_empty()).collect())
            .unwrap_or_default()
    }

    #[must_use]
    pub fn has_next(&self) -> bool {
        self.components.len() > 0
    }

    /// The remaining components, consuming the cursor.
    #[must_use]
    pub fn remaining(self) -> Vec<Vec<String>> {
        self.components.collect()
    }
}

/// Accumulates components for writing a structured value.
#[derive(Debug, Clone, Default)]
pub struct StructuredBuilder {
    components: Vec<Vec<String>>,
}

impl StructuredBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a single-valued component; an empty string is an empty one.
    #[must_use]
    pub fn append(mut self, value: impl Into<String>) -> Self {
        let value = value.into();
        self.components
            .push(if value.is_empty() { Vec::new() } else { vec![value] });
        self
    }

    #[must_use]
    pub fn append_opt(self, value: Option<impl Into<String>>) -> Self {
        match value {
            Some(v) => self.append(v),
            None => self.append(String::new()),
        }
    }

    /// Appends a multi-valued component.
    #[must_use]
    pub fn append_values<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.components
            .push(values.into_iter().map(Into::into).collect());
        self
    }

    /// Joins the components into text syntax for `version`.
    #[must_use]
    pub fn build_text(&self, version: VCardVersion) -> String {
        let slices: Vec<&[String]> = self.components.iter().map(Vec::as_slice).collect();
        write_structured(&slices, version)
    }

    #[must_use]
    pub fn into_components(self) -> Vec<Vec<String>> {
        self.components
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_values_read_as_absent() {
        let mut it = StructuredIterator::parse("Doe;John");
        assert_eq!(it.next_value().as_deref(), Some("Doe"));
        assert_eq!(it.next_value().as_deref(), Some("John"));
        assert!(!it.has_next());
        assert_eq!(it.next_value(), None);
        assert!(it.next_values().is_empty());
    }

    #[test]
    fn components_unescape_and_split_lists() {
        let mut it = StructuredIterator::parse(r"a\;b;c,d;;e\,f");
        assert_eq!(it.next_values(), ["a;b"]);
        assert_eq!(it.next_values(), ["c", "d"]);
        assert_eq!(it.next_value(), None);
        assert_eq!(it.next_values(), ["e,f"]);
    }

    #[test]
    fn builder_escapes_per_component() {
        let text = StructuredBuilder::new()
            .append("")
            .append_values(["a,b", "c"])
            .append("x;y")
            .build_text(VCardVersion::V4_0);
        assert_eq!(text, r";a\,b,c;x\;y");
    }
}
