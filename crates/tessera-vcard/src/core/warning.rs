//! Non-fatal problems recorded while reading or writing a card.

use std::fmt;

use serde::Serialize;

/// A recoverable problem scoped to one property or one card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Warning {
    /// 1-based input line, for the text syntax.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line: Option<usize>,
    /// Name of the property involved, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub property: Option<String>,
    pub message: String,
}

impl Warning {
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            line: None,
            property: None,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn for_property(property: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            line: None,
            property: Some(property.into()),
            message: message.into(),
        }
    }

    #[must_use]
    pub fn at_line(mut self, line: Option<usize>) -> Self {
        self.line = line;
        self
    }
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(line) = self.line {
            write!(f, "line {line}: ")?;
        }
        if let Some(property) = &self.property {
            write!(f, "{property}: ")?;
        }
        f.write_str(&self.message)
    }
}
