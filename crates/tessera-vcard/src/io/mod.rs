//! Document readers and writers for the four syntaxes.
//!
//! Each reader produces one [`VCard`] per call and each writer consumes one;
//! both own a [`ScribeRegistry`] the caller may extend between calls.
//! Per-property problems never fail a read or write: they are collected as
//! [`Warning`]s for the card just processed.
//!
//! | Syntax | Reader | Writer | Versions |
//! |--------|--------|--------|----------|
//! | text | [`TextReader`] | [`TextWriter`] | 2.1, 3.0, 4.0 |
//! | xCard | [`XmlReader`] | [`XmlWriter`] | 4.0 |
//! | jCard | [`JsonReader`] | [`JsonWriter`] | 4.0 |
//! | hCard | [`HtmlReader`] | [`HtmlWriter`] | 3.0 rules |

pub mod html;
pub mod json;
pub mod policy;
pub mod text;
mod tree;
pub mod xml;

use std::sync::Arc;

pub use html::{HtmlReader, HtmlWriter};
pub use json::{JsonReader, JsonWriter};
pub use text::{TextOptions, TextReader, TextWriter};
pub use xml::{XmlReader, XmlWriter};

use crate::core::{VCard, Warning};
use crate::error::VCardResult;
use crate::registry::ScribeRegistry;
use crate::scribe::Scribe;

/// A card together with the warnings recorded while reading it.
#[derive(Debug, Clone, PartialEq)]
pub struct ReadCard {
    pub card: VCard,
    pub warnings: Vec<Warning>,
}

pub trait CardReader {
    /// Reads the next card, or `None` once the input is exhausted.
    ///
    /// ## Errors
    /// Returns an error if the underlying input fails or is not a document
    /// of this syntax at all. Problems inside a card are warnings.
    fn read_next(&mut self) -> VCardResult<Option<VCard>>;

    /// Warnings recorded while reading the most recent card.
    fn warnings(&self) -> &[Warning];

    fn registry_mut(&mut self) -> &mut ScribeRegistry;

    /// Registers a scribe for subsequent reads, shadowing any default.
    fn register_scribe(&mut self, scribe: Arc<dyn Scribe>) {
        self.registry_mut().register(scribe);
    }

    /// ## Errors
    /// As [`read_next`](Self::read_next).
    fn read_all(&mut self) -> VCardResult<Vec<VCard>> {
        let mut cards = Vec::new();
        while let Some(card) = self.read_next()? {
            cards.push(card);
        }
        Ok(cards)
    }

    /// Reads every card, keeping each card's warnings.
    ///
    /// ## Errors
    /// As [`read_next`](Self::read_next).
    fn read_all_with_warnings(&mut self) -> VCardResult<Vec<ReadCard>> {
        let mut cards = Vec::new();
        while let Some(card) = self.read_next()? {
            cards.push(ReadCard {
                card,
                warnings: self.warnings().to_vec(),
            });
        }
        Ok(cards)
    }
}

pub trait CardWriter {
    /// Writes one card.
    ///
    /// ## Errors
    /// Returns an error if the output fails or a scribe is handed a property
    /// of another kind.
    fn write(&mut self, card: &VCard) -> VCardResult<()>;

    /// Warnings recorded while writing the most recent card.
    fn warnings(&self) -> &[Warning];

    fn registry_mut(&mut self) -> &mut ScribeRegistry;

    /// Registers a scribe for subsequent writes, shadowing any default.
    fn register_scribe(&mut self, scribe: Arc<dyn Scribe>) {
        self.registry_mut().register(scribe);
    }

    /// Completes the document and flushes the output.
    ///
    /// ## Errors
    /// Returns an error if the output fails.
    fn finish(&mut self) -> VCardResult<()>;

    /// ## Errors
    /// As [`write`](Self::write).
    fn write_all<'a, I>(&mut self, cards: I) -> VCardResult<()>
    where
        Self: Sized,
        I: IntoIterator<Item = &'a VCard>,
    {
        for card in cards {
            self.write(card)?;
        }
        Ok(())
    }
}

/// Records a warning and mirrors it to the log.
pub(crate) fn record(warnings: &mut Vec<Warning>, warning: Warning) {
    tracing::warn!(
        line = warning.line,
        property = warning.property.as_deref(),
        "{}",
        warning.message
    );
    warnings.push(warning);
}

#[cfg(test)]
mod tests;
