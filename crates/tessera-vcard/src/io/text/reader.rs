//! Text syntax reader.

use std::io::BufRead;

use tessera_core::config::Settings;

use super::lexer::{ContentLine, RawParameter, parse_content_line};
use crate::codec::quoted_printable::{self, Charset};
use crate::codec::{LineUnfolder, LogicalLine};
use crate::core::{
    Agent, ParameterCatalog, PropertyKind, PropertyValue, RawValue, VCard, VCardDataType,
    VCardParameters, VCardProperty, VCardVersion, Warning, param_names,
};
use crate::error::VCardResult;
use crate::io::{CardReader, record};
use crate::registry::{LookupStatus, ScribeRegistry};
use crate::scribe::{NestedCard, ParseContext, ParseOutcome};

/// Deepest chain of embedded AGENT cards read before dropping the rest.
pub const MAX_NESTING: usize = 16;

/// Where the reader is within the current card.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ReaderState {
    NotStarted,
    ReadingHeader,
    ReadingProperties,
    Ended,
    Exhausted,
}

/// Reads cards from a stream of text syntax lines (2.1, 3.0 and 4.0).
///
/// Lines before `BEGIN:VCARD` are skipped. A card without a usable
/// `VERSION` is read as 4.0 with a warning.
#[derive(Debug)]
pub struct TextReader<R> {
    lines: LineUnfolder<R>,
    pushback: Option<LogicalLine>,
    registry: ScribeRegistry,
    catalog: ParameterCatalog,
    default_charset: Charset,
    warnings: Vec<Warning>,
    state: ReaderState,
    /// How many cards enclose the one being read.
    depth: usize,
}

impl<R: BufRead> TextReader<R> {
    #[must_use]
    pub fn new(reader: R) -> Self {
        Self {
            lines: LineUnfolder::new(reader),
            pushback: None,
            registry: ScribeRegistry::default(),
            catalog: ParameterCatalog::new(),
            default_charset: Charset::Utf8,
            warnings: Vec::new(),
            state: ReaderState::NotStarted,
            depth: 0,
        }
    }

    #[must_use]
    pub fn from_settings(reader: R, settings: &Settings) -> Self {
        let charset = Charset::from_label(&settings.reader.default_charset).unwrap_or_else(|| {
            tracing::warn!(
                charset = %settings.reader.default_charset,
                "Unknown default charset, using UTF-8"
            );
            Charset::Utf8
        });
        Self::new(reader).with_default_charset(charset)
    }

    #[must_use]
    pub fn with_registry(mut self, registry: ScribeRegistry) -> Self {
        self.registry = registry;
        self
    }

    /// Charset for quoted-printable values without a `CHARSET` parameter.
    #[must_use]
    pub fn with_default_charset(mut self, charset: Charset) -> Self {
        self.default_charset = charset;
        self
    }

    #[must_use]
    pub fn registry(&self) -> &ScribeRegistry {
        &self.registry
    }

    fn next_line(&mut self) -> VCardResult<Option<LogicalLine>> {
        match self.pushback.take() {
            Some(line) => Ok(Some(line)),
            None => self.lines.next_line(),
        }
    }

    fn warn(&mut self, warning: Warning) {
        record(&mut self.warnings, warning);
    }

    /// Skips to the next `BEGIN:VCARD`; returns its line number.
    fn find_begin(&mut self) -> VCardResult<Option<usize>> {
        while let Some(line) = self.next_line()? {
            if is_marker(&line.text, "BEGIN") {
                return Ok(Some(line.number));
            }
            tracing::trace!(line = line.number, "Skipping line outside a card");
        }
        Ok(None)
    }

    /// Consumes a card's lines, nested cards included, without parsing them.
    fn skip_card(&mut self, begin: usize) -> VCardResult<()> {
        let mut open = 1usize;
        while let Some(line) = self.next_line()? {
            if is_marker(&line.text, "BEGIN") {
                open += 1;
            } else if is_marker(&line.text, "END") {
                open -= 1;
                if open == 0 {
                    return Ok(());
                }
            }
        }
        self.warn(Warning::new(format!("card starting at line {begin} has no END:VCARD")));
        Ok(())
    }

    /// Reads the lines of one card after its `BEGIN:VCARD` line.
    fn read_card(&mut self, begin: usize) -> VCardResult<VCard> {
        self.state = ReaderState::ReadingHeader;
        let mut version: Option<VCardVersion> = None;
        let mut card = VCard::new();

        loop {
            let Some(line) = self.next_line()? else {
                self.warn(Warning::new(format!(
                    "card starting at line {begin} has no END:VCARD"
                )));
                break;
            };
            let lexed = match parse_content_line(
                &line.text,
                line.number,
                version.unwrap_or_default(),
            ) {
                Ok(lexed) => lexed,
                Err(err) => {
                    self.warn(
                        Warning::new(format!("skipped malformed line: {}", err.message))
                            .at_line(Some(err.line)),
                    );
                    continue;
                }
            };

            if lexed.is("END", "VCARD") {
                self.state = ReaderState::Ended;
                break;
            }
            if lexed.name == "VERSION" {
                if self.state == ReaderState::ReadingHeader {
                    version = Some(self.parse_version(&lexed.value, line.number));
                    self.state = ReaderState::ReadingProperties;
                } else {
                    self.warn(
                        Warning::for_property("VERSION", "VERSION after other properties ignored")
                            .at_line(Some(line.number)),
                    );
                }
                continue;
            }
            if lexed.is("BEGIN", "VCARD") {
                self.warn(
                    Warning::new("nested card outside an AGENT property skipped")
                        .at_line(Some(line.number)),
                );
                self.skip_card(line.number)?;
                self.state = ReaderState::ReadingProperties;
                continue;
            }
            if version.is_none() {
                self.warn(
                    Warning::new("card has no VERSION; reading as 4.0").at_line(Some(begin)),
                );
                version = Some(VCardVersion::V4_0);
            }
            self.state = ReaderState::ReadingProperties;
            let version = version.unwrap_or_default();
            if let Some(property) = self.read_property(lexed, line.number, version)? {
                card.add_property(property);
            }
        }

        if version.is_none() {
            self.warn(Warning::new("card has no VERSION; reading as 4.0").at_line(Some(begin)));
        }
        card.version = version.unwrap_or_default();
        if card.version < VCardVersion::V4_0 {
            reattach_labels(&mut card);
        }
        tracing::debug!(
            version = %card.version,
            properties = card.properties.len(),
            "Read card"
        );
        Ok(card)
    }

    fn parse_version(&mut self, value: &str, line: usize) -> VCardVersion {
        VCardVersion::parse(value).unwrap_or_else(|| {
            self.warn(
                Warning::for_property(
                    "VERSION",
                    format!("invalid version \"{}\"; reading as 4.0", value.trim()),
                )
                .at_line(Some(line)),
            );
            VCardVersion::V4_0
        })
    }

    fn build_parameters(&self, raw: Vec<RawParameter>) -> VCardParameters {
        let mut parameters = VCardParameters::new();
        for RawParameter { name, values } in raw {
            match name {
                Some(name) => parameters.put_all(&name, values),
                None => {
                    for value in values {
                        parameters.put(self.catalog.infer_name(&value), value);
                    }
                }
            }
        }
        parameters
    }

    /// Decodes a quoted-printable value and drops the parameters describing it.
    ///
    /// Encoded CRLF line breaks come back as `\n`.
    fn decode_value(
        &mut self,
        value: String,
        parameters: &mut VCardParameters,
        name: &str,
        line: usize,
    ) -> String {
        if !parameters.is_quoted_printable() {
            return value;
        }
        parameters.remove_all(param_names::ENCODING);
        let charset = match parameters.remove_all(param_names::CHARSET).first() {
            Some(label) => Charset::from_label(label).unwrap_or_else(|| {
                self.warn(
                    Warning::for_property(
                        name,
                        format!(
                            "unknown charset \"{label}\"; decoding as {}",
                            self.default_charset.label()
                        ),
                    )
                    .at_line(Some(line)),
                );
                self.default_charset
            }),
            None => self.default_charset,
        };
        quoted_printable::decode_with(&value, charset).replace("\r\n", "\n")
    }

    #[tracing::instrument(level = "trace", skip(self, lexed), fields(name = %lexed.name))]
    fn read_property(
        &mut self,
        lexed: ContentLine,
        line: usize,
        version: VCardVersion,
    ) -> VCardResult<Option<VCardProperty>> {
        let ContentLine {
            group,
            name,
            params,
            value,
        } = lexed;
        let mut parameters = self.build_parameters(params);
        let value = self.decode_value(value, &mut parameters, &name, line);
        let data_type = parameters
            .remove_all(param_names::VALUE)
            .first()
            .map(|v| VCardDataType::get(v));

        let lookup = self.registry.lookup(&name);
        if lookup.status == LookupStatus::Unrecognized {
            self.warn(
                Warning::for_property(&name, "unrecognized property; kept as raw text")
                    .at_line(Some(line)),
            );
        }

        let mut ctx = ParseContext::new(version, name.clone()).at_line(line);
        let outcome =
            lookup
                .scribe
                .parse_text(&value, data_type.as_ref(), parameters.clone(), &mut ctx);
        for warning in ctx.take_warnings() {
            self.warn(warning);
        }

        let property = match outcome {
            ParseOutcome::Property(property) => Some(property),
            ParseOutcome::CannotParse { reason, .. } => {
                self.warn(
                    Warning::for_property(&name, format!("{reason}; kept as raw text"))
                        .at_line(Some(line)),
                );
                let raw_value = PropertyValue::Raw(RawValue::typed(value, data_type));
                let mut raw = VCardProperty::extension(&name, raw_value);
                raw.parameters = parameters;
                Some(raw)
            }
            ParseOutcome::EmbeddedCard { property, nested } => {
                self.read_embedded(property, nested, &name, line)?
            }
        };
        Ok(property.map(|mut property| {
            property.group = group;
            property
        }))
    }

    fn read_embedded(
        &mut self,
        mut property: VCardProperty,
        nested: NestedCard,
        name: &str,
        line: usize,
    ) -> VCardResult<Option<VCardProperty>> {
        let too_deep = self.depth >= MAX_NESTING;
        if too_deep {
            self.warn(
                Warning::for_property(
                    name,
                    format!("embedded cards nested deeper than {MAX_NESTING}; property dropped"),
                )
                .at_line(Some(line)),
            );
        }
        let card = match nested {
            NestedCard::Inline => {
                let Some(next) = self.next_line()? else {
                    self.warn(
                        Warning::for_property(name, "embedded card missing at end of input")
                            .at_line(Some(line)),
                    );
                    return Ok(None);
                };
                if !is_marker(&next.text, "BEGIN") {
                    self.warn(
                        Warning::for_property(name, "no embedded card follows; property dropped")
                            .at_line(Some(line)),
                    );
                    self.pushback = Some(next);
                    return Ok(None);
                }
                if too_deep {
                    self.skip_card(next.number)?;
                    return Ok(None);
                }
                let outer = self.state;
                self.depth += 1;
                let card = self.read_card(next.number);
                self.depth -= 1;
                self.state = outer;
                card?
            }
            NestedCard::Text(_) if too_deep => return Ok(None),
            NestedCard::Text(text) => {
                let mut reader =
                    TextReader::new(text.as_bytes()).with_registry(self.registry.clone());
                reader.depth = self.depth + 1;
                let card = reader.read_next()?;
                self.warnings.extend(reader.warnings);
                let Some(card) = card else {
                    self.warn(
                        Warning::for_property(name, "embedded card is empty").at_line(Some(line)),
                    );
                    return Ok(None);
                };
                card
            }
            NestedCard::Html(_) => {
                self.warn(
                    Warning::for_property(name, "embedded hCard in text input ignored")
                        .at_line(Some(line)),
                );
                return Ok(None);
            }
        };
        property.set_value(PropertyValue::Agent(Agent::Card(Box::new(card))))?;
        Ok(Some(property))
    }
}

impl<R: BufRead> CardReader for TextReader<R> {
    #[tracing::instrument(skip(self))]
    fn read_next(&mut self) -> VCardResult<Option<VCard>> {
        self.warnings.clear();
        if self.state == ReaderState::Exhausted {
            return Ok(None);
        }
        let Some(begin) = self.find_begin()? else {
            self.state = ReaderState::Exhausted;
            tracing::debug!(lines = self.lines.physical_lines(), "Input exhausted");
            return Ok(None);
        };
        tracing::debug!(line = begin, "Reading card");
        self.read_card(begin).map(Some)
    }

    fn warnings(&self) -> &[Warning] {
        &self.warnings
    }

    fn registry_mut(&mut self) -> &mut ScribeRegistry {
        &mut self.registry
    }
}

impl<R: BufRead> Iterator for TextReader<R> {
    type Item = VCardResult<VCard>;

    fn next(&mut self) -> Option<Self::Item> {
        self.read_next().transpose()
    }
}

/// Whether `line` is `BEGIN:VCARD` (or `END:VCARD`) in any case.
fn is_marker(line: &str, marker: &str) -> bool {
    line.split_once(':').is_some_and(|(name, value)| {
        name.trim().eq_ignore_ascii_case(marker) && value.trim().eq_ignore_ascii_case("VCARD")
    })
}

fn type_set(parameters: &VCardParameters) -> Vec<String> {
    let mut types: Vec<String> = parameters
        .types()
        .iter()
        .map(|t| t.to_ascii_lowercase())
        .collect();
    types.sort_unstable();
    types.dedup();
    types
}

/// Moves each LABEL into the first unlabeled ADR with the same TYPE set.
fn reattach_labels(card: &mut VCard) {
    let mut index = 0;
    while index < card.properties.len() {
        let label = &card.properties[index];
        if label.kind() != PropertyKind::Label {
            index += 1;
            continue;
        }
        let types = type_set(&label.parameters);
        let target = card.properties.iter().position(|p| {
            p.kind() == PropertyKind::Address
                && !p.parameters.contains(param_names::LABEL)
                && type_set(&p.parameters) == types
        });
        let text = label.value().as_text().map(str::to_string);
        match (target, text) {
            (Some(target), Some(text)) => {
                card.properties[target].parameters.put(param_names::LABEL, text);
                card.properties.remove(index);
            }
            _ => index += 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{DateOrTime, StructuredName, Telephone};

    fn read(input: &str) -> (Vec<VCard>, Vec<Vec<Warning>>) {
        let mut reader = TextReader::new(input.as_bytes());
        let cards = reader.read_all_with_warnings().unwrap();
        cards.into_iter().map(|c| (c.card, c.warnings)).unzip()
    }

    #[test_log::test]
    fn reads_a_3_0_card() {
        let input = "BEGIN:VCARD\r\nVERSION:3.0\r\nN:Doe;Jane;;;\r\nFN:Jane Doe\r\n\
                     item1.TEL;TYPE=work,voice:+1-555-555-1234\r\nEND:VCARD\r\n";
        let (cards, warnings) = read(input);
        assert_eq!(cards.len(), 1);
        assert!(warnings[0].is_empty(), "{:?}", warnings[0]);

        let card = &cards[0];
        assert_eq!(card.version, VCardVersion::V3_0);
        assert_eq!(card.formatted_name(), Some("Jane Doe"));
        assert_eq!(
            card.property(PropertyKind::StructuredName).map(VCardProperty::value),
            Some(&PropertyValue::StructuredName(StructuredName::simple("Doe", "Jane")))
        );
        let tel = card.property(PropertyKind::Telephone).unwrap();
        assert_eq!(tel.group.as_deref(), Some("item1"));
        assert_eq!(tel.parameters.types(), ["work", "voice"]);
        assert!(matches!(tel.value(), PropertyValue::Telephone(Telephone::Text(_))));
    }

    #[test]
    fn missing_version_defaults_to_4_0() {
        let (cards, warnings) = read("BEGIN:VCARD\nFN:A\nEND:VCARD\n");
        assert_eq!(cards[0].version, VCardVersion::V4_0);
        assert_eq!(warnings[0].len(), 1);
        assert!(warnings[0][0].message.contains("no VERSION"));

        let (cards, warnings) = read("BEGIN:VCARD\nVERSION:5.0\nFN:A\nEND:VCARD\n");
        assert_eq!(cards[0].version, VCardVersion::V4_0);
        assert_eq!(warnings[0].len(), 1);
    }

    #[test]
    fn legacy_positional_parameters_and_quoted_printable() {
        let input = "BEGIN:VCARD\r\nVERSION:2.1\r\n\
                     TEL;HOME;VOICE:555-1234\r\n\
                     NOTE;ENCODING=QUOTED-PRINTABLE;CHARSET=ISO-8859-1:caf=E9=0D=0A=\r\n\
                     au lait\r\n\
                     END:VCARD\r\n";
        let (cards, warnings) = read(input);
        assert!(warnings[0].is_empty(), "{:?}", warnings[0]);
        let card = &cards[0];
        let tel = card.property(PropertyKind::Telephone).unwrap();
        assert_eq!(tel.parameters.types(), ["HOME", "VOICE"]);
        let note = card.property(PropertyKind::Note).unwrap();
        assert_eq!(note.value().as_text(), Some("café\nau lait"));
        assert!(note.parameters.is_empty());
    }

    #[test]
    fn unknown_and_unparsable_properties_become_raw() {
        let input = "BEGIN:VCARD\nVERSION:4.0\nX-FOO;A=b:bar\\,baz\nFOO:bar\n\
                     GEO:not a place\nEND:VCARD\n";
        let (cards, warnings) = read(input);
        let card = &cards[0];
        assert_eq!(card.properties.len(), 3);

        let foo = &card.properties[0];
        assert_eq!(foo.name(), "X-FOO");
        assert_eq!(foo.parameters.get("A"), Some("b"));
        assert_eq!(foo.value(), &PropertyValue::Raw(RawValue::new("bar\\,baz")));

        assert_eq!(card.properties[2].name(), "GEO");
        assert_eq!(card.properties[2].kind(), PropertyKind::Extension);

        // FOO and GEO warn; X-FOO does not.
        assert_eq!(warnings[0].len(), 2);
        assert_eq!(warnings[0][0].line, Some(4));
        assert_eq!(warnings[0][1].property.as_deref(), Some("GEO"));
    }

    #[test]
    fn several_cards_and_noise() {
        let input = "garbage\nBEGIN:VCARD\nVERSION:4.0\nFN:A\nEND:VCARD\n\n\
                     begin:vcard\nversion:4.0\nfn:B\nend:vcard\ntrailing\n";
        let mut reader = TextReader::new(input.as_bytes());
        let names: Vec<_> = reader
            .by_ref()
            .map(|card| card.unwrap().formatted_name().map(str::to_string))
            .collect();
        assert_eq!(names, [Some("A".to_string()), Some("B".to_string())]);
        assert!(reader.read_next().unwrap().is_none());
    }

    #[test]
    fn missing_end_is_a_warning() {
        let (cards, warnings) = read("BEGIN:VCARD\nVERSION:3.0\nFN:A\n");
        assert_eq!(cards[0].formatted_name(), Some("A"));
        assert!(warnings[0][0].message.contains("no END:VCARD"));
    }

    #[test]
    fn embedded_agent_cards() {
        let input = "BEGIN:VCARD\r\nVERSION:2.1\r\nFN:Boss\r\nAGENT:\r\n\
                     BEGIN:VCARD\r\nVERSION:2.1\r\nFN:Assistant\r\nEND:VCARD\r\n\
                     NOTE:after\r\nEND:VCARD\r\n";
        let (cards, warnings) = read(input);
        assert!(warnings[0].is_empty(), "{:?}", warnings[0]);
        let card = &cards[0];
        let PropertyValue::Agent(Agent::Card(agent)) =
            card.property(PropertyKind::Agent).unwrap().value()
        else {
            panic!("expected embedded card");
        };
        assert_eq!(agent.formatted_name(), Some("Assistant"));
        assert!(card.property(PropertyKind::Note).is_some());

        let input = "BEGIN:VCARD\nVERSION:3.0\nFN:Boss\n\
                     AGENT:BEGIN:VCARD\\nVERSION:3.0\\nFN:Assistant\\nEND:VCARD\\n\n\
                     END:VCARD\n";
        let (cards, _) = read(input);
        let PropertyValue::Agent(Agent::Card(agent)) =
            cards[0].property(PropertyKind::Agent).unwrap().value()
        else {
            panic!("expected embedded card");
        };
        assert_eq!(agent.formatted_name(), Some("Assistant"));
    }

    #[test]
    fn stray_nested_cards_are_skipped_whole() {
        let mut input = String::from("BEGIN:VCARD\nVERSION:3.0\nFN:Outer\n");
        input.push_str(&"BEGIN:VCARD\n".repeat(100_000));
        input.push_str(&"END:VCARD\n".repeat(100_000));
        input.push_str("NOTE:after\nEND:VCARD\nBEGIN:VCARD\nVERSION:3.0\nFN:Next\nEND:VCARD\n");

        let (cards, warnings) = read(&input);
        assert_eq!(cards.len(), 2);
        assert_eq!(cards[0].formatted_name(), Some("Outer"));
        assert!(cards[0].property(PropertyKind::Note).is_some());
        assert_eq!(warnings[0].len(), 1);
        assert!(warnings[0][0].message.contains("nested card"));
        assert_eq!(cards[1].formatted_name(), Some("Next"));
    }

    #[test]
    fn deeply_embedded_agents_stop_at_the_nesting_limit() {
        let levels = MAX_NESTING + 5;
        let mut input = String::new();
        for level in 0..levels {
            input.push_str(&format!("BEGIN:VCARD\nVERSION:2.1\nFN:L{level}\nAGENT:\n"));
        }
        input.push_str("BEGIN:VCARD\nVERSION:2.1\nFN:Last\nEND:VCARD\n");
        input.push_str(&"END:VCARD\n".repeat(levels));
        input.push_str("BEGIN:VCARD\nVERSION:2.1\nFN:Next\nEND:VCARD\n");

        let (cards, warnings) = read(&input);
        assert_eq!(cards.len(), 2);
        assert_eq!(cards[1].formatted_name(), Some("Next"));
        assert_eq!(warnings[0].len(), 1);
        assert!(warnings[0][0].message.contains("nested deeper"));

        let mut depth = 0;
        let mut card = &cards[0];
        while let Some(PropertyValue::Agent(Agent::Card(agent))) =
            card.property(PropertyKind::Agent).map(VCardProperty::value)
        {
            card = &**agent;
            depth += 1;
        }
        assert_eq!(depth, MAX_NESTING);
        assert_eq!(card.formatted_name(), Some(format!("L{MAX_NESTING}").as_str()));
    }

    #[test]
    fn non_ascii_partial_dates_are_kept_as_text() {
        let input = "BEGIN:VCARD\nVERSION:4.0\nBDAY:12日345\nANNIVERSARY:--日x\nEND:VCARD\n";
        let (cards, warnings) = read(input);
        let bday = cards[0].property(PropertyKind::Birthday).unwrap();
        assert_eq!(
            bday.value().as_date_or_time().and_then(DateOrTime::as_text),
            Some("12日345")
        );
        assert!(cards[0].property(PropertyKind::Anniversary).is_some());
        assert_eq!(warnings[0].len(), 2);
    }

    #[test]
    fn labels_rejoin_their_address() {
        let input = "BEGIN:VCARD\nVERSION:3.0\nADR;TYPE=home:;;1 Main St;Austin;;;\n\
                     LABEL;TYPE=home:1 Main St\\nAustin\nLABEL;TYPE=work:elsewhere\nEND:VCARD\n";
        let (cards, _) = read(input);
        let card = &cards[0];
        assert_eq!(card.properties.len(), 2);
        let adr = card.property(PropertyKind::Address).unwrap();
        assert_eq!(adr.parameters.label(), Some("1 Main St\nAustin"));
        assert_eq!(card.properties[1].kind(), PropertyKind::Label);
    }

    #[test]
    fn malformed_lines_are_skipped() {
        let input = "BEGIN:VCARD\nVERSION:4.0\nthis is not a line\nFN:A\nEND:VCARD\n";
        let (cards, warnings) = read(input);
        assert_eq!(cards[0].properties.len(), 1);
        assert_eq!(warnings[0].len(), 1);
        assert_eq!(warnings[0][0].line, Some(3));
    }
}
