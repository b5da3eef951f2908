//! The `convert` command.

use std::io::{BufRead, Write};

use anyhow::{Result, bail};
use serde::Serialize;
use tessera_core::config::Settings;
use tessera_vcard::{
    CardReader, CardWriter, HtmlReader, HtmlWriter, JsonReader, JsonWriter, TextReader,
    TextWriter, VCardVersion, Warning, XmlReader, XmlWriter,
};

use crate::cli::{ConvertArgs, Syntax};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    Read,
    Write,
}

/// A warning tagged with the card it belongs to.
#[derive(Debug, Clone, Serialize)]
pub struct CardWarning {
    /// 0-based position of the card in the input.
    pub card: usize,
    pub stage: Stage,
    #[serde(flatten)]
    pub warning: Warning,
}

#[derive(Debug, Default, Serialize)]
pub struct Report {
    pub cards: usize,
    pub warnings: Vec<CardWarning>,
}

/// Converts every card in `input` and writes the document to `output`.
///
/// ## Errors
/// Returns an error if the target version is not available in the output
/// syntax, the input is not a document of the source syntax, or I/O fails.
#[tracing::instrument(
    skip(args, input, output, settings),
    fields(from = ?args.from, to = ?args.to)
)]
pub fn convert<R: BufRead, W: Write>(
    args: &ConvertArgs,
    input: R,
    output: W,
    settings: &Settings,
) -> Result<Report> {
    let settings = effective_settings(args, settings)?;
    let mut reader = reader_for(args.from, input, &settings);
    let cards = reader.read_all_with_warnings()?;

    let mut report = Report {
        cards: cards.len(),
        warnings: Vec::new(),
    };
    let mut writer = writer_for(args.to, output, &settings)?;
    for (index, read) in cards.iter().enumerate() {
        report
            .warnings
            .extend(tag(index, Stage::Read, read.warnings.iter().cloned()));
        writer.write(&read.card)?;
        report
            .warnings
            .extend(tag(index, Stage::Write, writer.warnings().iter().cloned()));
    }
    writer.finish()?;

    tracing::info!(
        cards = report.cards,
        warnings = report.warnings.len(),
        "Conversion finished"
    );
    Ok(report)
}

/// Applies command-line overrides and checks the target version against the
/// output syntax.
fn effective_settings(args: &ConvertArgs, settings: &Settings) -> Result<Settings> {
    let mut settings = settings.clone();
    if args.no_prodid {
        settings.output.include_prodid = false;
    }
    if args.pretty {
        settings.output.pretty_print = true;
    }

    let fixed = match args.to {
        Syntax::Text => None,
        Syntax::Xml | Syntax::Json => Some(VCardVersion::V4_0),
        Syntax::Html => Some(VCardVersion::V3_0),
    };
    match (args.target_version, fixed) {
        (Some(requested), Some(fixed)) if requested != fixed => bail!(
            "{:?} output only supports vCard {}, not {}",
            args.to,
            fixed.as_str(),
            requested.as_str()
        ),
        (Some(requested), None) => settings.text.version = requested.as_str().to_string(),
        _ => {}
    }
    Ok(settings)
}

fn reader_for<'a, R: BufRead + 'a>(
    syntax: Syntax,
    input: R,
    settings: &Settings,
) -> Box<dyn CardReader + 'a> {
    match syntax {
        Syntax::Text => Box::new(TextReader::from_settings(input, settings)),
        Syntax::Xml => Box::new(XmlReader::new(input)),
        Syntax::Json => Box::new(JsonReader::new(input)),
        Syntax::Html => Box::new(HtmlReader::new(input)),
    }
}

fn writer_for<'a, W: Write + 'a>(
    syntax: Syntax,
    output: W,
    settings: &Settings,
) -> Result<Box<dyn CardWriter + 'a>> {
    Ok(match syntax {
        Syntax::Text => Box::new(TextWriter::from_settings(output, settings)?),
        Syntax::Xml => Box::new(XmlWriter::from_settings(output, settings)),
        Syntax::Json => Box::new(JsonWriter::from_settings(output, settings)),
        Syntax::Html => Box::new(HtmlWriter::from_settings(output, settings)),
    })
}

fn tag(
    card: usize,
    stage: Stage,
    warnings: impl Iterator<Item = Warning>,
) -> impl Iterator<Item = CardWarning> {
    warnings.map(move |warning| CardWarning {
        card,
        stage,
        warning,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(from: Syntax, to: Syntax, target_version: Option<VCardVersion>) -> ConvertArgs {
        ConvertArgs {
            from,
            to,
            target_version,
            no_prodid: true,
            pretty: false,
            json_warnings: false,
        }
    }

    fn run(args: &ConvertArgs, input: &str) -> Result<(String, Report)> {
        let mut output = Vec::new();
        let report = convert(args, input.as_bytes(), &mut output, &Settings::default())?;
        Ok((String::from_utf8(output)?, report))
    }

    const CARD_3_0: &str = "BEGIN:VCARD\r\nVERSION:3.0\r\nFN:Jane Doe\r\n\
                            N:Doe;Jane;;;\r\nEND:VCARD\r\n";

    #[test_log::test]
    fn converts_text_to_json() {
        let (json, report) = run(&args(Syntax::Text, Syntax::Json, None), CARD_3_0).unwrap();
        assert_eq!(report.cards, 1);
        assert!(report.warnings.is_empty());
        assert_eq!(
            json,
            concat!(
                r#"["vcard",[["version",{},"text","4.0"],["fn",{},"text","Jane Doe"],"#,
                r#"["n",{},"text",["Doe","Jane","","",""]]]]"#
            )
        );
    }

    #[test]
    fn target_version_selects_text_output_version() {
        let (text, _) = run(
            &args(Syntax::Text, Syntax::Text, Some(VCardVersion::V2_1)),
            CARD_3_0,
        )
        .unwrap();
        assert!(text.starts_with("BEGIN:VCARD\r\nVERSION:2.1\r\n"));
    }

    #[test]
    fn xml_output_refuses_older_versions() {
        let result = run(
            &args(Syntax::Text, Syntax::Xml, Some(VCardVersion::V3_0)),
            CARD_3_0,
        );
        assert!(result.is_err());
    }

    #[test]
    fn warnings_are_tagged_with_card_and_stage() {
        let input = "BEGIN:VCARD\r\nVERSION:4.0\r\nFN:A\r\nKIND:group\r\nEND:VCARD\r\n";
        let (_, report) = run(&args(Syntax::Text, Syntax::Html, None), input).unwrap();
        assert_eq!(report.warnings.len(), 1);
        let warning = &report.warnings[0];
        assert_eq!((warning.card, warning.stage), (0, Stage::Write));

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["warnings"][0]["stage"], "write");
        assert_eq!(json["warnings"][0]["property"], "KIND");
    }
}
