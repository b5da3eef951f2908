//! Text syntax writer.

use std::io::Write;

use tessera_core::config::Settings;

use crate::codec::escape::{encode_param_value, escape_text};
use crate::codec::quoted_printable::{self, Charset};
use crate::codec::{fold, fold_quoted_printable};
use crate::core::{
    VCard, VCardParameters, VCardProperty, VCardVersion, Warning, encodings, param_names,
};
use crate::error::{VCardError, VCardResult};
use crate::io::policy::WritePolicy;
use crate::io::CardWriter;
use crate::registry::ScribeRegistry;
use crate::scribe::WriteOutcome;

/// Layout of the text output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextOptions {
    pub version: VCardVersion,
    /// Maximum characters per physical line; `None` disables folding.
    pub fold_line_length: Option<usize>,
    pub fold_indent: String,
    pub newline: String,
    /// RFC 6868 caret encoding of parameter values (4.0 only).
    pub caret_encoding: bool,
    pub policy: WritePolicy,
}

impl Default for TextOptions {
    fn default() -> Self {
        Self {
            version: VCardVersion::V4_0,
            fold_line_length: Some(75),
            fold_indent: " ".to_string(),
            newline: "\r\n".to_string(),
            caret_encoding: true,
            policy: WritePolicy::default(),
        }
    }
}

impl TextOptions {
    #[must_use]
    pub fn new(version: VCardVersion) -> Self {
        Self {
            version,
            ..Self::default()
        }
    }

    /// ## Errors
    /// Returns an error if the configured version is not 2.1, 3.0 or 4.0, or
    /// the folding settings are unusable.
    pub fn from_settings(settings: &Settings) -> VCardResult<Self> {
        let text = &settings.text;
        text.validate()?;
        let version = VCardVersion::parse(&text.version).ok_or_else(|| {
            VCardError::InvalidArgument(format!("unsupported vCard version \"{}\"", text.version))
        })?;
        Ok(Self {
            version,
            fold_line_length: text.folding(),
            fold_indent: text.fold_indent.clone(),
            newline: text.newline.clone(),
            caret_encoding: text.caret_encoding,
            policy: WritePolicy::from_settings(settings),
        })
    }

    #[must_use]
    pub fn with_folding(mut self, line_length: Option<usize>) -> Self {
        self.fold_line_length = line_length;
        self
    }

    #[must_use]
    pub fn with_newline(mut self, newline: impl Into<String>) -> Self {
        self.newline = newline.into();
        self
    }

    #[must_use]
    pub fn with_caret_encoding(mut self, enabled: bool) -> Self {
        self.caret_encoding = enabled;
        self
    }

    #[must_use]
    pub fn with_prodid(mut self, include: bool) -> Self {
        self.policy.include_prodid = include;
        self
    }
}

/// Writes cards in the text syntax of one version.
#[derive(Debug)]
pub struct TextWriter<W> {
    out: W,
    options: TextOptions,
    registry: ScribeRegistry,
    warnings: Vec<Warning>,
}

impl<W: Write> TextWriter<W> {
    #[must_use]
    pub fn new(out: W, version: VCardVersion) -> Self {
        Self::with_options(out, TextOptions::new(version))
    }

    #[must_use]
    pub fn with_options(out: W, options: TextOptions) -> Self {
        Self {
            out,
            options,
            registry: ScribeRegistry::default(),
            warnings: Vec::new(),
        }
    }

    /// ## Errors
    /// As [`TextOptions::from_settings`].
    pub fn from_settings(out: W, settings: &Settings) -> VCardResult<Self> {
        Ok(Self::with_options(out, TextOptions::from_settings(settings)?))
    }

    #[must_use]
    pub fn with_registry(mut self, registry: ScribeRegistry) -> Self {
        self.registry = registry;
        self
    }

    #[must_use]
    pub fn options(&self) -> &TextOptions {
        &self.options
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn render(&mut self, card: &VCard, options: &TextOptions) -> VCardResult<String> {
        let version = options.version;
        let properties = options.policy.prepare(card, version, &mut self.warnings);
        let mut out = String::new();
        push_line(&mut out, "BEGIN:VCARD", options)?;
        push_line(&mut out, &format!("VERSION:{version}"), options)?;
        for property in &properties {
            self.render_property(&mut out, property, card, options)?;
        }
        push_line(&mut out, "END:VCARD", options)?;
        Ok(out)
    }

    fn render_property(
        &mut self,
        out: &mut String,
        property: &VCardProperty,
        card: &VCard,
        options: &TextOptions,
    ) -> VCardResult<()> {
        let version = options.version;
        let scribe = self.registry.scribe_for(property);
        let mut parameters = scribe.prepare_parameters(property, version, card);
        parameters.remove_all(param_names::VALUE);
        if let Some(data_type) = scribe.value_parameter(property, version) {
            parameters.set_value_type(&data_type);
        }

        match scribe.write_text(property, version)? {
            WriteOutcome::Skip => {
                tracing::debug!(
                    name = property.name(),
                    %version,
                    "No value for this version; property skipped"
                );
            }
            WriteOutcome::Value(value) if version.is_legacy() && value.contains(['\r', '\n']) => {
                parameters.replace(param_names::ENCODING, encodings::QUOTED_PRINTABLE);
                parameters.replace(param_names::CHARSET, Charset::Utf8.label());
                let head = render_head(property, &parameters, options);
                let line = format!("{head}:{}", quoted_printable::encode(&value, Charset::Utf8));
                let line = match options.fold_line_length {
                    Some(width) => fold_quoted_printable(&line, width, &options.newline)?,
                    None => line,
                };
                out.push_str(&line);
                out.push_str(&options.newline);
            }
            WriteOutcome::Value(value) => {
                let head = render_head(property, &parameters, options);
                push_line(out, &format!("{head}:{value}"), options)?;
            }
            WriteOutcome::EmbeddedCard(nested) => {
                let head = render_head(property, &parameters, options);
                if version.is_legacy() {
                    push_line(out, &format!("{head}:"), options)?;
                    let inner = options.clone().with_prodid(false);
                    let text = self.render(&nested, &inner)?;
                    out.push_str(&text);
                } else {
                    let inner = TextOptions {
                        fold_line_length: None,
                        newline: "\r\n".to_string(),
                        ..options.clone()
                    }
                    .with_prodid(false);
                    let text = self.render(&nested, &inner)?;
                    let value = escape_text(&text, version);
                    push_line(out, &format!("{head}:{value}"), options)?;
                }
            }
        }
        Ok(())
    }
}

impl<W: Write> CardWriter for TextWriter<W> {
    #[tracing::instrument(skip(self, card), fields(version = %self.options.version))]
    fn write(&mut self, card: &VCard) -> VCardResult<()> {
        self.warnings.clear();
        let options = self.options.clone();
        let text = self.render(card, &options)?;
        self.out.write_all(text.as_bytes())?;
        tracing::debug!(bytes = text.len(), "Wrote card");
        Ok(())
    }

    fn warnings(&self) -> &[Warning] {
        &self.warnings
    }

    fn registry_mut(&mut self) -> &mut ScribeRegistry {
        &mut self.registry
    }

    fn finish(&mut self) -> VCardResult<()> {
        self.out.flush()?;
        Ok(())
    }
}

fn push_line(out: &mut String, line: &str, options: &TextOptions) -> VCardResult<()> {
    match options.fold_line_length {
        Some(width) => out.push_str(&fold(line, width, &options.fold_indent, &options.newline)?),
        None => out.push_str(line),
    }
    out.push_str(&options.newline);
    Ok(())
}

/// `[group.]NAME[;PARAM=value...]`
fn render_head(
    property: &VCardProperty,
    parameters: &VCardParameters,
    options: &TextOptions,
) -> String {
    let version = options.version;
    let mut head = String::new();
    if let Some(group) = &property.group {
        head.push_str(group);
        head.push('.');
    }
    head.push_str(property.name());

    for (name, values) in parameters {
        let encoded = values
            .iter()
            .map(|v| encode_param_value(v, version, options.caret_encoding));
        if version.is_legacy() {
            for value in encoded {
                head.push(';');
                head.push_str(name);
                head.push('=');
                head.push_str(&value);
            }
        } else {
            let joined: Vec<String> = encoded.collect();
            head.push(';');
            head.push_str(name);
            head.push('=');
            head.push_str(&joined.join(","));
        }
    }
    head
}
