use anyhow::Result;
use config::Config;
use serde::Deserialize;

use crate::error::{CoreError, CoreResult};

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub text: TextConfig,
    pub output: OutputConfig,
    pub reader: ReaderConfig,
    pub logging: LoggingConfig,
}

/// Settings for the line-oriented text syntax.
#[derive(Debug, Clone, Deserialize)]
pub struct TextConfig {
    /// Target version string ("2.1", "3.0" or "4.0").
    pub version: String,
    /// Maximum characters per physical line; `0` disables folding.
    pub fold_line_length: usize,
    pub fold_indent: String,
    pub newline: String,
    /// RFC 6868 caret encoding of parameter values.
    pub caret_encoding: bool,
}

impl TextConfig {
    /// ## Summary
    /// Returns the folding line length, or `None` when folding is disabled.
    #[must_use]
    pub fn folding(&self) -> Option<usize> {
        (self.fold_line_length > 0).then_some(self.fold_line_length)
    }

    /// ## Summary
    /// Checks that the folding parameters describe a usable scheme.
    ///
    /// ## Errors
    /// Returns an error if the indent would fill a whole physical line.
    pub fn validate(&self) -> CoreResult<()> {
        if let Some(width) = self.folding()
            && self.fold_indent.chars().count() >= width
        {
            return Err(CoreError::ConfigError(format!(
                "fold indent ({} chars) must be shorter than the line length ({width})",
                self.fold_indent.chars().count()
            )));
        }
        if self.newline.is_empty() {
            return Err(CoreError::ConfigError("newline must not be empty".into()));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Append a PRODID property identifying this library.
    pub include_prodid: bool,
    /// Indent XML and JSON output.
    pub pretty_print: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReaderConfig {
    /// Charset used for quoted-printable values that declare none.
    pub default_charset: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            text: TextConfig {
                version: "4.0".into(),
                fold_line_length: 75,
                fold_indent: " ".into(),
                newline: "\r\n".into(),
                caret_encoding: true,
            },
            output: OutputConfig {
                include_prodid: true,
                pretty_print: false,
            },
            reader: ReaderConfig {
                default_charset: "UTF-8".into(),
            },
            logging: LoggingConfig {
                level: "info".into(),
            },
        }
    }
}

impl Settings {
    /// ## Summary
    /// Loads configuration from defaults, `TESSERA_*` environment variables and an
    /// optional `tessera.toml`. Nested keys use `__` in variable names, e.g.
    /// `TESSERA_TEXT__FOLD_LINE_LENGTH`.
    ///
    /// ## Errors
    /// Returns an error if building the configuration or deserializing it fails.
    pub fn load() -> Result<Self> {
        let settings = Config::builder()
            .set_default("text.version", "4.0")?
            .set_default("text.fold_line_length", 75)?
            .set_default("text.fold_indent", " ")?
            .set_default("text.newline", "\r\n")?
            .set_default("text.caret_encoding", true)?
            .set_default("output.include_prodid", true)?
            .set_default("output.pretty_print", false)?
            .set_default("reader.default_charset", "UTF-8")?
            .set_default("logging.level", "info")?
            // TOML file
            .add_source(config::File::with_name("tessera.toml").required(false))
            // Env vars take precedence
            .add_source(
                config::Environment::with_prefix("TESSERA")
                    .prefix_separator("_")
                    .separator("__")
                    .ignore_empty(true)
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize::<Settings>()?;

        settings.text.validate()?;
        tracing::debug!(?settings, "Settings loaded");
        Ok(settings)
    }
}

/// ## Summary
/// Loads configuration from environment variables and `.env` file.
///
/// ## Errors
/// Returns an error if loading or deserializing the configuration fails.
pub fn load_config() -> Result<Settings> {
    dotenvy::dotenv().ok();

    Settings::load()
}
