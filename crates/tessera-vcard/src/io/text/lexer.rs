//! Content line lexer.
//!
//! Splits an unfolded line `[group.]NAME[;param...]:value` into its parts.
//! Parameter syntax differs by version: 2.1 escapes `;`, `:` and `,` with a
//! backslash and never quotes or splits on commas, while 3.0 and 4.0 quote
//! values and separate them with commas. 4.0 additionally decodes RFC 6868
//! caret sequences.

use thiserror::Error;

use crate::core::VCardVersion;

pub type LexResult<T> = Result<T, LexError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LexErrorKind {
    MissingColon,
    InvalidName,
}

/// A line that is not a content line at all.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("line {line}: {message}")]
pub struct LexError {
    pub kind: LexErrorKind,
    /// 1-based line number.
    pub line: usize,
    pub message: String,
}

impl LexError {
    fn new(kind: LexErrorKind, line: usize, message: impl Into<String>) -> Self {
        Self {
            kind,
            line,
            message: message.into(),
        }
    }
}

/// A parameter as written. Positional 2.1 parameters (`TEL;HOME:...`) have
/// no name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawParameter {
    pub name: Option<String>,
    pub values: Vec<String>,
}

/// A content line before value interpretation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentLine {
    /// Property group (e.g., "item1" in "item1.TEL").
    pub group: Option<String>,
    /// Property name (uppercase).
    pub name: String,
    pub params: Vec<RawParameter>,
    /// Value text, still escaped.
    pub value: String,
}

impl ContentLine {
    /// Whether this is `NAME:value` for the given name and value, ignoring case.
    #[must_use]
    pub fn is(&self, name: &str, value: &str) -> bool {
        self.name.eq_ignore_ascii_case(name) && self.value.trim().eq_ignore_ascii_case(value)
    }
}

/// Parses a single content line into its components.
///
/// ## Errors
/// Returns an error if the line has no value separator or an invalid name.
pub fn parse_content_line(
    line: &str,
    line_num: usize,
    version: VCardVersion,
) -> LexResult<ContentLine> {
    let head_end = line.find([';', ':']).ok_or_else(|| {
        LexError::new(LexErrorKind::MissingColon, line_num, "missing colon separator")
    })?;
    let (group, name) = parse_group(line[..head_end].trim());

    if name.is_empty() || !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        return Err(LexError::new(
            LexErrorKind::InvalidName,
            line_num,
            format!("invalid property name: {name}"),
        ));
    }

    let (params, value) = if line[head_end..].starts_with(':') {
        (Vec::new(), &line[head_end + 1..])
    } else {
        let mut lexer = ParamLexer::new(version);
        let value_start = lexer.run(&line[head_end + 1..]).ok_or_else(|| {
            LexError::new(LexErrorKind::MissingColon, line_num, "missing colon separator")
        })?;
        (lexer.params, &line[head_end + 1 + value_start..])
    };

    Ok(ContentLine {
        group: group.map(String::from),
        name: name.to_ascii_uppercase(),
        params,
        value: value.to_string(),
    })
}

/// Parses optional group prefix.
fn parse_group(s: &str) -> (Option<&str>, &str) {
    if let Some((potential_group, rest)) = s.split_once('.')
        && !potential_group.is_empty()
        && potential_group
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-')
    {
        return (Some(potential_group), rest);
    }
    (None, s)
}

struct ParamLexer {
    legacy: bool,
    caret: bool,
    params: Vec<RawParameter>,
    name: Option<String>,
    values: Vec<String>,
    buf: String,
    in_quotes: bool,
}

impl ParamLexer {
    fn new(version: VCardVersion) -> Self {
        Self {
            legacy: version.is_legacy(),
            caret: version == VCardVersion::V4_0,
            params: Vec::new(),
            name: None,
            values: Vec::new(),
            buf: String::new(),
            in_quotes: false,
        }
    }

    /// Consumes parameters; returns the byte offset where the value starts.
    fn run(&mut self, s: &str) -> Option<usize> {
        let mut chars = s.char_indices().peekable();
        while let Some((i, c)) = chars.next() {
            match c {
                '"' if !self.legacy && self.name.is_some() => self.in_quotes = !self.in_quotes,
                _ if self.in_quotes => self.push_char(c, &mut chars),
                ':' => {
                    self.finish();
                    return Some(i + 1);
                }
                ';' => self.finish(),
                '=' if self.name.is_none() => {
                    self.name = Some(std::mem::take(&mut self.buf).trim().to_string());
                }
                ',' if !self.legacy && self.name.is_some() => {
                    self.values.push(std::mem::take(&mut self.buf));
                }
                '\\' if self.legacy => match chars.peek() {
                    Some(&(_, next @ ('\\' | ';' | ':' | ','))) => {
                        chars.next();
                        self.buf.push(next);
                    }
                    _ => self.buf.push('\\'),
                },
                _ => self.push_char(c, &mut chars),
            }
        }
        None
    }

    fn push_char(
        &mut self,
        c: char,
        chars: &mut std::iter::Peekable<std::str::CharIndices<'_>>,
    ) {
        if c != '^' || !self.caret || self.name.is_none() {
            self.buf.push(c);
            return;
        }
        match chars.peek().map(|&(_, next)| next) {
            Some('n' | 'N') => self.buf.push('\n'),
            Some('\'') => self.buf.push('"'),
            Some('^') => self.buf.push('^'),
            _ => {
                self.buf.push('^');
                return;
            }
        }
        chars.next();
    }

    fn finish(&mut self) {
        let value = std::mem::take(&mut self.buf);
        match self.name.take() {
            Some(name) => {
                self.values.push(value);
                self.params.push(RawParameter {
                    name: Some(name),
                    values: std::mem::take(&mut self.values),
                });
            }
            None => {
                let value = value.trim();
                if !value.is_empty() {
                    self.params.push(RawParameter {
                        name: None,
                        values: vec![value.to_string()],
                    });
                }
            }
        }
    }
}
