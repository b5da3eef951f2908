//! Value and parameter escaping for the text syntax.

use crate::core::VCardVersion;

/// Escapes a text value.
///
/// Backslash, comma and semicolon are always escaped. Newlines become `\n`
/// except in 2.1, where they stay literal and the writer switches the value
/// to quoted-printable.
#[must_use]
pub fn escape_text(s: &str, version: VCardVersion) -> String {
    let mut result = String::with_capacity(s.len());
    let mut chars = s.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '\\' => result.push_str("\\\\"),
            ',' => result.push_str("\\,"),
            ';' => result.push_str("\\;"),
            '\r' | '\n' if version.is_legacy() => result.push(c),
            '\r' => {
                if chars.peek() == Some(&'\n') {
                    chars.next();
                }
                result.push_str("\\n");
            }
            '\n' => result.push_str("\\n"),
            _ => result.push(c),
        }
    }

    result
}

/// Unescapes a text value.
///
/// `\n` and `\N` become a newline; any other escaped character is kept and
/// its backslash dropped.
#[must_use]
pub fn unescape_text(s: &str) -> String {
    if !s.contains('\\') {
        return s.to_string();
    }

    let mut result = String::with_capacity(s.len());
    let mut chars = s.chars();

    while let Some(c) = chars.next() {
        if c != '\\' {
            result.push(c);
            continue;
        }
        match chars.next() {
            Some('n' | 'N') => result.push('\n'),
            Some(other) => result.push(other),
            None => result.push('\\'),
        }
    }

    result
}

/// Splits `s` on every unescaped `delimiter`.
///
/// Each field is trimmed, and unescaped when `unescape` is set; otherwise the
/// escape sequences are left for a later split.
#[must_use]
pub fn split_escaped(s: &str, delimiter: char, unescape: bool) -> Vec<String> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut chars = s.chars();

    while let Some(c) = chars.next() {
        if c == '\\' {
            current.push(c);
            if let Some(next) = chars.next() {
                current.push(next);
            }
        } else if c == delimiter {
            fields.push(std::mem::take(&mut current));
        } else {
            current.push(c);
        }
    }
    fields.push(current);

    fields
        .into_iter()
        .map(|field| {
            let field = field.trim();
            if unescape {
                unescape_text(field)
            } else {
                field.to_string()
            }
        })
        .collect()
}

/// Writes a comma-separated list.
#[must_use]
pub fn write_list<S: AsRef<str>>(values: &[S], version: VCardVersion) -> String {
    values
        .iter()
        .map(|v| escape_text(v.as_ref(), version))
        .collect::<Vec<_>>()
        .join(",")
}

/// Parses a comma-separated list. An empty value is an empty list.
#[must_use]
pub fn parse_list(s: &str) -> Vec<String> {
    if s.trim().is_empty() {
        return Vec::new();
    }
    split_escaped(s, ',', true)
}

/// Writes a semicolon-separated value whose components are lists.
#[must_use]
pub fn write_structured<S: AsRef<str>>(components: &[&[S]], version: VCardVersion) -> String {
    components
        .iter()
        .map(|values| write_list(values, version))
        .collect::<Vec<_>>()
        .join(";")
}

/// Parses a semicolon-separated value into components of comma lists.
#[must_use]
pub fn parse_structured(s: &str) -> Vec<Vec<String>> {
    split_escaped(s, ';', false)
        .iter()
        .map(|component| parse_list(component))
        .collect()
}

/// Writes a semicolon-separated value whose components are single texts.
#[must_use]
pub fn write_semi_structured<S: AsRef<str>>(values: &[S], version: VCardVersion) -> String {
    values
        .iter()
        .map(|v| escape_text(v.as_ref(), version))
        .collect::<Vec<_>>()
        .join(";")
}

/// Parses a semicolon-separated value whose components are single texts.
#[must_use]
pub fn parse_semi_structured(s: &str) -> Vec<String> {
    split_escaped(s, ';', true)
}

/// Renders a parameter value for the text syntax.
///
/// 2.1 never quotes and backslash-escapes the separators instead. Later
/// versions quote values containing `,` `;` or `:`; with `caret_encoding` a
/// 4.0 value keeps newlines and double quotes via RFC 6868.
#[must_use]
pub fn encode_param_value(value: &str, version: VCardVersion, caret_encoding: bool) -> String {
    let mut result = String::with_capacity(value.len());
    let mut needs_quotes = false;
    let caret = caret_encoding && version == VCardVersion::V4_0;

    for c in value.chars() {
        match c {
            '\\' | ';' | ':' | ',' if version.is_legacy() => {
                result.push('\\');
                result.push(c);
            }
            '\r' | '\n' if version.is_legacy() => result.push(' '),
            ':' | ';' | ',' => {
                needs_quotes = true;
                result.push(c);
            }
            '^' if caret => result.push_str("^^"),
            '\n' if caret => result.push_str("^n"),
            '"' if caret => {
                needs_quotes = true;
                result.push_str("^'");
            }
            '"' => result.push('\''),
            '\r' => {}
            '\n' => result.push(' '),
            _ => result.push(c),
        }
    }

    if needs_quotes {
        format!("\"{result}\"")
    } else {
        result
    }
}
