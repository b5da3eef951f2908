//! Line folding.

use crate::error::{VCardError, VCardResult};

/// Folds a logical line into physical lines of at most `max_width` chars.
///
/// Whitespace at a prospective break point stays on the current line, which
/// may then run past `max_width`. Embedded `\r`, `\n` and `\r\n` are copied
/// through and restart the column count.
///
/// ## Errors
/// Returns [`VCardError::InvalidArgument`] if `max_width` is zero or the
/// indent is not shorter than `max_width`.
pub fn fold(text: &str, max_width: usize, indent: &str, newline: &str) -> VCardResult<String> {
    let indent_width = indent.chars().count();
    check_width(max_width, indent_width)?;

    let mut result = String::with_capacity(text.len() + text.len() / max_width * 3);
    let mut column = 0;
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '\r' => {
                result.push(c);
                if chars.peek() == Some(&'\n') {
                    chars.next();
                    result.push('\n');
                }
                column = 0;
            }
            '\n' => {
                result.push(c);
                column = 0;
            }
            _ => {
                if column >= max_width && !matches!(c, ' ' | '\t') {
                    result.push_str(newline);
                    result.push_str(indent);
                    column = indent_width;
                }
                result.push(c);
                column += 1;
            }
        }
    }

    Ok(result)
}

/// Folds an already quoted-printable encoded line with `=` soft breaks.
///
/// Continuation lines carry no indent and `=XX` triplets are never split.
///
/// ## Errors
/// Returns [`VCardError::InvalidArgument`] if `max_width` is below 4.
pub fn fold_quoted_printable(text: &str, max_width: usize, newline: &str) -> VCardResult<String> {
    if max_width < 4 {
        return Err(VCardError::InvalidArgument(format!(
            "quoted-printable line length must be at least 4, got {max_width}"
        )));
    }

    let chars: Vec<char> = text.chars().collect();
    let mut result = String::with_capacity(text.len() + text.len() / max_width * 3);
    let mut column = 0;
    let mut i = 0;

    while i < chars.len() {
        let unit = if chars[i] == '=' { 3.min(chars.len() - i) } else { 1 };
        // One column is reserved for the soft break marker.
        if column + unit > max_width - 1 {
            result.push('=');
            result.push_str(newline);
            column = 0;
        }
        result.extend(&chars[i..i + unit]);
        column += unit;
        i += unit;
    }

    Ok(result)
}

fn check_width(max_width: usize, indent_width: usize) -> VCardResult<()> {
    if max_width == 0 {
        return Err(VCardError::InvalidArgument(
            "line length must be greater than zero".into(),
        ));
    }
    if indent_width >= max_width {
        return Err(VCardError::InvalidArgument(format!(
            "indent ({indent_width} chars) must be shorter than the line length ({max_width})"
        )));
    }
    Ok(())
}
