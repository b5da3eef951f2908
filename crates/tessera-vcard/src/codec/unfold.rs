//! Line unfolding over a buffered reader.

use std::io::BufRead;

use super::quoted_printable::Charset;
use crate::error::VCardResult;

/// A logical line with the number of its first physical line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogicalLine {
    /// 1-based physical line number where the logical line starts.
    pub number: usize,
    pub text: String,
}

/// Lazily joins folded physical lines into logical lines.
///
/// A physical line starting with a continuation character (space or tab by
/// default) is appended to the previous one without that character. A
/// quoted-printable line ending in `=` is joined with the next line verbatim.
/// Blank lines are skipped.
#[derive(Debug)]
pub struct LineUnfolder<R> {
    reader: R,
    pending: Option<(usize, String)>,
    physical: usize,
    continuation: Vec<char>,
    buf: Vec<u8>,
}

impl<R: BufRead> LineUnfolder<R> {
    #[must_use]
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            pending: None,
            physical: 0,
            continuation: vec![' ', '\t'],
            buf: Vec::new(),
        }
    }

    /// Replaces the set of characters that mark a continuation line.
    #[must_use]
    pub fn with_continuation(mut self, markers: &[char]) -> Self {
        self.continuation = markers.to_vec();
        self
    }

    /// Number of physical lines consumed so far.
    #[must_use]
    pub fn physical_lines(&self) -> usize {
        self.physical
    }

    /// Returns the next logical line, or `None` at end of input.
    ///
    /// ## Errors
    /// Returns an I/O error if the underlying reader fails.
    pub fn next_line(&mut self) -> VCardResult<Option<LogicalLine>> {
        let (number, mut text) = loop {
            let next = match self.pending.take() {
                Some(line) => line,
                None => match self.read_physical()? {
                    Some(line) => line,
                    None => return Ok(None),
                },
            };
            if !next.1.trim().is_empty() {
                break next;
            }
        };

        loop {
            let soft_break = text.ends_with('=') && is_quoted_printable(&text);
            let Some((next_number, next)) = self.read_physical()? else {
                break;
            };
            if soft_break {
                text.pop();
                text.push_str(&next);
                continue;
            }
            if let Some(first) = next.chars().next()
                && self.continuation.contains(&first)
            {
                text.push_str(&next[first.len_utf8()..]);
                continue;
            }
            self.pending = Some((next_number, next));
            break;
        }

        tracing::trace!(line = number, len = text.len(), "Unfolded line");
        Ok(Some(LogicalLine { number, text }))
    }

    fn read_physical(&mut self) -> VCardResult<Option<(usize, String)>> {
        self.buf.clear();
        if self.reader.read_until(b'\n', &mut self.buf)? == 0 {
            return Ok(None);
        }
        while matches!(self.buf.last(), Some(b'\n' | b'\r')) {
            self.buf.pop();
        }
        self.physical += 1;

        let bytes = std::mem::take(&mut self.buf);
        let text = String::from_utf8(bytes)
            .unwrap_or_else(|err| Charset::Latin1.decode(err.as_bytes()));
        Ok(Some((self.physical, text)))
    }
}

impl<R: BufRead> Iterator for LineUnfolder<R> {
    type Item = VCardResult<LogicalLine>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_line().transpose()
    }
}

/// Whether the name/parameter part of a raw line declares quoted-printable.
fn is_quoted_printable(line: &str) -> bool {
    let head = line.split_once(':').map_or(line, |(head, _)| head);
    head.to_ascii_uppercase().contains("QUOTED-PRINTABLE")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(input: &str) -> Vec<String> {
        LineUnfolder::new(input.as_bytes())
            .map(|l| l.unwrap().text)
            .collect()
    }

    #[test]
    fn unfold_crlf_and_tab() {
        assert_eq!(lines("FN:John\r\n  Doe\r\nNOTE:a\r\n\tb\r\n"), vec!["FN:John Doe", "NOTE:ab"]);
    }

    #[test]
    fn unfold_bare_lf_and_blank_lines() {
        assert_eq!(lines("A:1\n\nB:2\n 3\n"), vec!["A:1", "B:23"]);
    }

    #[test]
    fn quoted_printable_soft_breaks() {
        let input = "NOTE;ENCODING=QUOTED-PRINTABLE:one=\r\n two=0D=0A=\r\nthree\r\nFN:x\r\n";
        assert_eq!(
            lines(input),
            vec!["NOTE;ENCODING=QUOTED-PRINTABLE:one two=0D=0Athree", "FN:x"]
        );
    }

    #[test]
    fn trailing_equals_without_qp_is_literal() {
        assert_eq!(lines("NOTE:a=\r\nFN:b\r\n"), vec!["NOTE:a=", "FN:b"]);
    }

    #[test]
    fn line_numbers_track_physical_lines() {
        let mut unfolder = LineUnfolder::new("A:1\r\n 2\r\nB:3\r\n".as_bytes());
        assert_eq!(unfolder.next_line().unwrap().unwrap().number, 1);
        assert_eq!(unfolder.next_line().unwrap().unwrap().number, 3);
        assert!(unfolder.next_line().unwrap().is_none());
        assert_eq!(unfolder.physical_lines(), 3);
    }

    #[test]
    fn custom_continuation_markers() {
        let mut unfolder = LineUnfolder::new("A:1\r\n 2\r\n".as_bytes()).with_continuation(&['\t']);
        assert_eq!(unfolder.next_line().unwrap().unwrap().text, "A:1");
        assert_eq!(unfolder.next_line().unwrap().unwrap().text, " 2");
    }

    #[test]
    fn latin1_fallback() {
        let input: &[u8] = b"FN:Jos\xe9\r\n";
        assert_eq!(
            LineUnfolder::new(input).next_line().unwrap().unwrap().text,
            "FN:José"
        );
    }
}
