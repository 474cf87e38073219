//! Line-level input shared by the comment block reader and the row reader.

use std::io::BufRead;

use crate::parsing::ParseError;

/// Non-blank lines with one line of pushback.
///
/// Line numbers count every physical line, including skipped ones. A trailing
/// `\r` is removed.
pub struct LineSource<R> {
    lines: std::io::Lines<R>,
    peeked: Option<(usize, String)>,
    line_num: usize,
}

impl<R: BufRead> LineSource<R> {
    pub fn new(reader: R) -> Self {
        Self {
            lines: reader.lines(),
            peeked: None,
            line_num: 0,
        }
    }

    /// Next non-blank line and its 1-based number, or `None` at end of input
    ///
    /// # Errors
    ///
    /// Returns `ParseError::Io` if the underlying reader fails.
    pub fn next_line(&mut self) -> Result<Option<(usize, String)>, ParseError> {
        if let Some(peeked) = self.peeked.take() {
            return Ok(Some(peeked));
        }
        for line in self.lines.by_ref() {
            let mut line = line?;
            self.line_num += 1;
            if line.ends_with('\r') {
                line.pop();
            }
            if is_blank(&line) {
                continue;
            }
            return Ok(Some((self.line_num, line)));
        }
        Ok(None)
    }

    /// Look at the next non-blank line without consuming it
    ///
    /// # Errors
    ///
    /// Returns `ParseError::Io` if the underlying reader fails.
    pub fn peek(&mut self) -> Result<Option<&(usize, String)>, ParseError> {
        if self.peeked.is_none() {
            self.peeked = self.next_line()?;
        }
        Ok(self.peeked.as_ref())
    }

    /// `Some(true)` if the next line is a comment, `None` at end of input
    ///
    /// # Errors
    ///
    /// Returns `ParseError::Io` if the underlying reader fails.
    pub fn peek_is_comment(&mut self) -> Result<Option<bool>, ParseError> {
        Ok(self.peek()?.map(|(_, line)| is_comment(line)))
    }
}

#[must_use]
pub fn is_comment(line: &str) -> bool {
    line.starts_with('#')
}

/// Empty or spaces only. A line holding a tab is a (possibly malformed) row.
fn is_blank(line: &str) -> bool {
    !line.contains('\t') && line.trim().is_empty()
}
