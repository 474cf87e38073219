use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use tracing::{debug, trace};

use crate::core::query_result::QueryResult;
use crate::parsing::assembler::QueryAssembler;
use crate::parsing::comments::{CommentBlock, SearchMetadata};
use crate::parsing::lines::{is_comment, LineSource};
use crate::parsing::options::{InputFormat, ParseOptions};
use crate::parsing::row::{ColumnSet, Row, WarningLog};
use crate::parsing::{ParseError, ParseWarning};

/// Where the reader is between pulls.
///
/// A query is opened and closed within a single pull, so the open-query and
/// open-hit states live in [`QueryAssembler`] for the duration of that pull.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    /// No query open; the next row or block starts one
    AwaitingQuery,
    /// Input exhausted or a fatal error was returned
    Done,
}

/// Pull-based reader yielding one [`QueryResult`] at a time.
///
/// Only the open query and one buffered row are held in memory. After an error the
/// reader is finished and yields nothing further.
///
/// # Example
///
/// ```
/// use blast_tab::parsing::{BlastTabReader, ParseOptions};
///
/// let text = "q1\th1\t34.88\t43\t28\t0\t31\t73\t1744\t1872\t1e-05\t34.7\n\
///             q1\th2\t33.90\t59\t31\t1\t44\t94\t1057\t1233\t1e-04\t31.6\n";
/// let mut reader = BlastTabReader::new(text.as_bytes(), ParseOptions::default());
///
/// let qresult = reader.next_query().unwrap().unwrap();
/// assert_eq!(qresult.id, "q1");
/// assert_eq!(qresult.len(), 2);
/// assert!(reader.next_query().unwrap().is_none());
/// ```
pub struct BlastTabReader<R> {
    lines: LineSource<R>,
    options: ParseOptions,
    /// Resolved input variant, fixed once the first line is seen
    mode: Option<InputFormat>,
    state: State,
    /// Columns for plain rows and for comment blocks without a `Fields:` line
    default_columns: ColumnSet,
    /// Plain-mode lookahead: the first row of the next query
    pending: Option<Row>,
    search: SearchMetadata,
    warnings: WarningLog,
}

impl BlastTabReader<BufReader<File>> {
    /// Open a file for reading
    ///
    /// # Errors
    ///
    /// Returns `ParseError::Io` if the file cannot be opened.
    pub fn from_path(path: impl AsRef<Path>, options: ParseOptions) -> Result<Self, ParseError> {
        let file = File::open(path)?;
        Ok(Self::new(BufReader::new(file), options))
    }
}

impl<R: BufRead> BlastTabReader<R> {
    pub fn new(reader: R, options: ParseOptions) -> Self {
        let default_columns = options
            .columns
            .as_deref()
            .map_or_else(ColumnSet::default, ColumnSet::from_codes);

        Self {
            lines: LineSource::new(reader),
            options,
            mode: None,
            state: State::AwaitingQuery,
            default_columns,
            pending: None,
            search: SearchMetadata::default(),
            warnings: WarningLog::default(),
        }
    }

    /// The input variant in use, once the first non-blank line has been read
    #[must_use]
    pub fn mode(&self) -> Option<InputFormat> {
        self.mode
    }

    /// Warnings collected so far
    #[must_use]
    pub fn warnings(&self) -> &[ParseWarning] {
        self.warnings.as_slice()
    }

    /// Drain the warnings collected so far
    pub fn take_warnings(&mut self) -> Vec<ParseWarning> {
        self.warnings.take()
    }

    /// Read the next query result, or `None` at end of input
    ///
    /// # Errors
    ///
    /// Returns `ParseError::Io` on read failure, `ParseError::FieldCount`,
    /// `ParseError::Structure` or `ParseError::RowCountMismatch` for malformed
    /// layout, and `ParseError::InvalidValue` for values that cannot be converted.
    pub fn next_query(&mut self) -> Result<Option<QueryResult>, ParseError> {
        let result = self.pull();
        if result.is_err() {
            self.set_state(State::Done);
        }
        result
    }

    fn pull(&mut self) -> Result<Option<QueryResult>, ParseError> {
        if self.state == State::Done {
            return Ok(None);
        }
        match self.resolve_mode()? {
            None => {
                self.set_state(State::Done);
                Ok(None)
            }
            Some(InputFormat::Commented) => self.next_commented(),
            Some(_) => self.next_plain(),
        }
    }

    fn set_state(&mut self, state: State) {
        trace!(from = ?self.state, to = ?state, "Reader state change");
        self.state = state;
    }

    /// Fix the input variant from the first non-blank line. `None` on empty input.
    fn resolve_mode(&mut self) -> Result<Option<InputFormat>, ParseError> {
        if self.mode.is_some() {
            return Ok(self.mode);
        }
        let Some(first_is_comment) = self.lines.peek_is_comment()? else {
            return Ok(None);
        };
        let mode = match self.options.format {
            InputFormat::Auto if first_is_comment => InputFormat::Commented,
            InputFormat::Auto => InputFormat::Plain,
            forced => forced,
        };
        debug!(?mode, "Detected tabular input variant");
        self.mode = Some(mode);
        Ok(self.mode)
    }

    fn next_plain(&mut self) -> Result<Option<QueryResult>, ParseError> {
        let first = match self.pending.take() {
            Some(row) => row,
            None => match self.read_plain_row()? {
                Some(row) => row,
                None => {
                    self.set_state(State::Done);
                    return Ok(None);
                }
            },
        };

        let Some(query_id) = first.query_id.clone() else {
            return Err(ParseError::structure(
                first.line,
                "no query identifier column (qseqid, qaccver, qacc or qgi)",
            ));
        };
        debug!(query = %query_id, line = first.line, "Opening query");
        let mut query = QueryAssembler::new(QueryResult::new(query_id));
        query.push(first)?;

        loop {
            match self.read_plain_row()? {
                None => {
                    self.set_state(State::Done);
                    break;
                }
                Some(row) if row.query_id.as_deref() == Some(query.id()) => query.push(row)?,
                Some(row) => {
                    self.pending = Some(row);
                    break;
                }
            }
        }

        debug!(query = %query.id(), rows = query.rows(), "Closing query");
        Ok(Some(query.finish()))
    }

    fn read_plain_row(&mut self) -> Result<Option<Row>, ParseError> {
        let Some((line_num, line)) = self.lines.next_line()? else {
            return Ok(None);
        };
        if is_comment(&line) {
            return Err(ParseError::structure(
                line_num,
                "comment line in uncommented tabular input",
            ));
        }
        Row::parse(&line, line_num, &self.default_columns, &mut self.warnings).map(Some)
    }

    fn next_commented(&mut self) -> Result<Option<QueryResult>, ParseError> {
        loop {
            let Some(block) = CommentBlock::read(&mut self.lines)? else {
                self.set_state(State::Done);
                return Ok(None);
            };
            self.search.update(&block);

            let Some(query_id) = block.query_id.clone() else {
                debug!(line = block.line, "Comment block without a query");
                continue;
            };

            debug!(query = %query_id, line = block.line, "Opening query");
            let mut result = QueryResult::new(query_id);
            result.description.clone_from(&block.query_description);
            self.search.apply(&mut result);
            let mut query = QueryAssembler::new(result);

            if block.hits_found == Some(0) {
                return Ok(Some(query.finish()));
            }

            let columns = block
                .column_set()
                .unwrap_or_else(|| self.default_columns.clone());

            while self.lines.peek_is_comment()? == Some(false) {
                let Some((line_num, line)) = self.lines.next_line()? else {
                    break;
                };
                let row = Row::parse(&line, line_num, &columns, &mut self.warnings)?;
                if let (Some(expected), Some(found)) = (query.row_query_id(), row.query_id.as_deref())
                {
                    if expected != found {
                        return Err(ParseError::structure(
                            line_num,
                            format!("row for query '{found}' inside the block of query '{}'", query.id()),
                        ));
                    }
                }
                query.push(row)?;
            }

            if let Some(declared) = block.hits_found {
                if declared != query.rows() {
                    return Err(ParseError::RowCountMismatch {
                        query: query.id().to_string(),
                        declared,
                        found: query.rows(),
                    });
                }
            }

            debug!(query = %query.id(), rows = query.rows(), "Closing query");
            return Ok(Some(query.finish()));
        }
    }
}

impl<R: BufRead> Iterator for BlastTabReader<R> {
    type Item = Result<QueryResult, ParseError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_query().transpose()
    }
}

/// Parse all query results from text, returning them with any warnings
///
/// # Errors
///
/// Returns the first error encountered; see [`BlastTabReader::next_query`].
pub fn parse_text(
    text: &str,
    options: ParseOptions,
) -> Result<(Vec<QueryResult>, Vec<ParseWarning>), ParseError> {
    let mut reader = BlastTabReader::new(text.as_bytes(), options);
    let mut results = Vec::new();
    while let Some(qresult) = reader.next_query()? {
        results.push(qresult);
    }
    Ok((results, reader.take_warnings()))
}

/// Read exactly one query result
///
/// # Errors
///
/// Returns `ParseError::NotSingle` if the input holds no query result or more than
/// one, or any error raised while reading.
pub fn read_one<R: BufRead>(mut reader: BlastTabReader<R>) -> Result<QueryResult, ParseError> {
    let Some(first) = reader.next_query()? else {
        return Err(ParseError::NotSingle(0));
    };
    let mut count = 1;
    while reader.next_query()?.is_some() {
        count += 1;
    }
    if count == 1 {
        Ok(first)
    } else {
        Err(ParseError::NotSingle(count))
    }
}

/// Read exactly one query result from text
///
/// # Errors
///
/// See [`read_one`].
pub fn read_text(text: &str, options: ParseOptions) -> Result<QueryResult, ParseError> {
    read_one(BlastTabReader::new(text.as_bytes(), options))
}
