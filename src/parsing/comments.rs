//! Reader for the `#` comment blocks of commented (`-outfmt 7`) output.
//!
//! A block precedes each query's rows:
//!
//! ```text
//! # TBLASTN 2.2.26+
//! # Query: random_s00
//! # RID: X76FDCG9016
//! # Database: refseq_rna
//! # Fields: query id, subject id, evalue, bit score
//! # 0 hits found
//! ```
//!
//! Blocks follow each other without any blank line, so a block ends at the first
//! line that can only belong to the next one.

use std::io::BufRead;

use tracing::debug;

use crate::core::query_result::QueryResult;
use crate::parsing::lines::{is_comment, LineSource};
use crate::parsing::row::{Column, ColumnSet};
use crate::parsing::ParseError;
use crate::utils::validation::{check_column_limit, split_labels};

/// Metadata read from one comment block
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommentBlock {
    /// Line number of the first comment line
    pub line: usize,
    pub program: Option<String>,
    pub version: Option<String>,
    pub query_id: Option<String>,
    pub query_description: Option<String>,
    pub database: Option<String>,
    pub rid: Option<String>,
    pub fields: Option<Vec<Column>>,
    /// Declared number of data rows ("N hits found")
    pub hits_found: Option<usize>,
}

impl CommentBlock {
    #[must_use]
    pub fn new(line: usize) -> Self {
        Self {
            line,
            ..Self::default()
        }
    }

    /// Read one block from `lines`, stopping before the first line that starts
    /// another block or is a data row. Returns `None` at end of input.
    ///
    /// # Errors
    ///
    /// Returns `ParseError::Structure` if the next line is a data row rather than a
    /// comment, or for malformed `Query:` or `Fields:` lines.
    pub fn read<R: BufRead>(lines: &mut LineSource<R>) -> Result<Option<Self>, ParseError> {
        let Some((line_num, line)) = lines.next_line()? else {
            return Ok(None);
        };
        if !is_comment(&line) {
            return Err(ParseError::structure(
                line_num,
                "data row outside of a query block; expected a '#' comment line",
            ));
        }

        let mut block = Self::new(line_num);
        block.push_line(&line, line_num)?;
        loop {
            let ends = match lines.peek()? {
                Some((_, next)) if is_comment(next) => block.is_terminated_by(next),
                _ => true,
            };
            if ends {
                break;
            }
            if let Some((next_num, next)) = lines.next_line()? {
                block.push_line(&next, next_num)?;
            }
        }
        Ok(Some(block))
    }

    /// True if `text` cannot belong to this block: a new program line or `Query:`
    /// once the query is known, or anything after the row count
    #[must_use]
    pub fn is_terminated_by(&self, text: &str) -> bool {
        if self.hits_found.is_some() {
            return true;
        }
        let body = comment_body(text);
        self.query_id.is_some() && (body.starts_with("Query:") || is_program_line(body))
    }

    /// Absorb one comment line
    ///
    /// # Errors
    ///
    /// Returns `ParseError::Structure` if the `Query:` line has no identifier, or the
    /// `Fields:` line is empty or too long.
    pub fn push_line(&mut self, text: &str, line_num: usize) -> Result<(), ParseError> {
        let body = comment_body(text);
        if body.is_empty() {
            return Ok(());
        }

        if let Some(rest) = body.strip_prefix("Query:") {
            let rest = rest.trim();
            let (id, description) = match rest.split_once(char::is_whitespace) {
                Some((id, desc)) => (id, Some(desc.trim())),
                None => (rest, None),
            };
            if id.is_empty() {
                return Err(ParseError::structure(line_num, "query line without an identifier"));
            }
            self.query_id = Some(id.to_string());
            self.query_description = description.filter(|d| !d.is_empty()).map(str::to_string);
        } else if let Some(rest) = body.strip_prefix("Database:") {
            self.database = non_empty(rest);
        } else if let Some(rest) = body.strip_prefix("RID:") {
            self.rid = non_empty(rest);
        } else if let Some(rest) = body.strip_prefix("Fields:") {
            let labels = split_labels(rest);
            if labels.is_empty() {
                return Err(ParseError::structure(line_num, "fields line without any column"));
            }
            if let Some(msg) = check_column_limit(labels.len()) {
                return Err(ParseError::structure(line_num, msg));
            }
            self.fields = Some(labels.into_iter().map(Column::from_label).collect());
        } else if let Some(count) = parse_hits_found(body) {
            self.hits_found = Some(count);
        } else if let Some((program, version)) = parse_program(body)
            .filter(|(program, _)| line_num == self.line || is_known_program(program))
        {
            self.program = Some(program);
            self.version = Some(version);
        } else {
            debug!(line = line_num, comment = %body, "Skipping comment line");
        }
        Ok(())
    }

    /// Columns declared by the block, if it has a `Fields:` line
    #[must_use]
    pub fn column_set(&self) -> Option<ColumnSet> {
        self.fields.clone().map(ColumnSet::new)
    }
}

/// Search-wide metadata, carried from block to block when a later block omits it
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchMetadata {
    pub program: Option<String>,
    pub version: Option<String>,
    pub database: Option<String>,
    pub rid: Option<String>,
}

impl SearchMetadata {
    pub fn update(&mut self, block: &CommentBlock) {
        if block.program.is_some() {
            self.program.clone_from(&block.program);
            self.version.clone_from(&block.version);
        }
        if block.database.is_some() {
            self.database.clone_from(&block.database);
        }
        if block.rid.is_some() {
            self.rid.clone_from(&block.rid);
        }
    }

    pub fn apply(&self, result: &mut QueryResult) {
        result.program.clone_from(&self.program);
        result.version.clone_from(&self.version);
        result.target.clone_from(&self.database);
        result.rid.clone_from(&self.rid);
    }
}

fn comment_body(text: &str) -> &str {
    text.trim_start_matches('#').trim()
}

fn non_empty(text: &str) -> Option<String> {
    let text = text.trim();
    (!text.is_empty()).then(|| text.to_string())
}

/// "3 hits found" -> 3
fn parse_hits_found(body: &str) -> Option<usize> {
    let count = body
        .strip_suffix("hits found")
        .or_else(|| body.strip_suffix("hit found"))?;
    count.trim().parse().ok()
}

/// Search programs that open a block with a "PROGRAM VERSION" line
const KNOWN_PROGRAMS: [&str; 9] = [
    "blastn",
    "blastp",
    "blastx",
    "tblastn",
    "tblastx",
    "psiblast",
    "rpsblast",
    "rpstblastn",
    "deltablast",
];

fn is_known_program(program: &str) -> bool {
    KNOWN_PROGRAMS.contains(&program)
}

/// A "PROGRAM VERSION" line naming a known search program
fn is_program_line(body: &str) -> bool {
    parse_program(body).is_some_and(|(program, _)| is_known_program(&program))
}

/// "TBLASTN 2.2.26+" -> ("tblastn", "2.2.26+")
fn parse_program(body: &str) -> Option<(String, String)> {
    let mut tokens = body.split_whitespace();
    let program = tokens.next()?;
    let version = tokens.next()?;

    let is_name = program.starts_with(|c: char| c.is_ascii_alphabetic())
        && program.chars().all(|c| c.is_ascii_alphanumeric() || c == '-');
    let is_version = version.starts_with(|c: char| c.is_ascii_digit());

    (is_name && is_version).then(|| (program.to_lowercase(), version.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parsing::fields::Field;

    fn read_block(lines: &mut LineSource<&[u8]>) -> CommentBlock {
        CommentBlock::read(lines).unwrap().unwrap()
    }

    fn read_first(text: &str) -> Result<Option<CommentBlock>, ParseError> {
        CommentBlock::read(&mut LineSource::new(text.as_bytes()))
    }

    #[test]
    fn test_full_block() {
        let text = "# TBLASTN 2.2.26+
# Query: gi|16080617|ref|NP_391444.1| membrane bound lipoprotein [Bacillus subtilis]
# Database: db/minirefseq_mrna
# Fields: query id, subject id, % identity, evalue, bit score
# 3 hits found
q1\th1\t34.88\t1e-05\t34.7";

        let mut lines = LineSource::new(text.as_bytes());
        let block = read_block(&mut lines);
        assert_eq!(block.line, 1);
        assert_eq!(block.program.as_deref(), Some("tblastn"));
        assert_eq!(block.version.as_deref(), Some("2.2.26+"));
        assert_eq!(block.query_id.as_deref(), Some("gi|16080617|ref|NP_391444.1|"));
        assert_eq!(
            block.query_description.as_deref(),
            Some("membrane bound lipoprotein [Bacillus subtilis]")
        );
        assert_eq!(block.database.as_deref(), Some("db/minirefseq_mrna"));
        assert_eq!(block.hits_found, Some(3));
        assert_eq!(
            block.fields,
            Some(vec![
                Column::Known(Field::QuerySeqId),
                Column::Known(Field::SubjectSeqId),
                Column::Known(Field::PercentIdentity),
                Column::Known(Field::Evalue),
                Column::Known(Field::BitScore),
            ])
        );

        // the data row is left for the caller
        assert_eq!(lines.peek_is_comment().unwrap(), Some(false));
    }

    #[test]
    fn test_adjacent_blocks_are_split() {
        let text = "# TBLASTN 2.2.26+
# Query: random_s00
# Database: db/minirefseq_mrna
# 0 hits found
# TBLASTN 2.2.26+
# Query: gi|16080617|ref|NP_391444.1|";

        let mut lines = LineSource::new(text.as_bytes());
        let first = read_block(&mut lines);
        assert_eq!(first.query_id.as_deref(), Some("random_s00"));
        assert_eq!(first.hits_found, Some(0));
        assert!(first.fields.is_none());

        let second = read_block(&mut lines);
        assert_eq!(second.line, 5);
        assert_eq!(second.query_id.as_deref(), Some("gi|16080617|ref|NP_391444.1|"));
        assert!(second.query_description.is_none());

        assert!(CommentBlock::read(&mut lines).unwrap().is_none());
    }

    #[test]
    fn test_query_line_splits_block_without_program_line() {
        let mut lines = LineSource::new("# Query: q1\n# Database: nt\n# Query: q2\n".as_bytes());
        assert_eq!(read_block(&mut lines).query_id.as_deref(), Some("q1"));
        let second = read_block(&mut lines);
        assert_eq!(second.line, 3);
        assert_eq!(second.query_id.as_deref(), Some("q2"));
    }

    #[test]
    fn test_rid_and_unknown_lines() {
        let text = "# TBLASTN 2.2.26+
# Iteration: 1
# Query: random_s00
# RID: X76FDCG9016
# Database: refseq_rna
# 0 hits found";
        let block = read_first(text).unwrap().unwrap();
        assert_eq!(block.rid.as_deref(), Some("X76FDCG9016"));
        assert_eq!(block.database.as_deref(), Some("refseq_rna"));
        assert_eq!(block.hits_found, Some(0));
    }

    #[test]
    fn test_free_text_comment_stays_in_block() {
        let text = "# BLASTP 2.2.26+
# Query: q1
# Database: nr
# Note 2 sequences masked
# Fields: query id, subject id, evalue, bit score
# 1 hits found";
        let mut lines = LineSource::new(text.as_bytes());
        let block = read_block(&mut lines);
        assert_eq!(block.program.as_deref(), Some("blastp"));
        assert_eq!(block.version.as_deref(), Some("2.2.26+"));
        assert_eq!(block.hits_found, Some(1));
        assert_eq!(block.fields.map(|f| f.len()), Some(4));
        assert!(lines.next_line().unwrap().is_none());
    }

    #[test]
    fn test_trailer_has_no_query() {
        let block = read_first("# BLAST processed 3 queries").unwrap().unwrap();
        assert!(block.query_id.is_none());
        assert!(block.program.is_none());
    }

    #[test]
    fn test_data_row_is_not_a_block() {
        let err = read_first("\nq1\th1\t1e-05\t34.7\n").unwrap_err();
        assert!(matches!(err, ParseError::Structure { line: 2, .. }));
        assert!(read_first("").unwrap().is_none());
    }

    #[test]
    fn test_unknown_field_label() {
        let block = read_first("# Fields: query id, subject id, BTOP").unwrap().unwrap();
        let columns = block.column_set().unwrap();
        assert_eq!(columns.len(), 3);
        assert_eq!(
            columns.iter().last(),
            Some(&Column::Unknown("BTOP".to_string()))
        );
    }

    #[test]
    fn test_empty_query_line() {
        let err = read_first("# TBLASTN 2.2.26+\n# Query:   ").unwrap_err();
        assert!(matches!(err, ParseError::Structure { line: 2, .. }));
    }

    #[test]
    fn test_parse_program() {
        assert_eq!(
            parse_program("TBLASTN 2.2.26+"),
            Some(("tblastn".to_string(), "2.2.26+".to_string()))
        );
        assert_eq!(
            parse_program("BLASTN 2.2.18 [Mar-02-2008]"),
            Some(("blastn".to_string(), "2.2.18".to_string()))
        );
        assert_eq!(parse_program("BLAST processed 3 queries"), None);
        assert_eq!(parse_program("3 hits found"), None);
        assert_eq!(parse_program("Query: x"), None);
    }

    #[test]
    fn test_program_line_needs_known_program() {
        assert!(is_program_line("TBLASTN 2.2.26+"));
        assert!(is_program_line("DELTABLAST 2.2.26+"));
        assert!(!is_program_line("Note 2 sequences masked"));
        assert!(!is_program_line("Iteration: 1"));
    }

    #[test]
    fn test_parse_hits_found() {
        assert_eq!(parse_hits_found("0 hits found"), Some(0));
        assert_eq!(parse_hits_found("12 hits found"), Some(12));
        assert_eq!(parse_hits_found("many hits found"), None);
    }

    #[test]
    fn test_metadata_carry_over() {
        let mut search = SearchMetadata::default();
        let first = read_first("# TBLASTN 2.2.26+\n# Query: q1\n# RID: X76FDCG9016\n# Database: refseq_rna")
            .unwrap()
            .unwrap();
        search.update(&first);

        let second = read_first("# Query: q2").unwrap().unwrap();
        search.update(&second);

        let mut result = QueryResult::new("q2");
        search.apply(&mut result);
        assert_eq!(result.program.as_deref(), Some("tblastn"));
        assert_eq!(result.version.as_deref(), Some("2.2.26+"));
        assert_eq!(result.target.as_deref(), Some("refseq_rna"));
        assert_eq!(result.rid.as_deref(), Some("X76FDCG9016"));
    }
}
