//! Streaming parser for BLAST tabular output.
//!
//! Two input variants are supported:
//!
//! - **Plain** (`-outfmt 6`): bare tab-separated rows. Query and hit boundaries are
//!   inferred from changes in the identity columns.
//! - **Commented** (`-outfmt 7`): each query's rows are preceded by a block of `#`
//!   lines naming the program, query, database, column order and row count.
//!
//! ```text
//! # TBLASTN 2.2.26+
//! # Query: gi|16080617|ref|NP_391444.1| membrane bound lipoprotein
//! # Database: db/minirefseq_mrna
//! # Fields: query id, subject id, % identity, alignment length, ...
//! # 3 hits found
//! gi|16080617|ref|NP_391444.1|	gi|145479850|ref|XM_001425911.1|	34.88	43	...
//! ```
//!
//! ## Example
//!
//! ```rust,no_run
//! use blast_tab::parsing::{BlastTabReader, ParseOptions};
//!
//! let reader = BlastTabReader::from_path("hits.tab", ParseOptions::default()).unwrap();
//! for qresult in reader {
//!     let qresult = qresult.unwrap();
//!     println!("{}: {} hits", qresult.id, qresult.len());
//! }
//! ```
//!
//! The pieces, leaves first:
//!
//! - [`fields`]: column registry and value conversion
//! - [`lines`]: non-blank input lines with one line of pushback
//! - [`row`]: splits one line into typed values
//! - [`comments`]: reads one `#` block into query metadata
//! - [`assembler`]: groups rows into hits and builds the result
//! - [`reader`]: the pull-based state machine tying it together

use thiserror::Error;

pub mod assembler;
pub mod comments;
pub mod fields;
pub mod lines;
pub mod options;
pub mod reader;
pub mod row;

pub use options::{InputFormat, ParseOptions};
pub use reader::{parse_text, read_one, read_text, BlastTabReader};

#[derive(Error, Debug)]
pub enum ParseError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Line {line}: expected {expected} tab-separated fields, found {found}")]
    FieldCount {
        line: usize,
        expected: usize,
        found: usize,
    },

    #[error("Line {line}: invalid value '{value}' for column '{column}': {reason}")]
    InvalidValue {
        line: usize,
        column: String,
        value: String,
        reason: String,
    },

    #[error("Line {line}: {message}")]
    Structure { line: usize, message: String },

    #[error("Query '{query}' declared {declared} hits but {found} rows were read")]
    RowCountMismatch {
        query: String,
        declared: usize,
        found: usize,
    },

    #[error("Expected exactly one query result, found {0}")]
    NotSingle(usize),
}

impl ParseError {
    pub(crate) fn structure(line: usize, message: impl Into<String>) -> Self {
        Self::Structure {
            line,
            message: message.into(),
        }
    }

    /// True for errors about how the input is laid out, as opposed to the content
    /// of an individual value
    #[must_use]
    pub fn is_structural(&self) -> bool {
        matches!(
            self,
            Self::FieldCount { .. } | Self::Structure { .. } | Self::RowCountMismatch { .. }
        )
    }
}

/// Non-fatal problems noticed while parsing. Collected by the reader, never raised.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseWarning {
    /// A column the registry does not know. Its values are kept as raw text.
    UnrecognizedColumn { column: String, line: usize },
}

impl std::fmt::Display for ParseWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnrecognizedColumn { column, line } => {
                write!(f, "Line {line}: unrecognized column '{column}', values kept as text")
            }
        }
    }
}
