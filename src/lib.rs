//! # blast-tab
//!
//! A streaming parser for BLAST tabular output (`-outfmt 6` and `-outfmt 7`).
//!
//! BLAST writes one row per local alignment. Rows for the same query are adjacent,
//! and rows for the same database sequence within a query are adjacent too. This
//! crate regroups those flat rows into a three-level model, one query at a time:
//!
//! - [`QueryResult`]: a query and its hits, in first-appearance order
//! - [`Hit`]: one matched database sequence and its HSPs, in row order
//! - [`Hsp`]: one aligned segment with its coordinates and scores
//!
//! ## Features
//!
//! - **Both variants**: plain rows, or rows bracketed by `#` comment blocks
//! - **Custom columns**: any `-outfmt` column list, from `# Fields:` or the caller
//! - **Strict grouping**: non-contiguous queries or hits, wrong row counts, and
//!   malformed rows are errors, never silently regrouped
//! - **Constant memory**: only the open query and one row of lookahead are held
//!
//! ## Example
//!
//! ```rust
//! use blast_tab::parsing::{parse_text, ParseOptions};
//!
//! let text = concat!(
//!     "# BLASTN 2.2.26+\n",
//!     "# Query: q1\n",
//!     "# Database: nt\n",
//!     "# Fields: query id, subject id, evalue, bit score\n",
//!     "# 2 hits found\n",
//!     "q1\th1\t1e-05\t34.7\n",
//!     "q1\th1\t4e-05\t32.7\n",
//! );
//!
//! let (results, warnings) = parse_text(text, ParseOptions::default()).unwrap();
//! assert!(warnings.is_empty());
//! assert_eq!(results[0].program.as_deref(), Some("blastn"));
//! assert_eq!(results[0][0].len(), 2);
//! assert_eq!(results[0][0][0].evalue, Some(0.00001));
//! ```
//!
//! ## Modules
//!
//! - [`core`]: the query/hit/HSP result model
//! - [`parsing`]: column registry, comment blocks and the streaming reader
//! - [`utils`]: validation helpers

pub mod core;
pub mod parsing;
pub mod utils;

// Re-export commonly used types for convenience
pub use core::hit::Hit;
pub use core::hsp::Hsp;
pub use core::query_result::QueryResult;
pub use parsing::{
    parse_text, read_one, read_text, BlastTabReader, InputFormat, ParseError, ParseOptions,
    ParseWarning,
};
