//! Hierarchical search result model.
//!
//! A BLAST run is reported as three nested levels:
//!
//! - [`QueryResult`]: one query sequence and everything it matched
//! - [`Hit`]: one database sequence matched by the query
//! - [`Hsp`]: one local alignment (high-scoring segment pair) between the two
//!
//! | Level | Keyed by | Ordered by |
//! |-------|----------|------------|
//! | `QueryResult` | query id | input order |
//! | `Hit` | hit id | first row seen for the hit |
//! | `Hsp` | - | row order |
//!
//! Hits and HSPs carry the identifiers of their parents as plain strings; they never
//! point back into the owning structure.
//!
//! [`QueryResult`]: query_result::QueryResult
//! [`Hit`]: hit::Hit
//! [`Hsp`]: hsp::Hsp

pub mod hit;
pub mod hsp;
pub mod query_result;
