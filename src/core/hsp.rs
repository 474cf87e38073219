use std::ops::Range;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// A single high-scoring segment pair: one local alignment between a query and a hit.
///
/// Every numeric field is optional because the tabular format lets the user pick
/// which columns are written. Coordinates are kept exactly as BLAST writes them
/// (1-based, inclusive, `start > end` on the minus strand); use [`Hsp::query_range`]
/// and [`Hsp::hit_range`] for 0-based half-open ranges.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hsp {
    /// Identifier of the query this segment belongs to
    pub query_id: String,

    /// Identifier of the hit this segment belongs to
    pub hit_id: String,

    /// Percentage of identical positions (`pident`), as written (0-100)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ident_pct: Option<f64>,

    /// Alignment length (`length`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aln_span: Option<u64>,

    /// Number of mismatches (`mismatch`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mismatch_num: Option<u64>,

    /// Number of gap openings (`gapopen`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gapopen_num: Option<u64>,

    /// Start of the alignment on the query (`qstart`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query_start: Option<u64>,

    /// End of the alignment on the query (`qend`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query_end: Option<u64>,

    /// Start of the alignment on the hit (`sstart`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hit_start: Option<u64>,

    /// End of the alignment on the hit (`send`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hit_end: Option<u64>,

    /// Expect value (`evalue`); smaller is more significant
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub evalue: Option<f64>,

    /// Bit score (`bitscore`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bitscore: Option<f64>,

    /// Raw alignment score (`score`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bitscore_raw: Option<u64>,

    /// Number of identical positions (`nident`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ident_num: Option<u64>,

    /// Number of positive-scoring positions (`positive`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pos_num: Option<u64>,

    /// Total number of gaps (`gaps`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gap_num: Option<u64>,

    /// Percentage of positive-scoring positions (`ppos`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pos_pct: Option<f64>,

    /// Query reading frame (`qframe`, or the first half of `frames`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query_frame: Option<i32>,

    /// Hit reading frame (`sframe`, or the second half of `frames`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hit_frame: Option<i32>,

    /// Aligned part of the query sequence (`qseq`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query_seq: Option<String>,

    /// Aligned part of the hit sequence (`sseq`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hit_seq: Option<String>,

    /// Raw values of columns the parser does not recognize, in column order
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub extra: IndexMap<String, String>,
}

impl Hsp {
    pub fn new(query_id: impl Into<String>, hit_id: impl Into<String>) -> Self {
        Self {
            query_id: query_id.into(),
            hit_id: hit_id.into(),
            ident_pct: None,
            aln_span: None,
            mismatch_num: None,
            gapopen_num: None,
            query_start: None,
            query_end: None,
            hit_start: None,
            hit_end: None,
            evalue: None,
            bitscore: None,
            bitscore_raw: None,
            ident_num: None,
            pos_num: None,
            gap_num: None,
            pos_pct: None,
            query_frame: None,
            hit_frame: None,
            query_seq: None,
            hit_seq: None,
            extra: IndexMap::new(),
        }
    }

    /// 0-based half-open range covered on the query, if both ends are known
    #[must_use]
    pub fn query_range(&self) -> Option<Range<u64>> {
        to_range(self.query_start?, self.query_end?)
    }

    /// 0-based half-open range covered on the hit, if both ends are known
    #[must_use]
    pub fn hit_range(&self) -> Option<Range<u64>> {
        to_range(self.hit_start?, self.hit_end?)
    }

    /// True when the hit coordinates run backwards (minus strand)
    #[must_use]
    pub fn is_hit_reversed(&self) -> bool {
        matches!((self.hit_start, self.hit_end), (Some(s), Some(e)) if s > e)
    }
}

/// Convert 1-based inclusive coordinates, possibly reversed, to a 0-based half-open range.
/// A zero coordinate has no 0-based counterpart.
fn to_range(start: u64, end: u64) -> Option<Range<u64>> {
    let (lo, hi) = if start <= end { (start, end) } else { (end, start) };
    if lo == 0 {
        return None;
    }
    Some(lo - 1..hi)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_range_forward() {
        let mut hsp = Hsp::new("q1", "h1");
        hsp.query_start = Some(31);
        hsp.query_end = Some(73);
        assert_eq!(hsp.query_range(), Some(30..73));
    }

    #[test]
    fn test_hit_range_reversed() {
        let mut hsp = Hsp::new("q1", "h1");
        hsp.hit_start = Some(500);
        hsp.hit_end = Some(401);
        assert!(hsp.is_hit_reversed());
        assert_eq!(hsp.hit_range(), Some(400..500));
    }

    #[test]
    fn test_range_missing_coordinates() {
        let mut hsp = Hsp::new("q1", "h1");
        hsp.query_start = Some(1);
        assert_eq!(hsp.query_range(), None);
        assert_eq!(hsp.hit_range(), None);
        assert!(!hsp.is_hit_reversed());
    }

    #[test]
    fn test_range_zero_coordinate() {
        let mut hsp = Hsp::new("q1", "h1");
        hsp.query_start = Some(0);
        hsp.query_end = Some(10);
        assert_eq!(hsp.query_range(), None);
    }
}
