use std::ops::Index;

use serde::{Deserialize, Serialize};

use crate::core::hit::Hit;

/// All hits reported for one query sequence.
///
/// Hits are kept in the order their first row appeared in the input. Program,
/// target, version and request id only come from commented (`-outfmt 7`) input;
/// the remaining metadata comes from optional query columns such as `qlen`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryResult {
    /// Query identifier
    pub id: String,

    /// Free text following the identifier on the `# Query:` line
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Search program, lowercase (e.g. "tblastn")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub program: Option<String>,

    /// Searched database
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,

    /// Program version (e.g. "2.2.26+")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,

    /// Remote request id, present for web BLAST output
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rid: Option<String>,

    /// Full length of the query sequence (`qlen`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seq_len: Option<u64>,

    /// Accession (`qacc`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accession: Option<String>,

    /// Accession with version (`qaccver`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accession_version: Option<String>,

    /// GI number (`qgi`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gi: Option<String>,

    /// Hits, in order of first appearance
    pub hits: Vec<Hit>,
}

impl QueryResult {
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            description: None,
            program: None,
            target: None,
            version: None,
            rid: None,
            seq_len: None,
            accession: None,
            accession_version: None,
            gi: None,
            hits: Vec::new(),
        }
    }

    /// Number of hits
    #[must_use]
    pub fn len(&self) -> usize {
        self.hits.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.hits.is_empty()
    }

    /// Look up a hit by its identifier
    #[must_use]
    pub fn hit(&self, id: &str) -> Option<&Hit> {
        self.hits.iter().find(|h| h.id == id)
    }

    /// Total number of HSPs across all hits
    #[must_use]
    pub fn hsp_count(&self) -> usize {
        self.hits.iter().map(Hit::len).sum()
    }

    /// Iterate over hit identifiers in order
    pub fn hit_ids(&self) -> impl Iterator<Item = &str> {
        self.hits.iter().map(|h| h.id.as_str())
    }
}

impl Index<usize> for QueryResult {
    type Output = Hit;

    fn index(&self, index: usize) -> &Self::Output {
        &self.hits[index]
    }
}
