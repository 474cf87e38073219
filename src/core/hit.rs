use std::ops::Index;

use serde::{Deserialize, Serialize};

use crate::core::hsp::Hsp;

/// One database sequence matched by a query, with its aligned segments in input order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hit {
    /// Hit identifier (`sseqid`, or the first available hit identity column)
    pub id: String,

    /// Identifier of the query that produced this hit
    pub query_id: String,

    /// Hit title (`stitle`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// All identifiers of the hit sequence (`sallseqid`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id_all: Option<String>,

    /// Accession (`sacc`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accession: Option<String>,

    /// Accession with version (`saccver`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accession_version: Option<String>,

    /// All accessions (`sallacc`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accession_all: Option<String>,

    /// GI number (`sgi`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gi: Option<String>,

    /// All GI numbers (`sallgi`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gi_all: Option<String>,

    /// Full length of the hit sequence (`slen`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seq_len: Option<u64>,

    /// Aligned segments, in the order their rows appeared
    pub hsps: Vec<Hsp>,
}

impl Hit {
    pub fn new(id: impl Into<String>, query_id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            query_id: query_id.into(),
            description: None,
            id_all: None,
            accession: None,
            accession_version: None,
            accession_all: None,
            gi: None,
            gi_all: None,
            seq_len: None,
            hsps: Vec::new(),
        }
    }

    /// Number of HSPs in this hit
    #[must_use]
    pub fn len(&self) -> usize {
        self.hsps.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.hsps.is_empty()
    }

    /// Best (smallest) e-value across all HSPs
    #[must_use]
    pub fn best_evalue(&self) -> Option<f64> {
        self.hsps
            .iter()
            .filter_map(|h| h.evalue)
            .min_by(f64::total_cmp)
    }
}

impl Index<usize> for Hit {
    type Output = Hsp;

    fn index(&self, index: usize) -> &Self::Output {
        &self.hsps[index]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hit_len_and_index() {
        let mut hit = Hit::new("h1", "q1");
        assert!(hit.is_empty());

        hit.hsps.push(Hsp::new("q1", "h1"));
        let mut second = Hsp::new("q1", "h1");
        second.bitscore = Some(32.7);
        hit.hsps.push(second);

        assert_eq!(hit.len(), 2);
        assert_eq!(hit[1].bitscore, Some(32.7));
    }

    #[test]
    fn test_best_evalue() {
        let mut hit = Hit::new("h1", "q1");
        assert_eq!(hit.best_evalue(), None);

        for evalue in [4e-05, 2e-67, 0.1] {
            let mut hsp = Hsp::new("q1", "h1");
            hsp.evalue = Some(evalue);
            hit.hsps.push(hsp);
        }
        assert_eq!(hit.best_evalue(), Some(2e-67));
    }
}
