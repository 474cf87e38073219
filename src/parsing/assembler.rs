use std::collections::HashSet;

use crate::core::hit::Hit;
use crate::core::hsp::Hsp;
use crate::core::query_result::QueryResult;
use crate::parsing::fields::Field;
use crate::parsing::row::Row;
use crate::parsing::ParseError;

/// Accumulates the rows of one query into hits and HSPs.
///
/// Rows for the same hit must be adjacent: a new hit identity closes the open hit,
/// and a closed hit cannot be reopened.
#[derive(Debug)]
pub struct QueryAssembler {
    result: QueryResult,
    open_hit: Option<Hit>,
    closed_hits: HashSet<String>,
    row_query_id: Option<String>,
    rows: usize,
}

impl QueryAssembler {
    #[must_use]
    pub fn new(result: QueryResult) -> Self {
        Self {
            result,
            open_hit: None,
            closed_hits: HashSet::new(),
            row_query_id: None,
            rows: 0,
        }
    }

    #[must_use]
    pub fn id(&self) -> &str {
        &self.result.id
    }

    /// Number of rows added so far
    #[must_use]
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Query identity carried by the first row, if its columns include one
    #[must_use]
    pub fn row_query_id(&self) -> Option<&str> {
        self.row_query_id.as_deref()
    }

    /// Add a row as an HSP of the open hit, or of a new hit if its identity differs
    ///
    /// # Errors
    ///
    /// Returns `ParseError::Structure` if the row belongs to a hit that was already
    /// closed by rows of another hit.
    pub fn push(&mut self, row: Row) -> Result<(), ParseError> {
        if self.rows == 0 {
            self.row_query_id.clone_from(&row.query_id);
        }
        fill_query(&mut self.result, &row);

        let same_hit = self.open_hit.as_ref().is_some_and(|h| h.id == row.hit_id);
        if !same_hit {
            self.close_hit();
            if self.closed_hits.contains(&row.hit_id) {
                return Err(ParseError::structure(
                    row.line,
                    format!(
                        "rows for hit '{}' of query '{}' are not contiguous",
                        row.hit_id, self.result.id
                    ),
                ));
            }
            self.open_hit = Some(Hit::new(row.hit_id.clone(), self.result.id.clone()));
        }

        if let Some(hit) = self.open_hit.as_mut() {
            fill_hit(hit, &row);
            hit.hsps.push(build_hsp(row, &self.result.id));
        }
        self.rows += 1;
        Ok(())
    }

    /// Close the open hit and return the finished result
    #[must_use]
    pub fn finish(mut self) -> QueryResult {
        self.close_hit();
        self.result
    }

    fn close_hit(&mut self) {
        if let Some(hit) = self.open_hit.take() {
            self.closed_hits.insert(hit.id.clone());
            self.result.hits.push(hit);
        }
    }
}

fn fill<T>(slot: &mut Option<T>, value: Option<T>) {
    if slot.is_none() {
        *slot = value;
    }
}

fn fill_text(slot: &mut Option<String>, row: &Row, field: Field) {
    if slot.is_none() {
        *slot = row.text(field).map(str::to_string);
    }
}

fn fill_query(result: &mut QueryResult, row: &Row) {
    fill(&mut result.seq_len, row.count(Field::QueryLength));
    fill_text(&mut result.accession, row, Field::QueryAcc);
    fill_text(&mut result.accession_version, row, Field::QueryAccVer);
    fill_text(&mut result.gi, row, Field::QueryGi);
}

fn fill_hit(hit: &mut Hit, row: &Row) {
    fill(&mut hit.seq_len, row.count(Field::SubjectLength));
    fill_text(&mut hit.description, row, Field::SubjectTitle);
    fill_text(&mut hit.id_all, row, Field::SubjectAllSeqId);
    fill_text(&mut hit.accession, row, Field::SubjectAcc);
    fill_text(&mut hit.accession_version, row, Field::SubjectAccVer);
    fill_text(&mut hit.accession_all, row, Field::SubjectAllAcc);
    fill_text(&mut hit.gi, row, Field::SubjectGi);
    fill_text(&mut hit.gi_all, row, Field::SubjectAllGi);
}

fn build_hsp(mut row: Row, query_id: &str) -> Hsp {
    let mut hsp = Hsp::new(query_id, row.hit_id.clone());

    hsp.ident_pct = row.float(Field::PercentIdentity);
    hsp.aln_span = row.count(Field::Length);
    hsp.mismatch_num = row.count(Field::Mismatch);
    hsp.gapopen_num = row.count(Field::GapOpen);
    hsp.query_start = row.count(Field::QueryStart);
    hsp.query_end = row.count(Field::QueryEnd);
    hsp.hit_start = row.count(Field::SubjectStart);
    hsp.hit_end = row.count(Field::SubjectEnd);
    hsp.evalue = row.float(Field::Evalue);
    hsp.bitscore = row.float(Field::BitScore);
    hsp.bitscore_raw = row.count(Field::Score);
    hsp.ident_num = row.count(Field::Identical);
    hsp.pos_num = row.count(Field::Positive);
    hsp.gap_num = row.count(Field::Gaps);
    hsp.pos_pct = row.float(Field::PercentPositive);

    // qframe/sframe win over the combined column when both are present
    let (query_frame, hit_frame) = row.frames();
    hsp.query_frame = row.signed(Field::QueryFrame).or(query_frame);
    hsp.hit_frame = row.signed(Field::SubjectFrame).or(hit_frame);

    hsp.query_seq = row.take_text(Field::QuerySeq);
    hsp.hit_seq = row.take_text(Field::SubjectSeq);
    hsp.extra = row.extra;
    hsp
}
