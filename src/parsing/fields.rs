//! Registry of the tabular columns the parser understands.
//!
//! Each column is known by two spellings: the short code passed to
//! `-outfmt "6 qseqid sseqid ..."` and the label BLAST+ writes on the
//! `# Fields:` comment line. Both map to a [`Field`], which carries the value
//! kind and a pure conversion function.
//!
//! | Kind | Example | Stored as |
//! |------|---------|-----------|
//! | text | `gi\|16080617\|` | `String` |
//! | count | `1743` | `u64` |
//! | signed | `-2` | `i32` |
//! | float | `34.7` | `f64` |
//! | percentage | `34.88` | `f64`, not divided by 100 |
//! | scientific | `1e-05`, `0.0`, `e-100` | `f64` |
//! | frame pair | `0/1` | `(i32, i32)` |

use serde::{Deserialize, Serialize};

/// Columns written by `-outfmt 6` when no column list is given.
pub const DEFAULT_COLUMNS: [Field; 12] = [
    Field::QuerySeqId,
    Field::SubjectSeqId,
    Field::PercentIdentity,
    Field::Length,
    Field::Mismatch,
    Field::GapOpen,
    Field::QueryStart,
    Field::QueryEnd,
    Field::SubjectStart,
    Field::SubjectEnd,
    Field::Evalue,
    Field::BitScore,
];

/// Columns that can identify the query of a row, in order of preference
pub const QUERY_ID_FIELDS: [Field; 4] = [
    Field::QuerySeqId,
    Field::QueryAccVer,
    Field::QueryAcc,
    Field::QueryGi,
];

/// Columns that can identify the hit of a row, in order of preference
pub const HIT_ID_FIELDS: [Field; 5] = [
    Field::SubjectSeqId,
    Field::SubjectAccVer,
    Field::SubjectAcc,
    Field::SubjectGi,
    Field::SubjectAllSeqId,
];

/// A recognized tabular column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    QuerySeqId,
    QueryGi,
    QueryAcc,
    QueryAccVer,
    QueryLength,
    SubjectSeqId,
    SubjectAllSeqId,
    SubjectGi,
    SubjectAllGi,
    SubjectAcc,
    SubjectAccVer,
    SubjectAllAcc,
    SubjectLength,
    SubjectTitle,
    QueryStart,
    QueryEnd,
    SubjectStart,
    SubjectEnd,
    QuerySeq,
    SubjectSeq,
    Evalue,
    BitScore,
    Score,
    Length,
    PercentIdentity,
    Identical,
    Mismatch,
    Positive,
    GapOpen,
    Gaps,
    PercentPositive,
    Frames,
    QueryFrame,
    SubjectFrame,
}

/// How a column's raw text is interpreted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueKind {
    Text,
    Count,
    Signed,
    Float,
    Percentage,
    Scientific,
    FramePair,
}

/// A converted column value
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Text(String),
    Count(u64),
    Signed(i32),
    Float(f64),
    FramePair(i32, i32),
}

/// Registry entry for one column
#[derive(Debug)]
pub struct FieldSpec {
    pub field: Field,
    /// `-outfmt` specifier, e.g. "qseqid"
    pub code: &'static str,
    /// `# Fields:` label, e.g. "query id"
    pub label: &'static str,
    /// Human-readable meaning of the column
    pub name: &'static str,
    pub kind: ValueKind,
    pub convert: fn(&str) -> Result<Value, String>,
}

macro_rules! spec {
    ($field:ident, $code:literal, $label:literal, $name:literal, $kind:ident, $convert:ident) => {
        FieldSpec {
            field: Field::$field,
            code: $code,
            label: $label,
            name: $name,
            kind: ValueKind::$kind,
            convert: $convert,
        }
    };
}

/// The registry. Order matches the [`Field`] declaration order.
pub static REGISTRY: [FieldSpec; 34] = [
    spec!(QuerySeqId, "qseqid", "query id", "query id", Text, to_text),
    spec!(QueryGi, "qgi", "query gi", "query gi", Text, to_text),
    spec!(QueryAcc, "qacc", "query acc.", "query accession", Text, to_text),
    spec!(QueryAccVer, "qaccver", "query acc.ver", "query accession.version", Text, to_text),
    spec!(QueryLength, "qlen", "query length", "query sequence length", Count, to_count),
    spec!(SubjectSeqId, "sseqid", "subject id", "hit id", Text, to_text),
    spec!(SubjectAllSeqId, "sallseqid", "subject ids", "all hit ids", Text, to_text),
    spec!(SubjectGi, "sgi", "subject gi", "hit gi", Text, to_text),
    spec!(SubjectAllGi, "sallgi", "subject gis", "all hit gis", Text, to_text),
    spec!(SubjectAcc, "sacc", "subject acc.", "hit accession", Text, to_text),
    spec!(SubjectAccVer, "saccver", "subject acc.ver", "hit accession.version", Text, to_text),
    spec!(SubjectAllAcc, "sallacc", "subject accs.", "all hit accessions", Text, to_text),
    spec!(SubjectLength, "slen", "subject length", "hit sequence length", Count, to_count),
    spec!(SubjectTitle, "stitle", "subject title", "hit description", Text, to_text),
    spec!(QueryStart, "qstart", "q. start", "query start", Count, to_count),
    spec!(QueryEnd, "qend", "q. end", "query end", Count, to_count),
    spec!(SubjectStart, "sstart", "s. start", "hit start", Count, to_count),
    spec!(SubjectEnd, "send", "s. end", "hit end", Count, to_count),
    spec!(QuerySeq, "qseq", "query seq", "aligned query sequence", Text, to_text),
    spec!(SubjectSeq, "sseq", "subject seq", "aligned hit sequence", Text, to_text),
    spec!(Evalue, "evalue", "evalue", "e-value", Scientific, to_scientific),
    spec!(BitScore, "bitscore", "bit score", "bit score", Float, to_float),
    spec!(Score, "score", "score", "raw score", Count, to_count),
    spec!(Length, "length", "alignment length", "alignment span", Count, to_count),
    spec!(PercentIdentity, "pident", "% identity", "identity percentage", Percentage, to_float),
    spec!(Identical, "nident", "identical", "identical count", Count, to_count),
    spec!(Mismatch, "mismatch", "mismatches", "mismatch count", Count, to_count),
    spec!(Positive, "positive", "positives", "positive count", Count, to_count),
    spec!(GapOpen, "gapopen", "gap opens", "gap open count", Count, to_count),
    spec!(Gaps, "gaps", "gaps", "gap count", Count, to_count),
    spec!(PercentPositive, "ppos", "% positives", "positive percentage", Percentage, to_float),
    spec!(Frames, "frames", "query/sbjct frames", "query and hit frames", FramePair, to_frame_pair),
    spec!(QueryFrame, "qframe", "query frame", "query frame", Signed, to_signed),
    spec!(SubjectFrame, "sframe", "sbjct frame", "hit frame", Signed, to_signed),
];

impl Field {
    /// Look up a column by its `-outfmt` code
    #[must_use]
    pub fn from_code(code: &str) -> Option<Self> {
        REGISTRY.iter().find(|s| s.code == code).map(|s| s.field)
    }

    /// Look up a column by its `# Fields:` label
    #[must_use]
    pub fn from_label(label: &str) -> Option<Self> {
        let label = label.trim();
        REGISTRY.iter().find(|s| s.label == label).map(|s| s.field)
    }

    #[must_use]
    pub fn spec(self) -> &'static FieldSpec {
        &REGISTRY[self as usize]
    }

    #[must_use]
    pub fn code(self) -> &'static str {
        self.spec().code
    }

    #[must_use]
    pub fn name(self) -> &'static str {
        self.spec().name
    }

    #[must_use]
    pub fn kind(self) -> ValueKind {
        self.spec().kind
    }

    /// Convert a raw column value
    ///
    /// # Errors
    ///
    /// Returns a description of the problem if the text is not a valid value of
    /// this column's kind.
    pub fn convert(self, raw: &str) -> Result<Value, String> {
        (self.spec().convert)(raw)
    }
}

impl std::fmt::Display for Field {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code())
    }
}

fn to_text(raw: &str) -> Result<Value, String> {
    Ok(Value::Text(raw.to_string()))
}

fn to_count(raw: &str) -> Result<Value, String> {
    raw.trim()
        .parse::<u64>()
        .map(Value::Count)
        .map_err(|e| format!("expected a non-negative integer ({e})"))
}

fn to_signed(raw: &str) -> Result<Value, String> {
    parse_signed(raw).map(Value::Signed)
}

fn to_float(raw: &str) -> Result<Value, String> {
    parse_float(raw).map(Value::Float)
}

/// E-values. Legacy BLAST drops the mantissa when it is 1 ("e-100").
fn to_scientific(raw: &str) -> Result<Value, String> {
    let raw = raw.trim();
    if raw.starts_with(['e', 'E']) {
        parse_float(&format!("1{raw}")).map(Value::Float)
    } else {
        parse_float(raw).map(Value::Float)
    }
}

fn to_frame_pair(raw: &str) -> Result<Value, String> {
    let (query, hit) = raw
        .split_once('/')
        .ok_or_else(|| "expected frames as '<query>/<hit>'".to_string())?;
    Ok(Value::FramePair(parse_signed(query)?, parse_signed(hit)?))
}

fn parse_signed(raw: &str) -> Result<i32, String> {
    raw.trim()
        .parse::<i32>()
        .map_err(|e| format!("expected an integer ({e})"))
}

fn parse_float(raw: &str) -> Result<f64, String> {
    let value: f64 = raw
        .trim()
        .parse()
        .map_err(|e| format!("expected a number ({e})"))?;
    if value.is_finite() {
        Ok(value)
    } else {
        Err("expected a finite number".to_string())
    }
}
