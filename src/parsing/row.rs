use std::collections::HashSet;

use indexmap::IndexMap;
use tracing::warn;

use crate::parsing::fields::{Field, Value, DEFAULT_COLUMNS, HIT_ID_FIELDS, QUERY_ID_FIELDS};
use crate::parsing::{ParseError, ParseWarning};
use crate::utils::validation::is_valid_identifier;

/// One column of the active layout
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Column {
    Known(Field),
    /// Not in the registry; the code or label as written
    Unknown(String),
}

impl Column {
    /// Resolve an `-outfmt` column code
    #[must_use]
    pub fn from_code(code: &str) -> Self {
        Field::from_code(code).map_or_else(|| Self::Unknown(code.to_string()), Self::Known)
    }

    /// Resolve a `# Fields:` label
    #[must_use]
    pub fn from_label(label: &str) -> Self {
        Field::from_label(label).map_or_else(|| Self::Unknown(label.trim().to_string()), Self::Known)
    }

    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Known(field) => field.code(),
            Self::Unknown(name) => name,
        }
    }
}

/// The ordered columns rows are currently split against
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnSet {
    columns: Vec<Column>,
}

impl Default for ColumnSet {
    fn default() -> Self {
        Self::new(DEFAULT_COLUMNS.iter().copied().map(Column::Known).collect())
    }
}

impl ColumnSet {
    #[must_use]
    pub fn new(columns: Vec<Column>) -> Self {
        Self { columns }
    }

    #[must_use]
    pub fn from_codes<S: AsRef<str>>(codes: &[S]) -> Self {
        Self::new(codes.iter().map(|c| Column::from_code(c.as_ref())).collect())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Column> {
        self.columns.iter()
    }

    #[must_use]
    pub fn contains(&self, field: Field) -> bool {
        self.columns.contains(&Column::Known(field))
    }

    /// True if some column identifies the query of each row
    #[must_use]
    pub fn has_query_id(&self) -> bool {
        QUERY_ID_FIELDS.iter().any(|f| self.contains(*f))
    }
}

/// Unrecognized-column warnings, deduplicated over a whole parse
#[derive(Debug, Default)]
pub struct WarningLog {
    seen: HashSet<String>,
    warnings: Vec<ParseWarning>,
}

impl WarningLog {
    /// Record an unrecognized column; only its first occurrence is kept
    pub fn unrecognized(&mut self, column: &str, line: usize) {
        if self.seen.contains(column) {
            return;
        }
        self.seen.insert(column.to_string());
        warn!(column = %column, line, "Unrecognized column, keeping values as text");
        self.warnings.push(ParseWarning::UnrecognizedColumn {
            column: column.to_string(),
            line,
        });
    }

    #[must_use]
    pub fn as_slice(&self) -> &[ParseWarning] {
        &self.warnings
    }

    /// Drain collected warnings. Columns already reported stay suppressed.
    pub fn take(&mut self) -> Vec<ParseWarning> {
        std::mem::take(&mut self.warnings)
    }
}

/// One data line, split and converted
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    /// 1-based line number
    pub line: usize,
    /// Value of the first query identity column present, if any
    pub query_id: Option<String>,
    /// Value of the first hit identity column present
    pub hit_id: String,
    pub values: IndexMap<Field, Value>,
    /// Raw values of unrecognized columns
    pub extra: IndexMap<String, String>,
}

impl Row {
    /// Split a tab-delimited line against the active columns and convert each value
    ///
    /// # Errors
    ///
    /// Returns `ParseError::FieldCount` if the number of fields differs from the
    /// number of columns, `ParseError::InvalidValue` if a value cannot be
    /// converted, or `ParseError::Structure` if the row has no usable hit identifier.
    pub fn parse(
        line: &str,
        line_num: usize,
        columns: &ColumnSet,
        warnings: &mut WarningLog,
    ) -> Result<Self, ParseError> {
        let tokens: Vec<&str> = line.split('\t').collect();
        if tokens.len() != columns.len() {
            return Err(ParseError::FieldCount {
                line: line_num,
                expected: columns.len(),
                found: tokens.len(),
            });
        }

        let mut values = IndexMap::with_capacity(tokens.len());
        let mut extra = IndexMap::new();

        for (column, raw) in columns.iter().zip(tokens) {
            match column {
                Column::Known(field) => {
                    let value = field.convert(raw).map_err(|reason| ParseError::InvalidValue {
                        line: line_num,
                        column: field.code().to_string(),
                        value: raw.to_string(),
                        reason,
                    })?;
                    values.insert(*field, value);
                }
                Column::Unknown(name) => {
                    warnings.unrecognized(name, line_num);
                    extra.insert(name.clone(), raw.to_string());
                }
            }
        }

        let query_id = identity(&values, &QUERY_ID_FIELDS, "query", line_num)?;
        let hit_id = identity(&values, &HIT_ID_FIELDS, "hit", line_num)?.ok_or_else(|| {
            ParseError::structure(
                line_num,
                "no hit identifier column (sseqid, saccver, sacc, sgi or sallseqid)",
            )
        })?;

        Ok(Self {
            line: line_num,
            query_id,
            hit_id,
            values,
            extra,
        })
    }

    #[must_use]
    pub fn text(&self, field: Field) -> Option<&str> {
        match self.values.get(&field) {
            Some(Value::Text(s)) => Some(s),
            _ => None,
        }
    }

    #[must_use]
    pub fn count(&self, field: Field) -> Option<u64> {
        match self.values.get(&field) {
            Some(Value::Count(n)) => Some(*n),
            _ => None,
        }
    }

    #[must_use]
    pub fn float(&self, field: Field) -> Option<f64> {
        match self.values.get(&field) {
            Some(Value::Float(x)) => Some(*x),
            _ => None,
        }
    }

    #[must_use]
    pub fn signed(&self, field: Field) -> Option<i32> {
        match self.values.get(&field) {
            Some(Value::Signed(n)) => Some(*n),
            _ => None,
        }
    }

    /// Query and hit frames from the combined `frames` column
    #[must_use]
    pub fn frames(&self) -> (Option<i32>, Option<i32>) {
        match self.values.get(&Field::Frames) {
            Some(Value::FramePair(q, s)) => (Some(*q), Some(*s)),
            _ => (None, None),
        }
    }

    /// Move a text value out of the row
    pub fn take_text(&mut self, field: Field) -> Option<String> {
        match self.values.shift_remove(&field) {
            Some(Value::Text(s)) => Some(s),
            Some(other) => {
                self.values.insert(field, other);
                None
            }
            None => None,
        }
    }
}

fn identity(
    values: &IndexMap<Field, Value>,
    fields: &[Field],
    what: &str,
    line: usize,
) -> Result<Option<String>, ParseError> {
    let found = fields.iter().find_map(|f| match values.get(f) {
        Some(Value::Text(s)) => Some(s),
        _ => None,
    });
    match found {
        None => Ok(None),
        Some(id) if is_valid_identifier(id) => Ok(Some(id.clone())),
        Some(_) => Err(ParseError::structure(line, format!("empty {what} identifier"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ROW: &str = "gi|16080617|ref|NP_391444.1|\tgi|145479850|ref|XM_001425911.1|\t34.88\t43\t28\t0\t31\t73\t1744\t1872\t1e-05\t34.7";

    #[test]
    fn test_parse_default_row() {
        let mut warnings = WarningLog::default();
        let row = Row::parse(ROW, 7, &ColumnSet::default(), &mut warnings).unwrap();

        assert_eq!(row.line, 7);
        assert_eq!(row.query_id.as_deref(), Some("gi|16080617|ref|NP_391444.1|"));
        assert_eq!(row.hit_id, "gi|145479850|ref|XM_001425911.1|");
        assert_eq!(row.float(Field::PercentIdentity), Some(34.88));
        assert_eq!(row.count(Field::Length), Some(43));
        assert_eq!(row.count(Field::SubjectStart), Some(1744));
        assert_eq!(row.float(Field::Evalue), Some(0.00001));
        assert_eq!(row.float(Field::BitScore), Some(34.7));
        assert!(row.extra.is_empty());
        assert!(warnings.as_slice().is_empty());
    }

    #[test]
    fn test_values_keep_column_order() {
        let mut warnings = WarningLog::default();
        let row = Row::parse(ROW, 1, &ColumnSet::default(), &mut warnings).unwrap();
        let order: Vec<Field> = row.values.keys().copied().collect();
        assert_eq!(order, DEFAULT_COLUMNS.to_vec());
    }

    #[test]
    fn test_wrong_field_count() {
        let mut warnings = WarningLog::default();
        let err = Row::parse("q1\th1\t99.0", 3, &ColumnSet::default(), &mut warnings).unwrap_err();
        assert!(matches!(
            err,
            ParseError::FieldCount {
                line: 3,
                expected: 12,
                found: 3
            }
        ));
        assert!(err.is_structural());
    }

    #[test]
    fn test_invalid_value() {
        let mut warnings = WarningLog::default();
        let line = ROW.replace("\t43\t", "\tforty\t");
        let err = Row::parse(&line, 2, &ColumnSet::default(), &mut warnings).unwrap_err();
        match err {
            ParseError::InvalidValue { line, column, value, .. } => {
                assert_eq!(line, 2);
                assert_eq!(column, "length");
                assert_eq!(value, "forty");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_unknown_column_kept_as_text_and_warned_once() {
        let columns = ColumnSet::from_codes(&["qseqid", "sseqid", "btop"]);
        let mut warnings = WarningLog::default();

        let first = Row::parse("q1\th1\t43", 1, &columns, &mut warnings).unwrap();
        let second = Row::parse("q1\th2\t7AG5", 2, &columns, &mut warnings).unwrap();

        assert_eq!(first.extra.get("btop").map(String::as_str), Some("43"));
        assert_eq!(second.extra.get("btop").map(String::as_str), Some("7AG5"));
        assert_eq!(
            warnings.as_slice(),
            &[ParseWarning::UnrecognizedColumn {
                column: "btop".to_string(),
                line: 1
            }]
        );
    }

    #[test]
    fn test_take_warnings_keeps_suppression() {
        let columns = ColumnSet::from_codes(&["qseqid", "sseqid", "btop"]);
        let mut warnings = WarningLog::default();
        Row::parse("q1\th1\t43", 1, &columns, &mut warnings).unwrap();
        assert_eq!(warnings.take().len(), 1);
        Row::parse("q1\th1\t43", 2, &columns, &mut warnings).unwrap();
        assert!(warnings.take().is_empty());
    }

    #[test]
    fn test_identity_fallback_columns() {
        let columns = ColumnSet::from_codes(&["qaccver", "saccver", "evalue"]);
        let mut warnings = WarningLog::default();
        let row = Row::parse("NP_391444.1\tXM_001425911.1\t1e-05", 1, &columns, &mut warnings)
            .unwrap();
        assert_eq!(row.query_id.as_deref(), Some("NP_391444.1"));
        assert_eq!(row.hit_id, "XM_001425911.1");
    }

    #[test]
    fn test_missing_hit_identity() {
        let columns = ColumnSet::from_codes(&["qseqid", "evalue"]);
        let mut warnings = WarningLog::default();
        let err = Row::parse("q1\t1e-05", 4, &columns, &mut warnings).unwrap_err();
        assert!(matches!(err, ParseError::Structure { line: 4, .. }));
    }

    #[test]
    fn test_empty_identifier() {
        let mut warnings = WarningLog::default();
        let line = ROW.replacen("gi|16080617|ref|NP_391444.1|", "", 1);
        let err = Row::parse(&line, 5, &ColumnSet::default(), &mut warnings).unwrap_err();
        assert!(err.is_structural());
    }

    #[test]
    fn test_frames_and_sequences() {
        let columns = ColumnSet::from_codes(&["qseqid", "sseqid", "frames", "qseq"]);
        let mut warnings = WarningLog::default();
        let mut row = Row::parse("q1\th1\t0/-2\tPDSNIE", 1, &columns, &mut warnings).unwrap();
        assert_eq!(row.frames(), (Some(0), Some(-2)));
        assert_eq!(row.take_text(Field::QuerySeq).as_deref(), Some("PDSNIE"));
        assert_eq!(row.take_text(Field::QuerySeq), None);
        assert_eq!(row.take_text(Field::Frames), None);
        assert_eq!(row.frames(), (Some(0), Some(-2)));
    }

    #[test]
    fn test_column_set_queries() {
        let columns = ColumnSet::from_codes(&["sseqid", "evalue"]);
        assert!(!columns.has_query_id());
        assert!(ColumnSet::default().has_query_id());
        assert_eq!(Column::from_label("BTOP"), Column::Unknown("BTOP".to_string()));
        assert_eq!(Column::from_label("q. start").name(), "qstart");
    }
}
