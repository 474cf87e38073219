use serde::{Deserialize, Serialize};

/// Which tabular variant the input is in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InputFormat {
    /// Decide from the first non-blank line: `#` means commented
    #[default]
    Auto,
    /// `-outfmt 7`: every query is preceded by a `#` comment block
    Commented,
    /// `-outfmt 6`: rows only
    Plain,
}

/// Caller-facing parser configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParseOptions {
    #[serde(default)]
    pub format: InputFormat,

    /// Column codes in file order, for rows written with a custom `-outfmt` list.
    /// `# Fields:` lines in commented input take precedence for their block.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub columns: Option<Vec<String>>,
}

impl ParseOptions {
    #[must_use]
    pub fn commented() -> Self {
        Self::default().with_format(InputFormat::Commented)
    }

    #[must_use]
    pub fn plain() -> Self {
        Self::default().with_format(InputFormat::Plain)
    }

    #[must_use]
    pub fn with_format(mut self, format: InputFormat) -> Self {
        self.format = format;
        self
    }

    #[must_use]
    pub fn with_columns<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.columns = Some(columns.into_iter().map(Into::into).collect());
        self
    }

    /// Set the columns from an `-outfmt` style list, e.g. "qseqid sseqid evalue".
    /// A leading format number ("6 qseqid ...") is ignored.
    #[must_use]
    pub fn with_columns_str(self, spec: &str) -> Self {
        let codes: Vec<&str> = spec
            .split(|c: char| c.is_whitespace() || c == ',')
            .filter(|s| !s.is_empty())
            .skip_while(|s| s.chars().all(|c| c.is_ascii_digit()))
            .collect();
        self.with_columns(codes)
    }
}
