//! Centralized validation and helper functions.

/// Maximum number of columns accepted in a column list (DOS protection).
/// BLAST+ knows fewer than 60 output specifiers.
pub const MAX_COLUMNS: usize = 256;

/// Check that an identifier is usable as a query or hit key.
///
/// # Examples
///
/// ```
/// use blast_tab::utils::validation::is_valid_identifier;
///
/// assert!(is_valid_identifier("gi|16080617|ref|NP_391444.1|"));
/// assert!(!is_valid_identifier(""));
/// assert!(!is_valid_identifier("   "));
/// ```
#[must_use]
pub fn is_valid_identifier(s: &str) -> bool {
    !s.trim().is_empty()
}

/// Check whether a column list is within the allowed size.
///
/// Returns an error message if the list is too long, None if it is acceptable.
#[must_use]
pub fn check_column_limit(count: usize) -> Option<String> {
    if count > MAX_COLUMNS {
        Some(format!(
            "Too many columns: {count} exceeds maximum of {MAX_COLUMNS}"
        ))
    } else {
        None
    }
}

/// Split a `# Fields:` label list. Labels are separated by commas; some labels
/// contain spaces ("q. start") so whitespace is not a separator.
#[must_use]
pub fn split_labels(text: &str) -> Vec<&str> {
    text.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identifier_validation() {
        assert!(is_valid_identifier("random_s00"));
        assert!(is_valid_identifier("gi|11464971:4-101"));
        assert!(!is_valid_identifier(""));
        assert!(!is_valid_identifier("\t"));
    }

    #[test]
    fn test_column_limit() {
        assert!(check_column_limit(12).is_none());
        assert!(check_column_limit(MAX_COLUMNS).is_none());
        assert!(check_column_limit(MAX_COLUMNS + 1).is_some());
    }

    #[test]
    fn test_split_labels() {
        assert_eq!(
            split_labels("query id, subject id, q. start, % identity"),
            vec!["query id", "subject id", "q. start", "% identity"]
        );
        assert!(split_labels("  ").is_empty());
    }
}
