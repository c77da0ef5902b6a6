//! SQL fragments with positional placeholders.

use crate::value::SqlValue;
use tokio_postgres::types::ToSql;

/// A clause of SQL text plus the values bound to its `$1..$n` placeholders.
///
/// Placeholders are numbered contiguously from 1 and there are exactly as many
/// of them as there are values. The clause is meant to be spliced into a larger
/// statement by the caller.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SqlFragment {
    pub clause: String,
    pub values: Vec<SqlValue>,
}

impl SqlFragment {
    /// An empty fragment: no text, no values.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.clause.is_empty()
    }

    /// Number of placeholders used by this fragment.
    pub fn placeholder_count(&self) -> usize {
        self.values.len()
    }

    /// The placeholder a caller should use for the next value it binds
    /// after this fragment's own values (e.g. `$3` after two SET columns).
    pub fn next_placeholder(&self) -> String {
        format!("${}", self.values.len() + 1)
    }

    /// Parameter refs compatible with `tokio-postgres`.
    pub fn params_ref(&self) -> Vec<&(dyn ToSql + Sync)> {
        self.values
            .iter()
            .map(|v| v as &(dyn ToSql + Sync))
            .collect()
    }
}

/// Count the distinct `$n` markers in a clause.
///
/// Test helper for checking the placeholder/value invariant.
#[cfg(test)]
pub(crate) fn count_placeholders(clause: &str) -> usize {
    let bytes = clause.as_bytes();
    let mut count = 0;
    for (i, b) in bytes.iter().enumerate() {
        if *b == b'$' && bytes.get(i + 1).is_some_and(u8::is_ascii_digit) {
            count += 1;
        }
    }
    count
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn next_placeholder_follows_values() {
        let frag = SqlFragment {
            clause: "\"name\"=$1, \"description\"=$2".into(),
            values: vec!["n".into(), SqlValue::Null],
        };
        assert_eq!(frag.next_placeholder(), "$3");
        assert_eq!(frag.params_ref().len(), 2);
        assert_eq!(count_placeholders(&frag.clause), frag.placeholder_count());
    }

    #[test]
    fn empty_fragment_starts_at_one() {
        let frag = SqlFragment::empty();
        assert!(frag.is_empty());
        assert_eq!(frag.next_placeholder(), "$1");
        assert!(frag.params_ref().is_empty());
    }
}
