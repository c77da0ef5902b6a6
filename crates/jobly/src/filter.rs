//! Table-driven `WHERE` clause builder for list queries.
//!
//! Each resource declares an ordered list of [`Filter`] descriptors over its
//! criteria type. [`build`] evaluates them in that order (never in input order)
//! so the generated SQL is reproducible:
//!
//! ```ignore
//! const JOB_FILTERS: &[Filter<JobFilter>] = &[
//!     Filter::AtLeast { column: "salary", value: min_salary },
//!     Filter::Contains { column: "title", value: title },
//!     Filter::Flag { predicate: "equity > 0", value: has_equity },
//! ];
//!
//! let where_clause = filter::build(&criteria, JOB_FILTERS);
//! let sql = format!("SELECT ... FROM jobs {} ORDER BY id", where_clause.clause);
//! ```
//!
//! A criterion is applied only when its value is truthy (see
//! [`SqlValue::is_truthy`]): a threshold of `0`, an empty string or `false`
//! is indistinguishable from leaving the criterion out.

use crate::fragment::SqlFragment;
use crate::value::SqlValue;

/// Reads one criterion out of a criteria record.
pub type Accessor<C> = fn(&C) -> Option<SqlValue>;

/// One filter descriptor.
pub enum Filter<C> {
    /// `<column> >= $n`
    AtLeast {
        column: &'static str,
        value: Accessor<C>,
    },
    /// `<column> <= $n`
    AtMost {
        column: &'static str,
        value: Accessor<C>,
    },
    /// `<column> ILIKE $n`, bound to `%value%`.
    Contains {
        column: &'static str,
        value: Accessor<C>,
    },
    /// A fixed predicate with no bound value.
    Flag {
        predicate: &'static str,
        value: Accessor<C>,
    },
}

impl<C> Filter<C> {
    fn accessor(&self) -> Accessor<C> {
        match self {
            Filter::AtLeast { value, .. }
            | Filter::AtMost { value, .. }
            | Filter::Contains { value, .. }
            | Filter::Flag { value, .. } => *value,
        }
    }
}

/// Accumulates conditions and their values, numbering placeholders by
/// the current value count.
#[derive(Default)]
struct WhereBuilder {
    conditions: Vec<String>,
    values: Vec<SqlValue>,
}

impl WhereBuilder {
    fn bind(&mut self, column: &str, operator: &str, value: SqlValue) {
        self.values.push(value);
        self.conditions
            .push(format!("{} {} ${}", column, operator, self.values.len()));
    }

    fn raw(&mut self, predicate: &str) {
        self.conditions.push(predicate.to_string());
    }

    fn finish(self) -> SqlFragment {
        if self.conditions.is_empty() {
            return SqlFragment::empty();
        }
        SqlFragment {
            clause: format!("WHERE {}", self.conditions.join(" AND ")),
            values: self.values,
        }
    }
}

/// Build the `WHERE` clause for `criteria`.
///
/// The clause is empty when no criterion applies; otherwise it starts with
/// `WHERE ` and joins the conditions with ` AND `.
pub fn build<C>(criteria: &C, filters: &[Filter<C>]) -> SqlFragment {
    let mut builder = WhereBuilder::default();

    for filter in filters {
        let Some(value) = (filter.accessor())(criteria) else {
            continue;
        };
        if !value.is_truthy() {
            continue;
        }

        match filter {
            Filter::AtLeast { column, .. } => builder.bind(column, ">=", value),
            Filter::AtMost { column, .. } => builder.bind(column, "<=", value),
            Filter::Contains { column, .. } => {
                builder.bind(column, "ILIKE", SqlValue::Text(format!("%{value}%")))
            }
            Filter::Flag { predicate, .. } => builder.raw(predicate),
        }
    }

    builder.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fragment::count_placeholders;

    #[derive(Default)]
    struct Criteria {
        min: Option<i32>,
        max: Option<i32>,
        text: Option<String>,
        flag: Option<bool>,
    }

    fn min(c: &Criteria) -> Option<SqlValue> {
        c.min.map(SqlValue::from)
    }

    fn max(c: &Criteria) -> Option<SqlValue> {
        c.max.map(SqlValue::from)
    }

    fn text(c: &Criteria) -> Option<SqlValue> {
        c.text.as_deref().map(SqlValue::from)
    }

    fn flag(c: &Criteria) -> Option<SqlValue> {
        c.flag.map(SqlValue::from)
    }

    const FILTERS: &[Filter<Criteria>] = &[
        Filter::AtLeast { column: "size", value: min },
        Filter::Flag { predicate: "active", value: flag },
        Filter::Contains { column: "label", value: text },
        Filter::AtMost { column: "size", value: max },
    ];

    #[test]
    fn no_criteria_yields_empty_fragment() {
        let frag = build(&Criteria::default(), FILTERS);
        assert_eq!(frag.clause, "");
        assert!(frag.values.is_empty());
    }

    #[test]
    fn follows_declaration_order() {
        let criteria = Criteria {
            min: Some(2),
            max: Some(9),
            text: Some("ab".into()),
            flag: Some(true),
        };

        let frag = build(&criteria, FILTERS);

        assert_eq!(
            frag.clause,
            "WHERE size >= $1 AND active AND label ILIKE $2 AND size <= $3"
        );
        assert_eq!(
            frag.values,
            vec![SqlValue::Int(2), SqlValue::from("%ab%"), SqlValue::Int(9)]
        );
        assert_eq!(count_placeholders(&frag.clause), frag.values.len());
    }

    #[test]
    fn flag_consumes_no_placeholder() {
        let criteria = Criteria {
            flag: Some(true),
            max: Some(4),
            ..Default::default()
        };

        let frag = build(&criteria, FILTERS);

        assert_eq!(frag.clause, "WHERE active AND size <= $1");
        assert_eq!(frag.values, vec![SqlValue::Int(4)]);
    }

    #[test]
    fn falsy_values_are_not_applied() {
        let criteria = Criteria {
            min: Some(0),
            max: Some(0),
            text: Some(String::new()),
            flag: Some(false),
        };

        let frag = build(&criteria, FILTERS);

        assert_eq!(frag, SqlFragment::empty());
    }
}
