//! Partial-update `SET` clause builder.
//!
//! Turns a sparse payload of changed fields into the assignment list of an
//! `UPDATE` statement:
//!
//! ```ignore
//! use jobly::partial_update::{self, FieldTranslation, UpdateSpec};
//!
//! let spec = UpdateSpec::new().set("numEmployees", 23).set("logoUrl", "url1");
//! let translation = FieldTranslation::new(&[("numEmployees", "num_employees"), ("logoUrl", "logo_url")]);
//!
//! let set = partial_update::build(&spec, &translation)?;
//! assert_eq!(set.clause, r#""num_employees"=$1, "logo_url"=$2"#);
//! ```
//!
//! The builder knows nothing about the target table; the caller appends the
//! `WHERE` key using [`SqlFragment::next_placeholder`] and binds it last.

use crate::error::{JoblyError, JoblyResult};
use crate::fragment::SqlFragment;
use crate::value::SqlValue;
use std::fmt::Write;

/// Ordered field → value payload of a partial update.
///
/// Fields keep the order in which they were first set. Setting a field again
/// replaces its value without moving it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UpdateSpec {
    fields: Vec<(String, SqlValue)>,
}

impl UpdateSpec {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a field, chaining.
    pub fn set(mut self, field: impl Into<String>, value: impl Into<SqlValue>) -> Self {
        self.insert(field, value);
        self
    }

    /// Set a field in place.
    pub fn insert(&mut self, field: impl Into<String>, value: impl Into<SqlValue>) {
        let field = field.into();
        let value = value.into();
        match self.fields.iter_mut().find(|(name, _)| *name == field) {
            Some((_, existing)) => *existing = value,
            None => self.fields.push((field, value)),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn get(&self, field: &str) -> Option<&SqlValue> {
        self.fields
            .iter()
            .find(|(name, _)| name == field)
            .map(|(_, value)| value)
    }

    /// Iterate fields in payload order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &SqlValue)> {
        self.fields.iter().map(|(name, value)| (name.as_str(), value))
    }
}

impl<K, V> FromIterator<(K, V)> for UpdateSpec
where
    K: Into<String>,
    V: Into<SqlValue>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut spec = UpdateSpec::new();
        for (field, value) in iter {
            spec.insert(field, value);
        }
        spec
    }
}

/// A JSON object payload, in document order.
impl TryFrom<serde_json::Map<String, serde_json::Value>> for UpdateSpec {
    type Error = JoblyError;

    fn try_from(map: serde_json::Map<String, serde_json::Value>) -> JoblyResult<Self> {
        let mut spec = UpdateSpec::new();
        for (field, value) in map {
            spec.insert(field, SqlValue::from_json(value)?);
        }
        Ok(spec)
    }
}

/// Logical field name → storage column name.
///
/// Fields without an entry are used as column names unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct FieldTranslation<'a> {
    pairs: &'a [(&'a str, &'a str)],
}

impl<'a> FieldTranslation<'a> {
    pub const fn new(pairs: &'a [(&'a str, &'a str)]) -> Self {
        Self { pairs }
    }

    /// A translation that maps every field to itself.
    pub const fn identity() -> Self {
        Self { pairs: &[] }
    }

    /// Resolve the column for `field`.
    pub fn column<'f>(&self, field: &'f str) -> &'f str
    where
        'a: 'f,
    {
        self.pairs
            .iter()
            .find(|(logical, _)| *logical == field)
            .map_or(field, |(_, column)| *column)
    }
}

/// Deserialize a nullable field of an update payload.
///
/// Use with `#[serde(default, deserialize_with = "...")]` on an
/// `Option<Option<T>>`: a missing field stays `None`, an explicit `null`
/// becomes `Some(None)` ("set the column to NULL").
pub fn nullable<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: serde::Deserialize<'de>,
    D: serde::Deserializer<'de>,
{
    <Option<T> as serde::Deserialize>::deserialize(deserializer).map(Some)
}

/// Build the `SET` assignment list for a partial update.
///
/// Each field at position *i* (1-based) becomes `"<column>"=$i`; assignments are
/// joined with `, ` and the values are returned unmodified in the same order.
///
/// Returns [`JoblyError::BadRequest`] when `spec` is empty.
pub fn build(spec: &UpdateSpec, translation: &FieldTranslation<'_>) -> JoblyResult<SqlFragment> {
    if spec.is_empty() {
        return Err(JoblyError::bad_request("No data"));
    }

    let mut clause = String::new();
    let mut values = Vec::with_capacity(spec.len());

    for (idx, (field, value)) in spec.iter().enumerate() {
        if idx > 0 {
            clause.push_str(", ");
        }
        let _ = write!(clause, "\"{}\"=${}", translation.column(field), idx + 1);
        values.push(value.clone());
    }

    Ok(SqlFragment { clause, values })
}
