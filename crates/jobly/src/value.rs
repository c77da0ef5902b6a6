//! Dynamically-typed bind values.
//!
//! [`SqlValue`] is what the clause builders collect: a partial update or a
//! filter can carry a mix of text, numbers, booleans and NULLs, and each of
//! them still has to be bound through `tokio-postgres` as a real parameter.

use bytes::BytesMut;
use rust_decimal::Decimal;
use rust_decimal::prelude::FromPrimitive;
use std::error::Error;
use std::fmt;
use tokio_postgres::types::{IsNull, ToSql, Type, WrongType};

use crate::error::{JoblyError, JoblyResult};

/// A single bind parameter.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    /// SQL `NULL`.
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Decimal(Decimal),
    Text(String),
}

impl SqlValue {
    /// Whether the value counts as "supplied" for a filter.
    ///
    /// `NULL`, `false`, zero (any numeric kind), NaN and the empty string are
    /// falsy. A filter holding a falsy value is not applied.
    pub fn is_truthy(&self) -> bool {
        match self {
            SqlValue::Null => false,
            SqlValue::Bool(b) => *b,
            SqlValue::Int(i) => *i != 0,
            SqlValue::Float(f) => *f != 0.0 && !f.is_nan(),
            SqlValue::Decimal(d) => !d.is_zero(),
            SqlValue::Text(s) => !s.is_empty(),
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, SqlValue::Null)
    }

    /// Convert a JSON scalar into a bind value.
    ///
    /// Arrays and objects have no column representation and are rejected.
    pub fn from_json(value: serde_json::Value) -> JoblyResult<Self> {
        use serde_json::Value;

        match value {
            Value::Null => Ok(SqlValue::Null),
            Value::Bool(b) => Ok(SqlValue::Bool(b)),
            Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Ok(SqlValue::Int(i))
                } else if let Some(f) = n.as_f64() {
                    Ok(SqlValue::Float(f))
                } else {
                    Err(JoblyError::bad_request(format!("Unsupported number: {n}")))
                }
            }
            Value::String(s) => Ok(SqlValue::Text(s)),
            other => Err(JoblyError::bad_request(format!(
                "Expected a scalar value, got {other}"
            ))),
        }
    }
}

impl fmt::Display for SqlValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SqlValue::Null => f.write_str("NULL"),
            SqlValue::Bool(b) => write!(f, "{b}"),
            SqlValue::Int(i) => write!(f, "{i}"),
            SqlValue::Float(v) => write!(f, "{v}"),
            SqlValue::Decimal(d) => write!(f, "{d}"),
            SqlValue::Text(s) => f.write_str(s),
        }
    }
}

impl ToSql for SqlValue {
    fn to_sql(&self, ty: &Type, out: &mut BytesMut) -> Result<IsNull, Box<dyn Error + Sync + Send>> {
        match self {
            SqlValue::Null => Ok(IsNull::Yes),
            SqlValue::Bool(b) => checked(b, ty, out),
            SqlValue::Int(i) => {
                // Integers arrive as i64; narrow to whatever the server declared.
                if *ty == Type::INT2 {
                    i16::try_from(*i)?.to_sql(ty, out)
                } else if *ty == Type::INT4 {
                    i32::try_from(*i)?.to_sql(ty, out)
                } else if *ty == Type::NUMERIC {
                    Decimal::from(*i).to_sql(ty, out)
                } else if *ty == Type::FLOAT8 {
                    (*i as f64).to_sql(ty, out)
                } else {
                    checked(i, ty, out)
                }
            }
            SqlValue::Float(v) => {
                if *ty == Type::NUMERIC {
                    let d = Decimal::from_f64(*v)
                        .ok_or_else(|| format!("{v} cannot be represented as numeric"))?;
                    d.to_sql(ty, out)
                } else if *ty == Type::FLOAT4 {
                    (*v as f32).to_sql(ty, out)
                } else {
                    checked(v, ty, out)
                }
            }
            SqlValue::Decimal(d) => checked(d, ty, out),
            SqlValue::Text(s) => checked(s, ty, out),
        }
    }

    // Any variant may be NULL, so the per-column check happens in `to_sql`.
    fn accepts(_ty: &Type) -> bool {
        true
    }

    tokio_postgres::types::to_sql_checked!();
}

/// Encode `value` only if its Rust type can represent a `ty` column.
fn checked<T: ToSql>(
    value: &T,
    ty: &Type,
    out: &mut BytesMut,
) -> Result<IsNull, Box<dyn Error + Sync + Send>> {
    if !T::accepts(ty) {
        return Err(Box::new(WrongType::new::<T>(ty.clone())));
    }
    value.to_sql(ty, out)
}

impl From<bool> for SqlValue {
    fn from(v: bool) -> Self {
        SqlValue::Bool(v)
    }
}

impl From<i16> for SqlValue {
    fn from(v: i16) -> Self {
        SqlValue::Int(v.into())
    }
}

impl From<i32> for SqlValue {
    fn from(v: i32) -> Self {
        SqlValue::Int(v.into())
    }
}

impl From<i64> for SqlValue {
    fn from(v: i64) -> Self {
        SqlValue::Int(v)
    }
}

impl From<f64> for SqlValue {
    fn from(v: f64) -> Self {
        SqlValue::Float(v)
    }
}

impl From<Decimal> for SqlValue {
    fn from(v: Decimal) -> Self {
        SqlValue::Decimal(v)
    }
}

impl From<String> for SqlValue {
    fn from(v: String) -> Self {
        SqlValue::Text(v)
    }
}

impl From<&str> for SqlValue {
    fn from(v: &str) -> Self {
        SqlValue::Text(v.to_string())
    }
}

impl<T: Into<SqlValue>> From<Option<T>> for SqlValue {
    fn from(v: Option<T>) -> Self {
        v.map_or(SqlValue::Null, Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn zero_values_are_falsy() {
        assert!(!SqlValue::Null.is_truthy());
        assert!(!SqlValue::Bool(false).is_truthy());
        assert!(!SqlValue::Int(0).is_truthy());
        assert!(!SqlValue::Float(0.0).is_truthy());
        assert!(!SqlValue::Float(f64::NAN).is_truthy());
        assert!(!SqlValue::Decimal(Decimal::ZERO).is_truthy());
        assert!(!SqlValue::Text(String::new()).is_truthy());
    }

    #[test]
    fn non_zero_values_are_truthy() {
        assert!(SqlValue::Bool(true).is_truthy());
        assert!(SqlValue::Int(-1).is_truthy());
        assert!(SqlValue::Float(0.01).is_truthy());
        assert!(SqlValue::Decimal(Decimal::new(1, 2)).is_truthy());
        assert!(SqlValue::from("c").is_truthy());
    }

    #[test]
    fn option_none_becomes_null() {
        assert_eq!(SqlValue::from(None::<i32>), SqlValue::Null);
        assert_eq!(SqlValue::from(Some(3_i32)), SqlValue::Int(3));
    }

    #[test]
    fn json_scalars_convert() {
        assert_eq!(SqlValue::from_json(json!(null)).unwrap(), SqlValue::Null);
        assert_eq!(SqlValue::from_json(json!(true)).unwrap(), SqlValue::Bool(true));
        assert_eq!(SqlValue::from_json(json!(23)).unwrap(), SqlValue::Int(23));
        assert_eq!(SqlValue::from_json(json!(0.5)).unwrap(), SqlValue::Float(0.5));
        assert_eq!(
            SqlValue::from_json(json!("url1")).unwrap(),
            SqlValue::Text("url1".into())
        );
    }

    #[test]
    fn json_containers_are_rejected() {
        let err = SqlValue::from_json(json!([1, 2])).unwrap_err();
        assert!(err.is_bad_request());
        let err = SqlValue::from_json(json!({"a": 1})).unwrap_err();
        assert!(err.is_bad_request());
    }

    #[test]
    fn int_narrows_to_declared_column_type() {
        let mut buf = BytesMut::new();
        let is_null = SqlValue::Int(42).to_sql(&Type::INT4, &mut buf).unwrap();
        assert!(matches!(is_null, IsNull::No));
        assert_eq!(buf.len(), 4);

        let mut buf = BytesMut::new();
        assert!(SqlValue::Int(i64::MAX).to_sql(&Type::INT4, &mut buf).is_err());
    }

    fn bind(value: SqlValue, ty: &Type) -> Result<IsNull, Box<dyn Error + Sync + Send>> {
        value.to_sql_checked(ty, &mut BytesMut::new())
    }

    #[test]
    fn mismatched_column_types_are_rejected() {
        assert!(bind(SqlValue::from("1234"), &Type::INT4).is_err());
        assert!(bind(SqlValue::Int(7), &Type::TEXT).is_err());
        assert!(bind(SqlValue::Bool(true), &Type::INT4).is_err());
        assert!(bind(SqlValue::Decimal(Decimal::new(1, 2)), &Type::VARCHAR).is_err());
        assert!(bind(SqlValue::Float(0.5), &Type::BOOL).is_err());
    }

    #[test]
    fn wrong_type_error_names_the_column_type() {
        let err = bind(SqlValue::from("23"), &Type::INT4).err().unwrap();
        assert!(err.to_string().contains("int4"), "{err}");
    }

    #[test]
    fn matching_column_types_are_accepted() {
        assert!(bind(SqlValue::from("c1"), &Type::TEXT).is_ok());
        assert!(bind(SqlValue::from("c1"), &Type::VARCHAR).is_ok());
        assert!(bind(SqlValue::Bool(false), &Type::BOOL).is_ok());
        assert!(bind(SqlValue::Int(5), &Type::INT8).is_ok());
        assert!(bind(SqlValue::Int(5), &Type::NUMERIC).is_ok());
        assert!(bind(SqlValue::Float(0.5), &Type::FLOAT8).is_ok());
        assert!(bind(SqlValue::Decimal(Decimal::new(1, 2)), &Type::NUMERIC).is_ok());
        assert!(bind(SqlValue::Null, &Type::INT4).is_ok());
    }

    #[test]
    fn null_binds_as_sql_null() {
        let mut buf = BytesMut::new();
        let is_null = SqlValue::Null.to_sql(&Type::TEXT, &mut buf).unwrap();
        assert!(matches!(is_null, IsNull::Yes));
        assert!(buf.is_empty());
    }
}
