//! Typed SQL parameter values.

use std::error::Error;

use bytes::BytesMut;
use chrono::NaiveDate;
use tokio_postgres::types::{to_sql_checked, IsNull, ToSql, Type};

/// A value bound to a positional statement parameter.
///
/// Values are sent as typed binary data through the extended query protocol
/// and are never interpolated into the statement text.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    Null,
    Bool(bool),
    Int(i64),
    Text(String),
    Date(NaiveDate),
}

impl ToSql for SqlValue {
    fn to_sql(&self, ty: &Type, out: &mut BytesMut) -> Result<IsNull, Box<dyn Error + Sync + Send>> {
        match self {
            SqlValue::Null => Ok(IsNull::Yes),
            SqlValue::Bool(v) => v.to_sql_checked(ty, out),
            // Narrow to the column width the server asked for
            SqlValue::Int(v) if *ty == Type::INT4 => i32::try_from(*v)?.to_sql_checked(ty, out),
            SqlValue::Int(v) if *ty == Type::INT2 => i16::try_from(*v)?.to_sql_checked(ty, out),
            SqlValue::Int(v) => v.to_sql_checked(ty, out),
            SqlValue::Text(v) => v.to_sql_checked(ty, out),
            SqlValue::Date(v) => v.to_sql_checked(ty, out),
        }
    }

    // Per-variant checks happen in `to_sql`.
    fn accepts(_ty: &Type) -> bool {
        true
    }

    to_sql_checked!();
}

impl From<bool> for SqlValue {
    fn from(v: bool) -> Self {
        SqlValue::Bool(v)
    }
}

impl From<i64> for SqlValue {
    fn from(v: i64) -> Self {
        SqlValue::Int(v)
    }
}

impl From<i32> for SqlValue {
    fn from(v: i32) -> Self {
        SqlValue::Int(v.into())
    }
}

impl From<&str> for SqlValue {
    fn from(v: &str) -> Self {
        SqlValue::Text(v.to_string())
    }
}

impl From<String> for SqlValue {
    fn from(v: String) -> Self {
        SqlValue::Text(v)
    }
}

impl From<NaiveDate> for SqlValue {
    fn from(v: NaiveDate) -> Self {
        SqlValue::Date(v)
    }
}

impl<T: Into<SqlValue>> From<Option<T>> for SqlValue {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(SqlValue::Null)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_option_conversion() {
        let none: Option<NaiveDate> = None;
        assert_eq!(SqlValue::from(none), SqlValue::Null);

        let date = NaiveDate::from_ymd_opt(2011, 11, 18).unwrap();
        assert_eq!(SqlValue::from(Some(date)), SqlValue::Date(date));
    }

    #[test]
    fn test_bool_encoding() {
        let mut out = BytesMut::new();
        let is_null = SqlValue::Bool(true).to_sql(&Type::BOOL, &mut out).unwrap();
        assert!(matches!(is_null, IsNull::No));
        assert_eq!(&out[..], &[1]);
    }

    #[test]
    fn test_int_narrows_to_int4() {
        let mut out = BytesMut::new();
        SqlValue::Int(7).to_sql(&Type::INT4, &mut out).unwrap();
        assert_eq!(out.len(), 4);

        let mut out = BytesMut::new();
        SqlValue::Int(7).to_sql(&Type::INT8, &mut out).unwrap();
        assert_eq!(out.len(), 8);
    }

    #[test]
    fn test_type_mismatch_is_rejected() {
        let mut out = BytesMut::new();
        assert!(SqlValue::Bool(true).to_sql(&Type::DATE, &mut out).is_err());
    }

    #[test]
    fn test_null_for_any_type() {
        let mut out = BytesMut::new();
        let is_null = SqlValue::Null.to_sql(&Type::DATE, &mut out).unwrap();
        assert!(matches!(is_null, IsNull::Yes));
    }
}
