//! Row and streaming types for query results.

use crate::db::value::SqlValue;
use crate::error::AppError;
use futures::Stream;
use serde::de::DeserializeOwned;
use serde_json::Value as JsonValue;
use std::collections::HashMap;
use std::pin::Pin;

/// Positional parameters for SQL statements, bound to `$1`, `$2`, ... in order.
pub type Params = Vec<SqlValue>;

/// A stream of rows from a query result.
///
/// Rows are fetched on-demand, not loaded all at once.
pub type RowStream<'a> = Pin<Box<dyn Stream<Item = Result<Row, AppError>> + Send + 'a>>;

/// A single row from a query result.
///
/// Column values are held as JSON, with typed extraction via [`Row::get`].
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    data: HashMap<String, JsonValue>,
}

impl Row {
    /// Creates a new row from a map of column names to values.
    pub fn new(data: HashMap<String, JsonValue>) -> Self {
        Self { data }
    }

    /// Gets a value from the row by column name, deserializing to the requested type.
    ///
    /// # Errors
    ///
    /// Returns an error if the column is missing or if deserialization fails.
    ///
    /// # Example
    ///
    /// ```ignore
    /// let id: i64 = row.get("id")?;
    /// let title: String = row.get("title")?;
    /// ```
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Result<T, AppError> {
        self.data
            .get(key)
            .ok_or_else(|| AppError::Internal(format!("column not found: {}", key)))
            .and_then(|v| {
                serde_json::from_value(v.clone()).map_err(|e| {
                    AppError::Internal(format!("failed to deserialize '{}': {}", key, e))
                })
            })
    }

    /// Gets a value from the row, returning `None` if the column is missing or NULL.
    ///
    /// Still returns an error if the column exists but deserialization fails.
    pub fn get_opt<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, AppError> {
        match self.data.get(key) {
            Some(v) if v.is_null() => Ok(None),
            Some(v) => serde_json::from_value(v.clone())
                .map(Some)
                .map_err(|e| AppError::Internal(format!("failed to deserialize '{}': {}", key, e))),
            None => Ok(None),
        }
    }
}

impl From<HashMap<String, JsonValue>> for Row {
    fn from(data: HashMap<String, JsonValue>) -> Self {
        Self::new(data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use serde_json::json;

    fn row(pairs: &[(&str, JsonValue)]) -> Row {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect::<HashMap<_, _>>()
            .into()
    }

    #[test]
    fn test_row_get_string() {
        let row = row(&[("title", json!("Minecraft"))]);
        let title: String = row.get("title").unwrap();
        assert_eq!(title, "Minecraft");
    }

    #[test]
    fn test_row_get_missing_key() {
        let row = row(&[]);
        let result: Result<String, _> = row.get("missing");
        assert!(result.is_err());
    }

    #[test]
    fn test_row_get_date() {
        let row = row(&[("release_date", json!("2015-05-19"))]);
        let date: NaiveDate = row.get("release_date").unwrap();
        assert_eq!(date, NaiveDate::from_ymd_opt(2015, 5, 19).unwrap());
    }

    #[test]
    fn test_row_get_opt_null() {
        let row = row(&[("release_date", JsonValue::Null)]);
        let date: Option<NaiveDate> = row.get_opt("release_date").unwrap();
        assert_eq!(date, None);
    }

    #[test]
    fn test_row_get_opt_wrong_type() {
        let row = row(&[("release_date", json!(true))]);
        let result: Result<Option<NaiveDate>, _> = row.get_opt("release_date");
        assert!(result.is_err());
    }
}
