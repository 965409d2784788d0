//! Query builder for fluent statement construction.

use futures::TryStreamExt;

use crate::db::row::{Params, Row, RowStream};
use crate::db::traits::SqlExecutor;
use crate::db::value::SqlValue;
use crate::error::AppError;

/// A builder for constructing and executing parameterized SQL statements.
///
/// Parameters are positional: the first `param` call binds `$1`, the
/// second `$2`, and so on.
///
/// # Example
///
/// ```ignore
/// let rows = Query::new(&client, "SELECT * FROM video_games WHERE id = $1")
///     .param(7_i64)
///     .fetch_all()
///     .await?;
/// ```
pub struct Query<'a, E: SqlExecutor + ?Sized> {
    executor: &'a E,
    sql: String,
    params: Params,
}

impl<'a, E: SqlExecutor + ?Sized> Query<'a, E> {
    /// Creates a new query builder.
    pub fn new(executor: &'a E, sql: &str) -> Self {
        Self {
            executor,
            sql: sql.to_string(),
            params: Params::new(),
        }
    }

    /// Binds the next positional parameter.
    pub fn param(mut self, value: impl Into<SqlValue>) -> Self {
        self.params.push(value.into());
        self
    }

    /// Executes the query and returns a stream of rows.
    pub async fn execute(self) -> Result<RowStream<'a>, AppError> {
        self.executor.query_sql(&self.sql, self.params).await
    }

    /// Executes the query and collects all rows into a vector.
    pub async fn fetch_all(self) -> Result<Vec<Row>, AppError> {
        self.execute().await?.try_collect().await
    }

    /// Executes the query and returns the first row, if any.
    pub async fn fetch_one(self) -> Result<Option<Row>, AppError> {
        let mut stream = self.execute().await?;
        stream.try_next().await
    }

    /// Executes the statement and returns the number of affected rows.
    pub async fn run(self) -> Result<u64, AppError> {
        self.executor.execute_sql(&self.sql, self.params).await
    }
}

/// Extension trait providing a convenient `query()` method.
///
/// Automatically implemented for all [`SqlExecutor`] types, allowing
/// `executor.query("...")` instead of `Query::new(&executor, "...")`.
pub trait QueryExt: SqlExecutor {
    /// Creates a new query builder for this executor.
    fn query(&self, sql: &str) -> Query<'_, Self>
    where
        Self: Sized,
    {
        Query::new(self, sql)
    }
}

impl<E: SqlExecutor> QueryExt for E {}
