//! PostgreSQL backend implementation.
//!
//! Connection pooling via deadpool-postgres. Every statement issued on
//! [`PostgresClient`] checks a connection out of the pool for the lifetime
//! of the statement (or its row stream) and returns it on drop, on every
//! exit path.
//!
//! # Example
//!
//! ```ignore
//! use videogames::db::backends::postgres::PostgresClient;
//! use videogames::db::QueryExt;
//!
//! let client = PostgresClient::connect(config.database.pg_config()?, 16)?;
//!
//! let rows = client
//!     .query("SELECT id, title FROM video_games WHERE id = $1")
//!     .param(1_i64)
//!     .fetch_all()
//!     .await?;
//! ```

use std::collections::HashMap;

use async_trait::async_trait;
use deadpool_postgres::{Manager, ManagerConfig, Object, Pool, RecyclingMethod};
use futures::TryStreamExt;
use serde_json::Value as JsonValue;
use tokio_postgres::NoTls;

use crate::db::row::{Params, Row, RowStream};
use crate::db::traits::{DbClient, SqlExecutor, Transaction};
use crate::error::AppError;

/// PostgreSQL client backed by a connection pool.
///
/// This type is cheap to clone - the underlying connection pool is `Arc`-based.
#[derive(Clone)]
pub struct PostgresClient {
    pool: Pool,
}

impl PostgresClient {
    /// Creates a new PostgreSQL client with connection pooling.
    ///
    /// No connection is opened until the first statement runs.
    pub fn connect(pg_config: tokio_postgres::Config, max_size: usize) -> Result<Self, AppError> {
        let mgr_config = ManagerConfig {
            recycling_method: RecyclingMethod::Fast,
        };
        let mgr = Manager::from_config(pg_config, NoTls, mgr_config);
        let pool = Pool::builder(mgr)
            .max_size(max_size)
            .build()
            .map_err(|e| AppError::Connection(format!("Failed to create connection pool: {}", e)))?;

        Ok(Self { pool })
    }

    /// Checks a connection out of the pool.
    async fn get_connection(&self) -> Result<Object, AppError> {
        self.pool
            .get()
            .await
            .map_err(|e| AppError::Connection(format!("Failed to get connection from pool: {}", e)))
    }

    /// Verifies the database is reachable.
    pub async fn ping(&self) -> Result<(), AppError> {
        let conn = self.get_connection().await?;
        conn.batch_execute("SELECT 1")
            .await
            .map_err(|e| AppError::Connection(format!("Database unreachable: {}", e)))
    }

    /// Closes the pool: waiting checkouts fail and idle connections are dropped.
    pub fn close(&self) {
        self.pool.close();
    }
}

#[async_trait]
impl SqlExecutor for PostgresClient {
    async fn query_sql(&self, sql: &str, params: Params) -> Result<RowStream<'_>, AppError> {
        let conn = self.get_connection().await?;
        Ok(query_owned(conn, sql.to_string(), params))
    }

    async fn execute_sql(&self, sql: &str, params: Params) -> Result<u64, AppError> {
        let conn = self.get_connection().await?;
        execute_on(&conn, sql, &params).await
    }

    async fn batch_sql(&self, sql: &str) -> Result<(), AppError> {
        let conn = self.get_connection().await?;
        batch_on(&conn, sql).await
    }
}

#[async_trait]
impl DbClient for PostgresClient {
    type Tx<'a> = PostgresTransaction;

    async fn begin(&self) -> Result<Self::Tx<'_>, AppError> {
        let conn = self.get_connection().await?;

        conn.batch_execute("BEGIN")
            .await
            .map_err(|e| AppError::Connection(format!("Failed to begin transaction: {}", e)))?;

        Ok(PostgresTransaction { conn: Some(conn) })
    }
}

/// PostgreSQL transaction on a dedicated pooled connection.
///
/// Must be explicitly committed or rolled back. Dropping an unfinished
/// transaction detaches its connection from the pool and closes it, so
/// the server rolls the work back and no other caller can observe the
/// open transaction.
pub struct PostgresTransaction {
    conn: Option<Object>,
}

impl PostgresTransaction {
    fn conn(&self) -> Result<&Object, AppError> {
        self.conn
            .as_ref()
            .ok_or_else(|| AppError::Internal("transaction already finished".into()))
    }

    async fn finish(mut self, statement: &str) -> Result<(), AppError> {
        let conn = self.conn.take().ok_or_else(|| {
            AppError::Internal("transaction already finished".into())
        })?;
        match conn.batch_execute(statement).await {
            Ok(()) => Ok(()),
            Err(e) => {
                // Never hand a connection in an unknown state back to the pool
                drop(Object::take(conn));
                Err(AppError::Connection(format!("Failed to {}: {}", statement, e)))
            }
        }
    }
}

#[async_trait]
impl SqlExecutor for PostgresTransaction {
    async fn query_sql(&self, sql: &str, params: Params) -> Result<RowStream<'_>, AppError> {
        let conn = self.conn()?;
        let stream = conn
            .query_raw(sql, params.iter())
            .await
            .map_err(|e| query_error(sql, e))?;

        Ok(Box::pin(stream.map_ok(|row| parse_pg_row(&row)).map_err(
            |e| AppError::Internal(format!("Failed to fetch row: {}", e)),
        )))
    }

    async fn execute_sql(&self, sql: &str, params: Params) -> Result<u64, AppError> {
        execute_on(self.conn()?, sql, &params).await
    }

    async fn batch_sql(&self, sql: &str) -> Result<(), AppError> {
        batch_on(self.conn()?, sql).await
    }
}

#[async_trait]
impl Transaction for PostgresTransaction {
    async fn commit(self) -> Result<(), AppError> {
        self.finish("COMMIT").await
    }

    async fn rollback(self) -> Result<(), AppError> {
        self.finish("ROLLBACK").await
    }
}

impl Drop for PostgresTransaction {
    fn drop(&mut self) {
        if let Some(conn) = self.conn.take() {
            tracing::warn!("PostgresTransaction dropped without commit or rollback - discarding connection");
            drop(Object::take(conn));
        }
    }
}

async fn execute_on(conn: &Object, sql: &str, params: &Params) -> Result<u64, AppError> {
    conn.execute_raw(sql, params.iter())
        .await
        .map_err(|e| query_error(sql, e))
}

async fn batch_on(conn: &Object, sql: &str) -> Result<(), AppError> {
    conn.batch_execute(sql).await.map_err(|e| query_error(sql, e))
}

/// Runs a query on an owned connection.
///
/// The connection is captured by the generator and kept alive for the
/// stream's lifetime, then returned to the pool when the stream is dropped.
fn query_owned(conn: Object, sql: String, params: Params) -> RowStream<'static> {
    use async_stream::try_stream;

    Box::pin(try_stream! {
        let stream = conn
            .query_raw(sql.as_str(), params.iter())
            .await
            .map_err(|e| query_error(&sql, e))?;

        futures::pin_mut!(stream);
        while let Some(pg_row) = stream.try_next().await.map_err(|e| {
            AppError::Internal(format!("Failed to fetch row: {}", e))
        })? {
            yield parse_pg_row(&pg_row);
        }
    })
}

/// Maps a driver error to a query error, keeping PostgreSQL's diagnostics.
fn query_error(sql: &str, e: tokio_postgres::Error) -> AppError {
    let detail = e
        .as_db_error()
        .map(|db_err| {
            format!(
                "{}: {} [{}] (detail: {:?}, hint: {:?})",
                db_err.severity(),
                db_err.message(),
                db_err.code().code(),
                db_err.detail(),
                db_err.hint()
            )
        })
        .unwrap_or_else(|| e.to_string());
    AppError::Query {
        message: format!("SQL execution failed: {}", detail),
        query: sql.to_string(),
    }
}

/// Parses a PostgreSQL row into our generic Row type.
///
/// Standard PostgreSQL types are converted to their JSON equivalents;
/// dates become ISO `YYYY-MM-DD` strings.
fn parse_pg_row(pg_row: &tokio_postgres::Row) -> Row {
    let mut data = HashMap::new();

    for (idx, column) in pg_row.columns().iter().enumerate() {
        let name = column.name().to_string();

        let value = match column.type_().name() {
            "int2" => pg_row
                .try_get::<_, Option<i16>>(idx)
                .ok()
                .flatten()
                .map(|v| JsonValue::Number(v.into())),
            "int4" => pg_row
                .try_get::<_, Option<i32>>(idx)
                .ok()
                .flatten()
                .map(|v| JsonValue::Number(v.into())),
            "int8" => pg_row
                .try_get::<_, Option<i64>>(idx)
                .ok()
                .flatten()
                .map(|v| JsonValue::Number(v.into())),
            "bool" => pg_row
                .try_get::<_, Option<bool>>(idx)
                .ok()
                .flatten()
                .map(JsonValue::Bool),
            "date" => pg_row
                .try_get::<_, Option<chrono::NaiveDate>>(idx)
                .ok()
                .flatten()
                .map(|d| JsonValue::String(d.to_string())),
            // varchar, text and anything else readable as text
            _ => pg_row
                .try_get::<_, Option<String>>(idx)
                .ok()
                .flatten()
                .map(JsonValue::String),
        };

        data.insert(name, value.unwrap_or(JsonValue::Null));
    }

    Row::new(data)
}
