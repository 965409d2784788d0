//! Core traits for storage abstraction.
//!
//! This module defines the trait hierarchy that backends must implement:
//!
//! - [`SqlExecutor`] - Run parameterized statements (required)
//! - [`Transaction`] - Transaction lifecycle management
//! - [`DbClient`] - Connection pool and transaction creation

use async_trait::async_trait;

use crate::db::row::{Params, RowStream};
use crate::error::AppError;

/// Executes SQL statements against the database.
///
/// Implemented by the pooled client (auto-commit per statement), by open
/// transactions, and by the in-memory mock used in tests.
#[async_trait]
pub trait SqlExecutor: Send + Sync {
    /// Executes a statement and returns a stream of result rows.
    ///
    /// Use this for `SELECT` and for writes with a `RETURNING` clause.
    async fn query_sql(&self, sql: &str, params: Params) -> Result<RowStream<'_>, AppError>;

    /// Executes a statement and returns the number of affected rows.
    async fn execute_sql(&self, sql: &str, params: Params) -> Result<u64, AppError>;

    /// Executes one or more unparameterized statements (DDL, scripts).
    async fn batch_sql(&self, sql: &str) -> Result<(), AppError>;
}

/// Transaction lifecycle management.
#[async_trait]
pub trait Transaction: Send + Sync {
    /// Commits the transaction, making all changes permanent.
    ///
    /// Consumes the transaction - it cannot be used after commit.
    async fn commit(self) -> Result<(), AppError>;

    /// Rolls back the transaction, discarding all changes.
    ///
    /// Consumes the transaction - it cannot be used after rollback.
    async fn rollback(self) -> Result<(), AppError>;
}

/// A database client that can begin transactions.
///
/// Statements issued directly on the client auto-commit; explicit
/// transactions are opened with [`begin`](DbClient::begin).
#[async_trait]
pub trait DbClient: SqlExecutor {
    /// The transaction type returned by this client.
    type Tx<'a>: Transaction + SqlExecutor
    where
        Self: 'a;

    /// Begins a new transaction.
    ///
    /// The returned transaction must be either committed or rolled back.
    ///
    /// # Example
    ///
    /// ```ignore
    /// let txn = client.begin().await?;
    /// txn.query("DELETE FROM video_games").run().await?;
    /// txn.commit().await?;
    /// ```
    async fn begin(&self) -> Result<Self::Tx<'_>, AppError>;
}
