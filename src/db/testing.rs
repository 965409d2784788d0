//! Scripted in-memory executor for unit tests.
//!
//! Records every statement it receives and answers from a queue of
//! canned responses, in order. An empty queue answers with no rows and
//! zero affected rows.

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::Value as JsonValue;

use crate::db::row::{Params, Row, RowStream};
use crate::db::traits::{DbClient, SqlExecutor, Transaction};
use crate::error::AppError;

/// A statement seen by the mock.
#[derive(Debug, Clone, PartialEq)]
pub struct Call {
    pub sql: String,
    pub params: Params,
}

enum Response {
    Rows(Vec<Row>),
    Affected(u64),
    Fail(String),
}

#[derive(Default)]
pub struct MockExecutor {
    calls: Mutex<Vec<Call>>,
    responses: Mutex<VecDeque<Response>>,
}

impl MockExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a row set for the next statement.
    pub fn with_rows(self, rows: Vec<Row>) -> Self {
        self.push(Response::Rows(rows));
        self
    }

    /// Queue an affected-row count for the next statement.
    pub fn with_affected(self, affected: u64) -> Self {
        self.push(Response::Affected(affected));
        self
    }

    /// Queue a query failure for the next statement.
    pub fn with_failure(self, message: &str) -> Self {
        self.push(Response::Fail(message.to_string()));
        self
    }

    /// All statements received so far, including `BEGIN`/`COMMIT`/`ROLLBACK` markers.
    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    /// Statement texts received so far.
    pub fn statements(&self) -> Vec<String> {
        self.calls().into_iter().map(|c| c.sql).collect()
    }

    /// Build a row from column/value pairs.
    pub fn row(pairs: &[(&str, JsonValue)]) -> Row {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect::<HashMap<_, _>>()
            .into()
    }

    fn push(&self, response: Response) {
        self.responses.lock().unwrap().push_back(response);
    }

    fn log(&self, sql: &str, params: Params) {
        self.calls.lock().unwrap().push(Call {
            sql: sql.to_string(),
            params,
        });
    }

    fn record(&self, sql: &str, params: Params) -> Option<Response> {
        self.log(sql, params);
        self.responses.lock().unwrap().pop_front()
    }

    fn fail(sql: &str, message: String) -> AppError {
        AppError::Query {
            message,
            query: sql.to_string(),
        }
    }
}

#[async_trait]
impl SqlExecutor for MockExecutor {
    async fn query_sql(&self, sql: &str, params: Params) -> Result<RowStream<'_>, AppError> {
        let rows = match self.record(sql, params) {
            Some(Response::Rows(rows)) => rows,
            Some(Response::Fail(message)) => return Err(Self::fail(sql, message)),
            Some(Response::Affected(_)) | None => Vec::new(),
        };
        Ok(Box::pin(futures::stream::iter(rows.into_iter().map(Ok))))
    }

    async fn execute_sql(&self, sql: &str, params: Params) -> Result<u64, AppError> {
        match self.record(sql, params) {
            Some(Response::Affected(n)) => Ok(n),
            Some(Response::Rows(rows)) => Ok(rows.len() as u64),
            Some(Response::Fail(message)) => Err(Self::fail(sql, message)),
            None => Ok(0),
        }
    }

    async fn batch_sql(&self, sql: &str) -> Result<(), AppError> {
        match self.record(sql, Params::new()) {
            Some(Response::Fail(message)) => Err(Self::fail(sql, message)),
            _ => Ok(()),
        }
    }
}

/// Transaction over the mock; shares its call log and response queue.
pub struct MockTransaction<'a> {
    inner: &'a MockExecutor,
}

#[async_trait]
impl SqlExecutor for MockTransaction<'_> {
    async fn query_sql(&self, sql: &str, params: Params) -> Result<RowStream<'_>, AppError> {
        self.inner.query_sql(sql, params).await
    }

    async fn execute_sql(&self, sql: &str, params: Params) -> Result<u64, AppError> {
        self.inner.execute_sql(sql, params).await
    }

    async fn batch_sql(&self, sql: &str) -> Result<(), AppError> {
        self.inner.batch_sql(sql).await
    }
}

#[async_trait]
impl Transaction for MockTransaction<'_> {
    async fn commit(self) -> Result<(), AppError> {
        self.inner.log("COMMIT", Params::new());
        Ok(())
    }

    async fn rollback(self) -> Result<(), AppError> {
        self.inner.log("ROLLBACK", Params::new());
        Ok(())
    }
}

#[async_trait]
impl DbClient for MockExecutor {
    type Tx<'a> = MockTransaction<'a>;

    async fn begin(&self) -> Result<Self::Tx<'_>, AppError> {
        self.log("BEGIN", Params::new());
        Ok(MockTransaction { inner: self })
    }
}
