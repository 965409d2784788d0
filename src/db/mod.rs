//! Storage abstraction layer.
//!
//! A small trait hierarchy over parameterized SQL so repositories can run
//! against the pooled PostgreSQL client in production and against a
//! scripted executor in tests.
//!
//! - [`SqlExecutor`] - Run statements (required)
//! - [`Transaction`] - Transaction lifecycle (commit/rollback)
//! - [`DbClient`] - Connection management and transaction creation
//!
//! # Usage
//!
//! ```ignore
//! use videogames::db::QueryExt;
//!
//! let rows = client
//!     .query("SELECT id, title FROM video_games WHERE is_multiplayer = $1")
//!     .param(true)
//!     .fetch_all()
//!     .await?;
//!
//! let removed = client
//!     .query("DELETE FROM video_games WHERE id = $1")
//!     .param(id)
//!     .run()
//!     .await?;
//! ```

mod query;
mod row;
mod traits;
mod value;

pub mod backends;

#[cfg(test)]
pub(crate) mod testing;

pub use query::{Query, QueryExt};
pub use row::{Params, Row, RowStream};
pub use traits::{DbClient, SqlExecutor, Transaction};
pub use value::SqlValue;
