//! Backend implementations for different databases.
//!
//! Each backend implements the core traits from [`crate::db`]:
//!
//! - [`SqlExecutor`](crate::db::SqlExecutor) - Required
//! - [`Transaction`](crate::db::Transaction) - Required
//! - [`DbClient`](crate::db::DbClient) - Required

pub mod postgres;
