//! Video game catalog.
//!
//! A CRUD web application over a single PostgreSQL table, exposed as
//! server-rendered HTML pages and a JSON API.

pub mod cli;
pub mod config;
pub mod context;
pub mod db;
pub mod error;
pub mod http;
pub mod migrations;
pub mod models;
pub mod repositories;
