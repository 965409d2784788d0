//! Application context: the explicit process-wide state.

use std::sync::Arc;

use axum::extract::FromRef;

use crate::config::Config;
use crate::db::backends::postgres::PostgresClient;
use crate::db::SqlExecutor;
use crate::error::AppError;
use crate::repositories::VideoGameRepository;

/// Root application context shared by every request handler.
///
/// Holds the storage executor and configuration. Handlers extract what
/// they need through the [`FromRef`] impls below.
pub struct Context<E: SqlExecutor = PostgresClient> {
    /// Storage executor; the connection pool in production.
    pub db: Arc<E>,
    /// Application configuration.
    pub config: Arc<Config>,
}

impl<E: SqlExecutor> Clone for Context<E> {
    fn clone(&self) -> Self {
        Self {
            db: Arc::clone(&self.db),
            config: Arc::clone(&self.config),
        }
    }
}

impl<E: SqlExecutor> Context<E> {
    /// Creates a new context with the given dependencies.
    pub fn new(db: E, config: Config) -> Self {
        Self {
            db: Arc::new(db),
            config: Arc::new(config),
        }
    }

    pub fn video_games(&self) -> VideoGameRepository<E> {
        VideoGameRepository::new(Arc::clone(&self.db))
    }
}

impl Context<PostgresClient> {
    /// Builds the connection pool and checks the database is reachable.
    pub async fn connect(config: Config) -> Result<Self, AppError> {
        tracing::info!("Connecting to PostgreSQL at {}", config.database.describe());
        let client = PostgresClient::connect(config.database.pg_config()?, config.database.pool_size)?;
        client.ping().await?;
        tracing::info!("Connected to PostgreSQL");

        Ok(Self::new(client, config))
    }

    /// Closes the connection pool.
    pub fn shutdown(&self) {
        tracing::info!("Closing database pool");
        self.db.close();
    }
}

impl<E: SqlExecutor> FromRef<Context<E>> for VideoGameRepository<E> {
    fn from_ref(ctx: &Context<E>) -> Self {
        ctx.video_games()
    }
}

impl<E: SqlExecutor> FromRef<Context<E>> for Arc<Config> {
    fn from_ref(ctx: &Context<E>) -> Self {
        Arc::clone(&ctx.config)
    }
}
