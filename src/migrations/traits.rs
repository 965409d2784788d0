//! Migration trait and registry.

use futures::future::BoxFuture;

use crate::db::{DbClient, SqlExecutor, Transaction as _};
use crate::error::AppError;
use crate::migrations::runner::record_version;

/// A single forward-only schema step.
///
/// Uses BoxFuture to avoid `'static` requirements from `#[async_trait]`.
pub trait Migration: Send + Sync {
    fn id(&self) -> &'static str;
    fn version(&self) -> u32;
    fn description(&self) -> &'static str;
    fn up<'a>(&'a self, ctx: &'a (dyn SqlExecutor + 'a)) -> BoxFuture<'a, Result<(), AppError>>;
}

/// Ordered set of migrations.
pub struct Register {
    migrations: Vec<Box<dyn Migration>>,
}

impl Register {
    pub fn new() -> Self {
        Self {
            migrations: Vec::new(),
        }
    }

    pub fn register(mut self, migration: impl Migration + 'static) -> Self {
        self.migrations.push(Box::new(migration));
        self
    }

    pub fn iter(&self) -> impl Iterator<Item = &dyn Migration> {
        self.migrations.iter().map(|m| m.as_ref())
    }

    /// Highest version known to this register.
    pub fn latest_version(&self) -> u32 {
        self.iter().map(|m| m.version()).max().unwrap_or(0)
    }

    /// Run all migrations above `current_version`.
    ///
    /// Each migration and its version bump share one transaction, so a
    /// failed step leaves neither schema changes nor a version record.
    /// Returns (new_version, applied_migration_ids).
    pub async fn run_pending<C: DbClient>(
        &self,
        client: &C,
        current_version: u32,
    ) -> Result<(u32, Vec<String>), AppError> {
        let mut applied = vec![];
        let mut new_version = current_version;

        for migration in &self.migrations {
            if migration.version() <= current_version {
                continue;
            }

            tracing::info!(
                "Applying migration {} (v{}): {}",
                migration.id(),
                migration.version(),
                migration.description()
            );

            let txn = client.begin().await?;
            let result = async {
                migration.up(&txn).await?;
                record_version(&txn, migration.version(), migration.id()).await
            }
            .await;

            match result {
                Ok(()) => txn.commit().await?,
                Err(e) => {
                    tracing::error!("Migration {} failed: {}", migration.id(), e);
                    txn.rollback().await?;
                    return Err(e);
                }
            }

            new_version = migration.version();
            applied.push(migration.id().to_string());
        }

        Ok((new_version, applied))
    }
}

impl Default for Register {
    fn default() -> Self {
        Self::new()
    }
}
