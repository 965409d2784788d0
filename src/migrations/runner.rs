//! Migration runner with version tracking.

use crate::db::{DbClient, Query, SqlExecutor};
use crate::error::AppError;
use crate::migrations::create_register;

/// Result of running migrations.
#[derive(Debug, Clone)]
pub struct MigrationResult {
    /// Schema version before migrations ran.
    pub previous_version: u32,
    /// Schema version after migrations ran.
    pub current_version: u32,
    /// List of migration IDs that were applied.
    pub applied_migrations: Vec<String>,
}

/// Run all pending migrations in version order.
pub async fn run_migrations<C: DbClient>(client: &C) -> Result<MigrationResult, AppError> {
    ensure_schema_version_table(client).await?;

    let previous_version = get_schema_version(client).await?;
    let register = create_register();
    let (current_version, applied) = register.run_pending(client, previous_version).await?;

    Ok(MigrationResult {
        previous_version,
        current_version,
        applied_migrations: applied,
    })
}

/// Drop every table owned by the application, including version tracking.
///
/// The next [`run_migrations`] recreates the schema and reseeds it.
pub async fn reset<E: SqlExecutor + ?Sized>(client: &E) -> Result<(), AppError> {
    tracing::warn!("Dropping video_games and schema_version");
    client
        .batch_sql(
            "DROP TABLE IF EXISTS video_games;
             DROP TABLE IF EXISTS schema_version;",
        )
        .await
}

const CREATE_SCHEMA_VERSION_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS schema_version (
    id INTEGER PRIMARY KEY DEFAULT 1 CHECK (id = 1),
    version INTEGER NOT NULL DEFAULT 0,
    applied_migrations TEXT[] NOT NULL DEFAULT '{}',
    last_applied_at TIMESTAMPTZ DEFAULT NOW()
);
INSERT INTO schema_version (id, version) VALUES (1, 0) ON CONFLICT (id) DO NOTHING;
"#;

async fn ensure_schema_version_table<E: SqlExecutor + ?Sized>(client: &E) -> Result<(), AppError> {
    client.batch_sql(CREATE_SCHEMA_VERSION_TABLE).await
}

/// Current schema version; 0 on a fresh database.
async fn get_schema_version<E: SqlExecutor + ?Sized>(client: &E) -> Result<u32, AppError> {
    let row = Query::new(client, "SELECT version FROM schema_version WHERE id = 1")
        .fetch_one()
        .await?;

    let Some(row) = row else {
        return Ok(0);
    };
    let version: i64 = row.get("version")?;
    u32::try_from(version)
        .map_err(|_| AppError::Internal(format!("invalid schema version {}", version)))
}

/// Record `migration_id` as applied, inside the caller's transaction.
pub(crate) async fn record_version(
    ctx: &(dyn SqlExecutor + '_),
    version: u32,
    migration_id: &str,
) -> Result<(), AppError> {
    Query::new(
        ctx,
        "UPDATE schema_version
         SET version = $1,
             applied_migrations = array_append(applied_migrations, $2),
             last_applied_at = NOW()
         WHERE id = 1",
    )
    .param(i64::from(version))
    .param(migration_id)
    .run()
    .await?;
    Ok(())
}
