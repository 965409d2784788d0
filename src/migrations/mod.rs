//! Schema setup for PostgreSQL with version tracking.
//!
//! Migrations are:
//! - **Forward-only**: No rollback support
//! - **Version-tracked**: Schema version stored in the `schema_version` table
//! - **Transactional**: Each step and its version bump commit together
//!
//! [`reset`] drops everything so the next run starts from a fresh schema.

mod m001_schema;
mod m002_seed_data;
mod runner;
mod traits;

pub use m001_schema::M001Schema;
pub use m002_seed_data::M002SeedData;
pub use runner::{reset, run_migrations, MigrationResult};
pub use traits::{Migration, Register};

/// All migrations in version order.
pub fn create_register() -> Register {
    Register::new().register(M001Schema).register(M002SeedData)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_versions_strictly_increase() {
        let register = create_register();
        let versions: Vec<u32> = register.iter().map(|m| m.version()).collect();
        assert!(versions.windows(2).all(|w| w[0] < w[1]));
        assert_eq!(register.latest_version(), 2);
    }
}
