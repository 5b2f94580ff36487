//! Schema definitions and migration runner for SurrealDB.
//!
//! All table definitions use SCHEMAFULL mode. Identifiers are stored as
//! strings; sessions are keyed by the SHA-256 of their identifier and
//! registry entries by their normalized domain.

use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use tracing::info;

use crate::error::DbError;

// -----------------------------------------------------------------------
// Migration tracking
// -----------------------------------------------------------------------

const MIGRATION_TABLE_DDL: &str = "\
DEFINE TABLE IF NOT EXISTS _migration SCHEMAFULL;
DEFINE FIELD IF NOT EXISTS version ON TABLE _migration TYPE int;
DEFINE FIELD IF NOT EXISTS name ON TABLE _migration TYPE string;
DEFINE FIELD IF NOT EXISTS applied_at ON TABLE _migration TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX IF NOT EXISTS idx_migration_version ON TABLE _migration \
    COLUMNS version UNIQUE;
";

#[derive(Debug, SurrealValue)]
struct MigrationRecord {
    version: u32,
}

struct Migration {
    version: u32,
    name: &'static str,
    sql: &'static str,
}

static MIGRATIONS: &[Migration] = &[Migration {
    version: 1,
    name: "sso_broker_schema",
    sql: SCHEMA_V1,
}];

// -----------------------------------------------------------------------
// Schema v1
// -----------------------------------------------------------------------

const SCHEMA_V1: &str = "\
-- =======================================================================
-- Sessions (record key = sha256(session_id))
-- =======================================================================
DEFINE TABLE session SCHEMAFULL;
DEFINE FIELD principal_id ON TABLE session TYPE string;
DEFINE FIELD role ON TABLE session TYPE string \
    ASSERT $value IN ['admin', 'user'];
DEFINE FIELD permissions ON TABLE session TYPE array<string>;
DEFINE FIELD company_id ON TABLE session TYPE option<string>;
DEFINE FIELD subscription_tier ON TABLE session TYPE string;
DEFINE FIELD source_credential_fingerprint ON TABLE session TYPE string;
DEFINE FIELD created_at ON TABLE session TYPE datetime;
DEFINE FIELD expires_at ON TABLE session TYPE datetime;
DEFINE INDEX idx_session_principal ON TABLE session COLUMNS principal_id;
DEFINE INDEX idx_session_expires ON TABLE session COLUMNS expires_at;

-- =======================================================================
-- Domain registry (record key = normalized domain)
-- =======================================================================
DEFINE TABLE domain_registry SCHEMAFULL;
DEFINE FIELD application_name ON TABLE domain_registry TYPE string;
DEFINE FIELD allowed_roles ON TABLE domain_registry \
    TYPE option<array<string>>;

-- =======================================================================
-- Master credentials (record key = credential id)
-- =======================================================================
DEFINE TABLE master_credential SCHEMAFULL;
DEFINE FIELD secret_hash ON TABLE master_credential TYPE string;
DEFINE FIELD principal_id ON TABLE master_credential TYPE string;
DEFINE FIELD role ON TABLE master_credential TYPE string \
    ASSERT $value IN ['admin', 'user'];
DEFINE FIELD permissions ON TABLE master_credential TYPE array<string>;
DEFINE FIELD company_id ON TABLE master_credential TYPE option<string>;
DEFINE FIELD subscription_tier ON TABLE master_credential TYPE string;
DEFINE FIELD revoked ON TABLE master_credential TYPE bool DEFAULT false;
DEFINE FIELD created_at ON TABLE master_credential TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_credential_principal ON TABLE master_credential \
    COLUMNS principal_id;
";

/// Run all pending migrations against the database.
///
/// Creates the `_migration` tracking table on first run, then applies
/// each migration whose version exceeds the current maximum.
pub async fn run_migrations<C: Connection>(db: &Surreal<C>) -> Result<(), DbError> {
    db.query(MIGRATION_TABLE_DDL)
        .await?
        .check()
        .map_err(|e| DbError::Migration(e.to_string()))?;

    let mut result = db
        .query("SELECT version FROM _migration ORDER BY version DESC LIMIT 1")
        .await?;
    let records: Vec<MigrationRecord> = result.take(0)?;
    let current_version = records.first().map(|m| m.version).unwrap_or(0);

    for migration in MIGRATIONS.iter().filter(|m| m.version > current_version) {
        info!(
            version = migration.version,
            name = migration.name,
            "Applying migration"
        );
        db.query(migration.sql).await?.check().map_err(|e| {
            DbError::Migration(format!(
                "v{} '{}' failed: {}",
                migration.version, migration.name, e,
            ))
        })?;

        db.query("CREATE _migration SET version = $version, name = $name")
            .bind(("version", migration.version))
            .bind(("name", migration.name))
            .await?
            .check()
            .map_err(|e| {
                DbError::Migration(format!(
                    "recording v{} failed: {}",
                    migration.version, e,
                ))
            })?;
    }

    Ok(())
}

/// Raw schema DDL for version 1.
pub fn schema_v1() -> &'static str {
    SCHEMA_V1
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schema_defines_every_table() {
        for table in ["session", "domain_registry", "master_credential"] {
            assert!(
                SCHEMA_V1.contains(&format!("DEFINE TABLE {table} SCHEMAFULL")),
                "missing table {table}"
            );
        }
    }

    #[test]
    fn migrations_are_ordered() {
        for window in MIGRATIONS.windows(2) {
            assert!(window[0].version < window[1].version);
        }
    }
}
