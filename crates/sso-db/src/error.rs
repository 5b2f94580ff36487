//! Database-specific error types and conversions.

use sso_core::error::SsoError;

/// Database-layer error type.
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("SurrealDB error: {0}")]
    Surreal(#[from] surrealdb::Error),

    #[error("Migration failed: {0}")]
    Migration(String),

    #[error("Query failed: {0}")]
    Query(String),

    #[error("Corrupt record: {0}")]
    Decode(String),

    #[error("Record not found: {entity} with id {id}")]
    NotFound { entity: String, id: String },

    #[error("Hashing failed: {0}")]
    Hash(String),
}

impl From<DbError> for SsoError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, id } => SsoError::NotFound { entity, id },
            DbError::Hash(msg) => SsoError::Crypto(msg),
            other => SsoError::Database(other.to_string()),
        }
    }
}

/// Map a failed `CREATE`. A duplicate record id is a conflict; schema
/// and assertion violations stay query failures.
pub(crate) fn create_failure(entity: &str, err: impl std::fmt::Display) -> SsoError {
    let message = err.to_string();
    if message.contains("already exists") {
        SsoError::AlreadyExists {
            entity: entity.to_string(),
        }
    } else {
        DbError::Query(message).into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_duplicates_become_conflicts() {
        let dup = create_failure(
            "session",
            "Database record `session:abc` already exists",
        );
        assert!(matches!(dup, SsoError::AlreadyExists { .. }));

        let assertion = create_failure(
            "session",
            "Found 'owner' for field `role`, but field must conform to: $value IN ['admin', 'user']",
        );
        assert!(matches!(assertion, SsoError::Database(_)));
    }
}
