//! Database-specific error types and conversions.

use pipit_core::error::PipitError;

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
    Corrupt(String),

    #[error("Record not found: {entity} with id {id}")]
    NotFound { entity: String, id: String },

    #[error("Duplicate {entity}")]
    Duplicate { entity: String },
}

/// Classify a failed write, surfacing uniqueness conflicts as
/// [`DbError::Duplicate`].
///
/// A clash on a record id carries the `AlreadyExists` kind. A clash on a
/// `UNIQUE` index is reported by SurrealDB with the `Internal` kind and
/// only its message (`Database index `…` already contains …`) names the
/// conflict, so that text is matched as well.
pub(crate) fn write_error(entity: &str, err: surrealdb::Error) -> DbError {
    if err.is_already_exists() || is_unique_index_conflict(&err) {
        DbError::Duplicate {
            entity: entity.into(),
        }
    } else {
        DbError::Query(err.to_string())
    }
}

fn is_unique_index_conflict(err: &surrealdb::Error) -> bool {
    let mut current = Some(err);
    while let Some(e) = current {
        let message = e.message();
        if message.contains("index") && message.contains("already contains") {
            return true;
        }
        current = e.cause();
    }
    false
}

impl From<DbError> for PipitError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, id } => PipitError::NotFound { entity, id },
            DbError::Duplicate { entity } => PipitError::AlreadyExists { entity },
            other => PipitError::Database(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_id_clash_is_duplicate() {
        let err = surrealdb::Error::already_exists(
            "Database record `user:x` already exists".into(),
            None,
        );
        assert!(matches!(
            write_error("user", err),
            DbError::Duplicate { entity } if entity == "user"
        ));
    }

    #[test]
    fn unique_index_clash_is_duplicate() {
        let err = surrealdb::Error::internal(
            "Database index `idx_user_username` already contains 'alice', with record `user:1`".into(),
        );
        assert!(matches!(write_error("user", err), DbError::Duplicate { .. }));
    }

    #[test]
    fn other_failures_are_query_errors() {
        let err = surrealdb::Error::internal("Found NONE for field `content`".into());
        assert!(matches!(write_error("post", err), DbError::Query(_)));
    }

    #[test]
    fn duplicate_maps_to_already_exists() {
        let err: PipitError = DbError::Duplicate {
            entity: "user".into(),
        }
        .into();
        assert!(matches!(err, PipitError::AlreadyExists { entity } if entity == "user"));
    }
}
