use musiccabinet_domain::shared::DomainError;
use sqlx::error::ErrorKind;

/// Translates sqlx failures into domain errors, keeping the operation label.
pub struct RepositoryErrorMapper;

impl RepositoryErrorMapper {
    pub fn map_sqlx_error(error: sqlx::Error, context: &str) -> DomainError {
        match error {
            sqlx::Error::RowNotFound => DomainError::NotFound(context.to_string()),
            sqlx::Error::Database(db_error) => match db_error.kind() {
                ErrorKind::UniqueViolation
                | ErrorKind::ForeignKeyViolation
                | ErrorKind::NotNullViolation
                | ErrorKind::CheckViolation => DomainError::DataIntegrity(format!(
                    "{}: constraint violation: {}",
                    context,
                    db_error.message()
                )),
                _ => DomainError::Repository(format!("{}: {}", context, db_error.message())),
            },
            sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed => {
                DomainError::Infrastructure(format!("{}: {}", context, error))
            }
            sqlx::Error::ColumnDecode { .. } | sqlx::Error::Decode(_) => {
                DomainError::Serialization(format!("{}: {}", context, error))
            }
            other => DomainError::Repository(format!("{}: {}", context, other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_not_found_maps_to_not_found() {
        let err = RepositoryErrorMapper::map_sqlx_error(sqlx::Error::RowNotFound, "Find artist");
        assert!(matches!(err, DomainError::NotFound(ref msg) if msg == "Find artist"));
    }

    #[test]
    fn test_pool_timeout_is_infrastructure() {
        let err = RepositoryErrorMapper::map_sqlx_error(sqlx::Error::PoolTimedOut, "Log invocation");
        assert!(matches!(err, DomainError::Infrastructure(_)));
    }
}
