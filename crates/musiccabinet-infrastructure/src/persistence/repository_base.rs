use musiccabinet_domain::shared::DomainError;
use sqlx::query::{Query, QueryAs};
use sqlx::sqlite::{SqliteArguments, SqliteQueryResult, SqliteRow};
use sqlx::{FromRow, Sqlite, SqlitePool};
use std::sync::Arc;
use std::time::Instant;
use tracing::debug;

use super::RepositoryErrorMapper;

/// Shared pool handle plus query helpers that label and time every statement.
#[derive(Clone)]
pub struct SqliteRepositoryBase {
    pool: Arc<SqlitePool>,
}

impl SqliteRepositoryBase {
    pub fn new(pool: Arc<SqlitePool>) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub async fn execute<'q>(
        &self,
        query: Query<'q, Sqlite, SqliteArguments<'q>>,
        context: &str,
    ) -> Result<SqliteQueryResult, DomainError> {
        let start = Instant::now();
        let result = query
            .execute(self.pool.as_ref())
            .await
            .map_err(|e| RepositoryErrorMapper::map_sqlx_error(e, context))?;

        debug!(
            operation = context,
            rows_affected = result.rows_affected(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Statement executed"
        );
        Ok(result)
    }

    pub async fn fetch_optional<'q, T>(
        &self,
        query: QueryAs<'q, Sqlite, T, SqliteArguments<'q>>,
        context: &str,
    ) -> Result<Option<T>, DomainError>
    where
        T: Send + Unpin + for<'r> FromRow<'r, SqliteRow>,
    {
        let start = Instant::now();
        let row = query
            .fetch_optional(self.pool.as_ref())
            .await
            .map_err(|e| RepositoryErrorMapper::map_sqlx_error(e, context))?;

        debug!(
            operation = context,
            found = row.is_some(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Query executed"
        );
        Ok(row)
    }

    pub async fn fetch_all<'q, T>(
        &self,
        query: QueryAs<'q, Sqlite, T, SqliteArguments<'q>>,
        context: &str,
    ) -> Result<Vec<T>, DomainError>
    where
        T: Send + Unpin + for<'r> FromRow<'r, SqliteRow>,
    {
        let start = Instant::now();
        let rows = query
            .fetch_all(self.pool.as_ref())
            .await
            .map_err(|e| RepositoryErrorMapper::map_sqlx_error(e, context))?;

        debug!(
            operation = context,
            rows = rows.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Query executed"
        );
        Ok(rows)
    }

    pub async fn begin(&self) -> Result<sqlx::Transaction<'static, Sqlite>, DomainError> {
        self.pool
            .begin()
            .await
            .map_err(|e| RepositoryErrorMapper::map_sqlx_error(e, "Begin transaction"))
    }
}
