use sqlx::PgPool;

use crate::app_error::AppError;

pub mod payment;

/// SQLSTATE for unique_violation.
const UNIQUE_VIOLATION: &str = "23505";

pub const DUPLICATE_ENTRY: &str = "Duplicate entry";

#[derive(Clone)]
pub struct PostgresPersistence {
    pool: PgPool,
}

impl PostgresPersistence {
    pub fn new(pool: PgPool) -> Self {
        PostgresPersistence { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::RowNotFound => AppError::NotFound,
            sqlx::Error::Database(db_err) if db_err.code().as_deref() == Some(UNIQUE_VIOLATION) => {
                tracing::warn!(error = %db_err, "Unique constraint violated");
                AppError::InvalidInput(DUPLICATE_ENTRY.into())
            }
            _ => {
                // Log the actual error for debugging, but don't expose details
                tracing::error!(error = ?err, "Database error");
                AppError::Database("Database operation failed".into())
            }
        }
    }
}
