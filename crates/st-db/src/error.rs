//! Error types for st-db

use thiserror::Error;

/// Database operation errors
#[derive(Error, Debug)]
pub enum DbError {
    /// Connection error (D001)
    #[error("[D001] Database connection failed: {0}")]
    ConnectionError(String),

    /// Statement execution error (D002)
    #[error("[D002] SQL execution failed: {0}")]
    ExecutionError(String),

    /// Primary key or unique constraint rejected a write (D003)
    #[error("[D003] Constraint violation: {0}")]
    ConstraintViolation(String),

    /// Table not found (D004)
    #[error("[D004] Table or view not found: {0}")]
    TableNotFound(String),

    /// Mutex poisoned (D005)
    #[error("[D005] Database mutex poisoned: {0}")]
    MutexPoisoned(String),
}

/// Result type alias for DbError
pub type DbResult<T> = Result<T, DbError>;

impl From<duckdb::Error> for DbError {
    fn from(err: duckdb::Error) -> Self {
        // duckdb::Error carries no structured error class, only the message.
        let msg = err.to_string();
        if msg.contains("Constraint Error") || msg.contains("violates primary key") {
            DbError::ConstraintViolation(msg)
        } else if msg.contains("Table with name")
            || msg.contains("Table or view with name")
            || (msg.contains("Catalog Error") && msg.contains("Table") && msg.contains("not found"))
        {
            DbError::TableNotFound(msg)
        } else {
            DbError::ExecutionError(msg)
        }
    }
}
