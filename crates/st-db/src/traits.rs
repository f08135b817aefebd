//! Database trait definition

use crate::error::DbResult;

/// Connection the migration engine runs against.
///
/// Implementations serialize access internally and must be Send + Sync so a
/// single connection can be shared behind an `Arc`.
pub trait Database: Send + Sync {
    /// Execute a single statement, returns affected rows
    fn execute(&self, sql: &str) -> DbResult<usize>;

    /// Execute a script of one or more statements
    fn execute_batch(&self, sql: &str) -> DbResult<()>;

    /// Run a query and return every row with each column rendered as text
    fn query_rows(&self, sql: &str) -> DbResult<Vec<Vec<String>>>;

    /// Check if a table or view exists.
    ///
    /// `name` may be schema-qualified; unqualified names are looked up in
    /// the connection's current schema.
    fn relation_exists(&self, name: &str) -> DbResult<bool>;

    /// Database type identifier for logging
    fn db_type(&self) -> &'static str;
}
