//! DuckDB database backend implementation

use crate::error::{DbError, DbResult};
use crate::traits::Database;
use duckdb::Connection;
use st_core::sql_utils::{quote_literal, split_qualified_name};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

/// DuckDB database backend
pub struct DuckDbBackend {
    conn: Mutex<Connection>,
}

impl DuckDbBackend {
    /// Create a new in-memory DuckDB connection
    pub fn in_memory() -> DbResult<Self> {
        let conn =
            Connection::open_in_memory().map_err(|e| DbError::ConnectionError(e.to_string()))?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Create a new DuckDB connection from a file path
    pub fn from_path(path: &Path) -> DbResult<Self> {
        let conn = Connection::open(path)
            .map_err(|e| DbError::ConnectionError(format!("{}: {}", path.display(), e)))?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Create from path string (handles :memory: special case)
    pub fn new(path: &str) -> DbResult<Self> {
        if path == ":memory:" {
            Self::in_memory()
        } else {
            Self::from_path(Path::new(path))
        }
    }

    fn lock(&self) -> DbResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| DbError::MutexPoisoned(e.to_string()))
    }
}

impl Database for DuckDbBackend {
    fn execute(&self, sql: &str) -> DbResult<usize> {
        let conn = self.lock()?;
        Ok(conn.execute(sql, [])?)
    }

    fn execute_batch(&self, sql: &str) -> DbResult<()> {
        let conn = self.lock()?;
        Ok(conn.execute_batch(sql)?)
    }

    fn query_rows(&self, sql: &str) -> DbResult<Vec<Vec<String>>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(sql)?;
        let rows = stmt
            .query_map([], |row| {
                let col_count = row.as_ref().column_count();
                Ok((0..col_count)
                    .map(|i| get_column_as_string(row, i))
                    .collect::<Vec<_>>())
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    fn relation_exists(&self, name: &str) -> DbResult<bool> {
        let Some(parts) = split_qualified_name(name) else {
            return Err(DbError::ExecutionError(format!(
                "Invalid table name '{}'",
                name
            )));
        };
        let schema_filter = match parts.schema {
            Some(schema) => quote_literal(schema),
            None => "current_schema()".to_string(),
        };
        let catalog_filter = match parts.catalog {
            Some(catalog) => quote_literal(catalog),
            None => "current_database()".to_string(),
        };
        let sql = format!(
            "SELECT COUNT(*) FROM information_schema.tables WHERE table_catalog = {} AND table_schema = {} AND table_name = {}",
            catalog_filter,
            schema_filter,
            quote_literal(parts.table)
        );

        let conn = self.lock()?;
        let count: i64 = conn.query_row(&sql, [], |row| row.get(0))?;
        Ok(count > 0)
    }

    fn db_type(&self) -> &'static str {
        "duckdb"
    }
}

/// Read a column value as a String, trying multiple DuckDB types.
///
/// DuckDB integer columns return `None` for `Option<String>`, so we try
/// String -> i64 -> f64 -> bool, and render SQL NULL as an empty string.
fn get_column_as_string(row: &duckdb::Row<'_>, idx: usize) -> String {
    if let Ok(Some(s)) = row.get::<_, Option<String>>(idx) {
        return s;
    }
    if let Ok(Some(n)) = row.get::<_, Option<i64>>(idx) {
        return n.to_string();
    }
    if let Ok(Some(f)) = row.get::<_, Option<f64>>(idx) {
        return f.to_string();
    }
    if let Ok(Some(b)) = row.get::<_, Option<bool>>(idx) {
        return b.to_string();
    }
    String::new()
}

#[cfg(test)]
#[path = "duckdb_test.rs"]
mod tests;
