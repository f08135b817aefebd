//! Opening a connection from a configured driver and url.

use crate::duckdb::DuckDbBackend;
use crate::error::DbResult;
use crate::traits::Database;
use st_core::Driver;
use std::path::Path;
use std::sync::Arc;

/// Open a connection for `driver` at `url`.
///
/// Relative DuckDB file paths resolve against `base_dir`, so a project's
/// `duckdb:warehouse.duckdb` lands next to its configuration file no matter
/// where the process was started.
pub fn connect(driver: Driver, url: &str, base_dir: &Path) -> DbResult<Arc<dyn Database>> {
    match driver {
        Driver::DuckDb => {
            let target = driver.target_of(url);
            let backend = if target == ":memory:" {
                log::debug!("Opening in-memory DuckDB database");
                DuckDbBackend::in_memory()?
            } else {
                let path = base_dir.join(target);
                log::debug!("Opening DuckDB database at {}", path.display());
                DuckDbBackend::from_path(&path)?
            };
            Ok(Arc::new(backend))
        }
    }
}
