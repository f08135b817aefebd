use super::*;
use st_core::{InMemoryResourceLoader, Resource, ResourceSource, VersionExtractor};
use st_db::DuckDbBackend;
use std::fs;
use std::path::PathBuf;
use tempfile::tempdir;

const MIGRATIONS: &str = "classpath:/db/migrations/*";

fn memory_db() -> Arc<dyn Database> {
    Arc::new(DuckDbBackend::in_memory().unwrap())
}

fn manager(
    db: &Arc<dyn Database>,
    loader: InMemoryResourceLoader,
    extractor: VersionExtractor,
) -> MigrationManager {
    let resolver = MigrationResolver::new(
        vec!["classpath:/db/migrations/".to_string()],
        extractor,
        loader,
    );
    MigrationManager::new(
        Arc::clone(db),
        resolver,
        SimpleVersionStrategy::new(),
        DatabaseKind::DuckDb,
    )
}

fn init_and_add_col() -> InMemoryResourceLoader {
    InMemoryResourceLoader::new()
        .with_script(
            MIGRATIONS,
            "002_add_col.sql",
            "ALTER TABLE users ADD COLUMN email VARCHAR;",
        )
        .with_script(
            MIGRATIONS,
            "001_init.sql",
            "CREATE TABLE users (id INTEGER NOT NULL, name VARCHAR);",
        )
}

fn names(versions: Vec<&Version>) -> Vec<String> {
    versions.into_iter().map(|v| v.to_string()).collect()
}

#[test]
fn test_migrate_applies_in_order() {
    let db = memory_db();
    let mut manager = manager(&db, init_and_add_col(), VersionExtractor::BaseName);

    let report = manager.migrate().unwrap();

    assert_eq!(names(report.applied_versions()), vec!["001_init", "002_add_col"]);
    assert!(report.skipped.is_empty());
    assert!(report.is_success());
    assert_eq!(manager.phase(), RunPhase::Completed);

    let applied = manager.applied_versions().unwrap();
    assert_eq!(
        applied.iter().map(Version::as_str).collect::<Vec<_>>(),
        vec!["001_init", "002_add_col"]
    );
    db.execute("INSERT INTO users VALUES (1, 'a', 'a@example.com')")
        .unwrap();
}

#[test]
fn test_migrate_is_idempotent() {
    let db = memory_db();
    let mut manager = manager(&db, init_and_add_col(), VersionExtractor::BaseName);

    manager.migrate().unwrap();
    let second = manager.migrate().unwrap();

    assert!(second.applied.is_empty());
    assert_eq!(names(second.skipped.iter().collect()), vec!["001_init", "002_add_col"]);
    assert!(manager.validate().unwrap());
}

#[test]
fn test_applied_list_sorted_regardless_of_discovery_order() {
    let db = memory_db();
    let mut loader = InMemoryResourceLoader::new();
    for version in ["20240103", "20240101", "20240110", "20240102"] {
        loader = loader.with_script(
            MIGRATIONS,
            &format!("{version}_step.sql"),
            &format!("CREATE TABLE t_{version} (id INT);"),
        );
    }
    let mut manager = manager(&db, loader, VersionExtractor::default());

    let report = manager.migrate().unwrap();
    assert_eq!(
        names(report.applied_versions()),
        vec!["20240101", "20240102", "20240103", "20240110"]
    );
}

#[test]
fn test_failure_stops_run_and_keeps_earlier_migrations() {
    let db = memory_db();
    let broken = InMemoryResourceLoader::new()
        .with_script(MIGRATIONS, "001_init.sql", "CREATE TABLE a (id INT);")
        .with_script(MIGRATIONS, "002_broken.sql", "CREATE TABLE (;")
        .with_script(MIGRATIONS, "003_more.sql", "CREATE TABLE c (id INT);");
    let mut first = manager(&db, broken, VersionExtractor::default());

    let err = first.migrate().unwrap_err();
    assert_eq!(first.phase(), RunPhase::Failed);
    match &err {
        MigrateError::MigrationExecution {
            version, report, ..
        } => {
            assert_eq!(version, "002");
            assert_eq!(names(report.applied_versions()), vec!["001"]);
            let failed = report.failed.as_ref().unwrap();
            assert_eq!(failed.version, "002");
            assert!(!failed.error.is_empty());
        }
        other => panic!("expected MigrationExecution, got {other}"),
    }
    assert!(err.report().is_some());
    assert!(db.relation_exists("a").unwrap());
    assert!(!db.relation_exists("c").unwrap());

    let fixed = InMemoryResourceLoader::new()
        .with_script(MIGRATIONS, "001_init.sql", "CREATE TABLE a (id INT);")
        .with_script(MIGRATIONS, "002_broken.sql", "CREATE TABLE b (id INT);")
        .with_script(MIGRATIONS, "003_more.sql", "CREATE TABLE c (id INT);");
    let mut second = manager(&db, fixed, VersionExtractor::default());

    let report = second.migrate().unwrap();
    assert_eq!(names(report.applied_versions()), vec!["002", "003"]);
    assert_eq!(names(report.skipped.iter().collect()), vec!["001"]);
}

#[test]
fn test_new_migration_is_picked_up_on_next_run() {
    let db = memory_db();
    let mut first = manager(&db, init_and_add_col(), VersionExtractor::BaseName);
    first.migrate().unwrap();

    let loader = init_and_add_col().with_script(
        MIGRATIONS,
        "003_index.sql",
        "CREATE INDEX users_name ON users (name);",
    );
    let mut second = manager(&db, loader, VersionExtractor::BaseName);

    assert!(!second.validate().unwrap());
    let pending = second.pending_migrations().unwrap();
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0].version(), &Version::new("003_index"));

    let report = second.migrate().unwrap();
    assert_eq!(names(report.applied_versions()), vec!["003_index"]);
}

#[test]
fn test_already_recorded_version_is_duplicate_application() {
    let db = memory_db();
    let strategy = SimpleVersionStrategy::new();
    strategy.ensure_tracking_table_exists(db.as_ref()).unwrap();
    strategy
        .record_applied(db.as_ref(), &Version::new("001_init"), 0)
        .unwrap();

    // A second run that diffed before the first one recorded its version.
    let manager = manager(&db, init_and_add_col(), VersionExtractor::BaseName);
    let stale = manager
        .resolve()
        .unwrap()
        .into_sorted()
        .into_iter()
        .next()
        .unwrap();
    let err = manager.apply(&stale).unwrap_err();

    assert!(
        matches!(err, MigrateError::DuplicateApplication { .. }),
        "got {err}"
    );
}

#[test]
fn test_concurrent_record_stops_run_with_partial_report() {
    let db = memory_db();
    // 002 records itself, as a second process racing this run would.
    let loader = InMemoryResourceLoader::new()
        .with_script(MIGRATIONS, "001_init.sql", "CREATE TABLE a (id INT);")
        .with_script(
            MIGRATIONS,
            "002_race.sql",
            "INSERT INTO schema_version VALUES ('002', TIMESTAMP '2024-01-01 00:00:00', 0);",
        )
        .with_script(MIGRATIONS, "003_more.sql", "CREATE TABLE c (id INT);");
    let mut manager = manager(&db, loader, VersionExtractor::default());

    let err = manager.migrate().unwrap_err();
    assert_eq!(manager.phase(), RunPhase::Failed);
    match &err {
        MigrateError::RunAborted {
            version, source, ..
        } => {
            assert_eq!(version, "002");
            assert!(
                matches!(**source, MigrateError::DuplicateApplication { .. }),
                "got {source}"
            );
        }
        other => panic!("expected RunAborted, got {other}"),
    }
    assert!(err.to_string().contains("[M004]"));

    let report = err.report().unwrap();
    assert_eq!(names(report.applied_versions()), vec!["001"]);
    let failed = report.failed.as_ref().unwrap();
    assert_eq!(failed.version, "002");
    assert!(failed.error.contains("[M001]"));
    assert!(!db.relation_exists("c").unwrap());
}

#[test]
fn test_unreadable_script_mid_run_keeps_partial_report() {
    let db = memory_db();
    let vanished = Resource {
        name: "002_gone.sql".to_string(),
        origin: "/nonexistent/002_gone.sql".to_string(),
        readable: true,
        source: ResourceSource::File(PathBuf::from("/nonexistent/002_gone.sql")),
    };
    let loader = InMemoryResourceLoader::new()
        .with_script(MIGRATIONS, "001_init.sql", "CREATE TABLE a (id INT);")
        .with_resource(MIGRATIONS, vanished);
    let mut manager = manager(&db, loader, VersionExtractor::default());

    let err = manager.migrate().unwrap_err();
    match &err {
        MigrateError::RunAborted { source, .. } => assert!(matches!(
            **source,
            MigrateError::Core(st_core::CoreError::ResourceAccess { .. })
        )),
        other => panic!("expected RunAborted, got {other}"),
    }
    let report = err.report().unwrap();
    assert_eq!(names(report.applied_versions()), vec!["001"]);
    assert_eq!(report.failed.as_ref().unwrap().origin, "/nonexistent/002_gone.sql");
    assert_eq!(
        manager
            .applied_versions()
            .unwrap()
            .iter()
            .map(Version::as_str)
            .collect::<Vec<_>>(),
        vec!["001"]
    );
}

#[test]
fn test_resolution_errors_surface_before_applying() {
    let db = memory_db();
    let loader = InMemoryResourceLoader::new()
        .with_script(MIGRATIONS, "20090101_a.sql", "CREATE TABLE a (id INT);")
        .with_script(MIGRATIONS, "20090101_b.sql", "CREATE TABLE b (id INT);");
    let mut manager = manager(&db, loader, VersionExtractor::default());

    let err = manager.migrate().unwrap_err();
    assert!(matches!(
        err,
        MigrateError::Core(st_core::CoreError::DuplicateVersion { .. })
    ));
    assert_eq!(manager.phase(), RunPhase::Failed);
    assert!(!db.relation_exists("a").unwrap());
}

#[test]
fn test_no_migrations_found() {
    let db = memory_db();
    let mut manager = manager(
        &db,
        InMemoryResourceLoader::new(),
        VersionExtractor::default(),
    );
    let err = manager.migrate().unwrap_err();
    assert!(matches!(
        err,
        MigrateError::Core(st_core::CoreError::NoMigrationsFound { .. })
    ));
}

#[test]
fn test_empty_script_is_recorded() {
    let db = memory_db();
    let loader = InMemoryResourceLoader::new().with_script(MIGRATIONS, "001_noop.sql", "  \n");
    let mut manager = manager(&db, loader, VersionExtractor::default());

    let report = manager.migrate().unwrap();
    assert_eq!(names(report.applied_versions()), vec!["001"]);
}

#[test]
fn test_status_reports_pending_and_orphaned() {
    let db = memory_db();
    let strategy = SimpleVersionStrategy::new();
    strategy.ensure_tracking_table_exists(db.as_ref()).unwrap();
    for version in ["000_legacy", "001_init"] {
        strategy
            .record_applied(db.as_ref(), &Version::new(version), 0)
            .unwrap();
    }

    let manager = manager(&db, init_and_add_col(), VersionExtractor::BaseName);
    let status = manager.status().unwrap();

    let entries: Vec<(String, bool)> = status
        .entries
        .iter()
        .map(|e| (e.version.to_string(), e.applied))
        .collect();
    assert_eq!(
        entries,
        vec![
            ("001_init".to_string(), true),
            ("002_add_col".to_string(), false)
        ]
    );
    assert_eq!(names(status.orphaned.iter().collect()), vec!["000_legacy"]);
}

#[test]
fn test_status_does_not_create_tracking_table() {
    let db = memory_db();
    let manager = manager(&db, init_and_add_col(), VersionExtractor::BaseName);

    let status = manager.status().unwrap();
    assert_eq!(status.pending_count(), 2);
    assert!(!db.relation_exists("schema_version").unwrap());
}

#[test]
fn test_drop_tracking_table_allows_reapplying() {
    let db = memory_db();
    let loader = InMemoryResourceLoader::new().with_script(
        MIGRATIONS,
        "001_init.sql",
        "CREATE TABLE IF NOT EXISTS a (id INT);",
    );
    let mut manager = manager(&db, loader, VersionExtractor::default());
    manager.migrate().unwrap();

    manager.drop_tracking_table().unwrap();
    assert!(!db.relation_exists("schema_version").unwrap());

    let report = manager.migrate().unwrap();
    assert_eq!(names(report.applied_versions()), vec!["001"]);
}

#[test]
fn test_from_config_end_to_end() {
    let dir = tempdir().unwrap();
    let migrations = dir.path().join("db/duckdb");
    fs::create_dir_all(&migrations).unwrap();
    fs::write(migrations.join("001_init.sql"), "CREATE TABLE t (id INT);").unwrap();
    fs::write(migrations.join("002_seed.sql"), "INSERT INTO t VALUES (1);").unwrap();
    fs::write(
        dir.path().join("stratum.yml"),
        r#"
database:
  url: "duckdb:warehouse.duckdb"
  username: deploy
migrations:
  locations:
    - "file:db/{database_kind}"
tracking:
  table: applied_migrations
"#,
    )
    .unwrap();

    let config = Config::load_from_dir(dir.path()).unwrap();
    let mut manager = MigrationManager::from_config(&config, dir.path()).unwrap();
    assert_eq!(manager.database_kind(), DatabaseKind::DuckDb);

    let report = manager.migrate().unwrap();
    assert_eq!(names(report.applied_versions()), vec!["001", "002"]);
    assert!(manager.database().relation_exists("applied_migrations").unwrap());
    assert!(dir.path().join("warehouse.duckdb").exists());
}

#[test]
fn test_from_config_rejects_invalid_config_before_connecting() {
    let dir = tempdir().unwrap();
    let config: Config = read_config(
        r#"
database:
  url: "duckdb:never.duckdb"
"#,
    );
    let err = MigrationManager::from_config(&config, dir.path())
        .err()
        .unwrap();
    assert!(matches!(
        err,
        MigrateError::Core(st_core::CoreError::Configuration { .. })
    ));
    assert!(!dir.path().join("never.duckdb").exists());
}

fn read_config(yaml: &str) -> Config {
    let dir = tempdir().unwrap();
    let path = dir.path().join("stratum.yml");
    fs::write(&path, yaml).unwrap();
    Config::read(&path).unwrap()
}
