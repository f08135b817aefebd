use super::*;

fn extract(extractor: &VersionExtractor, name: &str) -> String {
    extractor.extract_version(name).unwrap().into_inner()
}

#[test]
fn test_base_name_strips_extension() {
    let ex = VersionExtractor::BaseName;
    assert_eq!(
        extract(&ex, "20080518134512_create_foo.sql"),
        "20080518134512_create_foo"
    );
    assert_eq!(extract(&ex, "01234_create_bar.sql"), "01234_create_bar");
    assert_eq!(extract(&ex, "fix_login.sql"), "fix_login");
}

#[test]
fn test_base_name_only_strips_last_extension() {
    let ex = VersionExtractor::BaseName;
    assert_eq!(extract(&ex, "fix_login.backup.sql"), "fix_login.backup");
    assert_ne!(
        extract(&ex, "fix_login.sql"),
        extract(&ex, "fix_login.backup.sql")
    );
}

#[test]
fn test_base_name_ignores_directories() {
    let ex = VersionExtractor::BaseName;
    assert_eq!(extract(&ex, "db/migrations/001_init.sql"), "001_init");
    assert_eq!(extract(&ex, r"db\migrations\001_init.sql"), "001_init");
}

#[test]
fn test_base_name_without_extension() {
    assert_eq!(extract(&VersionExtractor::BaseName, "README"), "README");
}

#[test]
fn test_prefix_takes_leading_token() {
    let ex = VersionExtractor::default();
    assert_eq!(extract(&ex, "20080518134512_create_foo.sql"), "20080518134512");
    assert_eq!(extract(&ex, "001_init.sql"), "001");
}

#[test]
fn test_prefix_collision_on_shared_timestamp() {
    let ex = VersionExtractor::default();
    assert_eq!(
        ex.extract_version("20090101_a.sql"),
        ex.extract_version("20090101_b.sql")
    );
}

#[test]
fn test_prefix_falls_back_to_base_name_without_delimiter() {
    let ex = VersionExtractor::default();
    assert_eq!(extract(&ex, "20090101.sql"), "20090101");
    assert_eq!(extract(&ex, "_leading.sql"), "_leading");
}

#[test]
fn test_prefix_custom_delimiter() {
    let ex = VersionExtractor::Prefix {
        delimiter: "__".to_string(),
    };
    assert_eq!(extract(&ex, "V2_1__add_users.sql"), "V2_1");
}

#[test]
fn test_extension_only_name_falls_back_to_full_name() {
    assert_eq!(extract(&VersionExtractor::BaseName, ".sql"), ".sql");
    assert_eq!(extract(&VersionExtractor::default(), ".sql"), ".sql");
}

#[test]
fn test_empty_name_yields_none() {
    assert!(VersionExtractor::BaseName.extract_version("").is_none());
    assert!(VersionExtractor::default().extract_version("").is_none());
}

#[test]
fn test_from_config_name() {
    assert_eq!(
        VersionExtractor::from_config_name("BASE_NAME", "_").unwrap(),
        VersionExtractor::BaseName
    );
    assert_eq!(
        VersionExtractor::from_config_name("timestamp", "-").unwrap(),
        VersionExtractor::Prefix {
            delimiter: "-".to_string()
        }
    );
    assert_eq!(
        VersionExtractor::from_config_name("Prefix", "_").unwrap(),
        VersionExtractor::default()
    );
}

#[test]
fn test_from_config_name_rejects_unknown() {
    let err = VersionExtractor::from_config_name("numeric", "_").unwrap_err();
    let msg = err.to_string();
    assert!(msg.contains("[C003]"));
    assert!(msg.contains("numeric"));
    assert!(msg.contains("base_name, timestamp"));
}

#[test]
fn test_from_config_name_rejects_empty_delimiter() {
    assert!(VersionExtractor::from_config_name("timestamp", "").is_err());
}
