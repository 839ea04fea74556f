//! Configuration Module Tests
//!
//! Settings loading through files and `KEYCASE_DB_*` environment overrides.

use keycase_db::database::{format_connection, Connection, DatabaseConfig};
use keycase_db::{DatabaseSettings, KeycaseDbError, PoolSettings};
use std::io::Write;
use std::sync::Mutex;

// Environment variables are process-wide
static ENV_LOCK: Mutex<()> = Mutex::new(());

fn write_config(contents: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::Builder::new()
        .suffix(".toml")
        .tempfile()
        .expect("temp file");
    write!(file, "{contents}").expect("write config");
    file
}

#[test]
fn config_has_expected_defaults() {
    let settings = DatabaseSettings::default();

    assert_eq!(settings.client, "pg");
    assert_eq!(settings.pool, PoolSettings { min: 2, max: 10 });
    assert_eq!(settings.slow_query_threshold_ms, 200);
    assert!(settings.migrate_up);
    assert!(settings.connection.is_none());
}

#[test]
fn environment_overrides_file() {
    let _guard = ENV_LOCK.lock().unwrap();
    let file = write_config(
        r#"
connection = "postgres://app@localhost/app"

[pool]
min = 1
max = 4
"#,
    );

    std::env::set_var("KEYCASE_DB_POOL__MAX", "20");
    std::env::set_var("KEYCASE_DB_MIGRATE_UP", "false");
    let settings = DatabaseSettings::load_from(file.path());
    std::env::remove_var("KEYCASE_DB_POOL__MAX");
    std::env::remove_var("KEYCASE_DB_MIGRATE_UP");

    let settings = settings.expect("settings load");
    assert_eq!(settings.pool, PoolSettings { min: 1, max: 20 });
    assert!(!settings.migrate_up);
}

#[test]
fn database_url_is_the_connection_fallback() {
    let _guard = ENV_LOCK.lock().unwrap();
    let file = write_config("slow_query_threshold_ms = 10\n");

    std::env::set_var("DATABASE_URL", "postgres://env:pw@localhost/env");
    let settings = DatabaseSettings::load_from(file.path());
    std::env::remove_var("DATABASE_URL");

    let settings = settings.expect("settings load");
    assert_eq!(
        settings.connection,
        Some(Connection::url("postgres://env:pw@localhost/env"))
    );
}

#[test]
fn invalid_pool_bounds_are_rejected() {
    let _guard = ENV_LOCK.lock().unwrap();
    let file = write_config(
        r#"
[pool]
min = 8
max = 2
"#,
    );

    assert!(DatabaseSettings::load_from(file.path()).is_err());
}

#[test]
fn client_config_requires_a_connection() {
    let settings = DatabaseSettings::default();
    assert!(matches!(
        DatabaseConfig::from_settings(&settings),
        Err(KeycaseDbError::MissingConnection)
    ));
}

#[test]
fn connections_are_redacted_for_logs() {
    let connection = Connection::url("postgres://u:secret@h/db");
    let formatted = format_connection(&connection);

    assert!(formatted.contains("****"));
    assert!(!formatted.contains("secret"));
}
