use jumuia_booking::utils::error::ErrorCategory;
use jumuia_booking::utils::validation::Validate;
use chrono::FixedOffset;
use jumuia_booking::core::schedule::LocalConvention;
use jumuia_booking::{AppConfig, ConfigProvider, StoreKind};
use std::io::Write;
use std::time::Duration;
use tempfile::NamedTempFile;

#[test]
fn test_load_full_config_file() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(
        file,
        r#"
[store]
kind = "firestore"
base_url = "http://127.0.0.1:8080"
project_id = "jumuia-parish"
api_key = "abc123"
timeout_seconds = 5

[collections]
groups = "groups"

[schedule]
utc_offset = "+03:00"
sweep_interval_seconds = 30
"#
    )
    .unwrap();

    let config = AppConfig::from_file(file.path()).unwrap();
    config.validate().unwrap();

    assert_eq!(config.store.kind, StoreKind::Firestore);
    assert_eq!(config.groups_collection(), "groups");
    assert_eq!(config.rooms_collection(), "rooms");
    assert_eq!(config.sweep_interval(), Duration::from_secs(30));
    assert_eq!(
        config.local_convention(),
        LocalConvention::Fixed(FixedOffset::east_opt(3 * 3600).unwrap())
    );

    let settings = config.firestore_settings();
    assert_eq!(settings.project_id, "jumuia-parish");
    assert_eq!(settings.api_key.as_deref(), Some("abc123"));
    assert_eq!(settings.timeout, Duration::from_secs(5));
}

#[test]
fn test_missing_file_is_configuration_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = AppConfig::from_file(dir.path().join("absent.toml")).unwrap_err();
    assert_eq!(err.category(), ErrorCategory::Configuration);
}

#[test]
fn test_invalid_toml_is_configuration_error() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "[store\nkind = ").unwrap();

    let err = AppConfig::from_file(file.path()).unwrap_err();
    assert_eq!(err.category(), ErrorCategory::Configuration);
}

#[test]
fn test_zero_interval_rejected() {
    let config = AppConfig::from_toml_str(
        "[store]\nkind = \"memory\"\n[schedule]\nsweep_interval_seconds = 0\n",
    )
    .unwrap();
    assert!(config.validate().is_err());
}
