use std::fs;
use std::path::{Path, PathBuf};
use tarif_desk::core::config::{
    AppConfig, DEFAULT_CONFIG, load_config, load_or_default, parse_config,
};
use tarif_desk::error::ConfigError;
use tempfile::tempdir;

#[test]
fn test_defaults_apply_to_empty_file() {
    let config = parse_config("", Path::new("TarifDesk.toml")).unwrap();
    assert_eq!(config, AppConfig::default());
    assert_eq!(config.base_url, "http://localhost:8000");
    assert_eq!(config.timeout_secs, 120);
    assert_eq!(
        config.examples_path(),
        PathBuf::from("data").join("baseline_results.json")
    );
}

#[test]
fn test_default_template_parses() {
    let config = parse_config(DEFAULT_CONFIG, Path::new("TarifDesk.toml")).unwrap();
    assert_eq!(config.language.as_deref(), Some("de"));
    assert_eq!(config.timeout_secs, 120);
}

#[test]
fn test_full_config() {
    let content = r#"
language = "fr"
base_url = "https://tarif.example.ch"
data_dir = "/srv/tarif/data"
examples_file = "/srv/tarif/qc.json"
timeout_secs = 30
"#;
    let config = parse_config(content, Path::new("TarifDesk.toml")).unwrap();
    assert_eq!(config.language.as_deref(), Some("fr"));
    assert_eq!(config.base_url, "https://tarif.example.ch");
    assert_eq!(config.data_dir, PathBuf::from("/srv/tarif/data"));
    assert_eq!(config.examples_path(), PathBuf::from("/srv/tarif/qc.json"));
    assert_eq!(config.timeout().as_secs(), 30);
}

#[test]
fn test_invalid_toml_is_parse_error() {
    let err = parse_config("base_url = [", Path::new("bad.toml")).unwrap_err();
    assert!(matches!(err, ConfigError::Parse { .. }));
}

#[test]
fn test_rejects_non_http_base_url() {
    let err = parse_config("base_url = \"ftp://x\"", Path::new("c.toml")).unwrap_err();
    assert!(matches!(err, ConfigError::Invalid { key: "base_url", .. }));
}

#[test]
fn test_rejects_zero_timeout() {
    let err = parse_config("timeout_secs = 0", Path::new("c.toml")).unwrap_err();
    assert!(matches!(err, ConfigError::Invalid { key: "timeout_secs", .. }));
}

#[test]
fn test_rejects_unknown_language() {
    let err = parse_config("language = \"en\"", Path::new("c.toml")).unwrap_err();
    assert!(matches!(err, ConfigError::Invalid { key: "language", .. }));
}

#[test]
fn test_missing_file_uses_defaults_unless_explicit() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("missing.toml");
    assert_eq!(load_or_default(&path, false).unwrap(), AppConfig::default());
    assert!(matches!(
        load_or_default(&path, true),
        Err(ConfigError::Read { .. })
    ));
}

#[test]
fn test_load_config_from_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("TarifDesk.toml");
    fs::write(&path, "timeout_secs = 5\n").unwrap();
    let config = load_config(&path).unwrap();
    assert_eq!(config.timeout_secs, 5);
}

#[test]
fn test_tilde_in_paths_is_expanded() {
    let config = parse_config("data_dir = \"~/tarif\"", Path::new("c.toml")).unwrap();
    assert!(!config.data_dir.to_string_lossy().starts_with('~'));
}
