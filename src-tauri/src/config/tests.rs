use std::path::PathBuf;

use tempfile::TempDir;

use super::*;
use crate::documents::CollisionPolicy;

#[test]
fn test_missing_file_uses_defaults() {
    let temp = TempDir::new().unwrap();
    let config = load_config(&temp.path().join("config.yaml")).unwrap();
    assert_eq!(config, Config::default());
    assert_eq!(config.text_export.file_name, "errors.txt");
    assert_eq!(config.text_export.content, "Ciao Mamma!");
    assert_eq!(config.image_export.mime_type, "image/png");
    assert_eq!(config.collision, CollisionPolicy::Rename);
}

#[test]
fn test_partial_yaml_keeps_other_defaults() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("config.yaml");
    std::fs::write(
        &path,
        "collision: reject\nlogging:\n  level: debug\ntext_export:\n  content: hello\n",
    )
    .unwrap();

    let config = load_config(&path).unwrap();
    assert_eq!(config.collision, CollisionPolicy::Reject);
    assert_eq!(config.logging.level, "debug");
    assert_eq!(config.text_export.content, "hello");
    assert_eq!(config.text_export.file_name, "errors.txt");
    assert!(config.remove_partial_on_failure);
    assert_eq!(config.write_options().collision, CollisionPolicy::Reject);
}

#[test]
fn test_save_then_load() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("nested").join("config.yaml");
    let config = Config {
        grants_file: Some(PathBuf::from("/var/lib/docgrant/grants.json")),
        remove_partial_on_failure: false,
        ..Config::default()
    };

    save_config(&path, &config).unwrap();
    assert_eq!(load_config(&path).unwrap(), config);
}

#[test]
fn test_invalid_yaml_reports_parse_error() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("config.yaml");
    std::fs::write(&path, "collision: sideways\n").unwrap();
    assert!(matches!(load_config(&path), Err(ConfigError::Parse(_))));
}
