//! Tests for settings persistence
//!
//! Tests cover:
//! - Defaults
//! - Save/load through an explicit path
//! - Partial and malformed files

use autochart::settings::{BrushSettings, ChartSettings, SettingsError};
use std::path::{Path, PathBuf};

/// Unique scratch path under the system temp directory
fn scratch_path(name: &str) -> PathBuf {
    std::env::temp_dir()
        .join(format!("autochart-test-{}-{}", std::process::id(), name))
        .join("settings.json")
}

fn cleanup(path: &Path) {
    if let Some(dir) = path.parent() {
        let _ = std::fs::remove_dir_all(dir);
    }
}

#[test]
fn test_defaults() {
    let settings = ChartSettings::default();
    assert_eq!(settings.version, 1);
    assert_eq!(settings.brush, BrushSettings { keyboard_step: 1 });
    assert_eq!(settings.inference.funnel_decreasing_ratio, 0.6);
    assert_eq!(settings.inference.pie_min_records, 3);
    assert_eq!(settings.inference.pie_max_records, 20);
}

#[test]
fn test_settings_path_is_under_config_dir() {
    if let Some(path) = ChartSettings::get_settings_path() {
        assert!(path.ends_with("autochart/settings.json"));
    }
}

#[test]
fn test_save_and_load_round_trip() {
    let path = scratch_path("round-trip");
    let mut settings = ChartSettings::default();
    settings.inference.pie_max_records = 12;
    settings.brush.keyboard_step = 5;

    settings.save_to(&path).unwrap();
    let loaded = ChartSettings::load_from(&path).unwrap();
    cleanup(&path);

    assert_eq!(loaded, settings);
}

#[test]
fn test_partial_file_fills_defaults() {
    let path = scratch_path("partial");
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(&path, r#"{"inference": {"funnel_max_records": 8}}"#).unwrap();

    let loaded = ChartSettings::load_from(&path).unwrap();
    cleanup(&path);

    assert_eq!(loaded.version, 1);
    assert_eq!(loaded.inference.funnel_max_records, 8);
    assert_eq!(loaded.inference.funnel_min_records, 2);
    assert_eq!(loaded.brush.keyboard_step, 1);
}

#[test]
fn test_malformed_file_is_parse_error() {
    let path = scratch_path("malformed");
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(&path, "{ not json").unwrap();

    let result = ChartSettings::load_from(&path);
    cleanup(&path);

    match result {
        Err(SettingsError::Parse { path: reported, .. }) => assert_eq!(reported, path),
        other => panic!("Expected parse error, got {:?}", other),
    }
}

#[test]
fn test_missing_file_is_read_error() {
    let path = scratch_path("missing");
    let result = ChartSettings::load_from(&path);
    assert!(matches!(result, Err(SettingsError::Read { .. })));
}
