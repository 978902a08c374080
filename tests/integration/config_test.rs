use std::fs;

use tempfile::TempDir;
use vitalstat::core::config::{Preferences, Theme};

#[test]
fn test_preferences_default() {
    let prefs = Preferences::default();
    assert_eq!(prefs.language, "en");
    assert_eq!(prefs.theme, Theme::Dark);
    assert_eq!(prefs.public_ip_url, "https://api.ipify.org");
    assert_eq!(prefs.tick_interval_ms, 1000);
}

#[test]
fn test_missing_file_yields_defaults() {
    let temp_dir = TempDir::new().unwrap();
    let prefs = Preferences::load_from(&temp_dir.path().join("absent.json")).unwrap();
    assert_eq!(prefs, Preferences::default());
}

#[test]
fn test_roundtrip() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("nested").join("config.json");

    let prefs = Preferences {
        language: "ja".to_string(),
        theme: Theme::Light,
        ..Default::default()
    };
    prefs.save_to(&path).unwrap();

    let loaded = Preferences::load_from(&path).unwrap();
    assert_eq!(loaded, prefs);
    assert!(fs::read_to_string(&path).unwrap().contains("\"light\""));
}

#[test]
fn test_corrupt_or_empty_file_yields_defaults() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("config.json");

    fs::write(&path, b"{ not json").unwrap();
    assert_eq!(Preferences::load_from(&path).unwrap(), Preferences::default());

    fs::write(&path, b"").unwrap();
    assert_eq!(Preferences::load_from(&path).unwrap(), Preferences::default());
}

#[test]
fn test_partial_file_fills_defaults_and_normalizes() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("config.json");
    fs::write(&path, br#"{ "language": "xx", "theme": "light", "tick_interval_ms": 0 }"#).unwrap();

    let prefs = Preferences::load_from(&path).unwrap();
    assert_eq!(prefs.language, "en");
    assert_eq!(prefs.theme, Theme::Light);
    assert_eq!(prefs.tick_interval_ms, 1000);
}
