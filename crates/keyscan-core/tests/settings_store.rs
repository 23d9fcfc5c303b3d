// Keyscan Settings Store Tests
//
// File-backed settings persistence against a temporary directory.
//
// Run with: cargo test --test settings_store

use std::time::Duration;

use keyscan_core::{FileSettingsStore, Key, ScannerConfig, Settings, SettingsError, SettingsStore};

#[test]
fn missing_file_loads_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let store = FileSettingsStore::new(dir.path().join("settings.toml"));

    let settings = store.load().unwrap();
    assert_eq!(settings.to_scanner_config().unwrap(), ScannerConfig::default());
}

#[test]
fn save_creates_parent_dirs_and_round_trips() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("keyscan").join("settings.toml");
    let store = FileSettingsStore::new(&path);

    let mut settings = Settings::new();
    settings.set_scanner_config(
        &ScannerConfig::new()
            .with_max_keystroke_delay(Duration::from_millis(35))
            .with_terminator_key(Key::TAB)
            .with_audio_feedback(false),
    );
    settings.devices.only = vec!["USB Barcode Reader".to_string()];
    store.save(&settings).unwrap();
    assert!(path.exists());

    let loaded = store.load().unwrap();
    assert_eq!(loaded.source_path(), Some(path.as_path()));
    assert_eq!(loaded.devices.only, vec!["USB Barcode Reader".to_string()]);

    let config = loaded.to_scanner_config().unwrap();
    assert_eq!(config.max_keystroke_delay, Duration::from_millis(35));
    assert_eq!(config.terminator_key, Key::TAB);
    assert!(!config.audio_feedback);
}

#[test]
fn reload_picks_up_external_edits() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("settings.toml");
    std::fs::write(&path, "[scanner]\nmin_barcode_length = 6\n").unwrap();

    let mut settings = Settings::from_file(&path).unwrap();
    assert_eq!(settings.scanner.min_barcode_length, 6);

    std::fs::write(&path, "[scanner]\nmin_barcode_length = 10\n").unwrap();
    settings.reload().unwrap();
    assert_eq!(settings.scanner.min_barcode_length, 10);
}

#[test]
fn malformed_file_is_a_parse_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("settings.toml");
    std::fs::write(&path, "[scanner\nenabled = ").unwrap();

    let store = FileSettingsStore::new(&path);
    assert!(matches!(store.load(), Err(SettingsError::TomlParse(_))));
}
