use super::*;

use std::{env, fs};

#[test]
fn defaults_match_intake_limits() {
    let settings = Settings::default();
    assert_eq!(settings.key_prefix, "tbk_");
    assert_eq!(settings.max_image_bytes, 3 * 1024 * 1024);
    assert_eq!(settings.registry_options().keys.items, "tbk_items");
}

#[test]
fn blank_database_url_falls_back_to_default() {
    let settings = Settings {
        database_url: "   ".into(),
        ..Settings::default()
    };
    assert_eq!(
        settings.prepared_database_url(),
        "sqlite://./data/temu-balik.db"
    );

    let settings = Settings {
        database_url: "./var/desk.db".into(),
        ..Settings::default()
    };
    assert_eq!(settings.prepared_database_url(), "sqlite://./var/desk.db");
}

#[test]
fn file_values_then_environment_override() {
    let temp_root = tempfile::tempdir().expect("tempdir");
    let path = temp_root.path().join("desk.toml");
    fs::write(
        &path,
        "database_url = \"sqlite://./custom.db\"\nkey_prefix = \"demo_\"\nmax_image_width = 640\n",
    )
    .expect("write config");

    let settings = load_settings(Some(&path)).expect("settings");
    assert_eq!(settings.database_url, "sqlite://./custom.db");
    assert_eq!(settings.key_prefix, "demo_");
    assert_eq!(settings.max_image_width, 640);
    assert_eq!(settings.jpeg_quality, 80);

    env::set_var("APP__JPEG_QUALITY", "65");
    let settings = load_settings(Some(&path)).expect("settings");
    env::remove_var("APP__JPEG_QUALITY");
    assert_eq!(settings.jpeg_quality, 65);
    assert_eq!(settings.registry_options().limits.max_image_width, 640);
}

#[test]
fn explicit_missing_file_is_an_error() {
    let temp_root = tempfile::tempdir().expect("tempdir");
    assert!(load_settings(Some(&temp_root.path().join("absent.toml"))).is_err());
}
