use std::fs;
use std::path::PathBuf;

use qualtrics_core::config::{Config, ConfigError, Profile};
use tempfile::TempDir;

/// Returns true if running as root (euid == 0). Used to skip permission tests.
#[cfg(unix)]
fn is_root() -> bool {
    std::process::Command::new("id")
        .arg("-u")
        .output()
        .ok()
        .and_then(|o| String::from_utf8(o.stdout).ok())
        .is_some_and(|s| s.trim() == "0")
}

// ---------------------------------------------------------------------------
// 1. Missing or empty config file
// ---------------------------------------------------------------------------

#[test]
fn load_from_nonexistent_path_returns_default_config() {
    let path = PathBuf::from("/tmp/qualtricsctl-test-nonexistent/does/not/exist/config.toml");
    assert!(!path.exists());

    let config = Config::load_from_path(&path).expect("missing file is an empty config");

    assert!(config.profiles.is_empty());
    assert!(config.default_profile.is_none());
}

#[test]
fn load_empty_config_file_returns_default_config() {
    let dir = TempDir::new().unwrap();
    let config_path = dir.path().join("config.toml");
    fs::write(&config_path, "").unwrap();

    let config = Config::load_from_path(&config_path).expect("empty file should parse as default");

    assert_eq!(config, Config::default());
}

// ---------------------------------------------------------------------------
// 2. Corrupt or incomplete config
// ---------------------------------------------------------------------------

#[test]
fn load_corrupt_toml_returns_parse_error() {
    let dir = TempDir::new().unwrap();
    let config_path = dir.path().join("config.toml");
    fs::write(&config_path, "[[[broken").unwrap();

    let err = Config::load_from_path(&config_path).unwrap_err();
    assert!(matches!(err, ConfigError::ParseError(_)), "{err}");
}

#[test]
fn load_profile_without_datacenter_returns_error() {
    let dir = TempDir::new().unwrap();
    let config_path = dir.path().join("config.toml");
    fs::write(
        &config_path,
        r#"
[profiles.broken]
api_token = "abc"
"#,
    )
    .unwrap();

    assert!(Config::load_from_path(&config_path).is_err());
}

#[test]
fn load_profile_with_blank_datacenter_returns_invalid_profile() {
    let dir = TempDir::new().unwrap();
    let config_path = dir.path().join("config.toml");
    fs::write(
        &config_path,
        r#"
[profiles.blank]
datacenter_id = "  "
"#,
    )
    .unwrap();

    let err = Config::load_from_path(&config_path).unwrap_err();
    assert!(
        matches!(err, ConfigError::InvalidProfile { ref name, .. } if name == "blank"),
        "{err}"
    );
}

#[test]
fn load_config_with_unknown_fields_ignores_them() {
    let dir = TempDir::new().unwrap();
    let config_path = dir.path().join("config.toml");
    fs::write(
        &config_path,
        r#"
unknown_top_level_key = "hello"

[profiles.prod]
datacenter_id = "iad1"
api_version = "bare"
totally_unknown_field = true
"#,
    )
    .unwrap();

    let config =
        Config::load_from_path(&config_path).expect("unknown fields should be silently ignored");

    let profile = config.profile("prod").unwrap();
    assert_eq!(
        profile.api_version,
        Some(qualtrics_core::ApiVersion::Bare)
    );
}

// ---------------------------------------------------------------------------
// 3. Save / load round trip
// ---------------------------------------------------------------------------

#[test]
fn save_creates_parent_directories_and_round_trips() {
    let dir = TempDir::new().unwrap();
    let config_path = dir.path().join("nested").join("dir").join("config.toml");

    let mut config = Config::default();
    config.set_profile(
        "prod".to_string(),
        Profile {
            datacenter_id: "iad1".to_string(),
            api_token: Some("keyring:prod:api_token".to_string()),
            timeout_secs: Some(45),
            ..Profile::default()
        },
    );
    config.default_profile = Some("prod".to_string());

    config.save_to_path(&config_path).unwrap();
    let loaded = Config::load_from_path(&config_path).unwrap();

    assert_eq!(loaded, config);
}

// ---------------------------------------------------------------------------
// 4. Permission errors (unix only)
// ---------------------------------------------------------------------------

#[cfg(unix)]
#[test]
fn load_unreadable_file_returns_clear_error() {
    use std::os::unix::fs::PermissionsExt;

    if is_root() {
        eprintln!("skipping test: running as root");
        return;
    }

    let dir = TempDir::new().unwrap();
    let config_path = dir.path().join("config.toml");
    fs::write(&config_path, "# valid toml").unwrap();
    fs::set_permissions(&config_path, fs::Permissions::from_mode(0o000)).unwrap();

    let err = Config::load_from_path(&config_path).unwrap_err();
    assert!(matches!(err, ConfigError::LoadError { .. }), "{err}");

    fs::set_permissions(&config_path, fs::Permissions::from_mode(0o644)).unwrap();
}

#[cfg(unix)]
#[test]
fn save_to_readonly_directory_returns_clear_error() {
    use std::os::unix::fs::PermissionsExt;

    if is_root() {
        eprintln!("skipping test: running as root");
        return;
    }

    let dir = TempDir::new().unwrap();
    let readonly_dir = dir.path().join("readonly");
    fs::create_dir(&readonly_dir).unwrap();
    fs::set_permissions(&readonly_dir, fs::Permissions::from_mode(0o444)).unwrap();

    let err = Config::default()
        .save_to_path(&readonly_dir.join("config.toml"))
        .unwrap_err();
    assert!(matches!(err, ConfigError::SaveError { .. }), "{err}");

    fs::set_permissions(&readonly_dir, fs::Permissions::from_mode(0o755)).unwrap();
}
