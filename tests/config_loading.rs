// tests/config_loading.rs

use std::fs;
use std::io::Write;

use arkforge::config::{Config, load_from_path, load_with_legacy};
use arkforge::errors::ForgeError;
use tempfile::{NamedTempFile, tempdir};

#[test]
fn test_modern_file_overrides_defaults() {
    let mut file = NamedTempFile::new().unwrap();
    write!(
        file,
        r#"
commander: captain
jobs: 32
build:
  workspace: /srv/aosp
fleet:
  - name: Pixel 8
    codename: shiba
    role: primary
    repository: lineageos
"#
    )
    .unwrap();

    let cfg = load_with_legacy(file.path(), "/nonexistent/legacy.conf").unwrap();

    assert_eq!(cfg.commander, "captain");
    assert_eq!(cfg.jobs, 32);
    assert_eq!(cfg.build.workspace, "/srv/aosp");
    // Missing keys keep their defaults.
    assert_eq!(cfg.build.default_type, "recovery");
    assert_eq!(cfg.mode, "expert");
    assert_eq!(cfg.primary_codename(), Some("shiba"));
    assert_eq!(cfg.file.as_deref(), Some(file.path()));
}

#[test]
fn test_empty_file_is_all_defaults() {
    let file = NamedTempFile::new().unwrap();
    let cfg = load_with_legacy(file.path(), "/nonexistent/legacy.conf").unwrap();
    assert_eq!(
        Config {
            file: None,
            ..cfg
        },
        Config::default()
    );
}

#[test]
fn test_malformed_yaml_is_fatal() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "jobs: [unterminated").unwrap();

    match load_with_legacy(file.path(), "/nonexistent/legacy.conf") {
        Err(ForgeError::YamlError(_)) => {}
        Err(e) => panic!("Expected YamlError, got: {:?}", e),
        Ok(_) => panic!("Expected error, got Ok"),
    }
    assert!(load_from_path(file.path()).is_err());
}

#[test]
fn test_device_without_codename_is_config_error() {
    let mut file = NamedTempFile::new().unwrap();
    write!(
        file,
        r#"
fleet:
  - name: Mystery Phone
    repository: aosp
"#
    )
    .unwrap();

    match load_with_legacy(file.path(), "/nonexistent/legacy.conf") {
        Err(ForgeError::ConfigError(msg)) => {
            assert!(msg.contains("Mystery Phone"));
            assert!(msg.contains("codename"));
        }
        Err(e) => panic!("Expected ConfigError, got: {:?}", e),
        Ok(_) => panic!("Expected error, got Ok"),
    }
}

#[test]
fn test_missing_file_falls_back_to_defaults_and_persists() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("nested").join("forge.yaml");

    let cfg = load_with_legacy(&path, dir.path().join("missing.conf")).unwrap();
    assert_eq!(cfg.commander, Config::default().commander);
    assert_eq!(cfg.file.as_deref(), Some(path.as_path()));

    let written = fs::read_to_string(&path).unwrap();
    assert!(written.contains("commander: koobie777"));
    assert!(written.contains("defaultType: recovery"));

    // The persisted file loads back to the same values.
    let reloaded = load_with_legacy(&path, dir.path().join("missing.conf")).unwrap();
    assert_eq!(reloaded, cfg);
}

#[test]
fn test_legacy_settings_are_imported() {
    let dir = tempdir().unwrap();
    let legacy = dir.path().join("ark-settings.conf");
    fs::write(
        &legacy,
        "# old shell settings\nARK_COMMANDER=\"oldhand\"\nARK_PRIMARY_DEVICE=bacon\nARK_DEFAULT_JOBS=12\n",
    )
    .unwrap();
    let path = dir.path().join("forge.yaml");

    let cfg = load_with_legacy(&path, &legacy).unwrap();

    assert_eq!(cfg.commander, "oldhand");
    assert_eq!(cfg.primary_codename(), Some("bacon"));
    assert_eq!(cfg.jobs, 12);
    assert!(fs::read_to_string(&path).unwrap().contains("oldhand"));
}
