// lerna-rs: Lerna child-process core - Rust Port
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Integration tests for configuration loading.
//!
//! Tests the Config module with realistic layered TOML configurations.

use lerna_rs::config::Config;
use lerna_rs::config::loader::ConfigLoader;
use lerna_rs::core::process::{ChildRegistry, Launcher};
use lerna_rs::logging::LogLevel;

// =============================================================================
// Loading from TOML strings
// =============================================================================

#[test]
fn config_parse_global_section() {
    let toml = r#"
[global]
output_log_level = 5
file_log_level = 6
log_file = "logs/lerna.log"
"#;
    let config = Config::parse(toml).unwrap();
    insta::assert_json_snapshot!(config, @r#"
    {
      "global": {
        "output_log_level": 5,
        "file_log_level": 6,
        "log_file": "logs/lerna.log"
      },
      "process": {
        "color": true,
        "merge_stderr_lines": true,
        "output_capacity": 10
      }
    }
    "#);
}

#[test]
fn config_parse_process_section() {
    let toml = r"
[process]
color = false
merge_stderr_lines = false
output_capacity = 64
";
    let config = Config::parse(toml).unwrap();
    assert!(!config.process.color);
    assert!(!config.process.merge_stderr_lines);
    assert_eq!(config.process.output_capacity, 64);
    assert_eq!(config.global.output_log_level, LogLevel::INFO);
}

// =============================================================================
// Loading from files
// =============================================================================

#[test]
fn config_files_layer_in_order() {
    let dir = tempfile::tempdir().unwrap();
    let base = dir.path().join("lerna.toml");
    let ci = dir.path().join("ci.toml");
    std::fs::write(&base, "[process]\ncolor = false\noutput_capacity = 4\n").unwrap();
    std::fs::write(&ci, "[process]\noutput_capacity = 16\n").unwrap();

    let loader = ConfigLoader::new()
        .add_toml_file_optional(&base)
        .add_toml_file(&ci)
        .add_toml_file_optional(dir.path().join("absent.toml"));
    assert_eq!(loader.loaded_files().len(), 2);

    let config = loader.build().unwrap();
    assert!(!config.process.color);
    assert_eq!(config.process.output_capacity, 16);
}

#[test]
fn config_invalid_toml_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("broken.toml");
    std::fs::write(&path, "[process\ncolor = ").unwrap();

    assert!(Config::from_file(&path).is_err());
}

// =============================================================================
// Feeding the launcher
// =============================================================================

#[test]
fn launcher_from_config_uses_output_capacity() {
    let config = Config::parse("[process]\noutput_capacity = 3").unwrap();
    let launcher = Launcher::from_config(&config.process, ChildRegistry::new());
    assert_eq!(launcher.live_count(), 0);
    assert_eq!(launcher.stdout().capacity(), 3);
    assert_eq!(launcher.stderr().capacity(), 3);
}
