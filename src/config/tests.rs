// lerna-rs: Lerna child-process core - Rust Port
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

use super::{Config, ConfigLoader, GlobalConfig, ProcessConfig};
use crate::error::ConfigError;
use crate::logging::LogLevel;
use std::path::PathBuf;

#[test]
fn test_default_config() {
    let config = Config::default();
    assert_eq!(config.global.output_log_level, LogLevel::INFO);
    assert_eq!(config.global.file_log_level, LogLevel::TRACE);
    assert_eq!(config.global.log_file, None);
    assert!(config.process.color);
    assert!(config.process.merge_stderr_lines);
    assert_eq!(config.process.output_capacity, 10);
}

#[test]
fn test_empty_toml_yields_defaults() {
    assert_eq!(Config::parse("").unwrap(), Config::default());
}

#[test]
fn test_config_parse() {
    let toml = r#"
[global]
output_log_level = 4
log_file = "lerna.log"

[process]
color = false
output_capacity = 32
"#;
    let config = Config::parse(toml).unwrap();

    assert_eq!(
        config.global,
        GlobalConfig {
            output_log_level: LogLevel::DEBUG,
            file_log_level: LogLevel::TRACE,
            log_file: Some(PathBuf::from("lerna.log")),
        }
    );
    assert_eq!(
        config.process,
        ProcessConfig {
            color: false,
            merge_stderr_lines: true,
            output_capacity: 32,
        }
    );
}

#[test]
fn test_later_sources_override_earlier() {
    let config = Config::builder()
        .add_toml_str("[process]\ncolor = false\noutput_capacity = 4")
        .add_toml_str("[process]\noutput_capacity = 8")
        .build()
        .unwrap();

    assert!(!config.process.color);
    assert_eq!(config.process.output_capacity, 8);
}

#[test]
fn test_set_override_wins_over_files() {
    let config = Config::builder()
        .add_toml_str("[process]\ncolor = true")
        .set_override("process.color=false")
        .unwrap()
        .set("global.output_log_level", 5)
        .unwrap()
        .build()
        .unwrap();

    assert!(!config.process.color);
    assert_eq!(config.global.output_log_level, LogLevel::TRACE);
}

#[test]
fn test_set_override_rejects_malformed_option() {
    let err = ConfigLoader::new().set_override("process.color").err().unwrap();
    insta::assert_snapshot!(
        err.to_string(),
        @"invalid value for 'set' in section '[cli]': expected 'section.key=value', got 'process.color'"
    );

    assert!(ConfigLoader::new().set_override("=true").is_err());
}

#[test]
fn test_zero_output_capacity_is_rejected() {
    let err = Config::parse("[process]\noutput_capacity = 0").unwrap_err();
    insta::assert_snapshot!(
        err.to_string(),
        @"invalid value for 'output_capacity' in section '[process]': must be at least 1"
    );
}

#[test]
fn test_log_level_out_of_range_is_rejected() {
    let err = Config::parse("[global]\noutput_log_level = 9").unwrap_err();
    assert!(
        format!("{err:#}").contains("log level must be 0-6"),
        "unexpected error: {err:#}"
    );
}

#[test]
fn test_deny_unknown_fields() {
    assert!(Config::parse("[unknown_section]\nfoo = \"bar\"").is_err());
    assert!(Config::parse("[process]\ncolour = false").is_err());
}

#[test]
fn test_missing_required_file_is_not_found() {
    let err = Config::from_file("/nonexistent/lerna.toml").unwrap_err();
    assert!(matches!(
        err.downcast_ref::<ConfigError>(),
        Some(ConfigError::NotFound(_))
    ));
    insta::assert_snapshot!(err.to_string(), @"config file not found: /nonexistent/lerna.toml");
}

#[test]
fn test_from_file_reads_toml() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("lerna.toml");
    std::fs::write(&path, "[process]\nmerge_stderr_lines = false\n").unwrap();

    let config = Config::from_file(&path).unwrap();
    assert!(!config.process.merge_stderr_lines);
}

#[test]
fn test_config_loader_tracks_files() {
    let loader = ConfigLoader::new()
        .add_toml_str("[process]\ncolor = false")
        .add_toml_file_optional("/nonexistent/optional.toml")
        .add_toml_file("/nonexistent/required.toml");

    insta::assert_debug_snapshot!(loader.format_loaded_files(), @r#"
    [
        "1. [string] <string>",
        "2. [file] /nonexistent/required.toml",
    ]
    "#);
}

#[test]
fn test_format_options() {
    let config = Config::parse(
        r#"
[global]
output_log_level = 4
log_file = "lerna.log"

[process]
color = false
output_capacity = 32
"#,
    )
    .unwrap();

    insta::assert_snapshot!(config.format_options().join("\n"), @r"
    global.file_log_level      = 5
    global.log_file            = lerna.log
    global.output_log_level    = 4
    process.color              = false
    process.merge_stderr_lines = true
    process.output_capacity    = 32
    ");
}

#[test]
fn test_config_serializes_to_json() {
    let json = serde_json::to_value(Config::default()).unwrap();
    assert_eq!(
        json,
        serde_json::json!({
            "global": { "output_log_level": 3, "file_log_level": 5 },
            "process": { "color": true, "merge_stderr_lines": true, "output_capacity": 10 },
        })
    );
}
