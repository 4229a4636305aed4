// lerna-rs: Lerna child-process core - Rust Port
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

use crate::cli::exec::package_label;
use crate::cli::{Cli, Command};
use clap::Parser;
use std::path::Path;

#[test]
fn test_parse_version() {
    let cli = Cli::try_parse_from(["lerna", "version"]).unwrap();
    assert!(matches!(cli.command, Some(Command::Version)));
}

#[test]
fn test_parse_exec_with_trailing_command() {
    let cli = Cli::try_parse_from([
        "lerna",
        "exec",
        "--stream",
        "--pkg",
        "packages/a",
        "-p",
        "packages/b",
        "--",
        "npm",
        "run",
        "test",
        "--watch=false",
    ])
    .unwrap();

    let Some(Command::Exec(args)) = cli.command else {
        panic!("expected exec command");
    };
    insta::assert_debug_snapshot!(args, @r#"
    ExecArgs {
        stream: true,
        packages: [
            "packages/a",
            "packages/b",
        ],
        command: [
            "npm",
            "run",
            "test",
            "--watch=false",
        ],
    }
    "#);
    assert_eq!(args.program(), "npm");
    assert_eq!(args.args(), ["run", "test", "--watch=false"]);
}

#[test]
fn test_parse_exec_requires_command() {
    assert!(Cli::try_parse_from(["lerna", "exec", "--pkg", "a"]).is_err());
}

#[test]
fn test_exec_defaults_to_current_directory() {
    let cli = Cli::try_parse_from(["lerna", "exec", "--", "ls"]).unwrap();
    let Some(Command::Exec(args)) = cli.command else {
        panic!("expected exec command");
    };
    assert!(!args.stream);
    assert_eq!(args.package_dirs(), [Path::new(".")]);
    assert!(args.args().is_empty());
}

#[test]
fn test_parse_options_json() {
    let cli = Cli::try_parse_from(["lerna", "options", "--json"]).unwrap();
    assert!(matches!(cli.command, Some(Command::Options(ref o)) if o.json));
}

#[test]
fn test_parse_global_options() {
    let cli = Cli::try_parse_from([
        "lerna",
        "-l",
        "5",
        "--config",
        "ci.toml",
        "--no-color",
        "-s",
        "process.output_capacity=32",
        "options",
    ])
    .unwrap();

    insta::assert_debug_snapshot!(cli.global.to_config_overrides(), @r#"
    [
        "process.output_capacity=32",
        "global.output_log_level=5",
        "global.file_log_level=5",
        "process.color=false",
    ]
    "#);
    assert_eq!(cli.global.configs, [Path::new("ci.toml")]);
}

#[test]
fn test_log_level_out_of_range_rejected() {
    assert!(Cli::try_parse_from(["lerna", "-l", "7", "version"]).is_err());
}

#[test]
fn test_package_label_is_final_component() {
    assert_eq!(package_label(Path::new("packages/pkg-a")), "pkg-a");
    assert_eq!(package_label(Path::new("/abs/pkg-b/")), "pkg-b");
}
