// lerna-rs: Lerna child-process core - Rust Port
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

use super::{ChildError, ChildFailure, ChildResult, ConfigError};

#[test]
fn test_config_error_display() {
    let err = ConfigError::InvalidValue {
        section: "process".to_string(),
        key: "output_capacity".to_string(),
        message: "must be at least 1".to_string(),
    };
    insta::assert_snapshot!(
        err.to_string(),
        @"invalid value for 'output_capacity' in section '[process]': must be at least 1"
    );
}

#[test]
fn test_child_failure_display() {
    let messages = vec![
        ChildFailure::NonZeroExit {
            command: "npm".to_string(),
            code: 2,
        }
        .to_string(),
        ChildFailure::Signaled {
            command: "sleep".to_string(),
            signal: "SIGINT".to_string(),
        }
        .to_string(),
        ChildFailure::Abandoned {
            command: "tsc".to_string(),
        }
        .to_string(),
    ];
    insta::assert_debug_snapshot!(messages, @r#"
    [
        "'npm' exited with code 2",
        "'sleep' was terminated by SIGINT",
        "'tsc' was abandoned before it completed",
    ]
    "#);
}

#[test]
fn test_spawn_failure_mentions_command() {
    let err = ChildError::new(ChildFailure::SpawnFailed {
        command: "doesNotExist".to_string(),
        source: std::io::Error::from(std::io::ErrorKind::NotFound),
    });
    assert!(err.to_string().contains("doesNotExist"));
    assert_eq!(err.command(), "doesNotExist");
    assert_eq!(err.code(), None);
    assert_eq!(err.signal(), None);
}

#[test]
fn test_child_error_accessors() {
    let err = ChildError::new(ChildFailure::NonZeroExit {
        command: "make".to_string(),
        code: 3,
    })
    .with_output(None, Some("boom".to_string()));

    assert_eq!(err.code(), Some(3));
    assert_eq!(err.signal(), None);
    assert_eq!(err.stdout(), None);
    assert_eq!(err.stderr(), Some("boom"));
}

#[test]
fn test_child_result_size() {
    // Keeps Result<_, ChildError> clear of clippy::result_large_err
    let size = std::mem::size_of::<ChildResult<()>>();
    assert!(size <= 128, "ChildResult<()> is {size} bytes, expected <= 128");
}
