// lerna-rs: Lerna child-process core - Rust Port
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Configuration sections.
//!
//! ```text
//! [global]   output_log_level, file_log_level, log_file
//! [process]  color, merge_stderr_lines, output_capacity
//! ```

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::core::process::prefix::DEFAULT_OUTPUT_CAPACITY;
use crate::error::ConfigError;
use crate::logging::LogLevel;

/// Global configuration options.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GlobalConfig {
    /// Log level for console output (0-6).
    pub output_log_level: LogLevel,
    /// Log level for file output (0-6).
    pub file_log_level: LogLevel,
    /// Path to log file; no file logging when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_file: Option<PathBuf>,
}

impl Default for GlobalConfig {
    fn default() -> Self {
        Self {
            output_log_level: LogLevel::INFO,
            file_log_level: LogLevel::TRACE,
            log_file: None,
        }
    }
}

/// Child process options.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProcessConfig {
    /// Color the prefixes of streaming children.
    pub color: bool,
    /// Tag a multi-line stderr chunk once instead of per line.
    pub merge_stderr_lines: bool,
    /// Streaming children attached to one output before a warning is logged.
    pub output_capacity: usize,
}

impl Default for ProcessConfig {
    fn default() -> Self {
        Self {
            color: true,
            merge_stderr_lines: true,
            output_capacity: DEFAULT_OUTPUT_CAPACITY,
        }
    }
}

impl ProcessConfig {
    /// Checks value ranges serde cannot express.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] if `output_capacity` is zero.
    pub fn validate(&self) -> std::result::Result<(), ConfigError> {
        if self.output_capacity == 0 {
            return Err(ConfigError::InvalidValue {
                section: "process".to_string(),
                key: "output_capacity".to_string(),
                message: "must be at least 1".to_string(),
            });
        }
        Ok(())
    }
}
