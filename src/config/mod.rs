// lerna-rs: Lerna child-process core - Rust Port
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Configuration management for lerna-rs.
//!
//! # Configuration Hierarchy
//!
//! ```text
//! Priority (low → high)
//! 1. defaults
//! 2. lerna.toml (cwd, optional)
//! 3. --config FILE (repeatable)
//! 4. LERNA_* env vars
//! 5. CLI overrides (--set, --log-level, --no-color, ...)
//! ```
//!
//! # Environment Variable Mapping
//!
//! ```text
//! LERNA_PROCESS__COLOR=false          → process.color = false
//! LERNA_PROCESS__OUTPUT_CAPACITY=32   → process.output_capacity = 32
//! LERNA_GLOBAL__OUTPUT_LOG_LEVEL=4    → global.output_log_level = 4
//! ```

pub mod loader;
pub mod types;

#[cfg(test)]
mod tests;

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

use crate::error::Result;

use loader::ConfigLoader;
pub use types::{GlobalConfig, ProcessConfig};

/// Default name of the per-directory configuration file.
pub const CONFIG_FILE_NAME: &str = "lerna.toml";

/// Prefix of configuration environment variables.
pub const ENV_PREFIX: &str = "LERNA";

/// Complete application configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Global options.
    pub global: GlobalConfig,
    /// Child process options.
    pub process: ProcessConfig,
}

impl Config {
    /// Create a new configuration builder.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use lerna_rs::config::Config;
    ///
    /// let config = Config::builder()
    ///     .add_toml_file_optional("lerna.toml")
    ///     .add_toml_file("ci/lerna.toml")
    ///     .with_env_prefix("LERNA")
    ///     .build()?;
    /// # Ok::<(), anyhow::Error>(())
    /// ```
    #[must_use]
    pub fn builder() -> ConfigLoader {
        ConfigLoader::new()
    }

    /// Load configuration from a single TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file does not exist, contains invalid TOML, or
    /// does not match the `Config` structure.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::builder().add_toml_file(path).build()
    }

    /// Load configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns an error if the content is not valid TOML or does not match the
    /// `Config` structure.
    pub fn parse(content: &str) -> Result<Self> {
        Self::builder().add_toml_str(content).build()
    }

    /// Validates values after all layers have been merged.
    ///
    /// # Errors
    ///
    /// Returns a [`crate::error::ConfigError`] for the first invalid value.
    pub fn validate(&self) -> Result<()> {
        self.process.validate()?;
        Ok(())
    }

    /// Format configuration options for display.
    ///
    /// One `section.key = value` line per option, keys aligned and sorted.
    #[must_use]
    pub fn format_options(&self) -> Vec<String> {
        let mut options = BTreeMap::new();
        self.format_global_options(&mut options);
        self.format_process_options(&mut options);

        let max_key_len = options.keys().map(String::len).max().unwrap_or(0);

        options
            .into_iter()
            .map(|(key, value)| format!("{key:<max_key_len$} = {value}"))
            .collect()
    }

    fn format_global_options(&self, options: &mut BTreeMap<String, String>) {
        options.insert(
            "global.output_log_level".into(),
            self.global.output_log_level.as_u8().to_string(),
        );
        options.insert(
            "global.file_log_level".into(),
            self.global.file_log_level.as_u8().to_string(),
        );
        options.insert(
            "global.log_file".into(),
            self.global
                .log_file
                .as_ref()
                .map_or_else(String::new, |p| p.display().to_string()),
        );
    }

    fn format_process_options(&self, options: &mut BTreeMap<String, String>) {
        options.insert("process.color".into(), self.process.color.to_string());
        options.insert(
            "process.merge_stderr_lines".into(),
            self.process.merge_stderr_lines.to_string(),
        );
        options.insert(
            "process.output_capacity".into(),
            self.process.output_capacity.to_string(),
        );
    }
}
