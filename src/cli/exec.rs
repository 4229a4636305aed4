// lerna-rs: Lerna child-process core - Rust Port
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Exec command arguments.
//!
//! ```text
//! lerna exec [--stream] [--pkg DIR]... -- <cmd> [args...]
//!
//! no --pkg   → run once in the current directory
//! --stream   → prefix every line with the package directory name
//! ```

use clap::Args;
use std::path::{Path, PathBuf};

/// Arguments for the `exec` command.
#[derive(Debug, Clone, Default, Args)]
pub struct ExecArgs {
    /// Re-emits child output line by line, prefixed with the package name.
    #[arg(long)]
    pub stream: bool,

    /// Package directory to run the command in.
    /// Can be specified multiple times; all packages run concurrently.
    #[arg(short = 'p', long = "pkg", value_name = "DIR", action = clap::ArgAction::Append)]
    pub packages: Vec<PathBuf>,

    /// Command to run, followed by its arguments.
    #[arg(value_name = "COMMAND", required = true, last = true)]
    pub command: Vec<String>,
}

impl ExecArgs {
    /// Returns the program name.
    #[must_use]
    pub fn program(&self) -> &str {
        self.command.first().map_or("", String::as_str)
    }

    /// Returns the program arguments.
    #[must_use]
    pub fn args(&self) -> &[String] {
        self.command.get(1..).unwrap_or_default()
    }

    /// Returns the package directories, defaulting to the current directory.
    #[must_use]
    pub fn package_dirs(&self) -> Vec<PathBuf> {
        if self.packages.is_empty() {
            vec![PathBuf::from(".")]
        } else {
            self.packages.clone()
        }
    }
}

/// Returns the prefix label for a package directory: its final component.
#[must_use]
pub fn package_label(dir: &Path) -> String {
    dir.file_name().map_or_else(
        || {
            std::env::current_dir()
                .ok()
                .and_then(|cwd| cwd.file_name().map(|n| n.to_string_lossy().into_owned()))
                .unwrap_or_else(|| dir.display().to_string())
        },
        |name| name.to_string_lossy().into_owned(),
    )
}
