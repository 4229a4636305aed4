// lerna-rs: Lerna child-process core - Rust Port
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! CLI module for lerna-rs using clap derive.
//!
//! # Command Structure
//!
//! ```text
//! lerna [global options] <command>
//! exec [--stream] [--pkg DIR]... -- <cmd> [args...]
//! options [--json]
//! version
//! ```

pub mod exec;
pub mod global;

#[cfg(test)]
mod tests;

use crate::cli::exec::ExecArgs;
use crate::cli::global::GlobalOptions;
use clap::{Args, Parser, Subcommand};

/// Lerna child-process core - Rust Port
///
/// Runs commands across package directories.
#[derive(Debug, Parser)]
#[command(
    name = "lerna",
    author,
    version,
    about = "Runs a command in many package directories at once",
    long_about = "lerna-rs Copyright (C) 2026 Romeo Ahmed\n\
                  This program comes with ABSOLUTELY NO WARRANTY\n\
                  This is free software, and you are welcome to redistribute it\n\
                  under certain conditions; see LICENSE for details.\n\n\
                  Runs a command in many package directories at once.\n\n\
                  `lerna exec --pkg a --pkg b -- npm test` runs `npm test` in\n\
                  both directories concurrently. Add --stream to prefix every\n\
                  output line with the package name.",
    after_help = "CONFIG FILES:\n\n\
                  lerna reads `lerna.toml` from the current directory if present,\n\
                  then every file given with --config, in order. LERNA_* environment\n\
                  variables (e.g. LERNA_PROCESS__COLOR=false) override files, and\n\
                  command-line flags override everything."
)]
pub struct Cli {
    /// Global options shared by all commands
    #[command(flatten)]
    pub global: GlobalOptions,

    /// Command to execute
    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Shows the version.
    #[command(visible_alias = "-v")]
    Version,

    /// Lists all options and their resolved values.
    Options(OptionsArgs),

    /// Lists the config files used by lerna.
    Configs,

    /// Runs a command in every package directory.
    Exec(ExecArgs),
}

/// Arguments for the `options` command.
#[derive(Debug, Clone, Default, Args)]
pub struct OptionsArgs {
    /// Prints the configuration as JSON.
    #[arg(long)]
    pub json: bool,
}

/// Parses command-line arguments.
#[must_use]
pub fn parse() -> Cli {
    Cli::parse()
}

/// Parses command-line arguments from an iterator.
pub fn parse_from<I, T>(iter: I) -> Cli
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    Cli::parse_from(iter)
}

/// Tries to parse command-line arguments, returning an error on failure.
///
/// # Errors
///
/// Returns a `clap::Error` if the arguments are invalid or if help/version information
/// was requested.
pub fn try_parse() -> Result<Cli, clap::Error> {
    Cli::try_parse()
}
