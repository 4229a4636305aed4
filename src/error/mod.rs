// lerna-rs: Lerna child-process core - Rust Port
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Error handling module.
//!
//! ```text
//!            ChildError
//!   { failure, stdout, stderr }
//!               |
//!               v
//!         ChildFailure
//!   +------+------+------+------+
//!   |      |      |      |      |
//!   v      v      v      v      v
//! Spawn  NonZero Signal Wait  Abandoned
//! Failed  Exit   -ed   Failed
//!
//! ConfigError: InvalidValue, NotFound
//! ```
//!
//! Every failure path of a child process (could not start, non-zero exit,
//! killed by a signal) is normalized into one [`ChildError`] carrying
//! `{code, signal, stdout, stderr}`.

use thiserror::Error;

/// Convenience alias for `anyhow::Result`.
pub type Result<T> = anyhow::Result<T>;

/// Result type using [`ChildError`].
pub type ChildResult<T> = std::result::Result<T, ChildError>;

// --- Child Process Errors ---

/// Why a child process failed.
#[derive(Debug, Error)]
pub enum ChildFailure {
    /// The OS could not create the process at all.
    #[error("failed to spawn '{command}': {source}")]
    SpawnFailed {
        command: String,
        #[source]
        source: std::io::Error,
    },

    /// The process ran and exited with a non-zero status.
    #[error("'{command}' exited with code {code}")]
    NonZeroExit { command: String, code: i32 },

    /// The process was terminated by a signal.
    #[error("'{command}' was terminated by {signal}")]
    Signaled { command: String, signal: String },

    /// Waiting on the process failed.
    #[error("failed waiting for '{command}': {source}")]
    WaitFailed {
        command: String,
        #[source]
        source: std::io::Error,
    },

    /// The supervising task went away without reporting an outcome.
    #[error("'{command}' was abandoned before it completed")]
    Abandoned { command: String },
}

impl ChildFailure {
    /// Returns the command name the failure refers to.
    #[must_use]
    pub fn command(&self) -> &str {
        match self {
            Self::SpawnFailed { command, .. }
            | Self::NonZeroExit { command, .. }
            | Self::Signaled { command, .. }
            | Self::WaitFailed { command, .. }
            | Self::Abandoned { command } => command,
        }
    }
}

/// A child process failure annotated with whatever the child printed.
///
/// `stdout`/`stderr` are `None` when the stream was not piped, and `Some("")`
/// when it was piped but the child wrote nothing.
#[derive(Debug, Error)]
#[error("{failure}")]
pub struct ChildError {
    failure: ChildFailure,
    stdout: Option<String>,
    stderr: Option<String>,
}

impl ChildError {
    /// Creates an error with no captured output.
    #[must_use]
    pub const fn new(failure: ChildFailure) -> Self {
        Self {
            failure,
            stdout: None,
            stderr: None,
        }
    }

    /// Attaches captured output.
    #[must_use]
    pub fn with_output(mut self, stdout: Option<String>, stderr: Option<String>) -> Self {
        self.stdout = stdout;
        self.stderr = stderr;
        self
    }

    /// Returns the underlying failure.
    #[must_use]
    pub const fn failure(&self) -> &ChildFailure {
        &self.failure
    }

    /// Returns the command name.
    #[must_use]
    pub fn command(&self) -> &str {
        self.failure.command()
    }

    /// Returns the exit code, if the process exited on its own with one.
    #[must_use]
    pub const fn code(&self) -> Option<i32> {
        match &self.failure {
            ChildFailure::NonZeroExit { code, .. } => Some(*code),
            _ => None,
        }
    }

    /// Returns the name of the terminating signal, e.g. `"SIGINT"`.
    #[must_use]
    pub fn signal(&self) -> Option<&str> {
        match &self.failure {
            ChildFailure::Signaled { signal, .. } => Some(signal),
            _ => None,
        }
    }

    /// Returns captured stdout.
    #[must_use]
    pub fn stdout(&self) -> Option<&str> {
        self.stdout.as_deref()
    }

    /// Returns captured stderr.
    #[must_use]
    pub fn stderr(&self) -> Option<&str> {
        self.stderr.as_deref()
    }
}

// --- Config Errors ---

/// Configuration-related errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Invalid configuration value.
    #[error("invalid value for '{key}' in section '[{section}]': {message}")]
    InvalidValue {
        section: String,
        key: String,
        message: String,
    },

    /// Configuration file not found.
    #[error("config file not found: {0}")]
    NotFound(String),
}

#[cfg(test)]
mod tests;
