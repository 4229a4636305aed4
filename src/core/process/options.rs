// lerna-rs: Lerna child-process core - Rust Port
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Launch options shared by every launch mode.
//!
//! ```text
//! SpawnOptions
//!  • stdio(StdioConfig) / pipe() / inherit() / ignore()
//!  • cwd / env / envs / env_clear
//!
//! StdioConfig { stdin, stdout, stderr }: StdioMode = Pipe | Inherit | Ignore
//!   exec            ignore, ignore, pipe
//!   spawn           inherit, inherit, inherit
//!   spawn_streaming ignore, pipe, pipe
//!   exec_sync       pipe, pipe, pipe
//! ```

use std::collections::BTreeMap;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::process::Stdio;

/// How one standard stream of a child is wired.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StdioMode {
    /// Connected to a pipe readable by the launcher.
    Pipe,
    /// Shared with the parent process.
    Inherit,
    /// Sent to the null device.
    Ignore,
}

impl StdioMode {
    fn to_stdio(self) -> Stdio {
        match self {
            Self::Pipe => Stdio::piped(),
            Self::Inherit => Stdio::inherit(),
            Self::Ignore => Stdio::null(),
        }
    }

    /// Returns true if the stream is piped.
    #[must_use]
    pub const fn is_piped(self) -> bool {
        matches!(self, Self::Pipe)
    }
}

/// Wiring of all three standard streams.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StdioConfig {
    pub stdin: StdioMode,
    pub stdout: StdioMode,
    pub stderr: StdioMode,
}

impl StdioConfig {
    #[must_use]
    pub const fn new(stdin: StdioMode, stdout: StdioMode, stderr: StdioMode) -> Self {
        Self {
            stdin,
            stdout,
            stderr,
        }
    }

    /// Uses the same mode for all three streams.
    #[must_use]
    pub const fn all(mode: StdioMode) -> Self {
        Self::new(mode, mode, mode)
    }

    /// Default for buffered launches: only stderr is piped, for error reporting.
    #[must_use]
    pub const fn buffered() -> Self {
        Self::new(StdioMode::Ignore, StdioMode::Ignore, StdioMode::Pipe)
    }

    /// Default for inherited launches.
    #[must_use]
    pub const fn inherited() -> Self {
        Self::all(StdioMode::Inherit)
    }

    /// Default for streaming launches.
    #[must_use]
    pub const fn streaming() -> Self {
        Self::new(StdioMode::Ignore, StdioMode::Pipe, StdioMode::Pipe)
    }
}

/// Options for launching a child process.
///
/// Anything left unset falls back to the launch mode's defaults. A stdio
/// override replaces the mode's wiring as a whole.
#[derive(Debug, Clone, Default)]
pub struct SpawnOptions {
    /// Stdio override
    stdio: Option<StdioConfig>,
    /// Working directory
    cwd: Option<PathBuf>,
    /// Variables set on top of the inherited environment
    env: BTreeMap<String, String>,
    /// Start from an empty environment instead of the parent's
    env_clear: bool,
}

impl SpawnOptions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Overrides the stdio wiring.
    #[must_use]
    pub const fn stdio(mut self, stdio: StdioConfig) -> Self {
        self.stdio = Some(stdio);
        self
    }

    /// Convenience: pipe all three streams.
    #[must_use]
    pub const fn pipe(self) -> Self {
        self.stdio(StdioConfig::all(StdioMode::Pipe))
    }

    /// Convenience: inherit all three streams.
    #[must_use]
    pub const fn inherit(self) -> Self {
        self.stdio(StdioConfig::all(StdioMode::Inherit))
    }

    /// Convenience: discard all three streams.
    #[must_use]
    pub const fn ignore(self) -> Self {
        self.stdio(StdioConfig::all(StdioMode::Ignore))
    }

    /// Sets the working directory for the process.
    #[must_use]
    pub fn cwd(mut self, dir: impl AsRef<Path>) -> Self {
        self.cwd = Some(dir.as_ref().to_path_buf());
        self
    }

    /// Sets one environment variable.
    #[must_use]
    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.insert(key.into(), value.into());
        self
    }

    /// Sets several environment variables.
    #[must_use]
    pub fn envs<I, K, V>(mut self, vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.env
            .extend(vars.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    /// Does not inherit the parent's environment.
    #[must_use]
    pub const fn env_clear(mut self) -> Self {
        self.env_clear = true;
        self
    }

    /// Returns the working directory, if set.
    #[must_use]
    pub const fn working_dir(&self) -> Option<&PathBuf> {
        self.cwd.as_ref()
    }

    /// Resolves the stdio wiring against a mode default.
    #[must_use]
    pub fn resolve_stdio(&self, default: StdioConfig) -> StdioConfig {
        self.stdio.unwrap_or(default)
    }

    /// Builds the OS command for `program` with the given stdio wiring.
    pub(super) fn to_command<S: AsRef<OsStr>>(
        &self,
        program: &str,
        args: &[S],
        stdio: StdioConfig,
    ) -> std::process::Command {
        let mut command = std::process::Command::new(program);
        command.args(args);

        if let Some(cwd) = &self.cwd {
            command.current_dir(cwd);
        }

        if self.env_clear {
            command.env_clear();
        }
        command.envs(&self.env);

        command
            .stdin(stdio.stdin.to_stdio())
            .stdout(stdio.stdout.to_stdio())
            .stderr(stdio.stderr.to_stdio());

        command
    }
}

/// Returns the full command line as a string (for logging).
pub(super) fn command_line<S: AsRef<OsStr>>(program: &str, args: &[S]) -> String {
    use std::fmt::Write as _;

    let mut cmd = program.to_string();
    for arg in args {
        let arg = arg.as_ref().to_string_lossy();
        if arg.contains(' ') {
            let _ = write!(cmd, " \"{arg}\"");
        } else {
            let _ = write!(cmd, " {arg}");
        }
    }
    cmd
}
