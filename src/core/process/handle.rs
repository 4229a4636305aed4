// lerna-rs: Lerna child-process core - Rust Port
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Handles returned by the launch operations.
//!
//! ```text
//! ChildHandle   pid, command, stdio, label/color, kill()/terminate()
//!     |            --> control channel --> supervising task
//!     v
//! RunningChild  ChildHandle + oneshot outcome
//!               .await --> Result<ChildOutput, ChildError>
//! ```

use std::future::Future;
use std::ops::Deref;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use colored::Color;
use tokio::sync::{mpsc, oneshot};

use super::options::StdioConfig;
use super::signal::Termination;
use crate::error::{ChildError, ChildFailure, ChildResult, Result};

#[cfg(unix)]
use super::signal::Signal;

/// Outcome of a child that exited cleanly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChildOutput {
    command: String,
    pid: Option<u32>,
    exit_code: i32,
    stdout: Option<String>,
    stderr: Option<String>,
}

impl ChildOutput {
    pub(super) const fn new(
        command: String,
        pid: Option<u32>,
        exit_code: i32,
        stdout: Option<String>,
        stderr: Option<String>,
    ) -> Self {
        Self {
            command,
            pid,
            exit_code,
            stdout,
            stderr,
        }
    }

    /// Returns the command name.
    #[must_use]
    pub fn command(&self) -> &str {
        &self.command
    }

    /// Returns the pid the child ran as.
    #[must_use]
    pub const fn pid(&self) -> Option<u32> {
        self.pid
    }

    /// Returns the exit code (always 0 for a clean exit).
    #[must_use]
    pub const fn exit_code(&self) -> i32 {
        self.exit_code
    }

    /// Clean exits are never signaled; kept for symmetry with [`ChildError`].
    #[must_use]
    pub const fn signal(&self) -> Option<&str> {
        None
    }

    /// Returns captured stdout, if stdout was piped.
    #[must_use]
    pub fn stdout(&self) -> Option<&str> {
        self.stdout.as_deref()
    }

    /// Returns captured stderr, if stderr was piped.
    #[must_use]
    pub fn stderr(&self) -> Option<&str> {
        self.stderr.as_deref()
    }

    pub(super) fn into_stdout(self) -> Option<String> {
        self.stdout
    }
}

/// A launched child, usable for inspection and termination.
///
/// Cloning shares the same child. Once the child has completed, termination
/// requests fail.
#[derive(Debug, Clone)]
pub struct ChildHandle {
    command: Arc<str>,
    pid: Option<u32>,
    stdio: StdioConfig,
    label: Option<Arc<str>>,
    color: Option<Color>,
    control: mpsc::UnboundedSender<Termination>,
}

impl ChildHandle {
    pub(super) fn new(
        command: &str,
        pid: Option<u32>,
        stdio: StdioConfig,
        control: mpsc::UnboundedSender<Termination>,
    ) -> Self {
        Self {
            command: Arc::from(command),
            pid,
            stdio,
            label: None,
            color: None,
            control,
        }
    }

    pub(super) fn with_prefix(mut self, label: &str, color: Color) -> Self {
        self.label = Some(Arc::from(label));
        self.color = Some(color);
        self
    }

    /// Returns the command name.
    #[must_use]
    pub fn command(&self) -> &str {
        &self.command
    }

    /// Returns the pid, or `None` if the process could not be started.
    #[must_use]
    pub const fn pid(&self) -> Option<u32> {
        self.pid
    }

    /// Returns the stdio wiring the child was launched with.
    #[must_use]
    pub const fn stdio(&self) -> StdioConfig {
        self.stdio
    }

    /// Returns the prefix label of a streaming child.
    #[must_use]
    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    /// Returns the color assigned to a streaming child.
    #[must_use]
    pub const fn color(&self) -> Option<Color> {
        self.color
    }

    /// Returns true once the child has completed.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.control.is_closed()
    }

    /// Sends `signal` to the child.
    ///
    /// # Errors
    ///
    /// Returns an error if the child has already completed.
    #[cfg(unix)]
    pub fn kill(&self, signal: Signal) -> Result<()> {
        self.request(Termination::Signal(signal))
    }

    /// Asks the child to terminate (SIGTERM on Unix, forced kill elsewhere).
    ///
    /// # Errors
    ///
    /// Returns an error if the child has already completed.
    pub fn terminate(&self) -> Result<()> {
        self.request(Termination::graceful())
    }

    /// Forcibly kills the child.
    ///
    /// # Errors
    ///
    /// Returns an error if the child has already completed.
    pub fn force_kill(&self) -> Result<()> {
        self.request(Termination::Kill)
    }

    fn request(&self, termination: Termination) -> Result<()> {
        self.control
            .send(termination)
            .map_err(|_| anyhow::anyhow!("'{}' has already completed", self.command))
    }
}

/// A launched child whose outcome is delivered by awaiting it.
#[derive(Debug)]
#[must_use = "the outcome of a RunningChild is only observed by awaiting it"]
pub struct RunningChild {
    handle: ChildHandle,
    outcome: oneshot::Receiver<ChildResult<ChildOutput>>,
}

impl RunningChild {
    pub(super) const fn new(
        handle: ChildHandle,
        outcome: oneshot::Receiver<ChildResult<ChildOutput>>,
    ) -> Self {
        Self { handle, outcome }
    }

    /// Returns the handle of the child.
    pub const fn handle(&self) -> &ChildHandle {
        &self.handle
    }
}

impl Deref for RunningChild {
    type Target = ChildHandle;

    fn deref(&self) -> &Self::Target {
        &self.handle
    }
}

impl Future for RunningChild {
    type Output = ChildResult<ChildOutput>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = self.get_mut();
        Pin::new(&mut this.outcome).poll(cx).map(|received| {
            received.unwrap_or_else(|_| {
                Err(ChildError::new(ChildFailure::Abandoned {
                    command: this.handle.command().to_string(),
                }))
            })
        })
    }
}
