// lerna-rs: Lerna child-process core - Rust Port
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Exit status classification and termination requests.

use std::process::ExitStatus;

use tokio::process::Child;
use tracing::{debug, warn};

#[cfg(unix)]
pub use nix::sys::signal::Signal;

/// How a child left.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) enum ExitKind {
    Success,
    Code(i32),
    Signal(String),
}

impl ExitKind {
    pub(super) fn from_status(status: ExitStatus) -> Self {
        if status.success() {
            return Self::Success;
        }
        #[cfg(unix)]
        {
            use std::os::unix::process::ExitStatusExt as _;
            if let Some(raw) = status.signal() {
                return Self::Signal(signal_name(raw));
            }
        }
        Self::Code(status.code().unwrap_or(-1))
    }
}

/// Returns the conventional name of a raw signal number, e.g. `"SIGINT"`.
#[cfg(unix)]
#[must_use]
pub fn signal_name(raw: i32) -> String {
    Signal::try_from(raw).map_or_else(|_| format!("SIG{raw}"), |s| s.as_str().to_string())
}

/// A termination request sent to a child's supervising task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum Termination {
    #[cfg(unix)]
    Signal(Signal),
    Kill,
}

impl Termination {
    /// Polite termination: SIGTERM on Unix, forced kill elsewhere.
    pub(super) const fn graceful() -> Self {
        #[cfg(unix)]
        {
            Self::Signal(Signal::SIGTERM)
        }
        #[cfg(not(unix))]
        {
            Self::Kill
        }
    }

    /// Delivers the request to a child that has not been reaped yet.
    pub(super) fn deliver(self, child: &mut Child) {
        match self {
            #[cfg(unix)]
            Self::Signal(signal) => {
                let Some(pid) = child.id().and_then(|pid| i32::try_from(pid).ok()) else {
                    return;
                };
                debug!(pid, signal = signal.as_str(), "sending signal");
                if let Err(e) = nix::sys::signal::kill(nix::unistd::Pid::from_raw(pid), signal) {
                    warn!(pid, signal = signal.as_str(), error = %e, "failed to signal child");
                }
            }
            Self::Kill => {
                if let Err(e) = child.start_kill() {
                    warn!(pid = ?child.id(), error = %e, "failed to kill child");
                }
            }
        }
    }
}
