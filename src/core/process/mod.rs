// lerna-rs: Lerna child-process core - Rust Port
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Child process launching, live-child tracking, and output annotation.
//!
//! ```text
//! exec / spawn / spawn_streaming   (await)
//! exec_with / spawn_with / ...     (callback)
//!       --> Launcher (global or injected)
//!             ChildRegistry   live count, "all exited" broadcast
//!             prefix          color wheel, LineTagger, SharedOutput
//!             io              read_stream, annotate
//!       --> ChildOutput { code, stdout?, stderr? }
//!           ChildError  { code?, signal?, stdout?, stderr? }
//! ```
//!
//! The free functions in this module use [`Launcher::global`]. Code that
//! needs isolated bookkeeping (tests, embedded runners) builds its own
//! [`Launcher`] around a fresh [`ChildRegistry`].

mod handle;
mod io;
mod launcher;
pub mod options;
pub mod prefix;
mod registry;
mod signal;
#[cfg(test)]
mod tests;

use std::ffi::OsStr;

pub use handle::{ChildHandle, ChildOutput, RunningChild};
pub use io::{read_stream, strip_eol};
pub use launcher::{Launcher, exec_sync};
pub use options::{SpawnOptions, StdioConfig, StdioMode};
pub use registry::{ChildRegistry, Registration};
#[cfg(unix)]
pub use signal::{Signal, signal_name};

use crate::error::ChildResult;

/// Buffered launch on the global launcher. See [`Launcher::exec`].
pub fn exec<S: AsRef<OsStr>>(command: &str, args: &[S], options: SpawnOptions) -> RunningChild {
    Launcher::global().exec(command, args, options)
}

/// Buffered launch with a callback on the global launcher.
pub fn exec_with<S, F>(command: &str, args: &[S], options: SpawnOptions, callback: F) -> ChildHandle
where
    S: AsRef<OsStr>,
    F: FnOnce(ChildResult<Option<String>>) + Send + 'static,
{
    Launcher::global().exec_with(command, args, options, callback)
}

/// Inherited launch on the global launcher. See [`Launcher::spawn`].
pub fn spawn<S: AsRef<OsStr>>(command: &str, args: &[S], options: SpawnOptions) -> RunningChild {
    Launcher::global().spawn(command, args, options)
}

/// Inherited launch with a callback on the global launcher.
pub fn spawn_with<S, F>(command: &str, args: &[S], options: SpawnOptions, callback: F) -> ChildHandle
where
    S: AsRef<OsStr>,
    F: FnOnce(ChildResult<Option<String>>) + Send + 'static,
{
    Launcher::global().spawn_with(command, args, options, callback)
}

/// Streaming launch on the global launcher. See [`Launcher::spawn_streaming`].
pub fn spawn_streaming<S: AsRef<OsStr>>(
    command: &str,
    args: &[S],
    options: SpawnOptions,
    label: &str,
) -> RunningChild {
    Launcher::global().spawn_streaming(command, args, options, label)
}

/// Streaming launch with a callback on the global launcher.
pub fn spawn_streaming_with<S, F>(
    command: &str,
    args: &[S],
    options: SpawnOptions,
    label: &str,
    callback: F,
) -> ChildHandle
where
    S: AsRef<OsStr>,
    F: FnOnce(ChildResult<Option<String>>) + Send + 'static,
{
    Launcher::global().spawn_streaming_with(command, args, options, label, callback)
}

/// Number of live children in the global registry.
#[must_use]
pub fn live_child_count() -> usize {
    ChildRegistry::global().live_count()
}

/// Fires `callback` every time the global registry's live count reaches zero.
pub fn on_all_exited<F>(callback: F)
where
    F: Fn() + Send + Sync + 'static,
{
    ChildRegistry::global().on_all_exited(callback);
}
