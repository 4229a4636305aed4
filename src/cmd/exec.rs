// lerna-rs: Lerna child-process core - Rust Port
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Exec command implementation for lerna-rs.
//!
//! ```text
//! package dirs --> spawn / spawn_streaming (cwd = dir)   all at once
//!                        |
//!   Ctrl+C watcher ------+--> SIGINT to every live child
//!                        v
//!                  join_all --> report failures (stderr when captured)
//! ```

use anyhow::anyhow;
use futures_util::future::join_all;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::cli::exec::{ExecArgs, package_label};
use crate::core::process::{ChildHandle, Launcher, SpawnOptions};
use crate::error::{ChildResult, Result};

/// Main handler for the exec command.
///
/// # Errors
///
/// Returns an error if the command failed in at least one package.
pub async fn run_exec_command(args: &ExecArgs, launcher: &Launcher) -> Result<()> {
    let program = args.program();
    let dirs = args.package_dirs();
    info!(
        cmd = program,
        packages = dirs.len(),
        stream = args.stream,
        "running in packages"
    );

    let mut children = Vec::with_capacity(dirs.len());
    for dir in &dirs {
        let label = package_label(dir);
        let options = SpawnOptions::new().cwd(dir);
        let child = if args.stream {
            launcher.spawn_streaming(program, args.args(), options, &label)
        } else {
            launcher.spawn(program, args.args(), options)
        };
        children.push((label, child));
    }

    let handles: Vec<ChildHandle> = children
        .iter()
        .map(|(_, child)| child.handle().clone())
        .collect();
    let cancel_token = CancellationToken::new();
    let watcher = tokio::spawn(forward_interrupt(handles, cancel_token.clone()));

    let results = join_all(
        children
            .into_iter()
            .map(|(label, child)| async move { (label, child.await) }),
    )
    .await;

    cancel_token.cancel();
    let _ = watcher.await;

    let failed = report(&results);
    if failed == 0 {
        info!(packages = results.len(), "command succeeded in all packages");
        Ok(())
    } else {
        Err(anyhow!(
            "'{program}' failed in {failed} of {} packages",
            results.len()
        ))
    }
}

/// Logs every outcome; returns the number of failures.
fn report<T>(results: &[(String, ChildResult<T>)]) -> usize {
    let mut failed = 0;
    for (package, result) in results {
        match result {
            Ok(_) => debug!(package = %package, "succeeded"),
            Err(e) => {
                failed += 1;
                error!(
                    package = %package,
                    code = ?e.code(),
                    signal = ?e.signal(),
                    "{e}"
                );
                if let Some(stderr) = e.stderr().filter(|s| !s.is_empty()) {
                    error!(package = %package, "stderr:\n{stderr}");
                }
            }
        }
    }
    failed
}

/// Forwards the first Ctrl+C to every child until cancelled.
async fn forward_interrupt(handles: Vec<ChildHandle>, cancel_token: CancellationToken) {
    tokio::select! {
        () = cancel_token.cancelled() => {}
        result = tokio::signal::ctrl_c() => {
            if result.is_err() {
                return;
            }
            warn!("Received Ctrl+C, interrupting children...");
            for handle in &handles {
                if let Err(e) = interrupt(handle) {
                    debug!(cmd = handle.command(), pid = ?handle.pid(), error = %e, "not interrupted");
                }
            }
        }
    }
}

#[cfg(unix)]
fn interrupt(handle: &ChildHandle) -> Result<()> {
    handle.kill(crate::core::process::Signal::SIGINT)
}

#[cfg(not(unix))]
fn interrupt(handle: &ChildHandle) -> Result<()> {
    handle.terminate()
}
