// lerna-rs: Lerna child-process core - Rust Port
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Process launcher facade.
//!
//! ```text
//! exec / spawn / spawn_streaming (+ *_with callback variants)
//!              |
//!              v
//!          launch()
//!   registry.register()    live += 1
//!   Command::spawn()
//!     Err --> task: SpawnFailed (empty piped output) --> complete()
//!     Ok  --> streaming? wire_prefixes() : CapturedOutput::start()
//!             task: supervise()
//!                     select { child.wait(), control.recv() -> signal }
//!                     clean exit  --> drain --> ChildOutput
//!                     code/signal --> annotate() --> ChildError
//!                     complete()
//!
//! complete(): finish registration --> deliver sink --> announce_empty()
//! ```

use std::ffi::OsStr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, OnceLock};

use colored::Color;
use tokio::process::Child;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, trace};

use super::handle::{ChildHandle, ChildOutput, RunningChild};
use super::io::{CapturedOutput, annotate, strip_eol};
use super::options::{SpawnOptions, StdioConfig, StdioMode, command_line};
use super::prefix::{LineTagger, SharedOutput, color_for, pipe_prefixed, stderr_tag, stdout_tag};
use super::registry::{ChildRegistry, Registration};
use super::signal::{ExitKind, Termination};
use crate::config::ProcessConfig;
use crate::error::{ChildError, ChildFailure, ChildResult};

/// Launcher used by the process-wide convenience functions.
static GLOBAL_LAUNCHER: OnceLock<Launcher> = OnceLock::new();

type Callback = Box<dyn FnOnce(ChildResult<Option<String>>) + Send>;

/// Where a child's outcome goes.
enum Completion {
    /// Continuation: `Ok(Some(stdout))` if stdout was piped, `Ok(None)` if not.
    Callback(Callback),
    /// Awaitable: resolves the paired [`RunningChild`].
    Future(oneshot::Sender<ChildResult<ChildOutput>>),
}

impl Completion {
    fn deliver(self, outcome: ChildResult<ChildOutput>) {
        match self {
            Self::Callback(callback) => callback(outcome.map(ChildOutput::into_stdout)),
            Self::Future(tx) => {
                // Receiver gone means nobody is waiting
                let _ = tx.send(outcome);
            }
        }
    }
}

/// Launches children, counts them in a [`ChildRegistry`], and routes
/// streaming output through prefixed shared outputs.
///
/// All launch operations must be called from within a Tokio runtime.
#[derive(Debug, Clone)]
pub struct Launcher {
    registry: ChildRegistry,
    /// Cumulative streaming launches, for color selection
    streamed: Arc<AtomicUsize>,
    stdout: SharedOutput,
    stderr: SharedOutput,
    color: bool,
    merge_stderr_lines: bool,
}

impl Launcher {
    /// Creates a launcher writing streaming output to the process's own
    /// stdout/stderr.
    #[must_use]
    pub fn new(registry: ChildRegistry) -> Self {
        Self {
            registry,
            streamed: Arc::new(AtomicUsize::new(0)),
            stdout: SharedOutput::stdout(),
            stderr: SharedOutput::stderr(),
            color: true,
            merge_stderr_lines: true,
        }
    }

    /// Creates a launcher from the `[process]` configuration section.
    #[must_use]
    pub fn from_config(config: &ProcessConfig, registry: ChildRegistry) -> Self {
        Self::new(registry)
            .with_outputs(
                SharedOutput::stdout().with_capacity(config.output_capacity),
                SharedOutput::stderr().with_capacity(config.output_capacity),
            )
            .with_color(config.color)
            .with_stderr_merge(config.merge_stderr_lines)
    }

    /// Returns the process-wide launcher backed by [`ChildRegistry::global`].
    pub fn global() -> &'static Self {
        GLOBAL_LAUNCHER.get_or_init(|| Self::new(ChildRegistry::global().clone()))
    }

    /// Redirects streaming output.
    #[must_use]
    pub fn with_outputs(mut self, stdout: SharedOutput, stderr: SharedOutput) -> Self {
        self.stdout = stdout;
        self.stderr = stderr;
        self
    }

    /// Enables or disables colored prefixes.
    #[must_use]
    pub const fn with_color(mut self, color: bool) -> Self {
        self.color = color;
        self
    }

    /// Enables or disables multi-line merging on stderr prefixes.
    #[must_use]
    pub const fn with_stderr_merge(mut self, merge: bool) -> Self {
        self.merge_stderr_lines = merge;
        self
    }

    /// Returns the registry children are counted in.
    #[must_use]
    pub const fn registry(&self) -> &ChildRegistry {
        &self.registry
    }

    /// Returns the shared output streaming stdout goes to.
    #[must_use]
    pub const fn stdout(&self) -> &SharedOutput {
        &self.stdout
    }

    /// Returns the shared output streaming stderr goes to.
    #[must_use]
    pub const fn stderr(&self) -> &SharedOutput {
        &self.stderr
    }

    /// Returns the number of live children.
    #[must_use]
    pub fn live_count(&self) -> usize {
        self.registry.live_count()
    }

    /// Registers a callback fired every time the last live child exits.
    pub fn on_all_exited<F>(&self, callback: F)
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.registry.on_all_exited(callback);
    }

    /// Buffered launch; await the result.
    ///
    /// Defaults to stdin/stdout ignored and stderr piped for error reporting.
    pub fn exec<S: AsRef<OsStr>>(
        &self,
        command: &str,
        args: &[S],
        options: SpawnOptions,
    ) -> RunningChild {
        let stdio = options.resolve_stdio(StdioConfig::buffered());
        self.launch_awaitable(command, args, &options, stdio, None)
    }

    /// Buffered launch; `callback` receives the outcome.
    pub fn exec_with<S, F>(
        &self,
        command: &str,
        args: &[S],
        options: SpawnOptions,
        callback: F,
    ) -> ChildHandle
    where
        S: AsRef<OsStr>,
        F: FnOnce(ChildResult<Option<String>>) + Send + 'static,
    {
        let stdio = options.resolve_stdio(StdioConfig::buffered());
        let completion = Completion::Callback(Box::new(callback));
        self.launch(command, args, &options, stdio, None, completion)
    }

    /// Inherited launch; await the result.
    pub fn spawn<S: AsRef<OsStr>>(
        &self,
        command: &str,
        args: &[S],
        options: SpawnOptions,
    ) -> RunningChild {
        let stdio = options.resolve_stdio(StdioConfig::inherited());
        self.launch_awaitable(command, args, &options, stdio, None)
    }

    /// Inherited launch; `callback` receives the outcome.
    pub fn spawn_with<S, F>(
        &self,
        command: &str,
        args: &[S],
        options: SpawnOptions,
        callback: F,
    ) -> ChildHandle
    where
        S: AsRef<OsStr>,
        F: FnOnce(ChildResult<Option<String>>) + Send + 'static,
    {
        let stdio = options.resolve_stdio(StdioConfig::inherited());
        let completion = Completion::Callback(Box::new(callback));
        self.launch(command, args, &options, stdio, None, completion)
    }

    /// Streaming launch; every output line is re-emitted prefixed with
    /// `label`. Await the result.
    pub fn spawn_streaming<S: AsRef<OsStr>>(
        &self,
        command: &str,
        args: &[S],
        options: SpawnOptions,
        label: &str,
    ) -> RunningChild {
        let stdio = options.resolve_stdio(StdioConfig::streaming());
        let prefix = self.next_prefix(label);
        self.launch_awaitable(command, args, &options, stdio, Some(prefix))
    }

    /// Streaming launch; `callback` receives the outcome.
    pub fn spawn_streaming_with<S, F>(
        &self,
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
        let stdio = options.resolve_stdio(StdioConfig::streaming());
        let prefix = self.next_prefix(label);
        let completion = Completion::Callback(Box::new(callback));
        self.launch(command, args, &options, stdio, Some(prefix), completion)
    }

    fn next_prefix(&self, label: &str) -> Prefix {
        let index = self.streamed.fetch_add(1, Ordering::Relaxed);
        Prefix {
            label: label.to_string(),
            color: color_for(index),
        }
    }

    fn launch_awaitable<S: AsRef<OsStr>>(
        &self,
        command: &str,
        args: &[S],
        options: &SpawnOptions,
        stdio: StdioConfig,
        prefix: Option<Prefix>,
    ) -> RunningChild {
        let (tx, rx) = oneshot::channel();
        let handle = self.launch(command, args, options, stdio, prefix, Completion::Future(tx));
        RunningChild::new(handle, rx)
    }

    fn launch<S: AsRef<OsStr>>(
        &self,
        command: &str,
        args: &[S],
        options: &SpawnOptions,
        stdio: StdioConfig,
        prefix: Option<Prefix>,
        completion: Completion,
    ) -> ChildHandle {
        if let Some(cwd) = options.working_dir() {
            debug!(cwd = %cwd.display(), "cd");
        }
        debug!(cmd = %command_line(command, args), "exec");

        let registration = self.registry.register();
        let (control_tx, control_rx) = mpsc::unbounded_channel();

        let mut os_command = tokio::process::Command::from(options.to_command(command, args, stdio));
        os_command.kill_on_drop(true);
        let spawned = os_command.spawn();

        let pid = spawned.as_ref().ok().and_then(Child::id);
        let mut handle = ChildHandle::new(command, pid, stdio, control_tx);
        if let Some(prefix) = &prefix {
            handle = handle.with_prefix(&prefix.label, prefix.color);
        }

        let mut child = match spawned {
            Ok(child) => child,
            Err(source) => {
                debug!(process = command, error = %source, "spawn failed");
                let failure = ChildFailure::SpawnFailed {
                    command: command.to_string(),
                    source,
                };
                let error = ChildError::new(failure).with_output(
                    stdio.stdout.is_piped().then(String::new),
                    stdio.stderr.is_piped().then(String::new),
                );
                tokio::spawn(async move {
                    complete(&registration, completion, Err(error));
                });
                return handle;
            }
        };
        trace!(process = command, pid = ?pid, "spawned");

        let captured = match &prefix {
            Some(prefix) => self.wire_prefixes(&mut child, prefix),
            None => CapturedOutput::start(child.stdout.take(), child.stderr.take()),
        };

        tokio::spawn(supervise(Supervised {
            command: command.to_string(),
            pid,
            child,
            registration,
            control: control_rx,
            captured,
            completion,
        }));

        handle
    }

    /// Routes the child's piped stdout/stderr through tagged transforms into
    /// the shared outputs, capturing the raw text on the way.
    fn wire_prefixes(&self, child: &mut Child, prefix: &Prefix) -> CapturedOutput {
        let live = self.registry.live_count();
        self.stdout.ensure_capacity(live);
        self.stderr.ensure_capacity(live);

        let color = self.color.then_some(prefix.color);

        let stdout = child.stdout.take().map(|stdout| {
            let tagger = LineTagger::new(stdout_tag(&prefix.label, color), false);
            tokio::spawn(pipe_prefixed(stdout, tagger, self.stdout.attach()))
        });
        let stderr = child.stderr.take().map(|stderr| {
            let tagger =
                LineTagger::new(stderr_tag(&prefix.label, color), self.merge_stderr_lines);
            tokio::spawn(pipe_prefixed(stderr, tagger, self.stderr.attach()))
        });
        CapturedOutput::from_readers(stdout, stderr)
    }
}

/// Label and color of a streaming launch.
#[derive(Debug, Clone)]
struct Prefix {
    label: String,
    color: Color,
}

/// Everything the supervising task owns for one child.
struct Supervised {
    command: String,
    pid: Option<u32>,
    child: Child,
    registration: Registration,
    control: mpsc::UnboundedReceiver<Termination>,
    captured: CapturedOutput,
    completion: Completion,
}

async fn supervise(mut run: Supervised) {
    let status = loop {
        tokio::select! {
            status = run.child.wait() => break status,
            Some(request) = run.control.recv() => request.deliver(&mut run.child),
        }
    };
    // Refuse further termination requests
    run.control.close();

    let command = run.command;
    let outcome = match status {
        Err(source) => Err(annotate(ChildFailure::WaitFailed { command, source }, run.captured).await),
        Ok(status) => match ExitKind::from_status(status) {
            ExitKind::Success => {
                let (stdout, stderr) = run.captured.drain().await;
                debug!(process = %command, pid = ?run.pid, "exited cleanly");
                Ok(ChildOutput::new(command, run.pid, 0, stdout, stderr))
            }
            ExitKind::Code(code) => {
                debug!(process = %command, pid = ?run.pid, code, "exited with error");
                Err(annotate(ChildFailure::NonZeroExit { command, code }, run.captured).await)
            }
            ExitKind::Signal(signal) => {
                debug!(process = %command, pid = ?run.pid, signal = %signal, "terminated by signal");
                Err(annotate(ChildFailure::Signaled { command, signal }, run.captured).await)
            }
        },
    };

    complete(&run.registration, run.completion, outcome);
}

/// De-registers, delivers, then schedules the empty broadcast if this was
/// the last live child.
fn complete(
    registration: &Registration,
    completion: Completion,
    outcome: ChildResult<ChildOutput>,
) {
    let emptied = registration.finish();
    completion.deliver(outcome);
    if emptied {
        registration.registry().announce_empty();
    }
}

/// Runs a command to completion, blocking the current thread.
///
/// All stdio is piped by default. Returns stdout with one trailing line
/// terminator stripped. The child is not counted in any registry.
///
/// # Errors
///
/// Returns a [`ChildError`] if the process cannot be started, exits with a
/// non-zero code, or is killed by a signal.
pub fn exec_sync<S: AsRef<OsStr>>(
    command: &str,
    args: &[S],
    options: &SpawnOptions,
) -> ChildResult<String> {
    let stdio = options.resolve_stdio(StdioConfig::all(StdioMode::Pipe));
    debug!(cmd = %command_line(command, args), "exec (sync)");

    let output = options
        .to_command(command, args, stdio)
        .output()
        .map_err(|source| {
            ChildError::new(ChildFailure::SpawnFailed {
                command: command.to_string(),
                source,
            })
        })?;

    let capture = |bytes: Vec<u8>, mode: StdioMode| {
        mode.is_piped().then(|| {
            let mut text = String::from_utf8_lossy(&bytes).into_owned();
            strip_eol(&mut text);
            text
        })
    };
    let stdout = capture(output.stdout, stdio.stdout);
    let stderr = capture(output.stderr, stdio.stderr);

    let command = command.to_string();
    match ExitKind::from_status(output.status) {
        ExitKind::Success => Ok(stdout.unwrap_or_default()),
        ExitKind::Code(code) => Err(ChildError::new(ChildFailure::NonZeroExit { command, code })
            .with_output(stdout, stderr)),
        ExitKind::Signal(signal) => Err(ChildError::new(ChildFailure::Signaled { command, signal })
            .with_output(stdout, stderr)),
    }
}
