// lerna-rs: Lerna child-process core - Rust Port
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Output capture for piped child streams.
//!
//! ```text
//! spawn:  CapturedOutput::start(stdout?, stderr?)
//!           one reader task per piped stream
//!         CapturedOutput::from_readers(..)
//!           streaming: the prefixer tasks also capture
//! exit:   CapturedOutput::drain()   (both joined concurrently)
//!           --> (Option<String>, Option<String>)
//! failure: annotate(failure, captured) --> ChildError { stdout, stderr }
//!
//! read_stream(): read to EOF, lossy UTF-8, strip one trailing EOL
//! ```

use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::task::JoinHandle;
use tracing::warn;

use crate::error::{ChildError, ChildFailure};

/// Reads a stream to completion and strips one trailing line terminator.
///
/// An absent stream yields `None`. Read errors are logged and the text read
/// so far is returned.
pub async fn read_stream<R>(stream: Option<R>) -> Option<String>
where
    R: AsyncRead + Unpin,
{
    let mut reader = stream?;
    let mut buf = Vec::new();
    if let Err(e) = reader.read_to_end(&mut buf).await {
        warn!(error = %e, "error reading stream");
    }
    Some(decode_output(buf))
}

/// Decodes captured bytes lossily and strips one trailing line terminator.
pub(super) fn decode_output(buf: Vec<u8>) -> String {
    let mut text = String::from_utf8(buf)
        .unwrap_or_else(|e| String::from_utf8_lossy(e.as_bytes()).into_owned());
    strip_eol(&mut text);
    text
}

/// Removes a single trailing `\n`, `\r\n` or `\r`.
pub fn strip_eol(text: &mut String) {
    if text.ends_with('\n') {
        text.pop();
    }
    if text.ends_with('\r') {
        text.pop();
    }
}

/// Reader tasks draining a child's piped stdout/stderr.
///
/// Started right after spawn so a chatty child never blocks on a full pipe.
#[derive(Debug)]
pub(super) struct CapturedOutput {
    stdout: Option<JoinHandle<Option<String>>>,
    stderr: Option<JoinHandle<Option<String>>>,
}

impl CapturedOutput {
    /// Starts draining whichever streams are present.
    pub(super) fn start<O, E>(stdout: Option<O>, stderr: Option<E>) -> Self
    where
        O: AsyncRead + Unpin + Send + 'static,
        E: AsyncRead + Unpin + Send + 'static,
    {
        Self {
            stdout: stdout.map(|s| tokio::spawn(read_stream(Some(s)))),
            stderr: stderr.map(|s| tokio::spawn(read_stream(Some(s)))),
        }
    }

    /// Wraps reader tasks started elsewhere, such as the streaming prefixers.
    pub(super) const fn from_readers(
        stdout: Option<JoinHandle<Option<String>>>,
        stderr: Option<JoinHandle<Option<String>>>,
    ) -> Self {
        Self { stdout, stderr }
    }

    /// Waits for both readers concurrently.
    pub(super) async fn drain(self) -> (Option<String>, Option<String>) {
        tokio::join!(join_reader(self.stdout), join_reader(self.stderr))
    }
}

async fn join_reader(reader: Option<JoinHandle<Option<String>>>) -> Option<String> {
    let handle = reader?;
    match handle.await {
        Ok(text) => text,
        Err(e) => {
            warn!(error = %e, "stream reader task failed");
            Some(String::new())
        }
    }
}

/// Drains both streams and attaches them to the failure.
pub(super) async fn annotate(failure: ChildFailure, captured: CapturedOutput) -> ChildError {
    let (stdout, stderr) = captured.drain().await;
    ChildError::new(failure).with_output(stdout, stderr)
}
