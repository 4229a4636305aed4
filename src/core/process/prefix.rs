// lerna-rs: Lerna child-process core - Rust Port
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Prefixed re-emission of streaming children's output.
//!
//! ```text
//! Nth streaming launch --> COLOR_WHEEL[N % 6]
//!
//! child stdout --> LineTagger("pkg:" bold)          --> SharedOutput(stdout)
//! child stderr --> LineTagger("pkg:" plain, merged) --> SharedOutput(stderr)
//!
//! SharedOutput
//!   one lock per batch (lines never tear)
//!   capacity raised to live count before attach
//! ```

use std::pin::Pin;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use colored::{Color, Colorize};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::sync::Mutex;
use tracing::warn;

use super::io::decode_output;

/// Colors handed out to streaming children, in order.
pub const COLOR_WHEEL: [Color; 6] = [
    Color::Cyan,
    Color::Magenta,
    Color::Blue,
    Color::Yellow,
    Color::Green,
    Color::Red,
];

/// Attachments a shared output accepts before warning.
pub const DEFAULT_OUTPUT_CAPACITY: usize = 10;

/// Returns the color for the Nth streaming launch.
#[must_use]
pub const fn color_for(spawn_index: usize) -> Color {
    COLOR_WHEEL[spawn_index % COLOR_WHEEL.len()]
}

/// Builds the stdout tag: `label:` in bold color.
#[must_use]
pub fn stdout_tag(label: &str, color: Option<Color>) -> String {
    color.map_or_else(
        || format!("{label}:"),
        |c| format!("{}:", label.color(c).bold()),
    )
}

/// Builds the stderr tag: `label:` in plain color.
#[must_use]
pub fn stderr_tag(label: &str, color: Option<Color>) -> String {
    color.map_or_else(|| format!("{label}:"), |c| format!("{}:", label.color(c)))
}

/// Number of terminal columns a tag occupies, ignoring ANSI escapes.
fn visible_width(tag: &str) -> usize {
    let mut width = 0;
    let mut in_escape = false;
    for c in tag.chars() {
        match (in_escape, c) {
            (false, '\x1b') => in_escape = true,
            (false, _) => width += 1,
            (true, 'm') => in_escape = false,
            (true, _) => {}
        }
    }
    width
}

/// Line transform stage that puts a tag in front of every line.
///
/// With `merge_multiline`, all complete lines arriving in one chunk are
/// treated as one message: only the first line is tagged and the rest are
/// indented under it.
#[derive(Debug, Clone)]
pub struct LineTagger {
    tag: String,
    indent: String,
    merge_multiline: bool,
    pending: Vec<u8>,
}

impl LineTagger {
    #[must_use]
    pub fn new(tag: impl Into<String>, merge_multiline: bool) -> Self {
        let tag = tag.into();
        let indent = " ".repeat(visible_width(&tag));
        Self {
            tag,
            indent,
            merge_multiline,
            pending: Vec::new(),
        }
    }

    /// Returns the tag.
    #[must_use]
    pub fn tag(&self) -> &str {
        &self.tag
    }

    /// Feeds a chunk and returns the tagged output for every completed line.
    ///
    /// A trailing partial line is held back until its newline arrives.
    pub fn push(&mut self, chunk: &[u8]) -> Vec<u8> {
        self.pending.extend_from_slice(chunk);
        let Some(last_newline) = self.pending.iter().rposition(|&b| b == b'\n') else {
            return Vec::new();
        };
        let complete: Vec<u8> = self.pending.drain(..=last_newline).collect();
        self.format(&complete[..last_newline])
    }

    /// Flushes a trailing line that never got its newline.
    pub fn finish(&mut self) -> Vec<u8> {
        if self.pending.is_empty() {
            return Vec::new();
        }
        let rest = std::mem::take(&mut self.pending);
        self.format(&rest)
    }

    fn format(&self, block: &[u8]) -> Vec<u8> {
        let text = String::from_utf8_lossy(block);
        let mut out = String::with_capacity(text.len() + self.tag.len() * 2);
        for (i, line) in text.split('\n').enumerate() {
            let line = line.strip_suffix('\r').unwrap_or(line);
            let prefix = if self.merge_multiline && i > 0 {
                &self.indent
            } else {
                &self.tag
            };
            out.push_str(prefix);
            if !line.is_empty() {
                out.push(' ');
                out.push_str(line);
            }
            out.push('\n');
        }
        out.into_bytes()
    }
}

/// A parent output stream shared by every streaming child.
#[derive(Clone)]
pub struct SharedOutput {
    inner: Arc<OutputInner>,
}

struct OutputInner {
    name: &'static str,
    writer: Mutex<Pin<Box<dyn AsyncWrite + Send>>>,
    attached: AtomicUsize,
    capacity: AtomicUsize,
}

impl std::fmt::Debug for SharedOutput {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SharedOutput")
            .field("name", &self.inner.name)
            .field("attached", &self.attached())
            .field("capacity", &self.capacity())
            .finish_non_exhaustive()
    }
}

impl SharedOutput {
    pub fn new<W>(name: &'static str, writer: W) -> Self
    where
        W: AsyncWrite + Send + 'static,
    {
        Self {
            inner: Arc::new(OutputInner {
                name,
                writer: Mutex::new(Box::pin(writer)),
                attached: AtomicUsize::new(0),
                capacity: AtomicUsize::new(DEFAULT_OUTPUT_CAPACITY),
            }),
        }
    }

    /// The parent process's stdout.
    #[must_use]
    pub fn stdout() -> Self {
        Self::new("stdout", tokio::io::stdout())
    }

    /// The parent process's stderr.
    #[must_use]
    pub fn stderr() -> Self {
        Self::new("stderr", tokio::io::stderr())
    }

    /// Sets the initial attachment capacity.
    #[must_use]
    pub fn with_capacity(self, capacity: usize) -> Self {
        self.inner.capacity.store(capacity, Ordering::Release);
        self
    }

    /// Returns the number of children currently piping into this output.
    #[must_use]
    pub fn attached(&self) -> usize {
        self.inner.attached.load(Ordering::Acquire)
    }

    /// Returns the attachment capacity.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.inner.capacity.load(Ordering::Acquire)
    }

    /// Raises the capacity to at least `n`; never lowers it.
    pub fn ensure_capacity(&self, n: usize) {
        self.inner.capacity.fetch_max(n, Ordering::AcqRel);
    }

    /// Attaches a new writer, warning if the capacity is exceeded.
    #[must_use]
    pub fn attach(&self) -> OutputAttachment {
        let attached = self.inner.attached.fetch_add(1, Ordering::AcqRel) + 1;
        let capacity = self.capacity();
        if attached > capacity {
            warn!(
                output = self.inner.name,
                attached, capacity, "more streaming children attached than output capacity"
            );
        }
        OutputAttachment {
            output: self.clone(),
        }
    }

    async fn write_batch(&self, bytes: &[u8]) -> std::io::Result<()> {
        let mut writer = self.inner.writer.lock().await;
        writer.write_all(bytes).await?;
        writer.flush().await
    }
}

/// A live attachment to a [`SharedOutput`]; detaches on drop.
#[derive(Debug)]
pub struct OutputAttachment {
    output: SharedOutput,
}

impl Drop for OutputAttachment {
    fn drop(&mut self) {
        self.output.inner.attached.fetch_sub(1, Ordering::AcqRel);
    }
}

/// Pipes `reader` through `tagger` into the attached output until EOF.
///
/// Write failures are logged once and the rest of the stream is drained and
/// dropped, so the child never blocks on a full pipe. The raw text read is
/// also kept and returned with one trailing line terminator stripped, for
/// error annotation.
pub async fn pipe_prefixed<R>(
    mut reader: R,
    mut tagger: LineTagger,
    attachment: OutputAttachment,
) -> Option<String>
where
    R: AsyncRead + Unpin,
{
    let output = &attachment.output;
    let mut sink_open = true;
    let mut captured = Vec::new();
    let mut buf = vec![0u8; 8192];

    loop {
        let n = match reader.read(&mut buf).await {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) => {
                warn!(output = output.inner.name, tag = %tagger.tag(), error = %e, "error reading stream");
                break;
            }
        };
        captured.extend_from_slice(&buf[..n]);
        let batch = tagger.push(&buf[..n]);
        if sink_open && !batch.is_empty() {
            sink_open = write_or_close(output, &batch).await;
        }
    }

    let rest = tagger.finish();
    if sink_open && !rest.is_empty() {
        write_or_close(output, &rest).await;
    }
    Some(decode_output(captured))
}

async fn write_or_close(output: &SharedOutput, batch: &[u8]) -> bool {
    match output.write_batch(batch).await {
        Ok(()) => true,
        Err(e) => {
            warn!(output = output.inner.name, error = %e, "error writing prefixed output");
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_visible_width_ignores_escapes() {
        assert_eq!(visible_width("pkg:"), 4);
        assert_eq!(visible_width("\x1b[1;36mpkg\x1b[0m:"), 4);
    }

    #[test]
    fn test_color_wheel_wraps() {
        assert_eq!(color_for(0), Color::Cyan);
        assert_eq!(color_for(5), Color::Red);
        assert_eq!(color_for(6), Color::Cyan);
        assert_ne!(color_for(7), color_for(8));
    }

    #[test]
    fn test_capacity_never_lowers() {
        let output = SharedOutput::new("test", tokio::io::sink());
        output.ensure_capacity(3);
        assert_eq!(output.capacity(), DEFAULT_OUTPUT_CAPACITY);
        output.ensure_capacity(25);
        assert_eq!(output.capacity(), 25);
    }

    #[test]
    fn test_attachment_detaches_on_drop() {
        let output = SharedOutput::new("test", tokio::io::sink());
        let first = output.attach();
        let second = output.attach();
        assert_eq!(output.attached(), 2);
        drop(first);
        drop(second);
        assert_eq!(output.attached(), 0);
    }
}
