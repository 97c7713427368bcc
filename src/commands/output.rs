//! # Output sinks for the management command.
//!
//! [`Output`] is the line-oriented sink the command reports through.
//! [`WriterOutput`] writes plain prefixed lines to any `io::Write`;
//! [`MemoryOutput`] keeps them for assertions.
//!
//! ## Example output
//! ```text
//! [info] Registered events:
//!  - user.created (2 listeners)
//! [ok] Queue processed successfully (3 jobs)
//! [error] Error clearing queue: the queue connection does not support clearing
//! ```

use std::io::Write;

/// Line-oriented message sink.
pub trait Output: Send {
    /// Writes one raw line.
    fn line(&mut self, message: &str);

    /// Informational message.
    fn info(&mut self, message: &str) {
        self.line(&format!("[info] {message}"));
    }

    /// Successful completion.
    fn success(&mut self, message: &str) {
        self.line(&format!("[ok] {message}"));
    }

    /// Failure.
    fn error(&mut self, message: &str) {
        self.line(&format!("[error] {message}"));
    }

    /// Warning.
    fn warning(&mut self, message: &str) {
        self.line(&format!("[warn] {message}"));
    }
}

/// Writes lines to an [`io::Write`](std::io::Write) (stdout, a file, a buffer).
///
/// Write failures are ignored; the sink is best-effort.
pub struct WriterOutput<W> {
    writer: W,
}

impl<W: Write + Send> WriterOutput<W> {
    /// Wraps `writer`.
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    /// Returns the inner writer.
    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl WriterOutput<std::io::Stdout> {
    /// Sink writing to stdout.
    pub fn stdout() -> Self {
        Self::new(std::io::stdout())
    }
}

impl<W: Write + Send> Output for WriterOutput<W> {
    fn line(&mut self, message: &str) {
        let _ = writeln!(self.writer, "{message}");
    }
}

/// Collects lines in memory.
#[derive(Debug, Default, Clone)]
pub struct MemoryOutput {
    lines: Vec<String>,
}

impl MemoryOutput {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every line written so far.
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// True if any line contains `needle`.
    pub fn contains(&self, needle: &str) -> bool {
        self.lines.iter().any(|l| l.contains(needle))
    }
}

impl Output for MemoryOutput {
    fn line(&mut self, message: &str) {
        self.lines.push(message.to_string());
    }
}
