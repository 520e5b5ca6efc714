//! Human-readable status output for a session.
//!
//! The host decides where lines go by supplying a [`DiagnosticSink`]. Status lines are
//! only written in verbose mode; error lines are always written.

use std::fmt;
use std::io::{self, Write};
use std::sync::{Arc, Mutex, MutexGuard};

/// Append-only destination for status and error lines.
///
/// Each call carries one self-contained sentence without a trailing newline.
pub trait DiagnosticSink: Send + Sync {
    fn write_line(&self, line: &str);
}

/// Discards everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl DiagnosticSink for NullSink {
    fn write_line(&self, _line: &str) {}
}

/// Forwards every line to `tracing` at INFO.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl DiagnosticSink for TracingSink {
    fn write_line(&self, line: &str) {
        tracing::info!("{}", line);
    }
}

/// Writes newline-terminated lines to any `io::Write`, flushing per call.
pub struct WriterSink<W: Write + Send> {
    writer: Mutex<W>,
}

impl<W: Write + Send> WriterSink<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer: Mutex::new(writer),
        }
    }

    pub fn into_inner(self) -> W {
        match self.writer.into_inner() {
            Ok(writer) => writer,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

impl WriterSink<io::Stderr> {
    #[must_use]
    pub fn stderr() -> Self {
        Self::new(io::stderr())
    }
}

impl<W: Write + Send> DiagnosticSink for WriterSink<W> {
    fn write_line(&self, line: &str) {
        let mut guard = match self.writer.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        // Write failures are dropped; the sink is best-effort.
        let _ = writeln!(guard, "{line}").and_then(|()| guard.flush());
    }
}

/// Collects lines in memory; clones share the same buffer.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    lines: Arc<Mutex<Vec<String>>>,
}

impl MemorySink {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn lines(&self) -> Vec<String> {
        self.guard().clone()
    }

    #[must_use]
    pub fn contains(&self, needle: &str) -> bool {
        self.guard().iter().any(|line| line.contains(needle))
    }

    fn guard(&self) -> MutexGuard<'_, Vec<String>> {
        match self.lines.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

impl DiagnosticSink for MemorySink {
    fn write_line(&self, line: &str) {
        self.guard().push(line.to_owned());
    }
}

/// A sink plus the verbosity flag that gates status lines.
#[derive(Clone)]
pub struct Diagnostics {
    sink: Arc<dyn DiagnosticSink>,
    verbose: bool,
}

impl Diagnostics {
    pub fn new(sink: Arc<dyn DiagnosticSink>, verbose: bool) -> Self {
        Self { sink, verbose }
    }

    /// Diagnostics that print nothing.
    #[must_use]
    pub fn silent() -> Self {
        Self::new(Arc::new(NullSink), false)
    }

    #[must_use]
    pub fn verbose(&self) -> bool {
        self.verbose
    }

    /// Write a status line when verbose.
    pub fn status(&self, args: fmt::Arguments<'_>) {
        if self.verbose {
            self.sink.write_line(&args.to_string());
        }
    }

    /// Write an error line regardless of verbosity.
    pub fn error(&self, args: fmt::Arguments<'_>) {
        self.sink.write_line(&args.to_string());
    }
}

impl fmt::Debug for Diagnostics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Diagnostics")
            .field("verbose", &self.verbose)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_lines_respect_verbosity() {
        let sink = MemorySink::new();
        let quiet = Diagnostics::new(Arc::new(sink.clone()), false);
        quiet.status(format_args!("[test] hidden"));
        quiet.error(format_args!("[test] shown"));
        assert_eq!(sink.lines(), vec!["[test] shown".to_string()]);

        let loud = Diagnostics::new(Arc::new(sink.clone()), true);
        loud.status(format_args!("[test] now visible"));
        assert!(sink.contains("now visible"));
    }

    #[test]
    fn writer_sink_terminates_lines() {
        let sink = WriterSink::new(Vec::new());
        sink.write_line("first");
        sink.write_line("second");
        let written = String::from_utf8(sink.into_inner()).unwrap();
        assert_eq!(written, "first\nsecond\n");
    }
}
