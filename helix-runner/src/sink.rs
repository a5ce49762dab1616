//! Output sinks
//!
//! Everything the harness parses goes through an [`OutputSink`]. The
//! production sink writes to stdout and flushes after every line, since the
//! harness consumes stdout as a live stream.

use std::io::{self, Write};

/// Destination for protocol lines
pub trait OutputSink: Send {
    /// Writes one line; the sink appends the newline
    fn write_line(&mut self, line: &str) -> io::Result<()>;
}

/// Sink that writes straight to process stdout
#[derive(Debug, Default)]
pub struct StdoutSink;

impl StdoutSink {
    pub fn new() -> Self {
        Self
    }
}

impl OutputSink for StdoutSink {
    fn write_line(&mut self, line: &str) -> io::Result<()> {
        let mut out = io::stdout().lock();
        writeln!(out, "{}", line)?;
        out.flush()
    }
}

#[cfg(test)]
pub use memory::MemorySink;
