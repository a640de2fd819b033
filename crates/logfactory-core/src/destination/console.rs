//! Console destination

use std::fmt;
use std::io::{self, Write};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::memory::MemoryBuffer;

/// Process stream selectable from configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StreamTarget {
    #[default]
    Stdout,
    Stderr,
}

/// Receiver for console lines that do not go to a process stream
///
/// Embedders use this to hand lines to a host runtime's own stdout object.
pub trait LineSink: Send + Sync {
    /// Write one already-terminated line
    fn write_line(&self, line: &str) -> io::Result<()>;
}

impl LineSink for MemoryBuffer {
    fn write_line(&self, line: &str) -> io::Result<()> {
        self.append(line.as_bytes());
        Ok(())
    }
}

/// A labelled, shareable [`LineSink`]; clones compare equal
#[derive(Clone)]
pub struct SharedSink {
    label: Arc<str>,
    sink: Arc<dyn LineSink>,
}

impl SharedSink {
    pub fn new(label: impl Into<String>, sink: impl LineSink + 'static) -> Self {
        Self {
            label: Arc::from(label.into()),
            sink: Arc::new(sink),
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn write_line(&self, line: &str) -> io::Result<()> {
        self.sink.write_line(line)
    }
}

impl fmt::Debug for SharedSink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SharedSink").field("label", &self.label).finish()
    }
}

impl PartialEq for SharedSink {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.sink, &other.sink)
    }
}

/// Where console lines actually go
#[derive(Debug, Clone, PartialEq)]
pub enum ConsoleStream {
    Stdout,
    Stderr,
    /// Written to a shared buffer instead of a process stream
    Captured(MemoryBuffer),
    /// Handed to an embedder-provided sink
    Sink(SharedSink),
}

impl From<StreamTarget> for ConsoleStream {
    fn from(target: StreamTarget) -> Self {
        match target {
            StreamTarget::Stdout => ConsoleStream::Stdout,
            StreamTarget::Stderr => ConsoleStream::Stderr,
        }
    }
}

impl From<MemoryBuffer> for ConsoleStream {
    fn from(buffer: MemoryBuffer) -> Self {
        ConsoleStream::Captured(buffer)
    }
}

impl From<SharedSink> for ConsoleStream {
    fn from(sink: SharedSink) -> Self {
        ConsoleStream::Sink(sink)
    }
}

/// Writes each line to a console stream
///
/// Stdout and stderr writes hold the std stream lock for the whole line, so
/// concurrent loggers never interleave within a line.
#[derive(Debug, Clone)]
pub struct ConsoleDestination {
    stream: ConsoleStream,
}

impl ConsoleDestination {
    pub fn new(stream: ConsoleStream) -> Self {
        Self { stream }
    }

    pub fn stdout() -> Self {
        Self::new(ConsoleStream::Stdout)
    }

    /// Write one already-terminated line
    pub fn write_line(&self, line: &str) -> io::Result<()> {
        match &self.stream {
            ConsoleStream::Stdout => {
                let mut out = io::stdout().lock();
                out.write_all(line.as_bytes())?;
                out.flush()
            }
            ConsoleStream::Stderr => {
                let mut out = io::stderr().lock();
                out.write_all(line.as_bytes())?;
                out.flush()
            }
            ConsoleStream::Captured(buffer) => LineSink::write_line(buffer, line),
            ConsoleStream::Sink(sink) => sink.write_line(line),
        }
    }

    pub fn describe(&self) -> String {
        match &self.stream {
            ConsoleStream::Stdout => "console:stdout".to_string(),
            ConsoleStream::Stderr => "console:stderr".to_string(),
            ConsoleStream::Captured(_) => "console:captured".to_string(),
            ConsoleStream::Sink(sink) => format!("console:{}", sink.label()),
        }
    }
}
