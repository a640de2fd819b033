//! Output destinations
//!
//! - `DestinationSpec`: what to open (cloneable, deserializable from config)
//! - `Destination`: an opened destination holding its stream or file
//!
//! Both are closed enums so the set of destination kinds is matched
//! exhaustively wherever it matters.

mod console;
mod file;
mod memory;
mod rotating;

use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::LogResult;

pub use console::{ConsoleDestination, ConsoleStream, LineSink, SharedSink, StreamTarget};
pub use file::FileDestination;
pub use memory::MemoryBuffer;
pub use rotating::{RotatingFileDestination, DEFAULT_MAX_LOG_BACKUP_FILES, DEFAULT_MAX_LOG_BYTES};

/// Default file for plain and combined file loggers
pub const DEFAULT_LOG_FILE: &str = "execution.log";

/// Default file for rotating file loggers
pub const DEFAULT_ROTATING_LOG_FILE: &str = "out.log";

fn default_max_bytes() -> u64 {
    DEFAULT_MAX_LOG_BYTES
}

fn default_backups() -> u32 {
    DEFAULT_MAX_LOG_BACKUP_FILES
}

/// Description of a destination to open
///
/// # Example
///
/// ```
/// use logfactory_core::DestinationSpec;
///
/// let specs = vec![
///     DestinationSpec::console(),
///     DestinationSpec::rotating("out.log", 2_000_000, 20),
/// ];
/// assert_eq!(specs.len(), 2);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DestinationSpec {
    Console {
        #[serde(default)]
        stream: StreamTarget,
    },
    File {
        path: PathBuf,
    },
    RotatingFile {
        path: PathBuf,
        #[serde(default = "default_max_bytes")]
        max_bytes: u64,
        #[serde(default = "default_backups")]
        backups: u32,
    },
    /// Console output captured into a shared buffer; not available from config
    #[serde(skip)]
    Captured(MemoryBuffer),
    /// Console output handed to an embedder sink; not available from config
    #[serde(skip)]
    Sink(SharedSink),
}

impl DestinationSpec {
    /// Standard output
    pub fn console() -> Self {
        DestinationSpec::Console {
            stream: StreamTarget::Stdout,
        }
    }

    /// Standard error
    pub fn stderr() -> Self {
        DestinationSpec::Console {
            stream: StreamTarget::Stderr,
        }
    }

    /// Plain append-only file
    pub fn file(path: impl Into<PathBuf>) -> Self {
        DestinationSpec::File { path: path.into() }
    }

    /// Size-rotated file
    pub fn rotating(path: impl Into<PathBuf>, max_bytes: u64, backups: u32) -> Self {
        DestinationSpec::RotatingFile {
            path: path.into(),
            max_bytes,
            backups,
        }
    }

    /// Console-style output into `buffer`
    pub fn captured(buffer: MemoryBuffer) -> Self {
        DestinationSpec::Captured(buffer)
    }

    /// Console-style output into an embedder sink
    pub fn sink(sink: SharedSink) -> Self {
        DestinationSpec::Sink(sink)
    }

    /// File backing this destination, if any
    pub fn path(&self) -> Option<&Path> {
        match self {
            DestinationSpec::File { path } | DestinationSpec::RotatingFile { path, .. } => {
                Some(path)
            }
            DestinationSpec::Console { .. }
            | DestinationSpec::Captured(_)
            | DestinationSpec::Sink(_) => None,
        }
    }

    /// Open the destination; file-backed kinds create their file here
    ///
    /// # Errors
    /// `LogError::InvalidDestination` when a file cannot be opened for append.
    pub fn open(&self) -> LogResult<Destination> {
        Ok(match self {
            DestinationSpec::Console { stream } => {
                Destination::Console(ConsoleDestination::new((*stream).into()))
            }
            DestinationSpec::Captured(buffer) => Destination::Console(ConsoleDestination::new(
                ConsoleStream::Captured(buffer.clone()),
            )),
            DestinationSpec::Sink(sink) => Destination::Console(ConsoleDestination::new(
                ConsoleStream::Sink(sink.clone()),
            )),
            DestinationSpec::File { path } => Destination::File(FileDestination::open(path)?),
            DestinationSpec::RotatingFile {
                path,
                max_bytes,
                backups,
            } => Destination::RotatingFile(RotatingFileDestination::open(
                path, *max_bytes, *backups,
            )?),
        })
    }
}

impl From<MemoryBuffer> for DestinationSpec {
    fn from(buffer: MemoryBuffer) -> Self {
        DestinationSpec::Captured(buffer)
    }
}

impl From<ConsoleStream> for DestinationSpec {
    fn from(stream: ConsoleStream) -> Self {
        match stream {
            ConsoleStream::Stdout => DestinationSpec::console(),
            ConsoleStream::Stderr => DestinationSpec::stderr(),
            ConsoleStream::Captured(buffer) => DestinationSpec::Captured(buffer),
            ConsoleStream::Sink(sink) => DestinationSpec::Sink(sink),
        }
    }
}

/// An opened destination
#[derive(Debug)]
pub enum Destination {
    Console(ConsoleDestination),
    File(FileDestination),
    RotatingFile(RotatingFileDestination),
}

impl Destination {
    /// Write one already-terminated line as a single unit
    pub fn write_line(&self, line: &str) -> io::Result<()> {
        match self {
            Destination::Console(d) => d.write_line(line),
            Destination::File(d) => d.write_line(line),
            Destination::RotatingFile(d) => d.write_line(line),
        }
    }

    /// Short label used in error reports, e.g. `file:execution.log`
    pub fn describe(&self) -> String {
        match self {
            Destination::Console(d) => d.describe(),
            Destination::File(d) => d.describe(),
            Destination::RotatingFile(d) => d.describe(),
        }
    }

    pub fn path(&self) -> Option<&Path> {
        match self {
            Destination::Console(_) => None,
            Destination::File(d) => Some(d.path()),
            Destination::RotatingFile(d) => Some(d.path()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LogError;
    use tempfile::tempdir;

    #[test]
    fn test_destination_constructors() {
        assert_eq!(
            DestinationSpec::console(),
            DestinationSpec::Console { stream: StreamTarget::Stdout }
        );
        assert_eq!(DestinationSpec::file("a.log").path(), Some(Path::new("a.log")));
        assert_eq!(DestinationSpec::stderr().path(), None);
    }

    #[test]
    fn test_open_each_kind() {
        let dir = tempdir().unwrap();
        let buffer = MemoryBuffer::new();

        let console = DestinationSpec::captured(buffer.clone()).open().unwrap();
        let file = DestinationSpec::file(dir.path().join("plain.log")).open().unwrap();
        let rotating = DestinationSpec::rotating(dir.path().join("out.log"), 100, 2)
            .open()
            .unwrap();

        assert!(matches!(console, Destination::Console(_)));
        assert!(matches!(file, Destination::File(_)));
        assert!(matches!(rotating, Destination::RotatingFile(ref r) if r.backups() == 2));

        console.write_line("captured\n").unwrap();
        assert_eq!(buffer.contents(), "captured\n");
        assert_eq!(file.describe(), format!("file:{}", dir.path().join("plain.log").display()));
        assert_eq!(file.path(), Some(dir.path().join("plain.log").as_path()));
        assert_eq!(console.path(), None);
    }

    #[test]
    fn test_console_stream_maps_to_console_specs() {
        let buffer = MemoryBuffer::new();
        assert_eq!(DestinationSpec::from(ConsoleStream::Stderr), DestinationSpec::stderr());
        assert_eq!(
            DestinationSpec::from(ConsoleStream::from(buffer.clone())),
            DestinationSpec::captured(buffer.clone())
        );

        let spec = DestinationSpec::from(ConsoleStream::Sink(SharedSink::new("embedded", buffer.clone())));
        assert_eq!(spec.path(), None);
        let opened = spec.open().unwrap();
        opened.write_line("via sink\n").unwrap();
        assert_eq!(opened.describe(), "console:embedded");
        assert_eq!(buffer.lines(), vec!["via sink"]);
    }

    #[test]
    fn test_open_reports_invalid_destination() {
        let dir = tempdir().unwrap();
        let spec = DestinationSpec::rotating(dir.path().join("no/such/dir/out.log"), 10, 1);
        assert!(matches!(spec.open(), Err(LogError::InvalidDestination { .. })));
    }

    #[test]
    fn test_yaml_defaults_for_rotating() {
        let spec: DestinationSpec = serde_yaml::from_str("kind: rotating_file\npath: out.log\n").unwrap();
        assert_eq!(
            spec,
            DestinationSpec::rotating("out.log", DEFAULT_MAX_LOG_BYTES, DEFAULT_MAX_LOG_BACKUP_FILES)
        );

        let console: DestinationSpec = serde_yaml::from_str("kind: console\nstream: stderr\n").unwrap();
        assert_eq!(console, DestinationSpec::stderr());
    }
}
