//! logfactory core
//!
//! Factories for named loggers that write one shared record format to the
//! console, a plain append-only file, a size-rotated file, or any mix.
//!
//! ## Building loggers
//!
//! ```rust,no_run
//! use logfactory_core::{LoggerFactory, LoggerOptions, LoggerRegistry, Logger, Severity};
//!
//! let registry = LoggerRegistry::new();
//! let factory = LoggerFactory::new(&registry);
//!
//! let console = factory.console(&LoggerOptions::new("logger1"))?;
//! console.debug("Hello World")?;
//!
//! let rotating = factory.rotating_file(
//!     &LoggerOptions::new("rotating")
//!         .with_max_log_bytes(1_000_000)
//!         .with_max_log_backup_files(5)
//!         .with_level(Severity::Info),
//! )?;
//! logfactory_core::log_info!(rotating, "{} jobs queued", 3)?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! Building a logger whose name is already registered reconfigures the same
//! handle. With the default `AttachPolicy::Replace` the new destinations
//! replace the old ones; `AttachPolicy::Append` accumulates them.

pub mod config;
pub mod destination;
pub mod diagnostics;
pub mod error;
pub mod factory;
pub mod format;
pub mod logger;
pub mod registry;
pub mod severity;

// Re-export commonly used types
pub use config::{DefaultSettings, LoggerConfig, LoggingConfig};

pub use destination::{
    ConsoleDestination, ConsoleStream, Destination, DestinationSpec, FileDestination, LineSink,
    MemoryBuffer, RotatingFileDestination, SharedSink, StreamTarget, DEFAULT_LOG_FILE,
    DEFAULT_MAX_LOG_BACKUP_FILES, DEFAULT_MAX_LOG_BYTES, DEFAULT_ROTATING_LOG_FILE,
};

pub use error::{EmitError, EmitResult, LogError, LogResult, WriteFailure};

pub use factory::{
    console_logger, create_logger, file_console_logger, file_logger, rotating_file_logger,
    LoggerFactory, LoggerOptions,
};

pub use format::{Callsite, FormatTemplate, Record, DEFAULT_FORMAT};

pub use logger::{AttachPolicy, Logger, LoggerHandle, SharedLogger};

pub use registry::LoggerRegistry;

pub use severity::Severity;
