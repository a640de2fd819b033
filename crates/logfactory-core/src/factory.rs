//! Logger factories
//!
//! `LoggerFactory::create` is the general constructor; the console, file,
//! rotating file and file+console constructors are specializations of it
//! driven by [`LoggerOptions`].
//!
//! Records emitted through the [`Logger`](crate::Logger) methods render the
//! `{function}` field as `?`; the `log_*!` macros fill it in.
//!
//! ```no_run
//! use logfactory_core::{console_logger, file_console_logger, Logger, LoggerOptions, Severity};
//!
//! let console = console_logger("logger1")?;
//! console.debug("Hello World")?;
//!
//! let both = file_console_logger(
//!     LoggerOptions::new("my_logging2")
//!         .with_file("out3.log")
//!         .with_level(Severity::Info),
//! )?;
//! both.error("Error: This is from console file logger")?;
//! # Ok::<(), logfactory_core::LogError>(())
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use crate::destination::{
    ConsoleStream, DestinationSpec, DEFAULT_LOG_FILE, DEFAULT_MAX_LOG_BACKUP_FILES, DEFAULT_MAX_LOG_BYTES,
    DEFAULT_ROTATING_LOG_FILE,
};
use crate::diagnostics::diag_debug;
use crate::error::{LogError, LogResult};
use crate::format::FormatTemplate;
use crate::logger::{AttachPolicy, LoggerHandle};
use crate::registry::LoggerRegistry;
use crate::severity::Severity;

/// Named construction parameters shared by the derived constructors
///
/// Unset fields fall back to the constructor's defaults: `execution.log`
/// (plain and combined) or `out.log` (rotating), 2,000,000 bytes, 20
/// backups, the default format and DEBUG.
#[derive(Debug, Clone, PartialEq)]
pub struct LoggerOptions {
    pub logger_name: String,
    pub log_file: Option<PathBuf>,
    pub max_log_bytes: u64,
    pub max_log_backup_files: u32,
    pub log_format: Option<String>,
    pub log_level: Severity,
}

impl LoggerOptions {
    pub fn new(logger_name: impl Into<String>) -> Self {
        Self {
            logger_name: logger_name.into(),
            log_file: None,
            max_log_bytes: DEFAULT_MAX_LOG_BYTES,
            max_log_backup_files: DEFAULT_MAX_LOG_BACKUP_FILES,
            log_format: None,
            log_level: Severity::Debug,
        }
    }

    pub fn with_file(mut self, log_file: impl Into<PathBuf>) -> Self {
        self.log_file = Some(log_file.into());
        self
    }

    pub fn with_max_log_bytes(mut self, max_log_bytes: u64) -> Self {
        self.max_log_bytes = max_log_bytes;
        self
    }

    pub fn with_max_log_backup_files(mut self, max_log_backup_files: u32) -> Self {
        self.max_log_backup_files = max_log_backup_files;
        self
    }

    pub fn with_format(mut self, log_format: impl Into<String>) -> Self {
        self.log_format = Some(log_format.into());
        self
    }

    pub fn with_level(mut self, log_level: Severity) -> Self {
        self.log_level = log_level;
        self
    }

    fn file_or(&self, default: &str) -> PathBuf {
        self.log_file.clone().unwrap_or_else(|| PathBuf::from(default))
    }
}

impl From<&str> for LoggerOptions {
    fn from(logger_name: &str) -> Self {
        Self::new(logger_name)
    }
}

impl From<String> for LoggerOptions {
    fn from(logger_name: String) -> Self {
        Self::new(logger_name)
    }
}

/// Builds loggers into a registry
#[derive(Debug, Clone)]
pub struct LoggerFactory<'r> {
    registry: &'r LoggerRegistry,
    policy: AttachPolicy,
    console: ConsoleStream,
}

impl LoggerFactory<'static> {
    /// Factory over the process-wide registry
    pub fn global() -> Self {
        Self::new(LoggerRegistry::global())
    }
}

impl<'r> LoggerFactory<'r> {
    /// Factory with the `Replace` attach policy and console output on stdout
    pub fn new(registry: &'r LoggerRegistry) -> Self {
        Self {
            registry,
            policy: AttachPolicy::Replace,
            console: ConsoleStream::Stdout,
        }
    }

    /// Choose how repeated construction of one name treats earlier destinations
    pub fn with_policy(mut self, policy: AttachPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Console stream used by `console` and `file_console`
    ///
    /// Accepts a [`StreamTarget`](crate::StreamTarget), a
    /// [`MemoryBuffer`](crate::MemoryBuffer), a [`SharedSink`](crate::SharedSink)
    /// or a [`ConsoleStream`].
    pub fn with_console(mut self, console: impl Into<ConsoleStream>) -> Self {
        self.console = console.into();
        self
    }

    pub fn policy(&self) -> AttachPolicy {
        self.policy
    }

    pub fn registry(&self) -> &'r LoggerRegistry {
        self.registry
    }

    /// Build or reconfigure the logger `name`
    ///
    /// Every destination is opened before the registry is touched, so a
    /// failure leaves an existing logger of that name unchanged. A new logger
    /// is fully configured before other threads can look it up.
    ///
    /// # Errors
    /// - `LogError::EmptyName` for an empty or blank name
    /// - `LogError::NoDestinations` when `destinations` is empty
    /// - `LogError::InvalidFormat` for a malformed template
    /// - `LogError::InvalidDestination` when a file cannot be opened for append
    pub fn create<I>(
        &self,
        name: &str,
        destinations: I,
        format: Option<&str>,
        level: Option<Severity>,
    ) -> LogResult<Arc<LoggerHandle>>
    where
        I: IntoIterator<Item = DestinationSpec>,
    {
        if name.trim().is_empty() {
            return Err(LogError::EmptyName);
        }

        let specs: Vec<DestinationSpec> = destinations.into_iter().collect();
        if specs.is_empty() {
            return Err(LogError::NoDestinations);
        }

        let format = match format {
            Some(template) => FormatTemplate::parse(template)?,
            None => FormatTemplate::default_format(),
        };
        let level = level.unwrap_or_default();

        let opened = specs
            .iter()
            .map(DestinationSpec::open)
            .collect::<LogResult<Vec<_>>>()?;

        let handle = self.registry.configure_or_insert(name, |handle| {
            handle.configure(level, format, opened, self.policy)
        });
        diag_debug!(
            "configured logger {:?}: level={} destinations={:?} policy={:?}",
            name,
            level,
            handle.destination_labels(),
            self.policy
        );
        Ok(handle)
    }

    /// Logger writing to the console stream (stdout unless overridden)
    pub fn console(&self, options: &LoggerOptions) -> LogResult<Arc<LoggerHandle>> {
        self.create_with(options, [self.console_spec()])
    }

    /// Logger appending to a plain file (`execution.log` by default)
    pub fn file(&self, options: &LoggerOptions) -> LogResult<Arc<LoggerHandle>> {
        self.create_with(options, [DestinationSpec::file(options.file_or(DEFAULT_LOG_FILE))])
    }

    /// Logger writing to a size-rotated file (`out.log` by default)
    pub fn rotating_file(&self, options: &LoggerOptions) -> LogResult<Arc<LoggerHandle>> {
        self.create_with(
            options,
            [DestinationSpec::rotating(
                options.file_or(DEFAULT_ROTATING_LOG_FILE),
                options.max_log_bytes,
                options.max_log_backup_files,
            )],
        )
    }

    /// Logger writing to a plain file and the console stream with one format
    pub fn file_console(&self, options: &LoggerOptions) -> LogResult<Arc<LoggerHandle>> {
        self.create_with(
            options,
            [
                DestinationSpec::file(options.file_or(DEFAULT_LOG_FILE)),
                self.console_spec(),
            ],
        )
    }

    fn console_spec(&self) -> DestinationSpec {
        self.console.clone().into()
    }

    fn create_with<const N: usize>(
        &self,
        options: &LoggerOptions,
        destinations: [DestinationSpec; N],
    ) -> LogResult<Arc<LoggerHandle>> {
        self.create(
            &options.logger_name,
            destinations,
            options.log_format.as_deref(),
            Some(options.log_level),
        )
    }
}

/// Build a logger in the process-wide registry
pub fn create_logger<I>(
    name: &str,
    destinations: I,
    format: Option<&str>,
    level: Option<Severity>,
) -> LogResult<Arc<LoggerHandle>>
where
    I: IntoIterator<Item = DestinationSpec>,
{
    LoggerFactory::global().create(name, destinations, format, level)
}

/// Console logger in the process-wide registry
///
/// `logger.debug(..)` and friends report `?` as the function; use
/// [`log_debug!`](crate::log_debug) and the other `log_*!` macros to record it.
pub fn console_logger(options: impl Into<LoggerOptions>) -> LogResult<Arc<LoggerHandle>> {
    LoggerFactory::global().console(&options.into())
}

/// Plain file logger in the process-wide registry
pub fn file_logger(options: impl Into<LoggerOptions>) -> LogResult<Arc<LoggerHandle>> {
    LoggerFactory::global().file(&options.into())
}

/// Rotating file logger in the process-wide registry
pub fn rotating_file_logger(options: impl Into<LoggerOptions>) -> LogResult<Arc<LoggerHandle>> {
    LoggerFactory::global().rotating_file(&options.into())
}

/// File+console logger in the process-wide registry
pub fn file_console_logger(options: impl Into<LoggerOptions>) -> LogResult<Arc<LoggerHandle>> {
    LoggerFactory::global().file_console(&options.into())
}
