//! Named logger handles
//!
//! A `LoggerHandle` filters records by severity, renders them once with its
//! format template, and fans the line out to every attached destination.

use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use crate::destination::Destination;
use crate::diagnostics::diag_warn;
use crate::error::{EmitError, EmitResult, WriteFailure};
use crate::format::{Callsite, FormatTemplate, Record, SharedFormat};
use crate::severity::Severity;

/// What happens to a handle's existing destinations when it is configured again
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttachPolicy {
    /// Drop the previous destinations; repeated identical setup is idempotent
    #[default]
    Replace,
    /// Keep the previous destinations and add the new ones after them
    Append,
}

struct HandleState {
    level: Severity,
    format: SharedFormat,
    destinations: Vec<Arc<Destination>>,
}

/// A named logger
///
/// Handles are normally obtained from a [`LoggerRegistry`](crate::LoggerRegistry)
/// or a [`LoggerFactory`](crate::LoggerFactory) and shared as `Arc<LoggerHandle>`.
/// All methods take `&self` and are safe to call from many threads.
pub struct LoggerHandle {
    name: String,
    state: RwLock<HandleState>,
}

impl LoggerHandle {
    /// Create an unregistered handle with no destinations, DEBUG threshold
    /// and the default format
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            state: RwLock::new(HandleState {
                level: Severity::Debug,
                format: Arc::new(FormatTemplate::default_format()),
                destinations: Vec::new(),
            }),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Minimum severity that is emitted
    pub fn level(&self) -> Severity {
        self.state.read().level
    }

    pub fn set_level(&self, level: Severity) {
        self.state.write().level = level;
    }

    /// Format shared by all destinations
    pub fn format(&self) -> SharedFormat {
        Arc::clone(&self.state.read().format)
    }

    pub fn set_format(&self, format: FormatTemplate) {
        self.state.write().format = Arc::new(format);
    }

    pub fn is_enabled_for(&self, level: Severity) -> bool {
        level >= self.level()
    }

    pub fn destination_count(&self) -> usize {
        self.state.read().destinations.len()
    }

    /// Labels of the attached destinations, in attach order
    pub fn destination_labels(&self) -> Vec<String> {
        self.state
            .read()
            .destinations
            .iter()
            .map(|d| d.describe())
            .collect()
    }

    pub fn add_destination(&self, destination: Destination) {
        self.state.write().destinations.push(Arc::new(destination));
    }

    /// Detach every destination; open files close once in-flight emits finish
    pub fn clear_destinations(&self) {
        self.state.write().destinations.clear();
    }

    /// Apply level, format and destinations in one step
    ///
    /// Concurrent emits observe either the old or the new configuration,
    /// never a mix.
    pub fn configure(
        &self,
        level: Severity,
        format: FormatTemplate,
        destinations: Vec<Destination>,
        policy: AttachPolicy,
    ) {
        let opened = destinations.into_iter().map(Arc::new);
        let mut state = self.state.write();
        state.level = level;
        state.format = Arc::new(format);
        match policy {
            AttachPolicy::Replace => state.destinations = opened.collect(),
            AttachPolicy::Append => state.destinations.extend(opened),
        }
    }

    /// Render and write a record to every destination
    ///
    /// Below-threshold records are dropped without rendering. A destination
    /// that fails does not stop the others; all failures are returned together.
    pub fn emit(&self, level: Severity, message: &str, callsite: &Callsite) -> EmitResult {
        let (format, destinations) = {
            let state = self.state.read();
            if level < state.level || state.destinations.is_empty() {
                return Ok(());
            }
            (Arc::clone(&state.format), state.destinations.clone())
        };

        let record = Record::now(&self.name, level, message, callsite);
        let mut line = format.render(&record);
        line.push('\n');

        let mut failures = Vec::new();
        for destination in &destinations {
            if let Err(source) = destination.write_line(&line) {
                let label = destination.describe();
                diag_warn!("logger {}: write to {} failed: {}", self.name, label, source);
                failures.push(WriteFailure {
                    destination: label,
                    source,
                });
            }
        }

        if failures.is_empty() {
            Ok(())
        } else {
            Err(EmitError { failures })
        }
    }
}

impl fmt::Debug for LoggerHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.read();
        f.debug_struct("LoggerHandle")
            .field("name", &self.name)
            .field("level", &state.level)
            .field("format", &state.format.as_str())
            .field(
                "destinations",
                &state.destinations.iter().map(|d| d.describe()).collect::<Vec<_>>(),
            )
            .finish()
    }
}

/// Logging front-end implemented by handles
///
/// The per-severity methods capture the caller's file and line through
/// `#[track_caller]`. The function name is not available that way and renders
/// as `?` in the `{function}` field; use the `log_*!` macros when it matters.
pub trait Logger: Send + Sync {
    /// Logger name
    fn name(&self) -> &str;

    /// Emit with an explicit callsite
    fn emit(&self, level: Severity, message: &str, callsite: &Callsite) -> EmitResult;

    /// Emit at `level` from the caller's location
    #[track_caller]
    fn log(&self, level: Severity, message: &str) -> EmitResult {
        self.emit(level, message, &Callsite::caller())
    }

    #[track_caller]
    fn debug(&self, message: &str) -> EmitResult {
        self.emit(Severity::Debug, message, &Callsite::caller())
    }

    #[track_caller]
    fn info(&self, message: &str) -> EmitResult {
        self.emit(Severity::Info, message, &Callsite::caller())
    }

    #[track_caller]
    fn warning(&self, message: &str) -> EmitResult {
        self.emit(Severity::Warning, message, &Callsite::caller())
    }

    #[track_caller]
    fn error(&self, message: &str) -> EmitResult {
        self.emit(Severity::Error, message, &Callsite::caller())
    }

    #[track_caller]
    fn critical(&self, message: &str) -> EmitResult {
        self.emit(Severity::Critical, message, &Callsite::caller())
    }
}

impl Logger for LoggerHandle {
    fn name(&self) -> &str {
        LoggerHandle::name(self)
    }

    fn emit(&self, level: Severity, message: &str, callsite: &Callsite) -> EmitResult {
        LoggerHandle::emit(self, level, message, callsite)
    }
}

/// Type alias for a shared logger
pub type SharedLogger = Arc<dyn Logger>;

/// Name of the enclosing function
#[doc(hidden)]
#[macro_export]
macro_rules! __function_name {
    () => {{
        fn f() {}
        fn type_name_of<T>(_: T) -> &'static str {
            ::std::any::type_name::<T>()
        }
        let name = type_name_of(f);
        let name = name.strip_suffix("::f").unwrap_or(name);
        let name = name.trim_end_matches("::{{closure}}");
        match name.rfind("::") {
            Some(pos) => &name[pos + 2..],
            None => name,
        }
    }};
}

/// Emit a formatted message with the full callsite (module path, function, line)
#[macro_export]
macro_rules! log_at {
    ($logger:expr, $level:expr, $($arg:tt)*) => {{
        #[allow(unused_imports)]
        use $crate::Logger as _;
        $logger.emit(
            $level,
            &::std::format!($($arg)*),
            &$crate::Callsite::new(::std::module_path!(), $crate::__function_name!(), ::std::line!()),
        )
    }};
}

#[macro_export]
macro_rules! log_debug {
    ($logger:expr, $($arg:tt)*) => {
        $crate::log_at!($logger, $crate::Severity::Debug, $($arg)*)
    };
}

#[macro_export]
macro_rules! log_info {
    ($logger:expr, $($arg:tt)*) => {
        $crate::log_at!($logger, $crate::Severity::Info, $($arg)*)
    };
}

#[macro_export]
macro_rules! log_warning {
    ($logger:expr, $($arg:tt)*) => {
        $crate::log_at!($logger, $crate::Severity::Warning, $($arg)*)
    };
}

#[macro_export]
macro_rules! log_error {
    ($logger:expr, $($arg:tt)*) => {
        $crate::log_at!($logger, $crate::Severity::Error, $($arg)*)
    };
}

#[macro_export]
macro_rules! log_critical {
    ($logger:expr, $($arg:tt)*) => {
        $crate::log_at!($logger, $crate::Severity::Critical, $($arg)*)
    };
}
