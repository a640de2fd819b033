//! Python bindings for logfactory via PyO3

use pyo3::exceptions::{PyOSError, PyValueError};
use pyo3::prelude::*;
use std::io;
use std::path::Path;
use std::sync::Arc;

use logfactory_core::{
    Callsite, DestinationSpec, FormatTemplate, LineSink, LogError, LoggerFactory, LoggerHandle,
    LoggerOptions, Severity, SharedSink, DEFAULT_FORMAT, DEFAULT_MAX_LOG_BACKUP_FILES,
    DEFAULT_MAX_LOG_BYTES, DEFAULT_ROTATING_LOG_FILE,
};

// ============================================================================
// Conversions
// ============================================================================

fn to_py_err(err: LogError) -> PyErr {
    match err {
        LogError::InvalidDestination { .. } | LogError::Io(_) | LogError::Write(_) => {
            PyOSError::new_err(err.to_string())
        }
        _ => PyValueError::new_err(err.to_string()),
    }
}

/// A level given either as a name ("DEBUG") or a logging-module number (10)
#[derive(FromPyObject)]
pub enum LevelArg {
    Name(String),
    Value(u8),
}

impl LevelArg {
    fn resolve(level: Option<LevelArg>) -> PyResult<Severity> {
        let parsed = match level {
            None => return Ok(Severity::Debug),
            Some(LevelArg::Name(name)) => name.parse(),
            Some(LevelArg::Value(value)) => value.to_string().parse(),
        };
        parsed.map_err(to_py_err)
    }
}

/// Callsite of the Python frame that called into the binding
fn python_callsite(py: Python<'_>) -> Callsite {
    let frame = || -> PyResult<Callsite> {
        let frame = py.import("sys")?.call_method1("_getframe", (0,))?;
        let code = frame.getattr("f_code")?;
        let filename: String = code.getattr("co_filename")?.extract()?;
        let function: String = code.getattr("co_name")?.extract()?;
        let line: u32 = frame.getattr("f_lineno")?.extract()?;
        let module = Path::new(&filename)
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("<unknown>")
            .to_string();
        Ok(Callsite::new(module, function, line))
    };
    frame().unwrap_or_else(|_| Callsite::new("<unknown>", "?", 0))
}

/// Console sink writing through Python's `sys.stdout`
struct PythonStdout;

impl LineSink for PythonStdout {
    fn write_line(&self, line: &str) -> io::Result<()> {
        Python::with_gil(|py| -> PyResult<()> {
            let stdout = py.import("sys")?.getattr("stdout")?;
            stdout.call_method1("write", (line,))?;
            stdout.call_method0("flush")?;
            Ok(())
        })
        .map_err(|e| io::Error::other(e.to_string()))
    }
}

fn python_stdout() -> SharedSink {
    SharedSink::new("sys.stdout", PythonStdout)
}

fn factory() -> LoggerFactory<'static> {
    LoggerFactory::global().with_console(python_stdout())
}

fn check_format(log_format: Option<String>) -> PyResult<Option<String>> {
    if let Some(template) = &log_format {
        FormatTemplate::parse(template.as_str()).map_err(to_py_err)?;
    }
    Ok(log_format)
}

// ============================================================================
// Destination
// ============================================================================

/// A destination to attach to a logger, with the format it was created with
#[pyclass]
#[derive(Clone)]
pub struct Destination {
    spec: DestinationSpec,
    log_format: Option<String>,
}

#[pymethods]
impl Destination {
    #[getter]
    pub fn kind(&self) -> &'static str {
        match self.spec {
            DestinationSpec::Console { .. }
            | DestinationSpec::Captured(_)
            | DestinationSpec::Sink(_) => "console",
            DestinationSpec::File { .. } => "file",
            DestinationSpec::RotatingFile { .. } => "rotating_file",
        }
    }

    #[getter]
    pub fn path(&self) -> Option<String> {
        self.spec.path().map(|p| p.display().to_string())
    }

    #[getter]
    pub fn log_format(&self) -> Option<String> {
        self.log_format.clone()
    }

    fn __repr__(&self) -> String {
        match self.path() {
            Some(path) => format!("Destination(kind='{}', path='{}')", self.kind(), path),
            None => format!("Destination(kind='{}')", self.kind()),
        }
    }
}

/// One destination or a list of them
#[derive(FromPyObject)]
pub enum DestinationArg {
    One(Destination),
    Many(Vec<Destination>),
}

impl DestinationArg {
    fn into_vec(self) -> Vec<Destination> {
        match self {
            DestinationArg::One(destination) => vec![destination],
            DestinationArg::Many(destinations) => destinations,
        }
    }
}

/// The explicit format, else the one format the destinations agree on
fn shared_format(
    log_format: Option<String>,
    destinations: &[Destination],
) -> PyResult<Option<String>> {
    if log_format.is_some() {
        return Ok(log_format);
    }
    let mut formats = destinations.iter().filter_map(|d| d.log_format.as_deref());
    let first = formats.next();
    if formats.any(|other| Some(other) != first) {
        return Err(PyValueError::new_err(
            "destinations were created with different formats; pass log_format",
        ));
    }
    Ok(first.map(str::to_string))
}

// ============================================================================
// Logger
// ============================================================================

#[pyclass]
pub struct Logger {
    inner: Arc<LoggerHandle>,
}

impl Logger {
    fn emit(&self, py: Python<'_>, level: Severity, msg: &str) -> PyResult<()> {
        let callsite = python_callsite(py);
        self.inner
            .emit(level, msg, &callsite)
            .map_err(|e| to_py_err(e.into()))
    }
}

#[pymethods]
impl Logger {
    #[getter]
    pub fn name(&self) -> String { self.inner.name().to_string() }

    #[getter]
    pub fn level(&self) -> String { self.inner.level().to_string() }

    #[getter]
    pub fn destinations(&self) -> Vec<String> { self.inner.destination_labels() }

    #[pyo3(signature = (level, msg))]
    pub fn log(&self, py: Python<'_>, level: LevelArg, msg: &str) -> PyResult<()> {
        let level = LevelArg::resolve(Some(level))?;
        self.emit(py, level, msg)
    }

    pub fn debug(&self, py: Python<'_>, msg: &str) -> PyResult<()> {
        self.emit(py, Severity::Debug, msg)
    }

    pub fn info(&self, py: Python<'_>, msg: &str) -> PyResult<()> {
        self.emit(py, Severity::Info, msg)
    }

    pub fn warning(&self, py: Python<'_>, msg: &str) -> PyResult<()> {
        self.emit(py, Severity::Warning, msg)
    }

    pub fn error(&self, py: Python<'_>, msg: &str) -> PyResult<()> {
        self.emit(py, Severity::Error, msg)
    }

    pub fn critical(&self, py: Python<'_>, msg: &str) -> PyResult<()> {
        self.emit(py, Severity::Critical, msg)
    }

    pub fn set_level(&self, level: LevelArg) -> PyResult<()> {
        self.inner.set_level(LevelArg::resolve(Some(level))?);
        Ok(())
    }

    pub fn is_enabled_for(&self, level: LevelArg) -> PyResult<bool> {
        Ok(self.inner.is_enabled_for(LevelArg::resolve(Some(level))?))
    }

    fn __repr__(&self) -> String {
        format!("Logger(name='{}', level={})", self.inner.name(), self.inner.level())
    }
}

impl From<Arc<LoggerHandle>> for Logger {
    fn from(inner: Arc<LoggerHandle>) -> Self {
        Self { inner }
    }
}

fn options(
    logger_name: String,
    log_file: Option<String>,
    log_format: Option<String>,
    log_level: Option<LevelArg>,
) -> PyResult<LoggerOptions> {
    let mut options = LoggerOptions::new(logger_name).with_level(LevelArg::resolve(log_level)?);
    if let Some(file) = log_file {
        options = options.with_file(file);
    }
    if let Some(format) = log_format {
        options = options.with_format(format);
    }
    Ok(options)
}

// ============================================================================
// Module Functions
// ============================================================================

/// The default record format template
#[pyfunction]
pub fn get_default_log_format() -> &'static str {
    DEFAULT_FORMAT
}

#[pyfunction]
#[pyo3(signature = (logger_name, log_format=None, log_level=None))]
pub fn get_new_console_logger(
    logger_name: String,
    log_format: Option<String>,
    log_level: Option<LevelArg>,
) -> PyResult<Logger> {
    let options = options(logger_name, None, log_format, log_level)?;
    factory().console(&options).map(Logger::from).map_err(to_py_err)
}

#[pyfunction]
#[pyo3(signature = (logger_name, log_file=None, log_format=None, log_level=None))]
pub fn get_new_file_logger(
    logger_name: String,
    log_file: Option<String>,
    log_format: Option<String>,
    log_level: Option<LevelArg>,
) -> PyResult<Logger> {
    let options = options(logger_name, log_file, log_format, log_level)?;
    factory().file(&options).map(Logger::from).map_err(to_py_err)
}

#[pyfunction]
#[pyo3(signature = (
    logger_name,
    log_file=None,
    max_log_bytes=DEFAULT_MAX_LOG_BYTES,
    max_log_backup_files=DEFAULT_MAX_LOG_BACKUP_FILES,
    log_format=None,
    log_level=None
))]
pub fn get_new_rotating_file_logger(
    logger_name: String,
    log_file: Option<String>,
    max_log_bytes: u64,
    max_log_backup_files: u32,
    log_format: Option<String>,
    log_level: Option<LevelArg>,
) -> PyResult<Logger> {
    let options = options(logger_name, log_file, log_format, log_level)?
        .with_max_log_bytes(max_log_bytes)
        .with_max_log_backup_files(max_log_backup_files);
    factory().rotating_file(&options).map(Logger::from).map_err(to_py_err)
}

#[pyfunction]
#[pyo3(signature = (logger_name, log_file=None, log_format=None, log_level=None))]
pub fn get_new_file_console_logger(
    logger_name: String,
    log_file: Option<String>,
    log_format: Option<String>,
    log_level: Option<LevelArg>,
) -> PyResult<Logger> {
    let options = options(logger_name, log_file, log_format, log_level)?;
    factory().file_console(&options).map(Logger::from).map_err(to_py_err)
}

#[pyfunction]
#[pyo3(signature = (log_format=None))]
pub fn get_new_console_handler(log_format: Option<String>) -> PyResult<Destination> {
    Ok(Destination {
        spec: DestinationSpec::sink(python_stdout()),
        log_format: check_format(log_format)?,
    })
}

#[pyfunction]
#[pyo3(signature = (log_format=None, log_file_name="out.log".to_string()))]
pub fn get_new_file_handler(
    log_format: Option<String>,
    log_file_name: String,
) -> PyResult<Destination> {
    Ok(Destination {
        spec: DestinationSpec::file(log_file_name),
        log_format: check_format(log_format)?,
    })
}

#[pyfunction]
#[pyo3(signature = (
    log_file_name=DEFAULT_ROTATING_LOG_FILE.to_string(),
    max_log_bytes=DEFAULT_MAX_LOG_BYTES,
    max_log_backup_files=DEFAULT_MAX_LOG_BACKUP_FILES,
    log_format=None
))]
pub fn get_new_rotating_file_handler(
    log_file_name: String,
    max_log_bytes: u64,
    max_log_backup_files: u32,
    log_format: Option<String>,
) -> PyResult<Destination> {
    Ok(Destination {
        spec: DestinationSpec::rotating(log_file_name, max_log_bytes, max_log_backup_files),
        log_format: check_format(log_format)?,
    })
}

/// Build a logger from destinations made by the `get_new_*_handler` functions
#[pyfunction]
#[pyo3(signature = (logger_name, destinations, log_format=None, log_level=None))]
pub fn create_logger(
    logger_name: String,
    destinations: DestinationArg,
    log_format: Option<String>,
    log_level: Option<LevelArg>,
) -> PyResult<Logger> {
    let destinations = destinations.into_vec();
    let log_format = shared_format(log_format, &destinations)?;
    let level = LevelArg::resolve(log_level)?;
    factory()
        .create(
            &logger_name,
            destinations.into_iter().map(|d| d.spec),
            log_format.as_deref(),
            Some(level),
        )
        .map(Logger::from)
        .map_err(to_py_err)
}

// ============================================================================
// Module Definition
// ============================================================================

#[pymodule]
fn logfactory(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<Logger>()?;
    m.add_class::<Destination>()?;

    m.add("DEBUG", Severity::Debug.value())?;
    m.add("INFO", Severity::Info.value())?;
    m.add("WARNING", Severity::Warning.value())?;
    m.add("ERROR", Severity::Error.value())?;
    m.add("CRITICAL", Severity::Critical.value())?;

    m.add_function(wrap_pyfunction!(get_default_log_format, m)?)?;
    m.add_function(wrap_pyfunction!(get_new_console_logger, m)?)?;
    m.add_function(wrap_pyfunction!(get_new_file_logger, m)?)?;
    m.add_function(wrap_pyfunction!(get_new_rotating_file_logger, m)?)?;
    m.add_function(wrap_pyfunction!(get_new_file_console_logger, m)?)?;
    m.add_function(wrap_pyfunction!(get_new_console_handler, m)?)?;
    m.add_function(wrap_pyfunction!(get_new_file_handler, m)?)?;
    m.add_function(wrap_pyfunction!(get_new_rotating_file_handler, m)?)?;
    m.add_function(wrap_pyfunction!(create_logger, m)?)?;

    Ok(())
}
