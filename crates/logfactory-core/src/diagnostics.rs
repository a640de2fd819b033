//! Internal debug log for the library itself
//!
//! Records logger creation, reconfiguration, rotation and write failures to a
//! file in the system temp directory. Off unless `LOGFACTORY_DEBUG` is `1` or
//! `true`, so applications never see stray output from their logging helper.
//! `LOGFACTORY_DEBUG_LEVEL` raises the minimum recorded level (default DEBUG).

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::PathBuf;
use std::sync::OnceLock;

use chrono::Local;
use parking_lot::Mutex;

use crate::format::TIMESTAMP_FORMAT;
use crate::severity::Severity;

/// Environment variable that turns internal diagnostics on
pub const DEBUG_ENV: &str = "LOGFACTORY_DEBUG";

/// Environment variable holding the minimum level of internal diagnostics
pub const DEBUG_LEVEL_ENV: &str = "LOGFACTORY_DEBUG_LEVEL";

fn min_level_from(var: &str) -> Severity {
    Severity::from_env(var).unwrap_or(Severity::Debug)
}

struct DiagnosticsState {
    file: Option<File>,
    min_level: Severity,
    enabled: bool,
}

impl DiagnosticsState {
    fn new() -> Self {
        let enabled = std::env::var(DEBUG_ENV)
            .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
            .unwrap_or(false);

        let file = if enabled {
            OpenOptions::new()
                .create(true)
                .append(true)
                .open(log_file_path())
                .ok()
        } else {
            None
        };

        Self {
            file,
            min_level: min_level_from(DEBUG_LEVEL_ENV),
            enabled,
        }
    }

    fn write(&mut self, level: Severity, module: &str, message: &str) {
        if !self.enabled || level < self.min_level {
            return;
        }

        if let Some(ref mut file) = self.file {
            let timestamp = Local::now().format(TIMESTAMP_FORMAT);
            let _ = writeln!(file, "[{}] [{:<8}] [{}] {}", timestamp, level, module, message);
            let _ = file.flush();
        }
    }
}

static STATE: OnceLock<Mutex<DiagnosticsState>> = OnceLock::new();

fn state() -> &'static Mutex<DiagnosticsState> {
    STATE.get_or_init(|| Mutex::new(DiagnosticsState::new()))
}

/// Record an internal event
pub fn log(level: Severity, module: &str, message: &str) {
    state().lock().write(level, module, message);
}

/// Whether internal diagnostics are being written
pub fn is_enabled() -> bool {
    state().lock().enabled
}

/// Path of the internal diagnostics file
pub fn log_file_path() -> PathBuf {
    std::env::temp_dir().join("logfactory-debug.log")
}

macro_rules! diag_debug {
    ($($arg:tt)*) => {
        $crate::diagnostics::log($crate::Severity::Debug, module_path!(), &format!($($arg)*))
    };
}

macro_rules! diag_warn {
    ($($arg:tt)*) => {
        $crate::diagnostics::log($crate::Severity::Warning, module_path!(), &format!($($arg)*))
    };
}

pub(crate) use diag_debug;
pub(crate) use diag_warn;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_file_path_in_temp_dir() {
        let path = log_file_path();
        assert!(path.starts_with(std::env::temp_dir()));
        assert_eq!(path.file_name().unwrap(), "logfactory-debug.log");
    }

    #[test]
    fn test_min_level_from_env() {
        const VAR: &str = "LOGFACTORY_TEST_DEBUG_LEVEL";
        assert_eq!(min_level_from(VAR), Severity::Debug);
        std::env::set_var(VAR, "warning");
        assert_eq!(min_level_from(VAR), Severity::Warning);
        std::env::set_var(VAR, "chatty");
        assert_eq!(min_level_from(VAR), Severity::Debug);
        std::env::remove_var(VAR);
    }

    #[test]
    fn test_below_min_level_is_dropped() {
        let path = std::env::temp_dir().join(format!("logfactory-diag-{}.log", std::process::id()));
        let mut state = DiagnosticsState {
            file: File::create(&path).ok(),
            min_level: Severity::Warning,
            enabled: true,
        };
        state.write(Severity::Debug, "tests", "quiet");
        state.write(Severity::Error, "tests", "loud");

        let written = std::fs::read_to_string(&path).unwrap();
        let _ = std::fs::remove_file(&path);
        assert!(!written.contains("quiet"));
        assert!(written.contains("loud"));
    }

    #[test]
    fn test_logging_never_panics() {
        diag_debug!("created logger {}", "diag-test");
        diag_warn!("rotation failed for {}", "diag-test");
        log(Severity::Critical, "tests", "direct");
        let _ = is_enabled();
    }
}
