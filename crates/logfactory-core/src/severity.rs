//! Severity levels

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::LogError;

/// Environment variable that overrides the configured default level
pub const LOG_LEVEL_ENV: &str = "LOGFACTORY_LOG_LEVEL";

/// Message severity, ordered from least to most severe
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Severity {
    #[default]
    Debug = 10,
    Info = 20,
    Warning = 30,
    Error = 40,
    Critical = 50,
}

impl Severity {
    /// All levels, least severe first
    pub const ALL: [Severity; 5] = [
        Severity::Debug,
        Severity::Info,
        Severity::Warning,
        Severity::Error,
        Severity::Critical,
    ];

    /// Upper-case label used in rendered records
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Debug => "DEBUG",
            Severity::Info => "INFO",
            Severity::Warning => "WARNING",
            Severity::Error => "ERROR",
            Severity::Critical => "CRITICAL",
        }
    }

    /// Numeric value compatible with the Python logging module
    pub fn value(&self) -> u8 {
        *self as u8
    }

    /// Read a level from the environment, ignoring unset or unparseable values
    pub fn from_env(var: &str) -> Option<Severity> {
        std::env::var(var).ok().and_then(|v| v.parse().ok())
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Severity {
    type Err = LogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "DEBUG" | "10" => Ok(Severity::Debug),
            "INFO" | "20" => Ok(Severity::Info),
            "WARNING" | "WARN" | "30" => Ok(Severity::Warning),
            "ERROR" | "40" => Ok(Severity::Error),
            "CRITICAL" | "FATAL" | "50" => Ok(Severity::Critical),
            _ => Err(LogError::InvalidSeverity(s.to_string())),
        }
    }
}

impl TryFrom<String> for Severity {
    type Error = LogError;

    fn try_from(value: String) -> Result<Self, LogError> {
        value.parse()
    }
}

impl From<Severity> for String {
    fn from(level: Severity) -> Self {
        level.as_str().to_string()
    }
}
