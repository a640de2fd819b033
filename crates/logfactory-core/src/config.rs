//! YAML logger configuration
//!
//! ```yaml
//! defaults:
//!   level: INFO
//! loggers:
//!   - name: app
//!     destinations:
//!       - kind: console
//!       - kind: rotating_file
//!         path: logs/app.log
//!         max_bytes: 1000000
//!         backups: 5
//! ```
//!
//! `LOGFACTORY_LOG_LEVEL` overrides `defaults.level` when set.

use std::fs;
use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::destination::DestinationSpec;
use crate::error::{LogError, LogResult};
use crate::factory::LoggerFactory;
use crate::logger::{AttachPolicy, LoggerHandle};
use crate::registry::LoggerRegistry;
use crate::severity::{Severity, LOG_LEVEL_ENV};

/// Configuration file structure
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct LoggingConfig {
    /// Fallbacks for loggers that leave a field unset
    #[serde(default)]
    pub defaults: Option<DefaultSettings>,

    #[serde(default)]
    pub loggers: Vec<LoggerConfig>,
}

/// Default settings for every logger in the file
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct DefaultSettings {
    pub level: Option<Severity>,
    pub format: Option<String>,
}

/// One logger entry
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LoggerConfig {
    pub name: String,
    #[serde(default)]
    pub level: Option<Severity>,
    #[serde(default)]
    pub format: Option<String>,
    #[serde(default)]
    pub policy: AttachPolicy,
    pub destinations: Vec<DestinationSpec>,
}

impl LoggingConfig {
    /// Parse a YAML document
    pub fn from_yaml_str(content: &str) -> LogResult<Self> {
        serde_yaml::from_str(content)
            .map_err(|e| LogError::Config(format!("Failed to parse YAML: {}", e)))
    }

    /// Load from a file; a missing file is an empty configuration
    pub fn load(path: impl AsRef<Path>) -> LogResult<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path)?;
        Self::from_yaml_str(&content)
    }

    pub fn to_yaml(&self) -> LogResult<String> {
        serde_yaml::to_string(self)
            .map_err(|e| LogError::Config(format!("Failed to serialize YAML: {}", e)))
    }

    /// Write to a file, creating parent directories
    pub fn save(&self, path: impl AsRef<Path>) -> LogResult<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, self.to_yaml()?)?;
        Ok(())
    }

    /// Build every configured logger into `registry`, honoring
    /// `LOGFACTORY_LOG_LEVEL`
    pub fn apply(&self, registry: &LoggerRegistry) -> LogResult<Vec<Arc<LoggerHandle>>> {
        self.apply_with_env(registry, LOG_LEVEL_ENV)
    }

    fn apply_with_env(
        &self,
        registry: &LoggerRegistry,
        level_var: &str,
    ) -> LogResult<Vec<Arc<LoggerHandle>>> {
        self.apply_with_override(registry, Severity::from_env(level_var))
    }

    /// Build every configured logger, with `level_override` replacing the
    /// default level
    ///
    /// Loggers are built in file order; the first failure stops the rest.
    pub fn apply_with_override(
        &self,
        registry: &LoggerRegistry,
        level_override: Option<Severity>,
    ) -> LogResult<Vec<Arc<LoggerHandle>>> {
        let defaults = self.defaults.clone().unwrap_or_default();
        let default_level = level_override.or(defaults.level);

        self.loggers
            .iter()
            .map(|logger| {
                let format = logger.format.as_deref().or(defaults.format.as_deref());
                LoggerFactory::new(registry).with_policy(logger.policy).create(
                    &logger.name,
                    logger.destinations.iter().cloned(),
                    format,
                    logger.level.or(default_level),
                )
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::destination::StreamTarget;
    use crate::format::Callsite;
    use std::path::PathBuf;
    use tempfile::tempdir;

    const SAMPLE: &str = r#"
defaults:
  level: info
  format: "{level} {message}"
loggers:
  - name: app
    destinations:
      - kind: console
        stream: stderr
      - kind: file
        path: app.log
  - name: audit
    level: ERROR
    format: "{logger}: {message}"
    policy: append
    destinations:
      - kind: rotating_file
        path: audit.log
        max_bytes: 4096
"#;

    #[test]
    fn test_parse_sample() {
        let config = LoggingConfig::from_yaml_str(SAMPLE).unwrap();
        assert_eq!(config.loggers.len(), 2);

        let app = &config.loggers[0];
        assert_eq!(app.level, None);
        assert_eq!(app.policy, AttachPolicy::Replace);
        assert_eq!(
            app.destinations,
            vec![
                DestinationSpec::Console { stream: StreamTarget::Stderr },
                DestinationSpec::file("app.log"),
            ]
        );

        let audit = &config.loggers[1];
        assert_eq!(audit.level, Some(Severity::Error));
        assert_eq!(audit.policy, AttachPolicy::Append);
        assert_eq!(
            audit.destinations,
            vec![DestinationSpec::rotating("audit.log", 4096, 20)]
        );
    }

    #[test]
    fn test_parse_errors_are_config_errors() {
        let err = LoggingConfig::from_yaml_str("loggers: [{ name: x, destinations: [{ kind: pipe }] }]")
            .unwrap_err();
        assert!(matches!(err, LogError::Config(_)));
    }

    fn with_paths_in(config: &mut LoggingConfig, dir: &Path) {
        for logger in &mut config.loggers {
            for destination in &mut logger.destinations {
                match destination {
                    DestinationSpec::File { path } | DestinationSpec::RotatingFile { path, .. } => {
                        *path = dir.join(&*path);
                    }
                    DestinationSpec::Console { .. }
                    | DestinationSpec::Captured(_)
                    | DestinationSpec::Sink(_) => {}
                }
            }
        }
    }

    #[test]
    fn test_apply_builds_loggers() {
        let dir = tempdir().unwrap();
        let mut config = LoggingConfig::from_yaml_str(SAMPLE).unwrap();
        with_paths_in(&mut config, dir.path());

        let registry = LoggerRegistry::new();
        let handles = config.apply_with_override(&registry, None).unwrap();
        assert_eq!(handles.len(), 2);
        assert_eq!(registry.names(), vec!["app", "audit"]);

        let app = registry.get("app").unwrap();
        assert_eq!(app.level(), Severity::Info);
        assert_eq!(app.format().as_str(), "{level} {message}");
        assert_eq!(app.destination_count(), 2);

        let audit = registry.get("audit").unwrap();
        assert_eq!(audit.level(), Severity::Error);
        audit.emit(Severity::Error, "denied", &Callsite::caller()).unwrap();
        assert_eq!(
            fs::read_to_string(dir.path().join("audit.log")).unwrap(),
            "audit: denied\n"
        );
    }

    #[test]
    fn test_level_override_replaces_default_only() {
        let dir = tempdir().unwrap();
        let mut config = LoggingConfig::from_yaml_str(SAMPLE).unwrap();
        with_paths_in(&mut config, dir.path());

        let registry = LoggerRegistry::new();
        config
            .apply_with_override(&registry, Some(Severity::Debug))
            .unwrap();
        assert_eq!(registry.get("app").unwrap().level(), Severity::Debug);
        assert_eq!(registry.get("audit").unwrap().level(), Severity::Error);
    }

    #[test]
    fn test_env_level_reaches_apply() {
        const VAR: &str = "LOGFACTORY_TEST_LEVEL_APPLY";
        let dir = tempdir().unwrap();
        let mut config = LoggingConfig::from_yaml_str(SAMPLE).unwrap();
        with_paths_in(&mut config, dir.path());

        std::env::set_var(VAR, "critical");
        let registry = LoggerRegistry::new();
        config.apply_with_env(&registry, VAR).unwrap();
        assert_eq!(registry.get("app").unwrap().level(), Severity::Critical);
        assert_eq!(registry.get("audit").unwrap().level(), Severity::Error);

        std::env::set_var(VAR, "loud");
        let registry = LoggerRegistry::new();
        config.apply_with_env(&registry, VAR).unwrap();
        assert_eq!(registry.get("app").unwrap().level(), Severity::Info);
        std::env::remove_var(VAR);
    }

    #[test]
    fn test_severity_from_env() {
        std::env::set_var("LOGFACTORY_TEST_LEVEL_CONFIG", "warn");
        assert_eq!(Severity::from_env("LOGFACTORY_TEST_LEVEL_CONFIG"), Some(Severity::Warning));
        std::env::set_var("LOGFACTORY_TEST_LEVEL_CONFIG", "loud");
        assert_eq!(Severity::from_env("LOGFACTORY_TEST_LEVEL_CONFIG"), None);
        std::env::remove_var("LOGFACTORY_TEST_LEVEL_CONFIG");
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("logging.yaml");

        assert_eq!(LoggingConfig::load(&path).unwrap(), LoggingConfig::default());

        let config = LoggingConfig::from_yaml_str(SAMPLE).unwrap();
        config.save(&path).unwrap();
        assert_eq!(LoggingConfig::load(&path).unwrap(), config);

        let content = fs::read_to_string(&path).unwrap();
        assert!(content.contains("rotating_file"));
        assert!(content.contains(&PathBuf::from("audit.log").display().to_string()));
    }
}
