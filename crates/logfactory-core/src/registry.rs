//! Registry mapping logger names to handles

use std::collections::HashMap;
use std::sync::Arc;

use once_cell::sync::Lazy;
use parking_lot::RwLock;

use crate::diagnostics::diag_debug;
use crate::logger::LoggerHandle;

/// Process-wide registry used by the free factory functions
static GLOBAL: Lazy<LoggerRegistry> = Lazy::new(LoggerRegistry::new);

/// Name → handle map
///
/// A registry starts empty and never drops handles on its own; call
/// [`remove`](Self::remove) to tear one down. Most code should pass a
/// registry explicitly; [`LoggerRegistry::global`] exists for call sites that
/// cannot.
///
/// # Example
///
/// ```
/// use logfactory_core::LoggerRegistry;
/// use std::sync::Arc;
///
/// let registry = LoggerRegistry::new();
/// let a = registry.get_or_create("worker");
/// let b = registry.get_or_create("worker");
/// assert!(Arc::ptr_eq(&a, &b));
/// ```
#[derive(Debug, Default)]
pub struct LoggerRegistry {
    loggers: RwLock<HashMap<String, Arc<LoggerHandle>>>,
}

impl LoggerRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// The process-wide registry
    pub fn global() -> &'static LoggerRegistry {
        &GLOBAL
    }

    /// Return the handle registered under `name`, creating it if absent
    ///
    /// Creation happens under the write lock, so concurrent first use of one
    /// name always yields the same handle.
    pub fn get_or_create(&self, name: &str) -> Arc<LoggerHandle> {
        if let Some(handle) = self.loggers.read().get(name) {
            return Arc::clone(handle);
        }

        let mut loggers = self.loggers.write();
        Arc::clone(loggers.entry(name.to_string()).or_insert_with(|| {
            diag_debug!("registered logger {:?}", name);
            Arc::new(LoggerHandle::new(name))
        }))
    }

    /// Apply `configure` to the handle for `name` under the registry write lock
    ///
    /// A new handle is configured before it is inserted, so no other thread
    /// can observe it half set up. An existing handle is reconfigured in
    /// place while lookups of that name wait.
    pub fn configure_or_insert<F>(&self, name: &str, configure: F) -> Arc<LoggerHandle>
    where
        F: FnOnce(&LoggerHandle),
    {
        let mut loggers = self.loggers.write();
        if let Some(handle) = loggers.get(name) {
            configure(handle);
            return Arc::clone(handle);
        }

        let handle = Arc::new(LoggerHandle::new(name));
        configure(&handle);
        loggers.insert(name.to_string(), Arc::clone(&handle));
        diag_debug!("registered logger {:?}", name);
        handle
    }

    pub fn get(&self, name: &str) -> Option<Arc<LoggerHandle>> {
        self.loggers.read().get(name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.loggers.read().contains_key(name)
    }

    /// Registered names, sorted
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<_> = self.loggers.read().keys().cloned().collect();
        names.sort();
        names
    }

    pub fn len(&self) -> usize {
        self.loggers.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Unregister a logger
    ///
    /// Its destinations stay open while other clones of the handle are alive.
    pub fn remove(&self, name: &str) -> Option<Arc<LoggerHandle>> {
        let removed = self.loggers.write().remove(name);
        if removed.is_some() {
            diag_debug!("removed logger {:?}", name);
        }
        removed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::severity::Severity;
    use std::sync::Barrier;
    use std::thread;

    #[test]
    fn test_starts_empty() {
        let registry = LoggerRegistry::new();
        assert!(registry.is_empty());
        assert!(registry.get("anything").is_none());
    }

    #[test]
    fn test_get_or_create_returns_same_handle() {
        let registry = LoggerRegistry::new();
        let first = registry.get_or_create("app");
        let second = registry.get_or_create("app");
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(registry.len(), 1);
        assert_eq!(first.name(), "app");
    }

    #[test]
    fn test_names_and_remove() {
        let registry = LoggerRegistry::new();
        registry.get_or_create("b");
        registry.get_or_create("a");
        assert_eq!(registry.names(), vec!["a", "b"]);

        let removed = registry.remove("a").unwrap();
        assert_eq!(removed.name(), "a");
        assert!(!registry.contains("a"));
        assert!(registry.remove("a").is_none());

        // Re-creating after removal yields a fresh handle
        let recreated = registry.get_or_create("a");
        assert!(!Arc::ptr_eq(&removed, &recreated));
    }

    #[test]
    fn test_concurrent_first_use_yields_one_handle() {
        let registry = Arc::new(LoggerRegistry::new());
        let barrier = Arc::new(Barrier::new(16));

        let workers: Vec<_> = (0..16)
            .map(|_| {
                let registry = Arc::clone(&registry);
                let barrier = Arc::clone(&barrier);
                thread::spawn(move || {
                    barrier.wait();
                    registry.get_or_create("contended")
                })
            })
            .collect();

        let handles: Vec<_> = workers.into_iter().map(|w| w.join().unwrap()).collect();
        assert!(handles.iter().all(|h| Arc::ptr_eq(h, &handles[0])));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_configure_or_insert_runs_before_publishing() {
        let registry = LoggerRegistry::new();
        let created = registry.configure_or_insert("fresh", |handle| {
            assert_eq!(handle.name(), "fresh");
            handle.set_level(Severity::Error);
        });
        assert_eq!(created.level(), Severity::Error);

        let again = registry.configure_or_insert("fresh", |handle| handle.set_level(Severity::Info));
        assert!(Arc::ptr_eq(&created, &again));
        assert_eq!(created.level(), Severity::Info);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_global_is_shared() {
        let a = LoggerRegistry::global().get_or_create("registry_test_global");
        let b = LoggerRegistry::global().get("registry_test_global").unwrap();
        assert!(Arc::ptr_eq(&a, &b));
        LoggerRegistry::global().remove("registry_test_global");
    }
}
