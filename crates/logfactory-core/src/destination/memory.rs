//! In-memory capture buffer

use std::sync::Arc;

use parking_lot::Mutex;

/// Shared byte buffer that a console destination can write into instead of a
/// process stream
///
/// Clones share the same storage, so a test or UI keeps one clone and hands
/// another to the logger.
///
/// # Example
///
/// ```
/// use logfactory_core::{DestinationSpec, MemoryBuffer};
///
/// let buffer = MemoryBuffer::new();
/// let spec = DestinationSpec::captured(buffer.clone());
/// assert!(buffer.is_empty());
/// # let _ = spec;
/// ```
#[derive(Debug, Clone, Default)]
pub struct MemoryBuffer {
    bytes: Arc<Mutex<Vec<u8>>>,
}

impl MemoryBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append raw bytes
    pub fn append(&self, data: &[u8]) {
        self.bytes.lock().extend_from_slice(data);
    }

    /// Everything written so far, lossily decoded
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.bytes.lock()).into_owned()
    }

    /// Written lines, without their terminators
    pub fn lines(&self) -> Vec<String> {
        self.contents().lines().map(str::to_string).collect()
    }

    pub fn len(&self) -> usize {
        self.bytes.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        self.bytes.lock().clear();
    }

    /// Whether both handles share the same storage
    pub fn same_buffer(&self, other: &MemoryBuffer) -> bool {
        Arc::ptr_eq(&self.bytes, &other.bytes)
    }
}

impl PartialEq for MemoryBuffer {
    fn eq(&self, other: &Self) -> bool {
        self.same_buffer(other)
    }
}
