//! Size-rotated file destination
//!
//! Layout on disk for `out.log` with three backups:
//!
//! ```text
//! out.log      active file
//! out.log.1    most recent backup
//! out.log.2
//! out.log.3    oldest backup, discarded on the next rollover
//! ```

use std::ffi::OsString;
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use parking_lot::Mutex;

use super::file::open_append;
use crate::diagnostics::{diag_debug, diag_warn};
use crate::error::LogResult;

/// Default size bound of the active file, in bytes
pub const DEFAULT_MAX_LOG_BYTES: u64 = 2_000_000;

/// Default number of backups kept next to the active file
pub const DEFAULT_MAX_LOG_BACKUP_FILES: u32 = 20;

#[derive(Debug)]
struct ActiveFile {
    /// `None` after a failed reopen; the next write retries
    file: Option<File>,
    size: u64,
}

/// Appends lines to a file and rolls it into numbered backups when the next
/// line would push it past `max_bytes`
///
/// A zero `max_bytes` or zero `backups` disables rotation and the file grows
/// like a plain file destination.
#[derive(Debug)]
pub struct RotatingFileDestination {
    path: PathBuf,
    max_bytes: u64,
    backups: u32,
    active: Mutex<ActiveFile>,
}

impl RotatingFileDestination {
    /// # Errors
    /// `LogError::InvalidDestination` when the active file cannot be opened.
    pub fn open(path: impl Into<PathBuf>, max_bytes: u64, backups: u32) -> LogResult<Self> {
        let path = path.into();
        let file = open_append(&path)?;
        let size = file.metadata().map(|m| m.len()).unwrap_or(0);
        Ok(Self {
            path,
            max_bytes,
            backups,
            active: Mutex::new(ActiveFile {
                file: Some(file),
                size,
            }),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn max_bytes(&self) -> u64 {
        self.max_bytes
    }

    pub fn backups(&self) -> u32 {
        self.backups
    }

    /// Path of backup generation `index` (1 is the newest)
    pub fn backup_path(&self, index: u32) -> PathBuf {
        backup_path(&self.path, index)
    }

    /// Write one already-terminated line, rolling over first if needed
    pub fn write_line(&self, line: &str) -> io::Result<()> {
        let mut active = self.active.lock();
        let len = line.len() as u64;

        if self.should_rollover(active.size, len) {
            active.file = None;
            self.rollover()?;
            active.size = 0;
        }

        if active.file.is_none() {
            let file = OpenOptions::new().create(true).append(true).open(&self.path)?;
            active.size = file.metadata().map(|m| m.len()).unwrap_or(0);
            active.file = Some(file);
        }

        if let Some(file) = active.file.as_mut() {
            file.write_all(line.as_bytes())?;
            file.flush()?;
        }
        active.size += len;
        Ok(())
    }

    fn should_rollover(&self, current: u64, incoming: u64) -> bool {
        self.max_bytes > 0 && self.backups > 0 && current > 0 && current + incoming > self.max_bytes
    }

    /// Shift `path.N-1 -> path.N`, ..., `path -> path.1`
    ///
    /// The caller must have dropped its handle to the active file.
    fn rollover(&self) -> io::Result<()> {
        for index in (1..self.backups).rev() {
            let src = backup_path(&self.path, index);
            if src.exists() {
                let dst = backup_path(&self.path, index + 1);
                remove_if_exists(&dst)?;
                fs::rename(&src, &dst)?;
            }
        }

        let first = backup_path(&self.path, 1);
        remove_if_exists(&first)?;
        if self.path.exists() {
            fs::rename(&self.path, &first).map_err(|e| {
                diag_warn!("rollover of {} failed: {}", self.path.display(), e);
                e
            })?;
        }

        diag_debug!(
            "rolled {} over ({} bytes max, {} backups)",
            self.path.display(),
            self.max_bytes,
            self.backups
        );
        Ok(())
    }

    pub fn describe(&self) -> String {
        format!("rotating:{}", self.path.display())
    }
}

fn backup_path(base: &Path, index: u32) -> PathBuf {
    let mut name = OsString::from(base.as_os_str());
    name.push(format!(".{index}"));
    PathBuf::from(name)
}

fn remove_if_exists(path: &Path) -> io::Result<()> {
    match fs::remove_file(path) {
        Err(e) if e.kind() != io::ErrorKind::NotFound => Err(e),
        _ => Ok(()),
    }
}
