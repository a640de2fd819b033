//! Plain append-only file destination

use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use parking_lot::Mutex;

use crate::error::{LogError, LogResult};

/// Open `path` for appending, creating it if absent
pub(crate) fn open_append(path: &Path) -> LogResult<File> {
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|e| LogError::invalid_destination(path, e))
}

/// Appends lines to a file that grows without bound
///
/// The file is opened (and created) when the destination is built and stays
/// open until the destination is dropped.
#[derive(Debug)]
pub struct FileDestination {
    path: PathBuf,
    file: Mutex<File>,
}

impl FileDestination {
    /// # Errors
    /// `LogError::InvalidDestination` when the file cannot be opened for append.
    pub fn open(path: impl Into<PathBuf>) -> LogResult<Self> {
        let path = path.into();
        let file = open_append(&path)?;
        Ok(Self {
            path,
            file: Mutex::new(file),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write one already-terminated line
    pub fn write_line(&self, line: &str) -> io::Result<()> {
        let mut file = self.file.lock();
        file.write_all(line.as_bytes())?;
        file.flush()
    }

    pub fn describe(&self) -> String {
        format!("file:{}", self.path.display())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_creates_and_appends() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("execution.log");
        fs::write(&path, "existing\n").unwrap();

        let dest = FileDestination::open(&path).unwrap();
        dest.write_line("appended\n").unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "existing\nappended\n");
        assert_eq!(dest.path(), path.as_path());
    }

    #[test]
    fn test_file_exists_before_first_write() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("fresh.log");
        let _dest = FileDestination::open(&path).unwrap();
        assert!(path.exists());
        assert_eq!(fs::metadata(&path).unwrap().len(), 0);
    }

    #[test]
    fn test_missing_directory_is_invalid_destination() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("missing").join("app.log");
        let err = FileDestination::open(&path).unwrap_err();
        assert!(matches!(err, LogError::InvalidDestination { path: p, .. } if p == path));
    }
}
