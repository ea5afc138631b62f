//! Serialized file access for the shared performance log
//!
//! The log is shared mutable state across every test instance in a process
//! (and, via the filesystem, across worker processes). A process-wide
//! registry hands out one mutex per distinct path; every read or write
//! holds that mutex for the whole operation, so writes never interleave
//! mid-line and queued operations run one at a time.

use std::collections::HashMap;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, OnceLock, PoisonError};
use thiserror::Error;

/// Fallback directory name when none is configured or the configured one
/// is not a legal path
pub const DEFAULT_RESULTS_DIR: &str = "performance-results";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("i/o error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl StoreError {
    fn io(path: &Path, source: std::io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// One mutex per distinct path, shared process-wide. Entries are never
/// removed; the set of distinct log paths in a run is tiny.
fn path_lock(path: &Path) -> Arc<Mutex<()>> {
    static LOCKS: OnceLock<Mutex<HashMap<PathBuf, Arc<Mutex<()>>>>> = OnceLock::new();
    let registry = LOCKS.get_or_init(|| Mutex::new(HashMap::new()));
    let mut map = registry.lock().unwrap_or_else(PoisonError::into_inner);
    map.entry(path.to_path_buf()).or_default().clone()
}

/// Append-only access to the durable log and summary files, serialized
/// per path
#[derive(Debug, Default, Clone, Copy)]
pub struct LogStore;

impl LogStore {
    pub fn new() -> Self {
        Self
    }

    /// Append one line (a newline is added) to the file, creating it if
    /// missing. Holds the path lock for the whole write.
    pub fn append_line(&self, path: &Path, line: &str) -> Result<(), StoreError> {
        let lock = path_lock(path);
        let _guard = lock.lock().unwrap_or_else(PoisonError::into_inner);

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(|e| StoreError::io(path, e))?;
        file.write_all(line.as_bytes())
            .map_err(|e| StoreError::io(path, e))?;
        file.write_all(b"\n").map_err(|e| StoreError::io(path, e))?;
        Ok(())
    }

    /// Replace the file contents, creating it if missing
    pub fn write(&self, path: &Path, contents: &str) -> Result<(), StoreError> {
        let lock = path_lock(path);
        let _guard = lock.lock().unwrap_or_else(PoisonError::into_inner);

        fs::write(path, contents).map_err(|e| StoreError::io(path, e))
    }

    /// Read the whole file and split it into lines
    pub fn read_lines(&self, path: &Path) -> Result<Vec<String>, StoreError> {
        let lock = path_lock(path);
        let _guard = lock.lock().unwrap_or_else(PoisonError::into_inner);

        let data = fs::read_to_string(path).map_err(|e| StoreError::io(path, e))?;
        Ok(data.lines().map(str::to_string).collect())
    }
}

/// Resolve the results directory from an optional configured name and
/// create it if missing.
///
/// A configured name containing `* " [ ] : ; | ,` is not a legal results
/// path; it is ignored in favor of [`DEFAULT_RESULTS_DIR`]. Relative names
/// resolve against the current directory.
pub fn ensure_results_dir(configured: Option<&str>) -> Result<PathBuf, StoreError> {
    let name = match configured {
        Some(dir) if !dir.is_empty() && !has_illegal_chars(dir) => dir,
        _ => DEFAULT_RESULTS_DIR,
    };

    let dir = PathBuf::from(name);
    fs::create_dir_all(&dir).map_err(|e| StoreError::io(&dir, e))?;
    Ok(dir)
}

fn has_illegal_chars(path: &str) -> bool {
    path.chars()
        .any(|c| matches!(c, '*' | '"' | '[' | ']' | ':' | ';' | '|' | ','))
}
