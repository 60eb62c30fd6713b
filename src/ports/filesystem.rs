//! Filesystem port for file I/O operations.

use std::path::{Path, PathBuf};

/// Result type shared by every filesystem port method.
pub type FsResult<T> = Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// Provides filesystem access for reading input trees and writing artifacts.
///
/// Abstracting the filesystem lets the loader and scanner run against an
/// in-memory tree in tests without touching the real disk.
pub trait FileSystem: Send + Sync {
    /// Reads the raw bytes of a file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file does not exist or cannot be read.
    fn read(&self, path: &Path) -> FsResult<Vec<u8>>;

    /// Reads the entire contents of a file as a UTF-8 string.
    ///
    /// # Errors
    ///
    /// Returns an error if the file does not exist or is not valid UTF-8.
    fn read_to_string(&self, path: &Path) -> FsResult<String> {
        let bytes = self.read(path)?;
        Ok(String::from_utf8(bytes)?)
    }

    /// Writes the given contents to a file, creating parent directories and
    /// overwriting any existing file.
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails (permissions, disk full, etc.).
    fn write(&self, path: &Path, contents: &str) -> FsResult<()>;

    /// Atomically replaces `to` with `from`.
    ///
    /// # Errors
    ///
    /// Returns an error if `from` does not exist or the rename fails.
    fn rename(&self, from: &Path, to: &Path) -> FsResult<()>;

    /// Returns `true` if the path exists on the filesystem.
    fn exists(&self, path: &Path) -> bool;

    /// Returns `true` if the path exists and is a directory.
    fn is_dir(&self, path: &Path) -> bool;

    /// Recursively lists every regular file under `root`, sorted by path.
    ///
    /// Directories whose name appears in `skip_dirs` are not descended into.
    ///
    /// # Errors
    ///
    /// Returns an error if `root` cannot be read as a directory.
    fn walk_files(&self, root: &Path, skip_dirs: &[String]) -> FsResult<Vec<PathBuf>>;
}
