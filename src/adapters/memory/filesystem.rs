//! In-memory filesystem keyed by absolute path.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::ports::filesystem::{FileSystem, FsResult};

/// Filesystem that keeps every file in a sorted map.
///
/// Directories exist implicitly: a path is a directory when some file lives
/// beneath it.
#[derive(Debug, Default)]
pub struct MemoryFileSystem {
    files: Mutex<BTreeMap<PathBuf, Vec<u8>>>,
}

impl MemoryFileSystem {
    /// Creates an empty filesystem.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a file and returns the filesystem, for fluent setup.
    #[must_use]
    pub fn with_file(self, path: impl AsRef<Path>, contents: impl AsRef<[u8]>) -> Self {
        self.insert(path, contents);
        self
    }

    /// Adds or replaces a file.
    pub fn insert(&self, path: impl AsRef<Path>, contents: impl AsRef<[u8]>) {
        self.lock().insert(path.as_ref().to_path_buf(), contents.as_ref().to_vec());
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, BTreeMap<PathBuf, Vec<u8>>> {
        // A panic while holding the lock leaves the map intact.
        self.files.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

impl FileSystem for MemoryFileSystem {
    fn read(&self, path: &Path) -> FsResult<Vec<u8>> {
        self.lock()
            .get(path)
            .cloned()
            .ok_or_else(|| format!("File not found: {}", path.display()).into())
    }

    fn write(&self, path: &Path, contents: &str) -> FsResult<()> {
        self.insert(path, contents);
        Ok(())
    }

    fn rename(&self, from: &Path, to: &Path) -> FsResult<()> {
        let mut files = self.lock();
        let contents =
            files.remove(from).ok_or_else(|| format!("File not found: {}", from.display()))?;
        files.insert(to.to_path_buf(), contents);
        Ok(())
    }

    fn exists(&self, path: &Path) -> bool {
        let is_file = self.lock().contains_key(path);
        is_file || self.is_dir(path)
    }

    fn is_dir(&self, path: &Path) -> bool {
        self.lock().keys().any(|k| k.starts_with(path) && k != path)
    }

    fn walk_files(&self, root: &Path, skip_dirs: &[String]) -> FsResult<Vec<PathBuf>> {
        if !self.is_dir(root) {
            return Err(format!("Not a directory: {}", root.display()).into());
        }
        let files = self
            .lock()
            .keys()
            .filter(|k| {
                let Ok(rel) = k.strip_prefix(root) else {
                    return false;
                };
                // Every component but the file name itself is a directory.
                let dirs = rel.parent().map(Path::components).into_iter().flatten();
                !dirs
                    .map(|c| c.as_os_str().to_string_lossy())
                    .any(|name| skip_dirs.iter().any(|skip| *skip == name))
            })
            .cloned()
            .collect();
        Ok(files)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> MemoryFileSystem {
        MemoryFileSystem::new()
            .with_file("/repo/reqs/MON-001.yml", "uid: MON-001\n")
            .with_file("/repo/tests/test_a.py", "# test\n")
            .with_file("/repo/tests/.venv/lib.py", "# vendored\n")
    }

    #[test]
    fn directories_exist_implicitly() {
        let fs = sample();
        assert!(fs.is_dir(Path::new("/repo/reqs")));
        assert!(fs.exists(Path::new("/repo/reqs/MON-001.yml")));
        assert!(!fs.is_dir(Path::new("/repo/reqs/MON-001.yml")));
        assert!(!fs.exists(Path::new("/repo/docs")));
    }

    #[test]
    fn walk_files_honours_skip_dirs() {
        let fs = sample();
        let files = fs.walk_files(Path::new("/repo/tests"), &[".venv".to_string()]).unwrap();
        assert_eq!(files, vec![PathBuf::from("/repo/tests/test_a.py")]);
    }

    #[test]
    fn rename_moves_contents() {
        let fs = sample();
        fs.write(Path::new("/out/r.json.tmp"), "{}").unwrap();
        fs.rename(Path::new("/out/r.json.tmp"), Path::new("/out/r.json")).unwrap();
        assert!(!fs.exists(Path::new("/out/r.json.tmp")));
        assert_eq!(fs.read_to_string(Path::new("/out/r.json")).unwrap(), "{}");
    }

    #[test]
    fn read_to_string_rejects_invalid_utf8() {
        let fs = MemoryFileSystem::new().with_file("/bin.dat", [0xff, 0xfe, 0x00]);
        assert!(fs.read(Path::new("/bin.dat")).is_ok());
        assert!(fs.read_to_string(Path::new("/bin.dat")).is_err());
    }
}
