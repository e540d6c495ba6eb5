//! Filesystem access used by every stage.
//!
//! Stages never touch `std::fs` directly; they go through [`FileStore`] so
//! tests can swap in [`MemoryFileStore`].

use std::collections::{BTreeMap, BTreeSet};
use std::io;
use std::path::{Component, Path, PathBuf};
use std::sync::{Mutex, PoisonError};

/// Minimal file access needed by the scanner, recorders and rewriters.
pub trait FileStore: Send + Sync {
    fn read_to_string(&self, path: &Path) -> io::Result<String>;

    /// Replace the file content as a whole. Parent directories are created.
    fn write_atomic(&self, path: &Path, contents: &str) -> io::Result<()>;

    fn exists(&self, path: &Path) -> bool;

    /// Names of the directories directly under `path`, sorted.
    fn list_dirs(&self, path: &Path) -> io::Result<Vec<String>>;

    /// Regular files directly under `path` with their sizes in bytes,
    /// sorted by name.
    fn list_files(&self, path: &Path) -> io::Result<Vec<(String, u64)>>;

    fn create_dir_all(&self, path: &Path) -> io::Result<()>;

    /// Remove a directory and everything beneath it.
    fn remove_dir_all(&self, path: &Path) -> io::Result<()>;
}

/// [`FileStore`] backed by the real filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct OsFileStore;

impl FileStore for OsFileStore {
    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        std::fs::read_to_string(path)
    }

    /// Writes to a sibling tmp file and renames it over the target.
    fn write_atomic(&self, path: &Path, contents: &str) -> io::Result<()> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }

        let file_name = path
            .file_name()
            .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "path has no file name"))?;
        let tmp_path = path.with_file_name(format!(
            ".{}.tmp.{}",
            file_name.to_string_lossy(),
            std::process::id()
        ));

        std::fs::write(&tmp_path, contents)?;
        if let Err(err) = std::fs::rename(&tmp_path, path) {
            let _ = std::fs::remove_file(&tmp_path);
            return Err(err);
        }
        Ok(())
    }

    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn list_dirs(&self, path: &Path) -> io::Result<Vec<String>> {
        let mut names = Vec::new();
        for entry in std::fs::read_dir(path)? {
            let entry = entry?;
            if entry.file_type()?.is_dir() {
                names.push(entry.file_name().to_string_lossy().into_owned());
            }
        }
        names.sort();
        Ok(names)
    }

    fn list_files(&self, path: &Path) -> io::Result<Vec<(String, u64)>> {
        let mut files = Vec::new();
        for entry in std::fs::read_dir(path)? {
            let entry = entry?;
            let metadata = entry.metadata()?;
            if metadata.is_file() {
                files.push((entry.file_name().to_string_lossy().into_owned(), metadata.len()));
            }
        }
        files.sort();
        Ok(files)
    }

    fn create_dir_all(&self, path: &Path) -> io::Result<()> {
        std::fs::create_dir_all(path)
    }

    fn remove_dir_all(&self, path: &Path) -> io::Result<()> {
        std::fs::remove_dir_all(path)
    }
}

/// In-memory [`FileStore`] for isolated tests.
///
/// Directories are implied by the files stored beneath them, or added
/// explicitly with [`MemoryFileStore::add_dir`].
#[derive(Debug, Default)]
pub struct MemoryFileStore {
    files: Mutex<BTreeMap<PathBuf, String>>,
    dirs: Mutex<BTreeSet<PathBuf>>,
    read_only: bool,
}

impl MemoryFileStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store whose writes always fail with `PermissionDenied`.
    pub fn read_only() -> Self {
        Self {
            read_only: true,
            ..Self::default()
        }
    }

    pub fn with_file(self, path: impl Into<PathBuf>, contents: impl Into<String>) -> Self {
        self.insert(path.into(), contents.into());
        self
    }

    pub fn add_dir(&self, path: impl Into<PathBuf>) {
        let path = normalize(&path.into());
        let mut dirs = self.dirs.lock().unwrap_or_else(PoisonError::into_inner);
        for ancestor in path.ancestors() {
            if !ancestor.as_os_str().is_empty() {
                dirs.insert(ancestor.to_path_buf());
            }
        }
    }

    /// Current content of a file, if any.
    pub fn get(&self, path: &Path) -> Option<String> {
        self.files
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&normalize(path))
            .cloned()
    }

    fn check_writable(&self, path: &Path) -> io::Result<()> {
        if self.read_only {
            return Err(io::Error::new(
                io::ErrorKind::PermissionDenied,
                format!("{} is read-only", path.display()),
            ));
        }
        Ok(())
    }

    fn insert(&self, path: PathBuf, contents: String) {
        let path = normalize(&path);
        if let Some(parent) = path.parent() {
            self.add_dir(parent.to_path_buf());
        }
        self.files
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(path, contents);
    }
}

impl FileStore for MemoryFileStore {
    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        self.get(path).ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::NotFound,
                format!("{} not found", path.display()),
            )
        })
    }

    fn write_atomic(&self, path: &Path, contents: &str) -> io::Result<()> {
        self.check_writable(path)?;
        self.insert(path.to_path_buf(), contents.to_string());
        Ok(())
    }

    fn exists(&self, path: &Path) -> bool {
        let path = normalize(path);
        self.files
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(&path)
            || self
                .dirs
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .contains(&path)
    }

    fn list_dirs(&self, path: &Path) -> io::Result<Vec<String>> {
        let path = normalize(path);
        let dirs = self.dirs.lock().unwrap_or_else(PoisonError::into_inner);
        if !dirs.contains(&path) {
            return Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("{} not found", path.display()),
            ));
        }
        Ok(dirs
            .iter()
            .filter(|dir| dir.parent() == Some(path.as_path()))
            .filter_map(|dir| dir.file_name())
            .map(|name| name.to_string_lossy().into_owned())
            .collect())
    }

    fn list_files(&self, path: &Path) -> io::Result<Vec<(String, u64)>> {
        let path = normalize(path);
        if !self.exists(&path) {
            return Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("{} not found", path.display()),
            ));
        }
        Ok(self
            .files
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|(file, _)| file.parent() == Some(path.as_path()))
            .filter_map(|(file, contents)| {
                let name = file.file_name()?.to_string_lossy().into_owned();
                Some((name, contents.len() as u64))
            })
            .collect())
    }

    fn create_dir_all(&self, path: &Path) -> io::Result<()> {
        self.check_writable(path)?;
        self.add_dir(path.to_path_buf());
        Ok(())
    }

    fn remove_dir_all(&self, path: &Path) -> io::Result<()> {
        self.check_writable(path)?;
        let path = normalize(path);
        {
            let mut dirs = self.dirs.lock().unwrap_or_else(PoisonError::into_inner);
            if !dirs.contains(&path) {
                return Err(io::Error::new(
                    io::ErrorKind::NotFound,
                    format!("{} not found", path.display()),
                ));
            }
            dirs.retain(|dir| !dir.starts_with(&path));
        }
        self.files
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .retain(|file, _| !file.starts_with(&path));
        Ok(())
    }
}

// Drops `.` components so `root/./packages` and `root/packages` match.
fn normalize(path: &Path) -> PathBuf {
    path.components()
        .filter(|c| !matches!(c, Component::CurDir))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_store_lists_implied_directories() {
        let store = MemoryFileStore::new()
            .with_file("/ws/packages/b/package.json", "{}")
            .with_file("/ws/packages/a/package.json", "{}");
        store.add_dir("/ws/packages/empty");

        let dirs = store.list_dirs(Path::new("/ws/packages")).unwrap();

        assert_eq!(dirs, vec!["a", "b", "empty"]);
    }

    #[test]
    fn memory_store_lists_files_and_removes_trees() {
        let store = MemoryFileStore::new()
            .with_file("/ws/out/b.tgz", "bb")
            .with_file("/ws/out/a.tgz", "a")
            .with_file("/ws/out/nested/c.tgz", "c");

        let files = store.list_files(Path::new("/ws/out")).unwrap();
        assert_eq!(files, vec![("a.tgz".to_string(), 1), ("b.tgz".to_string(), 2)]);

        store.remove_dir_all(Path::new("/ws/out")).unwrap();
        assert!(!store.exists(Path::new("/ws/out")));
        assert!(!store.exists(Path::new("/ws/out/nested/c.tgz")));
        assert!(store.exists(Path::new("/ws")));
    }

    #[test]
    fn os_store_lists_only_files() {
        let temp = tempfile::TempDir::new().unwrap();
        std::fs::write(temp.path().join("pkg-1.0.0.tgz"), vec![0u8; 2048]).unwrap();
        OsFileStore.create_dir_all(&temp.path().join("sub/dir")).unwrap();

        let files = OsFileStore.list_files(temp.path()).unwrap();

        assert_eq!(files, vec![("pkg-1.0.0.tgz".to_string(), 2048)]);
        OsFileStore.remove_dir_all(&temp.path().join("sub")).unwrap();
        assert!(!temp.path().join("sub").exists());
    }

    #[test]
    fn memory_store_read_only_rejects_writes() {
        let store = MemoryFileStore::read_only();
        let err = store
            .write_atomic(Path::new("/ws/status.json"), "{}")
            .unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::PermissionDenied);
    }

    #[test]
    fn os_store_write_replaces_content() {
        let temp = tempfile::TempDir::new().unwrap();
        let target = temp.path().join("nested").join("out.json");

        OsFileStore.write_atomic(&target, "first").unwrap();
        OsFileStore.write_atomic(&target, "second").unwrap();

        assert_eq!(std::fs::read_to_string(&target).unwrap(), "second");
        let leftovers: Vec<_> = std::fs::read_dir(target.parent().unwrap())
            .unwrap()
            .filter_map(Result::ok)
            .filter(|e| e.file_name().to_string_lossy().contains(".tmp."))
            .collect();
        assert!(leftovers.is_empty());
    }
}
