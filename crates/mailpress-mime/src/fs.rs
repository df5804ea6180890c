//! Filesystem access for attachments referenced by path.

use std::io;
use std::path::{Path, PathBuf};

/// Source of attachment bytes keyed by path.
///
/// Reads are whole-file and are not retried.
pub trait FileSource {
    /// Reads the full contents of `path`.
    ///
    /// # Errors
    ///
    /// Returns the underlying I/O error (missing file, permissions, ...).
    fn read(&self, path: &Path) -> io::Result<Vec<u8>>;
}

impl<F> FileSource for F
where
    F: Fn(&Path) -> io::Result<Vec<u8>>,
{
    fn read(&self, path: &Path) -> io::Result<Vec<u8>> {
        self(path)
    }
}

/// Blocking reads from the local filesystem.
///
/// Relative paths resolve against `root` when one is set, otherwise
/// against the process working directory.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LocalFiles {
    root: Option<PathBuf>,
}

impl LocalFiles {
    /// Reads paths as given.
    #[must_use]
    pub const fn new() -> Self {
        Self { root: None }
    }

    /// Resolves relative paths against `root`.
    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        Self {
            root: Some(root.into()),
        }
    }

    /// Returns the root directory, if any.
    #[must_use]
    pub fn root(&self) -> Option<&Path> {
        self.root.as_deref()
    }

    fn resolve(&self, path: &Path) -> PathBuf {
        match &self.root {
            Some(root) if path.is_relative() => root.join(path),
            _ => path.to_path_buf(),
        }
    }
}

impl FileSource for LocalFiles {
    fn read(&self, path: &Path) -> io::Result<Vec<u8>> {
        std::fs::read(self.resolve(path))
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::redundant_clone,
    clippy::manual_string_new,
    clippy::needless_collect,
    clippy::unreadable_literal,
    clippy::used_underscore_items,
    clippy::similar_names
)]
mod tests {
    use super::*;

    #[test]
    fn test_local_files_reads_absolute_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.bin");
        std::fs::write(&path, [1u8, 2, 3]).unwrap();

        assert_eq!(LocalFiles::new().read(&path).unwrap(), vec![1, 2, 3]);
    }

    #[test]
    fn test_local_files_root_resolves_relative() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("note.txt"), "hello").unwrap();

        let files = LocalFiles::with_root(dir.path());
        assert_eq!(files.root(), Some(dir.path()));
        assert_eq!(files.read(Path::new("note.txt")).unwrap(), b"hello");
    }

    #[test]
    fn test_local_files_missing() {
        let dir = tempfile::tempdir().unwrap();
        let err = LocalFiles::with_root(dir.path())
            .read(Path::new("absent.txt"))
            .unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }

    #[test]
    fn test_closure_source() {
        let source = |path: &Path| -> io::Result<Vec<u8>> {
            Ok(path.to_string_lossy().into_owned().into_bytes())
        };
        assert_eq!(source.read(Path::new("x")).unwrap(), b"x");
    }
}
