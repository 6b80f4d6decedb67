//! In-memory filesystem adapter for testing and dry runs.

use std::{
    collections::{BTreeMap, HashSet},
    path::{Path, PathBuf},
    sync::{Arc, RwLock},
};

use stencil_core::{
    application::{ApplicationError, ports::Filesystem},
    domain::FileMode,
    error::StencilResult,
};

/// In-memory filesystem. Clones share the same storage.
#[derive(Debug, Clone, Default)]
pub struct MemoryFilesystem {
    inner: Arc<RwLock<MemoryFilesystemInner>>,
}

#[derive(Debug, Default)]
struct MemoryFilesystemInner {
    files: BTreeMap<PathBuf, MemoryFile>,
    directories: HashSet<PathBuf>,
}

#[derive(Debug, Clone)]
struct MemoryFile {
    content: Vec<u8>,
    mode: FileMode,
}

impl MemoryFilesystem {
    /// Create a new empty memory filesystem.
    pub fn new() -> Self {
        Self::default()
    }

    /// Read a file's bytes (testing helper).
    pub fn read_file(&self, path: &Path) -> Option<Vec<u8>> {
        let inner = self.inner.read().ok()?;
        inner.files.get(path).map(|f| f.content.clone())
    }

    /// Read a file as UTF-8 (testing helper).
    pub fn read_to_string(&self, path: &Path) -> Option<String> {
        self.read_file(path).and_then(|bytes| String::from_utf8(bytes).ok())
    }

    /// File mode, if the file exists.
    pub fn mode(&self, path: &Path) -> Option<FileMode> {
        let inner = self.inner.read().ok()?;
        inner.files.get(path).map(|f| f.mode)
    }

    /// All files, sorted.
    pub fn list_files(&self) -> Vec<PathBuf> {
        self.inner
            .read()
            .map(|inner| inner.files.keys().cloned().collect())
            .unwrap_or_default()
    }

    /// Clear all contents.
    pub fn clear(&self) {
        if let Ok(mut inner) = self.inner.write() {
            inner.files.clear();
            inner.directories.clear();
        }
    }
}

impl Filesystem for MemoryFilesystem {
    fn create_dir_all(&self, path: &Path) -> StencilResult<()> {
        let mut inner = self
            .inner
            .write()
            .map_err(|_| ApplicationError::LockPoisoned)?;

        let mut current = PathBuf::new();
        for component in path.components() {
            current.push(component);
            inner.directories.insert(current.clone());
        }

        Ok(())
    }

    fn write_file(&self, path: &Path, content: &[u8]) -> StencilResult<()> {
        let mut inner = self
            .inner
            .write()
            .map_err(|_| ApplicationError::LockPoisoned)?;

        // Ensure parent exists
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !inner.directories.contains(parent) {
                return Err(ApplicationError::FilesystemError {
                    path: path.to_path_buf(),
                    reason: "Parent directory does not exist".into(),
                }
                .into());
            }
        }

        let mode = inner
            .files
            .get(path)
            .map_or(FileMode::REGULAR, |existing| existing.mode);
        inner.files.insert(
            path.to_path_buf(),
            MemoryFile {
                content: content.to_vec(),
                mode,
            },
        );
        Ok(())
    }

    fn set_mode(&self, path: &Path, mode: FileMode) -> StencilResult<()> {
        let mut inner = self
            .inner
            .write()
            .map_err(|_| ApplicationError::LockPoisoned)?;

        match inner.files.get_mut(path) {
            Some(file) => {
                file.mode = mode;
                Ok(())
            }
            None => Err(ApplicationError::FilesystemError {
                path: path.to_path_buf(),
                reason: "No such file".into(),
            }
            .into()),
        }
    }

    fn exists(&self, path: &Path) -> bool {
        self.inner
            .read()
            .map(|inner| inner.files.contains_key(path) || inner.directories.contains(path))
            .unwrap_or(false)
    }

    /// The in-memory tree has no links.
    fn is_symlink(&self, _path: &Path) -> bool {
        false
    }
}
