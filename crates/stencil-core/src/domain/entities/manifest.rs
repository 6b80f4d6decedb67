use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::domain::{entities::common::RelativePath, value_objects::FileMode};

/// One entry after rendering, ready to be written.
///
/// Transient: built per entry during a run and dropped after the write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedFile {
    /// Output path relative to the destination root.
    pub path: RelativePath,
    /// Path of the template entry this file came from.
    pub source: RelativePath,
    pub content: Vec<u8>,
    pub mode: FileMode,
}

impl RenderedFile {
    pub fn size(&self) -> usize {
        self.content.len()
    }
}

/// What happened at one destination path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum WriteOutcome {
    Created,
    Overwritten,
    /// Left untouched because a file already existed.
    Skipped,
}

/// Record of one file handled by the materializer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WrittenFile {
    pub path: RelativePath,
    pub source: RelativePath,
    pub bytes: usize,
    pub mode: FileMode,
    pub outcome: WriteOutcome,
}

/// Ordered record of a generation run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GenerationManifest {
    root: PathBuf,
    files: Vec<WrittenFile>,
}

impl GenerationManifest {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            files: Vec::new(),
        }
    }

    pub fn record(&mut self, file: WrittenFile) {
        self.files.push(file);
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Files in the order they were handled.
    pub fn files(&self) -> &[WrittenFile] {
        &self.files
    }

    /// Files actually written (created or overwritten).
    pub fn written(&self) -> impl Iterator<Item = &WrittenFile> {
        self.files
            .iter()
            .filter(|f| f.outcome != WriteOutcome::Skipped)
    }

    pub fn skipped(&self) -> impl Iterator<Item = &WrittenFile> {
        self.files
            .iter()
            .filter(|f| f.outcome == WriteOutcome::Skipped)
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn total_bytes(&self) -> usize {
        self.written().map(|f| f.bytes).sum()
    }
}
