//! Driven (output) ports - implemented by infrastructure.
//!
//! These traits define what the application needs from external systems.
//! The `stencil-adapters` crate provides implementations.

use std::path::Path;

use crate::domain::{FileMode, ParameterSet, RelativePath, TemplateEntry, TemplateSource};
use crate::error::StencilResult;

/// Port for filesystem operations.
///
/// Implemented by:
/// - `stencil_adapters::filesystem::LocalFilesystem` (production)
/// - `stencil_adapters::filesystem::MemoryFilesystem` (testing)
///
/// Paths passed in are already joined onto the destination root.
#[cfg_attr(test, mockall::automock)]
pub trait Filesystem: Send + Sync {
    /// Create a directory and all parent directories.
    fn create_dir_all(&self, path: &Path) -> StencilResult<()>;

    /// Write bytes to a file, replacing any existing content.
    fn write_file(&self, path: &Path, content: &[u8]) -> StencilResult<()>;

    /// Set the file's permission bits (no-op where unsupported).
    fn set_mode(&self, path: &Path, mode: FileMode) -> StencilResult<()>;

    /// Check if path exists.
    fn exists(&self, path: &Path) -> bool;

    /// Whether `path` itself is a symbolic link. Missing paths are not.
    fn is_symlink(&self, path: &Path) -> bool;
}

/// Port for rendering one template entry.
///
/// Implemented by:
/// - `stencil_adapters::renderer::TokenRenderer` (`{{ Field | default "x" }}` substitution)
#[cfg_attr(test, mockall::automock)]
pub trait TemplateRenderer: Send + Sync {
    /// Resolve the tokens in an output path. The marker and staging
    /// segments have already been removed.
    fn render_path(&self, path: &RelativePath, params: &ParameterSet) -> StencilResult<RelativePath>;

    /// Render the entry's content. Non-parameterized entries come back
    /// byte-identical.
    fn render_content(&self, entry: &TemplateEntry, params: &ParameterSet) -> StencilResult<Vec<u8>>;
}

/// Port for obtaining a template source.
///
/// Implemented by:
/// - `stencil_adapters::BuiltinTemplates` (skeleton compiled into the binary)
/// - `stencil_adapters::DirectoryTemplateLoader` (template directory on disk)
pub trait TemplateLoader: Send + Sync {
    /// Assemble the template source.
    fn load(&self) -> StencilResult<TemplateSource>;
}
