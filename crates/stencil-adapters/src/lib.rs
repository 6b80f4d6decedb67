//! Infrastructure adapters for Stencil.
//!
//! This crate implements the ports defined in `stencil-core::application::ports`.
//! It contains all external dependencies and I/O operations.

pub mod builtin_templates;
pub mod filesystem;
pub mod renderer;
pub mod template_loader;

// Re-export commonly used adapters
pub use builtin_templates::BuiltinTemplates;
pub use filesystem::{LocalFilesystem, MemoryFilesystem};
pub use renderer::TokenRenderer;
pub use template_loader::DirectoryTemplateLoader;
