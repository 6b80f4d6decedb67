//! Application layer for Stencil.
//!
//! This layer contains:
//! - **Services**: Use case orchestration (GeneratorService, Materializer, TemplateService)
//! - **Ports**: Interface definitions (traits) for external dependencies
//! - **Errors**: Application-specific error types
//!
//! The application layer coordinates the domain layer but contains no
//! business logic itself. Parameter rules and the token grammar live in
//! `crate::domain`.

pub mod error;
pub mod ports;
pub mod services;

pub use services::{
    ConflictPolicy, EntryInfo, GeneratorService, MaterializeOptions, Materializer, TemplateService,
};

// Re-export port traits (for adapter implementation)
pub use ports::{Filesystem, TemplateLoader, TemplateRenderer};

pub use error::ApplicationError;
