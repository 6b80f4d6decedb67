//! Stencil Core - Hexagonal Architecture Implementation
//!
//! This crate provides the domain and application layers of the Stencil
//! template-tree generator, following hexagonal (ports and adapters)
//! architecture.
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │           stencil-cli (CLI)             │
//! └──────────────────┬──────────────────────┘
//!                    │ calls
//!                    ▼
//! ┌─────────────────────────────────────────┐
//! │         Application Services            │
//! │ (GeneratorService, Materializer, ...)   │
//! └──────────────────┬──────────────────────┘
//!                    │ uses
//!                    ▼
//! ┌─────────────────────────────────────────┐
//! │      Application Ports (Traits)         │
//! │   (Loader, Filesystem, Renderer)        │
//! └──────────────────┬──────────────────────┘
//!                    │ implemented by
//!                    ▼
//! ┌─────────────────────────────────────────┐
//! │     stencil-adapters (Infrastructure)   │
//! │ (TokenRenderer, LocalFilesystem, ...)   │
//! └─────────────────────────────────────────┘
//!                    │
//!                    ▼
//! ┌─────────────────────────────────────────┐
//! │         Domain Layer (Pure Logic)       │
//! │ (ParameterSet, TemplateSource, tokens)  │
//! └─────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use std::path::Path;
//! use stencil_core::prelude::*;
//!
//! let source = TemplateService::new(Box::new(loader)).load()?;
//! let generator = GeneratorService::new(source, Box::new(renderer), Box::new(filesystem));
//!
//! let manifest = generator.generate(
//!     &RawParameters::new()
//!         .with("PluginName", "helm3")
//!         .with("ModulePath", "get.porter.sh/mixin/helm3"),
//!     Path::new("./helm3"),
//!     &MaterializeOptions::default(),
//! )?;
//! ```

pub mod domain;

pub mod application;

pub mod error;

// Public API - what external crates should use
pub mod prelude {
    pub use crate::application::{
        ConflictPolicy, EntryInfo, GeneratorService, MaterializeOptions, TemplateService,
        ports::{Filesystem, TemplateLoader, TemplateRenderer},
    };
    pub use crate::domain::{
        EntryContent, FileMode, GenerationManifest, OutputLayout, ParamField, ParameterSet,
        RawParameters, RelativePath, RenderedFile, TemplateEntry, TemplateSource, WriteOutcome,
        WrittenFile,
    };
    pub use crate::error::{ErrorCategory, GenerationFailure, StencilError, StencilResult};
}

// Version info
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
