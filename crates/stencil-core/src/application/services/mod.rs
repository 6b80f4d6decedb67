//! Application services - orchestrate use cases.
//!
//! Services coordinate the domain layer and ports to accomplish
//! high-level use cases like "generate a plugin tree" or "list a template".

pub mod generator;
pub mod materializer;
pub mod template_service;

pub use generator::GeneratorService;
pub use materializer::{ConflictPolicy, MaterializeOptions, Materializer};
pub use template_service::{EntryInfo, TemplateService};
