pub mod common;
pub mod manifest;
pub mod parameters;
pub mod template;
pub mod token;

pub use crate::domain::DomainError;
pub use manifest::GenerationManifest;
pub use parameters::{ParameterSet, RawParameters};
pub use template::{TemplateEntry, TemplateSource};
