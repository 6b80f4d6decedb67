//! Template Service - template source loading and inspection.
//!
//! Separated from GeneratorService for single responsibility: this one
//! answers "what would be generated", the generator does the generating.

use std::collections::BTreeSet;
use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info, instrument};

use crate::{
    application::ports::TemplateLoader,
    domain::{FileMode, ParamField, RelativePath, TemplateEntry, TemplateSource, TemplateText},
    error::StencilResult,
};

/// DTO describing one template entry (for display).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EntryInfo {
    /// Source path, tokens unrendered.
    pub source: RelativePath,
    /// Output path with the marker stripped and staging directories elided.
    /// Tokens stay unrendered.
    pub output: RelativePath,
    pub parameterized: bool,
    pub mode: FileMode,
    pub bytes: usize,
    /// Fields referenced by the path or the content.
    pub fields: Vec<ParamField>,
}

/// Service for template operations.
pub struct TemplateService {
    loader: Box<dyn TemplateLoader>,
}

impl TemplateService {
    pub fn new(loader: Box<dyn TemplateLoader>) -> Self {
        Self { loader }
    }

    /// Load the template source once, ready to be shared across runs.
    #[instrument(skip_all)]
    pub fn load(&self) -> StencilResult<Arc<TemplateSource>> {
        let source = self.loader.load()?;
        info!(source = source.name(), entries = source.len(), "Template source loaded");
        Ok(Arc::new(source))
    }

    /// Describe every entry of `source`, in generation order.
    pub fn describe(source: &TemplateSource) -> StencilResult<Vec<EntryInfo>> {
        source
            .entries()
            .map(|entry| Self::describe_entry(source, entry))
            .collect()
    }

    /// Union of fields referenced anywhere in `source`, in declaration order.
    pub fn referenced_fields(source: &TemplateSource) -> StencilResult<Vec<ParamField>> {
        let mut found = BTreeSet::new();
        for info in Self::describe(source)? {
            found.extend(info.fields);
        }
        Ok(ParamField::ALL.iter().copied().filter(|f| found.contains(f)).collect())
    }

    fn describe_entry(source: &TemplateSource, entry: &TemplateEntry) -> StencilResult<EntryInfo> {
        let origin = entry.path.as_str();
        let mut fields = BTreeSet::new();

        fields.extend(TemplateText::parse(origin, origin)?.fields());

        if entry.parameterized {
            // Binary content under a marker only fails at render time.
            match std::str::from_utf8(entry.content.as_bytes()) {
                Ok(text) => fields.extend(TemplateText::parse(text, origin)?.fields()),
                Err(_) => debug!(path = origin, "content is not UTF-8, fields not scanned"),
            }
        }

        Ok(EntryInfo {
            source: entry.path.clone(),
            output: source.layout().output_path(&entry.path),
            parameterized: entry.parameterized,
            mode: entry.mode,
            bytes: entry.content.len(),
            fields: ParamField::ALL.iter().copied().filter(|f| fields.contains(f)).collect(),
        })
    }
}
