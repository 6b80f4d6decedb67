//! Template source aggregate.
//!
//! ## Model
//!
//! ```text
//! TemplateSource (Aggregate Root, immutable once built)
//! ├── OutputLayout               - marker suffix, staging directory
//! └── BTreeMap<RelativePath, TemplateEntry>
//!      ├── path                  - may embed tokens: cmd/{{ PluginName }}/main.go.tmpl
//!      ├── content: EntryContent - Static(&'static [u8]) | Owned(Vec<u8>)
//!      ├── parameterized: bool   - render content, or copy byte-for-byte
//!      └── mode: FileMode
//! ```
//!
//! Entries are keyed by source path, so iteration order is the byte order of
//! the paths and identical for every run. A `TemplateSource` is `Send + Sync`
//! and is meant to be built once and shared behind an `Arc`.

use std::collections::BTreeMap;
use std::fmt;

use crate::domain::{
    entities::common::RelativePath, error::DomainError, value_objects::FileMode,
};

/// Filename suffix marking an entry as parameterized.
pub const TEMPLATE_MARKER: &str = ".tmpl";

/// Directory segment elided from output paths by default.
pub const STAGING_DIR: &str = "template";

/// Raw bytes of an entry: either compiled into the binary or loaded at runtime.
#[derive(Clone)]
pub enum EntryContent {
    /// Compile-time bytes (e.g. `include_bytes!`).
    Static(&'static [u8]),

    /// Runtime-owned bytes (filesystem-loaded).
    Owned(Vec<u8>),
}

impl EntryContent {
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            Self::Static(b) => b,
            Self::Owned(b) => b,
        }
    }

    pub fn len(&self) -> usize {
        self.as_bytes().len()
    }

    pub fn is_empty(&self) -> bool {
        self.as_bytes().is_empty()
    }
}

impl fmt::Debug for EntryContent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match self {
            Self::Static(_) => "Static",
            Self::Owned(_) => "Owned",
        };
        write!(f, "{kind}({} bytes)", self.len())
    }
}

impl From<&'static [u8]> for EntryContent {
    fn from(b: &'static [u8]) -> Self {
        Self::Static(b)
    }
}

impl From<&'static str> for EntryContent {
    fn from(s: &'static str) -> Self {
        Self::Static(s.as_bytes())
    }
}

impl From<Vec<u8>> for EntryContent {
    fn from(b: Vec<u8>) -> Self {
        Self::Owned(b)
    }
}

impl From<String> for EntryContent {
    fn from(s: String) -> Self {
        Self::Owned(s.into_bytes())
    }
}

/// One file in the template source.
#[derive(Debug, Clone)]
pub struct TemplateEntry {
    pub path: RelativePath,
    pub content: EntryContent,
    pub parameterized: bool,
    pub mode: FileMode,
}

impl TemplateEntry {
    /// Entry whose parameterization follows the marker convention: a final
    /// segment ending in [`TEMPLATE_MARKER`] is parameterized.
    pub fn new(path: RelativePath, content: impl Into<EntryContent>) -> Self {
        let parameterized = path.has_suffix(TEMPLATE_MARKER);
        Self {
            path,
            content: content.into(),
            parameterized,
            mode: FileMode::REGULAR,
        }
    }

    /// Entry copied byte-for-byte regardless of its name.
    pub fn literal(path: RelativePath, content: impl Into<EntryContent>) -> Self {
        Self {
            parameterized: false,
            ..Self::new(path, content)
        }
    }

    /// Entry rendered regardless of its name.
    pub fn parameterized(path: RelativePath, content: impl Into<EntryContent>) -> Self {
        Self {
            parameterized: true,
            ..Self::new(path, content)
        }
    }

    pub fn with_mode(mut self, mode: FileMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn executable(self) -> Self {
        self.with_mode(FileMode::EXECUTABLE)
    }
}

/// How source paths map onto output paths.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputLayout {
    /// Stripped from the final segment of every output path.
    pub marker: String,
    /// Directory segment removed from output paths; `None` disables elision.
    pub staging_dir: Option<String>,
}

impl OutputLayout {
    /// Map a source path to its output path, tokens still in place.
    ///
    /// Applied before rendering so staging segments are only ever literal
    /// source segments, never values filled in by a parameter.
    pub fn output_path(&self, source: &RelativePath) -> RelativePath {
        let stripped = source.strip_suffix(&self.marker);
        match &self.staging_dir {
            Some(dir) => stripped.without_directory(dir),
            None => stripped,
        }
    }
}

impl Default for OutputLayout {
    fn default() -> Self {
        Self {
            marker: TEMPLATE_MARKER.to_string(),
            staging_dir: Some(STAGING_DIR.to_string()),
        }
    }
}

/// Immutable, ordered collection of template entries.
#[derive(Debug, Clone)]
pub struct TemplateSource {
    name: String,
    layout: OutputLayout,
    entries: BTreeMap<RelativePath, TemplateEntry>,
}

impl TemplateSource {
    pub fn builder(name: impl Into<String>) -> TemplateSourceBuilder {
        TemplateSourceBuilder {
            name: name.into(),
            layout: OutputLayout::default(),
            entries: BTreeMap::new(),
            duplicate: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn layout(&self) -> &OutputLayout {
        &self.layout
    }

    /// Entries in deterministic (path) order.
    pub fn entries(&self) -> impl ExactSizeIterator<Item = &TemplateEntry> {
        self.entries.values()
    }

    pub fn get(&self, path: &RelativePath) -> Option<&TemplateEntry> {
        self.entries.get(path)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Builder for [`TemplateSource`].
///
/// Duplicate paths are remembered and reported by `build()` so entry lists
/// can be chained without intermediate `?`.
pub struct TemplateSourceBuilder {
    name: String,
    layout: OutputLayout,
    entries: BTreeMap<RelativePath, TemplateEntry>,
    duplicate: Option<RelativePath>,
}

impl TemplateSourceBuilder {
    pub fn layout(mut self, layout: OutputLayout) -> Self {
        self.layout = layout;
        self
    }

    pub fn add_entry(mut self, entry: TemplateEntry) -> Self {
        self.push(entry);
        self
    }

    pub fn push(&mut self, entry: TemplateEntry) {
        let path = entry.path.clone();
        if self.entries.insert(path.clone(), entry).is_some() && self.duplicate.is_none() {
            self.duplicate = Some(path);
        }
    }

    /// # Errors
    ///
    /// - `InvalidTemplate` if the name or marker is empty, or no entries were added
    /// - `DuplicatePath` if two entries share a source path
    pub fn build(self) -> Result<TemplateSource, DomainError> {
        if self.name.trim().is_empty() {
            return Err(DomainError::InvalidTemplate(
                "template source name cannot be empty".into(),
            ));
        }
        if self.layout.marker.is_empty() {
            return Err(DomainError::InvalidTemplate(
                "template marker cannot be empty".into(),
            ));
        }
        if let Some(path) = self.duplicate {
            return Err(DomainError::DuplicatePath {
                path: path.to_string(),
            });
        }
        if self.entries.is_empty() {
            return Err(DomainError::InvalidTemplate(format!(
                "template source '{}' has no entries",
                self.name
            )));
        }

        Ok(TemplateSource {
            name: self.name,
            layout: self.layout,
            entries: self.entries,
        })
    }
}
