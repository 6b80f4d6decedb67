//! Filesystem-based template loader.
//!
//! Walks a template directory and turns every regular file into one
//! [`TemplateEntry`] addressed by its path relative to the directory root.
//!
//! # Directory layout expected
//!
//! ```text
//! my-template/
//! ├── stencil.toml                 ← manifest (optional)
//! ├── go.mod.tmpl                  ← parameterized, written as go.mod
//! ├── cmd/{{ PluginName }}/
//! │   └── main.go.tmpl
//! ├── pkg/template/security.txt.tmpl  ← written as pkg/security.txt
//! └── schema.json                  ← copied byte-for-byte
//! ```
//!
//! # `stencil.toml` format
//!
//! ```toml
//! [layout]
//! marker      = ".tmpl"      # parameterization suffix
//! staging_dir = "template"   # elided directory segment; "" disables
//!
//! # Optional per-file overrides. Paths are relative to the directory.
//! [[files]]
//! path          = "scripts/install.sh.tmpl"
//! mode          = "755"
//!
//! [[files]]
//! path          = "docs/braces.md"
//! parameterized = true       # render even without the marker
//! ```

use std::{
    collections::HashMap,
    fs,
    path::{Path, PathBuf},
};

use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, instrument, warn};
use walkdir::WalkDir;

use stencil_core::{
    application::{ApplicationError, ports::TemplateLoader},
    domain::{
        FileMode, OutputLayout, RelativePath, STAGING_DIR, TEMPLATE_MARKER, TemplateEntry,
        TemplateSource,
    },
    error::{StencilError, StencilResult},
};

/// Manifest file name, looked up at the directory root only.
pub const MANIFEST_FILE: &str = "stencil.toml";

// ── Manifest ──────────────────────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct Manifest {
    #[serde(default)]
    layout: LayoutSection,
    #[serde(default)]
    files: Vec<FileOverride>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct LayoutSection {
    #[serde(default = "default_marker")]
    marker: String,
    #[serde(default = "default_staging_dir")]
    staging_dir: String,
}

impl Default for LayoutSection {
    fn default() -> Self {
        Self {
            marker: default_marker(),
            staging_dir: default_staging_dir(),
        }
    }
}

fn default_marker() -> String {
    TEMPLATE_MARKER.to_string()
}

fn default_staging_dir() -> String {
    STAGING_DIR.to_string()
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct FileOverride {
    path: String,
    mode: Option<String>,
    parameterized: Option<bool>,
}

#[derive(Debug, Error)]
enum ManifestError {
    #[error("invalid stencil.toml: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("stencil.toml overrides '{0}', which is not in the template directory")]
    UnknownFile(String),

    #[error("stencil.toml has an invalid mode for '{path}': {reason}")]
    Mode { path: String, reason: String },
}

// ── Loader ────────────────────────────────────────────────────────────────────

/// Loads a [`TemplateSource`] from a directory on disk.
///
/// # Example
///
/// ```no_run
/// use stencil_adapters::DirectoryTemplateLoader;
/// use stencil_core::application::ports::TemplateLoader;
///
/// let source = DirectoryTemplateLoader::new("./my-template").load()?;
/// println!("Loaded {} entries", source.len());
/// # Ok::<(), stencil_core::error::StencilError>(())
/// ```
#[derive(Debug, Clone)]
pub struct DirectoryTemplateLoader {
    root: PathBuf,
}

impl DirectoryTemplateLoader {
    /// The directory does not need to exist yet; `load` fails if it is
    /// missing when called.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn load_error(&self, reason: impl Into<String>) -> StencilError {
        ApplicationError::TemplateLoad {
            path: self.root.clone(),
            reason: reason.into(),
        }
        .into()
    }

    fn read_manifest(&self) -> StencilResult<Manifest> {
        let path = self.root.join(MANIFEST_FILE);
        if !path.is_file() {
            debug!("no manifest, using default layout");
            return Ok(Manifest::default());
        }
        let raw = fs::read_to_string(&path)
            .map_err(|e| self.load_error(format!("failed to read {MANIFEST_FILE}: {e}")))?;
        toml::from_str(&raw).map_err(|e| self.load_error(ManifestError::from(e).to_string()))
    }

    /// Source name: the directory's final component.
    fn source_name(&self) -> String {
        self.root
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| self.root.display().to_string())
    }
}

impl TemplateLoader for DirectoryTemplateLoader {
    #[instrument(skip(self), fields(dir = %self.root.display()))]
    fn load(&self) -> StencilResult<TemplateSource> {
        if !self.root.is_dir() {
            return Err(self.load_error("template directory not found"));
        }

        let manifest = self.read_manifest()?;
        let layout = OutputLayout {
            marker: manifest.layout.marker.clone(),
            staging_dir: Some(manifest.layout.staging_dir.clone()).filter(|d| !d.is_empty()),
        };

        let mut overrides: HashMap<RelativePath, &FileOverride> = HashMap::new();
        for file in &manifest.files {
            overrides.insert(RelativePath::try_new(&file.path)?, file);
        }

        let mut builder = TemplateSource::builder(self.source_name()).layout(layout.clone());

        let walker = WalkDir::new(&self.root)
            .min_depth(1)
            .follow_links(false)
            .sort_by_file_name();

        for walk_entry in walker {
            let walk_entry =
                walk_entry.map_err(|e| self.load_error(format!("directory walk error: {e}")))?;
            let file_type = walk_entry.file_type();

            if file_type.is_dir() {
                continue;
            }
            if !file_type.is_file() {
                warn!(path = %walk_entry.path().display(), "skipping non-regular file");
                continue;
            }

            let rel_raw = walk_entry.path().strip_prefix(&self.root).map_err(|_| {
                self.load_error(format!(
                    "failed to relativise '{}'",
                    walk_entry.path().display()
                ))
            })?;
            if walk_entry.depth() == 1 && rel_raw.as_os_str() == MANIFEST_FILE {
                continue;
            }

            let path = RelativePath::try_new(rel_raw.to_string_lossy())?;
            let content = fs::read(walk_entry.path())
                .map_err(|e| self.load_error(format!("failed to read '{path}': {e}")))?;

            let file_override = overrides.remove(&path);
            let parameterized = file_override
                .and_then(|o| o.parameterized)
                .unwrap_or_else(|| path.has_suffix(&layout.marker));
            let mode = match file_override.and_then(|o| o.mode.as_deref()) {
                Some(raw) => FileMode::parse_octal(raw).map_err(|e| {
                    self.load_error(
                        ManifestError::Mode {
                            path: path.to_string(),
                            reason: e.to_string(),
                        }
                        .to_string(),
                    )
                })?,
                None => disk_mode(walk_entry.path()),
            };

            debug!(%path, bytes = content.len(), parameterized, %mode, "entry loaded");
            let entry = if parameterized {
                TemplateEntry::parameterized(path, content)
            } else {
                TemplateEntry::literal(path, content)
            };
            builder.push(entry.with_mode(mode));
        }

        if let Some(path) = overrides.keys().min() {
            return Err(self.load_error(ManifestError::UnknownFile(path.to_string()).to_string()));
        }

        Ok(builder.build()?)
    }
}

#[cfg(unix)]
fn disk_mode(path: &Path) -> FileMode {
    use std::os::unix::fs::PermissionsExt;
    fs::metadata(path)
        .map(|m| FileMode::new(m.permissions().mode()))
        .unwrap_or(FileMode::REGULAR)
}

#[cfg(not(unix))]
fn disk_mode(_path: &Path) -> FileMode {
    FileMode::REGULAR
}
