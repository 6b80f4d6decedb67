//! Application configuration.
//!
//! [`AppConfig`] is loaded once at startup and passed down by value.  The
//! CLI layer owns config; the core crate never sees it.
//!
//! # Resolution order (highest priority first)
//!
//! 1. CLI flags (handled at the call-site, not here)
//! 2. Environment variables: `STENCIL_<SECTION>__<KEY>`, e.g.
//!    `STENCIL_DEFAULTS__AUTHOR_NAME`
//! 3. `./.stencil.toml`, if present
//! 4. The file given by `--config`, or the platform config file
//! 5. Built-in defaults (always present)

use std::path::{Path, PathBuf};

use anyhow::Context;
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use stencil_core::application::ConflictPolicy;

use crate::cli::OutputFormat;

/// Name of the per-project config file.
pub const LOCAL_CONFIG_FILE: &str = ".stencil.toml";

/// Every key `config get` / `config set` understand.
pub const KEYS: &[&str] = &[
    "defaults.author_name",
    "defaults.author_email",
    "defaults.description",
    "defaults.module_prefix",
    "output.no_color",
    "output.format",
    "templates.dir",
    "templates.conflict",
];

/// Application configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Parameter defaults for new plugins.
    pub defaults: Defaults,
    /// Output settings.
    pub output: OutputConfig,
    /// Template settings.
    pub templates: TemplateConfig,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Defaults {
    pub author_name: Option<String>,
    pub author_email: Option<String>,
    pub description: Option<String>,
    /// `new` uses `<module_prefix>/<name>` when `--module` is absent.
    pub module_prefix: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub no_color: bool,
    pub format: OutputFormat,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TemplateConfig {
    /// Template directory used instead of the bundled skeleton.
    pub dir: Option<PathBuf>,
    pub conflict: ConflictPolicy,
}

impl AppConfig {
    /// Load configuration from defaults, files and the environment.
    ///
    /// An explicit `config_file` must exist; the implicit locations are
    /// optional.
    pub fn load(config_file: Option<&PathBuf>) -> anyhow::Result<Self> {
        let mut builder = Config::builder().add_source(
            Config::try_from(&Self::default()).context("failed to seed default configuration")?,
        );

        builder = match config_file {
            Some(path) => builder.add_source(File::from(path.as_path()).required(true)),
            None => builder
                .add_source(File::from(Self::config_path()).required(false))
                .add_source(File::from(Path::new(LOCAL_CONFIG_FILE)).required(false)),
        };

        builder
            .add_source(
                Environment::with_prefix("STENCIL")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()
            .context("failed to read configuration")?
            .try_deserialize()
            .context("invalid configuration")
    }

    /// Path to the platform configuration file.
    ///
    /// Uses `directories::ProjectDirs` for cross-platform correctness,
    /// falling back to `.stencil.toml` in the current directory.
    pub fn config_path() -> PathBuf {
        directories::ProjectDirs::from("rs", "stencil", "stencil")
            .map(|d| d.config_dir().join("config.toml"))
            .unwrap_or_else(|| PathBuf::from(LOCAL_CONFIG_FILE))
    }

    /// The file `config set` writes to and `config path` reports.
    pub fn active_path(config_file: Option<&PathBuf>) -> PathBuf {
        match config_file {
            Some(path) => path.clone(),
            None if Path::new(LOCAL_CONFIG_FILE).is_file() => PathBuf::from(LOCAL_CONFIG_FILE),
            None => Self::config_path(),
        }
    }

    /// Value of a dotted key, rendered as text. `None` for unknown keys.
    pub fn get(&self, key: &str) -> Option<String> {
        let opt = |v: &Option<String>| v.clone().unwrap_or_default();
        Some(match key {
            "defaults.author_name" => opt(&self.defaults.author_name),
            "defaults.author_email" => opt(&self.defaults.author_email),
            "defaults.description" => opt(&self.defaults.description),
            "defaults.module_prefix" => opt(&self.defaults.module_prefix),
            "output.no_color" => self.output.no_color.to_string(),
            "output.format" => format!("{:?}", self.output.format).to_lowercase(),
            "templates.dir" => self
                .templates
                .dir
                .as_ref()
                .map(|d| d.display().to_string())
                .unwrap_or_default(),
            "templates.conflict" => self.templates.conflict.to_string(),
            _ => return None,
        })
    }
}
