//! Generator service - the public entry point for one generation run.
//!
//! Binds a shared [`TemplateSource`] to a renderer and a filesystem. The
//! source is immutable and behind an `Arc`, so one loaded source serves any
//! number of runs, including concurrent ones from different threads.

use std::path::Path;
use std::sync::Arc;

use tracing::{info, instrument, warn};

use crate::{
    application::{
        ports::{Filesystem, TemplateRenderer},
        services::materializer::{MaterializeOptions, Materializer},
    },
    domain::{DomainValidator, GenerationManifest, ParameterSet, RawParameters, RenderedFile, TemplateSource},
    error::GenerationFailure,
};

/// Validates parameters and materializes the bound template source.
pub struct GeneratorService {
    source: Arc<TemplateSource>,
    materializer: Materializer,
}

impl GeneratorService {
    pub fn new(
        source: Arc<TemplateSource>,
        renderer: Box<dyn TemplateRenderer>,
        filesystem: Box<dyn Filesystem>,
    ) -> Self {
        Self {
            source,
            materializer: Materializer::new(renderer, filesystem),
        }
    }

    pub fn source(&self) -> &Arc<TemplateSource> {
        &self.source
    }

    /// Validate `raw` and write the rendered tree under `root`.
    ///
    /// A parameter error fails before any entry is visited; the failure then
    /// carries no entry and an empty partial manifest.
    #[instrument(
        skip_all,
        fields(
            source = self.source.name(),
            root = %root.display(),
            entries = self.source.len()
        )
    )]
    pub fn generate(
        &self,
        raw: &RawParameters,
        root: &Path,
        options: &MaterializeOptions,
    ) -> Result<GenerationManifest, GenerationFailure> {
        let params = Self::validate(raw, root)?;
        info!(plugin = params.plugin_name(), "Parameters validated");

        let manifest = self
            .materializer
            .materialize(&self.source, &params, root, options)?;

        info!(files = manifest.len(), "Generation completed successfully");
        Ok(manifest)
    }

    /// Validate `raw` and render every entry in memory.
    #[instrument(skip_all, fields(source = self.source.name()))]
    pub fn preview(&self, raw: &RawParameters) -> Result<Vec<RenderedFile>, GenerationFailure> {
        let params = Self::validate(raw, Path::new(""))?;
        self.materializer.plan(&self.source, &params)
    }

    fn validate(raw: &RawParameters, root: &Path) -> Result<ParameterSet, GenerationFailure> {
        DomainValidator::validate_parameters(raw).map_err(|e| {
            warn!(error = %e, "Parameter validation failed");
            GenerationFailure::new(None, e.into(), GenerationManifest::new(root))
        })
    }
}
