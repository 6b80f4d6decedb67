//! `{{ Field | default "x" }}` substitution renderer.

use stencil_core::{
    application::ports::TemplateRenderer,
    domain::{DomainError, ParameterSet, RelativePath, TemplateEntry, render_str},
    error::StencilResult,
};
use tracing::{instrument, trace};

/// Renderer for the built-in token grammar.
///
/// Paths are always rendered. Content is rendered only for parameterized
/// entries and must be UTF-8; everything else passes through untouched.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokenRenderer;

impl TokenRenderer {
    pub fn new() -> Self {
        Self
    }
}

impl TemplateRenderer for TokenRenderer {
    #[instrument(skip_all, fields(path = %path))]
    fn render_path(&self, path: &RelativePath, params: &ParameterSet) -> StencilResult<RelativePath> {
        let origin = path.as_str();
        let rendered = render_str(origin, params, origin)?;
        Ok(RelativePath::try_new(rendered)?)
    }

    #[instrument(skip_all, fields(path = %entry.path, parameterized = entry.parameterized))]
    fn render_content(&self, entry: &TemplateEntry, params: &ParameterSet) -> StencilResult<Vec<u8>> {
        let bytes = entry.content.as_bytes();
        if !entry.parameterized {
            trace!(bytes = bytes.len(), "copying literal content");
            return Ok(bytes.to_vec());
        }

        let text = std::str::from_utf8(bytes).map_err(|e| DomainError::MalformedTemplate {
            path: entry.path.to_string(),
            reason: format!("parameterized content is not valid UTF-8 ({e})"),
        })?;

        Ok(render_str(text, params, entry.path.as_str())?.into_bytes())
    }
}
