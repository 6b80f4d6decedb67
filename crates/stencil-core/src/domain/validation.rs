use crate::domain::{
    entities::{ParameterSet, RawParameters, common::RelativePath, template::OutputLayout},
    error::DomainError,
};

/// Centralized domain validation.
///
/// All validation logic lives here, not scattered across services.
pub struct DomainValidator;

impl DomainValidator {
    pub fn validate_parameters(raw: &RawParameters) -> Result<ParameterSet, DomainError> {
        ParameterSet::validate(raw)
    }

    /// Unrendered output path for a source path, refusing sources that
    /// would leave the destination root.
    pub fn output_template(
        layout: &OutputLayout,
        source: &RelativePath,
    ) -> Result<RelativePath, DomainError> {
        source.ensure_contained()?;
        Ok(layout.output_path(source))
    }

    /// Refuse a rendered output path that would leave the destination root.
    pub fn validate_output_path(rendered: RelativePath) -> Result<RelativePath, DomainError> {
        rendered.ensure_contained()?;
        Ok(rendered)
    }
}
