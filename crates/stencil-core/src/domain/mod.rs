// ============================================================================
//  CLEAN MODULE BOUNDARIES
// ============================================================================

//! Core domain layer for Stencil.
//!
//! Pure logic only. All I/O (writing files, loading template directories) is
//! handled via ports defined in the application layer.
//!
//! - **No I/O**: no filesystem, network, or process calls
//! - **Immutable entities**: `ParameterSet` and `TemplateSource` never change
//!   after construction
//! - **Rich domain model**: validation and the token grammar live here
//!
// Public API - what the world sees
pub mod entities;
pub mod error;
pub mod value_objects;

// Private implementation details - not visible outside domain
mod validation;

// Re-exports for convenience
pub use entities::{
    common::RelativePath,
    manifest::{GenerationManifest, RenderedFile, WriteOutcome, WrittenFile},
    parameters::{ParameterSet, RawParameters},
    template::{
        EntryContent, OutputLayout, STAGING_DIR, TEMPLATE_MARKER, TemplateEntry, TemplateSource,
        TemplateSourceBuilder,
    },
    token::{Segment, TemplateText, Token, contains_token, render_str},
};

pub use error::{DomainError, ErrorCategory};

pub use value_objects::{FileMode, ParamField};

pub use validation::DomainValidator;

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_params() -> ParameterSet {
        ParameterSet::validate(
            &RawParameters::new()
                .with("PluginName", "mysample")
                .with("ModulePath", "github.com/acme/mysample")
                .with("AuthorEmail", "")
                .with("AuthorName", "")
                .with("Description", "Example mixin"),
        )
        .unwrap()
    }

    #[test]
    fn security_contact_falls_back_to_default() {
        let params = sample_params();
        let out = render_str(
            r#"Contact: mailto:{{ AuthorEmail | default "security@example.com" }}"#,
            &params,
            "pkg/template/security.txt.tmpl",
        )
        .unwrap();
        assert_eq!(out, "Contact: mailto:security@example.com");
    }

    #[test]
    fn output_path_for_security_entry() {
        let layout = OutputLayout::default();
        let out = DomainValidator::output_template(
            &layout,
            &RelativePath::new("pkg/template/security.txt.tmpl"),
        )
        .unwrap();
        assert_eq!(out.as_str(), "pkg/security.txt");
    }

    #[test]
    fn staging_segments_come_from_the_source_only() {
        let layout = OutputLayout::default();
        let template = DomainValidator::output_template(
            &layout,
            &RelativePath::new("pkg/{{ PluginName }}/template/version.go.tmpl"),
        )
        .unwrap();
        assert_eq!(template.as_str(), "pkg/{{ PluginName }}/version.go");

        let params = ParameterSet::validate(
            &RawParameters::new()
                .with("PluginName", "template")
                .with("ModulePath", "github.com/acme/template"),
        )
        .unwrap();
        let rendered = render_str(template.as_str(), &params, template.as_str()).unwrap();
        let out = DomainValidator::validate_output_path(RelativePath::new(rendered)).unwrap();
        assert_eq!(out.as_str(), "pkg/template/version.go");
    }

    #[test]
    fn output_path_rejects_parent_segments() {
        let layout = OutputLayout::default();
        let err = DomainValidator::output_template(
            &layout,
            &RelativePath::new("pkg/../../outside.txt"),
        )
        .unwrap_err();
        assert_eq!(err.category(), ErrorCategory::PathEscape);

        let err = DomainValidator::validate_output_path(RelativePath::new("a/../../b")).unwrap_err();
        assert_eq!(err.category(), ErrorCategory::PathEscape);
    }

    #[test]
    fn derived_name_resolves_in_identifiers() {
        let params = ParameterSet::validate(
            &RawParameters::new()
                .with("PluginName", "helm3")
                .with("ModulePath", "get.porter.sh/mixin/helm3"),
        )
        .unwrap();
        let out = render_str(
            "type {{ PluginNameCap }}Mixin struct{}\nname: {{ PluginNameCap }} CI",
            &params,
            "x.tmpl",
        )
        .unwrap();
        assert_eq!(out, "type Helm3Mixin struct{}\nname: Helm3 CI");
    }
}
