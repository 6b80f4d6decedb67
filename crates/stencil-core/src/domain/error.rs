// ============================================================================
// domain/error.rs - DOMAIN ERRORS
// ============================================================================

use thiserror::Error;

/// Root domain error type.
///
/// All errors are:
/// - Cloneable (a generation failure keeps its cause next to the partial manifest)
/// - Categorizable (for CLI display)
/// - Actionable (provides suggestions)
#[derive(Debug, Error, Clone, PartialEq)]
pub enum DomainError {
    // ========================================================================
    // Parameter validation
    // ========================================================================
    #[error("Required parameter missing: {field}")]
    MissingParameter { field: &'static str },

    #[error("Invalid value for {field}: {reason}")]
    InvalidParameter { field: &'static str, reason: String },

    #[error("Unknown parameter '{name}'")]
    UnknownParameter { name: String },

    // ========================================================================
    // Rendering
    // ========================================================================
    #[error("Unresolved token '{token}' in {path}: value is empty and no default is given")]
    UnresolvedToken { token: String, path: String },

    #[error("Unknown field '{field}' referenced in {path}")]
    UnknownField { field: String, path: String },

    #[error("Malformed template {path}: {reason}")]
    MalformedTemplate { path: String, reason: String },

    // ========================================================================
    // Paths
    // ========================================================================
    #[error("Path escapes the destination root: {path}")]
    PathEscape { path: String },

    #[error("Absolute paths not allowed: {path}")]
    AbsolutePathNotAllowed { path: String },

    #[error("Duplicate path in template source: {path}")]
    DuplicatePath { path: String },

    // ========================================================================
    // Template source construction
    // ========================================================================
    #[error("Invalid template: {0}")]
    InvalidTemplate(String),
}

impl DomainError {
    /// Get user-actionable suggestions for fixing this error.
    pub fn suggestions(&self) -> Vec<String> {
        match self {
            Self::MissingParameter { field } => vec![
                format!("{} must be supplied", field),
                "Example: stencil new mysample --module github.com/acme/mysample".into(),
            ],
            Self::InvalidParameter { field, .. } if *field == "PluginName" => vec![
                "Use letters, digits, '-' and '_' only".into(),
                "Start with a letter (e.g. helm3, my_plugin)".into(),
            ],
            Self::InvalidParameter { field, .. } if *field == "ModulePath" => vec![
                "Use a '/'-separated import path without spaces".into(),
                "Example: github.com/acme/mysample".into(),
            ],
            Self::UnknownParameter { name } => vec![
                format!("'{}' is not a template parameter", name),
                "Known parameters: PluginName, ModulePath, AuthorName, AuthorEmail, Description"
                    .into(),
            ],
            Self::UnresolvedToken { token, path } => vec![
                format!("Supply a value for {} or add a default in {}", token, path),
                format!("Example: {{{{ {} | default \"...\" }}}}", token),
            ],
            Self::UnknownField { path, .. } | Self::MalformedTemplate { path, .. } => vec![
                format!("Fix the substitution token in {}", path),
                "Token syntax: {{ FieldName }} or {{ FieldName | default \"text\" }}".into(),
            ],
            Self::PathEscape { path } => vec![
                format!("The entry resolves to '{}'", path),
                "Template paths and path parameters must not contain '..'".into(),
            ],
            _ => vec!["See documentation for more details".into()],
        }
    }

    /// Error category for CLI display styling.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::MissingParameter { .. }
            | Self::InvalidParameter { .. }
            | Self::UnknownParameter { .. } => ErrorCategory::Validation,
            Self::UnresolvedToken { .. }
            | Self::UnknownField { .. }
            | Self::MalformedTemplate { .. } => ErrorCategory::Render,
            Self::PathEscape { .. } | Self::AbsolutePathNotAllowed { .. } => {
                ErrorCategory::PathEscape
            }
            Self::DuplicatePath { .. } | Self::InvalidTemplate(_) => ErrorCategory::Template,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Validation,
    Render,
    PathEscape,
    Template,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unresolved_token_names_token_and_path() {
        let err = DomainError::UnresolvedToken {
            token: "AuthorEmail".into(),
            path: "SECURITY.md.tmpl".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("AuthorEmail"));
        assert!(msg.contains("SECURITY.md.tmpl"));
        assert_eq!(err.category(), ErrorCategory::Render);
    }

    #[test]
    fn plugin_name_suggestions_mention_allowed_characters() {
        let err = DomainError::InvalidParameter {
            field: "PluginName",
            reason: "contains '.'".into(),
        };
        assert!(err.suggestions().iter().any(|s| s.contains("letters")));
        assert_eq!(err.category(), ErrorCategory::Validation);
    }

    #[test]
    fn path_escape_is_its_own_category() {
        let err = DomainError::PathEscape { path: "../x".into() };
        assert_eq!(err.category(), ErrorCategory::PathEscape);
    }
}
