//! Unified error handling for Stencil Core.
//!
//! This module provides a unified error type that wraps domain and application
//! errors, with rich context and user-actionable suggestions, plus
//! [`GenerationFailure`], the failure half of a generation run.

use std::fmt;

use thiserror::Error;

use crate::application::ApplicationError;
use crate::domain::{self, DomainError, GenerationManifest, RelativePath};

/// Root error type for Stencil Core operations.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum StencilError {
    /// Errors from the domain layer (validation, rendering, paths).
    #[error("{0}")]
    Domain(#[from] DomainError),

    /// Errors from the application layer (filesystem, loading).
    #[error("{0}")]
    Application(#[from] ApplicationError),

    /// Configuration or setup errors.
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    /// Unexpected internal errors (bugs).
    #[error("Internal error: {message}. This is a bug, please report it.")]
    Internal { message: String },
}

impl StencilError {
    /// Get user-actionable suggestions for fixing this error.
    pub fn suggestions(&self) -> Vec<String> {
        match self {
            Self::Domain(e) => e.suggestions(),
            Self::Application(e) => e.suggestions(),
            Self::Configuration { message } => vec![
                format!("Configuration issue: {}", message),
                "Check your setup and try again".into(),
            ],
            Self::Internal { .. } => vec![
                "This appears to be a bug in Stencil".into(),
                "Please report this issue at: https://github.com/stencil-rs/stencil/issues".into(),
            ],
        }
    }

    /// Get error category for display/styling purposes.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Domain(e) => match e.category() {
                domain::ErrorCategory::Validation => ErrorCategory::Validation,
                domain::ErrorCategory::Render => ErrorCategory::Render,
                domain::ErrorCategory::PathEscape => ErrorCategory::PathEscape,
                domain::ErrorCategory::Template => ErrorCategory::Template,
            },
            Self::Application(e) => e.category(),
            Self::Configuration { .. } => ErrorCategory::Configuration,
            Self::Internal { .. } => ErrorCategory::Internal,
        }
    }
}

/// Error categories for UI display.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Malformed or missing parameter; generation never started.
    Validation,
    /// Unresolved token or malformed template syntax.
    Render,
    /// Resolved destination would leave the root.
    PathEscape,
    /// Destination file exists and the policy refuses to replace it.
    Conflict,
    /// Directory or file write failed.
    Write,
    /// Template source could not be assembled or loaded.
    Template,
    Configuration,
    Internal,
}

/// Convenient result type alias.
pub type StencilResult<T> = Result<T, StencilError>;

/// A generation run that stopped early.
///
/// Carries the offending entry (when the failure belongs to one), the cause,
/// and the manifest of files already handled. Nothing is rolled back: every
/// file in `partial` is on disk.
#[derive(Debug, Clone)]
pub struct GenerationFailure {
    pub entry: Option<RelativePath>,
    pub error: StencilError,
    pub partial: GenerationManifest,
}

impl GenerationFailure {
    pub fn new(entry: Option<RelativePath>, error: StencilError, partial: GenerationManifest) -> Self {
        Self {
            entry,
            error,
            partial,
        }
    }

    pub fn category(&self) -> ErrorCategory {
        self.error.category()
    }

    pub fn suggestions(&self) -> Vec<String> {
        let mut out = self.error.suggestions();
        let written = self.partial.written().count();
        if written > 0 {
            out.push(format!(
                "{} file(s) were written to {} before the failure",
                written,
                self.partial.root().display()
            ));
        }
        out
    }
}

impl fmt::Display for GenerationFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.entry {
            Some(entry) => write!(f, "generation failed at '{}': {}", entry, self.error),
            None => write!(f, "generation failed: {}", self.error),
        }
    }
}

impl std::error::Error for GenerationFailure {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.error)
    }
}
