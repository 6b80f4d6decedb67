//! Application layer errors.
//!
//! These errors represent failures in orchestration and I/O, not business
//! rules. Business rule violations are `DomainError` from `crate::domain`.

use std::path::PathBuf;
use thiserror::Error;

use crate::error::ErrorCategory;

/// Errors that occur while loading templates or writing the output tree.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ApplicationError {
    /// Creating a directory or writing a file failed.
    #[error("Filesystem error at {path}: {reason}")]
    FilesystemError { path: PathBuf, reason: String },

    /// A file exists at the destination and the conflict policy forbids
    /// replacing it.
    #[error("File already exists at {path}")]
    FileExists { path: PathBuf },

    /// The renderer adapter rejected an entry for a non-grammar reason.
    #[error("Template rendering failed for {path}: {reason}")]
    RenderingFailed { path: String, reason: String },

    /// A template directory could not be read.
    #[error("Failed to load templates from {path}: {reason}")]
    TemplateLoad { path: PathBuf, reason: String },

    /// Shared adapter state was poisoned by a panicking thread.
    #[error("Adapter state lock poisoned")]
    LockPoisoned,
}

impl ApplicationError {
    /// Get user-actionable suggestions.
    pub fn suggestions(&self) -> Vec<String> {
        match self {
            Self::FilesystemError { path, .. } => vec![
                format!("Failed to access: {}", path.display()),
                "Check that you have write permissions".into(),
                "Files written before the failure are left in place".into(),
            ],
            Self::FileExists { path } => vec![
                format!("File already exists: {}", path.display()),
                "Use --force to overwrite existing files".into(),
                "Use --skip-existing to keep them".into(),
                "Or choose an empty output directory".into(),
            ],
            Self::TemplateLoad { path, .. } => vec![
                format!("Check that {} exists and is readable", path.display()),
                "Omit --template-dir to use the bundled templates".into(),
            ],
            Self::LockPoisoned => vec!["A previous operation panicked; retry in a new process".into()],
            Self::RenderingFailed { .. } => vec!["Check the template entry named above".into()],
        }
    }

    /// Get error category.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::FilesystemError { .. } => ErrorCategory::Write,
            Self::FileExists { .. } => ErrorCategory::Conflict,
            Self::RenderingFailed { .. } => ErrorCategory::Render,
            Self::TemplateLoad { .. } => ErrorCategory::Template,
            Self::LockPoisoned => ErrorCategory::Internal,
        }
    }
}
