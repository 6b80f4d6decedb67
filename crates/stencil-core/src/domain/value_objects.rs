//! Value objects shared across the domain.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::error::DomainError;

/// The closed set of parameter names a template may reference.
///
/// Names are matched case-sensitively, exactly as they appear inside
/// substitution tokens (`{{ PluginName }}`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ParamField {
    PluginName,
    PluginNameCap,
    ModulePath,
    AuthorName,
    AuthorEmail,
    Description,
}

impl ParamField {
    /// Every field, in declaration order.
    pub const ALL: [ParamField; 6] = [
        Self::PluginName,
        Self::PluginNameCap,
        Self::ModulePath,
        Self::AuthorName,
        Self::AuthorEmail,
        Self::Description,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::PluginName => "PluginName",
            Self::PluginNameCap => "PluginNameCap",
            Self::ModulePath => "ModulePath",
            Self::AuthorName => "AuthorName",
            Self::AuthorEmail => "AuthorEmail",
            Self::Description => "Description",
        }
    }

    /// Fields a caller must supply.
    pub const fn is_required(self) -> bool {
        matches!(self, Self::PluginName | Self::ModulePath)
    }

    /// Fields computed from other fields and never taken from input.
    pub const fn is_derived(self) -> bool {
        matches!(self, Self::PluginNameCap)
    }
}

impl fmt::Display for ParamField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ParamField {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|field| field.as_str() == s)
            .ok_or_else(|| DomainError::UnknownParameter { name: s.to_string() })
    }
}

/// Unix-style permission bits for a materialized file.
///
/// Only the low nine permission bits are kept; setuid, setgid and sticky bits
/// are never produced by a template.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FileMode(u32);

impl FileMode {
    pub const REGULAR: FileMode = FileMode(0o644);
    pub const EXECUTABLE: FileMode = FileMode(0o755);

    pub const fn new(bits: u32) -> Self {
        Self(bits & 0o777)
    }

    /// Parse an octal string such as `"755"` or `"0o755"`.
    pub fn parse_octal(s: &str) -> Result<Self, DomainError> {
        let digits = s.trim().trim_start_matches("0o");
        u32::from_str_radix(digits, 8)
            .ok()
            .filter(|bits| *bits <= 0o777)
            .map(Self::new)
            .ok_or_else(|| DomainError::InvalidTemplate(format!("invalid file mode '{s}'")))
    }

    pub const fn bits(self) -> u32 {
        self.0
    }

    pub const fn is_executable(self) -> bool {
        self.0 & 0o111 != 0
    }
}

impl Default for FileMode {
    fn default() -> Self {
        Self::REGULAR
    }
}

impl fmt::Display for FileMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04o}", self.0)
    }
}
