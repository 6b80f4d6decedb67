use super::DomainError;
use std::fmt;
use std::path::{Component, Path, PathBuf};

/// A `/`-separated filesystem path guaranteed to be relative.
///
/// Invariant: never absolute, never empty. Enforced at construction.
/// Backslashes are normalised to `/`, and empty or `.` segments are dropped
/// so two spellings of the same path compare equal. `..` segments are kept:
/// whether a path escapes its root is decided by [`RelativePath::ensure_contained`]
/// at the point where it is joined onto a destination.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RelativePath(String);

impl RelativePath {
    /// Panicking constructor for test fixtures.
    #[cfg(test)]
    pub fn new(path: impl AsRef<str>) -> Self {
        let path = path.as_ref();
        match Self::try_new(path) {
            Ok(p) => p,
            Err(e) => panic!("invalid RelativePath {:?}: {}", path, e),
        }
    }

    /// Fallible constructor.
    pub fn try_new(path: impl AsRef<str>) -> Result<Self, DomainError> {
        let raw = path.as_ref();
        let unified = raw.replace('\\', "/");

        if unified.starts_with('/') || has_root_or_prefix(Path::new(raw)) {
            return Err(DomainError::AbsolutePathNotAllowed {
                path: raw.to_string(),
            });
        }

        let normalised = unified
            .split('/')
            .filter(|s| !s.is_empty() && *s != ".")
            .collect::<Vec<_>>()
            .join("/");

        if normalised.is_empty() {
            return Err(DomainError::InvalidTemplate(format!(
                "empty relative path '{raw}'"
            )));
        }

        Ok(Self(normalised))
    }

    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.0.split('/')
    }

    /// Final segment.
    pub fn file_name(&self) -> &str {
        self.0.rsplit('/').next().unwrap_or(&self.0)
    }

    /// Whether the final segment ends with `suffix` and has a non-empty stem.
    pub fn has_suffix(&self, suffix: &str) -> bool {
        !suffix.is_empty()
            && self.file_name().len() > suffix.len()
            && self.file_name().ends_with(suffix)
    }

    /// Remove `suffix` from the final segment, if present.
    pub fn strip_suffix(&self, suffix: &str) -> Self {
        if self.has_suffix(suffix) {
            Self(self.0[..self.0.len() - suffix.len()].to_string())
        } else {
            self.clone()
        }
    }

    /// Drop every directory segment equal to `name`. The final segment is
    /// never removed.
    pub fn without_directory(&self, name: &str) -> Self {
        let segments: Vec<&str> = self.segments().collect();
        let Some((last, dirs)) = segments.split_last() else {
            return self.clone();
        };
        let mut kept: Vec<&str> = dirs.iter().copied().filter(|s| *s != name).collect();
        kept.push(*last);
        Self(kept.join("/"))
    }

    /// Fail with [`DomainError::PathEscape`] if any segment is `..`.
    pub fn ensure_contained(&self) -> Result<(), DomainError> {
        if self.segments().any(|s| s == "..") {
            return Err(DomainError::PathEscape {
                path: self.0.clone(),
            });
        }
        Ok(())
    }

    pub fn as_path(&self) -> &Path {
        Path::new(&self.0)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_path_buf(self) -> PathBuf {
        PathBuf::from(self.0)
    }
}

fn has_root_or_prefix(path: &Path) -> bool {
    path.is_absolute()
        || path
            .components()
            .any(|c| matches!(c, Component::RootDir | Component::Prefix(_)))
}

impl AsRef<Path> for RelativePath {
    fn as_ref(&self) -> &Path {
        self.as_path()
    }
}

impl fmt::Display for RelativePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl serde::Serialize for RelativePath {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}
