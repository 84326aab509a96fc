//! Stable identity of a source file within its source root.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Component, Path, PathBuf};

/// The identity of a source file: its path relative to the source root.
///
/// Components are always joined with `/`, regardless of platform, so that an
/// identity recorded on one machine means the same file on another. Moving the
/// whole source root keeps every identity intact; renaming or relocating a file
/// inside the tree gives it a new identity.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SourceId(String);

/// Error returned when a path cannot be turned into a [`SourceId`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SourceIdError {
    /// The path does not live under the given source root.
    #[error("{path} is not inside source root {root}")]
    OutsideRoot {
        /// The offending path.
        path: PathBuf,
        /// The source root it was resolved against.
        root: PathBuf,
    },

    /// A path component is not valid UTF-8.
    #[error("{0} contains a component that is not valid UTF-8")]
    NonUtf8(PathBuf),

    /// The relative path is empty, absolute, or climbs out with `..`.
    #[error("invalid relative source path '{0}'")]
    Invalid(String),
}

impl SourceId {
    /// Derives the identity of `path` relative to `root`.
    pub fn from_path(root: &Path, path: &Path) -> Result<Self, SourceIdError> {
        let relative = path
            .strip_prefix(root)
            .map_err(|_| SourceIdError::OutsideRoot {
                path: path.to_path_buf(),
                root: root.to_path_buf(),
            })?;

        let mut parts = Vec::new();
        for component in relative.components() {
            match component {
                Component::Normal(part) => {
                    let part = part
                        .to_str()
                        .ok_or_else(|| SourceIdError::NonUtf8(path.to_path_buf()))?;
                    parts.push(part);
                }
                Component::CurDir => {}
                _ => return Err(SourceIdError::Invalid(relative.display().to_string())),
            }
        }
        Self::from_parts(&parts, &relative.display().to_string())
    }

    /// Parses a `/`-separated relative path such as `com/example/Main.java`.
    pub fn parse(relative: &str) -> Result<Self, SourceIdError> {
        let parts: Vec<&str> = relative.split('/').collect();
        Self::from_parts(&parts, relative)
    }

    fn from_parts(parts: &[&str], original: &str) -> Result<Self, SourceIdError> {
        let valid = !parts.is_empty()
            && parts
                .iter()
                .all(|p| !p.is_empty() && *p != "." && *p != ".." && !p.contains('\\'));
        if !valid {
            return Err(SourceIdError::Invalid(original.to_string()));
        }
        Ok(Self(parts.join("/")))
    }

    /// Returns the identity as a `/`-separated string.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the bare file name, e.g. `Main.java`.
    pub fn file_name(&self) -> &str {
        self.0.rsplit('/').next().unwrap_or(&self.0)
    }

    /// Returns the package components leading to the file (empty for the root package).
    pub fn package(&self) -> Vec<&str> {
        let mut parts: Vec<&str> = self.0.split('/').collect();
        parts.pop();
        parts
    }

    /// Converts the identity into a platform path relative to any root.
    pub fn to_relative_path(&self) -> PathBuf {
        self.0.split('/').collect()
    }

    /// Resolves the identity against a root directory.
    pub fn resolve(&self, root: &Path) -> PathBuf {
        root.join(self.to_relative_path())
    }
}

impl fmt::Display for SourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Debug for SourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SourceId({})", self.0)
    }
}

impl TryFrom<String> for SourceId {
    type Error = SourceIdError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<SourceId> for String {
    fn from(id: SourceId) -> Self {
        id.0
    }
}
