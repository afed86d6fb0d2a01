use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Component, Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum WorkingDirectoryError {
    #[error("Working directory path cannot be empty")]
    Empty,

    #[error("Working directory path contains null bytes")]
    ContainsNullBytes,

    #[error("Working directory must be an absolute path: {0}")]
    NotAbsolute(String),
}

/// Absolute path of the working copy a sync run operates on.
///
/// Construction only checks the shape of the path. Whether the directory
/// exists and holds a repository is decided by the orchestrator's preflight,
/// because that outcome has to be reported rather than raised.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WorkingDirectory {
    path: PathBuf,
}

impl WorkingDirectory {
    /// Create from an absolute path
    pub fn new(path: impl AsRef<Path>) -> Result<Self, WorkingDirectoryError> {
        let path = path.as_ref();
        Self::validate_shape(path)?;
        if !path.is_absolute() {
            return Err(WorkingDirectoryError::NotAbsolute(
                path.display().to_string(),
            ));
        }

        Ok(Self {
            path: normalize(path),
        })
    }

    /// Create from a possibly relative path, resolving it against `base`
    pub fn resolve(
        path: impl AsRef<Path>,
        base: impl AsRef<Path>,
    ) -> Result<Self, WorkingDirectoryError> {
        let path = path.as_ref();
        Self::validate_shape(path)?;
        if path.is_absolute() {
            Self::new(path)
        } else {
            Self::new(base.as_ref().join(path))
        }
    }

    fn validate_shape(path: &Path) -> Result<(), WorkingDirectoryError> {
        if path.as_os_str().is_empty() {
            return Err(WorkingDirectoryError::Empty);
        }
        if path.to_string_lossy().contains('\0') {
            return Err(WorkingDirectoryError::ContainsNullBytes);
        }
        Ok(())
    }

    pub fn as_path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    pub fn is_dir(&self) -> bool {
        self.path.is_dir()
    }
}

/// Lexically drop `.` and resolve `..` without touching the filesystem.
fn normalize(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                normalized.pop();
            }
            other => normalized.push(other.as_os_str()),
        }
    }
    normalized
}

impl fmt::Display for WorkingDirectory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.path.display())
    }
}

impl AsRef<Path> for WorkingDirectory {
    fn as_ref(&self) -> &Path {
        &self.path
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_absolute_path_is_accepted() {
        let dir = WorkingDirectory::new("/srv/checkout").unwrap();
        assert_eq!(dir.as_path(), Path::new("/srv/checkout"));
    }

    #[test]
    fn test_relative_path_is_rejected_by_new() {
        assert_eq!(
            WorkingDirectory::new("checkout"),
            Err(WorkingDirectoryError::NotAbsolute("checkout".to_string()))
        );
        assert_eq!(WorkingDirectory::new(""), Err(WorkingDirectoryError::Empty));
    }

    #[test]
    fn test_resolve_joins_and_normalizes() {
        let dir = WorkingDirectory::resolve("./repos/../app", "/home/dev").unwrap();
        assert_eq!(dir.as_path(), Path::new("/home/dev/app"));

        let absolute = WorkingDirectory::resolve("/opt/app", "/home/dev").unwrap();
        assert_eq!(absolute.as_path(), Path::new("/opt/app"));
    }

    #[test]
    fn test_existence_checks() {
        let temp_dir = TempDir::new().unwrap();
        let dir = WorkingDirectory::new(temp_dir.path()).unwrap();
        assert!(dir.exists());
        assert!(dir.is_dir());

        let missing = WorkingDirectory::new(temp_dir.path().join("missing")).unwrap();
        assert!(!missing.exists());
    }
}
