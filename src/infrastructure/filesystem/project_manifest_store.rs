use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::fs as async_fs;
use walkdir::WalkDir;

/// File name suffix of Xcode project manifests
pub const PROJECT_MANIFEST_EXTENSION: &str = "pbxproj";

/// How deep below a directory a manifest is searched for
const SEARCH_DEPTH: usize = 3;

#[derive(Debug, Error)]
pub enum ProjectManifestStoreError {
    #[error("Project manifest not found at path: {}", .0.display())]
    NotFound(PathBuf),

    #[error("No *.pbxproj file below: {}", .0.display())]
    NoManifestInDirectory(PathBuf),

    #[error("Project manifest read failed for {}: {source}", path.display())]
    ReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Read-only access to project manifests on disk
#[derive(Debug, Default)]
pub struct ProjectManifestStore;

impl ProjectManifestStore {
    pub fn new() -> Self {
        Self
    }

    /// Resolve `path` to a manifest file.
    ///
    /// A file is returned as is. For a directory, the first
    /// `*.pbxproj` in path order within a few levels is chosen.
    pub fn locate(&self, path: &Path) -> Result<PathBuf, ProjectManifestStoreError> {
        if path.is_file() {
            return Ok(path.to_path_buf());
        }
        if !path.is_dir() {
            return Err(ProjectManifestStoreError::NotFound(path.to_path_buf()));
        }

        WalkDir::new(path)
            .max_depth(SEARCH_DEPTH)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.file_type().is_file())
            .find(|entry| {
                entry.path().extension().and_then(|ext| ext.to_str())
                    == Some(PROJECT_MANIFEST_EXTENSION)
            })
            .map(|entry| entry.into_path())
            .ok_or_else(|| ProjectManifestStoreError::NoManifestInDirectory(path.to_path_buf()))
    }

    pub async fn read(&self, path: &Path) -> Result<String, ProjectManifestStoreError> {
        async_fs::read_to_string(path)
            .await
            .map_err(|source| ProjectManifestStoreError::ReadFailed {
                path: path.to_path_buf(),
                source,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_locate_returns_file_as_is() {
        let temp_dir = TempDir::new().unwrap();
        let file = temp_dir.path().join("custom.txt");
        std::fs::write(&file, "").unwrap();

        assert_eq!(ProjectManifestStore::new().locate(&file).unwrap(), file);
    }

    #[test]
    fn test_locate_searches_directory() {
        let temp_dir = TempDir::new().unwrap();
        let project_dir = temp_dir.path().join("App.xcodeproj");
        std::fs::create_dir_all(&project_dir).unwrap();
        std::fs::write(project_dir.join("project.pbxproj"), "// !$*UTF8*$!").unwrap();
        std::fs::write(temp_dir.path().join("README.md"), "").unwrap();

        let found = ProjectManifestStore::new().locate(temp_dir.path()).unwrap();
        assert_eq!(found, project_dir.join("project.pbxproj"));
    }

    #[test]
    fn test_locate_reports_missing_manifest() {
        let temp_dir = TempDir::new().unwrap();
        let store = ProjectManifestStore::new();

        assert!(matches!(
            store.locate(temp_dir.path()),
            Err(ProjectManifestStoreError::NoManifestInDirectory(_))
        ));
        assert!(matches!(
            store.locate(&temp_dir.path().join("nope.pbxproj")),
            Err(ProjectManifestStoreError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_read_missing_file_fails() {
        let temp_dir = TempDir::new().unwrap();
        let result = ProjectManifestStore::new()
            .read(&temp_dir.path().join("missing.pbxproj"))
            .await;
        assert!(matches!(
            result,
            Err(ProjectManifestStoreError::ReadFailed { .. })
        ));
    }
}
