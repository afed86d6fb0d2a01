use regex::Regex;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use tracing::{debug, info};

use crate::common::error::RepoSyncError;
use crate::common::result::RepoSyncResult;
use crate::domain::entities::scan_report::ScanReport;
use crate::infrastructure::filesystem::{ProjectManifestStore, ProjectManifestStoreError};

/// `<object id> /* <file name>.<ext> */ = {`
fn file_reference_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"(\w+) /\* ([^*/]+\.[A-Za-z0-9]+) \*/ = \{")
            .expect("file reference pattern is valid")
    })
}

/// File names registered in the manifest text, deduplicated and sorted
pub fn registered_file_names(content: &str) -> Vec<String> {
    file_reference_pattern()
        .captures_iter(content)
        .map(|caps| caps[2].trim().to_string())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Read-only check that expected files are referenced by a project manifest
pub struct ScanProjectManifestUseCase {
    store: ProjectManifestStore,
}

impl Default for ScanProjectManifestUseCase {
    fn default() -> Self {
        Self::new(ProjectManifestStore::new())
    }
}

impl ScanProjectManifestUseCase {
    pub fn new(store: ProjectManifestStore) -> Self {
        Self { store }
    }

    /// `manifest` may be the manifest file or a directory containing one.
    /// An expected file counts as present when its file name is registered.
    pub async fn execute(
        &self,
        manifest: &Path,
        expected_files: &[PathBuf],
    ) -> RepoSyncResult<ScanReport> {
        let manifest_path = self.store.locate(manifest).map_err(manifest_error)?;
        let content = self
            .store
            .read(&manifest_path)
            .await
            .map_err(manifest_error)?;

        let registered = registered_file_names(&content);
        debug!(
            manifest = %manifest_path.display(),
            registered = registered.len(),
            "parsed project manifest"
        );

        let (present, missing): (Vec<_>, Vec<_>) = expected_files
            .iter()
            .map(|path| path.display().to_string())
            .zip(expected_files.iter())
            .partition(|(_, path)| {
                path.file_name()
                    .and_then(|name| name.to_str())
                    .map(|name| registered.binary_search_by(|r| r.as_str().cmp(name)).is_ok())
                    .unwrap_or(false)
            });

        let report = ScanReport {
            manifest_path,
            registered,
            present: present.into_iter().map(|(display, _)| display).collect(),
            missing: missing.into_iter().map(|(display, _)| display).collect(),
        };

        info!(
            present = report.present.len(),
            missing = report.missing.len(),
            "project manifest scanned"
        );
        Ok(report)
    }
}

fn manifest_error(error: ProjectManifestStoreError) -> RepoSyncError {
    let path = match &error {
        ProjectManifestStoreError::NotFound(path)
        | ProjectManifestStoreError::NoManifestInDirectory(path)
        | ProjectManifestStoreError::ReadFailed { path, .. } => path.clone(),
    };
    RepoSyncError::manifest_error_with_source(error.to_string(), Some(path), error)
}
