use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Which expected files a project manifest references
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanReport {
    pub manifest_path: PathBuf,

    /// Every file name the manifest registers, sorted
    pub registered: Vec<String>,

    /// Expected files whose name is registered
    pub present: Vec<String>,

    /// Expected files whose name is not registered
    pub missing: Vec<String>,
}

impl ScanReport {
    pub fn is_complete(&self) -> bool {
        self.missing.is_empty()
    }
}
