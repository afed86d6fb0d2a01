pub mod scan_project_manifest;
pub mod sync_working_copy;

pub use scan_project_manifest::ScanProjectManifestUseCase;
pub use sync_working_copy::{
    NoOpProgress, SyncProgress, SyncWorkingCopyConfig, SyncWorkingCopyUseCase,
};
