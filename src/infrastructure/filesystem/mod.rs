pub mod project_manifest_store;

pub use project_manifest_store::{ProjectManifestStore, ProjectManifestStoreError};
