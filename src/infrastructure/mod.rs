//! Infrastructure layer modules
//!
//! This layer provides concrete implementations for external system interactions:
//! - SCM operations (the `git` executable, libgit2 for repository checks)
//! - File system access (project manifests)
//! - Process execution (argument-vector command runner)
pub mod filesystem;
pub mod process;
pub mod scm;

// Re-export commonly used types
pub use filesystem::ProjectManifestStore;
pub use process::CommandExecutor;
pub use scm::{GitScm, InvocationContext, ScmError, ScmOperations};
