//! # reposync - Deterministic Git Working Copy Sync
//!
//! `reposync` brings a local git working copy in line with a remote branch by
//! running a fixed sequence of git commands in a sanitized environment, and
//! reports whether the merge succeeded, hit a conflict, or could not run.
//!
//! ## Features
//!
//! - **Sanitized Environment**: git always runs with a trusted `PATH`, an
//!   identity (`HOME`, `USER`) and an explicit allow-list of other variables
//! - **Fixed Pipeline**: `status`, `reset --hard HEAD`, `clean -fd`,
//!   `fetch <remote> <branch>`, `pull <remote> <branch>`, then a final `status`
//! - **Argument Vectors Only**: no step is ever passed through a shell
//! - **Structured Outcome**: success, conflict and tool failure are distinct
//!   values, with every step's output kept in a [`SyncReport`]
//! - **Manifest Scan**: read-only check that files are referenced by an Xcode
//!   `project.pbxproj`
//!
//! ## Quick Start
//!
//! ```bash
//! # Discard local changes and merge origin/main
//! reposync -C path/to/checkout sync --discard-local-changes
//!
//! # Another remote and branch, machine-readable report
//! reposync sync --discard-local-changes --remote upstream --branch develop --output json
//! ```
//!
//! ## Architecture
//!
//! The crate is organized using clean architecture principles:
//!
//! - [`domain`]: Steps, outcomes, reports and validated names
//! - [`application`]: Environment building and the sync and scan use cases
//! - [`infrastructure`]: Process execution, git and manifest access
//! - [`presentation`]: CLI interface and user interaction
//! - [`common`]: Shared error handling
//!
//! ## Error Handling
//!
//! - [`common::error::RepoSyncError`]: Main error type with detailed context
//! - [`common::result::RepoSyncResult`]: Type alias for `Result<T, RepoSyncError>`
//!
//! A sync that runs returns a report even when git fails; `Err` is reserved
//! for configurations that are rejected before anything is executed.
//!
//! ## Examples
//!
//! ```rust,no_run
//! use reposync::application::use_cases::sync_working_copy::{
//!     NoOpProgress, SyncWorkingCopyConfig, SyncWorkingCopyUseCase,
//! };
//! use reposync::domain::value_objects::working_directory::WorkingDirectory;
//! use reposync::infrastructure::GitScm;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let config = SyncWorkingCopyConfig::new(WorkingDirectory::new("/srv/checkout")?)
//!     .with_discard_local_changes(true);
//!
//! let use_case = SyncWorkingCopyUseCase::new(config, GitScm::new());
//! let report = use_case.execute(std::env::vars(), &mut NoOpProgress).await?;
//!
//! println!("{}: {} steps", report.outcome, report.steps.len());
//! # Ok(())
//! # }
//! ```

#![deny(rustdoc::broken_intra_doc_links)]

pub mod application;
pub mod common;
pub mod domain;
pub mod infrastructure;
pub mod presentation;

pub use crate::common::error::RepoSyncError;
pub use crate::common::result::RepoSyncResult as Result;
pub use crate::domain::entities::sync_outcome::{SyncOutcome, SyncReport};
