//! SCM (Source Control Management) operations infrastructure
//!
//! The sync pipeline talks to version control only through
//! [`ScmOperations`]; [`GitScm`] drives the `git` executable.

pub mod git_scm;
pub mod scm_interface;

pub use git_scm::GitScm;
pub use scm_interface::{InvocationContext, ScmError, ScmOperations};
