use crate::common::error::RepoSyncError;

/// Result alias used across the crate.
///
/// # Examples
///
/// ```
/// use reposync::common::result::RepoSyncResult;
/// use reposync::common::error::RepoSyncError;
///
/// fn example_function() -> RepoSyncResult<String> {
///     Ok("success".to_string())
/// }
///
/// fn example_with_error() -> RepoSyncResult<()> {
///     Err(RepoSyncError::validation_error("branch", "must not be empty", None))
/// }
/// ```
pub type RepoSyncResult<T> = Result<T, RepoSyncError>;
