use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Branch fetched and merged when the caller does not name one.
pub const DEFAULT_BRANCH: &str = "main";

/// Errors raised while validating a branch name
#[derive(Debug, Error, PartialEq)]
pub enum BranchNameError {
    #[error("Branch name cannot be empty")]
    Empty,

    #[error("Branch name too long: {0} characters (max: 255)")]
    TooLong(usize),

    #[error("Invalid character in branch name: {0:?}")]
    InvalidCharacter(char),

    #[error("Branch name cannot start with '-': {0}")]
    StartsWithHyphen(String),

    #[error("Branch name cannot end with '.lock': {0}")]
    EndsWithLock(String),

    #[error("Branch name contains consecutive dots: {0}")]
    ConsecutiveDots(String),

    #[error("Reserved branch name: {0}")]
    Reserved(String),
}

/// A validated git branch name.
///
/// Branch names end up as a single element of the git argument vector, so
/// anything git could read as an option (a leading `-`) or that git itself
/// refuses in a ref name is rejected up front.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct BranchName {
    name: String,
}

impl BranchName {
    /// Create a validated branch name
    pub fn new(name: &str) -> Result<Self, BranchNameError> {
        Self::validate(name)?;
        Ok(Self {
            name: name.to_string(),
        })
    }

    fn validate(name: &str) -> Result<(), BranchNameError> {
        if name.is_empty() {
            return Err(BranchNameError::Empty);
        }

        if name.len() > 255 {
            return Err(BranchNameError::TooLong(name.len()));
        }

        if name.starts_with('-') {
            return Err(BranchNameError::StartsWithHyphen(name.to_string()));
        }

        if name.ends_with(".lock") {
            return Err(BranchNameError::EndsWithLock(name.to_string()));
        }

        if matches!(name, "HEAD" | "ORIG_HEAD" | "FETCH_HEAD" | "MERGE_HEAD") {
            return Err(BranchNameError::Reserved(name.to_string()));
        }

        // ASCII control characters, space, ~ ^ : ? * [ \ and DEL
        if let Some(ch) = name.chars().find(|ch| {
            ch.is_ascii_control()
                || ch.is_whitespace()
                || matches!(ch, '~' | '^' | ':' | '?' | '*' | '[' | '\\' | '\x7F')
        }) {
            return Err(BranchNameError::InvalidCharacter(ch));
        }

        if name.contains("..") {
            return Err(BranchNameError::ConsecutiveDots(name.to_string()));
        }

        Ok(())
    }

    pub fn as_str(&self) -> &str {
        &self.name
    }
}

impl Default for BranchName {
    fn default() -> Self {
        Self {
            name: DEFAULT_BRANCH.to_string(),
        }
    }
}

impl fmt::Display for BranchName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

impl FromStr for BranchName {
    type Err = BranchNameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for BranchName {
    type Error = BranchNameError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(&value)
    }
}

impl From<BranchName> for String {
    fn from(branch: BranchName) -> Self {
        branch.name
    }
}

impl AsRef<str> for BranchName {
    fn as_ref(&self) -> &str {
        &self.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_branch_names() {
        for name in ["main", "develop", "feature/login", "release-1.2", "v2.0.1"] {
            let branch = BranchName::new(name).unwrap();
            assert_eq!(branch.as_str(), name);
        }
    }

    #[test]
    fn test_default_branch_is_main() {
        assert_eq!(BranchName::default().as_str(), "main");
    }

    #[test]
    fn test_rejects_option_like_names() {
        assert_eq!(
            BranchName::new("--upload-pack=evil"),
            Err(BranchNameError::StartsWithHyphen(
                "--upload-pack=evil".to_string()
            ))
        );
    }

    #[test]
    fn test_rejects_invalid_characters() {
        assert_eq!(
            BranchName::new("main; rm -rf /"),
            Err(BranchNameError::InvalidCharacter(' '))
        );
        assert_eq!(
            BranchName::new("a b"),
            Err(BranchNameError::InvalidCharacter(' '))
        );
        assert_eq!(
            BranchName::new("topic~1"),
            Err(BranchNameError::InvalidCharacter('~'))
        );
        assert_eq!(
            BranchName::new("line\nbreak"),
            Err(BranchNameError::InvalidCharacter('\n'))
        );
    }

    #[test]
    fn test_rejects_structural_problems() {
        assert_eq!(BranchName::new(""), Err(BranchNameError::Empty));
        assert_eq!(
            BranchName::new("topic.lock"),
            Err(BranchNameError::EndsWithLock("topic.lock".to_string()))
        );
        assert_eq!(
            BranchName::new("a..b"),
            Err(BranchNameError::ConsecutiveDots("a..b".to_string()))
        );
        assert_eq!(
            BranchName::new("HEAD"),
            Err(BranchNameError::Reserved("HEAD".to_string()))
        );
        assert_eq!(
            BranchName::new(&"x".repeat(256)),
            Err(BranchNameError::TooLong(256))
        );
    }

    #[test]
    fn test_from_str_and_display() {
        let branch: BranchName = "feature/x".parse().unwrap();
        assert_eq!(branch.to_string(), "feature/x");
    }
}
