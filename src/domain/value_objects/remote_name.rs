use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;
use thiserror::Error;

/// Remote fetched from when the caller does not name one.
pub const DEFAULT_REMOTE: &str = "origin";

#[derive(Debug, Error, PartialEq)]
pub enum RemoteNameError {
    #[error("Remote name cannot be empty")]
    Empty,

    #[error("Remote name too long: {0} characters (max: 255)")]
    TooLong(usize),

    #[error("Remote name cannot start with '-': {0}")]
    StartsWithHyphen(String),

    #[error("Invalid remote name: {0}")]
    Invalid(String),
}

fn remote_name_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^[A-Za-z0-9_][A-Za-z0-9._/-]*$").expect("remote name pattern is valid")
    })
}

/// Name of a configured git remote such as `origin` or `upstream`.
///
/// Only configured remote names are accepted, never URLs or paths.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RemoteName {
    name: String,
}

impl RemoteName {
    pub fn new(name: &str) -> Result<Self, RemoteNameError> {
        if name.is_empty() {
            return Err(RemoteNameError::Empty);
        }
        if name.len() > 255 {
            return Err(RemoteNameError::TooLong(name.len()));
        }
        if name.starts_with('-') {
            return Err(RemoteNameError::StartsWithHyphen(name.to_string()));
        }
        if !remote_name_pattern().is_match(name) || name.contains("..") || name.ends_with('/') {
            return Err(RemoteNameError::Invalid(name.to_string()));
        }

        Ok(Self {
            name: name.to_string(),
        })
    }

    pub fn as_str(&self) -> &str {
        &self.name
    }
}

impl Default for RemoteName {
    fn default() -> Self {
        Self {
            name: DEFAULT_REMOTE.to_string(),
        }
    }
}

impl fmt::Display for RemoteName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

impl FromStr for RemoteName {
    type Err = RemoteNameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for RemoteName {
    type Error = RemoteNameError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(&value)
    }
}

impl From<RemoteName> for String {
    fn from(remote: RemoteName) -> Self {
        remote.name
    }
}

impl AsRef<str> for RemoteName {
    fn as_ref(&self) -> &str {
        &self.name
    }
}
