use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;
use validator::Validate;

use crate::domain::value_objects::process_environment::ProcessEnvironment;

/// Search path every git invocation runs with
pub const TRUSTED_PATH: &str = "/usr/bin:/bin:/usr/local/bin";

/// HOME used when the ambient environment has none
pub const DEFAULT_HOME: &str = "/";

/// USER used when the ambient environment has none
pub const DEFAULT_USER: &str = "nobody";

/// Git variables that are passed through when the caller has them set
pub const DEFAULT_ALLOW_LIST: [&str; 4] = [
    "GIT_EDITOR",
    "GIT_PAGER",
    "GIT_CONFIG_GLOBAL",
    "GIT_CONFIG_SYSTEM",
];

const BASELINE: [&str; 3] = ["PATH", "HOME", "USER"];

/// What the sanitized environment is built from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct EnvironmentPolicy {
    /// Replaces the caller's PATH outright
    #[validate(length(min = 1))]
    pub trusted_path: String,

    #[validate(length(min = 1))]
    pub default_home: String,

    #[validate(length(min = 1))]
    pub default_user: String,

    /// Variables copied verbatim from the ambient environment when present
    pub allow_list: Vec<String>,
}

impl Default for EnvironmentPolicy {
    fn default() -> Self {
        Self {
            trusted_path: TRUSTED_PATH.to_string(),
            default_home: DEFAULT_HOME.to_string(),
            default_user: DEFAULT_USER.to_string(),
            allow_list: DEFAULT_ALLOW_LIST.iter().map(|name| name.to_string()).collect(),
        }
    }
}

impl EnvironmentPolicy {
    pub fn with_trusted_path(mut self, trusted_path: impl Into<String>) -> Self {
        self.trusted_path = trusted_path.into();
        self
    }

    pub fn with_default_home(mut self, home: impl Into<String>) -> Self {
        self.default_home = home.into();
        self
    }

    pub fn with_default_user(mut self, user: impl Into<String>) -> Self {
        self.default_user = user.into();
        self
    }

    pub fn with_allow_list<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.allow_list = names.into_iter().map(Into::into).collect();
        self
    }

    /// Entries of `trusted_path` that are not absolute directories
    pub fn relative_path_entries(&self) -> Vec<&str> {
        self.trusted_path
            .split(':')
            .filter(|entry| !entry.starts_with('/'))
            .collect()
    }
}

/// Builds the [`ProcessEnvironment`] for a sync run
#[derive(Debug, Clone, Default)]
pub struct EnvironmentBuilder {
    policy: EnvironmentPolicy,
}

impl EnvironmentBuilder {
    pub fn new(policy: EnvironmentPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &EnvironmentPolicy {
        &self.policy
    }

    /// Build the environment from explicitly supplied ambient variables.
    ///
    /// When a name occurs more than once in `ambient`, the last value wins.
    /// Allow-list entries for PATH, HOME or USER are ignored so the baseline
    /// cannot be overridden.
    pub fn build<I, K, V>(&self, ambient: I) -> ProcessEnvironment
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let ambient: BTreeMap<String, String> = ambient
            .into_iter()
            .map(|(name, value)| (name.into(), value.into()))
            .collect();

        let mut variables = BTreeMap::new();
        variables.insert("PATH".to_string(), self.policy.trusted_path.clone());
        variables.insert(
            "HOME".to_string(),
            ambient
                .get("HOME")
                .cloned()
                .unwrap_or_else(|| self.policy.default_home.clone()),
        );
        variables.insert(
            "USER".to_string(),
            ambient
                .get("USER")
                .cloned()
                .unwrap_or_else(|| self.policy.default_user.clone()),
        );

        for name in &self.policy.allow_list {
            if BASELINE.contains(&name.as_str()) {
                continue;
            }
            if let Some(value) = ambient.get(name) {
                variables.insert(name.clone(), value.clone());
            }
        }

        debug!(
            variables = ?variables.keys().collect::<Vec<_>>(),
            "built sanitized process environment"
        );

        ProcessEnvironment::from_variables(variables)
    }
}
