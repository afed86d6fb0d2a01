use std::collections::BTreeMap;

/// Immutable set of environment variables handed to every git invocation.
///
/// Built once per run by
/// [`EnvironmentBuilder`](crate::application::services::environment_builder::EnvironmentBuilder);
/// there is no API to change it afterwards. Child processes receive exactly
/// these variables and nothing from the ambient environment.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ProcessEnvironment {
    variables: BTreeMap<String, String>,
}

impl ProcessEnvironment {
    pub(crate) fn from_variables(variables: BTreeMap<String, String>) -> Self {
        Self { variables }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.variables.get(name).map(String::as_str)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.variables.contains_key(name)
    }

    /// Variables in name order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.variables
            .iter()
            .map(|(name, value)| (name.as_str(), value.as_str()))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.variables.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.variables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.variables.is_empty()
    }
}
