//! Variable store threaded through one workflow invocation

use std::collections::BTreeMap;

/// Name/value scope for a single workflow invocation
///
/// Each invocation owns a fresh store; nested workflows get their own and
/// only hand values back through declared outputs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Variables {
    values: BTreeMap<String, String>,
}

impl Variables {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a variable
    pub fn get(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }

    /// Set a variable, replacing any previous value
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.values.insert(name.into(), value.into());
    }

    /// Check whether a variable is defined
    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Iterate over variables in name order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Known variable names, for error suggestions
    pub fn names(&self) -> Vec<&str> {
        self.values.keys().map(String::as_str).collect()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Variables {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut variables = Self::new();
        for (name, value) in iter {
            variables.set(name, value);
        }
        variables
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_and_get() {
        let mut vars = Variables::new();
        assert!(vars.is_empty());

        vars.set("version", "1.2.3");
        assert_eq!(vars.get("version"), Some("1.2.3"));
        assert!(vars.contains("version"));
        assert_eq!(vars.get("missing"), None);

        vars.set("version", "2.0.0");
        assert_eq!(vars.get("version"), Some("2.0.0"));
        assert_eq!(vars.len(), 1);
    }

    #[test]
    fn test_iter_is_name_ordered() {
        let vars: Variables = [("b", "2"), ("a", "1")].into_iter().collect();
        let names: Vec<_> = vars.iter().map(|(k, _)| k).collect();
        assert_eq!(names, vec!["a", "b"]);
        assert_eq!(vars.names(), vec!["a", "b"]);
    }
}
