//! Workflow and step definitions

use indexmap::IndexMap;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};
use serde_yaml::Value;

/// One entry in a workflow's `steps` sequence
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
pub struct Step {
    /// Registry key of the command to run (expandable)
    pub command: String,

    /// Text shown before the step runs (expandable)
    #[serde(default)]
    pub display_name: Option<String>,

    /// Command-specific inputs, interpreted only by the command
    #[serde(default)]
    pub inputs: Value,
}

impl Step {
    /// Create a step with no inputs
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            display_name: None,
            inputs: Value::Null,
        }
    }

    /// Look up a raw input value; absent and `null` inputs are both `None`
    pub fn input(&self, name: &str) -> Option<&Value> {
        self.inputs.get(name).filter(|v| !v.is_null())
    }
}

/// A parsed workflow document
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
pub struct WorkflowDefinition {
    /// Parameter defaults, bound in document order
    #[serde(default, deserialize_with = "scalar_map")]
    pub parameters: IndexMap<String, String>,

    /// Steps, executed in document order
    pub steps: Vec<Step>,

    /// Exported name -> variable read from the final store (nested runs only)
    #[serde(default)]
    pub outputs: IndexMap<String, String>,
}

impl WorkflowDefinition {
    /// Check whether a parameter is declared
    pub fn declares(&self, parameter: &str) -> bool {
        self.parameters.contains_key(parameter)
    }
}

/// Text form of a YAML scalar; `None` for sequences, mappings and tagged values
pub fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => Some(String::new()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(n.to_string()),
        Value::String(s) => Some(s.clone()),
        Value::Sequence(_) | Value::Mapping(_) | Value::Tagged(_) => None,
    }
}

fn scalar_map<'de, D>(deserializer: D) -> Result<IndexMap<String, String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<IndexMap<String, Value>>::deserialize(deserializer)?.unwrap_or_default();
    raw.into_iter()
        .map(|(name, value)| match scalar_text(&value) {
            Some(text) => Ok((name, text)),
            None => Err(D::Error::custom(format!(
                "parameter '{}' must be a scalar",
                name
            ))),
        })
        .collect()
}
