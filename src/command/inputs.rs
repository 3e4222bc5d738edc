//! Typed access to a step's `inputs`

use super::Runtime;
use crate::config::{Step, ToolError, scalar_text};
use crate::template::{TemplateEngine, Variables};
use indexmap::IndexMap;
use serde_yaml::Value;

/// Reads a step's inputs, expanding every scalar against the variable store
///
/// Absent (or `null`) inputs come back as `None`; only `required` turns
/// absence into an error.
pub struct StepInputs<'a> {
    step: &'a Step,
    templates: TemplateEngine,
}

impl<'a> StepInputs<'a> {
    pub fn new(rt: &Runtime<'_>, step: &'a Step) -> Self {
        Self {
            step,
            templates: rt.templates,
        }
    }

    /// An optional scalar input
    pub fn string(&self, name: &str, vars: &Variables) -> Result<Option<String>, ToolError> {
        let Some(value) = self.step.input(name) else {
            return Ok(None);
        };
        let text = scalar_text(value).ok_or_else(|| self.shape_error(name, "a scalar"))?;
        Ok(Some(self.templates.expand(&text, vars)?))
    }

    /// A required scalar input
    pub fn required(&self, name: &str, vars: &Variables) -> Result<String, ToolError> {
        self.string(name, vars)?.ok_or_else(|| {
            ToolError::usage(format!(
                "'{}' step is missing required input '{}'",
                self.step.command, name
            ))
        })
    }

    /// An optional sequence of scalars
    pub fn list(&self, name: &str, vars: &Variables) -> Result<Option<Vec<String>>, ToolError> {
        let Some(value) = self.step.input(name) else {
            return Ok(None);
        };
        let Value::Sequence(items) = value else {
            return Err(self.shape_error(name, "a sequence"));
        };

        items
            .iter()
            .map(|item| {
                let text = scalar_text(item)
                    .ok_or_else(|| self.shape_error(name, "a sequence of scalars"))?;
                Ok(self.templates.expand(&text, vars)?)
            })
            .collect::<Result<Vec<_>, ToolError>>()
            .map(Some)
    }

    /// An optional mapping of scalars; values are expanded, keys are not
    pub fn map(
        &self,
        name: &str,
        vars: &Variables,
    ) -> Result<Option<IndexMap<String, String>>, ToolError> {
        let Some(value) = self.step.input(name) else {
            return Ok(None);
        };
        let Value::Mapping(entries) = value else {
            return Err(self.shape_error(name, "a mapping"));
        };

        let mut result = IndexMap::new();
        for (key, value) in entries {
            let (Some(key), Some(text)) = (scalar_text(key), scalar_text(value)) else {
                return Err(self.shape_error(name, "a mapping of scalars"));
            };
            result.insert(key, self.templates.expand(&text, vars)?);
        }
        Ok(Some(result))
    }

    fn shape_error(&self, name: &str, expected: &str) -> ToolError {
        ToolError::usage(format!(
            "input '{}' of '{}' step must be {}",
            name, self.step.command, expected
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::testing::capturing_context;
    use crate::command::Registry;
    use crate::config::{ErrorClass, ToolConfig};

    fn step(yaml: &str) -> Step {
        serde_yaml::from_str(yaml).unwrap()
    }

    #[test]
    fn test_scalar_inputs() {
        let registry = Registry::builtin();
        let config = ToolConfig::default();
        let (ctx, _) = capturing_context(false);
        let rt = Runtime::new(&ctx, &registry, &config);

        let s = step("command: x\ninputs:\n  file: ${{ dir }}/sbom.json\n  count: 3\n");
        let inputs = StepInputs::new(&rt, &s);
        let vars: Variables = [("dir", "out")].into_iter().collect();

        assert_eq!(
            inputs.string("file", &vars).unwrap(),
            Some("out/sbom.json".into())
        );
        assert_eq!(inputs.required("count", &vars).unwrap(), "3");
        assert_eq!(inputs.string("absent", &vars).unwrap(), None);

        let err = inputs.required("absent", &vars).unwrap_err();
        assert_eq!(err.class(), ErrorClass::Usage);
        assert!(err.to_string().contains("'absent'"));
    }

    #[test]
    fn test_list_and_map_inputs() {
        let registry = Registry::builtin();
        let config = ToolConfig::default();
        let (ctx, _) = capturing_context(false);
        let rt = Runtime::new(&ctx, &registry, &config);

        let s = step(
            r#"
command: x
inputs:
  arguments: ["--version", "${{ flag }}"]
  parameters:
    name: ${{ flag }}
    other: plain
  wrong: scalar
"#,
        );
        let inputs = StepInputs::new(&rt, &s);
        let vars: Variables = [("flag", "-q")].into_iter().collect();

        assert_eq!(
            inputs.list("arguments", &vars).unwrap(),
            Some(vec!["--version".to_string(), "-q".to_string()])
        );
        let map = inputs.map("parameters", &vars).unwrap().unwrap();
        assert_eq!(map["name"], "-q");
        assert_eq!(map["other"], "plain");

        assert!(inputs.list("wrong", &vars).is_err());
        assert!(inputs.map("wrong", &vars).is_err());
        assert!(inputs.string("arguments", &vars).is_err());
    }

    #[test]
    fn test_missing_variable_in_input() {
        let registry = Registry::builtin();
        let config = ToolConfig::default();
        let (ctx, _) = capturing_context(false);
        let rt = Runtime::new(&ctx, &registry, &config);

        let s = step("command: x\ninputs:\n  value: ${{ missing }}\n");
        let err = StepInputs::new(&rt, &s)
            .string("value", &Variables::new())
            .unwrap_err();
        assert_eq!(err.class(), ErrorClass::MissingVariable);
    }
}
