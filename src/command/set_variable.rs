//! `set-variable` - assign a workflow variable

use super::{Command, CommandEntry, Runtime, StepInputs, workflow_only};
use crate::config::{Step, ToolError};
use crate::template::Variables;
use async_trait::async_trait;

const NAME: &str = "set-variable";

pub(super) fn entry() -> CommandEntry {
    CommandEntry {
        name: NAME,
        usage: "set-variable",
        summary: "Set a workflow variable",
        details: "\
This command sets a workflow variable. It is only usable in a workflow.

From a YAML file this is used as:
  - command: set-variable
    inputs:
      value: <value>         # New value
      output: <variable>     # Variable to set",
        command: Box::new(SetVariable),
    }
}

struct SetVariable;

#[async_trait]
impl Command for SetVariable {
    async fn run_cli(&self, _rt: &Runtime<'_>, _args: &[String]) -> Result<(), ToolError> {
        Err(workflow_only(NAME))
    }

    async fn run_step(
        &self,
        rt: &Runtime<'_>,
        step: &Step,
        variables: &mut Variables,
    ) -> Result<(), ToolError> {
        let inputs = StepInputs::new(rt, step);
        let value = inputs.required("value", variables)?;
        let output = inputs.required("output", variables)?;

        tracing::debug!(
            variable = %output,
            replaced = variables.contains(&output),
            "Setting variable"
        );
        variables.set(output, value);
        Ok(())
    }
}
