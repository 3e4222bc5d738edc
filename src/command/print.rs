//! `print` - write text to the output

use super::{Command, CommandEntry, Runtime, StepInputs};
use crate::config::{Step, ToolError};
use crate::template::Variables;
use async_trait::async_trait;

pub(super) fn entry() -> CommandEntry {
    CommandEntry {
        name: "print",
        usage: "print [text]",
        summary: "Print text to the console",
        details: "\
This command prints text to the console.

From the command-line this is used as:
  sbom-tool print [text]

From a YAML file this is used as:
  - command: print
    inputs:
      text:
      - Some text to print
      - The value of variable is ${{ variable }}",
        command: Box::new(Print),
    }
}

struct Print;

#[async_trait]
impl Command for Print {
    async fn run_cli(&self, rt: &Runtime<'_>, args: &[String]) -> Result<(), ToolError> {
        rt.context.write_line(args.join(" "));
        Ok(())
    }

    async fn run_step(
        &self,
        rt: &Runtime<'_>,
        step: &Step,
        variables: &mut Variables,
    ) -> Result<(), ToolError> {
        let lines = StepInputs::new(rt, step)
            .list("text", variables)?
            .unwrap_or_default();

        for line in lines {
            rt.context.write_line(line);
        }
        Ok(())
    }
}
