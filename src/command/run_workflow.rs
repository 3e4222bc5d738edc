//! `run-workflow` - execute a workflow, top-level or nested

use super::{Command, CommandEntry, Runtime, StepInputs};
use crate::config::{Step, ToolError};
use crate::template::Variables;
use crate::workflow::WorkflowRunner;
use async_trait::async_trait;
use indexmap::IndexMap;

pub(super) fn entry() -> CommandEntry {
    CommandEntry {
        name: "run-workflow",
        usage: "run-workflow <file-or-url> [--integrity <sha256>] [name=value ...]",
        summary: "Run a workflow file or URL",
        details: "\
This command runs the steps of a workflow file or URL.

From the command-line this is used as:
  sbom-tool run-workflow <file-or-url> [--integrity <sha256>] [name=value ...]

From a YAML file this is used as:
  - command: run-workflow
    inputs:
      file: <file>           # Workflow file (or use url)
      url: <url>             # Workflow URL (or use file)
      integrity: <sha256>    # Optional expected SHA-256 of the workflow
      parameters:            # Optional parameters for the workflow
        name: <value>
      outputs:               # Optional outputs to copy back
        <exported>: <variable>",
        command: Box::new(RunWorkflow),
    }
}

struct RunWorkflow;

/// Parsed command-line arguments
#[derive(Debug, PartialEq)]
struct CliArgs {
    location: String,
    integrity: Option<String>,
    parameters: IndexMap<String, String>,
}

impl CliArgs {
    fn parse(args: &[String]) -> Result<Self, ToolError> {
        let mut location = None;
        let mut integrity = None;
        let mut parameters = IndexMap::new();

        let mut iter = args.iter();
        while let Some(arg) = iter.next() {
            if arg == "--integrity" {
                let value = iter
                    .next()
                    .ok_or_else(|| ToolError::usage("'--integrity' requires a value"))?;
                integrity = Some(value.clone());
            } else if location.is_none() {
                location = Some(arg.clone());
            } else if let Some((name, value)) = arg.split_once('=') {
                parameters.insert(name.to_string(), value.to_string());
            } else {
                return Err(ToolError::usage(format!(
                    "invalid parameter '{}', expected name=value",
                    arg
                )));
            }
        }

        let location = location
            .ok_or_else(|| ToolError::usage("'run-workflow' requires a workflow file or URL"))?;
        Ok(Self {
            location,
            integrity,
            parameters,
        })
    }
}

#[async_trait]
impl Command for RunWorkflow {
    async fn run_cli(&self, rt: &Runtime<'_>, args: &[String]) -> Result<(), ToolError> {
        let args = CliArgs::parse(args)?;
        let run = WorkflowRunner::new(*rt)
            .run(&args.location, args.integrity.as_deref(), &args.parameters)
            .await?;

        if !run.variables.is_empty() {
            rt.context
                .write_verbose(format!("Variables of '{}':", run.source));
        }
        for (name, value) in run.variables.iter() {
            rt.context.write_verbose(format!("{} = {}", name, value));
        }
        Ok(())
    }

    async fn run_step(
        &self,
        rt: &Runtime<'_>,
        step: &Step,
        variables: &mut Variables,
    ) -> Result<(), ToolError> {
        let inputs = StepInputs::new(rt, step);
        let location = match (
            inputs.string("file", variables)?,
            inputs.string("url", variables)?,
        ) {
            (Some(file), None) => file,
            (None, Some(url)) if url.starts_with("http://") || url.starts_with("https://") => url,
            (None, Some(url)) => {
                return Err(ToolError::usage(format!(
                    "'run-workflow' url '{}' must be http or https",
                    url
                )));
            }
            _ => {
                return Err(ToolError::usage(
                    "'run-workflow' step requires exactly one of 'file' or 'url'",
                ));
            }
        };
        let integrity = inputs.string("integrity", variables)?;
        let parameters = inputs.map("parameters", variables)?.unwrap_or_default();
        let outputs = inputs.map("outputs", variables)?.unwrap_or_default();

        let nested = rt.nested()?;
        let run = WorkflowRunner::new(nested)
            .run(&location, integrity.as_deref(), &parameters)
            .await
            .map_err(|e| ToolError::Nested {
                source_id: location.clone(),
                message: e.to_string(),
            })?;

        let exported = run.exported_outputs()?;
        let mut assignments = Vec::with_capacity(outputs.len());
        for (export, destination) in outputs {
            let value = exported
                .get(&export)
                .ok_or(ToolError::MissingOutput { name: export })?;
            assignments.push((destination, value.clone()));
        }

        for (destination, value) in assignments {
            tracing::debug!(variable = %destination, "Setting workflow output");
            variables.set(destination, value);
        }
        Ok(())
    }
}
