//! `validate-workflow` - load a workflow and check its commands without running it

use super::{Command, CommandEntry, Runtime, StepInputs};
use crate::config::{Step, ToolError};
use crate::template::Variables;
use crate::workflow::{WorkflowSource, loader};
use async_trait::async_trait;

pub(super) fn entry() -> CommandEntry {
    CommandEntry {
        name: "validate-workflow",
        usage: "validate-workflow <file-or-url> [--integrity <sha256>]",
        summary: "Validate a workflow file or URL",
        details: "\
This command loads a workflow and checks that every step names a known
command. No step is executed.

From the command-line this is used as:
  sbom-tool validate-workflow <file-or-url> [--integrity <sha256>]

From a YAML file this is used as:
  - command: validate-workflow
    inputs:
      file: <file>           # Workflow file (or use url)
      url: <url>             # Workflow URL (or use file)
      integrity: <sha256>    # Optional expected SHA-256 of the workflow",
        command: Box::new(ValidateWorkflow),
    }
}

struct ValidateWorkflow;

impl ValidateWorkflow {
    async fn validate(
        rt: &Runtime<'_>,
        location: &str,
        integrity: Option<&str>,
    ) -> Result<(), ToolError> {
        let source = WorkflowSource::parse(location);
        let source_id = source.to_string();
        let client = rt
            .http_client()
            .map_err(|e| e.in_workflow(&source_id, None))?;
        let definition = loader::load(&source, integrity, &client)
            .await
            .map_err(|e| e.in_workflow(&source_id, None))?;

        for (index, step) in definition.steps.iter().enumerate() {
            // Expandable command names can only be checked at run time
            if step.command.contains("${{") {
                continue;
            }
            rt.registry
                .lookup(&step.command)
                .map_err(|e| e.in_workflow(&source_id, Some(index + 1)))?;
        }

        rt.context.write_line(format!(
            "Workflow '{}' is valid ({} steps)",
            source_id,
            definition.steps.len()
        ));
        Ok(())
    }
}

#[async_trait]
impl Command for ValidateWorkflow {
    async fn run_cli(&self, rt: &Runtime<'_>, args: &[String]) -> Result<(), ToolError> {
        match args {
            [location] => Self::validate(rt, location, None).await,
            [location, flag, integrity] if flag == "--integrity" => {
                Self::validate(rt, location, Some(integrity.as_str())).await
            }
            _ => Err(ToolError::usage(
                "usage: validate-workflow <file-or-url> [--integrity <sha256>]",
            )),
        }
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
            (Some(location), None) | (None, Some(location)) => location,
            _ => {
                return Err(ToolError::usage(
                    "'validate-workflow' step requires exactly one of 'file' or 'url'",
                ));
            }
        };
        let integrity = inputs.string("integrity", variables)?;
        Self::validate(rt, &location, integrity.as_deref()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::testing::capturing_context;
    use crate::command::Registry;
    use crate::command::testing::registry_with_recorder;
    use crate::config::{ErrorClass, ToolConfig};
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_valid_workflow() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("wf.yaml");
        std::fs::write(
            &path,
            "steps:\n  - command: record\n  - command: ${{ dynamic }}\n",
        )
        .unwrap();

        let (registry, recorder) = registry_with_recorder();
        let config = ToolConfig::default();
        let (ctx, capture) = capturing_context(false);
        let rt = Runtime::new(&ctx, &registry, &config);

        ValidateWorkflow
            .run_cli(&rt, &[path.display().to_string()])
            .await
            .unwrap();
        assert!(capture.lines()[0].ends_with("is valid (2 steps)"));
        assert!(recorder.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_unknown_command_reported_with_step() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("wf.yaml");
        std::fs::write(&path, "steps:\n  - command: print\n  - command: hsah\n").unwrap();

        let registry = Registry::builtin();
        let config = ToolConfig::default();
        let (ctx, _) = capturing_context(false);
        let rt = Runtime::new(&ctx, &registry, &config);

        let err = ValidateWorkflow
            .run_cli(&rt, &[path.display().to_string()])
            .await
            .unwrap_err();
        assert_eq!(err.class(), ErrorClass::Usage);
        assert!(err.to_string().contains("step 2"));
        assert!(err.to_string().contains("did you mean 'hash'"));
    }

    #[tokio::test]
    async fn test_bad_arguments() {
        let registry = Registry::builtin();
        let config = ToolConfig::default();
        let (ctx, _) = capturing_context(false);
        let rt = Runtime::new(&ctx, &registry, &config);

        let err = ValidateWorkflow.run_cli(&rt, &[]).await.unwrap_err();
        assert_eq!(err.class(), ErrorClass::Usage);

        let step = Step::new("validate-workflow");
        let err = ValidateWorkflow
            .run_step(&rt, &step, &mut Variables::new())
            .await
            .unwrap_err();
        assert_eq!(err.class(), ErrorClass::Usage);
    }
}
