//! `help` - describe a registered command

use super::{Command, CommandEntry, Runtime, StepInputs};
use crate::config::{Step, ToolError};
use crate::template::Variables;
use async_trait::async_trait;

pub(super) fn entry() -> CommandEntry {
    CommandEntry {
        name: "help",
        usage: "help <command>",
        summary: "Display extended help about a command",
        details: "\
This command displays extended help information about the specified command.

From the command-line this is used as:
  sbom-tool help <command>

From a YAML file this is used as:
  - command: help
    inputs:
      command: <command>",
        command: Box::new(Help),
    }
}

struct Help;

impl Help {
    fn describe(rt: &Runtime<'_>, name: &str) -> Result<(), ToolError> {
        let entry = rt.registry.lookup(name)?;
        rt.context.write_line(format!("{} - {}", entry.usage, entry.summary));
        if !entry.details.is_empty() {
            rt.context.write_line("");
            for line in entry.details.lines() {
                rt.context.write_line(line);
            }
        }
        Ok(())
    }
}

#[async_trait]
impl Command for Help {
    async fn run_cli(&self, rt: &Runtime<'_>, args: &[String]) -> Result<(), ToolError> {
        match args {
            [name] => Self::describe(rt, name),
            _ => Err(ToolError::usage("'help' command requires exactly one argument")),
        }
    }

    async fn run_step(
        &self,
        rt: &Runtime<'_>,
        step: &Step,
        variables: &mut Variables,
    ) -> Result<(), ToolError> {
        let name = StepInputs::new(rt, step).required("command", variables)?;
        Self::describe(rt, &name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::testing::capturing_context;
    use crate::command::Registry;
    use crate::config::{ErrorClass, ToolConfig};

    #[tokio::test]
    async fn test_help_for_command() {
        let registry = Registry::builtin();
        let config = ToolConfig::default();
        let (ctx, capture) = capturing_context(false);
        let rt = Runtime::new(&ctx, &registry, &config);

        Help.run_cli(&rt, &["set-variable".into()]).await.unwrap();

        let lines = capture.lines();
        assert!(lines[0].starts_with("set-variable"));
        assert!(lines.iter().any(|l| l.contains("- command: set-variable")));
    }

    #[tokio::test]
    async fn test_help_requires_one_argument() {
        let registry = Registry::builtin();
        let config = ToolConfig::default();
        let (ctx, _) = capturing_context(false);
        let rt = Runtime::new(&ctx, &registry, &config);

        let err = Help.run_cli(&rt, &[]).await.unwrap_err();
        assert_eq!(err.class(), ErrorClass::Usage);

        let err = Help.run_cli(&rt, &["nope".into()]).await.unwrap_err();
        assert!(matches!(err, ToolError::UnknownCommand { .. }));
    }

    #[tokio::test]
    async fn test_help_step() {
        let registry = Registry::builtin();
        let config = ToolConfig::default();
        let (ctx, capture) = capturing_context(false);
        let rt = Runtime::new(&ctx, &registry, &config);

        let step: Step =
            serde_yaml::from_str("command: help\ninputs:\n  command: ${{ which }}").unwrap();
        let mut vars: Variables = [("which", "hash")].into_iter().collect();

        Help.run_step(&rt, &step, &mut vars).await.unwrap();
        assert!(capture.lines()[0].starts_with("hash"));
    }
}
