//! `query` - capture a value from a program's output

use super::{Command, CommandEntry, Runtime, StepInputs};
use crate::config::{Step, ToolError};
use crate::process::run_captured;
use crate::template::Variables;
use async_trait::async_trait;
use regex::Regex;

pub(super) fn entry() -> CommandEntry {
    CommandEntry {
        name: "query",
        usage: "query <pattern> <program> [arguments]",
        summary: "Query program output for a value",
        details: "\
This command runs a program and captures a value from its output. The pattern
must contain a named capture group 'value'.

From the command-line this is used as:
  sbom-tool query <pattern> <program> [arguments]

From a YAML file this is used as:
  - command: query
    inputs:
      output: <variable>     # Variable to receive the value
      pattern: <regex>       # Regex with a 'value' capture group
      program: <program>     # Program to run
      arguments:             # Optional program arguments
      - <argument>",
        command: Box::new(Query),
    }
}

struct Query;

impl Query {
    fn compile(pattern: &str) -> Result<Regex, ToolError> {
        let regex = Regex::new(pattern)
            .map_err(|e| ToolError::usage(format!("invalid pattern '{}': {}", pattern, e)))?;
        if !regex.capture_names().flatten().any(|name| name == "value") {
            return Err(ToolError::usage(format!(
                "pattern '{}' has no 'value' capture group",
                pattern
            )));
        }
        Ok(regex)
    }

    /// Run `program` and extract the `value` group from its combined output
    async fn capture(pattern: &str, program: &str, args: &[String]) -> Result<String, ToolError> {
        let regex = Self::compile(pattern)?;
        let output = run_captured(program, args).await?;
        tracing::debug!(program = %program, exit_code = ?output.exit_code, "Program finished");

        let text = output.combined();
        regex
            .captures(&text)
            .and_then(|captures| captures.name("value"))
            .map(|value| value.as_str().to_string())
            .ok_or_else(|| {
                ToolError::execution(format!(
                    "output of '{}' did not match pattern '{}'",
                    program, pattern
                ))
            })
    }
}

#[async_trait]
impl Command for Query {
    async fn run_cli(&self, rt: &Runtime<'_>, args: &[String]) -> Result<(), ToolError> {
        let [pattern, program, rest @ ..] = args else {
            return Err(ToolError::usage(
                "'query' requires a pattern and a program",
            ));
        };

        let value = Self::capture(pattern, program, rest).await?;
        rt.context.write_line(value);
        Ok(())
    }

    async fn run_step(
        &self,
        rt: &Runtime<'_>,
        step: &Step,
        variables: &mut Variables,
    ) -> Result<(), ToolError> {
        let inputs = StepInputs::new(rt, step);
        let output = inputs.required("output", variables)?;
        let pattern = inputs.required("pattern", variables)?;
        let program = inputs.required("program", variables)?;
        let arguments = inputs.list("arguments", variables)?.unwrap_or_default();

        let value = Self::capture(&pattern, &program, &arguments).await?;
        variables.set(output, value);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::testing::capturing_context;
    use crate::command::Registry;
    use crate::config::{ErrorClass, ToolConfig};

    #[test]
    fn test_pattern_requires_value_group() {
        assert!(Query::compile(r"(?P<value>\d+)").is_ok());
        assert_eq!(
            Query::compile(r"(\d+)").unwrap_err().class(),
            ErrorClass::Usage
        );
        assert_eq!(
            Query::compile(r"(unclosed").unwrap_err().class(),
            ErrorClass::Usage
        );
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_query_cli() {
        let registry = Registry::builtin();
        let config = ToolConfig::default();
        let (ctx, capture) = capturing_context(false);
        let rt = Runtime::new(&ctx, &registry, &config);

        Query
            .run_cli(
                &rt,
                &[
                    r"version (?P<value>\d+\.\d+)".into(),
                    "echo".into(),
                    "tool version 4.2".into(),
                ],
            )
            .await
            .unwrap();
        assert_eq!(capture.lines(), vec!["4.2"]);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_query_step_reads_stderr() {
        let registry = Registry::builtin();
        let config = ToolConfig::default();
        let (ctx, _) = capturing_context(false);
        let rt = Runtime::new(&ctx, &registry, &config);

        let step: Step = serde_yaml::from_str(
            r#"
command: query
inputs:
  output: found
  pattern: 'build (?P<value>\w+)'
  program: sh
  arguments: ["-c", "echo build ${{ id }} >&2"]
"#,
        )
        .unwrap();
        let mut vars: Variables = [("id", "abc123")].into_iter().collect();

        Query.run_step(&rt, &step, &mut vars).await.unwrap();
        assert_eq!(vars.get("found"), Some("abc123"));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_query_matches_past_invalid_utf8() {
        let registry = Registry::builtin();
        let config = ToolConfig::default();
        let (ctx, capture) = capturing_context(false);
        let rt = Runtime::new(&ctx, &registry, &config);

        Query
            .run_cli(
                &rt,
                &[
                    r"value (?P<value>\d+)".into(),
                    "sh".into(),
                    "-c".into(),
                    r"printf '\377\376 value 7\n'".into(),
                ],
            )
            .await
            .unwrap();
        assert_eq!(capture.lines(), vec!["7"]);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_query_no_match() {
        let registry = Registry::builtin();
        let config = ToolConfig::default();
        let (ctx, _) = capturing_context(false);
        let rt = Runtime::new(&ctx, &registry, &config);

        let err = Query
            .run_cli(
                &rt,
                &[r"(?P<value>\d+)".into(), "echo".into(), "none".into()],
            )
            .await
            .unwrap_err();
        assert_eq!(err.class(), ErrorClass::Execution);
    }

    #[tokio::test]
    async fn test_query_requires_arguments() {
        let registry = Registry::builtin();
        let config = ToolConfig::default();
        let (ctx, _) = capturing_context(false);
        let rt = Runtime::new(&ctx, &registry, &config);

        let err = Query.run_cli(&rt, &["(?P<value>x)".into()]).await.unwrap_err();
        assert_eq!(err.class(), ErrorClass::Usage);
    }
}
