//! `hash` - generate or verify a file's SHA-256 digest

use super::{Command, CommandEntry, Runtime, StepInputs};
use crate::config::{Step, ToolError};
use crate::template::Variables;
use crate::workflow::loader::sha256_hex;
use async_trait::async_trait;
use std::path::{Path, PathBuf};

pub(super) fn entry() -> CommandEntry {
    CommandEntry {
        name: "hash",
        usage: "hash <generate | verify> sha256 <file>",
        summary: "Generate or verify hashes of files",
        details: "\
This command generates or verifies hashes.

From the command-line this is used as:
  sbom-tool hash generate sha256 <file>
  sbom-tool hash verify sha256 <file>

From a YAML file this is used as:
  - command: hash
    inputs:
      operation: generate | verify
      algorithm: sha256
      file: <file>",
        command: Box::new(Hash),
    }
}

struct Hash;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Operation {
    Generate,
    Verify,
}

impl Operation {
    fn parse(text: &str) -> Result<Self, ToolError> {
        match text {
            "generate" => Ok(Self::Generate),
            "verify" => Ok(Self::Verify),
            other => Err(ToolError::usage(format!(
                "unknown hash operation '{}', expected generate or verify",
                other
            ))),
        }
    }
}

fn digest_path(file: &Path) -> PathBuf {
    let mut name = file.as_os_str().to_owned();
    name.push(".sha256");
    PathBuf::from(name)
}

async fn read(path: &Path) -> Result<Vec<u8>, ToolError> {
    tokio::fs::read(path)
        .await
        .map_err(|e| ToolError::execution(format!("failed to read {}: {}", path.display(), e)))
}

impl Hash {
    async fn apply(
        rt: &Runtime<'_>,
        operation: &str,
        algorithm: &str,
        file: &str,
    ) -> Result<(), ToolError> {
        let operation = Operation::parse(operation)?;
        if algorithm != "sha256" {
            return Err(ToolError::usage(format!(
                "unsupported hash algorithm '{}'",
                algorithm
            )));
        }

        let file = PathBuf::from(shellexpand::tilde(file).as_ref());
        let target = digest_path(&file);
        let actual = sha256_hex(&read(&file).await?);

        match operation {
            Operation::Generate => {
                tokio::fs::write(&target, &actual).await.map_err(|e| {
                    ToolError::execution(format!("failed to write {}: {}", target.display(), e))
                })?;
                tracing::debug!(file = %file.display(), "Wrote sha256 digest");
            }
            Operation::Verify => {
                let expected = String::from_utf8_lossy(&read(&target).await?)
                    .trim()
                    .to_ascii_lowercase();
                if expected != actual {
                    return Err(ToolError::execution(format!(
                        "sha256 of {} does not match {}",
                        file.display(),
                        target.display()
                    )));
                }
                rt.context
                    .write_verbose(format!("{} matches {}", file.display(), target.display()));
            }
        }
        Ok(())
    }
}

#[async_trait]
impl Command for Hash {
    async fn run_cli(&self, rt: &Runtime<'_>, args: &[String]) -> Result<(), ToolError> {
        let [operation, algorithm, file] = args else {
            return Err(ToolError::usage(
                "'hash' command requires exactly three arguments",
            ));
        };
        Self::apply(rt, operation, algorithm, file).await
    }

    async fn run_step(
        &self,
        rt: &Runtime<'_>,
        step: &Step,
        variables: &mut Variables,
    ) -> Result<(), ToolError> {
        let inputs = StepInputs::new(rt, step);
        let operation = inputs.required("operation", variables)?;
        let algorithm = inputs.required("algorithm", variables)?;
        let file = inputs.required("file", variables)?;
        Self::apply(rt, &operation, &algorithm, &file).await
    }
}
