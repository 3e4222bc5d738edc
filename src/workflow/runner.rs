//! Workflow runner - binds parameters and executes steps in order

use super::loader::{self, WorkflowSource};
use crate::command::Runtime;
use crate::config::{Step, ToolError, WorkflowDefinition};
use crate::template::Variables;
use indexmap::IndexMap;

/// Result of a completed workflow invocation
#[derive(Debug)]
pub struct WorkflowRun {
    /// Source identifier (path or URL) the workflow was loaded from
    pub source: String,
    pub definition: WorkflowDefinition,
    /// Final variable store
    pub variables: Variables,
}

impl WorkflowRun {
    /// Values of the definition's declared `outputs`, keyed by exported name
    pub fn exported_outputs(&self) -> Result<IndexMap<String, String>, ToolError> {
        self.definition
            .outputs
            .iter()
            .map(|(export, variable)| {
                self.variables
                    .get(variable)
                    .map(|value| (export.clone(), value.to_string()))
                    .ok_or_else(|| ToolError::MissingOutput {
                        name: export.clone(),
                    })
            })
            .collect()
    }
}

/// Executes one workflow invocation
pub struct WorkflowRunner<'a> {
    rt: Runtime<'a>,
}

impl<'a> WorkflowRunner<'a> {
    pub fn new(rt: Runtime<'a>) -> Self {
        Self { rt }
    }

    /// Load a workflow, bind its parameters and run every step
    ///
    /// `overrides` replace declared parameter defaults; naming an undeclared
    /// parameter fails before any step runs. Every error is annotated with
    /// the source and, for step failures, the 1-based step number.
    pub async fn run(
        &self,
        location: &str,
        integrity: Option<&str>,
        overrides: &IndexMap<String, String>,
    ) -> Result<WorkflowRun, ToolError> {
        let source = WorkflowSource::parse(location);
        let source_id = source.to_string();

        tracing::info!(source = %source_id, depth = self.rt.depth, "Running workflow");

        let client = self
            .rt
            .http_client()
            .map_err(|e| e.in_workflow(&source_id, None))?;
        let definition = loader::load(&source, integrity, &client)
            .await
            .map_err(|e| e.in_workflow(&source_id, None))?;

        let mut variables = self
            .bind_parameters(&definition, overrides)
            .map_err(|e| e.in_workflow(&source_id, None))?;

        for (index, step) in definition.steps.iter().enumerate() {
            let number = index + 1;
            self.run_step(number, step, &mut variables)
                .await
                .map_err(|e| e.in_workflow(&source_id, Some(number)))?;
        }

        tracing::info!(
            source = %source_id,
            steps = definition.steps.len(),
            variables = variables.len(),
            "Workflow completed"
        );

        Ok(WorkflowRun {
            source: source_id,
            definition,
            variables,
        })
    }

    /// Build a fresh store from parameter defaults, then apply overrides
    ///
    /// Defaults bind first, so a default that fails to expand is reported
    /// ahead of an undeclared override.
    fn bind_parameters(
        &self,
        definition: &WorkflowDefinition,
        overrides: &IndexMap<String, String>,
    ) -> Result<Variables, ToolError> {
        let mut variables = Variables::new();
        for (name, default) in &definition.parameters {
            let value = self.rt.expand(default, &variables)?;
            variables.set(name.as_str(), value);
        }

        if let Some(name) = overrides.keys().find(|name| !definition.declares(name)) {
            return Err(ToolError::UndeclaredParameter { name: name.clone() });
        }

        for (name, value) in overrides {
            let value = self.rt.expand(value, &variables)?;
            tracing::debug!(parameter = %name, "Overriding parameter");
            variables.set(name.as_str(), value);
        }

        Ok(variables)
    }

    async fn run_step(
        &self,
        number: usize,
        step: &Step,
        variables: &mut Variables,
    ) -> Result<(), ToolError> {
        let command = self.rt.expand(&step.command, variables)?;
        if let Some(display_name) = &step.display_name {
            let display_name = self.rt.expand(display_name, variables)?;
            self.rt.context.write_line(display_name);
        }

        let entry = self.rt.registry.lookup(&command)?;
        tracing::debug!(step = number, command = %command, "Executing step");
        entry.command.run_step(&self.rt, step, variables).await
    }
}
