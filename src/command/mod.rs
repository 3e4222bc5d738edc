//! Command contract and registry
//!
//! Every command can be run two ways: directly from the command line with a
//! raw argument list, or as a workflow step with the live variable store.
//! The registry is built once at startup and handed to the engine by
//! reference.
//!
//! # Example
//!
//! ```ignore
//! let registry = Registry::builtin();
//! let config = ToolConfig::default();
//! let ctx = Context::new(create_handler(OutputMode::Console), false);
//! let rt = Runtime::new(&ctx, &registry, &config);
//!
//! registry.lookup("print")?.command.run_cli(&rt, &["hello".into()]).await?;
//! ```

mod hash;
mod help;
mod inputs;
mod print;
mod query;
mod run_workflow;
mod set_variable;
mod validate_workflow;

use crate::cli::Context;
use crate::config::{Step, ToolConfig, ToolError};
use crate::template::{TemplateEngine, Variables};
use async_trait::async_trait;
use indexmap::IndexMap;

pub use inputs::StepInputs;

/// A named unit of behavior usable from the CLI and from workflow steps
#[async_trait]
pub trait Command: Send + Sync {
    /// Run with a raw, ordered argument list
    async fn run_cli(&self, rt: &Runtime<'_>, args: &[String]) -> Result<(), ToolError>;

    /// Run as a workflow step against the invocation's variable store
    async fn run_step(
        &self,
        rt: &Runtime<'_>,
        step: &Step,
        variables: &mut Variables,
    ) -> Result<(), ToolError>;
}

/// Usage error for commands that only make sense inside a workflow
pub fn workflow_only(name: &str) -> ToolError {
    ToolError::usage(format!("'{}' is only usable in a workflow", name))
}

/// Registry record for one command
pub struct CommandEntry {
    pub name: &'static str,
    pub usage: &'static str,
    pub summary: &'static str,
    pub details: &'static str,
    pub command: Box<dyn Command>,
}

fn builtin_entries() -> Vec<CommandEntry> {
    vec![
        help::entry(),
        print::entry(),
        set_variable::entry(),
        run_workflow::entry(),
        validate_workflow::entry(),
        query::entry(),
        hash::entry(),
    ]
}

/// Immutable name -> command table
pub struct Registry {
    entries: IndexMap<&'static str, CommandEntry>,
}

impl Registry {
    /// The built-in command set
    pub fn builtin() -> Self {
        Self::from_entries(builtin_entries())
    }

    /// Build a registry from a fixed list of entries
    pub fn from_entries(entries: Vec<CommandEntry>) -> Self {
        Self {
            entries: entries.into_iter().map(|e| (e.name, e)).collect(),
        }
    }

    /// Look up a command by name
    pub fn lookup(&self, name: &str) -> Result<&CommandEntry, ToolError> {
        self.entries
            .get(name)
            .ok_or_else(|| ToolError::unknown_command(name, &self.names()))
    }

    /// Registered command names, in registration order
    pub fn names(&self) -> Vec<&'static str> {
        self.entries.keys().copied().collect()
    }

    /// Registered entries, in registration order
    pub fn entries(&self) -> impl Iterator<Item = &CommandEntry> {
        self.entries.values()
    }
}

/// Everything a running command can reach besides its own inputs
#[derive(Clone, Copy)]
pub struct Runtime<'a> {
    pub context: &'a Context,
    pub registry: &'a Registry,
    pub config: &'a ToolConfig,
    pub templates: TemplateEngine,
    /// Shared client for remote workflows; built from `config.http` when unset
    pub http: Option<&'a reqwest::Client>,
    /// Nesting level of the current workflow invocation (0 = top level)
    pub depth: usize,
}

impl<'a> Runtime<'a> {
    pub fn new(context: &'a Context, registry: &'a Registry, config: &'a ToolConfig) -> Self {
        Self {
            context,
            registry,
            config,
            templates: TemplateEngine::with_max_depth(config.engine.max_expansion_depth),
            http: None,
            depth: 0,
        }
    }

    /// Fetch remote workflows through `client`
    pub fn with_http_client(self, client: &'a reqwest::Client) -> Self {
        Self {
            http: Some(client),
            ..self
        }
    }

    /// The HTTP client for remote workflows
    pub fn http_client(&self) -> Result<reqwest::Client, ToolError> {
        match self.http {
            Some(client) => Ok(client.clone()),
            None => crate::workflow::loader::http_client(&self.config.http),
        }
    }

    /// Runtime for a nested workflow invocation
    pub fn nested(&self) -> Result<Runtime<'a>, ToolError> {
        let depth = self.depth + 1;
        if depth > self.config.engine.max_workflow_depth {
            return Err(ToolError::execution(format!(
                "workflows nested deeper than {} levels",
                self.config.engine.max_workflow_depth
            )));
        }
        Ok(Runtime { depth, ..*self })
    }

    /// Expand `${{ }}` references against `variables`
    pub fn expand(&self, text: &str, variables: &Variables) -> Result<String, ToolError> {
        Ok(self.templates.expand(text, variables)?)
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::testing::capturing_context;
    use crate::config::ErrorClass;

    #[test]
    fn test_builtin_registry() {
        let registry = Registry::builtin();
        for name in [
            "help",
            "print",
            "set-variable",
            "run-workflow",
            "validate-workflow",
            "query",
            "hash",
        ] {
            let entry = registry.lookup(name).unwrap();
            assert_eq!(entry.name, name);
            assert!(entry.usage.starts_with(name));
            assert!(!entry.summary.is_empty());
        }
        assert_eq!(registry.names().first(), Some(&"help"));
    }

    #[test]
    fn test_lookup_miss() {
        let registry = Registry::builtin();
        let err = registry.lookup("prnt").err().unwrap();
        assert_eq!(err.class(), ErrorClass::Usage);
        assert!(matches!(err, ToolError::UnknownCommand { ref suggestion, .. } if suggestion.as_deref() == Some("print")));
        assert!(!registry.names().contains(&"prnt"));
    }

    #[test]
    fn test_nested_runtime_depth_bound() {
        let registry = Registry::builtin();
        let mut config = ToolConfig::default();
        config.engine.max_workflow_depth = 1;
        let (ctx, _) = capturing_context(false);

        let rt = Runtime::new(&ctx, &registry, &config);
        let child = rt.nested().unwrap();
        assert_eq!(child.depth, 1);
        let err = child.nested().err().unwrap();
        assert_eq!(err.class(), ErrorClass::Execution);
    }

    #[test]
    fn test_runtime_expand_uses_configured_depth() {
        let registry = Registry::builtin();
        let mut config = ToolConfig::default();
        config.engine.max_expansion_depth = 1;
        let (ctx, _) = capturing_context(false);
        let rt = Runtime::new(&ctx, &registry, &config);

        let vars: Variables = [("b", "x"), ("a_x", "1")].into_iter().collect();
        assert_eq!(rt.expand("${{ b }}", &vars).unwrap(), "x");
        let err = rt.expand("${{ a_${{ b }} }}", &vars).unwrap_err();
        assert_eq!(err.class(), ErrorClass::Definition);
    }
}
