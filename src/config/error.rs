//! Error types for sbom-tool

use crate::template::{ExpansionError, suggest_correction};
use std::fmt;
use thiserror::Error;

/// The class every failure belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// Caller or configuration mistake
    Usage,
    /// Malformed workflow document
    Definition,
    /// Workflow bytes did not match the expected digest
    Integrity,
    /// Unresolved `${{ name }}` reference
    MissingVariable,
    /// Runtime failure of a command
    Execution,
}

/// Position inside a workflow document
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DocumentLocation {
    pub line: usize,
    pub column: usize,
}

impl fmt::Display for DocumentLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}:{}", self.line, self.column)
    }
}

/// Errors raised by the workflow engine and its commands
#[derive(Debug, Error)]
pub enum ToolError {
    #[error("{message}")]
    Usage { message: String },

    #[error("unknown command '{name}'{}", .suggestion.as_ref().map(|s| format!(", did you mean '{}'?", s)).unwrap_or_default())]
    UnknownCommand {
        name: String,
        suggestion: Option<String>,
    },

    #[error("parameter '{name}' is not declared by the workflow")]
    UndeclaredParameter { name: String },

    #[error("invalid workflow{}: {message}", .location.as_ref().map(|l| format!(" at {}", l)).unwrap_or_default())]
    Definition {
        message: String,
        location: Option<DocumentLocation>,
    },

    #[error("integrity check failed: expected sha256 {expected}, got {actual}")]
    Integrity { expected: String, actual: String },

    #[error(transparent)]
    Expansion(#[from] ExpansionError),

    #[error("workflow output '{name}' is not available")]
    MissingOutput { name: String },

    #[error("{message}")]
    Execution { message: String },

    #[error("workflow {source_id} failed: {message}")]
    Nested { source_id: String, message: String },

    /// Annotates an error with the workflow (and step) it came from
    #[error("{source_id}{}: {inner}", .step.as_ref().map(|s| format!(" step {}", s)).unwrap_or_default())]
    InWorkflow {
        source_id: String,
        step: Option<usize>,
        #[source]
        inner: Box<ToolError>,
    },
}

impl ToolError {
    /// Create a usage error
    pub fn usage(message: impl Into<String>) -> Self {
        Self::Usage {
            message: message.into(),
        }
    }

    /// Create an execution error
    pub fn execution(message: impl Into<String>) -> Self {
        Self::Execution {
            message: message.into(),
        }
    }

    /// Create a definition error
    pub fn definition(message: impl Into<String>, location: Option<DocumentLocation>) -> Self {
        Self::Definition {
            message: message.into(),
            location,
        }
    }

    /// Create an unknown command error, suggesting the closest known command
    pub fn unknown_command(name: impl Into<String>, known: &[&str]) -> Self {
        let name = name.into();
        let suggestion = suggest_correction(&name, known);
        Self::UnknownCommand { name, suggestion }
    }

    /// Wrap this error with the workflow source and 1-based step number
    pub fn in_workflow(self, source_id: impl Into<String>, step: Option<usize>) -> Self {
        Self::InWorkflow {
            source_id: source_id.into(),
            step,
            inner: Box::new(self),
        }
    }

    /// The innermost error, with workflow annotations stripped
    pub fn root(&self) -> &ToolError {
        match self {
            ToolError::InWorkflow { inner, .. } => inner.root(),
            other => other,
        }
    }

    /// Classify this error
    pub fn class(&self) -> ErrorClass {
        match self.root() {
            ToolError::Usage { .. }
            | ToolError::UnknownCommand { .. }
            | ToolError::UndeclaredParameter { .. } => ErrorClass::Usage,
            ToolError::Definition { .. } | ToolError::Expansion(ExpansionError::TooDeep { .. }) => {
                ErrorClass::Definition
            }
            ToolError::Integrity { .. } => ErrorClass::Integrity,
            ToolError::Expansion(ExpansionError::MissingVariable { .. }) => {
                ErrorClass::MissingVariable
            }
            ToolError::MissingOutput { .. }
            | ToolError::Execution { .. }
            | ToolError::Nested { .. }
            | ToolError::InWorkflow { .. } => ErrorClass::Execution,
        }
    }
}
