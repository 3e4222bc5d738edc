//! Configuration, workflow definitions and error types for sbom-tool

mod error;
mod loader;
mod workflow;

#[allow(unused_imports)]
pub use error::{DocumentLocation, ErrorClass, ToolError};
#[allow(unused_imports)]
pub use loader::{EngineSettings, HttpSettings, ToolConfig};
#[allow(unused_imports)]
pub use workflow::{Step, WorkflowDefinition, scalar_text};
