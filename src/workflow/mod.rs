//! Workflow execution engine for sbom-tool
//!
//! This module handles:
//! - Loading workflow documents from files or URLs
//! - SHA-256 integrity verification before parsing
//! - Parameter binding and overrides
//! - Sequential step dispatch through the command registry
//!
//! # Example
//!
//! ```ignore
//! let rt = Runtime::new(&ctx, &registry, &config);
//! let run = WorkflowRunner::new(rt)
//!     .run("release.yaml", None, &overrides)
//!     .await?;
//!
//! for (name, value) in run.variables.iter() {
//!     println!("{} = {}", name, value);
//! }
//! ```

pub mod loader;
mod runner;

pub use loader::WorkflowSource;
pub use runner::{WorkflowRun, WorkflowRunner};
