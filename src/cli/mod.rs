//! CLI module for sbom-tool
//!
//! This module provides:
//! - The output context passed to every command
//! - Output handlers (console, JSON, quiet)
//!
//! # Example
//!
//! ```ignore
//! use sbom_tool::cli::{Context, OutputMode, create_handler};
//!
//! let ctx = Context::new(create_handler(OutputMode::Console), false);
//! ctx.write_line("Workflow completed");
//! ```

mod context;

#[allow(unused_imports)]
pub use context::{Context, OutputEvent, OutputHandler, OutputMode, create_handler};

#[cfg(test)]
pub(crate) use context::testing;
