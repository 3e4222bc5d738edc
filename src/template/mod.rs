//! Variable expansion for sbom-tool workflows
//!
//! Workflow text refers to variables with `${{ name }}`. References may nest,
//! in which case the innermost is resolved first and its value becomes part
//! of the outer name:
//!
//! ```yaml
//! parameters:
//!   flavor: release
//!   url_release: https://example.com/sbom.json
//! steps:
//!   - command: print
//!     inputs:
//!       text:
//!         - ${{ url_${{ flavor }} }}
//! ```

mod engine;
mod errors;
mod variables;

#[allow(unused_imports)]
pub use engine::{DEFAULT_MAX_DEPTH, TemplateEngine};
#[allow(unused_imports)]
pub use errors::{ExpansionError, suggest_correction};
pub use variables::Variables;
