//! Error handling for modgraph
//!
//! Error types, the `Result` alias, and helpers for attaching context and
//! turning a failed command into an exit code.

pub mod context;
pub mod tests;
pub mod types;

pub use context::{exit_code, report_error, ResultExt};
pub use types::{ErrorSeverity, ModGraphError, Result};
