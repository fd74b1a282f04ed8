//! Command implementations for the CLI.
//!
//! Each submodule contains the implementation of a specific command.

use reelsmith_core::ToolLocator;
use std::path::Path;

/// Module containing the implementation of the `build` command.
/// This command compiles the pipeline and runs it under the supervisor.
pub mod build;

/// Module containing the implementation of the `locate` command.
pub mod locate;

/// Module containing the implementation of the `plan` command.
/// This command compiles the pipeline and prints the command without running it.
pub mod plan;

/// Tool locator honouring `--resource-dir`.
#[must_use]
pub fn tool_locator(resource_dir: Option<&Path>) -> ToolLocator {
    match resource_dir {
        Some(dir) => ToolLocator::new().with_resource_dir(dir),
        None => ToolLocator::new(),
    }
}
