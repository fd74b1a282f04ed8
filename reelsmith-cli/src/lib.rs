// reelsmith-cli/src/lib.rs
//
// Library portion of the Reelsmith CLI application.
// Contains argument definitions and command logic.

pub mod cli;
pub mod commands;
pub mod config;
pub mod logging;
pub mod progress;

// Re-export items needed by the binary or integration tests
pub use cli::{BuildArgs, Cli, Commands, LocateArgs};
pub use commands::build::run_build;
pub use commands::locate::run_locate;
pub use commands::plan::run_plan;
