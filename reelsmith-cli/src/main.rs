// reelsmith-cli/src/main.rs
//
// Entry point for the `reelsmith` binary.
//
// Responsibilities:
// - Parsing command-line arguments.
// - Initialising env_logger.
// - Dispatching to the build, plan and locate commands.
// - Mapping failures to a non-zero exit code.

use clap::Parser;
use reelsmith_cli::commands::tool_locator;
use reelsmith_cli::{Cli, Commands, logging, run_build, run_locate, run_plan};
use std::process;

fn main() {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    let locator = tool_locator(cli.resource_dir.as_deref());
    let result = match &cli.command {
        Commands::Build(args) => run_build(args, &locator).map(|_| ()),
        Commands::Plan(args) => run_plan(args, &locator).map(|_| ()),
        Commands::Locate(args) => run_locate(args, &locator).map(|_| ()),
    };

    if let Err(e) = result {
        log::debug!("Command failed: {e:?}");
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
