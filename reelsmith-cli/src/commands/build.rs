//! Implementation of the 'build' subcommand.
//!
//! Compiles the flags into one encoder command and runs it, drawing a
//! progress bar from the core's progress callback.

use crate::cli::BuildArgs;
use crate::config::pipeline_config;
use crate::progress::BuildProgress;

use anyhow::Context;
use log::info;
use reelsmith_core::{ToolLocator, format_duration};
use std::path::PathBuf;
use std::time::Instant;

/// Runs the build and returns the written output path.
pub fn run_build(args: &BuildArgs, locator: &ToolLocator) -> anyhow::Result<PathBuf> {
    let config = pipeline_config(args).context("Invalid build options")?;
    let started = Instant::now();

    info!("Inputs: {}", config.inputs().len());
    info!("Output: {}", config.output().display());

    let progress = BuildProgress::new();
    let result = reelsmith_core::build(config, locator, |percent, line| {
        progress.update(percent, line);
    });

    let compiled = match result {
        Ok(compiled) => {
            progress.finish("done");
            compiled
        }
        Err(e) => {
            progress.abandon();
            return Err(e).context("Build failed");
        }
    };

    info!(
        "Finished {} in {}",
        compiled.output.display(),
        format_duration(started.elapsed().as_secs_f64())
    );
    Ok(compiled.output)
}
