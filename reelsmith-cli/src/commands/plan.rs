//! Implementation of the 'plan' subcommand.
//!
//! Compiles the pipeline exactly as `build` would, writes the concat
//! manifest so the printed command is runnable, and prints a JSON report.

use crate::cli::BuildArgs;
use crate::config::pipeline_config;

use anyhow::Context;
use reelsmith_core::config::Corner;
use reelsmith_core::processing::{DelogoRegion, DelogoStage};
use reelsmith_core::{CompiledPipeline, ResolvedTools, ToolLocator};
use serde::Serialize;
use std::path::PathBuf;

/// Machine-readable description of a compiled build.
#[derive(Debug, Serialize)]
pub struct PlanReport {
    pub program: PathBuf,
    pub args: Vec<String>,
    /// Shell-style rendering of the full command.
    pub command_line: String,
    pub manifest: Option<PathBuf>,
    pub expected_duration: Option<f64>,
    pub progress_hint: Option<f64>,
    pub delogo: Option<DelogoReport>,
    pub output: PathBuf,
}

#[derive(Debug, Serialize)]
#[serde(tag = "method", rename_all = "snake_case")]
pub enum DelogoReport {
    Zoom {
        corner: Corner,
        scaled_width: u32,
        scaled_height: u32,
        crop_x: u32,
        crop_y: u32,
    },
    Blur {
        region: DelogoRegion,
    },
}

impl From<DelogoStage> for DelogoReport {
    fn from(stage: DelogoStage) -> Self {
        match stage {
            DelogoStage::Zoom { corner, crop } => DelogoReport::Zoom {
                corner,
                scaled_width: crop.scaled_width,
                scaled_height: crop.scaled_height,
                crop_x: crop.crop_x,
                crop_y: crop.crop_y,
            },
            DelogoStage::Blur(region) => DelogoReport::Blur { region },
        }
    }
}

impl PlanReport {
    #[must_use]
    pub fn new(compiled: &CompiledPipeline) -> Self {
        Self {
            program: compiled.command.program.clone(),
            args: compiled.command.args.clone(),
            command_line: compiled.command.display(),
            manifest: compiled.manifest.as_ref().map(|m| m.path.clone()),
            expected_duration: compiled.expected_duration,
            progress_hint: compiled.progress_hint,
            delogo: compiled.delogo.map(DelogoReport::from),
            output: compiled.output.clone(),
        }
    }
}

/// Compiles the build and prints its report to stdout.
pub fn run_plan(args: &BuildArgs, locator: &ToolLocator) -> anyhow::Result<PlanReport> {
    let config = pipeline_config(args).context("Invalid build options")?;
    let tools = ResolvedTools::resolve(locator)?;
    let compiled = tools.prepare(config);

    if let Some(manifest) = &compiled.manifest {
        manifest
            .write()
            .with_context(|| format!("Failed to write {}", manifest.path.display()))?;
    }

    let report = PlanReport::new(&compiled);
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(report)
}
