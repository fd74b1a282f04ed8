// ============================================================================
// reelsmith-core/src/pipeline.rs
// ============================================================================
//
// PIPELINE: Gather, Compile, Supervise
//
// A build runs in three stages:
//
// 1. gather_compile_inputs: the only stage that queries the outside world
//    (probe tool, reference frame, LUT file). Failures degrade to unknown
//    values here and never abort the build.
// 2. compile: a pure function of the configuration and the gathered facts.
//    Calling it twice with identical arguments yields an identical command.
// 3. run_build: writes the concat manifest if one is needed and hands the
//    command to the ExecutionSupervisor.

use crate::config::{CornerChoice, PipelineConfig};
use crate::encoding::{ConcatManifest, EncoderCommand, assemble_command};
use crate::error::CoreResult;
use crate::execution::ExecutionSupervisor;
use crate::external::{
    FfmpegFrameGrabber, FfmpegSpawner, FfprobeClient, MediaProber, ProbeResult,
    ReferenceFrameSource, SidecarSpawner, Tool, ToolLocator,
};
use crate::processing::filters::{DelogoStage, FALLBACK_CORNER, resolve_delogo};
use crate::processing::watermark::{LocatedWatermark, locate_watermark};
use std::collections::HashMap;
use std::fs::File;
use std::path::{Path, PathBuf};

/// Facts about the outside world that compilation depends on.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CompileInputs {
    /// One probe result per configured input, in order.
    pub probes: Vec<ProbeResult>,
    /// Locator verdict; `None` when the corner is fixed or capture failed.
    pub watermark: Option<LocatedWatermark>,
    /// Whether the configured LUT file could be opened.
    pub lut_available: bool,
}

/// The compiled build, ready to run.
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledPipeline {
    pub command: EncoderCommand,
    pub manifest: Option<ConcatManifest>,
    pub expected_duration: Option<f64>,
    pub progress_hint: Option<f64>,
    /// Watermark handling with its corner resolved.
    pub delogo: Option<DelogoStage>,
    pub output: PathBuf,
}

/// Queries the probe tool, the locator and the LUT file for `config`.
///
/// Each distinct input path is probed once. The reference frame is only
/// captured when the watermark corner is automatic.
pub fn gather_compile_inputs<P, R>(config: &PipelineConfig, prober: &P, frames: &R) -> CompileInputs
where
    P: MediaProber + ?Sized,
    R: ReferenceFrameSource + ?Sized,
{
    let mut seen: HashMap<&Path, ProbeResult> = HashMap::new();
    let probes = config
        .inputs()
        .iter()
        .map(|input| {
            *seen.entry(input.as_path()).or_insert_with(|| {
                let result = prober.probe(input);
                if result.duration.is_none() {
                    log::warn!("Duration of {} is unknown", input.display());
                }
                result
            })
        })
        .collect();

    let watermark = config
        .delogo()
        .filter(|d| d.corner == CornerChoice::Auto)
        .and_then(|delogo| {
            let first = config.inputs().first()?;
            match frames.first_frame(first) {
                Some(frame) => {
                    let located = locate_watermark(&frame, delogo.box_size, delogo.margin);
                    log::info!("Watermark located in {} corner", located.corner);
                    Some(located)
                }
                None => {
                    log::warn!("No reference frame captured, assuming watermark in {FALLBACK_CORNER} corner");
                    None
                }
            }
        });

    CompileInputs {
        probes,
        watermark,
        lut_available: lut_available(config),
    }
}

fn lut_available(config: &PipelineConfig) -> bool {
    let Some(lut) = config.cinematic().lut.as_deref() else {
        return false;
    };
    match File::open(lut) {
        Ok(file) if file.metadata().is_ok_and(|m| m.is_file()) => true,
        Ok(_) => {
            log::warn!("LUT {} is not a regular file, skipping color grade", lut.display());
            false
        }
        Err(e) => {
            log::warn!("LUT {} cannot be opened ({e}), skipping color grade", lut.display());
            false
        }
    }
}

/// Compiles `config` into one encoder command.
///
/// The configuration is consumed; nothing is read from or written to the
/// outside world.
#[must_use]
pub fn compile(config: PipelineConfig, inputs: &CompileInputs, ffmpeg: &Path) -> CompiledPipeline {
    let delogo = resolve_delogo(&config, inputs.watermark.as_ref());
    let assembled = assemble_command(&config, &inputs.probes, delogo, inputs.lut_available, ffmpeg);

    CompiledPipeline {
        command: assembled.command,
        manifest: assembled.manifest,
        expected_duration: assembled.expected_duration,
        progress_hint: assembled.progress_hint,
        delogo,
        output: config.output,
    }
}

/// Writes the manifest (if any) and runs the compiled command.
pub fn run_build<S, F>(compiled: &CompiledPipeline, spawner: S, on_progress: F) -> CoreResult<()>
where
    S: FfmpegSpawner,
    F: FnMut(Option<f64>, &str),
{
    if let Some(manifest) = &compiled.manifest {
        manifest.write()?;
    }
    let mut supervisor = ExecutionSupervisor::new(spawner);
    supervisor.run(&compiled.command, compiled.progress_hint, on_progress)?;
    log::info!("Output written to {}", compiled.output.display());
    Ok(())
}

/// Resolved encoder and probe binaries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedTools {
    pub ffmpeg: PathBuf,
    pub ffprobe: PathBuf,
}

impl ResolvedTools {
    /// Resolves both tools, failing with `ToolNotFound` before anything is spawned.
    pub fn resolve(locator: &ToolLocator) -> CoreResult<Self> {
        Ok(Self {
            ffmpeg: locator.resolve(Tool::Ffmpeg)?,
            ffprobe: locator.resolve(Tool::Ffprobe)?,
        })
    }

    /// Gathers and compiles with the real probe tool and frame grabber.
    pub fn prepare(&self, config: PipelineConfig) -> CompiledPipeline {
        let prober = FfprobeClient::new(&self.ffprobe);
        let frames = FfmpegFrameGrabber::new(SidecarSpawner, &self.ffmpeg);
        let inputs = gather_compile_inputs(&config, &prober, &frames);
        compile(config, &inputs, &self.ffmpeg)
    }
}

/// Resolves the tools, compiles `config` and runs it with ffmpeg-sidecar.
pub fn build<F>(config: PipelineConfig, locator: &ToolLocator, on_progress: F) -> CoreResult<CompiledPipeline>
where
    F: FnMut(Option<f64>, &str),
{
    let tools = ResolvedTools::resolve(locator)?;
    let compiled = tools.prepare(config);
    run_build(&compiled, SidecarSpawner, on_progress)?;
    Ok(compiled)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{CinematicEffects, Corner, DelogoSpec};
    use crate::external::mocks::{MockFfmpegSpawner, MockProber};
    use image::RgbImage;

    struct NoFrames;

    impl ReferenceFrameSource for NoFrames {
        fn first_frame(&self, _input: &Path) -> Option<RgbImage> {
            None
        }
    }

    #[test]
    fn test_duplicate_inputs_probed_once() {
        let config = PipelineConfig::builder(["a.mp4"], "out.mp4").build().unwrap();
        let prober = MockProber::new().with("a.mp4", Some(4.0), true);
        let inputs = gather_compile_inputs(&config, &prober, &NoFrames);
        assert_eq!(inputs.probes.len(), 2);
        assert_eq!(inputs.probes[0], inputs.probes[1]);
        assert_eq!(*prober.calls.borrow(), 1);
    }

    #[test]
    fn test_failed_capture_leaves_locator_unused() {
        let config = PipelineConfig::builder(["a.mp4"], "out.mp4")
            .delogo(DelogoSpec::default())
            .build()
            .unwrap();
        let inputs = gather_compile_inputs(&config, &MockProber::new(), &NoFrames);
        assert_eq!(inputs.watermark, None);

        let compiled = compile(config, &inputs, Path::new("ffmpeg"));
        match compiled.delogo {
            Some(DelogoStage::Blur(region)) => assert_eq!((region.x, region.y), (1870, 30)),
            other => panic!("unexpected delogo stage {other:?}"),
        }
    }

    #[test]
    fn test_missing_lut_is_unavailable() {
        let config = PipelineConfig::builder(["a.mp4"], "out.mp4")
            .cinematic(CinematicEffects {
                lut: Some("/no/such/grade.cube".into()),
                ..CinematicEffects::default()
            })
            .build()
            .unwrap();
        assert!(!gather_compile_inputs(&config, &MockProber::new(), &NoFrames).lut_available);
    }

    #[test]
    fn test_run_build_writes_manifest_before_spawning() {
        let dir = tempfile::tempdir().unwrap();
        let config = PipelineConfig::builder(["a.mp4", "b.mp4"], dir.path().join("out.mp4"))
            .work_dir(dir.path())
            .delogo(DelogoSpec {
                corner: CornerChoice::Fixed(Corner::BottomRight),
                ..DelogoSpec::default()
            })
            .build()
            .unwrap();
        let compiled = compile(config, &CompileInputs::default(), Path::new("ffmpeg"));
        let manifest = compiled.manifest.clone().unwrap();

        let spawner = MockFfmpegSpawner::new();
        run_build(&compiled, spawner.clone(), |_, _| {}).unwrap();

        assert!(manifest.path.is_file());
        assert_eq!(spawner.received(), vec![compiled.command.clone()]);
    }
}
