// ============================================================================
// reelsmith-core/src/config/builder.rs
// ============================================================================
//
// CONFIGURATION BUILDER: Validating Builder for PipelineConfig
//
// This module implements the builder pattern for PipelineConfig. Setters only
// record values; all validation and clamping happens once in `build()`, so the
// order in which setters are called never changes the result.
//
// KEY COMPONENTS:
// - PipelineConfigBuilder: fluent builder producing an immutable PipelineConfig
// - Fail-fast validation of inputs, delogo box, transition arity and bitrate
// - Single-input loop duplication

// ---- Standard library imports ----
use std::path::PathBuf;

// ---- Internal crate imports ----
use super::{
    CANVAS_HEIGHT, CANVAS_WIDTH, CinematicEffects, DelogoSpec, ExportSpec, PerformanceSpec,
    PipelineConfig, QualitySettings, TRANSITION_DURATION_RANGE, TransitionSpec, ZOOM_RANGE,
    ZoomSpec, clamp_to,
};
use crate::error::{CoreError, CoreResult};

/// Builder for [`PipelineConfig`].
///
/// # Examples
///
/// ```rust
/// use reelsmith_core::config::{PipelineConfig, TransitionKind, TransitionSpec};
///
/// let config = PipelineConfig::builder(["intro.mp4", "main.mp4"], "out.mp4")
///     .transition(TransitionSpec {
///         kind: TransitionKind::Wipe,
///         duration: 1.0,
///         smooth: true,
///     })
///     .build()
///     .unwrap();
///
/// assert!(config.uses_transition());
/// ```
#[derive(Debug, Clone)]
pub struct PipelineConfigBuilder {
    inputs: Vec<PathBuf>,
    output: PathBuf,
    work_dir: PathBuf,
    loop_single_input: bool,
    vertical_canvas: bool,
    force_fps: bool,
    quality: QualitySettings,
    cinematic: CinematicEffects,
    delogo: Option<DelogoSpec>,
    zoom: ZoomSpec,
    transition: Option<TransitionSpec>,
    export: ExportSpec,
    performance: PerformanceSpec,
}

impl PipelineConfigBuilder {
    /// Creates a builder with the default option set.
    pub fn new<I, P>(inputs: I, output: impl Into<PathBuf>) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        Self {
            inputs: inputs.into_iter().map(Into::into).collect(),
            output: output.into(),
            work_dir: PathBuf::from("."),
            loop_single_input: true,
            vertical_canvas: true,
            force_fps: true,
            quality: QualitySettings::default(),
            cinematic: CinematicEffects::default(),
            delogo: None,
            zoom: ZoomSpec::default(),
            transition: None,
            export: ExportSpec::default(),
            performance: PerformanceSpec::default(),
        }
    }

    /// Sets the directory that receives the concat manifest.
    pub fn work_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.work_dir = dir.into();
        self
    }

    /// Duplicates a lone input so it can be transitioned into itself.
    pub fn loop_single_input(mut self, enabled: bool) -> Self {
        self.loop_single_input = enabled;
        self
    }

    pub fn vertical_canvas(mut self, enabled: bool) -> Self {
        self.vertical_canvas = enabled;
        self
    }

    pub fn force_fps(mut self, enabled: bool) -> Self {
        self.force_fps = enabled;
        self
    }

    pub fn quality(mut self, quality: QualitySettings) -> Self {
        self.quality = quality;
        self
    }

    pub fn cinematic(mut self, cinematic: CinematicEffects) -> Self {
        self.cinematic = cinematic;
        self
    }

    pub fn delogo(mut self, delogo: DelogoSpec) -> Self {
        self.delogo = Some(delogo);
        self
    }

    pub fn zoom(mut self, zoom: ZoomSpec) -> Self {
        self.zoom = zoom;
        self
    }

    pub fn transition(mut self, transition: TransitionSpec) -> Self {
        self.transition = Some(transition);
        self
    }

    pub fn export(mut self, export: ExportSpec) -> Self {
        self.export = export;
        self
    }

    pub fn performance(mut self, performance: PerformanceSpec) -> Self {
        self.performance = performance;
        self
    }

    /// Validates and normalises the collected options.
    ///
    /// # Returns
    ///
    /// * `Ok(PipelineConfig)` - clamped, immutable configuration
    /// * `Err(CoreError::Config)` - for an empty input list, an empty or
    ///   oversized delogo box, a transition without exactly two inputs, or a
    ///   zero bitrate
    pub fn build(self) -> CoreResult<PipelineConfig> {
        let mut inputs = self.inputs;
        if inputs.is_empty() {
            return Err(CoreError::Config("at least one input is required".to_string()));
        }

        // ---- Loop duplication happens before any arity check ----
        if inputs.len() == 1 && self.loop_single_input {
            let only = inputs[0].clone();
            inputs.push(only);
        }

        if let Some(delogo) = &self.delogo {
            let (w, h) = delogo.box_size;
            if w == 0 || h == 0 {
                return Err(CoreError::Config(format!(
                    "delogo box must have positive dimensions, got {w}x{h}"
                )));
            }
            if w > CANVAS_WIDTH || h > CANVAS_HEIGHT {
                return Err(CoreError::Config(format!(
                    "delogo box {w}x{h} does not fit the {CANVAS_WIDTH}x{CANVAS_HEIGHT} canvas"
                )));
            }
        }

        let transition = self.transition.map(|t| TransitionSpec {
            duration: clamp_to(t.duration, TRANSITION_DURATION_RANGE),
            ..t
        });
        if transition.is_some() && inputs.len() != 2 {
            return Err(CoreError::Config(format!(
                "a transition needs exactly two inputs, got {}",
                inputs.len()
            )));
        }

        if self.export.bitrate_mbps == 0 {
            return Err(CoreError::Config("bitrate must be positive".to_string()));
        }

        let zoom = ZoomSpec {
            factor: clamp_to(self.zoom.factor, ZOOM_RANGE),
            ..self.zoom
        };

        let mut performance = self.performance;
        if performance.encoder_preset.trim().is_empty() {
            performance.encoder_preset = super::DEFAULT_ENCODER_PRESET.to_string();
        }

        Ok(PipelineConfig {
            inputs,
            output: self.output,
            work_dir: self.work_dir,
            vertical_canvas: self.vertical_canvas,
            force_fps: self.force_fps,
            quality: self.quality,
            cinematic: self.cinematic.clamped(),
            delogo: self.delogo,
            zoom,
            transition,
            export: self.export,
            performance,
        })
    }
}
