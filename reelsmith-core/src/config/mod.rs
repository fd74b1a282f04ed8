//! Pipeline configuration and its independently validated value records.
//!
//! A [`PipelineConfig`] is only obtainable through [`PipelineConfigBuilder`],
//! which rejects invalid combinations and clamps every ranged value. Once
//! built, the configuration is immutable and is consumed by
//! [`crate::pipeline::compile`].

mod builder;

use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};

pub use builder::PipelineConfigBuilder;

// Default constants

/// Width of the canonical vertical canvas in pixels.
pub const CANVAS_WIDTH: u32 = 2160;

/// Height of the canonical vertical canvas in pixels.
pub const CANVAS_HEIGHT: u32 = 3840;

/// Frame rate applied when frame-rate conversion is enabled.
pub const TARGET_FPS: u32 = 60;

/// Film grain strength range.
pub const GRAIN_RANGE: (f64, f64) = (0.1, 2.0);
/// Vignette strength range.
pub const VIGNETTE_RANGE: (f64, f64) = (0.1, 1.0);
/// Digital noise strength range.
pub const NOISE_RANGE: (f64, f64) = (0.1, 1.0);

/// Zoom-removal factor range.
pub const ZOOM_RANGE: (f64, f64) = (1.01, 1.20);

/// Transition duration range in seconds.
pub const TRANSITION_DURATION_RANGE: (f64, f64) = (0.2, 3.0);

pub const DEFAULT_GRAIN_STRENGTH: f64 = 0.5;
pub const DEFAULT_VIGNETTE_STRENGTH: f64 = 0.3;
pub const DEFAULT_NOISE_STRENGTH: f64 = 0.3;
pub const DEFAULT_ZOOM_FACTOR: f64 = 1.05;
pub const DEFAULT_TRANSITION_DURATION: f64 = 0.8;

/// Default watermark box (width, height) in canvas pixels.
pub const DEFAULT_DELOGO_BOX: (u32, u32) = (260, 110);
/// Default distance of the watermark box from the canvas edges.
pub const DEFAULT_DELOGO_MARGIN: u32 = 30;

pub const DEFAULT_BITRATE_MBPS: u32 = 12;
pub const DEFAULT_ENCODER_PRESET: &str = "fast";

/// Clamps `value` into the inclusive `range`. NaN collapses to the lower bound.
pub(crate) fn clamp_to(value: f64, range: (f64, f64)) -> f64 {
    if value.is_nan() {
        return range.0;
    }
    value.max(range.0).min(range.1)
}

/// An optional effect with a strength clamped to a declared range.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EffectSetting {
    pub enabled: bool,
    pub strength: f64,
}

impl EffectSetting {
    /// Creates a setting with `strength` clamped into `range`.
    #[must_use]
    pub fn new(enabled: bool, strength: f64, range: (f64, f64)) -> Self {
        Self {
            enabled,
            strength: clamp_to(strength, range),
        }
    }

    #[must_use]
    pub fn disabled(strength: f64) -> Self {
        Self {
            enabled: false,
            strength,
        }
    }

    pub(crate) fn clamped(self, range: (f64, f64)) -> Self {
        Self::new(self.enabled, self.strength, range)
    }
}

/// Cinematic effect stack, applied in declaration order with the LUT last.
#[derive(Debug, Clone, PartialEq)]
pub struct CinematicEffects {
    pub film_grain: EffectSetting,
    pub vignette: EffectSetting,
    pub digital_noise: EffectSetting,
    /// 3D LUT file for color grading; omitted silently if unreadable.
    pub lut: Option<PathBuf>,
}

impl Default for CinematicEffects {
    fn default() -> Self {
        Self {
            film_grain: EffectSetting::disabled(DEFAULT_GRAIN_STRENGTH),
            vignette: EffectSetting::disabled(DEFAULT_VIGNETTE_STRENGTH),
            digital_noise: EffectSetting::disabled(DEFAULT_NOISE_STRENGTH),
            lut: None,
        }
    }
}

impl CinematicEffects {
    pub(crate) fn clamped(self) -> Self {
        Self {
            film_grain: self.film_grain.clamped(GRAIN_RANGE),
            vignette: self.vignette.clamped(VIGNETTE_RANGE),
            digital_noise: self.digital_noise.clamped(NOISE_RANGE),
            lut: self.lut,
        }
    }
}

/// Per-frame quality toggles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QualitySettings {
    pub sharpen: bool,
    pub color: bool,
    /// Skips sharpen/color and uses a faster scaler.
    pub max_speed: bool,
}

impl Default for QualitySettings {
    fn default() -> Self {
        Self {
            sharpen: true,
            color: true,
            max_speed: false,
        }
    }
}

/// Canvas corner that may hold a watermark.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Corner {
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

impl Corner {
    /// Fixed priority order, also used as the locator's tie-break order.
    pub const ALL: [Corner; 4] = [
        Corner::TopLeft,
        Corner::TopRight,
        Corner::BottomLeft,
        Corner::BottomRight,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Corner::TopLeft => "top_left",
            Corner::TopRight => "top_right",
            Corner::BottomLeft => "bottom_left",
            Corner::BottomRight => "bottom_right",
        }
    }
}

impl fmt::Display for Corner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Watermark corner as requested by the user.
///
/// `Auto` is resolved into one concrete [`Corner`] before compilation and
/// never reaches the filter compiler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CornerChoice {
    Auto,
    Fixed(Corner),
}

impl std::str::FromStr for CornerChoice {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace('-', "_").as_str() {
            "auto" => Ok(CornerChoice::Auto),
            "top_left" => Ok(CornerChoice::Fixed(Corner::TopLeft)),
            "top_right" => Ok(CornerChoice::Fixed(Corner::TopRight)),
            "bottom_left" => Ok(CornerChoice::Fixed(Corner::BottomLeft)),
            "bottom_right" => Ok(CornerChoice::Fixed(Corner::BottomRight)),
            other => Err(format!(
                "unknown corner '{other}' (expected auto, top_left, top_right, bottom_left or bottom_right)"
            )),
        }
    }
}

/// Watermark removal request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DelogoSpec {
    pub corner: CornerChoice,
    /// Box (width, height) in canvas pixels.
    pub box_size: (u32, u32),
    pub margin: u32,
}

impl Default for DelogoSpec {
    fn default() -> Self {
        Self {
            corner: CornerChoice::Auto,
            box_size: DEFAULT_DELOGO_BOX,
            margin: DEFAULT_DELOGO_MARGIN,
        }
    }
}

/// Zoom-based watermark removal.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ZoomSpec {
    pub enabled: bool,
    /// Manual zoom factor, clamped to [`ZOOM_RANGE`].
    pub factor: f64,
    /// Derive the factor from the delogo box instead of `factor`.
    pub auto: bool,
}

impl Default for ZoomSpec {
    fn default() -> Self {
        Self {
            enabled: false,
            factor: DEFAULT_ZOOM_FACTOR,
            auto: false,
        }
    }
}

/// Cross-fade blend used between two inputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionKind {
    Fade,
    Crossfade,
    Wipe,
    Slide,
    ZoomIn,
    Blur,
}

impl std::str::FromStr for TransitionKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace(['-', '_'], "").as_str() {
            "fade" => Ok(TransitionKind::Fade),
            "crossfade" | "dissolve" => Ok(TransitionKind::Crossfade),
            "wipe" => Ok(TransitionKind::Wipe),
            "slide" => Ok(TransitionKind::Slide),
            "zoom" | "zoomin" => Ok(TransitionKind::ZoomIn),
            "blur" => Ok(TransitionKind::Blur),
            other => Err(format!("unknown transition '{other}'")),
        }
    }
}

/// Transition between exactly two inputs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransitionSpec {
    pub kind: TransitionKind,
    /// Blend length in seconds, clamped to [`TRANSITION_DURATION_RANGE`].
    pub duration: f64,
    /// Cosine audio curve instead of triangular.
    pub smooth: bool,
}

impl Default for TransitionSpec {
    fn default() -> Self {
        Self {
            kind: TransitionKind::Crossfade,
            duration: DEFAULT_TRANSITION_DURATION,
            smooth: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Codec {
    H264,
    H265,
}

impl std::str::FromStr for Codec {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace('.', "").as_str() {
            "h264" | "avc" => Ok(Codec::H264),
            "h265" | "hevc" => Ok(Codec::H265),
            other => Err(format!("unknown codec '{other}' (expected h264 or h265)")),
        }
    }
}

/// Output encoding options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExportSpec {
    pub codec: Codec,
    pub bitrate_mbps: u32,
    pub keep_audio: bool,
    /// Overrides `keep_audio`.
    pub mute_all: bool,
    pub strip_metadata: bool,
    pub hide_qr: bool,
}

impl Default for ExportSpec {
    fn default() -> Self {
        Self {
            codec: Codec::H264,
            bitrate_mbps: DEFAULT_BITRATE_MBPS,
            keep_audio: true,
            mute_all: false,
            strip_metadata: true,
            hide_qr: false,
        }
    }
}

impl ExportSpec {
    /// Whether any audio should reach the output.
    #[must_use]
    pub fn wants_audio(&self) -> bool {
        self.keep_audio && !self.mute_all
    }
}

/// Encoder performance options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PerformanceSpec {
    pub use_hardware_encoder: bool,
    pub hardware_decode: bool,
    pub encoder_preset: String,
    /// 0 lets ffmpeg decide.
    pub threads: u32,
    /// 0 lets ffmpeg decide.
    pub filter_threads: u32,
    pub faststart: bool,
}

impl Default for PerformanceSpec {
    fn default() -> Self {
        Self {
            use_hardware_encoder: false,
            hardware_decode: false,
            encoder_preset: DEFAULT_ENCODER_PRESET.to_string(),
            threads: 0,
            filter_threads: 0,
            faststart: true,
        }
    }
}

/// Validated, immutable description of one build.
///
/// Construct with [`PipelineConfig::builder`]. `inputs` always reflects the
/// post-duplication list when a single input was looped.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineConfig {
    pub(crate) inputs: Vec<PathBuf>,
    pub(crate) output: PathBuf,
    pub(crate) work_dir: PathBuf,
    pub(crate) vertical_canvas: bool,
    pub(crate) force_fps: bool,
    pub(crate) quality: QualitySettings,
    pub(crate) cinematic: CinematicEffects,
    pub(crate) delogo: Option<DelogoSpec>,
    pub(crate) zoom: ZoomSpec,
    pub(crate) transition: Option<TransitionSpec>,
    pub(crate) export: ExportSpec,
    pub(crate) performance: PerformanceSpec,
}

impl PipelineConfig {
    /// Starts a builder for the given ordered inputs and destination.
    pub fn builder<I, P>(inputs: I, output: impl Into<PathBuf>) -> PipelineConfigBuilder
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        PipelineConfigBuilder::new(inputs, output)
    }

    #[must_use]
    pub fn inputs(&self) -> &[PathBuf] {
        &self.inputs
    }

    #[must_use]
    pub fn output(&self) -> &Path {
        &self.output
    }

    /// Directory receiving the transient concat manifest.
    #[must_use]
    pub fn work_dir(&self) -> &Path {
        &self.work_dir
    }

    #[must_use]
    pub fn vertical_canvas(&self) -> bool {
        self.vertical_canvas
    }

    #[must_use]
    pub fn force_fps(&self) -> bool {
        self.force_fps
    }

    #[must_use]
    pub fn quality(&self) -> QualitySettings {
        self.quality
    }

    #[must_use]
    pub fn cinematic(&self) -> &CinematicEffects {
        &self.cinematic
    }

    #[must_use]
    pub fn delogo(&self) -> Option<&DelogoSpec> {
        self.delogo.as_ref()
    }

    #[must_use]
    pub fn zoom(&self) -> ZoomSpec {
        self.zoom
    }

    #[must_use]
    pub fn transition(&self) -> Option<&TransitionSpec> {
        self.transition.as_ref()
    }

    #[must_use]
    pub fn export(&self) -> ExportSpec {
        self.export
    }

    #[must_use]
    pub fn performance(&self) -> &PerformanceSpec {
        &self.performance
    }

    /// True when the two-input transition graph will be compiled.
    #[must_use]
    pub fn uses_transition(&self) -> bool {
        self.transition.is_some() && self.inputs.len() == 2
    }

    /// True when the watermark is pushed off-frame by zooming instead of blurred.
    ///
    /// Zooming is not combined with the hardware encoder.
    #[must_use]
    pub fn uses_zoom_removal(&self) -> bool {
        self.zoom.enabled && self.delogo.is_some() && !self.performance.use_hardware_encoder
    }
}
