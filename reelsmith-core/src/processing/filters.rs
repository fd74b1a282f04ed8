// ============================================================================
// reelsmith-core/src/processing/filters.rs
// ============================================================================
//
// FILTER COMPILER: Per-Frame Filter Chains
//
// Builds the ordered per-frame filter chain (geometry, sharpen, color,
// cinematic effects, frame rate) and the crop+blur+overlay stages used for
// watermark and QR-code obscuring. Everything here is a pure function of its
// arguments.
//
// KEY COMPONENTS:
// - VideoFilterChain: comma-joined filter chain builder
// - frame_chain: steps 1-4 of the fixed filter order, or the zoom-crop chain
// - DelogoStage / resolve_delogo: concrete watermark handling for one build
// - delogo_blur / qr_blur: crop+blur+overlay graph fragments

use super::geometry::{DelogoRegion, ZoomCrop, auto_zoom_factor, delogo_region, zoom_crop};
use super::watermark::LocatedWatermark;
use crate::config::{
    CANVAS_HEIGHT, CANVAS_WIDTH, Corner, CornerChoice, PipelineConfig, TARGET_FPS,
};
use crate::utils::escape_filter_value;
use std::f64::consts::FRAC_PI_2;
use std::path::Path;

// ---- Fixed filter parameters ----
const SHARPEN_FILTER: &str = "unsharp=5:5:1.0:5:5:0.0";
const COLOR_FILTER: &str = "eq=contrast=1.05:brightness=0.02:saturation=1.03";
const DELOGO_BLUR_RADIUS: u32 = 20;
const QR_PATCH_SIZE: u32 = 200;
const QR_BLUR_RADIUS: u32 = 10;
const BLUR_POWER: u32 = 2;

/// Corner used when the watermark position is automatic but no frame was captured.
pub const FALLBACK_CORNER: Corner = Corner::TopRight;

/// Builder for a comma-joined filter chain.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VideoFilterChain {
    filters: Vec<String>,
}

impl VideoFilterChain {
    /// Creates a new empty filter chain
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a filter to the chain; empty filters are ignored
    #[must_use]
    pub fn add_filter(mut self, filter: impl Into<String>) -> Self {
        let filter = filter.into();
        if !filter.is_empty() {
            self.filters.push(filter);
        }
        self
    }

    /// Adds a filter only when `condition` holds
    #[must_use]
    pub fn add_filter_if(self, condition: bool, filter: impl Into<String>) -> Self {
        if condition { self.add_filter(filter) } else { self }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }

    /// Builds the filter chain into a single filter string
    #[must_use]
    pub fn build(self) -> Option<String> {
        if self.filters.is_empty() {
            None
        } else {
            Some(self.filters.join(","))
        }
    }

    /// Builds the chain, substituting the pass-through `null` filter when empty
    #[must_use]
    pub fn build_or_null(self) -> String {
        self.build().unwrap_or_else(|| "null".to_string())
    }
}

// ============================================================================
// FRAME CHAIN
// ============================================================================

/// Aspect-preserving scale into the canvas followed by centred black padding.
#[must_use]
pub fn geometry_filters(max_speed: bool) -> [String; 2] {
    let flags = if max_speed { "bicubic" } else { "lanczos" };
    [
        format!(
            "scale={CANVAS_WIDTH}:{CANVAS_HEIGHT}:flags={flags}:force_original_aspect_ratio=decrease"
        ),
        format!("pad={CANVAS_WIDTH}:{CANVAS_HEIGHT}:(ow-iw)/2:(oh-ih)/2:color=black"),
    ]
}

/// Scale-then-crop filters hiding one corner.
#[must_use]
pub fn zoom_filters(zoom: ZoomCrop) -> [String; 2] {
    [
        format!(
            "scale={}:{}:flags=bicubic",
            zoom.scaled_width, zoom.scaled_height
        ),
        format!(
            "crop={CANVAS_WIDTH}:{CANVAS_HEIGHT}:{}:{}",
            zoom.crop_x, zoom.crop_y
        ),
    ]
}

/// Cinematic effects in their fixed order: grain, vignette, digital noise, LUT.
///
/// The LUT stage is only emitted when `lut_available` is set, which the caller
/// determines by opening the file.
#[must_use]
pub fn cinematic_filters(config: &PipelineConfig, lut_available: bool) -> Vec<String> {
    let effects = config.cinematic();
    let mut filters = Vec::new();

    if effects.film_grain.enabled {
        filters.push(format!("noise=alls={}", (effects.film_grain.strength * 20.0) as u32));
    }
    if effects.vignette.enabled {
        filters.push(format!("vignette=angle={:.4}", effects.vignette.strength * FRAC_PI_2));
    }
    if effects.digital_noise.enabled {
        filters.push(format!("noise=alls={}", (effects.digital_noise.strength * 10.0) as u32));
    }
    if let Some(lut) = effects.lut.as_deref().filter(|_| lut_available) {
        filters.push(lut_filter(lut));
    }

    filters
}

fn lut_filter(path: &Path) -> String {
    format!("lut3d=file={}", escape_filter_value(&path.to_string_lossy()))
}

/// Frame-rate conversion to the target rate.
#[must_use]
pub fn frame_rate_filter() -> String {
    format!("fps={TARGET_FPS}")
}

/// Steps 1-4 of the per-frame order: geometry, sharpen, color, cinematic.
///
/// A zoom crop replaces the whole chain.
#[must_use]
pub fn frame_chain(
    config: &PipelineConfig,
    lut_available: bool,
    zoom: Option<ZoomCrop>,
) -> VideoFilterChain {
    let mut chain = VideoFilterChain::new();
    if let Some(zoom) = zoom {
        for filter in zoom_filters(zoom) {
            chain = chain.add_filter(filter);
        }
        return chain;
    }

    let quality = config.quality();
    if config.vertical_canvas() {
        for filter in geometry_filters(quality.max_speed) {
            chain = chain.add_filter(filter);
        }
    }

    let tuned = !quality.max_speed;
    chain = chain
        .add_filter_if(tuned && quality.sharpen, SHARPEN_FILTER)
        .add_filter_if(tuned && quality.color, COLOR_FILTER);

    for filter in cinematic_filters(config, lut_available) {
        chain = chain.add_filter(filter);
    }
    chain
}

// ============================================================================
// WATERMARK HANDLING
// ============================================================================

/// How the watermark is removed in this build.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DelogoStage {
    /// Zoom in and crop the corner away; part of every input's frame chain.
    Zoom { corner: Corner, crop: ZoomCrop },
    /// Blur the region in place after all other per-frame filters.
    Blur(DelogoRegion),
}

/// Turns the configured delogo spec into a concrete stage.
///
/// An automatic corner comes from `located`; without a locator verdict it
/// falls back to [`FALLBACK_CORNER`].
#[must_use]
pub fn resolve_delogo(
    config: &PipelineConfig,
    located: Option<&LocatedWatermark>,
) -> Option<DelogoStage> {
    let delogo = config.delogo()?;
    let corner = match delogo.corner {
        CornerChoice::Fixed(corner) => corner,
        CornerChoice::Auto => located.map_or(FALLBACK_CORNER, |l| l.corner),
    };

    if config.uses_zoom_removal() {
        let zoom = config.zoom();
        let factor = if zoom.auto {
            auto_zoom_factor(delogo.box_size, delogo.margin)
        } else {
            zoom.factor
        };
        Some(DelogoStage::Zoom {
            corner,
            crop: zoom_crop(corner, factor),
        })
    } else {
        Some(DelogoStage::Blur(delogo_region(
            corner,
            delogo.box_size,
            delogo.margin,
        )))
    }
}

/// Blur radius for a box: 20, capped at a quarter of the shorter side.
#[must_use]
pub fn delogo_blur_radius(region: DelogoRegion) -> u32 {
    (region.w.min(region.h) / 4).clamp(1, DELOGO_BLUR_RADIUS)
}

/// One crop+blur+overlay patch.
struct BlurPatch {
    w: u32,
    h: u32,
    crop_x: String,
    crop_y: String,
    overlay_x: String,
    overlay_y: String,
}

/// Crop each patch out of a copy of the frame, blur it and composite it back.
///
/// The fragment starts with `split` so the caller prefixes the input label;
/// the final overlay carries `output` as its label when given.
fn blur_patches(prefix: &str, patches: &[BlurPatch], radius: u32, output: Option<&str>) -> String {
    let mut split = format!("split={}[{prefix}_base]", patches.len() + 1);
    for i in 0..patches.len() {
        split.push_str(&format!("[{prefix}_c{i}]"));
    }

    let mut parts = vec![split];
    for (i, p) in patches.iter().enumerate() {
        parts.push(format!(
            "[{prefix}_c{i}]crop={}:{}:{}:{},boxblur={radius}:{BLUR_POWER}[{prefix}_b{i}]",
            p.w, p.h, p.crop_x, p.crop_y
        ));
    }

    let mut current = format!("{prefix}_base");
    for (i, p) in patches.iter().enumerate() {
        let last = i + 1 == patches.len();
        let label = if last {
            output.map(|o| format!("[{o}]")).unwrap_or_default()
        } else {
            format!("[{prefix}_t{i}]")
        };
        parts.push(format!(
            "[{current}][{prefix}_b{i}]overlay={}:{}{label}",
            p.overlay_x, p.overlay_y
        ));
        current = format!("{prefix}_t{i}");
    }

    parts.join(";")
}

/// Blur-overlay stage for the watermark region.
#[must_use]
pub fn delogo_blur(region: DelogoRegion, output: Option<&str>) -> String {
    let x = region.x.to_string();
    let y = region.y.to_string();
    let patch = BlurPatch {
        w: region.w,
        h: region.h,
        crop_x: x.clone(),
        crop_y: y.clone(),
        overlay_x: x,
        overlay_y: y,
    };
    blur_patches("dl", &[patch], delogo_blur_radius(region), output)
}

/// Blurs the four fixed 200x200 corners where QR codes are usually placed.
#[must_use]
pub fn qr_blur(output: Option<&str>) -> String {
    let s = QR_PATCH_SIZE;
    let corner = |crop_x: String, crop_y: String, overlay_x: String, overlay_y: String| BlurPatch {
        w: s,
        h: s,
        crop_x,
        crop_y,
        overlay_x,
        overlay_y,
    };
    let patches = [
        corner("0".into(), "0".into(), "0".into(), "0".into()),
        corner(format!("iw-{s}"), "0".into(), format!("W-{s}"), "0".into()),
        corner("0".into(), format!("ih-{s}"), "0".into(), format!("H-{s}")),
        corner(format!("iw-{s}"), format!("ih-{s}"), format!("W-{s}"), format!("H-{s}")),
    ];
    blur_patches("qr", &patches, QR_BLUR_RADIUS, output)
}
