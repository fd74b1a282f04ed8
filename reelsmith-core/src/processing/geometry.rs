//! Canvas geometry: letterbox placement, delogo regions and zoom crops.
//!
//! All geometry is computed against the fixed 2160x3840 canvas. The same
//! functions feed both the filter compiler and the watermark locator, so the
//! region the locator scores is the region the compiler later blurs or crops.

use crate::config::{CANVAS_HEIGHT, CANVAS_WIDTH, Corner, ZOOM_RANGE, clamp_to};
use serde::Serialize;

/// Placement of a source frame on the canvas after letterboxing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Letterbox {
    pub scaled_width: u32,
    pub scaled_height: u32,
    pub pad_x: u32,
    pub pad_y: u32,
}

/// Aspect-preserving fit of a `width`x`height` frame into the canvas.
///
/// Mirrors `scale=...:force_original_aspect_ratio=decrease` followed by a
/// centred `pad`: each candidate side is rounded to the nearest pixel and the
/// smaller fit wins; pad offsets snap down to even values as the pad filter
/// does for 4:2:0 frames.
#[must_use]
pub fn letterbox(width: u32, height: u32) -> Letterbox {
    if width == 0 || height == 0 {
        return Letterbox {
            scaled_width: CANVAS_WIDTH,
            scaled_height: CANVAS_HEIGHT,
            pad_x: 0,
            pad_y: 0,
        };
    }

    let (w, h) = (u64::from(width), u64::from(height));
    let (cw, ch) = (u64::from(CANVAS_WIDTH), u64::from(CANVAS_HEIGHT));
    let fit_w = rescale(ch, w, h).min(cw);
    let fit_h = rescale(cw, h, w).min(ch);
    let scaled_width = fit_w.max(1) as u32;
    let scaled_height = fit_h.max(1) as u32;

    Letterbox {
        scaled_width,
        scaled_height,
        pad_x: ((CANVAS_WIDTH - scaled_width) / 2) & !1,
        pad_y: ((CANVAS_HEIGHT - scaled_height) / 2) & !1,
    }
}

/// `a * b / c` rounded to nearest.
fn rescale(a: u64, b: u64, c: u64) -> u64 {
    (a * b + c / 2) / c
}

/// Watermark box in canvas pixel space.
///
/// Always satisfies `x <= CANVAS_WIDTH - w` and `y <= CANVAS_HEIGHT - h`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DelogoRegion {
    pub x: u32,
    pub y: u32,
    pub w: u32,
    pub h: u32,
}

/// Unclamped top-left offset of the box in `corner`.
///
/// Returns `None` when the box would leave the canvas.
#[must_use]
pub fn corner_offset(corner: Corner, box_size: (u32, u32), margin: u32) -> Option<(u32, u32)> {
    let (w, h) = (i64::from(box_size.0), i64::from(box_size.1));
    let m = i64::from(margin);
    let (cw, ch) = (i64::from(CANVAS_WIDTH), i64::from(CANVAS_HEIGHT));

    let x = match corner {
        Corner::TopLeft | Corner::BottomLeft => m,
        Corner::TopRight | Corner::BottomRight => cw - w - m,
    };
    let y = match corner {
        Corner::TopLeft | Corner::TopRight => m,
        Corner::BottomLeft | Corner::BottomRight => ch - h - m,
    };

    let fits = x >= 0 && y >= 0 && x + w <= cw && y + h <= ch;
    fits.then(|| (x as u32, y as u32))
}

/// Region for `corner`, clamped into the canvas.
#[must_use]
pub fn delogo_region(corner: Corner, box_size: (u32, u32), margin: u32) -> DelogoRegion {
    let w = box_size.0.min(CANVAS_WIDTH);
    let h = box_size.1.min(CANVAS_HEIGHT);
    let max_x = CANVAS_WIDTH - w;
    let max_y = CANVAS_HEIGHT - h;

    let x = match corner {
        Corner::TopLeft | Corner::BottomLeft => margin.min(max_x),
        Corner::TopRight | Corner::BottomRight => max_x.saturating_sub(margin),
    };
    let y = match corner {
        Corner::TopLeft | Corner::TopRight => margin.min(max_y),
        Corner::BottomLeft | Corner::BottomRight => max_y.saturating_sub(margin),
    };

    DelogoRegion { x, y, w, h }
}

/// Zoom factor just large enough to push the box plus margin off-frame.
#[must_use]
pub fn auto_zoom_factor(box_size: (u32, u32), margin: u32) -> f64 {
    let along_x = f64::from(box_size.0 + margin) / f64::from(CANVAS_WIDTH);
    let along_y = f64::from(box_size.1 + margin) / f64::from(CANVAS_HEIGHT);
    clamp_to(1.0 + along_x.max(along_y), ZOOM_RANGE)
}

/// Scale-then-crop window that hides one corner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ZoomCrop {
    pub scaled_width: u32,
    pub scaled_height: u32,
    pub crop_x: u32,
    pub crop_y: u32,
}

/// Computes the zoom window for a watermark in `corner`.
///
/// The canvas-sized crop is anchored on the side opposite the watermark, so
/// the enlarged border containing it falls outside the window.
#[must_use]
pub fn zoom_crop(corner: Corner, factor: f64) -> ZoomCrop {
    let factor = clamp_to(factor, ZOOM_RANGE);
    let scaled_width = round_even(f64::from(CANVAS_WIDTH) * factor).max(CANVAS_WIDTH);
    let scaled_height = round_even(f64::from(CANVAS_HEIGHT) * factor).max(CANVAS_HEIGHT);
    let spare_x = scaled_width - CANVAS_WIDTH;
    let spare_y = scaled_height - CANVAS_HEIGHT;

    let (crop_x, crop_y) = match corner {
        Corner::TopRight => (0, spare_y),
        Corner::TopLeft => (spare_x, spare_y),
        Corner::BottomRight => (0, 0),
        Corner::BottomLeft => (spare_x, 0),
    };

    ZoomCrop {
        scaled_width,
        scaled_height,
        crop_x,
        crop_y,
    }
}

fn round_even(value: f64) -> u32 {
    ((value / 2.0).round() * 2.0) as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_letterbox_landscape() {
        let lb = letterbox(1920, 1080);
        assert_eq!(lb.scaled_width, 2160);
        assert_eq!(lb.scaled_height, 1215);
        assert_eq!(lb.pad_x, 0);
        assert_eq!(lb.pad_y, 1312);
    }

    #[test]
    fn test_letterbox_matching_aspect_fills_canvas() {
        let lb = letterbox(1080, 1920);
        assert_eq!((lb.scaled_width, lb.scaled_height), (2160, 3840));
        assert_eq!((lb.pad_x, lb.pad_y), (0, 0));
    }

    #[test]
    fn test_default_box_corners() {
        let b = (260, 110);
        assert_eq!(delogo_region(Corner::TopLeft, b, 30), DelogoRegion { x: 30, y: 30, w: 260, h: 110 });
        assert_eq!(delogo_region(Corner::TopRight, b, 30).x, 2160 - 260 - 30);
        assert_eq!(delogo_region(Corner::BottomLeft, b, 30).y, 3840 - 110 - 30);
        let br = delogo_region(Corner::BottomRight, b, 30);
        assert_eq!((br.x, br.y), (1870, 3700));
    }

    #[test]
    fn test_region_clamps_huge_margin() {
        let region = delogo_region(Corner::TopLeft, (260, 110), 5000);
        assert_eq!((region.x, region.y), (1900, 3730));
        let region = delogo_region(Corner::BottomRight, (260, 110), 5000);
        assert_eq!((region.x, region.y), (0, 0));
    }

    #[test]
    fn test_corner_offset_skips_out_of_frame() {
        assert_eq!(corner_offset(Corner::TopRight, (260, 110), 30), Some((1870, 30)));
        assert_eq!(corner_offset(Corner::TopRight, (2160, 110), 30), None);
        assert_eq!(corner_offset(Corner::TopLeft, (2160, 110), 30), None);
    }

    #[test]
    fn test_auto_zoom_factor_for_default_box() {
        let z = auto_zoom_factor((260, 110), 30);
        assert!((z - (1.0 + 290.0 / 2160.0)).abs() < 1e-12);
        assert!((z - 1.1343).abs() < 1e-4);
    }

    #[test]
    fn test_auto_zoom_factor_is_clamped() {
        assert_eq!(auto_zoom_factor((10, 10), 0), 1.01);
        assert_eq!(auto_zoom_factor((1000, 1000), 100), 1.20);
    }

    #[test]
    fn test_zoom_crop_anchors_opposite_corner() {
        let tr = zoom_crop(Corner::TopRight, 1.1);
        assert_eq!((tr.scaled_width, tr.scaled_height), (2376, 4224));
        assert_eq!((tr.crop_x, tr.crop_y), (0, 384));
        let tl = zoom_crop(Corner::TopLeft, 1.1);
        assert_eq!((tl.crop_x, tl.crop_y), (216, 384));
        let br = zoom_crop(Corner::BottomRight, 1.1);
        assert_eq!((br.crop_x, br.crop_y), (0, 0));
        let bl = zoom_crop(Corner::BottomLeft, 1.1);
        assert_eq!((bl.crop_x, bl.crop_y), (216, 0));
    }
}
