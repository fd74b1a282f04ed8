//! Watermark corner locator.
//!
//! Scores the four canonical corner boxes of one reference frame and picks
//! the one most likely to hold a watermark. Watermarks are usually small,
//! bright and detailed, so each box is scored as
//! `0.7 * variance(laplacian) + 0.3 * mean`.
//!
//! The frame is first composed onto the canvas with the same letterbox rule
//! the filter compiler uses, so the chosen box lines up with what is later
//! blurred or zoomed away.

use super::geometry::{DelogoRegion, corner_offset, delogo_region, letterbox};
use crate::config::{CANVAS_HEIGHT, CANVAS_WIDTH, Corner};
use image::imageops::{self, FilterType};
use image::{GrayImage, Luma, RgbImage};
use serde::Serialize;

const DETAIL_WEIGHT: f64 = 0.7;
const BRIGHTNESS_WEIGHT: f64 = 0.3;

/// Locator verdict: the chosen corner and its canvas region.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LocatedWatermark {
    pub corner: Corner,
    pub region: DelogoRegion,
    /// Heuristic score of the chosen box; `None` when no box was scored.
    pub score: Option<f64>,
}

impl LocatedWatermark {
    /// Verdict for a fixed corner, used when no frame could be captured.
    #[must_use]
    pub fn fixed(corner: Corner, box_size: (u32, u32), margin: u32) -> Self {
        Self {
            corner,
            region: delogo_region(corner, box_size, margin),
            score: None,
        }
    }
}

/// Locates the watermark in `frame`.
///
/// Corners are visited top-left, top-right, bottom-left, bottom-right and a
/// later corner only wins with a strictly higher score, so ties resolve to
/// the earlier corner. Boxes that would leave the canvas are skipped; if all
/// of them are, the top-left box is returned unscored.
#[must_use]
pub fn locate_watermark(frame: &RgbImage, box_size: (u32, u32), margin: u32) -> LocatedWatermark {
    let canvas = compose_on_canvas(frame);
    locate_on_canvas(&canvas, box_size, margin)
}

fn locate_on_canvas(canvas: &GrayImage, box_size: (u32, u32), margin: u32) -> LocatedWatermark {
    let mut best: Option<LocatedWatermark> = None;

    for corner in Corner::ALL {
        let Some((x, y)) = corner_offset(corner, box_size, margin) else {
            log::debug!("Skipping {corner}: box leaves the canvas");
            continue;
        };
        let region = DelogoRegion {
            x,
            y,
            w: box_size.0,
            h: box_size.1,
        };
        let score = roi_score(canvas, region);
        log::debug!("Watermark score for {corner}: {score:.3}");

        let better = best
            .as_ref()
            .and_then(|b| b.score)
            .is_none_or(|current| score > current);
        if better {
            best = Some(LocatedWatermark {
                corner,
                region,
                score: Some(score),
            });
        }
    }

    best.unwrap_or_else(|| LocatedWatermark::fixed(Corner::TopLeft, box_size, margin))
}

/// Letterboxes `frame` onto a black grayscale canvas.
#[must_use]
pub fn compose_on_canvas(frame: &RgbImage) -> GrayImage {
    let gray = to_gray(frame);
    let lb = letterbox(frame.width(), frame.height());

    let scaled = if gray.dimensions() == (lb.scaled_width, lb.scaled_height) {
        gray
    } else {
        imageops::resize(&gray, lb.scaled_width, lb.scaled_height, FilterType::Lanczos3)
    };

    let mut canvas = GrayImage::new(CANVAS_WIDTH, CANVAS_HEIGHT);
    imageops::replace(&mut canvas, &scaled, i64::from(lb.pad_x), i64::from(lb.pad_y));
    canvas
}

/// BT.601 luma.
fn to_gray(frame: &RgbImage) -> GrayImage {
    GrayImage::from_fn(frame.width(), frame.height(), |x, y| {
        let [r, g, b] = frame.get_pixel(x, y).0;
        let luma = (299 * u32::from(r) + 587 * u32::from(g) + 114 * u32::from(b) + 500) / 1000;
        Luma([luma.min(255) as u8])
    })
}

/// `0.7 * var(laplacian(roi)) + 0.3 * mean(roi)`.
///
/// The 4-neighbour laplacian reflects at the box border (`dcb|abcd|cba`).
fn roi_score(canvas: &GrayImage, region: DelogoRegion) -> f64 {
    let (w, h) = (i64::from(region.w), i64::from(region.h));
    if w == 0 || h == 0 {
        return 0.0;
    }

    let at = |cx: i64, cy: i64| -> f64 {
        let px = region.x + reflect101(cx, w) as u32;
        let py = region.y + reflect101(cy, h) as u32;
        f64::from(canvas.get_pixel(px, py).0[0])
    };

    let count = (w * h) as f64;
    let mut intensity_sum = 0.0;
    let mut lap_sum = 0.0;
    let mut lap_sq_sum = 0.0;

    for cy in 0..h {
        for cx in 0..w {
            let center = at(cx, cy);
            let lap = at(cx - 1, cy) + at(cx + 1, cy) + at(cx, cy - 1) + at(cx, cy + 1) - 4.0 * center;
            intensity_sum += center;
            lap_sum += lap;
            lap_sq_sum += lap * lap;
        }
    }

    let mean = intensity_sum / count;
    let lap_mean = lap_sum / count;
    let lap_variance = (lap_sq_sum / count - lap_mean * lap_mean).max(0.0);

    DETAIL_WEIGHT * lap_variance + BRIGHTNESS_WEIGHT * mean
}

fn reflect101(i: i64, n: i64) -> i64 {
    if n == 1 {
        return 0;
    }
    if i < 0 {
        -i
    } else if i >= n {
        2 * n - 2 - i
    } else {
        i
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flat_canvas(value: u8) -> GrayImage {
        GrayImage::from_pixel(CANVAS_WIDTH, CANVAS_HEIGHT, Luma([value]))
    }

    fn paint_checker(canvas: &mut GrayImage, x0: u32, y0: u32, w: u32, h: u32) {
        for y in y0..y0 + h {
            for x in x0..x0 + w {
                let on = ((x / 4) + (y / 4)) % 2 == 0;
                canvas.put_pixel(x, y, Luma([if on { 255 } else { 0 }]));
            }
        }
    }

    #[test]
    fn test_reflect101() {
        assert_eq!(reflect101(-1, 5), 1);
        assert_eq!(reflect101(5, 5), 3);
        assert_eq!(reflect101(2, 5), 2);
        assert_eq!(reflect101(-1, 1), 0);
    }

    #[test]
    fn test_flat_region_scores_brightness_only() {
        let canvas = flat_canvas(100);
        let score = roi_score(&canvas, DelogoRegion { x: 0, y: 0, w: 10, h: 10 });
        assert!((score - 30.0).abs() < 1e-9);
    }

    #[test]
    fn test_detailed_corner_wins() {
        let mut canvas = flat_canvas(40);
        paint_checker(&mut canvas, 30, 3700, 260, 110);
        let located = locate_on_canvas(&canvas, (260, 110), 30);
        assert_eq!(located.corner, Corner::BottomLeft);
        assert_eq!(located.region, DelogoRegion { x: 30, y: 3700, w: 260, h: 110 });
    }

    #[test]
    fn test_ties_resolve_to_top_left() {
        let canvas = flat_canvas(128);
        assert_eq!(locate_on_canvas(&canvas, (260, 110), 30).corner, Corner::TopLeft);
    }

    #[test]
    fn test_all_boxes_out_of_frame_defaults_to_top_left() {
        let canvas = flat_canvas(0);
        let located = locate_on_canvas(&canvas, (2160, 3840), 30);
        assert_eq!(located.corner, Corner::TopLeft);
        assert_eq!(located.score, None);
    }

    #[test]
    fn test_gray_conversion_uses_bt601() {
        let frame = RgbImage::from_pixel(1, 1, image::Rgb([255, 0, 0]));
        assert_eq!(to_gray(&frame).get_pixel(0, 0).0[0], 76);
    }
}
