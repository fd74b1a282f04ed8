//! Implementation of the 'locate' subcommand.

use crate::cli::LocateArgs;

use anyhow::Context;
use log::warn;
use reelsmith_core::external::{
    FfmpegFrameGrabber, ReferenceFrameSource, SidecarSpawner, Tool, ToolLocator,
};
use reelsmith_core::processing::filters::FALLBACK_CORNER;
use reelsmith_core::{LocatedWatermark, locate_watermark};

/// Captures the first frame of the input and prints the locator verdict as JSON.
///
/// Without a frame the verdict is the unscored default corner that `build`
/// would also use.
pub fn run_locate(args: &LocateArgs, locator: &ToolLocator) -> anyhow::Result<LocatedWatermark> {
    let ffmpeg = locator.resolve(Tool::Ffmpeg)?;
    let (box_size, margin) = (args.watermark_box.box_size, args.watermark_box.margin);

    let grabber = FfmpegFrameGrabber::new(SidecarSpawner, ffmpeg);
    let located = match grabber.first_frame(&args.input) {
        Some(frame) => locate_watermark(&frame, box_size, margin),
        None => {
            warn!(
                "No frame captured from {}, reporting the default {FALLBACK_CORNER} corner",
                args.input.display()
            );
            LocatedWatermark::fixed(FALLBACK_CORNER, box_size, margin)
        }
    };

    let json = serde_json::to_string_pretty(&located).context("Failed to serialise verdict")?;
    println!("{json}");
    Ok(located)
}
