//! Reference-frame capture for the watermark locator.
//!
//! The first video frame of an input is decoded by the encoder tool itself
//! (`-frames:v 1 -f rawvideo -pix_fmt rgb24 -`) and collected from the
//! sidecar's `OutputFrame` event.

use super::ffmpeg_executor::{FfmpegProcess, FfmpegSpawner};
use crate::encoding::EncoderCommand;
use ffmpeg_sidecar::event::FfmpegEvent;
use image::RgbImage;
use std::path::{Path, PathBuf};

/// Something that can produce one decoded RGB frame of an input.
///
/// `None` means capture failed for any reason.
pub trait ReferenceFrameSource {
    fn first_frame(&self, input: &Path) -> Option<RgbImage>;
}

/// Grabs frames by running the encoder tool through an [`FfmpegSpawner`].
pub struct FfmpegFrameGrabber<S: FfmpegSpawner> {
    spawner: S,
    ffmpeg: PathBuf,
}

impl<S: FfmpegSpawner> FfmpegFrameGrabber<S> {
    pub fn new(spawner: S, ffmpeg: impl Into<PathBuf>) -> Self {
        Self {
            spawner,
            ffmpeg: ffmpeg.into(),
        }
    }

    /// The capture command for `input`.
    #[must_use]
    pub fn capture_command(&self, input: &Path) -> EncoderCommand {
        let mut args = vec![
            "-hide_banner".to_string(),
            "-i".to_string(),
            input.to_string_lossy().into_owned(),
        ];
        args.extend(
            ["-frames:v", "1", "-an", "-f", "rawvideo", "-pix_fmt", "rgb24", "-"]
                .iter()
                .map(|s| (*s).to_string()),
        );
        EncoderCommand::new(self.ffmpeg.clone(), args)
    }
}

impl<S: FfmpegSpawner> ReferenceFrameSource for FfmpegFrameGrabber<S> {
    fn first_frame(&self, input: &Path) -> Option<RgbImage> {
        let command = self.capture_command(input);
        let mut process = match self.spawner.spawn(&command) {
            Ok(process) => process,
            Err(e) => {
                log::warn!("Could not start frame capture for {}: {e}", input.display());
                return None;
            }
        };

        let mut frame = None;
        let handled = process.handle_events(|event| {
            if frame.is_none() {
                if let FfmpegEvent::OutputFrame(output) = event {
                    frame = RgbImage::from_raw(output.width, output.height, output.data);
                    if frame.is_none() {
                        log::warn!(
                            "Captured frame has malformed data ({}x{})",
                            output.width,
                            output.height
                        );
                    }
                }
            }
            Ok(())
        });
        if let Err(e) = handled {
            log::warn!("Frame capture for {} failed: {e}", input.display());
            return None;
        }

        match process.wait() {
            Ok(status) if !status.success() && frame.is_none() => {
                log::warn!("Frame capture for {} exited with {status}", input.display());
            }
            Err(e) => log::debug!("Waiting on frame capture failed: {e}"),
            _ => {}
        }

        if frame.is_none() {
            log::warn!("No reference frame captured from {}", input.display());
        }
        frame
    }
}
