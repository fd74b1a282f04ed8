//! Video encoder selection and the hardware-to-CPU fallback mapping.

use crate::config::{Codec, ExportSpec, PerformanceSpec};
use std::fmt;

/// Audio codec arguments for kept or cross-faded audio.
pub const AUDIO_CODEC_ARGS: [&str; 4] = ["-c:a", "aac", "-b:a", "192k"];

/// The video encoders a build can reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VideoEncoder {
    H264Nvenc,
    HevcNvenc,
    Libx264,
    Libx265,
}

impl VideoEncoder {
    /// Encoder for `codec`, on the GPU when `hardware` is set.
    #[must_use]
    pub fn select(codec: Codec, hardware: bool) -> Self {
        match (codec, hardware) {
            (Codec::H264, true) => VideoEncoder::H264Nvenc,
            (Codec::H265, true) => VideoEncoder::HevcNvenc,
            (Codec::H264, false) => VideoEncoder::Libx264,
            (Codec::H265, false) => VideoEncoder::Libx265,
        }
    }

    #[must_use]
    pub fn token(self) -> &'static str {
        match self {
            VideoEncoder::H264Nvenc => "h264_nvenc",
            VideoEncoder::HevcNvenc => "hevc_nvenc",
            VideoEncoder::Libx264 => "libx264",
            VideoEncoder::Libx265 => "libx265",
        }
    }

    #[must_use]
    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "h264_nvenc" => Some(VideoEncoder::H264Nvenc),
            "hevc_nvenc" => Some(VideoEncoder::HevcNvenc),
            "libx264" => Some(VideoEncoder::Libx264),
            "libx265" => Some(VideoEncoder::Libx265),
            _ => None,
        }
    }

    #[must_use]
    pub fn is_hardware(self) -> bool {
        matches!(self, VideoEncoder::H264Nvenc | VideoEncoder::HevcNvenc)
    }

    /// The CPU encoder producing the same codec, for hardware encoders only.
    #[must_use]
    pub fn cpu_fallback(self) -> Option<Self> {
        match self {
            VideoEncoder::H264Nvenc => Some(VideoEncoder::Libx264),
            VideoEncoder::HevcNvenc => Some(VideoEncoder::Libx265),
            VideoEncoder::Libx264 | VideoEncoder::Libx265 => None,
        }
    }
}

impl fmt::Display for VideoEncoder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

/// The codec block: encoder, preset, rate control and pixel format.
#[must_use]
pub fn codec_args(export: &ExportSpec, performance: &PerformanceSpec) -> Vec<String> {
    let encoder = VideoEncoder::select(export.codec, performance.use_hardware_encoder);
    let mut args = vec![
        "-c:v".to_string(),
        encoder.token().to_string(),
        "-preset".to_string(),
        performance.encoder_preset.clone(),
    ];

    match encoder {
        VideoEncoder::Libx264 => {
            args.extend(["-crf", "18", "-tune", "film"].map(String::from));
        }
        VideoEncoder::Libx265 => {
            args.extend(["-crf", "20"].map(String::from));
        }
        VideoEncoder::H264Nvenc | VideoEncoder::HevcNvenc => {}
    }

    args.extend([
        "-b:v".to_string(),
        format!("{}M", export.bitrate_mbps),
        "-pix_fmt".to_string(),
        "yuv420p".to_string(),
    ]);
    args
}

/// Position and encoder of the first hardware encoder token in `args`.
#[must_use]
pub fn find_hardware_encoder(args: &[String]) -> Option<(usize, VideoEncoder)> {
    args.iter().enumerate().find_map(|(i, arg)| {
        VideoEncoder::from_token(arg)
            .filter(|encoder| encoder.is_hardware())
            .map(|encoder| (i, encoder))
    })
}

/// Replaces the hardware encoder token with its CPU counterpart.
///
/// Every other argument is left untouched. Returns `None` when `args`
/// reference no hardware encoder.
#[must_use]
pub fn swap_to_cpu_encoder(args: &[String]) -> Option<Vec<String>> {
    let (index, encoder) = find_hardware_encoder(args)?;
    let fallback = encoder.cpu_fallback()?;
    let mut swapped = args.to_vec();
    swapped[index] = fallback.token().to_string();
    Some(swapped)
}
