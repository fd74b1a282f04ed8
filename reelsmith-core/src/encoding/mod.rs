//! Encoder command assembly.
//!
//! Orders hardware flags, the filter graph, codec, audio and output options
//! into one ffmpeg invocation and prepares the concat manifest it reads.

/// Block-by-block command assembly
pub mod command;

/// Video encoder selection and CPU fallback
pub mod codec;

/// Concat demuxer manifest
pub mod manifest;

pub use codec::VideoEncoder;
pub use command::{AssembledCommand, EncoderCommand, assemble_command};
pub use manifest::ConcatManifest;
