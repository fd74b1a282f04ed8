//! Core library for assembling vertical videos with ffmpeg.
//!
//! This crate compiles a validated set of video-processing options into a
//! single ffmpeg invocation, locates on-screen watermarks in a reference
//! frame, and supervises the encoder with hardware-to-CPU fallbacks.
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use reelsmith_core::config::{DelogoSpec, PipelineConfig, TransitionSpec};
//! use reelsmith_core::external::ToolLocator;
//!
//! let config = PipelineConfig::builder(["intro.mp4", "main.mp4"], "reel.mp4")
//!     .transition(TransitionSpec::default())
//!     .delogo(DelogoSpec::default())
//!     .build()
//!     .unwrap();
//!
//! reelsmith_core::build(config, &ToolLocator::new(), |percent, line| {
//!     if let Some(p) = percent {
//!         println!("{p:.1}% {line}");
//!     }
//! })
//! .unwrap();
//! ```

pub mod config;
pub mod encoding;
pub mod error;
pub mod execution;
pub mod external;
pub mod hardware_decode;
pub mod pipeline;
pub mod processing;
pub mod utils;

// Re-exports for public API
pub use config::{PipelineConfig, PipelineConfigBuilder};
pub use encoding::EncoderCommand;
pub use error::{CoreError, CoreResult};
pub use execution::{ExecutionSupervisor, SupervisorState};
pub use external::{FfprobeClient, MediaProber, ProbeResult, Tool, ToolLocator};
pub use pipeline::{
    CompileInputs, CompiledPipeline, ResolvedTools, build, compile, gather_compile_inputs,
    run_build,
};
pub use processing::{LocatedWatermark, locate_watermark};
pub use utils::{format_duration, parse_ffmpeg_time};
