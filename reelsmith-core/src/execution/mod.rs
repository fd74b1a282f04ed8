//! Encoder execution: progress parsing and the retrying supervisor.

pub mod progress;
pub mod supervisor;

pub use progress::{FfmpegProgressHandler, ProgressUpdate};
pub use supervisor::{ExecutionSupervisor, Recovery, SupervisorState, classify_failure};
