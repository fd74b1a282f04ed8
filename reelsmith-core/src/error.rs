// ============================================================================
// reelsmith-core/src/error.rs
// ============================================================================
//
// ERROR HANDLING: Core Error Types and Constructors
//
// This module defines the single error enum used across the core library and
// small helper constructors that keep error creation at call sites terse.
//
// KEY COMPONENTS:
// - CoreError: every failure the core can surface to a caller
// - CoreResult: result alias used by all fallible core functions
// - command_start_error / command_wait_error: helpers for process failures

use std::io;
use thiserror::Error;

/// Errors surfaced by the reelsmith core.
///
/// Probe and locator problems never appear here: those degrade to "unknown"
/// values inside the pipeline and are only logged.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Fail-fast configuration validation error, raised before any process spawns.
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// An external tool (encoder or probe) could not be resolved or executed.
    #[error("Required tool not found: {0}")]
    ToolNotFound(String),

    /// The process was found but could not be started.
    #[error("Failed to start {0}: {1}")]
    CommandStart(String, #[source] io::Error),

    /// Waiting on a spawned process failed.
    #[error("Failed waiting for {0}: {1}")]
    CommandWait(String, #[source] io::Error),

    /// Reading the encoder's diagnostic stream failed.
    #[error("Failed reading output of {0}: {1}")]
    CommandOutput(String, String),

    /// The encoder ran and exited unsuccessfully after all recovery paths.
    #[error("Encoder execution failed (exit code {}):\n{stderr}", describe_exit_code(.exit_code))]
    EncoderFailed {
        exit_code: Option<i32>,
        stderr: String,
    },

    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

fn describe_exit_code(code: &Option<i32>) -> String {
    code.map_or_else(|| "none".to_string(), |c| c.to_string())
}

/// Result type for core operations.
pub type CoreResult<T> = Result<T, CoreError>;

/// Builds the error for a process that failed to start.
///
/// A `NotFound` cause means the binary itself is missing, which is reported
/// as [`CoreError::ToolNotFound`] rather than a generic start failure.
pub fn command_start_error(cmd: impl Into<String>, err: io::Error) -> CoreError {
    let cmd = cmd.into();
    if err.kind() == io::ErrorKind::NotFound {
        CoreError::ToolNotFound(cmd)
    } else {
        CoreError::CommandStart(cmd, err)
    }
}

pub fn command_wait_error(cmd: impl Into<String>, err: io::Error) -> CoreError {
    CoreError::CommandWait(cmd.into(), err)
}
