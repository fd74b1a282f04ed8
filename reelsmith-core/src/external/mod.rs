// ============================================================================
// reelsmith-core/src/external/mod.rs
// ============================================================================
//
// EXTERNAL TOOLS: Resolution and Abstraction of ffmpeg / ffprobe
//
// This module encapsulates every interaction with the external encoder and
// probe tools. Each interaction sits behind a trait so the compiler and the
// supervisor can be driven by scripted fakes in tests.
//
// KEY COMPONENTS:
// - ToolLocator: resolves the encoder/probe binaries (env, bundle, exe dir, PATH)
// - FfmpegSpawner / FfmpegProcess: spawning and observing encoder processes
// - MediaProber / FfprobeClient: best-effort duration and audio queries
// - ReferenceFrameSource / FfmpegFrameGrabber: first-frame capture for the locator

// ---- Internal crate imports ----
use crate::error::{CoreError, CoreResult};

// ---- Standard library imports ----
use std::env;
use std::ffi::OsString;
use std::fmt;
use std::path::{Path, PathBuf};

// ============================================================================
// SUBMODULES
// ============================================================================

/// Contains traits and implementations for executing ffmpeg commands
pub mod ffmpeg_executor;

/// Contains traits and implementations for executing ffprobe queries
pub mod ffprobe_executor;

/// Contains the reference-frame capture used by the watermark locator
pub mod frame_grabber;

#[cfg(test)]
pub(crate) mod mocks;

// ============================================================================
// RE-EXPORTS
// ============================================================================

pub use ffmpeg_executor::{FfmpegProcess, FfmpegSpawner, SidecarProcess, SidecarSpawner};
pub use ffprobe_executor::{FfprobeClient, MediaProber, ProbeResult};
pub use frame_grabber::{FfmpegFrameGrabber, ReferenceFrameSource};

// ============================================================================
// TOOL RESOLUTION
// ============================================================================

/// Environment variable overriding the encoder binary.
pub const FFMPEG_PATH_ENV: &str = "FFMPEG_PATH";

/// Environment variable overriding the probe binary.
pub const FFPROBE_PATH_ENV: &str = "FFPROBE_PATH";

/// The two external collaborators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tool {
    Ffmpeg,
    Ffprobe,
}

impl Tool {
    /// Binary file name on the current platform.
    #[must_use]
    pub fn binary_name(self) -> String {
        let stem = match self {
            Tool::Ffmpeg => "ffmpeg",
            Tool::Ffprobe => "ffprobe",
        };
        format!("{stem}{}", env::consts::EXE_SUFFIX)
    }

    #[must_use]
    pub fn env_var(self) -> &'static str {
        match self {
            Tool::Ffmpeg => FFMPEG_PATH_ENV,
            Tool::Ffprobe => FFPROBE_PATH_ENV,
        }
    }
}

impl fmt::Display for Tool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Tool::Ffmpeg => f.write_str("ffmpeg"),
            Tool::Ffprobe => f.write_str("ffprobe"),
        }
    }
}

/// Resolves external tool binaries.
///
/// Resolution order:
/// 1. the tool's environment variable, when it names an existing file
/// 2. `<resource_dir>/<binary>` when a resource directory is configured
/// 3. `<exe_dir>/ffmpeg/bin/<binary>` next to the running executable
/// 4. the system search path
#[derive(Debug, Clone, Default)]
pub struct ToolLocator {
    resource_dir: Option<PathBuf>,
    exe_dir: Option<PathBuf>,
}

impl ToolLocator {
    /// Creates a locator that also looks next to the current executable.
    #[must_use]
    pub fn new() -> Self {
        let exe_dir = env::current_exe()
            .ok()
            .and_then(|exe| exe.parent().map(Path::to_path_buf));
        Self {
            resource_dir: None,
            exe_dir,
        }
    }

    /// Sets the bundled-resource directory.
    #[must_use]
    pub fn with_resource_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.resource_dir = Some(dir.into());
        self
    }

    /// Overrides the executable directory (mainly for tests).
    #[must_use]
    pub fn with_exe_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.exe_dir = Some(dir.into());
        self
    }

    /// Resolves `tool`, reading its override from the process environment.
    ///
    /// # Returns
    ///
    /// * `Ok(PathBuf)` - path to an existing binary
    /// * `Err(CoreError::ToolNotFound)` - if no rule produced a binary
    pub fn resolve(&self, tool: Tool) -> CoreResult<PathBuf> {
        self.resolve_with(tool, env::var_os(tool.env_var()))
    }

    /// Resolves `tool` using `env_value` in place of the environment variable.
    pub fn resolve_with(&self, tool: Tool, env_value: Option<OsString>) -> CoreResult<PathBuf> {
        if let Some(value) = env_value.filter(|v| !v.is_empty()) {
            let candidate = PathBuf::from(value);
            if candidate.is_file() {
                log::debug!("Using {} from {}: {}", tool, tool.env_var(), candidate.display());
                return Ok(candidate);
            }
            log::warn!(
                "{} points to {} which does not exist; ignoring it",
                tool.env_var(),
                candidate.display()
            );
        }

        let binary = tool.binary_name();

        if let Some(dir) = &self.resource_dir {
            let candidate = dir.join(&binary);
            if candidate.is_file() {
                log::debug!("Using bundled {}: {}", tool, candidate.display());
                return Ok(candidate);
            }
        }

        if let Some(dir) = &self.exe_dir {
            let candidate = dir.join("ffmpeg").join("bin").join(&binary);
            if candidate.is_file() {
                log::debug!("Using {} next to executable: {}", tool, candidate.display());
                return Ok(candidate);
            }
        }

        match which::which(&binary) {
            Ok(path) => {
                log::debug!("Using {} from PATH: {}", tool, path.display());
                Ok(path)
            }
            Err(_) => Err(CoreError::ToolNotFound(tool.to_string())),
        }
    }
}
