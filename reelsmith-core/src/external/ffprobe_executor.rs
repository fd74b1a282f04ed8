//! FFprobe integration for duration and audio-presence queries.
//!
//! Probing is a best-effort signal: every failure (missing binary, non-zero
//! exit, unparsable output) degrades to `None` / `false` and is only logged.

use ffprobe::{ConfigBuilder, FfProbe, FfProbeError};
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Facts gathered about one input for one build.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct ProbeResult {
    /// Container duration in seconds, if known and positive.
    pub duration: Option<f64>,
    /// Whether at least one audio stream is present.
    pub has_audio: bool,
}

impl ProbeResult {
    /// Result used when nothing is known about an input.
    #[must_use]
    pub fn unknown() -> Self {
        Self::default()
    }
}

/// Read-only media queries.
///
/// Implementations must never fail: unknown facts are reported as
/// `None` / `false`.
pub trait MediaProber {
    fn probe_duration(&self, path: &Path) -> Option<f64>;

    fn probe_has_audio(&self, path: &Path) -> bool;

    /// Runs both queries. The default calls each query once.
    fn probe(&self, path: &Path) -> ProbeResult {
        ProbeResult {
            duration: self.probe_duration(path),
            has_audio: self.probe_has_audio(path),
        }
    }
}

/// [`MediaProber`] backed by the `ffprobe` crate and a resolved probe binary.
#[derive(Debug, Clone)]
pub struct FfprobeClient {
    binary: PathBuf,
}

impl FfprobeClient {
    #[must_use]
    pub fn new(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
        }
    }

    fn run(&self, path: &Path, query: &str) -> Option<FfProbe> {
        log::debug!(
            "Running ffprobe (via crate) for {} on: {}",
            query,
            path.display()
        );
        match ConfigBuilder::new().ffprobe_bin(&self.binary).run(path) {
            Ok(metadata) => Some(metadata),
            Err(err) => {
                log::warn!(
                    "ffprobe failed for {} on {}: {}",
                    query,
                    path.display(),
                    describe_ffprobe_error(&err)
                );
                None
            }
        }
    }
}

impl MediaProber for FfprobeClient {
    fn probe_duration(&self, path: &Path) -> Option<f64> {
        self.run(path, "duration")
            .and_then(|metadata| duration_from(&metadata))
    }

    fn probe_has_audio(&self, path: &Path) -> bool {
        self.run(path, "audio streams")
            .is_some_and(|metadata| has_audio_stream(&metadata))
    }

    fn probe(&self, path: &Path) -> ProbeResult {
        // One ffprobe run answers both questions.
        match self.run(path, "media info") {
            Some(metadata) => {
                let result = ProbeResult {
                    duration: duration_from(&metadata),
                    has_audio: has_audio_stream(&metadata),
                };
                log::debug!("Probe result for {}: {:?}", path.display(), result);
                result
            }
            None => ProbeResult::unknown(),
        }
    }
}

fn duration_from(metadata: &FfProbe) -> Option<f64> {
    metadata
        .format
        .duration
        .as_deref()
        .and_then(parse_duration)
}

fn has_audio_stream(metadata: &FfProbe) -> bool {
    metadata
        .streams
        .iter()
        .any(|s| s.codec_type.as_deref() == Some("audio"))
}

/// Parses a container duration, rejecting non-finite and non-positive values.
pub(crate) fn parse_duration(raw: &str) -> Option<f64> {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|d| d.is_finite() && *d > 0.0)
}

fn describe_ffprobe_error(err: &FfProbeError) -> String {
    match err {
        FfProbeError::Io(io_err) => format!("IO error: {io_err}"),
        FfProbeError::Status(output) => format!(
            "exit status {} ({})",
            output.status,
            String::from_utf8_lossy(&output.stderr).trim()
        ),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_duration() {
        assert_eq!(parse_duration("12.500000"), Some(12.5));
        assert_eq!(parse_duration(" 8 "), Some(8.0));
        assert_eq!(parse_duration("0.000000"), None);
        assert_eq!(parse_duration("-3"), None);
        assert_eq!(parse_duration("N/A"), None);
    }

    #[test]
    fn test_missing_probe_binary_degrades() {
        let client = FfprobeClient::new("/definitely/not/a/real/ffprobe");
        let result = client.probe(Path::new("missing.mp4"));
        assert_eq!(result, ProbeResult::unknown());
        assert_eq!(client.probe_duration(Path::new("missing.mp4")), None);
        assert!(!client.probe_has_audio(Path::new("missing.mp4")));
    }
}
