//! `FFmpeg` progress handler
//!
//! Turns the encoder's event stream into `(percent, raw line)` updates for
//! the caller's progress callback, logs each line, and keeps the diagnostic
//! text needed to classify a failure.

use crate::utils::{extract_time_marker, format_duration, parse_ffmpeg_time};
use ffmpeg_sidecar::event::{FfmpegEvent, FfmpegProgress, LogLevel as FfmpegLogLevel};

/// One callback-worthy diagnostic line.
#[derive(Debug, Clone, PartialEq)]
pub struct ProgressUpdate {
    /// Present only when a duration hint and a time marker are both known.
    pub percent: Option<f64>,
    pub line: String,
}

/// Handler for `FFmpeg` progress events
pub struct FfmpegProgressHandler {
    total_duration: Option<f64>,
    last_logged_decile: i32,
    stderr_buffer: String,
}

impl FfmpegProgressHandler {
    /// Creates a handler; a non-positive `total_duration` is treated as unknown.
    #[must_use]
    pub fn new(total_duration: Option<f64>) -> Self {
        Self {
            total_duration: total_duration.filter(|d| *d > 0.0 && d.is_finite()),
            last_logged_decile: -1,
            stderr_buffer: String::new(),
        }
    }

    /// Handles an `FFmpeg` event, returning the update to forward, if any.
    ///
    /// Every event parsed from a stderr line yields an update carrying that
    /// line, including the structured header events (inputs, streams, mapping).
    pub fn handle_event(&mut self, event: FfmpegEvent) -> Option<ProgressUpdate> {
        match event {
            FfmpegEvent::Progress(progress) => Some(self.handle_progress(progress)),
            FfmpegEvent::Log(level, message) => Some(self.handle_log(&level, message)),
            FfmpegEvent::Error(error) => Some(self.handle_error(error)),
            FfmpegEvent::ParsedVersion(version) => Some(self.handle_parsed(version.raw_log_message)),
            FfmpegEvent::ParsedConfiguration(configuration) => {
                Some(self.handle_parsed(configuration.raw_log_message))
            }
            FfmpegEvent::ParsedInput(input) => Some(self.handle_parsed(input.raw_log_message)),
            FfmpegEvent::ParsedOutput(output) => Some(self.handle_parsed(output.raw_log_message)),
            FfmpegEvent::ParsedInputStream(stream) | FfmpegEvent::ParsedOutputStream(stream) => {
                Some(self.handle_parsed(stream.raw_log_message))
            }
            FfmpegEvent::ParsedDuration(duration) => Some(self.handle_parsed(duration.raw_log_message)),
            FfmpegEvent::ParsedStreamMapping(line) => Some(self.handle_parsed(line)),
            // End of log, output data, completion
            _ => None,
        }
    }

    /// Gets the accumulated diagnostic text
    #[must_use]
    pub fn stderr_buffer(&self) -> &str {
        &self.stderr_buffer
    }

    #[must_use]
    pub fn into_stderr(self) -> String {
        self.stderr_buffer
    }

    /// Percentage for a line, given the handler's duration hint.
    #[must_use]
    pub fn percent_for(&self, line: &str) -> Option<f64> {
        let total = self.total_duration?;
        let current = extract_time_marker(line)?;
        Some((current / total * 100.0).clamp(0.0, 100.0))
    }

    fn handle_progress(&mut self, progress: FfmpegProgress) -> ProgressUpdate {
        let line = if progress.raw_log_message.is_empty() {
            format!("time={}", progress.time)
        } else {
            progress.raw_log_message
        };
        let percent = self.percent_for(&line).or_else(|| {
            let total = self.total_duration?;
            parse_ffmpeg_time(&progress.time).map(|t| (t / total * 100.0).clamp(0.0, 100.0))
        });

        log::trace!(target: "ffmpeg_log", "{line}");
        if let Some(percent) = percent {
            self.log_progress_if_needed(percent, progress.speed);
        }

        ProgressUpdate { percent, line }
    }

    fn handle_log(&mut self, level: &FfmpegLogLevel, message: String) -> ProgressUpdate {
        match map_ffmpeg_log_level(level) {
            log::Level::Info => log::trace!(target: "ffmpeg_log", "{message}"),
            other => log::log!(target: "ffmpeg_log", other, "{message}"),
        }
        self.push_stderr(&message);
        ProgressUpdate {
            percent: self.percent_for(&message),
            line: message,
        }
    }

    fn handle_parsed(&mut self, line: String) -> ProgressUpdate {
        log::trace!(target: "ffmpeg_log", "{line}");
        self.push_stderr(&line);
        ProgressUpdate {
            percent: None,
            line,
        }
    }

    fn handle_error(&mut self, error: String) -> ProgressUpdate {
        log::debug!(target: "ffmpeg_log", "ffmpeg error event: {error}");
        self.push_stderr(&error);
        ProgressUpdate {
            percent: None,
            line: error,
        }
    }

    fn push_stderr(&mut self, line: &str) {
        self.stderr_buffer.push_str(line);
        self.stderr_buffer.push('\n');
    }

    /// Logs at every 10% step.
    fn log_progress_if_needed(&mut self, percent: f64, speed: f32) {
        let decile = (percent as i32 / 10) * 10;
        if decile > self.last_logged_decile {
            let total = self.total_duration.unwrap_or(0.0);
            log::info!(
                target: "reelsmith::progress",
                "Encoding progress: {:.1}% complete | Time: {} / {} | Speed: {:.2}x",
                percent,
                format_duration(total * percent / 100.0),
                format_duration(total),
                speed
            );
            self.last_logged_decile = decile;
        }
    }
}

/// Maps `FFmpeg` log level to Rust log level
fn map_ffmpeg_log_level(level: &FfmpegLogLevel) -> log::Level {
    match level {
        FfmpegLogLevel::Fatal | FfmpegLogLevel::Error => log::Level::Warn,
        FfmpegLogLevel::Warning => log::Level::Debug,
        FfmpegLogLevel::Info => log::Level::Info,
        _ => log::Level::Trace,
    }
}
