// reelsmith-core/tests/common/mod.rs
//
// Scripted fakes for the public traits, shared by the integration tests.

#![allow(dead_code)]

use ffmpeg_sidecar::event::{FfmpegEvent, FfmpegProgress, LogLevel};
use image::RgbImage;
use reelsmith_core::encoding::EncoderCommand;
use reelsmith_core::error::{CoreResult, command_start_error};
use reelsmith_core::external::{FfmpegProcess, FfmpegSpawner, MediaProber, ReferenceFrameSource};
use std::collections::{HashMap, VecDeque};
use std::io;
use std::path::{Path, PathBuf};
use std::process::ExitStatus;
use std::sync::{Arc, Mutex};

#[cfg(unix)]
pub fn exit_status(code: i32) -> ExitStatus {
    use std::os::unix::process::ExitStatusExt;
    ExitStatus::from_raw(code << 8)
}

#[cfg(windows)]
pub fn exit_status(code: i32) -> ExitStatus {
    use std::os::windows::process::ExitStatusExt;
    ExitStatus::from_raw(code as u32)
}

pub fn stderr_line(message: &str) -> FfmpegEvent {
    FfmpegEvent::Log(LogLevel::Error, message.to_string())
}

pub fn progress_line(time: &str) -> FfmpegEvent {
    FfmpegEvent::Progress(FfmpegProgress {
        frame: 120,
        fps: 60.0,
        q: 23.0,
        size_kb: 2048,
        time: time.to_string(),
        bitrate_kbps: 8000.0,
        speed: 1.5,
        raw_log_message: format!(
            "frame=  120 fps= 60 q=23.0 size=    2048kB time={time} bitrate=8000.0kbits/s speed=1.5x"
        ),
    })
}

pub struct ScriptedProcess {
    events: Vec<FfmpegEvent>,
    status: ExitStatus,
}

impl FfmpegProcess for ScriptedProcess {
    fn handle_events<F>(&mut self, mut handler: F) -> CoreResult<()>
    where
        F: FnMut(FfmpegEvent) -> CoreResult<()>,
    {
        for event in self.events.drain(..) {
            handler(event)?;
        }
        Ok(())
    }

    fn wait(&mut self) -> CoreResult<ExitStatus> {
        Ok(self.status)
    }
}

enum Step {
    Exit(Vec<FfmpegEvent>, i32),
    Missing,
}

/// Replays scripted exits in order and records every spawned command.
///
/// Once the script runs out every further spawn fails with exit code 1 and
/// the last scripted diagnostics, so an unexpected extra retry shows up as a
/// recorded call rather than a hang.
#[derive(Clone, Default)]
pub struct ScriptedSpawner {
    steps: Arc<Mutex<VecDeque<Step>>>,
    calls: Arc<Mutex<Vec<EncoderCommand>>>,
    repeat: Arc<Mutex<Vec<FfmpegEvent>>>,
}

impl ScriptedSpawner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn exit(self, code: i32, events: Vec<FfmpegEvent>) -> Self {
        self.steps.lock().unwrap().push_back(Step::Exit(events, code));
        self
    }

    pub fn missing_binary(self) -> Self {
        self.steps.lock().unwrap().push_back(Step::Missing);
        self
    }

    pub fn calls(&self) -> Vec<EncoderCommand> {
        self.calls.lock().unwrap().clone()
    }
}

impl FfmpegSpawner for ScriptedSpawner {
    type Process = ScriptedProcess;

    fn spawn(&self, cmd: &EncoderCommand) -> CoreResult<Self::Process> {
        self.calls.lock().unwrap().push(cmd.clone());
        match self.steps.lock().unwrap().pop_front() {
            Some(Step::Exit(events, code)) => {
                *self.repeat.lock().unwrap() = events.clone();
                Ok(ScriptedProcess {
                    events,
                    status: exit_status(code),
                })
            }
            Some(Step::Missing) => Err(command_start_error(
                cmd.program.display().to_string(),
                io::Error::new(io::ErrorKind::NotFound, "No such file or directory"),
            )),
            None => Ok(ScriptedProcess {
                events: self.repeat.lock().unwrap().clone(),
                status: exit_status(1),
            }),
        }
    }
}

/// Answers probe queries from a fixed table; unknown paths have no duration and no audio.
#[derive(Default)]
pub struct TableProber {
    entries: HashMap<PathBuf, (Option<f64>, bool)>,
}

impl TableProber {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entry(mut self, path: impl Into<PathBuf>, duration: Option<f64>, has_audio: bool) -> Self {
        self.entries.insert(path.into(), (duration, has_audio));
        self
    }
}

impl MediaProber for TableProber {
    fn probe_duration(&self, path: &Path) -> Option<f64> {
        self.entries.get(path).and_then(|(d, _)| *d)
    }

    fn probe_has_audio(&self, path: &Path) -> bool {
        self.entries.get(path).is_some_and(|(_, a)| *a)
    }
}

/// Serves the same frame for every input, or nothing.
pub struct StaticFrame(pub Option<RgbImage>);

impl ReferenceFrameSource for StaticFrame {
    fn first_frame(&self, _input: &Path) -> Option<RgbImage> {
        self.0.clone()
    }
}
