// reelsmith-core/src/external/mocks.rs

// --- Mocking Infrastructure (unit tests only) ---

use super::ffmpeg_executor::{FfmpegProcess, FfmpegSpawner};
use super::ffprobe_executor::MediaProber;
use crate::encoding::EncoderCommand;
use crate::error::{CoreResult, command_start_error};
use ffmpeg_sidecar::event::{FfmpegEvent, FfmpegProgress, LogLevel, OutputVideoFrame};
use std::cell::RefCell;
use std::collections::{HashMap, VecDeque};
use std::io;
use std::path::{Path, PathBuf};
use std::process::ExitStatus;
use std::rc::Rc;

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

pub fn log_line(message: &str) -> FfmpegEvent {
    FfmpegEvent::Log(LogLevel::Info, message.to_string())
}

pub fn error_line(message: &str) -> FfmpegEvent {
    FfmpegEvent::Log(LogLevel::Error, message.to_string())
}

pub fn progress_at(time: &str) -> FfmpegEvent {
    FfmpegEvent::Progress(FfmpegProgress {
        frame: 0,
        fps: 0.0,
        q: 0.0,
        size_kb: 0,
        time: time.to_string(),
        bitrate_kbps: 0.0,
        speed: 1.0,
        raw_log_message: format!("frame=    0 fps=0.0 q=0.0 size=       0kB time={time} bitrate=N/A speed=1.0x"),
    })
}

pub fn output_frame(width: u32, height: u32, data: Vec<u8>) -> FfmpegEvent {
    FfmpegEvent::OutputFrame(OutputVideoFrame {
        width,
        height,
        pix_fmt: "rgb24".to_string(),
        output_index: 0,
        data,
        frame_num: 0,
        timestamp: 0.0,
    })
}

/// Mock implementation of FfmpegProcess.
pub struct MockFfmpegProcess {
    events: Vec<FfmpegEvent>,
    exit_status: ExitStatus,
}

impl FfmpegProcess for MockFfmpegProcess {
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
        Ok(self.exit_status)
    }
}

enum Outcome {
    Run(Vec<FfmpegEvent>, i32),
    SpawnError(io::ErrorKind),
}

/// Mock implementation of FfmpegSpawner replaying scripted outcomes in order.
///
/// Once the script is exhausted every spawn succeeds with no events.
#[derive(Clone, Default)]
pub struct MockFfmpegSpawner {
    script: Rc<RefCell<VecDeque<Outcome>>>,
    received: Rc<RefCell<Vec<EncoderCommand>>>,
}

impl MockFfmpegSpawner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_success(&self, events: Vec<FfmpegEvent>) {
        self.script.borrow_mut().push_back(Outcome::Run(events, 0));
    }

    pub fn push_failure(&self, events: Vec<FfmpegEvent>, exit_code: i32) {
        self.script
            .borrow_mut()
            .push_back(Outcome::Run(events, exit_code));
    }

    pub fn push_spawn_error(&self, kind: io::ErrorKind) {
        self.script.borrow_mut().push_back(Outcome::SpawnError(kind));
    }

    pub fn received(&self) -> Vec<EncoderCommand> {
        self.received.borrow().clone()
    }
}

impl FfmpegSpawner for MockFfmpegSpawner {
    type Process = MockFfmpegProcess;

    fn spawn(&self, cmd: &EncoderCommand) -> CoreResult<Self::Process> {
        self.received.borrow_mut().push(cmd.clone());
        match self.script.borrow_mut().pop_front() {
            Some(Outcome::Run(events, code)) => Ok(MockFfmpegProcess {
                events,
                exit_status: exit_status(code),
            }),
            Some(Outcome::SpawnError(kind)) => Err(command_start_error(
                cmd.program.display().to_string(),
                io::Error::new(kind, "scripted spawn failure"),
            )),
            None => Ok(MockFfmpegProcess {
                events: Vec::new(),
                exit_status: exit_status(0),
            }),
        }
    }
}

/// Mock implementation of MediaProber answering from a fixed table.
#[derive(Default)]
pub struct MockProber {
    durations: HashMap<PathBuf, f64>,
    with_audio: Vec<PathBuf>,
    pub calls: RefCell<usize>,
}

impl MockProber {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, path: &str, duration: Option<f64>, has_audio: bool) -> Self {
        if let Some(d) = duration {
            self.durations.insert(PathBuf::from(path), d);
        }
        if has_audio {
            self.with_audio.push(PathBuf::from(path));
        }
        self
    }
}

impl MediaProber for MockProber {
    fn probe_duration(&self, path: &Path) -> Option<f64> {
        *self.calls.borrow_mut() += 1;
        self.durations.get(path).copied()
    }

    fn probe_has_audio(&self, path: &Path) -> bool {
        self.with_audio.iter().any(|p| p == path)
    }
}
