// ============================================================================
// reelsmith-core/src/execution/supervisor.rs
// ============================================================================
//
// EXECUTION SUPERVISOR: Running the Encoder with Bounded Recovery
//
// Spawns the assembled command, streams progress to the caller, and on a
// non-zero exit decides between two independent recovery paths:
//
//   Idle -> Running -> Succeeded
//                   -> RetryHardwareDecode -> Running   (at most once)
//                   -> RetryEncoder        -> Running   (at most once)
//                   -> Failed
//
// The run blocks until the diagnostic stream is exhausted and the process
// has exited. Cancellation is not provided here.

use super::progress::FfmpegProgressHandler;
use crate::encoding::EncoderCommand;
use crate::encoding::codec::{find_hardware_encoder, swap_to_cpu_encoder};
use crate::error::{CoreError, CoreResult};
use crate::external::{FfmpegProcess, FfmpegSpawner};
use crate::hardware_decode::{has_hwdecode_args, is_hwdecode_unavailable, strip_hwdecode_args};

/// Supervisor lifecycle states.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SupervisorState {
    Idle,
    Running,
    RetryHardwareDecode,
    RetryEncoder,
    Succeeded,
    Failed,
}

/// Recovery chosen for a failed attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Recovery {
    /// Resubmit without the hardware decoding flags.
    HardwareDecode(Vec<String>),
    /// Resubmit with the CPU encoder in place of the hardware one.
    Encoder(Vec<String>),
}

/// Retries already spent in the current run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RetryBudget {
    pub hardware_decode_used: bool,
    pub encoder_used: bool,
}

/// Picks the recovery for a failed attempt, if any remains.
///
/// Hardware decoding is retried when the diagnostics name an unavailable
/// decoder and the flags are present; otherwise a hardware encoder is swapped
/// for its CPU counterpart. Each kind is used at most once per run.
#[must_use]
pub fn classify_failure(args: &[String], stderr: &str, budget: RetryBudget) -> Option<Recovery> {
    if !budget.hardware_decode_used && is_hwdecode_unavailable(stderr) && has_hwdecode_args(args) {
        if let Some(stripped) = strip_hwdecode_args(args) {
            return Some(Recovery::HardwareDecode(stripped));
        }
    }
    if !budget.encoder_used && find_hardware_encoder(args).is_some() {
        return swap_to_cpu_encoder(args).map(Recovery::Encoder);
    }
    None
}

/// Result of one spawned attempt.
enum Attempt {
    Succeeded,
    Failed { exit_code: Option<i32>, stderr: String },
}

/// Runs encoder commands through an [`FfmpegSpawner`].
pub struct ExecutionSupervisor<S: FfmpegSpawner> {
    spawner: S,
    state: SupervisorState,
    history: Vec<SupervisorState>,
}

impl<S: FfmpegSpawner> ExecutionSupervisor<S> {
    pub fn new(spawner: S) -> Self {
        Self {
            spawner,
            state: SupervisorState::Idle,
            history: vec![SupervisorState::Idle],
        }
    }

    #[must_use]
    pub fn state(&self) -> SupervisorState {
        self.state
    }

    /// Every state entered so far, in order.
    #[must_use]
    pub fn history(&self) -> &[SupervisorState] {
        &self.history
    }

    pub fn spawner(&self) -> &S {
        &self.spawner
    }

    fn enter(&mut self, state: SupervisorState) {
        log::debug!("Supervisor: {:?} -> {:?}", self.state, state);
        self.state = state;
        self.history.push(state);
    }

    /// Runs `command` to completion.
    ///
    /// `on_progress` is called once per diagnostic line with the percentage
    /// (when `progress_hint` and a time marker are both known) and the raw
    /// line, plus once with a notice before each retry.
    ///
    /// # Returns
    ///
    /// * `Ok(())` - the encoder exited successfully
    /// * `Err(CoreError::EncoderFailed)` - the final attempt failed
    /// * `Err(CoreError::ToolNotFound)` - the encoder binary is missing
    pub fn run<F>(
        &mut self,
        command: &EncoderCommand,
        progress_hint: Option<f64>,
        mut on_progress: F,
    ) -> CoreResult<()>
    where
        F: FnMut(Option<f64>, &str),
    {
        let mut current = command.clone();
        let mut budget = RetryBudget::default();

        loop {
            self.enter(SupervisorState::Running);
            let attempt = match self.attempt(&current, progress_hint, &mut on_progress) {
                Ok(attempt) => attempt,
                Err(e) => {
                    self.enter(SupervisorState::Failed);
                    return Err(e);
                }
            };

            let (exit_code, stderr) = match attempt {
                Attempt::Succeeded => {
                    self.enter(SupervisorState::Succeeded);
                    log::info!("Encoder finished successfully");
                    return Ok(());
                }
                Attempt::Failed { exit_code, stderr } => (exit_code, stderr),
            };

            match classify_failure(&current.args, &stderr, budget) {
                Some(Recovery::HardwareDecode(args)) => {
                    budget.hardware_decode_used = true;
                    self.enter(SupervisorState::RetryHardwareDecode);
                    let notice = "Hardware decoding unavailable, retrying with CPU decoding";
                    log::warn!("{notice}");
                    on_progress(None, notice);
                    current = current.with_args(args);
                }
                Some(Recovery::Encoder(args)) => {
                    budget.encoder_used = true;
                    self.enter(SupervisorState::RetryEncoder);
                    let notice = "Hardware encoder failed, retrying with CPU encoder";
                    log::warn!("{notice}");
                    on_progress(None, notice);
                    current = current.with_args(args);
                }
                None => {
                    self.enter(SupervisorState::Failed);
                    log::error!("Encoder failed with exit code {exit_code:?}");
                    return Err(CoreError::EncoderFailed { exit_code, stderr });
                }
            }
        }
    }

    fn attempt<F>(
        &mut self,
        command: &EncoderCommand,
        progress_hint: Option<f64>,
        on_progress: &mut F,
    ) -> CoreResult<Attempt>
    where
        F: FnMut(Option<f64>, &str),
    {
        log::info!("Running encoder: {}", command.display());
        let mut process = self.spawner.spawn(command)?;
        let mut handler = FfmpegProgressHandler::new(progress_hint);

        process.handle_events(|event| {
            if let Some(update) = handler.handle_event(event) {
                on_progress(update.percent, &update.line);
            }
            Ok(())
        })?;

        let status = process.wait()?;
        if status.success() {
            Ok(Attempt::Succeeded)
        } else {
            Ok(Attempt::Failed {
                exit_code: status.code(),
                stderr: handler.into_stderr(),
            })
        }
    }
}
