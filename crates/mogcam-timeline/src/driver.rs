//! Async task that moves the timeline on dwell timers and presence signals.
//!
//! The driver owns the `Timeline` and the `VerdictBoard`; everything else
//! talks to it through a cloneable `DriverHandle`. At most one dwell timer
//! is pending at a time. It is tagged with the step it was armed for and
//! replaced on every state change, and a firing timer only advances from
//! that step, so a timer that outlived its step does nothing.

use chrono::Utc;
use mogcam_models::{FaceVerdict, TimelineEvent, TimelineState, TimelineStep};
use tokio::sync::{broadcast, mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::{sleep_until, Instant};
use tracing::{debug, error, info};

use crate::error::{TimelineError, TimelineResult};
use crate::machine::Timeline;
use crate::verdict::VerdictBoard;

#[derive(Debug)]
enum DriverCommand {
    Presence(usize),
    Advance,
    Reset,
    Shutdown,
}

#[derive(Debug, Clone, Copy)]
struct PendingTimer {
    step: TimelineStep,
    deadline: Instant,
}

/// Handle for feeding signals to a running driver and observing it.
#[derive(Clone)]
pub struct DriverHandle {
    commands: mpsc::UnboundedSender<DriverCommand>,
    state: watch::Receiver<TimelineState>,
    verdicts: watch::Receiver<[FaceVerdict; 2]>,
    events: broadcast::Sender<TimelineEvent>,
}

impl DriverHandle {
    /// Report the current number of visible faces.
    pub fn presence_changed(&self, count: usize) -> TimelineResult<()> {
        self.send(DriverCommand::Presence(count))
    }

    /// Advance from the current step immediately.
    pub fn advance(&self) -> TimelineResult<()> {
        self.send(DriverCommand::Advance)
    }

    /// Force the timeline back to `Waiting`.
    pub fn reset(&self) -> TimelineResult<()> {
        self.send(DriverCommand::Reset)
    }

    /// Stop the driver task.
    pub fn shutdown(&self) -> TimelineResult<()> {
        self.send(DriverCommand::Shutdown)
    }

    /// Read-only mirror of the timeline state.
    pub fn state(&self) -> watch::Receiver<TimelineState> {
        self.state.clone()
    }

    /// Per-slot verdicts, updated after each scan and on reset.
    pub fn verdicts(&self) -> watch::Receiver<[FaceVerdict; 2]> {
        self.verdicts.clone()
    }

    /// Subscribe to timeline events.
    pub fn subscribe(&self) -> broadcast::Receiver<TimelineEvent> {
        self.events.subscribe()
    }

    fn send(&self, command: DriverCommand) -> TimelineResult<()> {
        self.commands
            .send(command)
            .map_err(|_| TimelineError::DriverStopped)
    }
}

/// Timer and presence driven owner of a `Timeline`.
pub struct TimelineDriver {
    timeline: Timeline,
    board: VerdictBoard,
    commands: mpsc::UnboundedReceiver<DriverCommand>,
    verdict_tx: watch::Sender<[FaceVerdict; 2]>,
    faces: usize,
    pending: Option<PendingTimer>,
}

impl TimelineDriver {
    pub fn new(timeline: Timeline, board: VerdictBoard) -> (Self, DriverHandle) {
        let (commands_tx, commands) = mpsc::unbounded_channel();
        let (verdict_tx, verdicts) = watch::channel(board.verdicts());

        let handle = DriverHandle {
            commands: commands_tx,
            state: timeline.watch_state(),
            verdicts,
            events: timeline.event_sender(),
        };

        let driver = Self {
            timeline,
            board,
            commands,
            verdict_tx,
            faces: 0,
            pending: None,
        };
        (driver, handle)
    }

    /// Spawn the driver on the current runtime.
    pub fn spawn(timeline: Timeline, board: VerdictBoard) -> (DriverHandle, JoinHandle<TimelineResult<()>>) {
        let (driver, handle) = Self::new(timeline, board);
        (handle, tokio::spawn(driver.run()))
    }

    /// Process commands and timers until shutdown or every handle is dropped.
    ///
    /// Returns an error only for a broken transition table.
    pub async fn run(mut self) -> TimelineResult<()> {
        info!(
            mode = %self.board.mode(),
            auto_advance = self.timeline.config().auto_advance,
            lock_in = %self.timeline.config().lock_in_step,
            "Timeline driver started"
        );
        self.rearm();

        let result = loop {
            let pending = self.pending;
            let deadline = pending.map_or_else(Instant::now, |timer| timer.deadline);

            let outcome = tokio::select! {
                command = self.commands.recv() => match command {
                    Some(DriverCommand::Presence(count)) => self.on_presence(count),
                    Some(DriverCommand::Advance) => {
                        let step = self.timeline.state().current_step;
                        self.advance_from(step)
                    }
                    Some(DriverCommand::Reset) => {
                        self.reset();
                        Ok(())
                    }
                    Some(DriverCommand::Shutdown) | None => break Ok(()),
                },
                _ = sleep_until(deadline), if pending.is_some() => {
                    self.pending = None;
                    match pending {
                        Some(timer) => self.advance_from(timer.step),
                        None => Ok(()),
                    }
                }
            };

            if let Err(e) = outcome {
                error!(error = %e, "Timeline driver failed");
                break Err(e);
            }
        };

        info!(step = %self.timeline.state().current_step, "Timeline driver stopped");
        result
    }

    fn on_presence(&mut self, count: usize) -> TimelineResult<()> {
        let previous = self.faces;
        self.faces = count;
        debug!(previous, count, "Presence changed");

        if previous == 0 && count > 0 {
            if self.timeline.state().current_step == TimelineStep::Waiting {
                return self.advance_from(TimelineStep::Waiting);
            }
            self.rearm();
        } else if previous > 0 && count == 0 {
            self.reset();
        }
        Ok(())
    }

    fn advance_from(&mut self, expected: TimelineStep) -> TimelineResult<()> {
        if let Some(state) = self.timeline.advance_from(expected)? {
            if expected == TimelineStep::Scanning {
                self.assign_verdicts(&state);
            }
        }
        self.rearm();
        Ok(())
    }

    fn assign_verdicts(&mut self, state: &TimelineState) {
        let Some(verdicts) = self.board.assign(self.faces, state.will_be_mogging) else {
            return;
        };
        info!(faces = self.faces, ?verdicts, "Verdicts assigned");
        self.verdict_tx.send_replace(verdicts);
        self.timeline.publish(TimelineEvent::VerdictsAssigned {
            verdicts,
            timestamp: Utc::now(),
        });
    }

    fn reset(&mut self) {
        self.timeline.reset();
        self.board.reset();
        self.verdict_tx.send_replace(self.board.verdicts());
        self.rearm();
    }

    /// Replace the pending timer with one for the current step.
    fn rearm(&mut self) {
        self.pending = None;

        let config = self.timeline.config();
        if !config.auto_advance {
            return;
        }

        let step = self.timeline.state().current_step;
        if step == TimelineStep::Waiting && self.faces == 0 {
            return;
        }

        let dwell = config.timings.duration_for(step);
        self.pending = Some(PendingTimer {
            step,
            deadline: Instant::now() + dwell,
        });
    }
}
