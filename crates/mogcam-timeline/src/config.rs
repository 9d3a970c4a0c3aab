//! Timeline configuration: dwell durations and the lock-in step.

use mogcam_models::TimelineStep;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::{TimelineError, TimelineResult};

/// How long each step is held before the timer advances it, in milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimelineTimings {
    /// Waiting, only counted while a face is present (default: 1000)
    pub waiting_ms: u64,
    /// Each of the three countdown steps (default: 1000)
    pub countdown_ms: u64,
    pub scanning_ms: u64,
    pub calculating_ms: u64,
    pub result_display_ms: u64,
    pub waiting_for_input_ms: u64,
}

impl Default for TimelineTimings {
    fn default() -> Self {
        Self {
            waiting_ms: 1000,
            countdown_ms: 1000,
            scanning_ms: 3000,
            calculating_ms: 1000,
            result_display_ms: 3000,
            waiting_for_input_ms: 2000,
        }
    }
}

impl TimelineTimings {
    /// Dwell time for a step.
    pub fn duration_for(&self, step: TimelineStep) -> Duration {
        let ms = match step {
            TimelineStep::Waiting => self.waiting_ms,
            TimelineStep::Countdown3 | TimelineStep::Countdown2 | TimelineStep::Countdown1 => {
                self.countdown_ms
            }
            TimelineStep::Scanning => self.scanning_ms,
            TimelineStep::Calculating => self.calculating_ms,
            TimelineStep::ResultDisplay => self.result_display_ms,
            TimelineStep::WaitingForInput => self.waiting_for_input_ms,
        };
        Duration::from_millis(ms)
    }

    /// Wall time of one full cycle, from leaving Waiting back to Waiting.
    pub fn cycle_duration(&self) -> Duration {
        TimelineStep::ALL
            .iter()
            .filter(|step| **step != TimelineStep::Waiting)
            .map(|step| self.duration_for(*step))
            .sum()
    }
}

/// Timeline behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimelineConfig {
    pub timings: TimelineTimings,

    /// Arm dwell timers; when false only explicit calls move the machine (default: true)
    pub auto_advance: bool,

    /// Step whose entry generates the cycle's outcome and stats (default: calculating)
    pub lock_in_step: TimelineStep,
}

impl Default for TimelineConfig {
    fn default() -> Self {
        Self {
            timings: TimelineTimings::default(),
            auto_advance: true,
            lock_in_step: TimelineStep::Calculating,
        }
    }
}

impl TimelineConfig {
    pub fn validate(&self) -> TimelineResult<()> {
        if !matches!(
            self.lock_in_step,
            TimelineStep::Scanning | TimelineStep::Calculating
        ) {
            return Err(TimelineError::invalid_config(format!(
                "lock_in_step must be scanning or calculating, got {}",
                self.lock_in_step
            )));
        }

        if self.auto_advance {
            if let Some(step) = TimelineStep::ALL
                .iter()
                .find(|step| self.timings.duration_for(**step).is_zero())
            {
                return Err(TimelineError::invalid_config(format!(
                    "dwell time for {} must be > 0 when auto_advance is on",
                    step
                )));
            }
        }

        Ok(())
    }
}
