//! Reveal timeline steps, state snapshots and observer events.
//!
//! The timeline is a strictly linear cycle:
//!
//! `waiting -> countdown_3 -> countdown_2 -> countdown_1 -> scanning ->
//! calculating -> result_display -> waiting_for_input -> waiting`

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::verdict::FaceVerdict;

/// One step of the reveal cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema, Default)]
#[serde(rename_all = "snake_case")]
pub enum TimelineStep {
    /// Idle, no reveal in progress.
    #[default]
    Waiting,
    #[serde(rename = "countdown_3")]
    Countdown3,
    #[serde(rename = "countdown_2")]
    Countdown2,
    #[serde(rename = "countdown_1")]
    Countdown1,
    /// Scan line sweeps over the face.
    Scanning,
    /// Outcome and stats are locked in.
    Calculating,
    /// Mogging / mogged result is shown.
    ResultDisplay,
    /// Pause before the loop restarts.
    WaitingForInput,
}

impl TimelineStep {
    /// All steps in cycle order.
    pub const ALL: &'static [TimelineStep] = &[
        TimelineStep::Waiting,
        TimelineStep::Countdown3,
        TimelineStep::Countdown2,
        TimelineStep::Countdown1,
        TimelineStep::Scanning,
        TimelineStep::Calculating,
        TimelineStep::ResultDisplay,
        TimelineStep::WaitingForInput,
    ];

    /// Returns the step name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            TimelineStep::Waiting => "waiting",
            TimelineStep::Countdown3 => "countdown_3",
            TimelineStep::Countdown2 => "countdown_2",
            TimelineStep::Countdown1 => "countdown_1",
            TimelineStep::Scanning => "scanning",
            TimelineStep::Calculating => "calculating",
            TimelineStep::ResultDisplay => "result_display",
            TimelineStep::WaitingForInput => "waiting_for_input",
        }
    }

    /// Countdown number shown on screen, if this is a countdown step.
    pub fn countdown_value(&self) -> Option<u8> {
        match self {
            TimelineStep::Countdown3 => Some(3),
            TimelineStep::Countdown2 => Some(2),
            TimelineStep::Countdown1 => Some(1),
            _ => None,
        }
    }
}

impl fmt::Display for TimelineStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for TimelineStep {
    type Err = TimelineStepParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "waiting" => Ok(TimelineStep::Waiting),
            "countdown_3" => Ok(TimelineStep::Countdown3),
            "countdown_2" => Ok(TimelineStep::Countdown2),
            "countdown_1" => Ok(TimelineStep::Countdown1),
            "scanning" => Ok(TimelineStep::Scanning),
            "calculating" => Ok(TimelineStep::Calculating),
            "result_display" => Ok(TimelineStep::ResultDisplay),
            "waiting_for_input" => Ok(TimelineStep::WaitingForInput),
            _ => Err(TimelineStepParseError(s.to_string())),
        }
    }
}

#[derive(Debug, Error)]
#[error("Unknown timeline step: {0}")]
pub struct TimelineStepParseError(String);

/// Snapshot of the timeline exposed to the renderer.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
pub struct TimelineState {
    /// Current step of the cycle
    pub current_step: TimelineStep,
    /// Three signed stat strings for this cycle, empty until locked in
    pub cycle_stats: Vec<String>,
    /// Outcome for this cycle
    pub will_be_mogging: bool,
}

impl TimelineState {
    /// True once this cycle's outcome and stats have been generated.
    pub fn has_content(&self) -> bool {
        !self.cycle_stats.is_empty()
    }
}

/// Notification published on every timeline mutation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TimelineEvent {
    /// The current step changed.
    StepChanged {
        from: TimelineStep,
        to: TimelineStep,
        timestamp: DateTime<Utc>,
    },

    /// Outcome and stats were locked in for this cycle.
    CycleGenerated {
        stats: Vec<String>,
        will_be_mogging: bool,
        timestamp: DateTime<Utc>,
    },

    /// The timeline was forced back to waiting.
    Reset {
        from: TimelineStep,
        timestamp: DateTime<Utc>,
    },

    /// Per-slot verdicts were assigned after a scan.
    VerdictsAssigned {
        verdicts: [FaceVerdict; 2],
        timestamp: DateTime<Utc>,
    },
}

impl TimelineEvent {
    /// Short event name for logs and metrics labels.
    pub fn kind(&self) -> &'static str {
        match self {
            TimelineEvent::StepChanged { .. } => "step_changed",
            TimelineEvent::CycleGenerated { .. } => "cycle_generated",
            TimelineEvent::Reset { .. } => "reset",
            TimelineEvent::VerdictsAssigned { .. } => "verdicts_assigned",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_step_round_trip_strings() {
        for step in TimelineStep::ALL {
            let parsed: TimelineStep = step.as_str().parse().unwrap();
            assert_eq!(parsed, *step);

            let json = serde_json::to_string(step).unwrap();
            assert_eq!(json, format!("\"{}\"", step.as_str()));
        }
    }

    #[test]
    fn test_unknown_step_is_rejected() {
        let err = "celebrating".parse::<TimelineStep>().unwrap_err();
        assert!(err.to_string().contains("celebrating"));
    }

    #[test]
    fn test_countdown_values() {
        assert_eq!(TimelineStep::Countdown3.countdown_value(), Some(3));
        assert_eq!(TimelineStep::Countdown1.countdown_value(), Some(1));
        assert_eq!(TimelineStep::Scanning.countdown_value(), None);
    }

    #[test]
    fn test_default_state() {
        let state = TimelineState::default();
        assert_eq!(state.current_step, TimelineStep::Waiting);
        assert!(state.cycle_stats.is_empty());
        assert!(!state.will_be_mogging);
        assert!(!state.has_content());
    }

    #[test]
    fn test_event_tagging() {
        let event = TimelineEvent::StepChanged {
            from: TimelineStep::Waiting,
            to: TimelineStep::Countdown3,
            timestamp: Utc::now(),
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "step_changed");
        assert_eq!(json["to"], "countdown_3");
        assert_eq!(event.kind(), "step_changed");
    }
}
