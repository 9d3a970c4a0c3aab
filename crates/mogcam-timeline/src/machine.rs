//! Reveal timeline state machine.
//!
//! The cycle is strictly linear and driven from outside: something else
//! decides *when* to call `advance` (dwell timers, presence signals), this
//! type only decides *what* the next state is. Outcome and stat lines are
//! generated once per cycle, on entry to the configured lock-in step, and
//! carried over until the next lock-in or a reset.

use chrono::Utc;
use mogcam_models::{TimelineEvent, TimelineState, TimelineStep};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tokio::sync::{broadcast, watch};
use tracing::{debug, info};

use crate::config::TimelineConfig;
use crate::error::{TimelineError, TimelineResult};
use crate::metrics;
use crate::stats::generate_cycle;

/// Buffered events per subscriber before the slowest one starts lagging.
const EVENT_CHANNEL_CAPACITY: usize = 64;

/// Successor of every step.
const TRANSITIONS: &[(TimelineStep, TimelineStep)] = &[
    (TimelineStep::Waiting, TimelineStep::Countdown3),
    (TimelineStep::Countdown3, TimelineStep::Countdown2),
    (TimelineStep::Countdown2, TimelineStep::Countdown1),
    (TimelineStep::Countdown1, TimelineStep::Scanning),
    (TimelineStep::Scanning, TimelineStep::Calculating),
    (TimelineStep::Calculating, TimelineStep::ResultDisplay),
    (TimelineStep::ResultDisplay, TimelineStep::WaitingForInput),
    (TimelineStep::WaitingForInput, TimelineStep::Waiting),
];

fn lookup(table: &[(TimelineStep, TimelineStep)], from: TimelineStep) -> TimelineResult<TimelineStep> {
    table
        .iter()
        .find(|(step, _)| *step == from)
        .map(|(_, next)| *next)
        .ok_or(TimelineError::InvalidTransition(from))
}

/// Step that follows `from` in the cycle.
pub fn next_step(from: TimelineStep) -> TimelineResult<TimelineStep> {
    lookup(TRANSITIONS, from)
}

/// The reveal cycle state plus its observers.
pub struct Timeline {
    config: TimelineConfig,
    state: TimelineState,
    rng: StdRng,
    events: broadcast::Sender<TimelineEvent>,
    state_tx: watch::Sender<TimelineState>,
}

impl Timeline {
    /// Create a timeline with a randomly seeded generator.
    pub fn new(config: TimelineConfig) -> TimelineResult<Self> {
        Self::with_rng(config, StdRng::from_rng(&mut rand::rng()))
    }

    /// Create a timeline with an injected generator.
    pub fn with_rng(config: TimelineConfig, rng: StdRng) -> TimelineResult<Self> {
        config.validate()?;
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        let (state_tx, _) = watch::channel(TimelineState::default());
        Ok(Self {
            config,
            state: TimelineState::default(),
            rng,
            events,
            state_tx,
        })
    }

    /// Move to the next step of the cycle.
    ///
    /// # Returns
    /// The new state. Content is regenerated when the new step is the
    /// lock-in step, otherwise carried over.
    pub fn advance(&mut self) -> TimelineResult<TimelineState> {
        let from = self.state.current_step;
        let to = next_step(from)?;

        self.state.current_step = to;
        metrics::record_transition(to);
        debug!(from = %from, to = %to, "Timeline advanced");
        self.publish(TimelineEvent::StepChanged {
            from,
            to,
            timestamp: Utc::now(),
        });

        if to == self.config.lock_in_step {
            let content = generate_cycle(&mut self.rng);
            info!(
                will_be_mogging = content.will_be_mogging,
                stats = ?content.stats,
                "Cycle outcome locked in"
            );
            self.state.will_be_mogging = content.will_be_mogging;
            self.state.cycle_stats = content.stats;
            self.publish(TimelineEvent::CycleGenerated {
                stats: self.state.cycle_stats.clone(),
                will_be_mogging: self.state.will_be_mogging,
                timestamp: Utc::now(),
            });
        }

        self.state_tx.send_replace(self.state.clone());
        Ok(self.state.clone())
    }

    /// Advance only if the timeline is still at `expected`.
    ///
    /// Returns `Ok(None)` when another trigger already moved the timeline
    /// on, so a stale trigger never applies twice.
    pub fn advance_from(&mut self, expected: TimelineStep) -> TimelineResult<Option<TimelineState>> {
        if self.state.current_step != expected {
            debug!(
                expected = %expected,
                current = %self.state.current_step,
                "Ignoring stale advance"
            );
            return Ok(None);
        }
        self.advance().map(Some)
    }

    /// Force the timeline back to `Waiting` with cleared content.
    pub fn reset(&mut self) -> TimelineState {
        let from = self.state.current_step;
        self.state = TimelineState::default();
        metrics::record_reset(from);
        info!(from = %from, "Timeline reset");

        self.publish(TimelineEvent::Reset {
            from,
            timestamp: Utc::now(),
        });
        self.state_tx.send_replace(self.state.clone());
        self.state.clone()
    }

    pub fn state(&self) -> &TimelineState {
        &self.state
    }

    pub fn config(&self) -> &TimelineConfig {
        &self.config
    }

    /// Subscribe to timeline events.
    pub fn subscribe(&self) -> broadcast::Receiver<TimelineEvent> {
        self.events.subscribe()
    }

    /// Read-only mirror of the current state.
    pub fn watch_state(&self) -> watch::Receiver<TimelineState> {
        self.state_tx.subscribe()
    }

    pub(crate) fn event_sender(&self) -> broadcast::Sender<TimelineEvent> {
        self.events.clone()
    }

    /// Publish an event on the timeline's channel.
    pub(crate) fn publish(&self, event: TimelineEvent) {
        // No subscribers is fine
        let _ = self.events.send(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stats::CycleContent;

    fn timeline(seed: u64) -> Timeline {
        Timeline::with_rng(TimelineConfig::default(), StdRng::seed_from_u64(seed)).unwrap()
    }

    #[test]
    fn test_linear_cycle() {
        let mut tl = timeline(1);
        assert_eq!(tl.state().current_step, TimelineStep::Waiting);

        let mut visited = Vec::new();
        for _ in 0..8 {
            visited.push(tl.advance().unwrap().current_step);
        }

        assert_eq!(
            visited,
            vec![
                TimelineStep::Countdown3,
                TimelineStep::Countdown2,
                TimelineStep::Countdown1,
                TimelineStep::Scanning,
                TimelineStep::Calculating,
                TimelineStep::ResultDisplay,
                TimelineStep::WaitingForInput,
                TimelineStep::Waiting,
            ]
        );
    }

    #[test]
    fn test_every_step_has_a_successor() {
        for step in TimelineStep::ALL {
            assert!(next_step(*step).is_ok(), "{step} has no successor");
        }
    }

    #[test]
    fn test_missing_entry_is_invalid_transition() {
        let table = &TRANSITIONS[..3];
        let err = lookup(table, TimelineStep::Scanning).unwrap_err();
        assert!(matches!(err, TimelineError::InvalidTransition(TimelineStep::Scanning)));
    }

    #[test]
    fn test_content_generated_on_entering_calculating() {
        let mut tl = timeline(5);

        for _ in 0..4 {
            let state = tl.advance().unwrap();
            assert!(state.cycle_stats.is_empty());
        }
        assert_eq!(tl.state().current_step, TimelineStep::Scanning);

        let calculating = tl.advance().unwrap();
        assert_eq!(calculating.current_step, TimelineStep::Calculating);
        assert_eq!(calculating.cycle_stats.len(), 3);

        // Carried over for the rest of the cycle
        for _ in 0..3 {
            let state = tl.advance().unwrap();
            assert_eq!(state.cycle_stats, calculating.cycle_stats);
            assert_eq!(state.will_be_mogging, calculating.will_be_mogging);
        }
        assert_eq!(tl.state().current_step, TimelineStep::Waiting);
    }

    #[test]
    fn test_content_matches_seeded_generator() {
        let mut tl = timeline(1234);
        for _ in 0..5 {
            tl.advance().unwrap();
        }

        let expected: CycleContent = generate_cycle(&mut StdRng::seed_from_u64(1234));
        assert_eq!(tl.state().cycle_stats, expected.stats);
        assert_eq!(tl.state().will_be_mogging, expected.will_be_mogging);
    }

    #[test]
    fn test_second_lock_in_regenerates_content() {
        let mut tl = timeline(77);
        let mut rng = StdRng::seed_from_u64(77);
        let first = generate_cycle(&mut rng);
        let second = generate_cycle(&mut rng);

        for n in 1..=13 {
            let state = tl.advance().unwrap();
            match n {
                1..=4 => assert!(state.cycle_stats.is_empty(), "advance {n}"),
                5..=12 => {
                    assert_eq!(state.cycle_stats, first.stats, "advance {n}");
                    assert_eq!(state.will_be_mogging, first.will_be_mogging);
                }
                _ => {
                    assert_eq!(state.current_step, TimelineStep::Calculating);
                    assert_eq!(state.cycle_stats, second.stats);
                    assert_eq!(state.will_be_mogging, second.will_be_mogging);
                }
            }
        }
    }

    #[test]
    fn test_reset_from_every_step() {
        for (advances, expected) in TimelineStep::ALL.iter().enumerate() {
            let mut tl = timeline(advances as u64);
            let mut events = tl.subscribe();
            for _ in 0..advances {
                tl.advance().unwrap();
            }
            assert_eq!(tl.state().current_step, *expected);

            assert_eq!(tl.reset(), TimelineState::default(), "reset from {expected}");
            assert_eq!(*tl.state(), TimelineState::default());

            let last = std::iter::from_fn(|| events.try_recv().ok()).last();
            assert!(matches!(last, Some(TimelineEvent::Reset { from, .. }) if from == *expected));
        }
    }

    #[test]
    fn test_scanning_lock_in_variant() {
        let config = TimelineConfig {
            lock_in_step: TimelineStep::Scanning,
            ..Default::default()
        };
        let mut tl = Timeline::with_rng(config, StdRng::seed_from_u64(3)).unwrap();

        for _ in 0..3 {
            tl.advance().unwrap();
        }
        let scanning = tl.advance().unwrap();
        assert_eq!(scanning.current_step, TimelineStep::Scanning);
        assert_eq!(scanning.cycle_stats.len(), 3);

        let calculating = tl.advance().unwrap();
        assert_eq!(calculating.cycle_stats, scanning.cycle_stats);
    }

    #[test]
    fn test_advance_from_stale_step_is_noop() {
        let mut tl = timeline(1);
        tl.advance().unwrap();

        assert!(tl.advance_from(TimelineStep::Waiting).unwrap().is_none());
        assert_eq!(tl.state().current_step, TimelineStep::Countdown3);

        let state = tl.advance_from(TimelineStep::Countdown3).unwrap().unwrap();
        assert_eq!(state.current_step, TimelineStep::Countdown2);
    }

    #[test]
    fn test_reset_clears_content_from_any_step() {
        let mut tl = timeline(9);
        for _ in 0..6 {
            tl.advance().unwrap();
        }
        assert!(tl.state().has_content());

        let state = tl.reset();
        assert_eq!(state, TimelineState::default());
        assert_eq!(*tl.state(), TimelineState::default());

        // Reset while already waiting is still a reset
        assert_eq!(tl.reset(), TimelineState::default());
    }

    #[test]
    fn test_events_and_watch_mirror() {
        let mut tl = timeline(2);
        let mut events = tl.subscribe();
        let state_rx = tl.watch_state();

        for _ in 0..5 {
            tl.advance().unwrap();
        }
        tl.reset();

        let kinds: Vec<&str> = std::iter::from_fn(|| events.try_recv().ok())
            .map(|e| e.kind())
            .collect();
        assert_eq!(
            kinds,
            vec![
                "step_changed",
                "step_changed",
                "step_changed",
                "step_changed",
                "step_changed",
                "cycle_generated",
                "reset",
            ]
        );
        assert_eq!(*state_rx.borrow(), TimelineState::default());
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = TimelineConfig {
            lock_in_step: TimelineStep::Waiting,
            ..Default::default()
        };
        assert!(Timeline::new(config).is_err());
    }
}
