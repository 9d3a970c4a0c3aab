//! Structured session logging for timeline events.
//!
//! Every event is logged with the session ID and detection mode so a run
//! can be followed in aggregated JSON logs.

use mogcam_models::{DetectionMode, TimelineEvent};
use serde::Serialize;
use tokio::sync::{broadcast, watch};
use tracing::{info, warn, Span};
use uuid::Uuid;

/// Event counts for one session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SessionSummary {
    pub events: u64,
    pub transitions: u64,
    pub cycles: u64,
    pub resets: u64,
    pub verdicts: u64,
    /// Events dropped because the logger fell behind
    pub lagged: u64,
}

/// Session logger for structured timeline logging.
#[derive(Debug, Clone)]
pub struct EventLogger {
    session_id: String,
    mode: DetectionMode,
}

impl EventLogger {
    /// Create a logger for a new session.
    pub fn new(mode: DetectionMode) -> Self {
        Self {
            session_id: Uuid::new_v4().to_string(),
            mode,
        }
    }

    /// Create a logger with a known session ID.
    pub fn from_string(session_id: &str, mode: DetectionMode) -> Self {
        Self {
            session_id: session_id.to_string(),
            mode,
        }
    }

    pub fn log_start(&self, message: &str) {
        info!(
            session_id = %self.session_id,
            mode = %self.mode,
            "Session started: {}", message
        );
    }

    pub fn log_completion(&self, summary: &SessionSummary) {
        info!(
            session_id = %self.session_id,
            mode = %self.mode,
            cycles = summary.cycles,
            resets = summary.resets,
            events = summary.events,
            "Session completed"
        );
    }

    /// Log a single timeline event.
    pub fn log_event(&self, event: &TimelineEvent) {
        match event {
            TimelineEvent::StepChanged { from, to, .. } => info!(
                session_id = %self.session_id,
                mode = %self.mode,
                from = %from,
                to = %to,
                "Step changed"
            ),
            TimelineEvent::CycleGenerated {
                stats,
                will_be_mogging,
                ..
            } => info!(
                session_id = %self.session_id,
                mode = %self.mode,
                will_be_mogging,
                stats = ?stats,
                "Cycle generated"
            ),
            TimelineEvent::Reset { from, .. } => info!(
                session_id = %self.session_id,
                mode = %self.mode,
                from = %from,
                "Timeline reset"
            ),
            TimelineEvent::VerdictsAssigned { verdicts, .. } => info!(
                session_id = %self.session_id,
                mode = %self.mode,
                verdicts = ?verdicts,
                "Verdicts assigned"
            ),
        }
    }

    /// Consume events until `stop` flips to true, then drain what is buffered.
    pub async fn run(
        &self,
        mut events: broadcast::Receiver<TimelineEvent>,
        mut stop: watch::Receiver<bool>,
    ) -> SessionSummary {
        let mut summary = SessionSummary::default();

        loop {
            tokio::select! {
                changed = stop.changed() => {
                    if changed.is_err() || *stop.borrow() {
                        break;
                    }
                }
                received = events.recv() => match received {
                    Ok(event) => self.record(&event, &mut summary),
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        warn!(session_id = %self.session_id, skipped, "Event logger lagged");
                        summary.lagged += skipped;
                    }
                    Err(broadcast::error::RecvError::Closed) => return summary,
                },
            }
        }

        loop {
            match events.try_recv() {
                Ok(event) => self.record(&event, &mut summary),
                Err(broadcast::error::TryRecvError::Lagged(skipped)) => summary.lagged += skipped,
                Err(_) => break,
            }
        }
        summary
    }

    fn record(&self, event: &TimelineEvent, summary: &mut SessionSummary) {
        self.log_event(event);
        summary.events += 1;
        match event {
            TimelineEvent::StepChanged { .. } => summary.transitions += 1,
            TimelineEvent::CycleGenerated { .. } => summary.cycles += 1,
            TimelineEvent::Reset { .. } => summary.resets += 1,
            TimelineEvent::VerdictsAssigned { .. } => summary.verdicts += 1,
        }
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn mode(&self) -> DetectionMode {
        self.mode
    }

    /// Create a tracing span for this session.
    pub fn create_span(&self) -> Span {
        tracing::info_span!(
            "session",
            session_id = %self.session_id,
            mode = %self.mode
        )
    }
}
