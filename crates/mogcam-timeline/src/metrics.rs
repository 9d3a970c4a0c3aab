//! Timeline metrics.

use metrics::counter;
use mogcam_models::TimelineStep;

/// Metric names as constants for consistency.
pub mod names {
    pub const TIMELINE_TRANSITIONS_TOTAL: &str = "mogcam_timeline_transitions_total";
    pub const TIMELINE_RESETS_TOTAL: &str = "mogcam_timeline_resets_total";
}

/// Record a step change, labelled by the step entered.
pub fn record_transition(to: TimelineStep) {
    counter!(names::TIMELINE_TRANSITIONS_TOTAL, "to" => to.as_str()).increment(1);
}

/// Record a forced reset, labelled by the step it interrupted.
pub fn record_reset(from: TimelineStep) {
    counter!(names::TIMELINE_RESETS_TOTAL, "from" => from.as_str()).increment(1);
}
