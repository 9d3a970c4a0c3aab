//! Session-level engine metrics.

use metrics::counter;
use mogcam_models::DetectionMode;

use crate::logging::SessionSummary;

/// Metric names as constants for consistency.
pub mod names {
    pub const SESSIONS_STARTED_TOTAL: &str = "mogcam_sessions_started_total";
    pub const SESSIONS_COMPLETED_TOTAL: &str = "mogcam_sessions_completed_total";
    pub const SESSION_CYCLES_TOTAL: &str = "mogcam_session_cycles_total";
    pub const SESSION_EVENTS_LAGGED_TOTAL: &str = "mogcam_session_events_lagged_total";
}

/// Record a session start.
pub fn record_session_started(mode: DetectionMode) {
    counter!(names::SESSIONS_STARTED_TOTAL, "mode" => mode.as_str()).increment(1);
}

/// Record a finished session and the cycles it ran.
pub fn record_session_completed(mode: DetectionMode, summary: &SessionSummary) {
    counter!(names::SESSIONS_COMPLETED_TOTAL, "mode" => mode.as_str()).increment(1);
    counter!(names::SESSION_CYCLES_TOTAL, "mode" => mode.as_str()).increment(summary.cycles);
    if summary.lagged > 0 {
        counter!(names::SESSION_EVENTS_LAGGED_TOTAL).increment(summary.lagged);
    }
}
