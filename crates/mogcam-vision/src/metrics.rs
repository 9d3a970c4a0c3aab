//! Metrics for the detection path.
//!
//! Recording is a no-op until the binary installs a recorder.

use metrics::{counter, gauge};

/// Metric names as constants for consistency.
pub mod names {
    pub const FRAMES_PROCESSED_TOTAL: &str = "mogcam_frames_processed_total";
    pub const DETECTOR_FAILURES_TOTAL: &str = "mogcam_detector_failures_total";
    pub const IDENTITIES_CREATED_TOTAL: &str = "mogcam_identities_created_total";
    pub const IDENTITIES_EVICTED_TOTAL: &str = "mogcam_identities_evicted_total";
    pub const FACES_TRACKED: &str = "mogcam_faces_tracked";
}

/// Record a processed frame.
pub fn record_frame_processed(detector: &'static str) {
    counter!(names::FRAMES_PROCESSED_TOTAL, "detector" => detector).increment(1);
}

/// Record a skipped frame caused by a detector error.
pub fn record_detector_failure(detector: &'static str) {
    counter!(names::DETECTOR_FAILURES_TOTAL, "detector" => detector).increment(1);
}

pub fn record_identity_created() {
    counter!(names::IDENTITIES_CREATED_TOTAL).increment(1);
}

pub fn record_identities_evicted(count: u64) {
    counter!(names::IDENTITIES_EVICTED_TOTAL).increment(count);
}

/// Update the live identity gauge.
pub fn set_faces_tracked(count: usize) {
    gauge!(names::FACES_TRACKED).set(count as f64);
}
