//! Nearest-neighbor tracker for maintaining face identity across frames.
//!
//! Matching is detection-driven and greedy: every detection independently
//! picks the tracked face with the lowest `distance - overlap * weight`
//! score among those whose centers lie within `max_distance`. A tracked face
//! is not removed from the candidate set once claimed, so two detections in
//! the same frame may both land on it. This is best-effort association, not
//! a global assignment.

use mogcam_models::{Detection, TrackedFace};
use tracing::debug;

use crate::config::TrackerConfig;
use crate::metrics;

/// Greedy identity tracker, bounded to `max_faces` outputs per frame.
pub struct FaceTracker {
    config: TrackerConfig,
    /// Faces currently alive, kept in ranked order after each update
    faces: Vec<TrackedFace>,
    /// Next identity to assign; never rewinds
    next_track_id: u32,
}

impl FaceTracker {
    /// Create a new tracker.
    pub fn new(config: TrackerConfig) -> Self {
        Self {
            config,
            faces: Vec::new(),
            next_track_id: 0,
        }
    }

    /// Associate this frame's detections with known identities.
    ///
    /// # Returns
    /// At most `max_faces` faces, highest confidence first, earlier identity
    /// first on ties.
    pub fn update_faces(&mut self, detections: &[Detection]) -> Vec<TrackedFace> {
        for face in &mut self.faces {
            face.frames_since_seen += 1;
        }

        for detection in detections {
            match self.best_match(detection) {
                Some(idx) => {
                    let face = &mut self.faces[idx];
                    face.detection = *detection;
                    face.frames_since_seen = 0;
                    face.confidence = (face.confidence + self.config.confidence_step).min(1.0);
                }
                None => {
                    let track_id = self.next_track_id;
                    self.next_track_id += 1;
                    debug!(track_id, cx = detection.bbox.cx(), cy = detection.bbox.cy(), "New face identity");
                    metrics::record_identity_created();
                    self.faces.push(TrackedFace {
                        track_id,
                        detection: *detection,
                        frames_since_seen: 0,
                        confidence: self.config.initial_confidence,
                    });
                }
            }
        }

        let max_age = self.config.max_age;
        let before = self.faces.len();
        self.faces.retain(|face| {
            let alive = face.frames_since_seen < max_age;
            if !alive {
                debug!(track_id = face.track_id, "Evicting stale face identity");
            }
            alive
        });
        let evicted = before - self.faces.len();
        if evicted > 0 {
            metrics::record_identities_evicted(evicted as u64);
        }

        self.faces.sort_by(|a, b| {
            b.confidence
                .total_cmp(&a.confidence)
                .then_with(|| a.track_id.cmp(&b.track_id))
        });

        metrics::set_faces_tracked(self.faces.len());

        self.faces
            .iter()
            .take(self.config.max_faces)
            .cloned()
            .collect()
    }

    /// Index of the lowest-score eligible tracked face for a detection.
    fn best_match(&self, detection: &Detection) -> Option<usize> {
        let mut best: Option<(usize, f64)> = None;

        for (idx, face) in self.faces.iter().enumerate() {
            let distance = detection.bbox.center_distance(face.bbox());
            if distance >= self.config.max_distance {
                continue;
            }

            let overlap = detection.bbox.overlap_ratio(face.bbox());
            let score = distance - overlap * self.config.overlap_weight;

            if best.map_or(true, |(_, best_score)| score < best_score) {
                best = Some((idx, score));
            }
        }

        best.map(|(idx, _)| idx)
    }

    /// Drop all tracked faces. Identities keep counting up.
    pub fn reset(&mut self) {
        self.faces.clear();
        metrics::set_faces_tracked(0);
    }

    /// Number of faces alive, including those beyond the output cap.
    pub fn tracked_count(&self) -> usize {
        self.faces.len()
    }

    /// Identity the next unmatched detection will receive.
    pub fn next_track_id(&self) -> u32 {
        self.next_track_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mogcam_models::BoundingBox;

    fn det(x: f64, y: f64, w: f64, h: f64) -> Detection {
        Detection::new(BoundingBox::new(x, y, w, h))
    }

    fn tracker() -> FaceTracker {
        FaceTracker::new(TrackerConfig::default())
    }

    #[test]
    fn test_identity_stable_for_static_face() {
        let mut tracker = tracker();
        let d = det(100.0, 100.0, 50.0, 50.0);

        let first = tracker.update_faces(&[d]);
        assert_eq!(first.len(), 1);
        let id = first[0].track_id;

        for _ in 0..4 {
            let faces = tracker.update_faces(&[d]);
            assert_eq!(faces.len(), 1);
            assert_eq!(faces[0].track_id, id);
            assert_eq!(faces[0].frames_since_seen, 0);
        }
    }

    #[test]
    fn test_confidence_grows_and_caps() {
        let mut tracker = tracker();
        let d = det(0.0, 0.0, 40.0, 40.0);

        let faces = tracker.update_faces(&[d]);
        assert!((faces[0].confidence - 0.5).abs() < 1e-9);

        let faces = tracker.update_faces(&[d]);
        assert!((faces[0].confidence - 0.6).abs() < 1e-9);

        let mut last = faces;
        for _ in 0..10 {
            last = tracker.update_faces(&[d]);
        }
        assert_eq!(last[0].confidence, 1.0);
    }

    #[test]
    fn test_eviction_at_max_age() {
        let config = TrackerConfig {
            max_age: 5,
            ..Default::default()
        };
        let mut tracker = FaceTracker::new(config);
        tracker.update_faces(&[det(0.0, 0.0, 40.0, 40.0)]);

        // Present for max_age - 1 empty frames
        for expected_age in 1..5 {
            let faces = tracker.update_faces(&[]);
            assert_eq!(faces.len(), 1);
            assert_eq!(faces[0].frames_since_seen, expected_age);
        }

        // Absent on the max_age-th
        let faces = tracker.update_faces(&[]);
        assert!(faces.is_empty());
        assert_eq!(tracker.tracked_count(), 0);
    }

    #[test]
    fn test_unseen_face_keeps_confidence() {
        let mut tracker = tracker();
        let d = det(0.0, 0.0, 40.0, 40.0);
        tracker.update_faces(&[d]);
        tracker.update_faces(&[d]);

        let faces = tracker.update_faces(&[]);
        assert!((faces[0].confidence - 0.6).abs() < 1e-9);
        assert_eq!(faces[0].frames_since_seen, 1);
    }

    #[test]
    fn test_output_capped_at_two() {
        let mut tracker = tracker();
        let detections = [
            det(0.0, 0.0, 50.0, 50.0),
            det(300.0, 0.0, 50.0, 50.0),
            det(600.0, 0.0, 50.0, 50.0),
        ];

        let faces = tracker.update_faces(&detections);
        assert_eq!(faces.len(), 2);
        assert_eq!(tracker.tracked_count(), 3);
        // Equal confidence, so earlier identities win
        assert_eq!(faces[0].track_id, 0);
        assert_eq!(faces[1].track_id, 1);
    }

    #[test]
    fn test_ranking_prefers_confidence() {
        let mut tracker = tracker();
        let a = det(0.0, 0.0, 50.0, 50.0);
        let b = det(300.0, 0.0, 50.0, 50.0);
        let c = det(600.0, 0.0, 50.0, 50.0);

        tracker.update_faces(&[a, b, c]);
        // Only c keeps being seen, so it outranks the older identities
        let faces = tracker.update_faces(&[c]);
        assert_eq!(faces[0].track_id, 2);
        assert_eq!(faces[1].track_id, 0);
    }

    #[test]
    fn test_far_detection_creates_new_identity() {
        let mut tracker = tracker();
        tracker.update_faces(&[det(0.0, 0.0, 50.0, 50.0)]);

        // Center moves exactly max_distance away: not eligible
        let faces = tracker.update_faces(&[det(100.0, 0.0, 50.0, 50.0)]);
        let ids: Vec<u32> = faces.iter().map(|f| f.track_id).collect();
        assert!(ids.contains(&1));
        assert_eq!(tracker.next_track_id(), 2);
    }

    #[test]
    fn test_overlap_outweighs_raw_distance() {
        let mut tracker = tracker();
        // Large face, and a small face just outside its right edge
        tracker.update_faces(&[det(0.0, 0.0, 200.0, 200.0), det(205.0, 95.0, 20.0, 20.0)]);

        // The new box sits inside the large box: its center is ~75px from the large
        // face and 40px from the small one, but full overlap wins.
        let inside = det(160.0, 90.0, 30.0, 30.0);
        let faces = tracker.update_faces(&[inside]);
        assert_eq!(faces[0].track_id, 0);
        assert_eq!(faces[0].detection.bbox, inside.bbox);
        assert_eq!(faces[1].track_id, 1);
        assert_eq!(faces[1].frames_since_seen, 1);
    }

    #[test]
    fn test_same_face_can_be_claimed_twice() {
        let mut tracker = tracker();
        tracker.update_faces(&[det(100.0, 100.0, 50.0, 50.0)]);

        // Both detections score against identity 0; the second re-claims it
        let faces = tracker.update_faces(&[det(105.0, 100.0, 50.0, 50.0), det(95.0, 100.0, 50.0, 50.0)]);
        assert_eq!(faces.len(), 1);
        assert_eq!(faces[0].detection.bbox.x, 95.0);
        assert_eq!(tracker.next_track_id(), 1);
    }

    #[test]
    fn test_greedy_matching_can_spawn_spurious_identity() {
        let mut tracker = tracker();
        tracker.update_faces(&[det(100.0, 100.0, 50.0, 50.0)]);

        // The first detection drags identity 0 90px right; the second, 90px
        // left of where it started, is now out of range and is born anew.
        let faces = tracker.update_faces(&[det(190.0, 100.0, 50.0, 50.0), det(10.0, 100.0, 50.0, 50.0)]);
        assert_eq!(faces.len(), 2);
        assert_eq!(faces[0].track_id, 0);
        assert_eq!(faces[0].detection.bbox.x, 190.0);
        assert_eq!(faces[1].track_id, 1);
    }

    #[test]
    fn test_reset_never_reuses_identities() {
        let mut tracker = tracker();
        tracker.update_faces(&[det(0.0, 0.0, 50.0, 50.0)]);
        tracker.reset();
        assert_eq!(tracker.tracked_count(), 0);

        let faces = tracker.update_faces(&[det(0.0, 0.0, 50.0, 50.0)]);
        assert_eq!(faces[0].track_id, 1);
    }
}
