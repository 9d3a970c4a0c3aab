//! Detector output -> tracker -> per-slot smoothers.
//!
//! Smoothers are indexed by output slot, not by identity: slot 0 always
//! runs through smoother 0 even when a different identity takes over the
//! slot. Smoothers are created lazily the first time a slot is used and are
//! dropped (never reused) on `reset`.

use mogcam_models::{Detection, SmoothedDetection};
use tracing::{debug, warn};

use crate::config::PipelineConfig;
use crate::error::VisionResult;
use crate::smoother::BoxSmoother;
use crate::tracker::FaceTracker;

/// Stable, smoothed, slot-ordered face output for the renderer.
pub struct DetectionPipeline {
    config: PipelineConfig,
    tracker: FaceTracker,
    smoothers: Vec<BoxSmoother>,
    last_output: Vec<SmoothedDetection>,
}

impl DetectionPipeline {
    /// Create a new pipeline after validating the configuration.
    pub fn new(config: PipelineConfig) -> VisionResult<Self> {
        config.validate()?;
        Ok(Self {
            tracker: FaceTracker::new(config.tracker),
            config,
            smoothers: Vec::new(),
            last_output: Vec::new(),
        })
    }

    /// Create a pipeline with default parameters.
    pub fn with_defaults() -> Self {
        let config = PipelineConfig::default();
        Self {
            tracker: FaceTracker::new(config.tracker),
            config,
            smoothers: Vec::new(),
            last_output: Vec::new(),
        }
    }

    /// Process one frame of raw detections.
    pub fn process(&mut self, raw: &[Detection]) -> Vec<SmoothedDetection> {
        let invalid = raw.iter().filter(|d| !d.bbox.is_valid()).count();
        if invalid > 0 {
            warn!(invalid, "Dropping detections with invalid boxes");
        }
        let valid: Vec<Detection> = raw.iter().copied().filter(|d| d.bbox.is_valid()).collect();

        let faces = self.tracker.update_faces(&valid);

        let output: Vec<SmoothedDetection> = faces
            .iter()
            .enumerate()
            .map(|(slot, face)| {
                let smoother = self.smoother_for_slot(slot);
                SmoothedDetection {
                    slot,
                    track_id: face.track_id,
                    bbox: smoother.smooth(face.detection.bbox),
                    is_smiling: face.detection.is_smiling,
                }
            })
            .collect();

        debug!(
            raw = raw.len(),
            tracked = self.tracker.tracked_count(),
            output = output.len(),
            "Processed frame"
        );

        self.last_output = output.clone();
        output
    }

    /// Detector failed for this frame: keep the previous output untouched.
    ///
    /// The tracker is not aged and no smoother is fed, so a transient
    /// failure neither evicts faces nor moves boxes.
    pub fn skip_frame(&self) -> Vec<SmoothedDetection> {
        self.last_output.clone()
    }

    /// Output of the most recent successful frame.
    pub fn last_output(&self) -> &[SmoothedDetection] {
        &self.last_output
    }

    /// Clear tracking state and discard every smoother.
    pub fn reset(&mut self) {
        self.tracker.reset();
        self.smoothers.clear();
        self.last_output.clear();
    }

    /// Number of smoother slots created so far.
    pub fn smoother_count(&self) -> usize {
        self.smoothers.len()
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    fn smoother_for_slot(&mut self, slot: usize) -> &mut BoxSmoother {
        while self.smoothers.len() <= slot {
            self.smoothers.push(BoxSmoother::new(self.config.smoother));
        }
        &mut self.smoothers[slot]
    }
}
