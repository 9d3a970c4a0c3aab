//! Configuration for the tracking and smoothing pipeline.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::{VisionError, VisionResult};

/// Box smoothing parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SmootherConfig {
    /// Weight kept from the previous box, 0.0 = no smoothing (default: 0.7)
    pub smoothing_factor: f64,

    /// Per-field pixel delta below which input is treated as jitter (default: 2.0)
    pub minimum_movement: f64,
}

impl Default for SmootherConfig {
    fn default() -> Self {
        Self {
            smoothing_factor: 0.7,
            minimum_movement: 2.0,
        }
    }
}

impl SmootherConfig {
    pub fn validate(&self) -> VisionResult<()> {
        if !(0.0..=1.0).contains(&self.smoothing_factor) {
            return Err(VisionError::invalid_config(format!(
                "smoothing_factor must be in [0, 1], got {}",
                self.smoothing_factor
            )));
        }
        if self.minimum_movement.is_nan() || self.minimum_movement < 0.0 {
            return Err(VisionError::invalid_config(format!(
                "minimum_movement must be >= 0, got {}",
                self.minimum_movement
            )));
        }
        Ok(())
    }
}

/// Identity association parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackerConfig {
    /// Center distance (pixels) beyond which a detection never matches (default: 100.0)
    pub max_distance: f64,

    /// Unseen frames before a face is evicted (default: 30)
    pub max_age: u32,

    /// Faces returned per frame (default: 2)
    pub max_faces: usize,

    /// Score bonus per unit of overlap ratio (default: 50.0)
    pub overlap_weight: f64,

    /// Confidence given to a new identity (default: 0.5)
    pub initial_confidence: f64,

    /// Confidence added on every match, capped at 1.0 (default: 0.1)
    pub confidence_step: f64,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            max_distance: 100.0,
            max_age: 30,
            max_faces: 2,
            overlap_weight: 50.0,
            initial_confidence: 0.5,
            confidence_step: 0.1,
        }
    }
}

impl TrackerConfig {
    pub fn validate(&self) -> VisionResult<()> {
        if self.max_distance.is_nan() || self.max_distance <= 0.0 {
            return Err(VisionError::invalid_config("max_distance must be > 0"));
        }
        if self.max_age == 0 {
            return Err(VisionError::invalid_config("max_age must be >= 1"));
        }
        if self.max_faces == 0 {
            return Err(VisionError::invalid_config("max_faces must be >= 1"));
        }
        if !(0.0..=1.0).contains(&self.initial_confidence) {
            return Err(VisionError::invalid_config(
                "initial_confidence must be in [0, 1]",
            ));
        }
        if !(0.0..=1.0).contains(&self.confidence_step) {
            return Err(VisionError::invalid_config(format!(
                "confidence_step must be in [0, 1], got {}",
                self.confidence_step
            )));
        }
        if !self.overlap_weight.is_finite() || self.overlap_weight < 0.0 {
            return Err(VisionError::invalid_config(format!(
                "overlap_weight must be a finite value >= 0, got {}",
                self.overlap_weight
            )));
        }
        Ok(())
    }
}

/// Combined pipeline configuration.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub smoother: SmootherConfig,
    pub tracker: TrackerConfig,
}

impl PipelineConfig {
    pub fn validate(&self) -> VisionResult<()> {
        self.smoother.validate()?;
        self.tracker.validate()
    }
}

/// Scheduling of the per-frame loop.
#[derive(Debug, Clone)]
pub struct FrameLoopConfig {
    /// Interval between frame ticks (default: ~30 fps)
    pub frame_interval: Duration,

    /// Stop after this many frames; `None` runs until shutdown or source exhaustion
    pub max_frames: Option<u64>,
}

impl Default for FrameLoopConfig {
    fn default() -> Self {
        Self {
            frame_interval: Duration::from_millis(33),
            max_frames: None,
        }
    }
}
