//! Synthetic detector for headless runs.
//!
//! Places up to two faces side by side and adds uniform jitter to every
//! box, so the tracker and smoother see realistic detector noise without a
//! camera. Faces enter and leave at configured frames, which drives the
//! timeline's presence transitions.

use async_trait::async_trait;
use mogcam_models::{BoundingBox, Detection};
use mogcam_vision::{FaceDetector, Frame, VisionError, VisionResult};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::Mutex;

/// Synthetic scene parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationConfig {
    /// Faces in the scene, at most 2 (default: 1)
    pub faces: usize,
    /// Maximum per-field jitter in pixels (default: 1.5)
    pub jitter_px: f64,
    /// Probability that a frame's detection fails (default: 0.0)
    pub failure_rate: f64,
    /// First frame with faces present (default: 0)
    pub enter_frame: u64,
    /// First frame after the faces have left; `None` keeps them forever
    pub leave_frame: Option<u64>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            faces: 1,
            jitter_px: 1.5,
            failure_rate: 0.0,
            enter_frame: 0,
            leave_frame: None,
        }
    }
}

impl SimulationConfig {
    pub fn validate(&self) -> VisionResult<()> {
        if self.faces > 2 {
            return Err(VisionError::invalid_config("simulation supports at most 2 faces"));
        }
        if !(0.0..=1.0).contains(&self.failure_rate) {
            return Err(VisionError::invalid_config("failure_rate must be in [0, 1]"));
        }
        if self.jitter_px < 0.0 || !self.jitter_px.is_finite() {
            return Err(VisionError::invalid_config("jitter_px must be a finite value >= 0"));
        }
        Ok(())
    }

    fn faces_at(&self, frame: u64) -> usize {
        let entered = frame >= self.enter_frame;
        let left = self.leave_frame.is_some_and(|leave| frame >= leave);
        if entered && !left {
            self.faces
        } else {
            0
        }
    }
}

struct SceneState {
    rng: StdRng,
    smiling: [bool; 2],
}

/// Detector that synthesizes jittered face boxes.
pub struct SimulatedDetector {
    config: SimulationConfig,
    state: Mutex<SceneState>,
}

impl SimulatedDetector {
    pub fn new(config: SimulationConfig, seed: Option<u64>) -> VisionResult<Self> {
        config.validate()?;
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_rng(&mut rand::rng()),
        };
        Ok(Self {
            config,
            state: Mutex::new(SceneState {
                rng,
                smiling: [false; 2],
            }),
        })
    }

    /// Un-jittered box for a face slot in a frame of the given size.
    fn anchor(slot: usize, faces: usize, width: u32, height: u32) -> BoundingBox {
        let (w, h) = (f64::from(width), f64::from(height));
        let size = h / 4.0;
        let cx = w * (slot as f64 + 1.0) / (faces as f64 + 1.0);
        let cy = h / 2.0;
        BoundingBox::new(cx - size / 2.0, cy - size / 2.0, size, size)
    }
}

#[async_trait]
impl FaceDetector for SimulatedDetector {
    async fn detect_faces(&self, frame: &Frame) -> VisionResult<Vec<Detection>> {
        let mut state = self
            .state
            .lock()
            .map_err(|_| VisionError::internal("simulation state poisoned"))?;

        if self.config.failure_rate > 0.0 && state.rng.random_bool(self.config.failure_rate) {
            return Err(VisionError::detection_failed(format!(
                "simulated failure on frame {}",
                frame.index
            )));
        }

        let faces = self.config.faces_at(frame.index);
        let jitter = self.config.jitter_px;
        let mut detections = Vec::with_capacity(faces);

        for slot in 0..faces {
            let anchor = Self::anchor(slot, faces, frame.width, frame.height);
            let mut offset = || {
                if jitter > 0.0 {
                    state.rng.random_range(-jitter..=jitter)
                } else {
                    0.0
                }
            };
            let bbox = BoundingBox::new(
                anchor.x + offset(),
                anchor.y + offset(),
                anchor.width + offset(),
                anchor.height + offset(),
            );

            // Expressions change rarely
            if state.rng.random_bool(0.02) {
                state.smiling[slot] = !state.smiling[slot];
            }
            detections.push(Detection::with_expression(bbox, state.smiling[slot]));
        }

        Ok(detections)
    }

    fn name(&self) -> &'static str {
        "simulated"
    }
}
