//! Jitter suppression for face boxes.
//!
//! Each output slot owns one `BoxSmoother`: a single-pole IIR filter per
//! field with a dead-zone. Inputs that move less than `minimum_movement` on
//! every field are ignored outright, so a still face does not slowly drift
//! toward detector noise.

use mogcam_models::BoundingBox;

use crate::config::SmootherConfig;

/// Exponential moving-average smoother with a minimum-movement dead-zone.
#[derive(Debug, Clone)]
pub struct BoxSmoother {
    config: SmootherConfig,
    previous: Option<BoundingBox>,
}

impl BoxSmoother {
    /// Create a new smoother. The config is expected to be validated.
    pub fn new(config: SmootherConfig) -> Self {
        Self {
            config,
            previous: None,
        }
    }

    /// Feed one raw box and return the smoothed box.
    pub fn smooth(&mut self, new_box: BoundingBox) -> BoundingBox {
        let Some(previous) = self.previous else {
            self.previous = Some(new_box);
            return new_box;
        };

        if previous.max_delta(&new_box) < self.config.minimum_movement {
            return previous;
        }

        let keep = self.config.smoothing_factor;
        let take = 1.0 - keep;
        let blended = BoundingBox {
            x: previous.x * keep + new_box.x * take,
            y: previous.y * keep + new_box.y * take,
            width: previous.width * keep + new_box.width * take,
            height: previous.height * keep + new_box.height * take,
        };

        self.previous = Some(blended);
        blended
    }

    /// Forget history; the next sample is a cold start.
    pub fn reset(&mut self) {
        self.previous = None;
    }

    /// Last stored box, if any.
    pub fn previous(&self) -> Option<BoundingBox> {
        self.previous
    }
}
