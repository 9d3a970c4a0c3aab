//! Per-slot verdicts and overlay selection.
//!
//! Verdicts are assigned once per scan, when the timeline leaves
//! `Scanning`. Solo mode shows the cycle's locked-in outcome; duo mode
//! always has exactly one mogging slot.

use mogcam_models::{DetectionMode, FaceVerdict, OverlayStyle, TimelineStep};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::debug;

/// Verdict for each of the two face slots.
pub struct VerdictBoard {
    mode: DetectionMode,
    verdicts: [FaceVerdict; 2],
    rng: StdRng,
}

impl VerdictBoard {
    pub fn new(mode: DetectionMode) -> Self {
        Self::with_rng(mode, StdRng::from_rng(&mut rand::rng()))
    }

    pub fn with_rng(mode: DetectionMode, rng: StdRng) -> Self {
        Self {
            mode,
            verdicts: [FaceVerdict::Calculating; 2],
            rng,
        }
    }

    /// Assign verdicts at the end of a scan.
    ///
    /// # Returns
    /// The new verdicts, or `None` when the face count does not fit the
    /// mode (solo needs exactly one face, duo at least two).
    pub fn assign(&mut self, face_count: usize, will_be_mogging: bool) -> Option<[FaceVerdict; 2]> {
        match self.mode {
            DetectionMode::Solo => {
                if face_count != 1 {
                    debug!(face_count, "Solo verdict needs exactly one face");
                    return None;
                }
                self.verdicts[0] = if will_be_mogging {
                    FaceVerdict::Mogging
                } else {
                    FaceVerdict::Mogged
                };
            }
            DetectionMode::Duo => {
                if face_count < 2 {
                    debug!(face_count, "Duo verdict needs two faces");
                    return None;
                }
                let first_mogs = if self.verdicts[0] == FaceVerdict::Calculating {
                    false
                } else {
                    self.rng.random_bool(0.5)
                };
                self.verdicts = if first_mogs {
                    [FaceVerdict::Mogging, FaceVerdict::Mogged]
                } else {
                    [FaceVerdict::Mogged, FaceVerdict::Mogging]
                };
            }
        }
        Some(self.verdicts)
    }

    /// Return both slots to `Calculating`.
    pub fn reset(&mut self) {
        self.verdicts = [FaceVerdict::Calculating; 2];
    }

    pub fn verdicts(&self) -> [FaceVerdict; 2] {
        self.verdicts
    }

    pub fn mode(&self) -> DetectionMode {
        self.mode
    }
}

/// Overlay to draw around the face in `slot`, or `None` to draw nothing.
pub fn select_overlay(
    mode: DetectionMode,
    face_count: usize,
    slot: usize,
    verdicts: &[FaceVerdict; 2],
    step: TimelineStep,
) -> Option<OverlayStyle> {
    if slot >= face_count || slot >= mode.slots() {
        return None;
    }

    match mode {
        DetectionMode::Solo => {
            if step == TimelineStep::Scanning {
                Some(OverlayStyle::Spotlight)
            } else {
                Some(verdicts[0].into())
            }
        }
        DetectionMode::Duo => {
            if face_count == 1 {
                Some(OverlayStyle::Waiting)
            } else {
                Some(verdicts[slot].into())
            }
        }
    }
}
