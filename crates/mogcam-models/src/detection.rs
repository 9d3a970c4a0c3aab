//! Per-frame detections and their tracked, smoothed counterparts.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::geometry::BoundingBox;

/// A single face reported by the external detector for one frame.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize, JsonSchema)]
pub struct Detection {
    /// Face box in source-frame pixels
    pub bbox: BoundingBox,
    /// Expression flag when the detector computes one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_smiling: Option<bool>,
}

impl Detection {
    /// Create a detection without expression data.
    pub fn new(bbox: BoundingBox) -> Self {
        Self {
            bbox,
            is_smiling: None,
        }
    }

    /// Create a detection with an expression flag.
    pub fn with_expression(bbox: BoundingBox, is_smiling: bool) -> Self {
        Self {
            bbox,
            is_smiling: Some(is_smiling),
        }
    }
}

/// A detection lineage with a stable identity across frames.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct TrackedFace {
    /// Stable identity, never reused
    pub track_id: u32,
    /// Most recent detection matched to this identity
    pub detection: Detection,
    /// Frames elapsed since the last matching detection
    pub frames_since_seen: u32,
    /// Match confidence in [0, 1]; grows while seen, never decays
    pub confidence: f64,
}

impl TrackedFace {
    /// Current (raw, unsmoothed) box.
    #[inline]
    pub fn bbox(&self) -> &BoundingBox {
        &self.detection.bbox
    }
}

/// Final per-slot output handed to the renderer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct SmoothedDetection {
    /// Output slot (0 or 1), index into the tracker's ranked output
    pub slot: usize,
    /// Identity currently occupying the slot
    pub track_id: u32,
    /// Smoothed box
    pub bbox: BoundingBox,
    /// Expression flag passed through from the raw detection
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_smiling: Option<bool>,
}

/// Aggregate expression over all visible faces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema, Default)]
#[serde(rename_all = "snake_case")]
pub enum ExpressionStatus {
    #[default]
    NoFaces,
    Smiling,
    NotSmiling,
}

impl ExpressionStatus {
    /// Summarise a smoothed detection list.
    pub fn from_detections(detections: &[SmoothedDetection]) -> Self {
        if detections.is_empty() {
            ExpressionStatus::NoFaces
        } else if detections.iter().any(|d| d.is_smiling == Some(true)) {
            ExpressionStatus::Smiling
        } else {
            ExpressionStatus::NotSmiling
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ExpressionStatus::NoFaces => "no_faces",
            ExpressionStatus::Smiling => "smiling",
            ExpressionStatus::NotSmiling => "not_smiling",
        }
    }
}
