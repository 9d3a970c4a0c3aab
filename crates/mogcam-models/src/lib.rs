//! Shared data models for the mogcam engine.
//!
//! This crate provides Serde-serializable types for:
//! - Face boxes and per-frame detections
//! - Tracked identities and smoothed, slot-ordered output
//! - Timeline steps, state snapshots and observer events
//! - Detection modes, per-face verdicts and overlay styles

pub mod detection;
pub mod geometry;
pub mod timeline;
pub mod verdict;

// Re-export common types
pub use detection::{Detection, ExpressionStatus, SmoothedDetection, TrackedFace};
pub use geometry::BoundingBox;
pub use timeline::{TimelineEvent, TimelineState, TimelineStep, TimelineStepParseError};
pub use verdict::{DetectionMode, DetectionModeParseError, FaceVerdict, OverlayStyle};
