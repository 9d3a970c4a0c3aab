//! Face tracking and smoothing engine.
//!
//! This crate provides:
//! - Exponential box smoothing with a dead-zone (`BoxSmoother`)
//! - Greedy identity association across frames (`FaceTracker`)
//! - Slot-ordered smoothed output (`DetectionPipeline`)
//! - Async detector and frame-source seams
//! - A cooperative, non-overlapping per-frame loop (`FrameLoop`)

pub mod config;
pub mod detector;
pub mod error;
pub mod frame_loop;
pub mod metrics;
pub mod pipeline;
pub mod smoother;
pub mod tracker;

pub use config::{FrameLoopConfig, PipelineConfig, SmootherConfig, TrackerConfig};
pub use detector::{BlankFrameSource, FaceDetector, Frame, FrameSource, ScriptedDetector, ScriptedFrame};
pub use error::{VisionError, VisionResult};
pub use frame_loop::{FrameLoop, FrameOutput};
pub use pipeline::DetectionPipeline;
pub use smoother::BoxSmoother;
pub use tracker::FaceTracker;
