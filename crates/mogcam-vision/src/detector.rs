//! Async seams for the camera and the external face detector.
//!
//! The engine never looks at pixels itself: a `FrameSource` yields frames and
//! a `FaceDetector` turns each one into raw boxes. Both are traits so the
//! headless runner and tests can plug in synthetic implementations.

use async_trait::async_trait;
use mogcam_models::Detection;
use std::sync::Arc;

use crate::error::{VisionError, VisionResult};

/// One captured video frame.
#[derive(Debug, Clone)]
pub struct Frame {
    /// Monotonic frame counter assigned by the source
    pub index: u64,
    pub width: u32,
    pub height: u32,
    /// Raw pixel payload; layout is agreed between source and detector
    pub data: Arc<[u8]>,
}

impl Frame {
    pub fn new(index: u64, width: u32, height: u32, data: impl Into<Arc<[u8]>>) -> Self {
        Self {
            index,
            width,
            height,
            data: data.into(),
        }
    }

    /// A frame without pixel data, for detectors that do not read pixels.
    pub fn empty(index: u64, width: u32, height: u32) -> Self {
        Self::new(index, width, height, Vec::new())
    }
}

/// External face detector.
#[async_trait]
pub trait FaceDetector: Send + Sync {
    /// Detect faces in a single frame.
    ///
    /// # Returns
    /// Raw, unordered detections in frame pixel space. An error skips the
    /// frame; it never stops the loop.
    async fn detect_faces(&self, frame: &Frame) -> VisionResult<Vec<Detection>>;

    /// Detector name for logging and metric labels.
    fn name(&self) -> &'static str;
}

/// Producer of camera frames.
#[async_trait]
pub trait FrameSource: Send {
    /// Next frame, or `None` once the source is exhausted or closed.
    async fn next_frame(&mut self) -> Option<Frame>;

    /// Release the underlying device.
    async fn close(&mut self);
}

/// Source of empty frames at a fixed resolution.
pub struct BlankFrameSource {
    width: u32,
    height: u32,
    limit: Option<u64>,
    next_index: u64,
    closed: bool,
}

impl BlankFrameSource {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            limit: None,
            next_index: 0,
            closed: false,
        }
    }

    /// Stop after `limit` frames.
    pub fn with_limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }
}

#[async_trait]
impl FrameSource for BlankFrameSource {
    async fn next_frame(&mut self) -> Option<Frame> {
        if self.closed || self.limit.is_some_and(|limit| self.next_index >= limit) {
            return None;
        }
        let frame = Frame::empty(self.next_index, self.width, self.height);
        self.next_index += 1;
        Some(frame)
    }

    async fn close(&mut self) {
        self.closed = true;
    }
}

/// Outcome of one scripted frame.
#[derive(Debug, Clone, PartialEq)]
pub enum ScriptedFrame {
    Faces(Vec<Detection>),
    Failure(String),
}

/// Detector that replays a fixed per-frame script, keyed by frame index.
///
/// Frames past the end of the script replay the last entry; an empty
/// script sees no faces.
pub struct ScriptedDetector {
    script: Vec<ScriptedFrame>,
}

impl ScriptedDetector {
    pub fn new(script: Vec<ScriptedFrame>) -> Self {
        Self { script }
    }

    /// Same detections on every frame.
    pub fn constant(detections: Vec<Detection>) -> Self {
        Self::new(vec![ScriptedFrame::Faces(detections)])
    }

    pub fn len(&self) -> usize {
        self.script.len()
    }

    pub fn is_empty(&self) -> bool {
        self.script.is_empty()
    }
}

#[async_trait]
impl FaceDetector for ScriptedDetector {
    async fn detect_faces(&self, frame: &Frame) -> VisionResult<Vec<Detection>> {
        let idx = usize::try_from(frame.index).unwrap_or(usize::MAX);
        match self.script.get(idx).or(self.script.last()) {
            Some(ScriptedFrame::Faces(detections)) => Ok(detections.clone()),
            Some(ScriptedFrame::Failure(message)) => Err(VisionError::detection_failed(message.clone())),
            None => Ok(Vec::new()),
        }
    }

    fn name(&self) -> &'static str {
        "scripted"
    }
}
