//! Cooperative per-frame detection loop.
//!
//! One tick per frame interval. Each tick pulls a frame, awaits the detector
//! and feeds the pipeline before the next tick is scheduled, so frames never
//! overlap. Results are published on a `watch` channel; face-count changes go
//! out on an unbounded `mpsc` channel for the timeline driver.

use mogcam_models::{ExpressionStatus, SmoothedDetection};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::{mpsc, watch};
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, error, info, warn};

use crate::config::FrameLoopConfig;
use crate::detector::{FaceDetector, Frame, FrameSource};
use crate::metrics;
use crate::pipeline::DetectionPipeline;

/// Renderer-facing result of one frame.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct FrameOutput {
    pub frame_index: u64,
    pub detections: Vec<SmoothedDetection>,
    pub expression: ExpressionStatus,
}

impl FrameOutput {
    pub fn face_count(&self) -> usize {
        self.detections.len()
    }
}

/// Drives `DetectionPipeline` from a frame source and a detector.
pub struct FrameLoop {
    config: FrameLoopConfig,
    pipeline: DetectionPipeline,
    source: Box<dyn FrameSource>,
    detector: Arc<dyn FaceDetector>,
    output_tx: watch::Sender<FrameOutput>,
    presence_tx: Option<mpsc::UnboundedSender<usize>>,
    last_presence: usize,
}

impl FrameLoop {
    pub fn new(
        config: FrameLoopConfig,
        pipeline: DetectionPipeline,
        source: Box<dyn FrameSource>,
        detector: Arc<dyn FaceDetector>,
    ) -> Self {
        let (output_tx, _) = watch::channel(FrameOutput::default());
        Self {
            config,
            pipeline,
            source,
            detector,
            output_tx,
            presence_tx: None,
            last_presence: 0,
        }
    }

    /// Subscribe to per-frame output.
    pub fn subscribe(&self) -> watch::Receiver<FrameOutput> {
        self.output_tx.subscribe()
    }

    /// Channel receiving the face count each time it changes.
    ///
    /// Calling this again replaces the previous receiver.
    pub fn presence_channel(&mut self) -> mpsc::UnboundedReceiver<usize> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.presence_tx = Some(tx);
        rx
    }

    /// Run until shutdown, source exhaustion or `max_frames`.
    ///
    /// # Returns
    /// Number of frames ticked (successful and skipped).
    pub async fn run(mut self, mut shutdown: watch::Receiver<bool>) -> u64 {
        let mut ticker = interval(self.config.frame_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        let detector_name = self.detector.name();
        info!(
            detector = detector_name,
            interval_ms = self.config.frame_interval.as_millis() as u64,
            "Frame loop started"
        );

        let mut frames: u64 = 0;
        loop {
            if *shutdown.borrow() {
                break;
            }
            if self.config.max_frames.is_some_and(|max| frames >= max) {
                debug!(frames, "Frame limit reached");
                break;
            }

            tokio::select! {
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        info!("Frame loop received shutdown signal");
                        break;
                    }
                }
                _ = ticker.tick() => {
                    let Some(frame) = self.source.next_frame().await else {
                        info!(frames, "Frame source exhausted");
                        break;
                    };
                    self.tick(frame).await;
                    frames += 1;
                }
            }
        }

        self.pipeline.reset();
        self.source.close().await;
        self.emit_presence(0);

        info!(frames, "Frame loop stopped");
        frames
    }

    async fn tick(&mut self, frame: Frame) {
        let name = self.detector.name();
        let detections = match self.detector.detect_faces(&frame).await {
            Ok(raw) => {
                metrics::record_frame_processed(name);
                self.pipeline.process(&raw)
            }
            Err(e) => {
                metrics::record_detector_failure(name);
                if e.is_recoverable() {
                    warn!(frame = frame.index, detector = name, error = %e, "Detection failed, keeping previous output");
                } else {
                    error!(frame = frame.index, detector = name, error = %e, "Detector error, keeping previous output");
                }
                self.pipeline.skip_frame()
            }
        };

        let count = detections.len();
        let expression = ExpressionStatus::from_detections(&detections);
        self.output_tx.send_replace(FrameOutput {
            frame_index: frame.index,
            detections,
            expression,
        });
        self.emit_presence(count);
    }

    fn emit_presence(&mut self, count: usize) {
        if count == self.last_presence {
            return;
        }
        debug!(from = self.last_presence, to = count, "Face presence changed");
        self.last_presence = count;
        if let Some(tx) = &self.presence_tx {
            // Receiver gone means nobody drives a timeline; keep running.
            let _ = tx.send(count);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detector::{BlankFrameSource, ScriptedDetector, ScriptedFrame};
    use mogcam_models::{BoundingBox, Detection};
    use std::time::Duration;

    fn face(x: f64) -> Detection {
        Detection::new(BoundingBox::new(x, 100.0, 60.0, 60.0))
    }

    fn frame_loop(script: Vec<ScriptedFrame>, frames: u64) -> FrameLoop {
        FrameLoop::new(
            FrameLoopConfig {
                frame_interval: Duration::from_millis(33),
                max_frames: None,
            },
            DetectionPipeline::with_defaults(),
            Box::new(BlankFrameSource::new(640, 480).with_limit(frames)),
            Arc::new(ScriptedDetector::new(script)),
        )
    }

    fn drain(rx: &mut mpsc::UnboundedReceiver<usize>) -> Vec<usize> {
        let mut seen = Vec::new();
        while let Ok(count) = rx.try_recv() {
            seen.push(count);
        }
        seen
    }

    #[tokio::test(start_paused = true)]
    async fn test_runs_until_source_exhausted() {
        let fl = frame_loop(vec![ScriptedFrame::Faces(vec![face(100.0)])], 5);
        let output = fl.subscribe();
        let (_tx, shutdown) = watch::channel(false);

        let frames = fl.run(shutdown).await;
        assert_eq!(frames, 5);

        let last = output.borrow().clone();
        assert_eq!(last.frame_index, 4);
        assert_eq!(last.face_count(), 1);
        assert_eq!(last.expression, ExpressionStatus::NotSmiling);
    }

    #[tokio::test(start_paused = true)]
    async fn test_detector_failure_keeps_previous_output() {
        let fl = frame_loop(
            vec![
                ScriptedFrame::Faces(vec![face(100.0)]),
                ScriptedFrame::Failure("timeout".into()),
            ],
            4,
        );
        let output = fl.subscribe();
        let (_tx, shutdown) = watch::channel(false);

        // Every frame after the first fails; the loop keeps ticking
        assert_eq!(fl.run(shutdown).await, 4);

        let last = output.borrow().clone();
        assert_eq!(last.frame_index, 3);
        assert_eq!(last.detections.len(), 1);
        assert_eq!(last.detections[0].bbox, BoundingBox::new(100.0, 100.0, 60.0, 60.0));
    }

    #[tokio::test(start_paused = true)]
    async fn test_presence_emitted_on_change_only() {
        let mut fl = frame_loop(
            vec![
                ScriptedFrame::Faces(vec![]),
                ScriptedFrame::Faces(vec![face(100.0)]),
                ScriptedFrame::Faces(vec![face(100.0)]),
                ScriptedFrame::Failure("blip".into()),
                ScriptedFrame::Faces(vec![face(100.0), face(400.0)]),
            ],
            5,
        );
        let mut presence = fl.presence_channel();
        let (_tx, shutdown) = watch::channel(false);

        fl.run(shutdown).await;

        // 1 face, 2 faces, then back to 0 when the loop stops
        assert_eq!(drain(&mut presence), vec![1, 2, 0]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_max_frames() {
        let mut fl = frame_loop(vec![ScriptedFrame::Faces(vec![face(0.0)])], 100);
        fl.config.max_frames = Some(3);
        let (_tx, shutdown) = watch::channel(false);
        assert_eq!(fl.run(shutdown).await, 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_signal_stops_loop() {
        let fl = FrameLoop::new(
            FrameLoopConfig::default(),
            DetectionPipeline::with_defaults(),
            Box::new(BlankFrameSource::new(640, 480)),
            Arc::new(ScriptedDetector::constant(vec![face(50.0)])),
        );
        let output = fl.subscribe();
        let (tx, shutdown) = watch::channel(false);

        let handle = tokio::spawn(fl.run(shutdown));
        tokio::time::sleep(Duration::from_millis(500)).await;
        tx.send(true).unwrap();

        let frames = handle.await.unwrap();
        assert!(frames > 0);
        assert_eq!(output.borrow().face_count(), 1);
    }
}
