//! Engine: one frame loop and one timeline driver per session.
//!
//! Face-count changes from the frame loop are bridged into the driver's
//! presence signal. Shutdown goes through a `watch` channel shared by every
//! session the engine starts.

use mogcam_models::{DetectionMode, FaceVerdict, OverlayStyle, TimelineState};
use mogcam_timeline::{select_overlay, DriverHandle, Timeline, TimelineDriver, VerdictBoard};
use mogcam_vision::{DetectionPipeline, FaceDetector, FrameLoop, FrameOutput, FrameSource};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{info, warn, Instrument};

use crate::config::EngineConfig;
use crate::error::{WorkerError, WorkerResult};
use crate::logging::{EventLogger, SessionSummary};
use crate::metrics;

/// Outcome of a finished session.
#[derive(Debug, Clone, Serialize)]
pub struct EngineReport {
    pub session_id: String,
    /// Frames ticked, including skipped ones
    pub frames: u64,
    pub final_state: TimelineState,
    pub summary: SessionSummary,
}

/// Headless mogcam engine.
pub struct Engine {
    config: EngineConfig,
    shutdown: watch::Sender<bool>,
}

impl Engine {
    pub fn new(config: EngineConfig) -> WorkerResult<Self> {
        config.validate()?;
        let (shutdown, _) = watch::channel(false);
        Ok(Self { config, shutdown })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Start a session and return immediately.
    pub fn start(
        &self,
        source: Box<dyn FrameSource>,
        detector: Arc<dyn FaceDetector>,
    ) -> WorkerResult<EngineSession> {
        let config = &self.config;
        let logger = EventLogger::new(config.mode);

        let pipeline = DetectionPipeline::new(config.pipeline)?;
        let mut frame_loop = FrameLoop::new(config.frame_loop.clone(), pipeline, source, detector);
        let frames = frame_loop.subscribe();
        let mut presence = frame_loop.presence_channel();

        let (timeline, board) = match config.rng_seed {
            Some(seed) => (
                Timeline::with_rng(config.timeline, StdRng::seed_from_u64(seed))?,
                VerdictBoard::with_rng(config.mode, StdRng::seed_from_u64(seed.wrapping_add(1))),
            ),
            None => (Timeline::new(config.timeline)?, VerdictBoard::new(config.mode)),
        };
        let (driver, timeline_handle) = TimelineDriver::new(timeline, board);

        let span = logger.create_span();
        logger.log_start("engine session");
        metrics::record_session_started(config.mode);

        let (stop_logger, stop_logger_rx) = watch::channel(false);
        let events = timeline_handle.subscribe();
        let event_logger = logger.clone();
        let logger_task = tokio::spawn(
            async move { event_logger.run(events, stop_logger_rx).await }.instrument(span.clone()),
        );

        let driver_task = tokio::spawn(driver.run().instrument(span.clone()));

        let bridge_handle = timeline_handle.clone();
        let bridge_task = tokio::spawn(async move {
            while let Some(count) = presence.recv().await {
                if bridge_handle.presence_changed(count).is_err() {
                    warn!("Timeline driver gone, dropping presence updates");
                    break;
                }
            }
        });

        let shutdown_rx = self.shutdown.subscribe();
        let driver_control = timeline_handle.clone();
        let task = tokio::spawn(
            async move {
                let frames = frame_loop.run(shutdown_rx).await;

                // The frame loop is gone, so the bridge drains and ends
                bridge_task.await?;

                if driver_control.shutdown().is_err() {
                    warn!("Timeline driver already stopped");
                }
                driver_task.await??;
                let final_state = driver_control.state().borrow().clone();

                let _ = stop_logger.send(true);
                let summary = logger_task.await?;
                logger.log_completion(&summary);
                metrics::record_session_completed(logger.mode(), &summary);

                Ok::<_, WorkerError>(EngineReport {
                    session_id: logger.session_id().to_string(),
                    frames,
                    final_state,
                    summary,
                })
            }
            .instrument(span),
        );

        Ok(EngineSession {
            mode: config.mode,
            frames,
            timeline: timeline_handle,
            task,
        })
    }

    /// Start a session and wait for it to finish.
    pub async fn run(
        &self,
        source: Box<dyn FrameSource>,
        detector: Arc<dyn FaceDetector>,
    ) -> WorkerResult<EngineReport> {
        self.start(source, detector)?.wait().await
    }

    /// Signal shutdown to every running session.
    pub fn shutdown(&self) {
        info!("Engine shutdown requested");
        let _ = self.shutdown.send(true);
    }
}

/// A running engine session.
pub struct EngineSession {
    mode: DetectionMode,
    frames: watch::Receiver<FrameOutput>,
    timeline: DriverHandle,
    task: JoinHandle<WorkerResult<EngineReport>>,
}

impl EngineSession {
    /// Latest frame output.
    pub fn frame(&self) -> FrameOutput {
        self.frames.borrow().clone()
    }

    /// Subscribe to frame outputs.
    pub fn frames(&self) -> watch::Receiver<FrameOutput> {
        self.frames.clone()
    }

    /// Handle to the session's timeline driver.
    pub fn timeline(&self) -> &DriverHandle {
        &self.timeline
    }

    pub fn timeline_state(&self) -> TimelineState {
        self.timeline.state().borrow().clone()
    }

    pub fn verdicts(&self) -> [FaceVerdict; 2] {
        *self.timeline.verdicts().borrow()
    }

    /// Overlay for every rendered slot of the latest frame.
    pub fn overlays(&self) -> Vec<(usize, OverlayStyle)> {
        let frame = self.frame();
        let verdicts = self.verdicts();
        let step = self.timeline_state().current_step;

        (0..self.mode.slots())
            .filter_map(|slot| {
                select_overlay(self.mode, frame.face_count(), slot, &verdicts, step)
                    .map(|style| (slot, style))
            })
            .collect()
    }

    /// Wait for the session to end.
    pub async fn wait(self) -> WorkerResult<EngineReport> {
        self.task.await?
    }
}
