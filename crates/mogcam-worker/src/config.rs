//! Engine configuration.

use mogcam_models::{DetectionMode, TimelineStep};
use mogcam_timeline::TimelineConfig;
use mogcam_vision::{FrameLoopConfig, PipelineConfig};
use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

use crate::error::{WorkerError, WorkerResult};
use crate::simulation::SimulationConfig;

/// Engine configuration.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Solo or duo reveal
    pub mode: DetectionMode,
    /// Tracker and smoother parameters
    pub pipeline: PipelineConfig,
    /// Dwell times, auto-advance and lock-in step
    pub timeline: TimelineConfig,
    /// Frame tick interval and optional frame limit
    pub frame_loop: FrameLoopConfig,
    /// Synthetic camera used by the headless binary
    pub simulation: SimulationConfig,
    /// Seed for cycle content, verdicts and the simulation; random when unset
    pub rng_seed: Option<u64>,
    /// Install the Prometheus exporter
    pub metrics_enabled: bool,
    /// Prometheus scrape address
    pub metrics_addr: SocketAddr,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            mode: DetectionMode::Solo,
            pipeline: PipelineConfig::default(),
            timeline: TimelineConfig::default(),
            frame_loop: FrameLoopConfig::default(),
            simulation: SimulationConfig::default(),
            rng_seed: None,
            metrics_enabled: false,
            metrics_addr: SocketAddr::from(([0, 0, 0, 0], 9100)),
        }
    }
}

impl EngineConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Create config from an arbitrary variable lookup.
    ///
    /// Unset or unparsable variables fall back to their defaults.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let mut pipeline = defaults.pipeline;
        pipeline.smoother.smoothing_factor = get(&lookup, "MOGCAM_SMOOTHING_FACTOR")
            .unwrap_or(pipeline.smoother.smoothing_factor);
        pipeline.smoother.minimum_movement = get(&lookup, "MOGCAM_MINIMUM_MOVEMENT")
            .unwrap_or(pipeline.smoother.minimum_movement);
        pipeline.tracker.max_distance =
            get(&lookup, "MOGCAM_MAX_DISTANCE").unwrap_or(pipeline.tracker.max_distance);
        pipeline.tracker.max_age = get(&lookup, "MOGCAM_MAX_AGE").unwrap_or(pipeline.tracker.max_age);

        let mut timeline = defaults.timeline;
        timeline.auto_advance =
            get(&lookup, "MOGCAM_AUTO_ADVANCE").unwrap_or(timeline.auto_advance);
        timeline.lock_in_step = get::<TimelineStep, _>(&lookup, "MOGCAM_LOCK_IN_STEP")
            .unwrap_or(timeline.lock_in_step);
        let timings = &mut timeline.timings;
        timings.waiting_ms = get(&lookup, "MOGCAM_WAITING_MS").unwrap_or(timings.waiting_ms);
        timings.countdown_ms = get(&lookup, "MOGCAM_COUNTDOWN_MS").unwrap_or(timings.countdown_ms);
        timings.scanning_ms = get(&lookup, "MOGCAM_SCANNING_MS").unwrap_or(timings.scanning_ms);
        timings.calculating_ms =
            get(&lookup, "MOGCAM_CALCULATING_MS").unwrap_or(timings.calculating_ms);
        timings.result_display_ms =
            get(&lookup, "MOGCAM_RESULT_DISPLAY_MS").unwrap_or(timings.result_display_ms);
        timings.waiting_for_input_ms =
            get(&lookup, "MOGCAM_WAITING_FOR_INPUT_MS").unwrap_or(timings.waiting_for_input_ms);

        let frame_loop = FrameLoopConfig {
            frame_interval: get(&lookup, "MOGCAM_FRAME_INTERVAL_MS")
                .map(Duration::from_millis)
                .unwrap_or(defaults.frame_loop.frame_interval),
            max_frames: get(&lookup, "MOGCAM_MAX_FRAMES"),
        };

        let mut simulation = defaults.simulation;
        simulation.faces = get(&lookup, "MOGCAM_SIM_FACES").unwrap_or(simulation.faces);
        simulation.jitter_px = get(&lookup, "MOGCAM_SIM_JITTER").unwrap_or(simulation.jitter_px);
        simulation.failure_rate =
            get(&lookup, "MOGCAM_SIM_FAILURE_RATE").unwrap_or(simulation.failure_rate);
        simulation.enter_frame =
            get(&lookup, "MOGCAM_SIM_ENTER_FRAME").unwrap_or(simulation.enter_frame);
        simulation.leave_frame = get(&lookup, "MOGCAM_SIM_LEAVE_FRAME");

        Self {
            mode: get(&lookup, "MOGCAM_MODE").unwrap_or(defaults.mode),
            pipeline,
            timeline,
            frame_loop,
            simulation,
            rng_seed: get(&lookup, "MOGCAM_SEED"),
            metrics_enabled: get(&lookup, "MOGCAM_METRICS_ENABLED").unwrap_or(false),
            metrics_addr: get(&lookup, "MOGCAM_METRICS_ADDR").unwrap_or(defaults.metrics_addr),
        }
    }

    /// Validate every nested section.
    pub fn validate(&self) -> WorkerResult<()> {
        self.pipeline.validate()?;
        self.timeline.validate()?;
        if self.frame_loop.frame_interval.is_zero() {
            return Err(WorkerError::config_error("frame interval must be > 0"));
        }
        self.simulation.validate()?;
        Ok(())
    }
}

/// Parse an optional variable, ignoring values that do not parse.
fn get<T, F>(lookup: &F, key: &str) -> Option<T>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    lookup(key).and_then(|s| s.trim().parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tokio_test::assert_ok;

    fn config_from(vars: &[(&str, &str)]) -> EngineConfig {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        EngineConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults_without_env() {
        let config = config_from(&[]);
        assert_eq!(config.mode, DetectionMode::Solo);
        assert_eq!(config.pipeline, PipelineConfig::default());
        assert_eq!(config.timeline, TimelineConfig::default());
        assert_eq!(config.frame_loop.frame_interval, Duration::from_millis(33));
        assert!(config.frame_loop.max_frames.is_none());
        assert!(!config.metrics_enabled);
        assert_ok!(config.validate());
    }

    #[test]
    fn test_overrides() {
        let config = config_from(&[
            ("MOGCAM_MODE", "duo"),
            ("MOGCAM_SMOOTHING_FACTOR", "0.5"),
            ("MOGCAM_MAX_AGE", "10"),
            ("MOGCAM_LOCK_IN_STEP", "scanning"),
            ("MOGCAM_SCANNING_MS", "1500"),
            ("MOGCAM_FRAME_INTERVAL_MS", "16"),
            ("MOGCAM_MAX_FRAMES", "900"),
            ("MOGCAM_SEED", "42"),
            ("MOGCAM_METRICS_ENABLED", "true"),
            ("MOGCAM_METRICS_ADDR", "127.0.0.1:9999"),
        ]);

        assert_eq!(config.mode, DetectionMode::Duo);
        assert_eq!(config.pipeline.smoother.smoothing_factor, 0.5);
        assert_eq!(config.pipeline.tracker.max_age, 10);
        assert_eq!(config.timeline.lock_in_step, TimelineStep::Scanning);
        assert_eq!(config.timeline.timings.scanning_ms, 1500);
        assert_eq!(config.frame_loop.frame_interval, Duration::from_millis(16));
        assert_eq!(config.frame_loop.max_frames, Some(900));
        assert_eq!(config.rng_seed, Some(42));
        assert!(config.metrics_enabled);
        assert_eq!(config.metrics_addr.port(), 9999);
    }

    #[test]
    fn test_unparsable_values_fall_back() {
        let config = config_from(&[("MOGCAM_MODE", "trio"), ("MOGCAM_MAX_AGE", "soon")]);
        assert_eq!(config.mode, DetectionMode::Solo);
        assert_eq!(config.pipeline.tracker.max_age, 30);
    }

    #[test]
    fn test_validation_catches_nested_errors() {
        let config = config_from(&[("MOGCAM_SMOOTHING_FACTOR", "3.0")]);
        assert!(matches!(config.validate(), Err(WorkerError::Vision(_))));

        let config = config_from(&[("MOGCAM_LOCK_IN_STEP", "waiting")]);
        assert!(matches!(config.validate(), Err(WorkerError::Timeline(_))));

        let config = config_from(&[("MOGCAM_FRAME_INTERVAL_MS", "0")]);
        assert!(matches!(config.validate(), Err(WorkerError::ConfigError(_))));
    }
}
