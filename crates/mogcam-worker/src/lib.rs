//! Headless mogcam engine.
//!
//! This crate wires the detection frame loop to the reveal timeline:
//! - Environment configuration (`EngineConfig`)
//! - Session lifecycle and shutdown (`Engine`, `EngineSession`)
//! - Structured timeline event logging (`EventLogger`)
//! - A synthetic detector for running without a camera

pub mod config;
pub mod engine;
pub mod error;
pub mod logging;
pub mod metrics;
pub mod simulation;

pub use config::EngineConfig;
pub use engine::{Engine, EngineReport, EngineSession};
pub use error::{WorkerError, WorkerResult};
pub use logging::{EventLogger, SessionSummary};
pub use simulation::{SimulatedDetector, SimulationConfig};
