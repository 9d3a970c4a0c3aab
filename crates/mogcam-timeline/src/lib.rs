//! Reveal timeline for the mogcam engine.
//!
//! This crate provides:
//! - The linear reveal state machine with per-cycle content (`Timeline`)
//! - Dwell timers and presence-driven transitions (`TimelineDriver`)
//! - Per-face verdicts and overlay selection (`VerdictBoard`, `select_overlay`)

pub mod config;
pub mod driver;
pub mod error;
pub mod machine;
pub mod metrics;
pub mod stats;
pub mod verdict;

pub use config::{TimelineConfig, TimelineTimings};
pub use driver::{DriverHandle, TimelineDriver};
pub use error::{TimelineError, TimelineResult};
pub use machine::{next_step, Timeline};
pub use stats::{generate_cycle, CycleContent};
pub use verdict::{select_overlay, VerdictBoard};
