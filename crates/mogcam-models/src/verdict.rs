//! Detection modes, per-face verdicts and overlay styles.
//!
//! These are the only inputs the renderer needs to pick a visual variant
//! for each face slot.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// How many players take part in a reveal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema, Default)]
#[serde(rename_all = "snake_case")]
pub enum DetectionMode {
    /// One face, judged on its own.
    #[default]
    Solo,
    /// Two faces, exactly one of which mogs the other.
    Duo,
}

impl DetectionMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            DetectionMode::Solo => "solo",
            DetectionMode::Duo => "duo",
        }
    }

    /// Number of face slots rendered in this mode.
    pub fn slots(&self) -> usize {
        match self {
            DetectionMode::Solo => 1,
            DetectionMode::Duo => 2,
        }
    }
}

impl fmt::Display for DetectionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for DetectionMode {
    type Err = DetectionModeParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "solo" | "single" => Ok(DetectionMode::Solo),
            "duo" | "pair" => Ok(DetectionMode::Duo),
            _ => Err(DetectionModeParseError(s.to_string())),
        }
    }
}

#[derive(Debug, Error)]
#[error("Unknown detection mode: {0}")]
pub struct DetectionModeParseError(String);

/// Outcome shown for one face slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema, Default)]
#[serde(rename_all = "snake_case")]
pub enum FaceVerdict {
    /// No scan has finished yet.
    #[default]
    Calculating,
    Mogging,
    Mogged,
}

/// Visual variant the renderer draws around a face.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum OverlayStyle {
    Default,
    Mogged,
    Mogging,
    Spotlight,
    /// Duo mode with only one face visible.
    Waiting,
}

impl From<FaceVerdict> for OverlayStyle {
    fn from(verdict: FaceVerdict) -> Self {
        match verdict {
            FaceVerdict::Calculating => OverlayStyle::Default,
            FaceVerdict::Mogging => OverlayStyle::Mogging,
            FaceVerdict::Mogged => OverlayStyle::Mogged,
        }
    }
}
