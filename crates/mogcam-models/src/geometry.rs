//! Axis-aligned face boxes in source-frame pixel coordinates.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Bounding box in pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize, JsonSchema)]
pub struct BoundingBox {
    /// Left edge x-coordinate
    pub x: f64,
    /// Top edge y-coordinate
    pub y: f64,
    /// Box width
    pub width: f64,
    /// Box height
    pub height: f64,
}

impl BoundingBox {
    /// Create a new bounding box.
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self { x, y, width, height }
    }

    /// Center x-coordinate.
    #[inline]
    pub fn cx(&self) -> f64 {
        self.x + self.width / 2.0
    }

    /// Center y-coordinate.
    #[inline]
    pub fn cy(&self) -> f64 {
        self.y + self.height / 2.0
    }

    /// Right edge x-coordinate.
    #[inline]
    pub fn x2(&self) -> f64 {
        self.x + self.width
    }

    /// Bottom edge y-coordinate.
    #[inline]
    pub fn y2(&self) -> f64 {
        self.y + self.height
    }

    /// Box area in pixels.
    #[inline]
    pub fn area(&self) -> f64 {
        self.width * self.height
    }

    /// Euclidean distance between the centers of two boxes.
    pub fn center_distance(&self, other: &BoundingBox) -> f64 {
        let dx = self.cx() - other.cx();
        let dy = self.cy() - other.cy();
        (dx * dx + dy * dy).sqrt()
    }

    /// Intersection area divided by the smaller of the two areas.
    ///
    /// Reaches 1.0 when one box fully contains the other. Returns 0.0 for
    /// disjoint boxes or when either box is degenerate.
    pub fn overlap_ratio(&self, other: &BoundingBox) -> f64 {
        let left = self.x.max(other.x);
        let right = self.x2().min(other.x2());
        let top = self.y.max(other.y);
        let bottom = self.y2().min(other.y2());

        if left >= right || top >= bottom {
            return 0.0;
        }

        let smaller = self.area().min(other.area());
        if smaller > 0.0 {
            (right - left) * (bottom - top) / smaller
        } else {
            0.0
        }
    }

    /// Largest per-field absolute difference to another box.
    pub fn max_delta(&self, other: &BoundingBox) -> f64 {
        (self.x - other.x)
            .abs()
            .max((self.y - other.y).abs())
            .max((self.width - other.width).abs())
            .max((self.height - other.height).abs())
    }

    /// True when width and height are non-negative and all fields are finite.
    pub fn is_valid(&self) -> bool {
        self.x.is_finite()
            && self.y.is_finite()
            && self.width.is_finite()
            && self.height.is_finite()
            && self.width >= 0.0
            && self.height >= 0.0
    }
}
