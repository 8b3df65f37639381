use serde::{Deserialize, Serialize};

/// A point in pixel space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Axis-aligned box in corner format.
///
/// `left <= right` and `top <= bottom` are expected. Zero-area boxes are
/// legal and every area helper returns `0.0` for them.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub left: f32,
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
}

impl BoundingBox {
    pub fn new(left: f32, top: f32, right: f32, bottom: f32) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    /// Build a box from center-width-height format
    #[inline]
    pub fn from_center(cx: f32, cy: f32, width: f32, height: f32) -> Self {
        Self {
            left: cx - width / 2.0,
            top: cy - height / 2.0,
            right: cx + width / 2.0,
            bottom: cy + height / 2.0,
        }
    }

    #[inline]
    pub fn width(&self) -> f32 {
        self.right - self.left
    }

    #[inline]
    pub fn height(&self) -> f32 {
        self.bottom - self.top
    }

    #[inline]
    pub fn center_x(&self) -> f32 {
        (self.left + self.right) / 2.0
    }

    #[inline]
    pub fn center_y(&self) -> f32 {
        (self.top + self.bottom) / 2.0
    }

    #[inline]
    pub fn area(&self) -> f32 {
        self.width() * self.height()
    }

    /// Clamp every edge into `[0, max_x] x [0, max_y]`.
    ///
    /// A box lying wholly outside the range collapses onto the nearest
    /// border as a zero-width or zero-height box, never an inverted one.
    pub fn clamp_to(&self, max_x: f32, max_y: f32) -> Self {
        Self {
            left: self.left.max(0.0).min(max_x),
            top: self.top.max(0.0).min(max_y),
            right: self.right.max(0.0).min(max_x),
            bottom: self.bottom.max(0.0).min(max_y),
        }
    }
}
