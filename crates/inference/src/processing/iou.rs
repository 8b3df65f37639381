//! Overlap math for axis-aligned boxes.
//!
//! Every function is sequential and allocation-free, so identical inputs give
//! bit-identical outputs.

use schema::BoundingBox;

/// Signed 1-D overlap of two intervals given as (center, length).
///
/// Negative when the intervals are disjoint.
#[inline]
pub fn overlap(center1: f32, length1: f32, center2: f32, length2: f32) -> f32 {
    let left = (center1 - length1 / 2.0).max(center2 - length2 / 2.0);
    let right = (center1 + length1 / 2.0).min(center2 + length2 / 2.0);
    right - left
}

#[inline]
pub fn intersection_area(a: &BoundingBox, b: &BoundingBox) -> f32 {
    let w = overlap(a.center_x(), a.width(), b.center_x(), b.width());
    let h = overlap(a.center_y(), a.height(), b.center_y(), b.height());

    if w < 0.0 || h < 0.0 { 0.0 } else { w * h }
}

#[inline]
pub fn union_area(a: &BoundingBox, b: &BoundingBox) -> f32 {
    a.area() + b.area() - intersection_area(a, b)
}

/// Intersection over union. Zero when the union is empty, never NaN.
#[inline]
pub fn iou(a: &BoundingBox, b: &BoundingBox) -> f32 {
    let union = union_area(a, b);
    if union > 0.0 {
        intersection_area(a, b) / union
    } else {
        0.0
    }
}
