mod bounding_box;
mod detection;

pub use bounding_box::{BoundingBox, Point};
pub use detection::Detection;
