use crate::BoundingBox;
use serde::{Deserialize, Serialize};

/// One recognized object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Detection {
    /// Anchor index this detection was decoded from. Only unique within a
    /// single decode pass.
    pub id: usize,
    pub class_id: usize,
    pub class_name: String,
    pub score: f32,
    pub bbox: BoundingBox,
}
