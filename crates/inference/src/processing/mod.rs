pub mod iou;
pub mod nms;
pub mod post;
