use crate::model::DetectionModel;
use ndarray::ArrayD;
use preprocess::InputBuffer;

#[cfg(feature = "ort-backend")]
pub mod ort;

/// The inference engine seen from the pipeline: prepared input in, raw
/// per-anchor tensors out.
pub trait InferenceBackend {
    /// Load the model named by the descriptor. Failure here is fatal.
    fn load_model(model: &DetectionModel) -> anyhow::Result<Self>
    where
        Self: Sized;

    /// Run inference on a prepared input buffer
    fn infer(&mut self, input: &InputBuffer) -> anyhow::Result<RawOutput>;
}

/// Raw engine output for one frame.
#[derive(Debug, Clone)]
pub struct RawOutput {
    pub boxes: ArrayD<f32>,  // [1, anchors, 4] cxcywh in network input pixels
    pub scores: ArrayD<f32>, // [1, anchors, num_classes]
}

impl RawOutput {
    pub fn new(boxes: ArrayD<f32>, scores: ArrayD<f32>) -> Self {
        Self { boxes, scores }
    }

    /// Anchor count of the box tensor (second to last axis).
    pub fn num_anchors(&self) -> usize {
        let shape = self.boxes.shape();
        if shape.len() >= 2 {
            shape[shape.len() - 2]
        } else {
            0
        }
    }
}
