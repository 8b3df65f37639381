use crate::{
    backend::InferenceBackend,
    error::DetectorError,
    model::DetectionModel,
    processing::{
        nms::{DEFAULT_NMS_THRESHOLD, NmsEngine},
        post::OutputDecoder,
    },
};
use image::RgbImage;
use preprocess::{CpuPreProcessor, InputBuffer, Preprocess};
use schema::Detection;
use std::time::Instant;

/// Something that turns a frame into labeled boxes in frame coordinates.
pub trait Detector {
    fn detection_model(&self) -> &DetectionModel;

    fn run_detection(&mut self, image: &RgbImage) -> Result<Vec<Detection>, DetectorError>;
}

/// Letterbox, infer, decode, suppress, map back.
///
/// Owns its scratch and input buffers, so one instance handles one frame
/// at a time. Use one detector per concurrent stream.
pub struct YoloV4Detector<B: InferenceBackend> {
    model: DetectionModel,
    backend: B,
    preprocessor: CpuPreProcessor,
    input: InputBuffer,
    decoder: OutputDecoder,
    nms: NmsEngine,
}

impl<B: InferenceBackend> YoloV4Detector<B> {
    pub fn new(
        model: DetectionModel,
        backend: B,
        minimum_score: f32,
    ) -> Result<Self, DetectorError> {
        if !(0.0..=1.0).contains(&minimum_score) {
            return Err(DetectorError::InvalidModel(format!(
                "minimum score {} outside [0, 1]",
                minimum_score
            )));
        }

        tracing::info!(
            model_path = %model.model_path,
            input_size = model.input_size,
            anchors = model.output_size,
            classes = model.num_classes(),
            quantized = model.is_quantized,
            minimum_score,
            "Detector ready"
        );

        Ok(Self {
            preprocessor: CpuPreProcessor::new(model.input_size),
            input: InputBuffer::new(model.input_size, model.is_quantized),
            decoder: OutputDecoder::new(minimum_score),
            nms: NmsEngine::new(DEFAULT_NMS_THRESHOLD),
            model,
            backend,
        })
    }

    /// Load the backend through [`InferenceBackend::load_model`].
    pub fn load(model: DetectionModel, minimum_score: f32) -> Result<Self, DetectorError> {
        let backend = B::load_model(&model)?;
        Self::new(model, backend, minimum_score)
    }

    /// Replace the NMS IoU threshold. Must lie within `[0, 1]`.
    pub fn with_nms_threshold(mut self, iou_threshold: f32) -> Result<Self, DetectorError> {
        if !(0.0..=1.0).contains(&iou_threshold) {
            return Err(DetectorError::InvalidModel(format!(
                "NMS threshold {} outside [0, 1]",
                iou_threshold
            )));
        }
        self.nms = NmsEngine::new(iou_threshold);
        Ok(self)
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn minimum_score(&self) -> f32 {
        self.decoder.minimum_score
    }

    pub fn nms_threshold(&self) -> f32 {
        self.nms.iou_threshold
    }

    /// Run the pipeline on raw RGB pixels in HWC order.
    pub fn detect_pixels(
        &mut self,
        pixels: &[u8],
        width: u32,
        height: u32,
    ) -> Result<Vec<Detection>, DetectorError> {
        let _span = tracing::info_span!("run_detection", width, height).entered();
        let start = Instant::now();

        let letterbox = self
            .preprocessor
            .preprocess(pixels, width, height, &mut self.input)?;

        let raw = {
            let _infer_span = tracing::info_span!("model_inference").entered();
            self.backend.infer(&self.input)?
        };

        if raw.num_anchors() != self.model.output_size {
            return Err(DetectorError::mismatch(
                "anchor count",
                self.model.output_size,
                raw.num_anchors(),
            ));
        }

        let side = self.model.input_size;
        let candidates = self
            .decoder
            .decode(&raw, &self.model.labels, side, side)?;
        let kept = self.nms.suppress(candidates, self.model.num_classes());

        // Boxes inside the padding band collapse onto the frame border.
        let max_x = width as f32 - 1.0;
        let max_y = height as f32 - 1.0;
        let detections: Vec<Detection> = kept
            .into_iter()
            .map(|detection| Detection {
                bbox: letterbox.inverse(&detection.bbox).clamp_to(max_x, max_y),
                ..detection
            })
            .collect();

        tracing::trace!(
            elapsed_ms = start.elapsed().as_secs_f64() * 1000.0,
            detections = detections.len(),
            "Frame processed"
        );

        Ok(detections)
    }
}

impl<B: InferenceBackend> Detector for YoloV4Detector<B> {
    fn detection_model(&self) -> &DetectionModel {
        &self.model
    }

    fn run_detection(&mut self, image: &RgbImage) -> Result<Vec<Detection>, DetectorError> {
        self.detect_pixels(image.as_raw(), image.width(), image.height())
    }
}
