use crate::{
    error::DetectorError,
    model::{DetectionModel, ModelPreset, load_labels},
    processing::nms::DEFAULT_NMS_THRESHOLD,
};
use common::{env_or, env_parse};

pub use common::Environment;

const DEFAULT_MINIMUM_SCORE: f32 = 0.5;

#[derive(Debug, Clone)]
pub struct DetectorConfig {
    pub environment: Environment,
    pub model_path: String,
    pub labels_path: String,
    pub input_size: u32,
    pub output_size: usize,
    pub is_quantized: bool,
    pub minimum_score: f32,
    pub nms_threshold: f32,
    pub image_path: Option<String>,
}

impl DetectorConfig {
    /// Load configuration from environment variables with sensible defaults.
    ///
    /// `MODEL_PRESET` picks the defaults for the model path and shape; the
    /// individual variables override it.
    pub fn from_env() -> anyhow::Result<Self> {
        let environment = Environment::from_env();

        let preset = env_parse::<ModelPreset>("MODEL_PRESET")?.unwrap_or(ModelPreset::Yolov4Fp32);

        let model_path = env_or(
            "MODEL_PATH",
            format!("/models/{}", preset.model_filename()),
        );
        let labels_path = env_or("LABELS_PATH", "/models/coco.txt".to_string());
        let input_size = env_parse("INPUT_SIZE")?.unwrap_or(preset.input_size());
        let output_size = env_parse("OUTPUT_SIZE")?.unwrap_or(preset.output_size());
        let is_quantized = env_parse("IS_QUANTIZED")?.unwrap_or(preset.is_quantized());

        let minimum_score = env_parse("MINIMUM_SCORE")?.unwrap_or(DEFAULT_MINIMUM_SCORE);
        let nms_threshold = env_parse("NMS_THRESHOLD")?.unwrap_or(DEFAULT_NMS_THRESHOLD);

        anyhow::ensure!(
            (0.0..=1.0).contains(&minimum_score),
            "MINIMUM_SCORE must be within [0, 1], got {}",
            minimum_score
        );
        anyhow::ensure!(
            (0.0..=1.0).contains(&nms_threshold),
            "NMS_THRESHOLD must be within [0, 1], got {}",
            nms_threshold
        );

        let image_path = std::env::var("IMAGE_PATH").ok();

        Ok(Self {
            environment,
            model_path,
            labels_path,
            input_size,
            output_size,
            is_quantized,
            minimum_score,
            nms_threshold,
            image_path,
        })
    }

    /// Read the label file and build the model descriptor.
    pub fn detection_model(&self) -> Result<DetectionModel, DetectorError> {
        let labels = load_labels(&self.labels_path)?;
        DetectionModel::new(
            self.model_path.clone(),
            labels,
            self.input_size,
            self.output_size,
            self.is_quantized,
        )
    }

    /// Create default configuration for testing
    #[cfg(test)]
    pub fn test_default() -> Self {
        Self {
            environment: Environment::Development,
            model_path: "/models/yolov4-416-fp32.onnx".to_string(),
            labels_path: "/models/coco.txt".to_string(),
            input_size: 416,
            output_size: 10647,
            is_quantized: false,
            minimum_score: DEFAULT_MINIMUM_SCORE,
            nms_threshold: DEFAULT_NMS_THRESHOLD,
            image_path: None,
        }
    }
}
