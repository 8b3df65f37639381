use crate::error::DetectorError;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// Immutable description of the network the detector drives.
#[derive(Debug, Clone, PartialEq)]
pub struct DetectionModel {
    /// Side of the square network input, in pixels
    pub input_size: u32,
    /// Number of anchors the engine emits per frame
    pub output_size: usize,
    pub labels: Vec<String>,
    pub is_quantized: bool,
    pub model_path: String,
}

impl DetectionModel {
    pub fn new(
        model_path: impl Into<String>,
        labels: Vec<String>,
        input_size: u32,
        output_size: usize,
        is_quantized: bool,
    ) -> Result<Self, DetectorError> {
        if input_size == 0 {
            return Err(DetectorError::InvalidModel(
                "input size must be positive".to_string(),
            ));
        }
        if output_size == 0 {
            return Err(DetectorError::InvalidModel(
                "anchor count must be positive".to_string(),
            ));
        }
        if labels.is_empty() {
            return Err(DetectorError::InvalidModel(
                "label list is empty".to_string(),
            ));
        }

        Ok(Self {
            input_size,
            output_size,
            labels,
            is_quantized,
            model_path: model_path.into(),
        })
    }

    /// Descriptor for a built-in preset, with the model file under `model_dir`.
    pub fn from_preset(
        preset: ModelPreset,
        model_dir: impl AsRef<Path>,
        labels: Vec<String>,
    ) -> Result<Self, DetectorError> {
        let model_path = model_dir.as_ref().join(preset.model_filename());
        Self::new(
            model_path.to_string_lossy(),
            labels,
            preset.input_size(),
            preset.output_size(),
            preset.is_quantized(),
        )
    }

    pub fn num_classes(&self) -> usize {
        self.labels.len()
    }
}

/// Split a label file into labels: one per line, trimmed, blank lines dropped.
pub fn parse_labels(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

pub fn load_labels(path: impl AsRef<Path>) -> Result<Vec<String>, DetectorError> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path).map_err(|source| DetectorError::Labels {
        path: path.display().to_string(),
        source,
    })?;

    let labels = parse_labels(&text);
    tracing::debug!(path = %path.display(), count = labels.len(), "Loaded labels");
    Ok(labels)
}

/// YOLOv4 variants the camera app ships with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelPreset {
    Yolov4Fp32,
    Yolov4Fp16,
    Yolov4TinyFp32,
}

impl ModelPreset {
    pub const ALL: [ModelPreset; 3] = [
        ModelPreset::Yolov4Fp32,
        ModelPreset::Yolov4Fp16,
        ModelPreset::Yolov4TinyFp32,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ModelPreset::Yolov4Fp32 => "yolov4-416-fp32",
            ModelPreset::Yolov4Fp16 => "yolov4-416-fp16",
            ModelPreset::Yolov4TinyFp32 => "yolov4-tiny-416-fp32",
        }
    }

    pub fn model_filename(&self) -> String {
        format!("{}.onnx", self.as_str())
    }

    pub fn input_size(&self) -> u32 {
        416
    }

    /// Three anchors per cell over the stride 8/16/32 grids (tiny: 16/32).
    pub fn output_size(&self) -> usize {
        match self {
            // (52² + 26² + 13²) * 3
            ModelPreset::Yolov4Fp32 | ModelPreset::Yolov4Fp16 => 10647,
            // (26² + 13²) * 3
            ModelPreset::Yolov4TinyFp32 => 2535,
        }
    }

    pub fn is_quantized(&self) -> bool {
        false
    }
}

impl fmt::Display for ModelPreset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ModelPreset {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        Self::ALL
            .into_iter()
            .find(|preset| preset.as_str() == wanted)
            .ok_or_else(|| format!("unknown model preset {:?}", s))
    }
}
