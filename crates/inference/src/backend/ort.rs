use super::{InferenceBackend, RawOutput};
use crate::model::DetectionModel;
use ort::{
    session::{Session, builder::GraphOptimizationLevel},
    value::TensorRef,
};
use preprocess::InputBuffer;

const DEFAULT_INPUT_NAME: &str = "input";
const DEFAULT_BOXES_NAME: &str = "boxes";
const DEFAULT_SCORES_NAME: &str = "scores";

#[derive(Debug, Clone, Copy)]
pub enum ExecutionProvider {
    Cpu,
    #[cfg(feature = "cuda")]
    Cuda,
}

/// ONNX Runtime session for a YOLOv4 export with one NHWC input and
/// `boxes` / `scores` outputs.
pub struct OrtBackend {
    session: Session,
    input_name: String,
    boxes_name: String,
    scores_name: String,
}

impl OrtBackend {
    /// Load model with specified execution provider
    pub fn load_model_with_provider(
        path: &str,
        provider: ExecutionProvider,
    ) -> anyhow::Result<Self> {
        // Initialize ORT environment (idempotent)
        let _ = ort::init().commit();

        #[allow(unused_mut)]
        let mut builder = Session::builder()?
            .with_optimization_level(GraphOptimizationLevel::Level3)?
            .with_intra_threads(4)?;

        match provider {
            #[cfg(feature = "cuda")]
            ExecutionProvider::Cuda => {
                tracing::info!("Initializing ONNX Runtime with CUDA execution provider");
                builder = builder.with_execution_providers([
                    ort::execution_providers::CUDAExecutionProvider::default()
                        .with_device_id(0)
                        .build()
                        .error_on_failure(),
                ])?;
            }
            ExecutionProvider::Cpu => {
                tracing::info!("Initializing ONNX Runtime with CPU execution provider");
            }
        }

        let session = builder.commit_from_file(path)?;

        tracing::info!("Model loaded from {}", path);
        Ok(Self {
            session,
            input_name: DEFAULT_INPUT_NAME.to_string(),
            boxes_name: DEFAULT_BOXES_NAME.to_string(),
            scores_name: DEFAULT_SCORES_NAME.to_string(),
        })
    }

    /// Override the tensor names used by the exported graph.
    pub fn with_tensor_names(
        mut self,
        input: impl Into<String>,
        boxes: impl Into<String>,
        scores: impl Into<String>,
    ) -> Self {
        self.input_name = input.into();
        self.boxes_name = boxes.into();
        self.scores_name = scores.into();
        self
    }
}

impl InferenceBackend for OrtBackend {
    fn load_model(model: &DetectionModel) -> anyhow::Result<Self> {
        #[cfg(feature = "cuda")]
        let provider = ExecutionProvider::Cuda;
        #[cfg(not(feature = "cuda"))]
        let provider = ExecutionProvider::Cpu;

        Self::load_model_with_provider(&model.model_path, provider)
    }

    fn infer(&mut self, input: &InputBuffer) -> anyhow::Result<RawOutput> {
        let outputs = match input {
            InputBuffer::Float(arr) => self.session.run(ort::inputs![
                self.input_name.as_str() => TensorRef::from_array_view(arr.view())?
            ])?,
            InputBuffer::Quantized(arr) => self.session.run(ort::inputs![
                self.input_name.as_str() => TensorRef::from_array_view(arr.view())?
            ])?,
        };

        let boxes = outputs[self.boxes_name.as_str()].try_extract_array::<f32>()?;
        let scores = outputs[self.scores_name.as_str()].try_extract_array::<f32>()?;

        Ok(RawOutput {
            boxes: boxes.into_owned(),
            scores: scores.into_owned(),
        })
    }
}
