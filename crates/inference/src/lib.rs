pub mod backend;
pub mod config;
pub mod detector;
pub mod error;
pub mod logging;
pub mod model;
pub mod processing;

// Re-export commonly used types for convenience
pub use backend::{InferenceBackend, RawOutput};
pub use config::DetectorConfig;
pub use detector::{Detector, YoloV4Detector};
pub use error::DetectorError;
pub use model::{DetectionModel, ModelPreset};
pub use schema::{BoundingBox, Detection};
