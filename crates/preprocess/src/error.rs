use thiserror::Error;

#[derive(Error, Debug)]
pub enum PreprocessError {
    #[error("Invalid image {width}x{height}: {reason}")]
    InvalidImage {
        width: u32,
        height: u32,
        reason: String,
    },

    #[error("Input buffer mismatch: expected {expected} elements, got {actual}")]
    BufferMismatch { expected: usize, actual: usize },

    #[error("Resize failed: {0}")]
    Resize(String),
}

impl PreprocessError {
    pub fn invalid_image(width: u32, height: u32, reason: impl Into<String>) -> Self {
        PreprocessError::InvalidImage {
            width,
            height,
            reason: reason.into(),
        }
    }
}
