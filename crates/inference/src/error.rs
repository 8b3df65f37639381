use preprocess::PreprocessError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DetectorError {
    #[error(transparent)]
    Preprocess(#[from] PreprocessError),

    #[error("Model mismatch ({what}): expected {expected}, got {actual}")]
    ModelMismatch {
        what: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("Invalid model descriptor: {0}")]
    InvalidModel(String),

    #[error("Failed to read labels from {path}: {source}")]
    Labels {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Backend(#[from] anyhow::Error),
}

impl DetectorError {
    pub fn mismatch(what: &'static str, expected: usize, actual: usize) -> Self {
        DetectorError::ModelMismatch {
            what,
            expected,
            actual,
        }
    }

    /// True when the source image itself was unusable.
    pub fn is_invalid_image(&self) -> bool {
        matches!(
            self,
            DetectorError::Preprocess(PreprocessError::InvalidImage { .. })
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_formatting() {
        let err = DetectorError::mismatch("score vector length", 80, 91);
        assert_eq!(
            err.to_string(),
            "Model mismatch (score vector length): expected 80, got 91"
        );

        let err = DetectorError::InvalidModel("input size must be positive".to_string());
        assert_eq!(
            err.to_string(),
            "Invalid model descriptor: input size must be positive"
        );

        let err = DetectorError::from(PreprocessError::invalid_image(0, 0, "zero-area image"));
        assert_eq!(err.to_string(), "Invalid image 0x0: zero-area image");
        assert!(err.is_invalid_image());
    }

    #[test]
    fn test_backend_error_is_transparent() {
        let err = DetectorError::from(anyhow::anyhow!("session run failed"));
        assert_eq!(err.to_string(), "session run failed");
        assert!(!err.is_invalid_image());
    }
}
