pub mod config;
pub mod cpu;
pub mod error;
pub mod letterbox;

use ndarray::{Array, IxDyn};

pub use config::DEFAULT_INPUT_SIZE;
pub use cpu::CpuPreProcessor;
pub use error::PreprocessError;
pub use letterbox::Letterbox;

/// Network input tensor, NHWC `[1, S, S, 3]` with interleaved RGB.
///
/// Owned by the caller and reused across frames. Every call to
/// [`Preprocess::preprocess`] overwrites all of it.
#[derive(Debug, Clone)]
pub enum InputBuffer {
    /// Channel bytes divided by 255.0, in `[0, 1]`
    Float(Array<f32, IxDyn>),
    /// Raw channel bytes for quantized models
    Quantized(Array<u8, IxDyn>),
}

impl InputBuffer {
    pub fn new(input_size: u32, quantized: bool) -> Self {
        let shape = IxDyn(&Self::shape_for(input_size));
        if quantized {
            InputBuffer::Quantized(Array::zeros(shape))
        } else {
            InputBuffer::Float(Array::zeros(shape))
        }
    }

    pub fn shape_for(input_size: u32) -> [usize; 4] {
        let side = input_size as usize;
        [1, side, side, config::RGB_CHANNELS]
    }

    pub fn is_quantized(&self) -> bool {
        matches!(self, InputBuffer::Quantized(_))
    }

    pub fn shape(&self) -> &[usize] {
        match self {
            InputBuffer::Float(arr) => arr.shape(),
            InputBuffer::Quantized(arr) => arr.shape(),
        }
    }

    pub fn len(&self) -> usize {
        match self {
            InputBuffer::Float(arr) => arr.len(),
            InputBuffer::Quantized(arr) => arr.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Trait for image preprocessing implementations
pub trait Preprocess {
    /// Letterbox an image into `output`.
    ///
    /// # Arguments
    /// * `pixels` - RGB pixel data in HWC format
    /// * `width` - Image width
    /// * `height` - Image height
    /// * `output` - Caller-owned network input, fully overwritten
    ///
    /// # Returns
    /// The letterbox transform that was applied
    fn preprocess(
        &mut self,
        pixels: &[u8],
        width: u32,
        height: u32,
        output: &mut InputBuffer,
    ) -> Result<Letterbox, PreprocessError>;

    /// Get the input size this preprocessor targets
    fn input_size(&self) -> u32;
}
