use crate::config::{DEFAULT_INPUT_SIZE, LETTERBOX_COLOR, RGB_CHANNELS};
use crate::{InputBuffer, Letterbox, Preprocess, PreprocessError};
use common::{span, span_debug};
use fast_image_resize::{
    PixelType, ResizeAlg, ResizeOptions, Resizer,
    images::{Image, ImageRef},
};
use std::default::Default;

/// Letterboxes RGB frames into a square network input on the CPU.
///
/// Holds a reusable scratch buffer, so one instance serves one frame at a
/// time.
pub struct CpuPreProcessor {
    pub input_size: u32,
    letterboxed_buffer: Vec<u8>,
}

impl CpuPreProcessor {
    pub fn new(input_size: u32) -> Self {
        let side = input_size as usize;
        Self {
            input_size,
            letterboxed_buffer: vec![LETTERBOX_COLOR; side * side * RGB_CHANNELS],
        }
    }

    pub fn preprocess_from_u8_slice(
        &mut self,
        pixels: &[u8],
        width: u32,
        height: u32,
        output: &mut InputBuffer,
    ) -> Result<Letterbox, PreprocessError> {
        let _s = span!("preprocess_frame");

        tracing::trace!(
            width,
            height,
            pixel_bytes = pixels.len(),
            "Preprocessing frame dimensions"
        );

        let letterbox = Letterbox::new(width, height, self.input_size)?;

        let expected_size = width as usize * height as usize * RGB_CHANNELS;
        if pixels.len() != expected_size {
            return Err(PreprocessError::invalid_image(
                width,
                height,
                format!(
                    "buffer size mismatch: expected {} bytes, got {}",
                    expected_size,
                    pixels.len()
                ),
            ));
        }

        let expected_shape = InputBuffer::shape_for(self.input_size);
        if output.shape() != expected_shape {
            return Err(PreprocessError::BufferMismatch {
                expected: expected_shape.iter().product(),
                actual: output.len(),
            });
        }

        self.resize_and_letterbox(pixels, &letterbox)?;
        self.write_input(output)?;

        Ok(letterbox)
    }

    fn resize_and_letterbox(
        &mut self,
        pixels: &[u8],
        letterbox: &Letterbox,
    ) -> Result<(), PreprocessError> {
        let _s = span!("resize_and_letterbox");

        let new_width = letterbox.resized_width;
        let new_height = letterbox.resized_height;
        let (offset_x, offset_y) = letterbox.offset_px();

        let src = ImageRef::new(
            letterbox.source_width,
            letterbox.source_height,
            pixels,
            PixelType::U8x3,
        )
        .map_err(|e| PreprocessError::Resize(e.to_string()))?;

        let mut resized = Image::new(new_width, new_height, PixelType::U8x3);

        Resizer::new()
            .resize(
                &src,
                &mut resized,
                &ResizeOptions::new().resize_alg(ResizeAlg::Nearest),
            )
            .map_err(|e| PreprocessError::Resize(e.to_string()))?;

        self.letterboxed_buffer.fill(LETTERBOX_COLOR);

        let resized_data = resized.buffer();
        let row_bytes = new_width as usize * RGB_CHANNELS;
        let stride = self.input_size as usize * RGB_CHANNELS;

        for y in 0..new_height as usize {
            let src_row = y * row_bytes;
            let dst_row = (y + offset_y as usize) * stride + offset_x as usize * RGB_CHANNELS;

            self.letterboxed_buffer[dst_row..dst_row + row_bytes]
                .copy_from_slice(&resized_data[src_row..src_row + row_bytes]);
        }

        Ok(())
    }

    fn write_input(&self, output: &mut InputBuffer) -> Result<(), PreprocessError> {
        let _s = span_debug!("write_input");

        let expected = self.letterboxed_buffer.len();
        match output {
            InputBuffer::Float(arr) => {
                let actual = arr.len();
                let dst = arr
                    .as_slice_mut()
                    .ok_or(PreprocessError::BufferMismatch { expected, actual })?;
                for (dst, &src) in dst.iter_mut().zip(&self.letterboxed_buffer) {
                    *dst = src as f32 / 255.0;
                }
            }
            InputBuffer::Quantized(arr) => {
                let actual = arr.len();
                let dst = arr
                    .as_slice_mut()
                    .ok_or(PreprocessError::BufferMismatch { expected, actual })?;
                dst.copy_from_slice(&self.letterboxed_buffer);
            }
        }

        Ok(())
    }
}

impl Default for CpuPreProcessor {
    fn default() -> Self {
        Self::new(DEFAULT_INPUT_SIZE)
    }
}

impl Preprocess for CpuPreProcessor {
    fn preprocess(
        &mut self,
        pixels: &[u8],
        width: u32,
        height: u32,
        output: &mut InputBuffer,
    ) -> Result<Letterbox, PreprocessError> {
        self.preprocess_from_u8_slice(pixels, width, height, output)
    }

    fn input_size(&self) -> u32 {
        self.input_size
    }
}
