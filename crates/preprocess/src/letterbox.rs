use crate::PreprocessError;
use schema::{BoundingBox, Point};

/// Uniform scale plus centering offsets that fit a source image into the
/// square network input.
///
/// Wide images (aspect ratio >= 1) are scaled by width and padded top and
/// bottom; tall images are scaled by height and padded left and right.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Letterbox {
    pub source_width: u32,
    pub source_height: u32,
    pub input_size: u32,
    pub scale: f32,
    pub resized_width: u32,
    pub resized_height: u32,
    /// Whole-pixel offsets, matching where the preprocessor places the image
    pub offset_x: f32,
    pub offset_y: f32,
}

impl Letterbox {
    pub fn new(
        source_width: u32,
        source_height: u32,
        input_size: u32,
    ) -> Result<Self, PreprocessError> {
        if source_width == 0 || source_height == 0 {
            return Err(PreprocessError::invalid_image(
                source_width,
                source_height,
                "zero-area image",
            ));
        }
        if input_size == 0 {
            return Err(PreprocessError::invalid_image(
                source_width,
                source_height,
                "network input size is zero",
            ));
        }

        let aspect_ratio = source_width as f32 / source_height as f32;
        let scale = if aspect_ratio >= 1.0 {
            input_size as f32 / source_width as f32
        } else {
            input_size as f32 / source_height as f32
        };

        let resized_width = Self::resized_extent(source_width, scale, input_size);
        let resized_height = Self::resized_extent(source_height, scale, input_size);

        let offset_x = (input_size - resized_width) / 2;
        let offset_y = (input_size - resized_height) / 2;

        Ok(Self {
            source_width,
            source_height,
            input_size,
            scale,
            resized_width,
            resized_height,
            offset_x: offset_x as f32,
            offset_y: offset_y as f32,
        })
    }

    #[inline]
    fn resized_extent(extent: u32, scale: f32, input_size: u32) -> u32 {
        ((extent as f32 * scale).round() as u32).clamp(1, input_size)
    }

    /// Pixel offsets as integers
    pub fn offset_px(&self) -> (u32, u32) {
        (self.offset_x as u32, self.offset_y as u32)
    }

    /// Map a source-image point into network input space.
    #[inline]
    pub fn forward(&self, point: Point) -> Point {
        Point::new(
            point.x * self.scale + self.offset_x,
            point.y * self.scale + self.offset_y,
        )
    }

    pub fn forward_box(&self, bbox: &BoundingBox) -> BoundingBox {
        let top_left = self.forward(Point::new(bbox.left, bbox.top));
        let bottom_right = self.forward(Point::new(bbox.right, bbox.bottom));
        BoundingBox::new(top_left.x, top_left.y, bottom_right.x, bottom_right.y)
    }

    /// Map a network input point back into source-image space.
    #[inline]
    pub fn inverse_point(&self, point: Point) -> Point {
        Point::new(
            (point.x - self.offset_x) / self.scale,
            (point.y - self.offset_y) / self.scale,
        )
    }

    /// Map a network input box back into source-image space. No clamping.
    pub fn inverse(&self, bbox: &BoundingBox) -> BoundingBox {
        let top_left = self.inverse_point(Point::new(bbox.left, bbox.top));
        let bottom_right = self.inverse_point(Point::new(bbox.right, bbox.bottom));
        BoundingBox::new(top_left.x, top_left.y, bottom_right.x, bottom_right.y)
    }
}
