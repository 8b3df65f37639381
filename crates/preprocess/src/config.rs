/// Side length of the square network input used when none is configured.
pub const DEFAULT_INPUT_SIZE: u32 = 416;

/// Channels written per pixel (interleaved RGB).
pub const RGB_CHANNELS: usize = 3;

/// Fill value for the padded band around the resized image.
pub const LETTERBOX_COLOR: u8 = 0;
