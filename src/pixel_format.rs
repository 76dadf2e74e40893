use serde::{Deserialize, Serialize};

/// Channel order expected by the LED controller.
///
/// Frames are always built as RGB triples; the transform only reorders bytes
/// within each triple, so the frame length never changes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
pub enum PixelFormat {
    #[default]
    #[serde(rename = "RGB")]
    Rgb,
    #[serde(rename = "GRB")]
    Grb,
    #[serde(rename = "BGR")]
    Bgr,
}

impl PixelFormat {
    /// Reorder an RGB frame for this format
    pub fn transform(self, data: Vec<u8>) -> Vec<u8> {
        match self {
            PixelFormat::Rgb => data, // No transformation needed
            PixelFormat::Grb => swap_channels(data, 0, 1),
            PixelFormat::Bgr => swap_channels(data, 0, 2),
        }
    }
}

/// Swap two channels of every pixel in-place
fn swap_channels(mut data: Vec<u8>, a: usize, b: usize) -> Vec<u8> {
    for pixel in data.chunks_exact_mut(3) {
        pixel.swap(a, b);
    }

    data
}
