//! Baked curve lookup tables

/// A curve baked into a fixed-resolution, row-major, one-dimensional table
///
/// `channels` is 1 for scalar curves and 4 for color+alpha curves. The
/// table is sized to resolve the tightest keyframe spacing of the source
/// curve and is consumed by the shading stage as a 1D texture; the
/// simulation never reads it back.
#[derive(Clone, Debug, PartialEq)]
pub struct LookupTable {
    /// Number of samples along the curve
    pub width: u32,
    /// Floats per sample
    pub channels: u32,
    /// Sample data, `width * channels` floats
    pub data: Vec<f32>,
}

impl LookupTable {
    pub(crate) fn new(width: u32, channels: u32, data: Vec<f32>) -> Self {
        debug_assert_eq!(data.len(), (width * channels) as usize);
        Self {
            width,
            channels,
            data,
        }
    }

    /// Raw bytes for texture upload
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.data)
    }

    /// One sample row
    pub fn sample(&self, index: usize) -> &[f32] {
        let c = self.channels as usize;
        &self.data[index * c..(index + 1) * c]
    }
}
