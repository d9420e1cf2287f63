//! Owned `f32` sample buffer
//!
//! Exposed across the C ABI as `Float32Array`.

/// Owned, resizable run of 32-bit float samples.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SampleBuffer {
    samples: Vec<f32>,
}

impl SampleBuffer {
    pub const fn new() -> Self {
        Self {
            samples: Vec::new(),
        }
    }

    /// Buffer of `len` zeroed samples
    pub fn with_len(len: usize) -> Self {
        Self {
            samples: vec![0.0; len],
        }
    }

    /// Grow with zeros or truncate to `len`.
    pub fn resize(&mut self, len: usize) {
        self.samples.resize(len, 0.0);
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    #[inline]
    pub fn as_slice(&self) -> &[f32] {
        &self.samples
    }

    #[inline]
    pub(crate) fn as_mut_slice(&mut self) -> &mut [f32] {
        &mut self.samples
    }

    /// Raw pointer to the first sample.
    ///
    /// Never null. For an empty buffer it is dangling and must not be read.
    #[inline]
    pub fn as_ptr(&self) -> *const f32 {
        self.samples.as_ptr()
    }
}

impl From<Vec<f32>> for SampleBuffer {
    fn from(samples: Vec<f32>) -> Self {
        Self { samples }
    }
}
