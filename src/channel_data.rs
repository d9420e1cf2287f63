//! Ordered per-channel sample buffers
//!
//! The decoder keeps one [`ChannelData`] with exactly one entry per
//! channel. Hosts using queued delivery own a second, growable one that
//! [`crate::Decoder::output`] appends to.

use crate::sample_buffer::SampleBuffer;

/// Ordered collection of [`SampleBuffer`]s, one per audio channel.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChannelData {
    channels: Vec<SampleBuffer>,
}

impl ChannelData {
    pub fn new() -> Self {
        Self::default()
    }

    /// `count` empty channel buffers
    pub fn with_channels(count: usize) -> Self {
        Self {
            channels: vec![SampleBuffer::new(); count],
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.channels.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&SampleBuffer> {
        self.channels.get(index)
    }

    pub fn push(&mut self, buffer: SampleBuffer) {
        self.channels.push(buffer);
    }

    pub fn clear(&mut self) {
        self.channels.clear();
    }

    /// Resize every channel buffer to `frames` samples.
    pub(crate) fn resize_all(&mut self, frames: usize) {
        for channel in &mut self.channels {
            channel.resize(frames);
        }
    }

    /// Split channel-interleaved `interleaved` into the channel buffers.
    ///
    /// `interleaved` holds `frames * self.len()` samples laid out as
    /// `frame0_ch0, frame0_ch1, ...`. Every buffer must already hold
    /// `frames` samples.
    pub(crate) fn deinterleave(&mut self, interleaved: &[f32], frames: usize) {
        let stride = self.channels.len();
        for (k, channel) in self.channels.iter_mut().enumerate() {
            let out = &mut channel.as_mut_slice()[..frames];
            for (i, sample) in out.iter_mut().enumerate() {
                *sample = interleaved[i * stride + k];
            }
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &SampleBuffer> {
        self.channels.iter()
    }
}
