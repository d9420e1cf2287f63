//! Opus float decoder with per-channel output
//!
//! [`Decoder`] sequences the libopus calls: one codec context created at
//! construction, one interleaved scratch buffer big enough for the longest
//! packet Opus allows, and one [`ChannelData`] that receives the
//! de-interleaved samples of the last successful decode.
//!
//! Construction never fails. A decoder whose codec context could not be
//! created is still a valid object; every decode on it fails.

use std::collections::VecDeque;

use log::{debug, error, warn};

use crate::channel_data::ChannelData;
use crate::error::{Error, Result};
use crate::opus::{is_supported_sample_rate, samples_per_120ms, OpusContext};
use crate::sample_buffer::SampleBuffer;
#[cfg(feature = "decode-timing")]
use crate::timing::DecodeTimings;

/// How decoded audio is handed to the caller
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Delivery {
    /// Every [`Decoder::decode`] call decodes right away.
    #[default]
    Immediate,
    /// Packets are queued with [`Decoder::input`] and decoded one at a time
    /// by [`Decoder::output`].
    Queued,
}

/// Decoder construction parameters.
///
/// `channels` and `sample_rate` should match the encoder options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecoderConfig {
    pub channels: u32,
    pub sample_rate: u32,
    pub delivery: Delivery,
}

impl DecoderConfig {
    pub fn new(channels: u32, sample_rate: u32) -> Self {
        Self {
            channels,
            sample_rate,
            delivery: Delivery::Immediate,
        }
    }

    /// Switch to [`Delivery::Queued`].
    pub fn queued(mut self) -> Self {
        self.delivery = Delivery::Queued;
        self
    }
}

static EMPTY_CHANNEL: SampleBuffer = SampleBuffer::new();

pub struct Decoder {
    config: DecoderConfig,
    context: Option<OpusContext>,
    /// Interleaved output of the codec, sized for 120 ms
    scratch: Vec<f32>,
    channel_data: ChannelData,
    current_decoded_size: usize,
    queue: VecDeque<Vec<u8>>,
    #[cfg(feature = "decode-timing")]
    timings: DecodeTimings,
}

impl Decoder {
    pub fn new(config: DecoderConfig) -> Self {
        let context = match Self::create_context(&config) {
            Ok(context) => Some(context),
            Err(e) => {
                error!("error while creating opus decoder: {e}");
                None
            }
        };

        // A decoder without a context never reaches the codec, so it gets no
        // scratch space and no channel buffers. Its channels read as empty.
        let (scratch, channel_data) = match context {
            Some(_) => (
                vec![0.0; samples_per_120ms(config.sample_rate) * config.channels as usize],
                ChannelData::with_channels(config.channels as usize),
            ),
            None => (Vec::new(), ChannelData::new()),
        };

        Self {
            config,
            context,
            scratch,
            channel_data,
            current_decoded_size: 0,
            queue: VecDeque::new(),
            #[cfg(feature = "decode-timing")]
            timings: DecodeTimings::new(),
        }
    }

    fn create_context(config: &DecoderConfig) -> Result<OpusContext> {
        if config.channels == 0 {
            return Err(Error::InvalidChannelCount(config.channels));
        }
        if !is_supported_sample_rate(config.sample_rate) {
            return Err(Error::UnsupportedSampleRate(config.sample_rate));
        }
        OpusContext::new(config.sample_rate, config.channels)
    }

    /// Decode one Opus packet into the channel buffers.
    ///
    /// An empty packet is forwarded to libopus as a lost packet and yields
    /// concealment audio for the whole 120 ms output bound (5760 frames at
    /// 48 kHz), not for one typical 20 ms frame. On failure every channel
    /// buffer keeps the samples of the last successful decode.
    ///
    /// Returns the number of decoded frames per channel.
    pub fn decode(&mut self, packet: &[u8]) -> Result<usize> {
        let Some(context) = self.context.as_mut() else {
            debug!("decode on a decoder without codec context");
            return Err(Error::NoContext);
        };

        #[cfg(feature = "decode-timing")]
        self.timings.start();

        let max_frames = self.scratch.len() / context.channels();
        let frames = context
            .decode_float(packet, &mut self.scratch, max_frames)
            .map_err(|e| {
                debug!("dropping opus packet of {} bytes: {e}", packet.len());
                e
            })?;

        #[cfg(feature = "decode-timing")]
        self.timings.measure("opus_decode_float");

        if frames != self.current_decoded_size {
            self.channel_data.resize_all(frames);
            self.current_decoded_size = frames;
        }

        #[cfg(feature = "decode-timing")]
        self.timings.measure("resize");

        self.channel_data.deinterleave(&self.scratch, frames);

        #[cfg(feature = "decode-timing")]
        self.timings.measure("deinterleave");

        Ok(frames)
    }

    /// Queue a copy of `packet` for a later [`Decoder::output`].
    pub fn input(&mut self, packet: &[u8]) -> Result<()> {
        if self.config.delivery != Delivery::Queued {
            warn!("input on an immediate decoder, dropping {} bytes", packet.len());
            return Err(Error::NotQueued);
        }
        self.queue.push_back(packet.to_vec());
        Ok(())
    }

    /// Decode the oldest queued packet and append a copy of every channel
    /// buffer to `out`, in channel order.
    ///
    /// An empty queue fails without touching anything. A packet that fails
    /// to decode is still consumed and `out` is left as it was.
    pub fn output(&mut self, out: &mut ChannelData) -> Result<usize> {
        if self.config.delivery != Delivery::Queued {
            warn!("output on an immediate decoder");
            return Err(Error::NotQueued);
        }
        let packet = self.queue.pop_front().ok_or(Error::QueueEmpty)?;
        let frames = self.decode(&packet)?;

        for channel in self.channel_data.iter() {
            out.push(channel.clone());
        }
        Ok(frames)
    }

    /// Samples of channel `index` from the last successful decode.
    ///
    /// On a decoder without codec context every channel below
    /// [`Decoder::channels`] reads as the same empty buffer.
    pub fn channel(&self, index: usize) -> Option<&SampleBuffer> {
        if self.context.is_none() {
            return (index < self.channels()).then_some(&EMPTY_CHANNEL);
        }
        self.channel_data.get(index)
    }

    /// Channel buffers; empty on a decoder without codec context.
    pub fn channel_data(&self) -> &ChannelData {
        &self.channel_data
    }

    #[inline]
    pub fn channels(&self) -> usize {
        self.config.channels as usize
    }

    #[inline]
    pub fn sample_rate(&self) -> u32 {
        self.config.sample_rate
    }

    #[inline]
    pub fn delivery(&self) -> Delivery {
        self.config.delivery
    }

    /// Frames per channel produced by the last successful decode.
    #[inline]
    pub fn decoded_size(&self) -> usize {
        self.current_decoded_size
    }

    /// Packets waiting for [`Decoder::output`].
    #[inline]
    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    /// Whether the codec context was created.
    #[inline]
    pub fn is_valid(&self) -> bool {
        self.context.is_some()
    }

    #[inline]
    pub fn scratch_capacity(&self) -> usize {
        self.scratch.len()
    }
}
