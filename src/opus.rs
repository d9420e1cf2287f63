//! Opus decoder FFI bindings
//!
//! This module owns the calls into libopus: one decoder state per
//! [`OpusContext`], created in [`OpusContext::new`] and destroyed exactly
//! once on drop. The raw declarations come from `audiopus_sys`, which also
//! takes care of linking libopus.

use std::ffi::CStr;
use std::ptr::{self, NonNull};

use audiopus_sys::{
    opus_decode_float, opus_decoder_create, opus_decoder_destroy, opus_strerror, OpusDecoder,
};
use libc::{c_int, c_uchar};

use crate::error::{Error, Result};

/// Sample rates accepted by `opus_decoder_create`.
pub const SUPPORTED_SAMPLE_RATES: [u32; 5] = [8000, 12000, 16000, 24000, 48000];

/// Longest packet duration libopus will ever produce, in milliseconds.
pub const MAX_PACKET_DURATION_MS: usize = 120;

/// Frames per channel in a [`MAX_PACKET_DURATION_MS`] packet at `sample_rate`.
#[inline]
pub const fn samples_per_120ms(sample_rate: u32) -> usize {
    MAX_PACKET_DURATION_MS * sample_rate as usize / 1000
}

/// Whether libopus accepts `sample_rate` for decoding
#[inline]
pub fn is_supported_sample_rate(sample_rate: u32) -> bool {
    SUPPORTED_SAMPLE_RATES.contains(&sample_rate)
}

/// Human readable message for a libopus error code
pub fn error_string(code: c_int) -> String {
    // opus_strerror returns a pointer to a static string for every input.
    let msg = unsafe { opus_strerror(code) };
    if msg.is_null() {
        return "unknown error".to_string();
    }
    unsafe { CStr::from_ptr(msg) }.to_string_lossy().into_owned()
}

/// Owned libopus decoder state.
pub struct OpusContext {
    raw: NonNull<OpusDecoder>,
    channels: usize,
}

// The libopus state has no thread affinity; exclusive access is enforced
// through `&mut self`.
unsafe impl Send for OpusContext {}

impl OpusContext {
    /// Create a decoder state for `(sample_rate, channels)`.
    pub fn new(sample_rate: u32, channels: u32) -> Result<Self> {
        let fs = i32::try_from(sample_rate).map_err(|_| Error::UnsupportedSampleRate(sample_rate))?;
        let ch = c_int::try_from(channels).map_err(|_| Error::InvalidChannelCount(channels))?;

        let mut err: c_int = 0;
        let raw = unsafe { opus_decoder_create(fs, ch, &mut err) };

        match NonNull::new(raw) {
            Some(raw) if err == 0 => Ok(Self {
                raw,
                channels: channels as usize,
            }),
            Some(raw) => {
                // Should not happen, but never leak a half-created state
                unsafe { opus_decoder_destroy(raw.as_ptr()) };
                Err(Error::DecoderCreate {
                    code: err,
                    message: error_string(err),
                })
            }
            None => Err(Error::DecoderCreate {
                code: err,
                message: error_string(err),
            }),
        }
    }

    /// Decode one packet into channel-interleaved floats.
    ///
    /// An empty `packet` is passed to libopus as a lost packet, so the
    /// codec runs its own concealment. At most `max_frames` frames are
    /// written, further capped by what fits in `pcm`.
    ///
    /// Returns the number of frames (samples per channel) written.
    pub fn decode_float(&mut self, packet: &[u8], pcm: &mut [f32], max_frames: usize) -> Result<usize> {
        let len = i32::try_from(packet.len()).map_err(|_| Error::PacketTooLarge(packet.len()))?;
        let data: *const c_uchar = if packet.is_empty() {
            ptr::null()
        } else {
            packet.as_ptr()
        };

        let frame_size = max_frames.min(pcm.len() / self.channels);
        let frame_size = c_int::try_from(frame_size).unwrap_or(c_int::MAX);

        let ret = unsafe {
            opus_decode_float(self.raw.as_ptr(), data, len, pcm.as_mut_ptr(), frame_size, 0)
        };

        if ret < 0 {
            return Err(Error::Decode {
                code: ret,
                message: error_string(ret),
            });
        }

        Ok(ret as usize)
    }

    pub fn channels(&self) -> usize {
        self.channels
    }
}

impl Drop for OpusContext {
    fn drop(&mut self) {
        unsafe { opus_decoder_destroy(self.raw.as_ptr()) };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use test_case::test_case;

    #[test_case(8000, 960)]
    #[test_case(12000, 1440)]
    #[test_case(16000, 1920)]
    #[test_case(24000, 2880)]
    #[test_case(48000, 5760)]
    fn test_samples_per_120ms(rate: u32, expected: usize) {
        assert_eq!(samples_per_120ms(rate), expected);
    }

    #[test]
    fn test_supported_sample_rates() {
        for rate in SUPPORTED_SAMPLE_RATES {
            assert!(is_supported_sample_rate(rate));
        }
        for rate in [0, 11025, 22050, 44100, 96000] {
            assert!(!is_supported_sample_rate(rate), "{rate} should be rejected");
        }
    }

    #[test]
    fn test_context_rejects_bad_channel_count() {
        assert!(matches!(
            OpusContext::new(48000, 3),
            Err(Error::DecoderCreate { .. })
        ));
    }

    #[test]
    fn test_context_rejects_bad_sample_rate() {
        assert!(matches!(
            OpusContext::new(44100, 1),
            Err(Error::DecoderCreate { .. })
        ));
    }

    #[test]
    fn test_context_create_stereo() {
        let ctx = OpusContext::new(48000, 2).unwrap();
        assert_eq!(ctx.channels(), 2);
    }

    #[test]
    fn test_error_string_is_not_empty() {
        // OPUS_INVALID_PACKET
        assert!(!error_string(-4).is_empty());
    }
}
