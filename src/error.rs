use thiserror::Error;

/// Decoder errors.
///
/// None of these ever cross the C ABI; the surface in [`crate::ffi`]
/// logs them and maps them to `false` or a null pointer.
#[derive(Debug, Error)]
pub enum Error {
    /// Sample rate outside 8000/12000/16000/24000/48000 Hz
    #[error("Unsupported sample rate: {0} Hz")]
    UnsupportedSampleRate(u32),

    /// Channel count of zero
    #[error("Invalid channel count: {0}")]
    InvalidChannelCount(u32),

    /// libopus refused to create a decoder state
    #[error("Failed to create opus decoder (errcode {code}: {message})")]
    DecoderCreate { code: i32, message: String },

    /// The decoder was constructed without a usable codec context
    #[error("Decoder has no codec context")]
    NoContext,

    /// `opus_decode_float` returned a negative error code
    #[error("Decoding failed (errcode {code}: {message})")]
    Decode { code: i32, message: String },

    /// Packet longer than libopus can address
    #[error("Packet too large: {0} bytes")]
    PacketTooLarge(usize),

    /// Queue operation on a decoder in immediate delivery mode
    #[error("Decoder is not in queued delivery mode")]
    NotQueued,

    /// `output` called with no packet waiting
    #[error("Packet queue is empty")]
    QueueEmpty,
}

/// Result type for decoder operations.
pub type Result<T> = std::result::Result<T, Error>;
