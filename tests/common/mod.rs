#![allow(dead_code)]

use std::f32::consts::TAU;

/// Invalid per RFC 6716: a code 3 packet announcing zero frames.
pub const MALFORMED_PACKET: [u8; 5] = [0xFB, 0x00, 0x00, 0x00, 0x00];

/// Interleaved sine tone, each channel at its own frequency.
pub fn tone(sample_rate: u32, channels: u32, frames: usize, offset: usize) -> Vec<f32> {
    (0..frames)
        .flat_map(|i| {
            (0..channels).map(move |ch| {
                let freq = 440.0 * (ch + 1) as f32;
                let t = (i + offset) as f32 / sample_rate as f32;
                (t * freq * TAU).sin() * 0.5
            })
        })
        .collect()
}

/// Encode `frames` frames of tone into a single Opus packet.
pub fn encode_packet(sample_rate: u32, channels: u32, frames: usize) -> Vec<u8> {
    let mut encoder = new_encoder(sample_rate, channels);
    encoder
        .encode_vec_float(&tone(sample_rate, channels, frames, 0), 4000)
        .unwrap()
}

/// Consecutive packets of one stream, `frames` frames each.
pub fn encode_stream(sample_rate: u32, channels: u32, frames: usize, count: usize) -> Vec<Vec<u8>> {
    let mut encoder = new_encoder(sample_rate, channels);
    (0..count)
        .map(|n| {
            encoder
                .encode_vec_float(&tone(sample_rate, channels, frames, n * frames), 4000)
                .unwrap()
        })
        .collect()
}

fn new_encoder(sample_rate: u32, channels: u32) -> opus::Encoder {
    let channels = if channels == 1 {
        opus::Channels::Mono
    } else {
        opus::Channels::Stereo
    };
    opus::Encoder::new(sample_rate, channels, opus::Application::Audio).unwrap()
}

/// Interleaved output of a fresh reference decoder for `packet`.
pub fn reference_decode(sample_rate: u32, channels: u32, packet: &[u8]) -> Vec<f32> {
    let ch = if channels == 1 {
        opus::Channels::Mono
    } else {
        opus::Channels::Stereo
    };
    let mut decoder = opus::Decoder::new(sample_rate, ch).unwrap();
    let mut pcm = vec![0.0; 5760 * channels as usize];
    let frames = decoder.decode_float(packet, &mut pcm, false).unwrap();
    pcm.truncate(frames * channels as usize);
    pcm
}
