#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]

//! Opus Decoder Core
//!
//! A minimal binding layer that drives a libopus decoder on behalf of a
//! host that can only exchange flat buffers and opaque handles (WASM,
//! JNI, plain C). Packets go in, per-channel `f32` buffers come out.
//!
//! The Rust API lives in [`Decoder`], [`SampleBuffer`] and
//! [`ChannelData`]; the C ABI in [`ffi`].

#![allow(non_snake_case)]

pub mod channel_data;
pub mod decoder;
pub mod error;
pub mod ffi;
pub mod opus;
pub mod sample_buffer;
#[cfg_attr(not(feature = "decode-timing"), allow(dead_code))]
mod timing;

pub use channel_data::ChannelData;
pub use decoder::{Decoder, DecoderConfig, Delivery};
pub use error::{Error, Result};
pub use sample_buffer::SampleBuffer;

use log::LevelFilter;
use once_cell::sync::OnceCell;
use std::panic;

static INIT: OnceCell<()> = OnceCell::new();

#[cfg(target_os = "android")]
fn install_logger() {
    android_logger::init_once(
        android_logger::Config::default()
            .with_max_level(LevelFilter::Debug)
            .with_tag("opus-decoder-core"),
    );
}

#[cfg(not(target_os = "android"))]
fn install_logger() {
    // A host or test harness may already have installed a logger.
    let _ = env_logger::Builder::new()
        .filter_level(LevelFilter::Info)
        .parse_default_env()
        .try_init();
}

/// Initialize logging (called from the host once, before the first decoder)
pub fn init_logging() {
    INIT.get_or_init(|| {
        install_logger();

        // Panics must never unwind into the host; log them before aborting
        panic::set_hook(Box::new(|panic_info| {
            let msg = if let Some(s) = panic_info.payload().downcast_ref::<&str>() {
                s.to_string()
            } else if let Some(s) = panic_info.payload().downcast_ref::<String>() {
                s.clone()
            } else {
                "Unknown panic".to_string()
            };

            let location = if let Some(loc) = panic_info.location() {
                format!("{}:{}:{}", loc.file(), loc.line(), loc.column())
            } else {
                "unknown location".to_string()
            };

            log::error!("RUST PANIC: {} at {}", msg, location);
        }));

        log::info!("Opus decoder core initialized");
    });
}
