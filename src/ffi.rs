//! Flat C ABI
//!
//! Every object handed to the host is a `Box::into_raw` pointer and must be
//! released by exactly one matching `*_delete` call. Null handles are
//! tolerated and produce `false`, `0` or null. Using a handle after its
//! `*_delete` call is undefined behaviour.
//!
//! Names follow the host-side bindings (`Decoder_*`, `Float32Array_*`,
//! `ChannelData_*`).

use std::ptr;
use std::slice;

use libc::{c_int, c_long};

use crate::channel_data::ChannelData;
use crate::decoder::{Decoder, DecoderConfig, Delivery};
use crate::sample_buffer::SampleBuffer;

/// Host-facing name for [`SampleBuffer`]
pub type Float32Array = SampleBuffer;

#[inline]
fn into_handle<T>(value: T) -> *mut T {
    Box::into_raw(Box::new(value))
}

#[inline]
unsafe fn release<T>(handle: *mut T) {
    if !handle.is_null() {
        drop(Box::from_raw(handle));
    }
}

/// View `len` bytes at `data`; a null `data` reads as an empty packet.
#[inline]
unsafe fn packet<'a>(data: *const u8, len: usize) -> &'a [u8] {
    if data.is_null() || len == 0 {
        &[]
    } else {
        slice::from_raw_parts(data, len)
    }
}

fn new_decoder(channels: c_int, sample_rate: c_long, delivery: Delivery) -> *mut Decoder {
    // Out of range values become 0, which the decoder rejects and logs.
    let config = DecoderConfig {
        channels: u32::try_from(channels).unwrap_or(0),
        sample_rate: u32::try_from(sample_rate).unwrap_or(0),
        delivery,
    };
    into_handle(Decoder::new(config))
}

// Decoder

/// Create a decoder. `channels` and `sample_rate` should match the
/// encoder options. Never returns null.
#[no_mangle]
pub extern "C" fn Decoder_new(channels: c_int, sample_rate: c_long) -> *mut Decoder {
    new_decoder(channels, sample_rate, Delivery::Immediate)
}

/// Create a decoder in queued delivery mode (`Decoder_input` /
/// `Decoder_output`).
#[no_mangle]
pub extern "C" fn Decoder_new_queued(channels: c_int, sample_rate: c_long) -> *mut Decoder {
    new_decoder(channels, sample_rate, Delivery::Queued)
}

#[no_mangle]
pub extern "C" fn Decoder_new_with_delivery(
    channels: c_int,
    sample_rate: c_long,
    queued: bool,
) -> *mut Decoder {
    let delivery = if queued {
        Delivery::Queued
    } else {
        Delivery::Immediate
    };
    new_decoder(channels, sample_rate, delivery)
}

/// # Safety
/// `handle` must come from a `Decoder_new*` call and not be used afterwards.
#[no_mangle]
pub unsafe extern "C" fn Decoder_delete(handle: *mut Decoder) {
    release(handle);
}

/// Decode one packet. A zero length packet asks the codec for loss
/// concealment of the whole 120 ms output bound (5760 frames at 48 kHz);
/// hosts tracking a timeline should read `Decoder_get_decoded_size`.
///
/// # Safety
/// `handle` must be a live decoder; `data` must point to `len` readable
/// bytes or be null.
#[no_mangle]
pub unsafe extern "C" fn Decoder_decode(handle: *mut Decoder, data: *const u8, len: usize) -> bool {
    match handle.as_mut() {
        Some(decoder) => decoder.decode(packet(data, len)).is_ok(),
        None => false,
    }
}

/// Borrowed view of one channel's samples, or null when `index` is not a
/// channel. Valid until the next successful decode or `Decoder_delete`;
/// must not be passed to `Float32Array_delete`.
///
/// # Safety
/// `handle` must be a live decoder or null.
#[no_mangle]
pub unsafe extern "C" fn Decoder_get_channel_data(
    handle: *const Decoder,
    index: usize,
) -> *const Float32Array {
    handle
        .as_ref()
        .and_then(|decoder| decoder.channel(index))
        .map_or(ptr::null(), |buffer| buffer as *const Float32Array)
}

/// # Safety
/// `handle` must be a live decoder or null.
#[no_mangle]
pub unsafe extern "C" fn Decoder_get_channel_count(handle: *const Decoder) -> usize {
    handle.as_ref().map_or(0, Decoder::channels)
}

/// # Safety
/// `handle` must be a live decoder or null.
#[no_mangle]
pub unsafe extern "C" fn Decoder_get_sample_rate(handle: *const Decoder) -> c_long {
    handle
        .as_ref()
        .map_or(0, |decoder| c_long::try_from(decoder.sample_rate()).unwrap_or(0))
}

/// Frames per channel from the last successful decode.
///
/// # Safety
/// `handle` must be a live decoder or null.
#[no_mangle]
pub unsafe extern "C" fn Decoder_get_decoded_size(handle: *const Decoder) -> usize {
    handle.as_ref().map_or(0, Decoder::decoded_size)
}

/// False when the codec context could not be created.
///
/// # Safety
/// `handle` must be a live decoder or null.
#[no_mangle]
pub unsafe extern "C" fn Decoder_is_valid(handle: *const Decoder) -> bool {
    handle.as_ref().is_some_and(Decoder::is_valid)
}

/// Queue a copy of the packet. Ignored (with a warning) on immediate
/// decoders.
///
/// # Safety
/// `handle` must be a live decoder or null; `data` must point to `len`
/// readable bytes or be null.
#[no_mangle]
pub unsafe extern "C" fn Decoder_input(handle: *mut Decoder, data: *const u8, len: usize) {
    if let Some(decoder) = handle.as_mut() {
        let _ = decoder.input(packet(data, len));
    }
}

/// Decode the oldest queued packet and append one `Float32Array` per
/// channel to `out`. False when the queue is empty or the packet fails to
/// decode.
///
/// # Safety
/// `handle` must be a live decoder and `out` a live `ChannelData`, or null.
#[no_mangle]
pub unsafe extern "C" fn Decoder_output(handle: *mut Decoder, out: *mut ChannelData) -> bool {
    match (handle.as_mut(), out.as_mut()) {
        (Some(decoder), Some(out)) => decoder.output(out).is_ok(),
        _ => false,
    }
}

/// # Safety
/// `handle` must be a live decoder or null.
#[no_mangle]
pub unsafe extern "C" fn Decoder_get_pending(handle: *const Decoder) -> usize {
    handle.as_ref().map_or(0, Decoder::pending)
}

// Float32Array

#[no_mangle]
pub extern "C" fn Float32Array_new() -> *mut Float32Array {
    into_handle(Float32Array::new())
}

/// # Safety
/// `handle` must come from `Float32Array_new`. Buffers borrowed from a
/// decoder or a `ChannelData` must not be deleted.
#[no_mangle]
pub unsafe extern "C" fn Float32Array_delete(handle: *mut Float32Array) {
    release(handle);
}

/// # Safety
/// `handle` must be a live buffer or null.
#[no_mangle]
pub unsafe extern "C" fn Float32Array_size(handle: *const Float32Array) -> usize {
    handle.as_ref().map_or(0, Float32Array::len)
}

/// Pointer to the first sample. Dangling (never dereferenceable) for an
/// empty buffer, null for a null handle.
///
/// # Safety
/// `handle` must be a live buffer or null.
#[no_mangle]
pub unsafe extern "C" fn Float32Array_data(handle: *const Float32Array) -> *const f32 {
    handle.as_ref().map_or(ptr::null(), Float32Array::as_ptr)
}

// ChannelData

#[no_mangle]
pub extern "C" fn ChannelData_new() -> *mut ChannelData {
    into_handle(ChannelData::new())
}

/// # Safety
/// `handle` must come from `ChannelData_new` and not be used afterwards.
#[no_mangle]
pub unsafe extern "C" fn ChannelData_delete(handle: *mut ChannelData) {
    release(handle);
}

/// # Safety
/// `handle` must be a live collection or null.
#[no_mangle]
pub unsafe extern "C" fn ChannelData_size(handle: *const ChannelData) -> usize {
    handle.as_ref().map_or(0, ChannelData::len)
}

/// Drop every buffer in the collection. Pointers from `ChannelData_get`
/// become invalid.
///
/// # Safety
/// `handle` must be a live collection or null.
#[no_mangle]
pub unsafe extern "C" fn ChannelData_clear(handle: *mut ChannelData) {
    if let Some(data) = handle.as_mut() {
        data.clear();
    }
}

/// Borrowed buffer at `index`, or null when out of range.
///
/// # Safety
/// `handle` must be a live collection or null.
#[no_mangle]
pub unsafe extern "C" fn ChannelData_get(handle: *const ChannelData, index: usize) -> *const Float32Array {
    handle
        .as_ref()
        .and_then(|data| data.get(index))
        .map_or(ptr::null(), |buffer| buffer as *const Float32Array)
}

// Logging

/// Install the platform logger and panic hook. Safe to call repeatedly.
#[no_mangle]
pub extern "C" fn opus_decoder_core_init_logging() {
    crate::init_logging();
}
