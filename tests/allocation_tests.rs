#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]

//! Every constructor paired with its destructor returns all memory.
//!
//! Kept in its own test binary: the counting allocator is process wide.
//! libopus state lives on the C heap and is not counted here; its release
//! is covered by the single `opus_decoder_destroy` in `OpusContext::drop`.

mod common;

use std::alloc::{GlobalAlloc, Layout, System};
use std::cell::Cell;

use common::{encode_packet, MALFORMED_PACKET};
use opus_decoder_core::ffi::*;

struct CountingAllocator;

thread_local! {
    static LIVE_BYTES: Cell<isize> = const { Cell::new(0) };
}

unsafe impl GlobalAlloc for CountingAllocator {
    unsafe fn alloc(&self, layout: Layout) -> *mut u8 {
        let ptr = System.alloc(layout);
        if !ptr.is_null() {
            let _ = LIVE_BYTES.try_with(|live| live.set(live.get() + layout.size() as isize));
        }
        ptr
    }

    unsafe fn dealloc(&self, ptr: *mut u8, layout: Layout) {
        let _ = LIVE_BYTES.try_with(|live| live.set(live.get() - layout.size() as isize));
        System.dealloc(ptr, layout);
    }
}

#[global_allocator]
static GLOBAL: CountingAllocator = CountingAllocator;

fn live_bytes() -> isize {
    LIVE_BYTES.with(Cell::get)
}

unsafe fn immediate_cycle(packet: &[u8]) {
    let dec = Decoder_new(2, 48000);
    Decoder_decode(dec, packet.as_ptr(), packet.len());
    Decoder_decode(dec, MALFORMED_PACKET.as_ptr(), MALFORMED_PACKET.len());
    Decoder_decode(dec, packet.as_ptr(), 0);
    let _ = Decoder_get_channel_data(dec, 0);
    Decoder_delete(dec);

    let buffer = Float32Array_new();
    Float32Array_delete(buffer);
}

unsafe fn queued_cycle(packet: &[u8]) {
    let dec = Decoder_new_queued(2, 48000);
    let channel_data = ChannelData_new();
    Decoder_input(dec, packet.as_ptr(), packet.len());
    Decoder_input(dec, packet.as_ptr(), packet.len());
    Decoder_output(dec, channel_data);
    // Second packet stays queued and must be freed with the decoder
    ChannelData_delete(channel_data);
    Decoder_delete(dec);
}

unsafe fn invalid_cycle(packet: &[u8]) {
    let dec = Decoder_new(1, 44100);
    Decoder_decode(dec, packet.as_ptr(), packet.len());
    Decoder_delete(dec);
}

#[test]
fn test_create_destroy_cycles_do_not_leak() {
    let packet = encode_packet(48000, 2, 960);

    unsafe {
        // Warm up once so one-time lazy initialisation is not counted
        immediate_cycle(&packet);
        queued_cycle(&packet);
        invalid_cycle(&packet);

        let before = live_bytes();
        for _ in 0..4 {
            immediate_cycle(&packet);
            queued_cycle(&packet);
            invalid_cycle(&packet);
        }
        assert_eq!(live_bytes(), before);
    }
}
