//! Frame descriptor for the log buffer.
//!
//! Every record in the log is a frame: a fixed-layout header followed by an
//! opaque payload, laid down at a [`FRAME_ALIGNMENT`]-aligned offset. The
//! header fields the scanner depends on:
//!
//! ```text
//! byte 0       4     5     6        8
//!      +-------+-----+-----+--------+----------------+
//!      | length| ver |flags| type   | payload ...    |
//!      +-------+-----+-----+--------+----------------+
//! ```
//!
//! - `length` (`u32` little-endian): total frame length including the
//!   header, before alignment. Written last, with release semantics; zero
//!   means the frame is still in flight.
//! - bytes 4..6 carry version and flags; opaque to the scanner.
//! - `type` (`u16` little-endian): [`PADDING_FRAME_TYPE`] marks a filler
//!   frame whose `length` spans the rest of a region the producer could not
//!   use.
//!
//! The read accessors here implement the consumer half of the
//! single-producer handshake: spin on `length` until non-zero (acquire),
//! then read the rest of the header with plain loads.

use crate::buffer::AtomicBuffer;

/// Alignment of every frame boundary in the log. Power of two.
pub const FRAME_ALIGNMENT: usize = 32;

/// Byte offset of the `length` field within a frame header.
pub const LENGTH_FIELD_OFFSET: usize = 0;

/// Byte offset of the `type` field within a frame header.
pub const TYPE_FIELD_OFFSET: usize = 6;

/// Frame type marking a padding frame.
pub const PADDING_FRAME_TYPE: u16 = 0x0000;

/// Frame type for ordinary data frames.
pub const DATA_FRAME_TYPE: u16 = 0x0001;

/// Rounds `value` up to the next multiple of `alignment`.
///
/// `alignment` must be a power of two.
#[must_use]
pub const fn align(value: usize, alignment: usize) -> usize {
    (value + alignment - 1) & !(alignment - 1)
}

/// Byte offset of the `length` field for the frame at `frame_offset`.
#[must_use]
pub const fn length_offset(frame_offset: usize) -> usize {
    frame_offset + LENGTH_FIELD_OFFSET
}

/// Byte offset of the `type` field for the frame at `frame_offset`.
#[must_use]
pub const fn type_offset(frame_offset: usize) -> usize {
    frame_offset + TYPE_FIELD_OFFSET
}

/// Acquire read of the frame length at `frame_offset`.
///
/// Zero means the producer has not yet published the frame.
#[must_use]
pub fn frame_length_volatile(buffer: &AtomicBuffer, frame_offset: usize) -> u32 {
    buffer.get_u32_volatile(length_offset(frame_offset))
}

/// Spins until the frame at `frame_offset` has a published (non-zero)
/// length, then returns it.
///
/// The producer publishes the length with release semantics after the frame
/// body is written, so a non-zero value here makes the whole frame visible.
/// The wait is a pure spin with a pause hint; there is no reader-side
/// signalling path for the producer to block on.
#[must_use]
pub fn wait_for_frame_length(buffer: &AtomicBuffer, frame_offset: usize) -> usize {
    loop {
        let frame_length = frame_length_volatile(buffer, frame_offset);
        if frame_length != 0 {
            return frame_length as usize;
        }
        std::hint::spin_loop();
    }
}

/// Plain read of the frame type at `frame_offset`.
///
/// Only valid after a non-zero length has been observed for this frame.
#[must_use]
pub fn frame_type(buffer: &AtomicBuffer, frame_offset: usize) -> u16 {
    buffer.get_u16(type_offset(frame_offset))
}

/// Publishes the frame at `frame_offset` by storing its total length with
/// release semantics. Producer side of the handshake; write the body and
/// type first.
pub fn set_frame_length_ordered(buffer: &AtomicBuffer, frame_offset: usize, frame_length: u32) {
    buffer.put_u32_ordered(length_offset(frame_offset), frame_length);
}

/// Plain write of the frame type at `frame_offset`. Producer side; precedes
/// the length publish.
pub fn set_frame_type(buffer: &AtomicBuffer, frame_offset: usize, frame_type: u16) {
    buffer.put_u16(type_offset(frame_offset), frame_type);
}
