//! Layout of the log buffer and its companion state buffer.
//!
//! The log buffer holds the frames themselves. The state buffer is a small
//! side region through which the producer publishes progress: the scanner
//! reads only the tail counter; the remaining positions belong to external
//! collaborators (publisher limits, high-water marks) and are opaque here.

use crate::buffer::AtomicBuffer;
use crate::log::frame::FRAME_ALIGNMENT;

/// Byte offset of the tail counter in the state buffer.
///
/// The tail is the byte offset immediately past the last published frame,
/// written with release semantics by the producer.
pub const TAIL_COUNTER_OFFSET: usize = 0;

/// Byte offset of the high-water mark in the state buffer. Maintained by
/// external collaborators; not read by the scanner.
pub const HIGH_WATER_MARK_OFFSET: usize = 4;

/// Minimum capacity of a state buffer.
pub const STATE_BUFFER_LENGTH: usize = 8;

/// Construction-time validation failures for scanner buffers.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LogBufferError {
    /// Log capacity is zero or not a multiple of the frame alignment.
    #[error("log capacity must be a positive multiple of the frame alignment: capacity={capacity}")]
    LogCapacityNotAligned {
        /// The offending capacity.
        capacity: usize,
    },

    /// State buffer cannot hold the producer counters.
    #[error("state buffer too small: capacity={capacity}, required={required}")]
    StateBufferTooSmall {
        /// The offending capacity.
        capacity: usize,
        /// The minimum required capacity.
        required: usize,
    },

    /// Frame header length is not word aligned.
    #[error("frame header length must be a multiple of 4: header_length={header_length}")]
    HeaderLengthNotAligned {
        /// The offending header length.
        header_length: usize,
    },
}

/// Validates a log buffer: positive capacity, aligned to frame boundaries.
pub fn check_log_buffer(buffer: &AtomicBuffer) -> Result<(), LogBufferError> {
    let capacity = buffer.capacity();
    if capacity == 0 || capacity % FRAME_ALIGNMENT != 0 {
        return Err(LogBufferError::LogCapacityNotAligned { capacity });
    }
    Ok(())
}

/// Validates a state buffer: large enough for the producer counters.
pub fn check_state_buffer(buffer: &AtomicBuffer) -> Result<(), LogBufferError> {
    let capacity = buffer.capacity();
    if capacity < STATE_BUFFER_LENGTH {
        return Err(LogBufferError::StateBufferTooSmall {
            capacity,
            required: STATE_BUFFER_LENGTH,
        });
    }
    Ok(())
}

/// Validates a frame header length: must keep header fields word addressable.
pub fn check_header_length(header_length: usize) -> Result<(), LogBufferError> {
    if header_length % 4 != 0 {
        return Err(LogBufferError::HeaderLengthNotAligned { header_length });
    }
    Ok(())
}

/// Acquire read of the tail counter.
#[must_use]
pub fn tail_volatile(state_buffer: &AtomicBuffer) -> usize {
    state_buffer.get_u32_volatile(TAIL_COUNTER_OFFSET) as usize
}

/// Release write of the tail counter. Producer side.
pub fn set_tail_ordered(state_buffer: &AtomicBuffer, tail: u32) {
    state_buffer.put_u32_ordered(TAIL_COUNTER_OFFSET, tail);
}
