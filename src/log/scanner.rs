//! Cursor that scans a log buffer for batches of published frames.

use crate::buffer::AtomicBuffer;
use crate::log::descriptor;
use crate::log::frame::{self, FRAME_ALIGNMENT, PADDING_FRAME_TYPE};
use crate::log::LogBufferError;

/// Seek target lies outside the published region of the log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("invalid offset {offset}: valid range is 0..={tail}")]
pub struct SeekError {
    /// The requested offset.
    pub offset: usize,
    /// The tail observed at the time of the seek.
    pub tail: usize,
}

/// Cursor that reads ranges of whole frames out of a log buffer as they
/// become available behind the advancing tail.
///
/// The scanner assumes the log is built append-only with no gaps: one
/// external producer writes frames, publishes each frame's length with
/// release semantics, and advances the tail counter in the state buffer.
/// Each `scan_next` call reports at most one contiguous byte range of
/// fully-published frames, capped by the caller's limit (typically an MTU).
///
/// A scanner is single-reader state: it is not thread safe, and every
/// reader thread must own its own instance over shared buffer views.
#[derive(Debug)]
pub struct LogScanner {
    log_buffer: AtomicBuffer,
    state_buffer: AtomicBuffer,
    aligned_header_length: usize,
    capacity: usize,
    offset: usize,
}

impl LogScanner {
    /// Creates a scanner over a log buffer and its companion state buffer.
    ///
    /// `header_length` is the length of the frame header that precedes each
    /// payload. Validation failures are [`LogBufferError`] values: the log
    /// capacity must be a positive multiple of [`FRAME_ALIGNMENT`], the
    /// state buffer must hold the tail counter, and the header length must
    /// be word aligned.
    pub fn new(
        log_buffer: AtomicBuffer,
        state_buffer: AtomicBuffer,
        header_length: usize,
    ) -> Result<Self, LogBufferError> {
        descriptor::check_log_buffer(&log_buffer)?;
        descriptor::check_state_buffer(&state_buffer)?;
        descriptor::check_header_length(header_length)?;

        let capacity = log_buffer.capacity();
        let aligned_header_length = frame::align(header_length, FRAME_ALIGNMENT);
        tracing::debug!(capacity, header_length, "log scanner created");

        Ok(Self {
            log_buffer,
            state_buffer,
            aligned_header_length,
            capacity,
            offset: 0,
        })
    }

    /// The capacity of the underlying log buffer in bytes.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// The offset at which the next frame begins.
    #[must_use]
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// True once the cursor has consumed the entire log.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.offset >= self.capacity
    }

    /// Scans forward for available frames, reporting at most `limit` bytes.
    ///
    /// On success the `handler` is invoked at most once with the byte range
    /// `(offset, length)` of a batch of whole, published, non-padding-slack
    /// frames in append order, and the cursor advances past the batch (and
    /// past any trailing padding slack, which is consumed but never
    /// reported). Returns the number of frames in the batch.
    ///
    /// If the next frame's header is not yet published this call spins
    /// until it is. If the first available frame alone exceeds `limit`, no
    /// range is reported, the cursor does not move, and 0 is returned; the
    /// caller must retry with a larger limit. `limit` is expected to be at
    /// least the aligned header length.
    pub fn scan_next<H>(&mut self, limit: usize, handler: H) -> usize
    where
        H: FnOnce(usize, usize),
    {
        let mut frame_count = 0;

        if !self.is_complete() {
            let tail = self.tail();
            let base = self.offset;

            if tail > base {
                let mut length = 0;
                let mut padding = 0;

                loop {
                    let frame_length =
                        frame::wait_for_frame_length(&self.log_buffer, base + length);
                    let mut aligned_frame_length = frame::align(frame_length, FRAME_ALIGNMENT);

                    if frame::frame_type(&self.log_buffer, base + length) == PADDING_FRAME_TYPE {
                        padding = aligned_frame_length - self.aligned_header_length;
                        aligned_frame_length = self.aligned_header_length;
                    }

                    length += aligned_frame_length;

                    if length > limit {
                        length -= aligned_frame_length;
                        break;
                    }

                    frame_count += 1;

                    if base + length + padding >= tail {
                        break;
                    }
                }

                if length > 0 {
                    self.offset = base + length + padding;
                    handler(base, length);
                }
            }
        }

        frame_count
    }

    /// Repositions the cursor for the next scan.
    ///
    /// The target may be any byte offset up to the currently published
    /// tail; alignment is the caller's responsibility. Fails with a
    /// [`SeekError`] carrying both values when the target lies beyond the
    /// tail.
    pub fn seek(&mut self, offset: usize) -> Result<(), SeekError> {
        let tail = self.tail();
        if offset > tail {
            return Err(SeekError { offset, tail });
        }

        tracing::trace!(offset, tail, "scanner seek");
        self.offset = offset;
        Ok(())
    }

    fn tail(&self) -> usize {
        descriptor::tail_volatile(&self.state_buffer)
    }
}
