//! Log Scanner Verification Suite - E2E Tests
//!
//! End-to-end coverage for the log-buffer scanning pipeline against a live
//! producer, ensuring the release/acquire publication handshake and batch
//! delivery contract hold under real threading.
//!
//! Test categories:
//! 1. Concurrent producer streaming
//! 2. MTU-bounded batch delivery
//! 3. Seek and rescan determinism

#[macro_use]
mod common;

use common::*;
use spindle::log::descriptor::{self, STATE_BUFFER_LENGTH};
use spindle::log::frame::{self, DATA_FRAME_TYPE, FRAME_ALIGNMENT, PADDING_FRAME_TYPE};
use spindle::{AtomicBuffer, LogScanner};
use std::thread;
use std::time::Duration;

const HEADER_LENGTH: usize = 32;
const CAPACITY: usize = 4096;

/// Deterministic sequence of frame lengths that fills most of a log,
/// leaving room for a final padding frame.
fn frame_plan(capacity: usize) -> Vec<usize> {
    let lengths = [132, 64, 96, 232, 100, 160, 182, 72, 256, 120];
    let mut plan = Vec::new();
    let mut used = 0;
    for &frame_length in lengths.iter().cycle() {
        let stride = frame::align(frame_length, FRAME_ALIGNMENT);
        if used + stride > capacity - 2 * FRAME_ALIGNMENT {
            break;
        }
        plan.push(frame_length);
        used += stride;
    }
    plan
}

fn payload_seed(index: usize) -> u8 {
    (index % 251) as u8 + 1
}

/// Appends the whole plan plus a closing padding frame, publishing each
/// frame with release semantics and advancing the tail.
fn produce_all(log: &AtomicBuffer, state: &AtomicBuffer, plan: &[usize], throttle: bool) {
    let mut offset = 0;
    for (index, &frame_length) in plan.iter().enumerate() {
        let payload = vec![payload_seed(index); frame_length - HEADER_LENGTH];
        log.put_bytes(offset + HEADER_LENGTH, &payload);
        frame::set_frame_type(log, offset, DATA_FRAME_TYPE);
        frame::set_frame_length_ordered(log, offset, frame_length as u32);
        offset += frame::align(frame_length, FRAME_ALIGNMENT);
        descriptor::set_tail_ordered(state, offset as u32);

        if throttle && index % 4 == 0 {
            thread::sleep(Duration::from_micros(200));
        }
    }

    let padding_length = log.capacity() - offset;
    frame::set_frame_type(log, offset, PADDING_FRAME_TYPE);
    frame::set_frame_length_ordered(log, offset, padding_length as u32);
    descriptor::set_tail_ordered(state, log.capacity() as u32);
}

/// Walks the frames inside an emitted range, checking payload contents
/// against the plan. Returns the number of data frames visited.
fn verify_range(
    log: &AtomicBuffer,
    plan: &[usize],
    frame_offsets: &[usize],
    start: usize,
    length: usize,
) -> usize {
    let mut data_frames = 0;
    let mut position = start;
    let end = start + length;
    while position < end {
        let frame_length = log.get_u32(position) as usize;
        if frame::frame_type(log, position) == PADDING_FRAME_TYPE {
            // Only the aligned header of a padding frame may appear, and
            // only as the final element of a range.
            assert_eq!(position + HEADER_LENGTH, end, "padding header not terminal");
            position += HEADER_LENGTH;
            continue;
        }

        let index = frame_offsets
            .iter()
            .position(|&at| at == position)
            .unwrap_or_else(|| panic!("no planned frame starts at {position}"));
        assert_eq!(plan[index], frame_length, "frame length at {position}");

        let payload = log.get_bytes(position + HEADER_LENGTH, frame_length - HEADER_LENGTH);
        assert!(
            payload.iter().all(|&byte| byte == payload_seed(index)),
            "payload of frame {index} corrupted"
        );

        data_frames += 1;
        position += frame::align(frame_length, FRAME_ALIGNMENT);
    }
    assert_eq!(position, end, "range is not a whole number of frames");
    data_frames
}

fn planned_offsets(plan: &[usize]) -> Vec<usize> {
    let mut offsets = Vec::with_capacity(plan.len());
    let mut at = 0;
    for &frame_length in plan {
        offsets.push(at);
        at += frame::align(frame_length, FRAME_ALIGNMENT);
    }
    offsets
}

// ============================================================================
// 1. Concurrent Producer Streaming
// ============================================================================

#[test]
fn scanner_consumes_a_live_producer() {
    init_test("scanner_consumes_a_live_producer");

    let log = AtomicBuffer::new(CAPACITY);
    let state = AtomicBuffer::new(STATE_BUFFER_LENGTH);
    let plan = frame_plan(CAPACITY);
    let offsets = planned_offsets(&plan);

    let producer = {
        let log = log.clone();
        let state = state.clone();
        let plan = plan.clone();
        thread::spawn(move || produce_all(&log, &state, &plan, true))
    };

    let mut scanner =
        LogScanner::new(log.clone(), state.clone(), HEADER_LENGTH).expect("valid buffers");
    let mut batches: Vec<(usize, usize)> = Vec::new();
    let mut total_frames = 0;
    while !scanner.is_complete() {
        total_frames += scanner.scan_next(512, |offset, length| batches.push((offset, length)));
    }
    producer.join().expect("producer thread");

    // Every planned frame plus the padding header, in order, exactly once.
    assert_with_log!(
        total_frames == plan.len() + 1,
        "frame count including padding header",
        plan.len() + 1,
        total_frames
    );

    let mut expected_start = 0;
    let mut data_frames = 0;
    for &(start, length) in &batches {
        assert_with_log!(start == expected_start, "batches contiguous", expected_start, start);
        assert!(length <= 512, "batch exceeds MTU limit: {length}");
        data_frames += verify_range(&log, &plan, &offsets, start, length);
        expected_start = start + length;
    }
    assert_with_log!(
        data_frames == plan.len(),
        "all data frames delivered once",
        plan.len(),
        data_frames
    );
    assert_with_log!(
        scanner.offset() == CAPACITY,
        "padding slack consumed",
        CAPACITY,
        scanner.offset()
    );
    test_complete!("scanner_consumes_a_live_producer");
}

// ============================================================================
// 2. MTU-Bounded Batch Delivery
// ============================================================================

#[test]
fn batches_never_exceed_the_limit() {
    init_test("batches_never_exceed_the_limit");

    let log = AtomicBuffer::new(CAPACITY);
    let state = AtomicBuffer::new(STATE_BUFFER_LENGTH);
    let plan = frame_plan(CAPACITY);
    produce_all(&log, &state, &plan, false);

    let aligned_header = frame::align(HEADER_LENGTH, FRAME_ALIGNMENT);
    for limit in [256, 320, 512, 1024] {
        let mut scanner =
            LogScanner::new(log.clone(), state.clone(), HEADER_LENGTH).expect("valid buffers");
        while !scanner.is_complete() {
            let before = scanner.offset();
            let mut emitted = None;
            let count = scanner.scan_next(limit, |offset, length| emitted = Some((offset, length)));

            assert!(count > 0, "published log must always make progress");
            let (offset, length) = emitted.expect("a non-empty scan reports a range");
            assert_eq!(offset, before, "range starts at the cursor");
            assert!(length <= limit, "length {length} over limit {limit}");
            assert!(length >= aligned_header, "range smaller than a header");
        }
        assert_with_log!(
            scanner.offset() == CAPACITY,
            "log fully consumed",
            CAPACITY,
            scanner.offset()
        );
    }
    test_complete!("batches_never_exceed_the_limit");
}

// ============================================================================
// 3. Seek and Rescan Determinism
// ============================================================================

#[test]
fn rescan_after_seek_reproduces_the_cover() {
    init_test("rescan_after_seek_reproduces_the_cover");

    let log = AtomicBuffer::new(CAPACITY);
    let state = AtomicBuffer::new(STATE_BUFFER_LENGTH);
    let plan = frame_plan(CAPACITY);
    produce_all(&log, &state, &plan, false);

    let mut scanner =
        LogScanner::new(log.clone(), state.clone(), HEADER_LENGTH).expect("valid buffers");

    let mut first_pass: Vec<(usize, usize)> = Vec::new();
    while !scanner.is_complete() {
        scanner.scan_next(384, |offset, length| first_pass.push((offset, length)));
    }

    scanner.seek(0).expect("tail covers the whole log");
    assert_with_log!(scanner.offset() == 0, "cursor rewound", 0, scanner.offset());

    let mut second_pass: Vec<(usize, usize)> = Vec::new();
    while !scanner.is_complete() {
        scanner.scan_next(384, |offset, length| second_pass.push((offset, length)));
    }

    assert_with_log!(
        first_pass == second_pass,
        "scan cover is deterministic",
        first_pass,
        second_pass
    );
    test_complete!("rescan_after_seek_reproduces_the_cover");
}
