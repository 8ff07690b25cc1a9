//! Spindle: log-buffer scanning and timer-wheel primitives for messaging transports.
//!
//! # Overview
//!
//! Spindle provides the two hard-engineering cores of a high-throughput
//! messaging transport: a lock-free cursor over an append-only framed log
//! shared with a producer, and a hashed timing wheel for scheduling
//! short-lived timers (retransmits, heartbeats, session timeouts) on the
//! processing thread. Both are usable on their own.
//!
//! # Core Guarantees
//!
//! - **Lock-free scanning**: the scanner trails a release-published tail
//!   counter with acquire loads and a bounded spin on in-flight frames; the
//!   producer never takes a reader-visible lock
//! - **Whole frames, in order**: `scan_next` reports one contiguous range of
//!   fully-published frames per call, in strict append order, with padding
//!   slack consumed but never exposed
//! - **O(1) timers**: scheduling and cancellation are constant-time; bucket
//!   storage grows on demand and is reused, never shrunk
//! - **Single ownership**: a scanner belongs to one reader thread and a
//!   wheel to one owner thread; the wheel is not `Send`, so the compiler
//!   enforces what the contract states
//!
//! # Module Structure
//!
//! - [`buffer`]: [`AtomicBuffer`], a word-atomic shared byte region
//! - [`log`]: frame descriptor, log-buffer layout, and the [`log::LogScanner`]
//! - [`time`]: time sources and the [`time::TimerWheel`]
//! - [`test_utils`]: logging-based test harness helpers

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_const_for_fn)]
#![allow(clippy::doc_markdown)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_possible_wrap)]
#![allow(clippy::cast_sign_loss)]

pub mod buffer;
pub mod log;
pub mod test_utils;
pub mod time;

pub use buffer::AtomicBuffer;
pub use log::{LogBufferError, LogScanner, SeekError};
pub use time::{
    TimeSource, Timer, TimerState, TimerWheel, TimerWheelError, VirtualClock, WallClock,
};
