//! Time primitives: pluggable clocks and the timer wheel.
//!
//! This module provides the scheduling half of the transport core:
//! - [`TimerWheel`]: a hashed wheel firing callbacks on the owner thread
//! - [`TimeSource`]: the monotonic nanosecond clock the wheel reads
//!
//! # Virtual vs Wall Time
//!
//! The wheel works against any [`TimeSource`]. Production wheels use
//! [`WallClock`]; tests drive a [`VirtualClock`] so tick processing is
//! deterministic.

mod clock;
mod wheel;

pub use clock::{TimeSource, VirtualClock, WallClock};
pub use wheel::{Timer, TimerState, TimerWheel, TimerWheelError, INITIAL_TICK_DEPTH};
