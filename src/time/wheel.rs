//! Hashed timing wheel for deadline-driven callbacks.
//!
//! Timers hash into one of `ticks_per_wheel` buckets by their deadline
//! tick; a timer further out than one revolution carries a remaining-rounds
//! counter that is decremented on each visit to its bucket. Scheduling and
//! cancellation are O(1); expiry cost is proportional to the depth of the
//! current bucket.
//!
//! Based on the hashed-wheel design of Varghese and Lauck's "Hashed and
//! Hierarchical Timing Wheels".
//!
//! # Ownership
//!
//! The wheel owns all bucket storage; a [`Timer`] handle carries only its
//! bucket and slot indices plus shared observable state, so removal is a
//! slot write with no linked-list surgery. Buckets grow one slot at a time
//! when full and never shrink; freed slots are reused by later scheduling
//! calls, which keeps the steady state allocation-free.
//!
//! # Threading
//!
//! A wheel is single-threaded: scheduling, cancellation and expiry all
//! happen on the owner thread, callbacks run synchronously inside
//! [`expire_timers`][TimerWheel::expire_timers], and the types are
//! deliberately not `Send`.
//!
//! # Caveats
//!
//! Timers expiring in the same tick are not ordered with one another; with
//! normal tick sizes some timers will fire out of deadline order within a
//! tick. A fired timer is unreferenced from the wheel without a state
//! transition, so its handle still reads as active afterwards.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;
use std::sync::Arc;
use std::time::Duration;

use crate::time::clock::{TimeSource, WallClock};

/// Initial number of slots in each wheel bucket.
pub const INITIAL_TICK_DEPTH: usize = 16;

/// Invalid timer wheel configuration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TimerWheelError {
    /// The bucket count does not support mask indexing.
    #[error("ticks_per_wheel must be a power of two and at least 2: ticks_per_wheel={ticks_per_wheel}")]
    TicksPerWheelNotPowerOfTwo {
        /// The offending bucket count.
        ticks_per_wheel: usize,
    },

    /// A zero tick duration cannot index the wheel.
    #[error("tick duration must be non-zero")]
    ZeroTickDuration,

    /// One revolution of the wheel would overflow the signed 64-bit range.
    #[error(
        "tick duration of {tick_duration_nanos}ns too large: must be below {max_nanos}ns for {ticks_per_wheel} ticks"
    )]
    IntervalOverflow {
        /// The offending tick duration in nanoseconds.
        tick_duration_nanos: u128,
        /// The bucket count the duration was checked against.
        ticks_per_wheel: usize,
        /// The exclusive upper bound for the tick duration.
        max_nanos: u64,
    },
}

/// Lifecycle state observable on a [`Timer`] handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerState {
    /// Scheduled, or already fired: expiry does not transition state.
    Active,
    /// Cancelled before firing.
    Cancelled,
}

struct TimerInner {
    deadline: u64,
    wheel_index: usize,
    tick_index: Cell<Option<usize>>,
    remaining_rounds: Cell<i64>,
    state: Cell<TimerState>,
    task: RefCell<Box<dyn FnMut()>>,
}

/// Handle to a scheduled timer.
///
/// Cancellation goes through the owning wheel
/// ([`TimerWheel::cancel`]); the handle itself only observes state.
/// Expiry removes the timer from the wheel without changing its state, so
/// [`is_active`][Self::is_active] keeps returning `true` for a timer that
/// has already fired unless the owner also cancels it.
#[derive(Clone)]
pub struct Timer {
    inner: Rc<TimerInner>,
}

impl Timer {
    /// The absolute deadline in nanoseconds since wheel start.
    #[must_use]
    pub fn deadline_nanos(&self) -> u64 {
        self.inner.deadline
    }

    /// True while the timer has not been cancelled (including after it has
    /// fired; see the type docs).
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.inner.state.get() == TimerState::Active
    }

    /// True once the timer has been cancelled.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.inner.state.get() == TimerState::Cancelled
    }
}

impl fmt::Debug for Timer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Timer")
            .field("wheel_index", &self.inner.wheel_index)
            .field("tick_index", &self.inner.tick_index.get())
            .field("deadline", &self.inner.deadline)
            .field("remaining_rounds", &self.inner.remaining_rounds.get())
            .field("state", &self.inner.state.get())
            .finish()
    }
}

/// Hashed timing wheel scheduling callbacks on the owner thread.
///
/// Not thread safe; timers fire on the processing thread that drives
/// [`expire_timers`][Self::expire_timers]. Low (or no) garbage in steady
/// state.
pub struct TimerWheel {
    mask: u64,
    start_time: u64,
    tick_duration_nanos: u64,
    time_source: Arc<dyn TimeSource>,
    wheel: Vec<Vec<Option<Rc<TimerInner>>>>,
    current_tick: u64,
    active_count: usize,
}

impl TimerWheel {
    /// Creates a wheel over the platform monotonic clock.
    ///
    /// # Panics
    ///
    /// Panics on an invalid configuration. Use [`try_new`][Self::try_new]
    /// for a non-panicking version.
    #[must_use]
    pub fn new(tick_duration: Duration, ticks_per_wheel: usize) -> Self {
        Self::try_new(tick_duration, ticks_per_wheel).expect("invalid timer wheel configuration")
    }

    /// Creates a wheel over the platform monotonic clock, validating the
    /// configuration.
    pub fn try_new(
        tick_duration: Duration,
        ticks_per_wheel: usize,
    ) -> Result<Self, TimerWheelError> {
        Self::with_time_source(Arc::new(WallClock::new()), tick_duration, ticks_per_wheel)
    }

    /// Creates a wheel over an injected time source.
    ///
    /// `ticks_per_wheel` must be a power of two no smaller than 2 so slots
    /// can be indexed with a bitmask; `tick_duration` must be non-zero and
    /// one full revolution must fit in the signed 64-bit nanosecond range.
    pub fn with_time_source(
        time_source: Arc<dyn TimeSource>,
        tick_duration: Duration,
        ticks_per_wheel: usize,
    ) -> Result<Self, TimerWheelError> {
        if ticks_per_wheel < 2 || !ticks_per_wheel.is_power_of_two() {
            return Err(TimerWheelError::TicksPerWheelNotPowerOfTwo { ticks_per_wheel });
        }

        let tick_duration_nanos = tick_duration.as_nanos();
        if tick_duration_nanos == 0 {
            return Err(TimerWheelError::ZeroTickDuration);
        }
        let max_nanos = i64::MAX as u64 / ticks_per_wheel as u64;
        if tick_duration_nanos >= u128::from(max_nanos) {
            return Err(TimerWheelError::IntervalOverflow {
                tick_duration_nanos,
                ticks_per_wheel,
                max_nanos,
            });
        }

        let start_time = time_source.nanos();
        let wheel = (0..ticks_per_wheel)
            .map(|_| vec![None; INITIAL_TICK_DEPTH])
            .collect();
        tracing::debug!(
            tick_duration_nanos = tick_duration_nanos as u64,
            ticks_per_wheel,
            "timer wheel created"
        );

        Ok(Self {
            mask: (ticks_per_wheel - 1) as u64,
            start_time,
            tick_duration_nanos: tick_duration_nanos as u64,
            time_source,
            wheel,
            current_tick: 0,
            active_count: 0,
        })
    }

    /// Nanoseconds elapsed since the wheel was constructed.
    #[must_use]
    pub fn current_time(&self) -> u64 {
        self.time_source.nanos().saturating_sub(self.start_time)
    }

    /// The configured tick duration in nanoseconds.
    #[must_use]
    pub fn tick_duration_nanos(&self) -> u64 {
        self.tick_duration_nanos
    }

    /// The number of buckets in the wheel.
    #[must_use]
    pub fn ticks_per_wheel(&self) -> usize {
        self.wheel.len()
    }

    /// The number of ticks processed so far.
    #[must_use]
    pub fn current_tick(&self) -> u64 {
        self.current_tick
    }

    /// The number of timers currently referenced by wheel slots.
    #[must_use]
    pub fn active_timer_count(&self) -> usize {
        self.active_count
    }

    /// The slot capacity of the bucket at `wheel_index`. Diagnostic; bucket
    /// capacity grows on demand and never decreases.
    #[must_use]
    pub fn slot_depth(&self, wheel_index: usize) -> usize {
        self.wheel[wheel_index].len()
    }

    /// Schedules `task` to run once `delay` has elapsed.
    ///
    /// A delay that lands at or before the current tick is placed in the
    /// current slot and fires on the next
    /// [`expire_timers`][Self::expire_timers] call rather than in the past.
    /// Timers expiring in the same tick fire in slot order, not deadline
    /// order.
    pub fn new_timeout(&mut self, delay: Duration, task: impl FnMut() + 'static) -> Timer {
        let deadline = self.current_time() + delay.as_nanos() as u64;
        let calculated_index = deadline / self.tick_duration_nanos;
        let ticks = calculated_index.max(self.current_tick);
        let wheel_index = (ticks & self.mask) as usize;
        let remaining_rounds =
            (calculated_index as i64 - self.current_tick as i64) / self.wheel.len() as i64;

        let inner = Rc::new(TimerInner {
            deadline,
            wheel_index,
            tick_index: Cell::new(None),
            remaining_rounds: Cell::new(remaining_rounds),
            state: Cell::new(TimerState::Active),
            task: RefCell::new(Box::new(task)),
        });

        let bucket = &mut self.wheel[wheel_index];
        let tick_index = match bucket.iter().position(Option::is_none) {
            Some(free) => free,
            None => {
                bucket.push(None);
                bucket.len() - 1
            }
        };
        bucket[tick_index] = Some(Rc::clone(&inner));
        inner.tick_index.set(Some(tick_index));
        self.active_count += 1;

        Timer { inner }
    }

    /// Milliseconds until the next tick boundary, rounded up.
    ///
    /// Zero or negative when the wheel has fallen behind; callers typically
    /// treat a non-positive value as "tick now".
    #[must_use]
    pub fn calculate_delay_in_msec(&self) -> i64 {
        let deadline = self.tick_duration_nanos * (self.current_tick + 1);

        (deadline as i64 - self.current_time() as i64 + 999_999) / 1_000_000
    }

    /// Processes the current slot, firing expired timers, then advances the
    /// tick.
    ///
    /// A timer with rounds remaining is decremented and left in place
    /// without inspecting its deadline, even if that deadline has already
    /// passed; it is reconsidered one revolution later. A timer with no
    /// rounds left is removed from the slot, then its task runs if its
    /// deadline has arrived; otherwise it is dropped without firing.
    ///
    /// A task panic propagates to the caller. The panicking timer was
    /// removed before its task ran, so re-entering does not fire it twice,
    /// but later timers in the slot are not processed and the tick does not
    /// advance until a call completes normally.
    pub fn expire_timers(&mut self) {
        let slot_index = (self.current_tick & self.mask) as usize;
        let now = self.current_time();

        for tick_index in 0..self.wheel[slot_index].len() {
            let Some(timer) = self.wheel[slot_index][tick_index].clone() else {
                continue;
            };

            if timer.remaining_rounds.get() <= 0 {
                self.wheel[slot_index][tick_index] = None;
                timer.tick_index.set(None);
                self.active_count -= 1;

                if timer.deadline <= now {
                    let mut task = timer.task.borrow_mut();
                    (*task)();
                }
            } else {
                timer.remaining_rounds.set(timer.remaining_rounds.get() - 1);
            }
        }

        self.current_tick += 1;
    }

    /// Cancels a pending timer. Idempotent; always reports success.
    ///
    /// Once this returns, the task will not be invoked by any subsequent
    /// [`expire_timers`][Self::expire_timers] call. Cancelling a timer that
    /// already fired flips its observable state but touches no slot (a
    /// fired timer holds no slot reference, so a reused slot is never
    /// clobbered).
    pub fn cancel(&mut self, timer: &Timer) -> bool {
        if timer.is_active() {
            self.remove(timer);
            timer.inner.state.set(TimerState::Cancelled);
        }

        true
    }

    fn remove(&mut self, timer: &Timer) {
        if let Some(tick_index) = timer.inner.tick_index.take() {
            self.wheel[timer.inner.wheel_index][tick_index] = None;
            self.active_count -= 1;
        }
    }
}

impl fmt::Debug for TimerWheel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TimerWheel")
            .field("tick_duration_nanos", &self.tick_duration_nanos)
            .field("ticks_per_wheel", &self.wheel.len())
            .field("current_tick", &self.current_tick)
            .field("active_count", &self.active_count)
            .finish_non_exhaustive()
    }
}
