//! Wraparound-safe countdown timers over a free-running hardware tick counter.
//!
//! A [`TimerService`] reads a [`TickSource`] and knows how many ticks make one
//! microsecond ([`Calibration`]). Each state machine owns its own [`Countdown`] and
//! hands it to [`TimerService::poll`] once per control-loop pass. Nothing here ever
//! waits: `poll` reads the counter, compares, and returns.
//!
//! A countdown of `period_units` quanta of `quantum_us` microseconds fires once, after
//! the last quantum elapses:
//!
//! ```text
//!  start ──q──┬──q──┬──q──┐
//!             │     │     └─ poll() == true   (remaining 3 → 0)
//!             │     └─ quantum re-armed       (remaining 2)
//!             └─ quantum re-armed             (remaining 1)
//! ```

use crate::{Error, Result};

/// Microseconds per millisecond, the quantum used by [`TimerService::start_ms`].
pub const MICROS_PER_MILLI: u32 = 1_000;

const HZ_PER_MHZ: u32 = 1_000_000;

/// A free-running, wrapping 32-bit tick counter.
///
/// Reading the counter must have no side effects. The counter is allowed to wrap
/// from `u32::MAX` back to zero at any time.
pub trait TickSource {
    /// Current counter value.
    fn now(&self) -> u32;
}

impl<T: TickSource + ?Sized> TickSource for &T {
    fn now(&self) -> u32 {
        (**self).now()
    }
}

/// Ticks per microsecond of a [`TickSource`], computed once at start-up.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Calibration {
    ticks_per_micro: u32,
}

impl Calibration {
    /// Calibration from a known ticks-per-microsecond factor.
    ///
    /// # Errors
    ///
    /// Returns [`Error::CounterTooSlow`] when `ticks_per_micro` is zero.
    pub const fn from_ticks_per_micro(ticks_per_micro: u32) -> Result<Self> {
        if ticks_per_micro == 0 {
            return Err(Error::CounterTooSlow { counter_hz: 0 });
        }
        Ok(Self { ticks_per_micro })
    }

    /// Calibration for a counter running at `counter_hz`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::CounterTooSlow`] below 1 MHz.
    pub const fn from_counter_hz(counter_hz: u32) -> Result<Self> {
        let ticks_per_micro = counter_hz / HZ_PER_MHZ;
        if ticks_per_micro == 0 {
            return Err(Error::CounterTooSlow { counter_hz });
        }
        Ok(Self { ticks_per_micro })
    }

    /// Calibration for a counter clocked from the system clock through a divider.
    ///
    /// Core timers often count at a fraction of the CPU clock; a MIPS core timer,
    /// for example, ticks at half the CPU rate (`counter_divider = 2`).
    ///
    /// # Errors
    ///
    /// Returns [`Error::CounterTooSlow`] if the divided clock is below 1 MHz or the
    /// divider is zero.
    pub const fn from_system_clock(system_hz: u32, counter_divider: u32) -> Result<Self> {
        match system_hz.checked_div(counter_divider) {
            Some(counter_hz) => Self::from_counter_hz(counter_hz),
            None => Err(Error::CounterTooSlow { counter_hz: 0 }),
        }
    }

    /// Ticks per microsecond.
    #[must_use]
    pub const fn ticks_per_micro(self) -> u32 {
        self.ticks_per_micro
    }

    /// Ticks spanned by `micros` microseconds, saturating at `u32::MAX`.
    #[must_use]
    pub const fn ticks_for_micros(self, micros: u32) -> u32 {
        micros.saturating_mul(self.ticks_per_micro)
    }
}

/// One countdown: "fire after `remaining` quanta".
///
/// Owned by exactly one state machine. A fresh `Countdown` is idle: polling it never
/// fires until [`TimerService::start`] arms it.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Countdown {
    start: u32,
    stop: u32,
    remaining: u32,
    quantum_ticks: u32,
}

impl Countdown {
    /// An idle countdown.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            start: 0,
            stop: 0,
            remaining: 0,
            quantum_ticks: 0,
        }
    }

    /// Quanta left before the countdown fires.
    #[must_use]
    pub const fn remaining(&self) -> u32 {
        self.remaining
    }

    /// True once the countdown has fired (or was never started).
    #[must_use]
    pub const fn is_expired(&self) -> bool {
        self.remaining == 0
    }

    /// Tick at which the current quantum started.
    #[must_use]
    pub const fn start_tick(&self) -> u32 {
        self.start
    }

    /// Tick after which the current quantum has elapsed.
    #[must_use]
    pub const fn stop_tick(&self) -> u32 {
        self.stop
    }

    /// Restart counting from the already armed quantum.
    ///
    /// `poll` re-arms the quantum each time it elapses but never refills
    /// `remaining`; callers that want another period without re-reading the
    /// counter set it here. Zero is treated as one.
    pub const fn set_remaining(&mut self, period_units: u32) {
        self.remaining = if period_units == 0 { 1 } else { period_units };
    }

    const fn arm(&mut self, now: u32) {
        self.start = now;
        self.stop = now.wrapping_add(self.quantum_ticks);
    }

    const fn quantum_elapsed(&self, now: u32) -> bool {
        if self.start <= self.stop {
            // Below `start` means the counter already wrapped past `stop`, which
            // also covers `stop == u32::MAX`.
            now > self.stop || now < self.start
        } else {
            // The quantum straddles the wrap: the counter must first wrap below
            // `start`, then pass `stop`.
            now < self.start && now > self.stop
        }
    }
}

/// Countdown arithmetic over one [`TickSource`].
///
/// # Example
///
/// ```text
/// let timer = TimerService::new(ticks, Calibration::from_counter_hz(40_000_000)?);
/// let mut countdown = Countdown::new();
/// timer.start_ms(&mut countdown, 500);
/// loop {
///     if timer.poll(&mut countdown) {
///         // 500 ms have passed
///         timer.start_ms(&mut countdown, 500);
///     }
///     // ... advance other state machines
/// }
/// ```
#[derive(Clone, Copy, Debug)]
pub struct TimerService<T> {
    ticks: T,
    calibration: Calibration,
}

impl<T: TickSource> TimerService<T> {
    /// Create a timer service over `ticks`.
    #[must_use]
    pub const fn new(ticks: T, calibration: Calibration) -> Self {
        Self { ticks, calibration }
    }

    /// Current tick value.
    #[must_use]
    pub fn now(&self) -> u32 {
        self.ticks.now()
    }

    /// The calibration this service converts microseconds with.
    #[must_use]
    pub const fn calibration(&self) -> Calibration {
        self.calibration
    }

    /// The underlying tick source.
    #[must_use]
    pub const fn ticks(&self) -> &T {
        &self.ticks
    }

    /// Arm `countdown` to fire after `period_units` quanta of `quantum_us` microseconds.
    ///
    /// A period of zero behaves as one quantum.
    pub fn start(&self, countdown: &mut Countdown, period_units: u32, quantum_us: u32) {
        countdown.quantum_ticks = self.calibration.ticks_for_micros(quantum_us);
        countdown.set_remaining(period_units);
        countdown.arm(self.ticks.now());
    }

    /// Arm `countdown` to fire after `millis` milliseconds.
    pub fn start_ms(&self, countdown: &mut Countdown, millis: u32) {
        self.start(countdown, millis, MICROS_PER_MILLI);
    }

    /// Check `countdown`; true exactly once, when its last quantum elapses.
    ///
    /// Each elapsed quantum is re-armed from the current tick. After firing the
    /// countdown stays expired (returns false) until started again or refilled with
    /// [`Countdown::set_remaining`].
    pub fn poll(&self, countdown: &mut Countdown) -> bool {
        let now = self.ticks.now();
        if !countdown.quantum_elapsed(now) {
            return false;
        }
        countdown.arm(now);
        match countdown.remaining {
            0 => false,
            1 => {
                countdown.remaining = 0;
                true
            }
            remaining => {
                countdown.remaining = remaining.saturating_sub(1);
                false
            }
        }
    }
}
