//! Status LED blinking on its own countdown.
//!
//! A steady blink shows the control loop is alive and never stuck in a wait.

use embedded_hal::digital::OutputPin;

use crate::timer::{Countdown, TickSource, TimerService};
use crate::{Error, Result};

/// Heartbeat timing.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct HeartbeatConfig {
    /// Time the LED stays on, in milliseconds.
    pub high_ms: u32,
    /// Time the LED stays off, in milliseconds.
    pub low_ms: u32,
}

impl Default for HeartbeatConfig {
    fn default() -> Self {
        Self {
            high_ms: 1_000,
            low_ms: 500,
        }
    }
}

/// Drives one output pin: high for `high_ms`, low for `low_ms`, repeating.
///
/// The pin starts low and first rises after `high_ms`.
pub struct Heartbeat<P> {
    pin: P,
    config: HeartbeatConfig,
    countdown: Countdown,
    is_high: bool,
    started: bool,
}

impl<P: OutputPin> Heartbeat<P> {
    /// Take the pin and drive it low.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Gpio`] if the pin rejects the level.
    pub fn new(mut pin: P, config: HeartbeatConfig) -> Result<Self> {
        pin.set_low().map_err(Error::gpio)?;
        Ok(Self {
            pin,
            config,
            countdown: Countdown::new(),
            is_high: false,
            started: false,
        })
    }

    /// Whether the LED is currently on.
    #[must_use]
    pub const fn is_high(&self) -> bool {
        self.is_high
    }

    /// Toggle the pin when its current level has been held long enough.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Gpio`] if the pin rejects the level.
    pub fn advance<T: TickSource>(&mut self, timer: &TimerService<T>) -> Result<()> {
        if !self.started {
            self.started = true;
            timer.start_ms(&mut self.countdown, self.config.high_ms);
            return Ok(());
        }
        if !timer.poll(&mut self.countdown) {
            return Ok(());
        }
        self.is_high = !self.is_high;
        let hold_ms = if self.is_high {
            self.pin.set_high().map_err(Error::gpio)?;
            self.config.high_ms
        } else {
            self.pin.set_low().map_err(Error::gpio)?;
            self.config.low_ms
        };
        trace!("heartbeat {}", self.is_high);
        timer.start_ms(&mut self.countdown, hold_ms);
        Ok(())
    }
}
