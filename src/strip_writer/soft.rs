//! Bit-banged strip writer: a data line and a clock line driven from GPIO.
//!
//! Every bit takes three protocol steps, one per [`advance`](StripWriter::advance):
//!
//! ```text
//!            SetData        ClockHigh      ClockLow
//!  data  ═══╳══ bit 7 ═══════════════════════════╳══ bit 6 ...
//!  clock ────────────────┐▔▔▔▔▔▔▔▔▔▔▔▔▔▔┐────────────────
//!                        └ strip samples data here
//! ```
//!
//! Bits go out most-significant first. The byte sequence is the same as the
//! hardware SPI writer's: a zero frame first, then `0x80 | byte` for each pixel
//! byte, then zeros again.
//!
//! Several soft links may share one [`BufferPair`]; each keeps its own
//! [`SoftLinkContext`], so they need not be in lock step.

use embedded_hal::digital::{OutputPin, PinState};

use super::{LinkPhase, StripWriter, wire_byte, zero_frame_len};
use crate::pixel_store::BufferPair;
use crate::timer::{Countdown, TickSource, TimerService};
use crate::{Error, Result};

/// Which line change the next step performs.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ClockPhase {
    /// Put the next bit on the data line.
    SetData,
    /// Raise the clock; the strip samples the data line.
    ClockHigh,
    /// Lower the clock.
    ClockLow,
}

/// A single line change produced by one protocol step.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LineChange {
    /// Drive the data line to this level (`true` = high).
    Data(bool),
    /// Drive the clock line to this level.
    Clock(bool),
}

/// How fast a soft link steps.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Pacing {
    /// One step on every advance. The link runs as fast as the control loop.
    Free,
    /// At most one step per `half_period_us` microseconds.
    Timed {
        /// Minimum time between two steps.
        half_period_us: u32,
    },
}

/// Pacing used when nothing else is configured.
pub const PACING_DEFAULT: Pacing = Pacing::Free;

/// Position of one soft link in the bit stream.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SoftLinkContext<const N: usize> {
    /// Next line change.
    pub state: ClockPhase,
    /// Pixel bytes or trailing zeros.
    pub sub_state: LinkPhase,
    /// Pixel byte being sent, `0..N * 3`.
    pub pixel_byte_index: usize,
    /// Zero bytes still to send, counting the one in progress.
    pub zero_frame_counter: usize,
    /// Bit of the current byte sent at the next `SetData`.
    pub bit_mask: u8,
}

impl<const N: usize> Default for SoftLinkContext<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> SoftLinkContext<N> {
    const ZERO_FRAME_LEN: usize = zero_frame_len(N);
    const FRAME_BYTES: usize = BufferPair::<N>::LEN;

    /// Ready to send the leading zero frame.
    ///
    /// A link needs at least one LED; `N == 0` is rejected at compile time:
    ///
    /// ```compile_fail
    /// use strip_kit::strip_writer::soft::SoftLinkContext;
    ///
    /// const EMPTY: SoftLinkContext<0> = SoftLinkContext::new();
    /// ```
    #[must_use]
    pub const fn new() -> Self {
        const { assert!(N > 0, "a strip needs at least one LED") };
        Self {
            state: ClockPhase::SetData,
            sub_state: LinkPhase::WriteZeros,
            pixel_byte_index: 0,
            zero_frame_counter: Self::ZERO_FRAME_LEN,
            bit_mask: 0x80,
        }
    }

    /// The byte currently on the wire, as sent.
    #[must_use]
    pub fn current_byte(&self, buffers: &BufferPair<N>) -> u8 {
        match self.sub_state {
            LinkPhase::WritePixel => wire_byte(buffers.draw_bytes()[self.pixel_byte_index]),
            LinkPhase::WriteZeros => 0,
        }
    }

    /// Perform one protocol step and report the line change it calls for.
    pub fn step(&mut self, buffers: &BufferPair<N>) -> LineChange {
        match self.state {
            ClockPhase::SetData => {
                let high = (self.current_byte(buffers) & self.bit_mask) != 0;
                self.state = ClockPhase::ClockHigh;
                self.next_bit();
                LineChange::Data(high)
            }
            ClockPhase::ClockHigh => {
                self.state = ClockPhase::ClockLow;
                LineChange::Clock(true)
            }
            ClockPhase::ClockLow => {
                self.state = ClockPhase::SetData;
                LineChange::Clock(false)
            }
        }
    }

    fn next_bit(&mut self) {
        self.bit_mask >>= 1;
        if self.bit_mask != 0 {
            return;
        }
        self.bit_mask = 0x80;
        match self.sub_state {
            LinkPhase::WritePixel => {
                self.pixel_byte_index = self.pixel_byte_index.saturating_add(1);
                if self.pixel_byte_index == Self::FRAME_BYTES {
                    self.sub_state = LinkPhase::WriteZeros;
                    self.zero_frame_counter = Self::ZERO_FRAME_LEN;
                }
            }
            LinkPhase::WriteZeros => {
                self.zero_frame_counter = self.zero_frame_counter.saturating_sub(1);
                if self.zero_frame_counter == 0 {
                    self.sub_state = LinkPhase::WritePixel;
                    self.pixel_byte_index = 0;
                }
            }
        }
    }
}

/// Drives one strip over a data pin and a clock pin.
pub struct SoftStripWriter<D, C, const N: usize> {
    data: D,
    clock: C,
    context: SoftLinkContext<N>,
    pacing: Pacing,
    pace: Countdown,
}

impl<D: OutputPin, C: OutputPin, const N: usize> SoftStripWriter<D, C, N> {
    /// Take ownership of the two lines and drive both low.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Gpio`] if either line rejects the initial level.
    pub fn new(mut data: D, mut clock: C, pacing: Pacing) -> Result<Self> {
        clock.set_low().map_err(Error::gpio)?;
        data.set_low().map_err(Error::gpio)?;
        info!("soft strip writer: {} LEDs", N);
        Ok(Self {
            data,
            clock,
            context: SoftLinkContext::new(),
            pacing,
            pace: Countdown::new(),
        })
    }

    /// Where the link is in the bit stream.
    #[must_use]
    pub const fn context(&self) -> &SoftLinkContext<N> {
        &self.context
    }

    /// Release the data and clock lines.
    pub fn into_pins(self) -> (D, C) {
        (self.data, self.clock)
    }

    fn step(&mut self, buffers: &BufferPair<N>) -> Result<()> {
        match self.context.step(buffers) {
            LineChange::Data(high) => {
                self.data.set_state(PinState::from(high)).map_err(Error::gpio)
            }
            LineChange::Clock(high) => self
                .clock
                .set_state(PinState::from(high))
                .map_err(Error::gpio),
        }
    }
}

impl<D: OutputPin, C: OutputPin, const N: usize> StripWriter<N> for SoftStripWriter<D, C, N> {
    fn advance<T: TickSource>(
        &mut self,
        buffers: &BufferPair<N>,
        timer: &TimerService<T>,
    ) -> Result<()> {
        match self.pacing {
            Pacing::Free => self.step(buffers),
            Pacing::Timed { half_period_us } => {
                if self.pace.is_expired() {
                    timer.start(&mut self.pace, 1, half_period_us);
                    return Ok(());
                }
                if !timer.poll(&mut self.pace) {
                    return Ok(());
                }
                self.pace.set_remaining(1);
                self.step(buffers)
            }
        }
    }
}

#[cfg(all(test, feature = "host"))]
mod tests {
    use super::*;

    #[test]
    fn new_context_waits_on_the_leading_zero_frame() {
        let short = SoftLinkContext::<64>::new();
        assert_eq!(short.sub_state, LinkPhase::WriteZeros);
        assert_eq!(short.zero_frame_counter, 3);
        assert_eq!(short.bit_mask, 0x80);
        assert_eq!(SoftLinkContext::<65>::new().zero_frame_counter, 6);
    }

    #[test]
    fn one_bit_is_three_steps() {
        let buffers = BufferPair::<1>::new();
        let mut context = SoftLinkContext::<1>::new();
        assert_eq!(context.step(&buffers), LineChange::Data(false));
        assert_eq!(context.bit_mask, 0x40);
        assert_eq!(context.step(&buffers), LineChange::Clock(true));
        assert_eq!(context.step(&buffers), LineChange::Clock(false));
        assert_eq!(context.state, ClockPhase::SetData);
    }

    #[test]
    fn zero_frame_then_pixels() {
        let buffers = BufferPair::<1>::filled(0x7F);
        let mut context = SoftLinkContext::<1>::new();
        // 3 zero bytes * 8 bits * 3 steps
        for _ in 0..72 {
            context.step(&buffers);
        }
        assert_eq!(context.sub_state, LinkPhase::WritePixel);
        assert_eq!(context.pixel_byte_index, 0);
        assert_eq!(context.current_byte(&buffers), 0xFF);
        assert_eq!(context.step(&buffers), LineChange::Data(true));
    }
}
