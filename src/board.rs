//! Adapters from Pico hardware to the crate's collaborator traits.
//!
//! - [`EmbassyTicks`]: the embassy time driver's 1 MHz counter as a [`TickSource`].
//! - [`DwtTicks`]: the Cortex-M33 cycle counter (Pico 2 only), one tick per CPU clock.
//! - [`PicoSpiSink`]: an RP SPI block's transmit FIFO as a [`ByteSink`].
//!
//! GPIO needs no adapter: `embassy_rp::gpio::Output` already implements
//! `embedded_hal::digital::OutputPin`.

use embassy_rp::pac;
use embassy_time::{Instant, TICK_HZ};

use crate::strip_writer::spi::ByteSink;
use crate::timer::{Calibration, TickSource};
use crate::Result;

/// The embassy time driver's counter, truncated to 32 bits.
///
/// At embassy-rp's 1 MHz tick rate this wraps every 71.6 minutes; countdowns handle
/// the wrap.
#[derive(Clone, Copy, Debug, Default)]
pub struct EmbassyTicks;

impl EmbassyTicks {
    /// Calibration matching the driver's tick rate.
    ///
    /// # Errors
    ///
    /// Returns [`Error::CounterTooSlow`](crate::Error::CounterTooSlow) if the driver ticks slower than 1 MHz.
    pub fn calibration() -> Result<Calibration> {
        let counter_hz = u32::try_from(TICK_HZ).unwrap_or(u32::MAX);
        Calibration::from_counter_hz(counter_hz)
    }
}

impl TickSource for EmbassyTicks {
    #[expect(
        clippy::cast_possible_truncation,
        reason = "the countdown arithmetic works on a wrapping 32-bit counter"
    )]
    fn now(&self) -> u32 {
        Instant::now().as_ticks() as u32
    }
}

/// The DWT cycle counter of the Pico 2's Cortex-M33 cores.
#[cfg(all(feature = "arm", feature = "pico2"))]
#[derive(Clone, Copy, Debug)]
pub struct DwtTicks {
    _enabled: (),
}

#[cfg(all(feature = "arm", feature = "pico2"))]
impl DwtTicks {
    /// Enable tracing and start the cycle counter.
    pub fn enable(
        dcb: &mut cortex_m::peripheral::DCB,
        dwt: &mut cortex_m::peripheral::DWT,
    ) -> Self {
        dcb.enable_trace();
        dwt.enable_cycle_counter();
        info!("DWT cycle counter enabled");
        Self { _enabled: () }
    }

    /// Calibration from the current system clock.
    ///
    /// # Errors
    ///
    /// Returns [`Error::CounterTooSlow`](crate::Error::CounterTooSlow) if the system clock is below 1 MHz.
    pub fn calibration() -> Result<Calibration> {
        Calibration::from_system_clock(embassy_rp::clocks::clk_sys_freq(), 1)
    }
}

#[cfg(all(feature = "arm", feature = "pico2"))]
impl TickSource for DwtTicks {
    fn now(&self) -> u32 {
        cortex_m::peripheral::DWT::cycle_count()
    }
}

/// An RP SPI block polled through its registers.
///
/// Keeps the configured embassy driver alive (pins, clock rate, format) and talks
/// to the FIFO directly so that a full FIFO never stalls the loop.
pub struct PicoSpiSink<S> {
    _spi: S,
    regs: pac::spi::Spi,
}

impl<S> PicoSpiSink<S> {
    /// Wrap a configured SPI driver and the register block of the same instance,
    /// for example `PicoSpiSink::new(spi, embassy_rp::pac::SPI0)`.
    pub const fn new(spi: S, regs: pac::spi::Spi) -> Self {
        Self { _spi: spi, regs }
    }
}

impl<S> ByteSink for PicoSpiSink<S> {
    fn is_ready(&mut self) -> bool {
        self.regs.sr().read().tnf()
    }

    fn write_byte(&mut self, byte: u8) {
        self.regs.dr().write(|w| w.set_data(u16::from(byte)));
    }
}
