//! Writers that stream the draw buffer to clocked LED strips.
//!
//! The strips speak a two-wire, LPD8806-style protocol with no acknowledgement:
//!
//! ```text
//!  frame k                                  frame k+1
//!  ┌───────────┬───────────┬─────┬────────┐ ┌─────────── ...
//!  │ 0x80|b[0] │ 0x80|b[1] │ ... │ 0 0 0  │ │ 0x80|b[0]
//!  └───────────┴───────────┴─────┴────────┘ └─────────── ...
//!    N * 3 pixel bytes, top bit set           zero_frame_len(N) zero bytes
//! ```
//!
//! Zeros come first after power-up, latching whatever the strip holds. Each writer
//! is a state machine advanced once per control-loop pass and never blocks:
//!
//! - [`spi::SpiStripWriter`] feeds a hardware byte sink, one byte per advance.
//! - [`soft::SoftStripWriter`] bit-bangs a data line and a clock line, one protocol
//!   step per advance.
//!
//! Both read the buffer that is *draw* at the moment each pixel byte is fetched. A
//! swap in the middle of a frame therefore shows up as a frame stitched from two
//! buffers, as the hardware has always done.

use crate::Result;
use crate::pixel_store::BufferPair;
use crate::timer::{TickSource, TimerService};

pub mod soft;
pub mod spi;

/// Bit forced high on every pixel byte sent down the wire.
pub const PIXEL_BYTE_FLAG: u8 = 0x80;

/// Number of zero bytes that end a frame of `led_count` LEDs.
///
/// Three zero bytes per 64 LEDs (rounded up) resets the strip's latch for the next
/// frame.
#[must_use]
pub const fn zero_frame_len(led_count: usize) -> usize {
    led_count.div_ceil(64).saturating_mul(3)
}

/// The wire form of one pixel byte.
#[must_use]
pub const fn wire_byte(byte: u8) -> u8 {
    PIXEL_BYTE_FLAG | byte
}

/// Which part of the frame a writer is emitting.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LinkPhase {
    /// Emitting `N * 3` pixel bytes from the draw buffer.
    WritePixel,
    /// Emitting the trailing zero bytes.
    WriteZeros,
}

/// A strip writer advanced once per control-loop pass.
///
/// `advance` performs at most one unit of work (one byte for a hardware sink, one
/// protocol step for a bit-banged link) and returns immediately.
pub trait StripWriter<const N: usize> {
    /// Do at most one unit of work against the current draw buffer.
    ///
    /// # Errors
    ///
    /// Returns an error if an output line rejects a level change.
    fn advance<T: TickSource>(
        &mut self,
        buffers: &BufferPair<N>,
        timer: &TimerService<T>,
    ) -> Result<()>;
}

/// Several identical links driven from the same buffer, each with its own cursor.
impl<const N: usize, W: StripWriter<N>, const K: usize> StripWriter<N> for [W; K] {
    fn advance<T: TickSource>(
        &mut self,
        buffers: &BufferPair<N>,
        timer: &TimerService<T>,
    ) -> Result<()> {
        for writer in self {
            writer.advance(buffers, timer)?;
        }
        Ok(())
    }
}

impl<const N: usize, A: StripWriter<N>, B: StripWriter<N>> StripWriter<N> for (A, B) {
    fn advance<T: TickSource>(
        &mut self,
        buffers: &BufferPair<N>,
        timer: &TimerService<T>,
    ) -> Result<()> {
        self.0.advance(buffers, timer)?;
        self.1.advance(buffers, timer)
    }
}
