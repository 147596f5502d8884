//! Hardware SPI strip writer: one byte into the transmit FIFO per advance.

use super::{LinkPhase, StripWriter, wire_byte, zero_frame_len};
use crate::Result;
use crate::pixel_store::BufferPair;
use crate::timer::{TickSource, TimerService};

/// A byte-wide transmit register with a readiness flag.
///
/// On hardware this is an SPI peripheral's data register and its "transmit FIFO not
/// full" status bit. Neither method may block.
pub trait ByteSink {
    /// True if `write_byte` would be accepted right now.
    fn is_ready(&mut self) -> bool;

    /// Queue one byte. Only called after `is_ready` returned true.
    fn write_byte(&mut self, byte: u8);
}

impl<S: ByteSink + ?Sized> ByteSink for &mut S {
    fn is_ready(&mut self) -> bool {
        (**self).is_ready()
    }

    fn write_byte(&mut self, byte: u8) {
        (**self).write_byte(byte);
    }
}

/// Position of a writer within the frame it is sending.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct WriterCursor {
    /// Pixel bytes or trailing zeros.
    pub phase: LinkPhase,
    /// Next pixel byte to send, `0..N * 3`.
    pub pixel_byte_index: usize,
    /// Zero bytes still to send in the current zero frame.
    pub zero_frame_counter: usize,
}

/// Streams the draw buffer into a [`ByteSink`].
///
/// ```text
/// zeros(3·⌈N/64⌉) → pixels(N·3) → zeros → pixels → ...
/// ```
///
/// Each [`step`](Self::step) writes at most one byte. A full FIFO costs nothing:
/// the step returns and the loop moves on.
pub struct SpiStripWriter<S, const N: usize> {
    sink: S,
    cursor: WriterCursor,
}

impl<S: ByteSink, const N: usize> SpiStripWriter<S, N> {
    /// Trailing zero bytes per frame.
    pub const ZERO_FRAME_LEN: usize = zero_frame_len(N);
    /// Pixel bytes per frame.
    pub const FRAME_BYTES: usize = BufferPair::<N>::LEN;

    /// Wrap `sink`. The first bytes sent are a zero frame.
    #[must_use]
    pub fn new(sink: S) -> Self {
        const { assert!(N > 0, "a strip needs at least one LED") };
        info!(
            "SPI strip writer: {} LEDs, {} zero bytes per frame",
            N,
            Self::ZERO_FRAME_LEN
        );
        Self {
            sink,
            cursor: WriterCursor {
                phase: LinkPhase::WriteZeros,
                pixel_byte_index: 0,
                zero_frame_counter: Self::ZERO_FRAME_LEN,
            },
        }
    }

    /// Send the next byte if the sink has room. Returns whether a byte was written.
    pub fn step(&mut self, buffers: &BufferPair<N>) -> bool {
        if !self.sink.is_ready() {
            return false;
        }
        let cursor = &mut self.cursor;
        match cursor.phase {
            LinkPhase::WriteZeros => {
                self.sink.write_byte(0);
                cursor.zero_frame_counter = cursor.zero_frame_counter.saturating_sub(1);
                if cursor.zero_frame_counter == 0 {
                    cursor.phase = LinkPhase::WritePixel;
                    cursor.pixel_byte_index = 0;
                }
            }
            LinkPhase::WritePixel => {
                let byte = buffers.draw_bytes()[cursor.pixel_byte_index];
                self.sink.write_byte(wire_byte(byte));
                cursor.pixel_byte_index = cursor.pixel_byte_index.saturating_add(1);
                if cursor.pixel_byte_index == Self::FRAME_BYTES {
                    trace!("SPI frame sent");
                    cursor.phase = LinkPhase::WriteZeros;
                    cursor.zero_frame_counter = Self::ZERO_FRAME_LEN;
                }
            }
        }
        true
    }

    /// Where the writer is in the current frame.
    #[must_use]
    pub const fn cursor(&self) -> WriterCursor {
        self.cursor
    }

    /// The wrapped sink.
    #[must_use]
    pub const fn sink(&self) -> &S {
        &self.sink
    }

    /// Release the wrapped sink.
    pub fn into_sink(self) -> S {
        self.sink
    }
}

impl<S: ByteSink, const N: usize> StripWriter<N> for SpiStripWriter<S, N> {
    fn advance<T: TickSource>(
        &mut self,
        buffers: &BufferPair<N>,
        _timer: &TimerService<T>,
    ) -> Result<()> {
        self.step(buffers);
        Ok(())
    }
}
