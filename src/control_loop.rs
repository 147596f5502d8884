//! The single cooperative control loop.
//!
//! Each [`tick`](ControlLoop::tick) advances every writer once, then the producer
//! once. A swap the producer makes in tick `k` is first seen by the writers in tick
//! `k + 1`, so no writer ever reads a buffer in the middle of a role change.
//!
//! ```text
//! loop {
//!     control_loop.tick()?;   // writers, then producer
//!     heartbeat.advance(control_loop.timer())?;
//! }
//! ```

use crate::Result;
use crate::pixel_store::BufferPair;
use crate::producer::FrameProducer;
use crate::strip_writer::StripWriter;
use crate::timer::{TickSource, TimerService};

/// Owns the writers, the producer and the timer service; borrows the buffers.
pub struct ControlLoop<'a, const N: usize, Wr, P, T> {
    buffers: &'a mut BufferPair<N>,
    writers: Wr,
    producer: P,
    timer: TimerService<T>,
}

impl<'a, const N: usize, Wr, P, T> ControlLoop<'a, N, Wr, P, T>
where
    Wr: StripWriter<N>,
    P: FrameProducer<N>,
    T: TickSource,
{
    /// Assemble a control loop.
    pub const fn new(
        buffers: &'a mut BufferPair<N>,
        writers: Wr,
        producer: P,
        timer: TimerService<T>,
    ) -> Self {
        Self {
            buffers,
            writers,
            producer,
            timer,
        }
    }

    /// One pass: writers first, then the producer.
    ///
    /// # Errors
    ///
    /// Returns the first error a writer reports. The producer is not advanced in that
    /// pass.
    pub fn tick(&mut self) -> Result<()> {
        self.writers.advance(self.buffers, &self.timer)?;
        self.producer.advance(self.buffers, &self.timer);
        Ok(())
    }

    /// The buffer pair.
    #[must_use]
    pub const fn buffers(&self) -> &BufferPair<N> {
        &*self.buffers
    }

    /// The writers.
    #[must_use]
    pub const fn writers(&self) -> &Wr {
        &self.writers
    }

    /// The producer.
    #[must_use]
    pub const fn producer(&self) -> &P {
        &self.producer
    }

    /// The timer service, for state machines outside the loop such as a heartbeat.
    #[must_use]
    pub const fn timer(&self) -> &TimerService<T> {
        &self.timer
    }
}
