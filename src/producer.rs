//! Frame producers: state machines that fill the edit buffer and request swaps.
//!
//! - [`ingest::Ingester`] writes bytes arriving on a line transport into the edit
//!   buffer and swaps after each complete image.
//! - [`pattern::PatternGenerator`] renders a two-phase pattern on a timer.
//!
//! Exactly one producer drives a [`BufferPair`]. It is advanced after the writers in
//! every control-loop pass (see [`ControlLoop`](crate::control_loop::ControlLoop)).

use crate::pixel_store::BufferPair;
use crate::timer::{TickSource, TimerService};

pub mod ingest;
pub mod pattern;

/// A producer advanced once per control-loop pass.
pub trait FrameProducer<const N: usize> {
    /// Do a bounded amount of work on the edit buffer, swapping when a frame is
    /// complete. Never waits.
    fn advance<T: TickSource>(&mut self, buffers: &mut BufferPair<N>, timer: &TimerService<T>);
}
