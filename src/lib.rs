//! Non-blocking, double-buffered drivers for clocked addressable LED strips
//! (LPD8806-style: one data line, one clock line, 7 bits per color channel).
//!
//! One cooperative loop advances a handful of small state machines, each of which
//! does at most one unit of work and returns:
//!
//! ```text
//!   producer ──fills──▶ edit buffer ─┐
//!                                    │ swap
//!   writers  ◀──reads── draw buffer ◀┘
//! ```
//!
//! - [`timer`]: wraparound-safe countdowns over a free-running tick counter.
//! - [`pixel_store`]: the draw/edit [`BufferPair`](pixel_store::BufferPair).
//! - [`strip_writer`]: the wire protocol, over hardware SPI or bit-banged GPIO.
//! - [`layout`]: panel wiring, rotations and color byte order.
//! - [`producer`]: frames from a serial link or from a timed pattern.
//! - [`control_loop`]: the per-pass ordering of writers and producer.
//! - [`heartbeat`]: a status LED blinker.
//!
//! # Glossary
//!
//! - **Zero frame:** the run of `3 · ⌈N/64⌉` zero bytes ending every frame; it
//!   latches the pixel data into the LEDs.
//! - **Quantum:** the unit a countdown counts in, usually one millisecond.
//! - **Soft link:** a strip driven by toggling two GPIO lines instead of an SPI block.
#![cfg_attr(not(feature = "host"), no_std)]

// Compile-time checks: exactly one board must be selected (unless testing with host feature)
#[cfg(all(not(any(feature = "pico1", feature = "pico2")), not(feature = "host")))]
compile_error!("Must enable exactly one board feature: 'pico1' or 'pico2'");

#[cfg(all(feature = "pico1", feature = "pico2"))]
compile_error!("Cannot enable both 'pico1' and 'pico2' features simultaneously");

#[cfg(all(not(feature = "arm"), not(feature = "host")))]
compile_error!("Must enable the 'arm' architecture feature for target builds");

// Must come first: the logging macros are used by every module below.
#[macro_use]
mod fmt;

// Hardware adapters require embassy_rp and are excluded when testing on host
#[cfg(all(not(feature = "host"), any(feature = "pico1", feature = "pico2")))]
pub mod board;
pub mod control_loop;
mod error;
pub mod heartbeat;
pub mod layout;
pub mod pixel_store;
pub mod producer;
pub mod strip_writer;
pub mod timer;

// Re-export error types and result (used throughout)
pub use crate::error::{Error, Result};
