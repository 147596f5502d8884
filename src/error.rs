//! Crate-wide error type.

use derive_more::{Display, Error};
use embedded_hal::digital::ErrorKind;

/// Result type used throughout `strip-kit`.
pub type Result<T, E = Error> = core::result::Result<T, E>;

/// Errors raised by `strip-kit`.
///
/// The wire protocol has no acknowledgement channel, so no protocol step ever fails.
/// What can fail is a collaborator: a GPIO line refusing a level change, or a
/// tick counter too slow to resolve a microsecond.
#[derive(Clone, Copy, Debug, Display, Eq, Error, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    /// A GPIO output rejected a level change.
    #[display("GPIO output failed: {_0:?}")]
    Gpio(#[error(not(source))] ErrorKind),

    /// The tick counter runs at less than one tick per microsecond.
    #[display("tick counter at {counter_hz} Hz cannot resolve one microsecond")]
    CounterTooSlow {
        /// Counter frequency that was rejected.
        counter_hz: u32,
    },
}

impl Error {
    pub(crate) fn gpio<E: embedded_hal::digital::Error>(err: E) -> Self {
        Self::Gpio(err.kind())
    }
}
