//! A timed two-phase pattern, for running a strip with nothing attached upstream.
//!
//! ```text
//!  start ─ startup_ms ─┬─ even_ms ─┬─ odd_ms ─┬─ even_ms ─ ...
//!                      │           │          │
//!                    EVEN         ODD        EVEN       (render, swap)
//! ```

use smart_leds::RGB8;
use smart_leds::colors::{BLACK, BLUE};

use super::FrameProducer;
use crate::layout::{CHANNEL_ORDER_DEFAULT, ChannelOrder};
use crate::pixel_store::BufferPair;
use crate::timer::{Countdown, TickSource, TimerService};

/// Which of the two frames is rendered next.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Phase {
    /// The first frame of each cycle.
    Even,
    /// The second frame of each cycle.
    Odd,
}

impl Phase {
    /// The other phase.
    #[must_use]
    pub const fn flip(self) -> Self {
        match self {
            Self::Even => Self::Odd,
            Self::Odd => Self::Even,
        }
    }
}

/// Colors of a two-phase pattern.
pub trait Pattern {
    /// Color of LED `led_index` (strip order) in `phase`.
    fn color(&self, phase: Phase, led_index: usize) -> RGB8;
}

/// Even-numbered LEDs lit in the even phase, odd-numbered ones in the odd phase.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Alternating {
    /// Color of a lit LED.
    pub on: RGB8,
    /// Color of an unlit LED.
    pub off: RGB8,
}

impl Default for Alternating {
    fn default() -> Self {
        Self {
            on: BLUE,
            off: BLACK,
        }
    }
}

impl Pattern for Alternating {
    fn color(&self, phase: Phase, led_index: usize) -> RGB8 {
        let even_led = led_index % 2 == 0;
        match (phase, even_led) {
            (Phase::Even, true) | (Phase::Odd, false) => self.on,
            (Phase::Even, false) | (Phase::Odd, true) => self.off,
        }
    }
}

/// Every LED the same color in both phases.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Solid(pub RGB8);

impl Pattern for Solid {
    fn color(&self, _phase: Phase, _led_index: usize) -> RGB8 {
        self.0
    }
}

/// Pattern timing and byte order.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PatternConfig {
    /// Delay before the first frame.
    pub startup_ms: u32,
    /// How long the even frame stays up.
    pub even_ms: u32,
    /// How long the odd frame stays up.
    pub odd_ms: u32,
    /// Byte order of the strip.
    pub channel_order: ChannelOrder,
}

impl Default for PatternConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl PatternConfig {
    /// 50 ms start-up, then one second per phase, GRB strip.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            startup_ms: 50,
            even_ms: 1_000,
            odd_ms: 1_000,
            channel_order: CHANNEL_ORDER_DEFAULT,
        }
    }

    /// Use different phase durations.
    #[must_use]
    pub const fn with_periods(mut self, even_ms: u32, odd_ms: u32) -> Self {
        self.even_ms = even_ms;
        self.odd_ms = odd_ms;
        self
    }

    /// Use a different start-up delay.
    #[must_use]
    pub const fn with_startup_ms(mut self, startup_ms: u32) -> Self {
        self.startup_ms = startup_ms;
        self
    }

    /// Use a different strip byte order.
    #[must_use]
    pub const fn with_channel_order(mut self, channel_order: ChannelOrder) -> Self {
        self.channel_order = channel_order;
        self
    }

    const fn period_ms(&self, phase: Phase) -> u32 {
        match phase {
            Phase::Even => self.even_ms,
            Phase::Odd => self.odd_ms,
        }
    }
}

/// Renders `P` into the edit buffer on a timer and swaps.
pub struct PatternGenerator<P> {
    pattern: P,
    config: PatternConfig,
    phase: Phase,
    countdown: Countdown,
    started: bool,
}

impl<P: Pattern> PatternGenerator<P> {
    /// Create a generator. The start-up delay begins at the first advance.
    #[must_use]
    pub const fn new(pattern: P, config: PatternConfig) -> Self {
        Self {
            pattern,
            config,
            phase: Phase::Even,
            countdown: Countdown::new(),
            started: false,
        }
    }

    /// The phase rendered at the next swap.
    #[must_use]
    pub const fn phase(&self) -> Phase {
        self.phase
    }

    fn render<const N: usize>(&self, buffers: &mut BufferPair<N>) {
        for (led_index, pixel) in buffers.edit_mut().iter_mut().enumerate() {
            *pixel = self
                .config
                .channel_order
                .encode(self.pattern.color(self.phase, led_index));
        }
    }
}

impl<P: Pattern, const N: usize> FrameProducer<N> for PatternGenerator<P> {
    fn advance<T: TickSource>(&mut self, buffers: &mut BufferPair<N>, timer: &TimerService<T>) {
        if !self.started {
            self.started = true;
            timer.start_ms(&mut self.countdown, self.config.startup_ms);
            return;
        }
        if !timer.poll(&mut self.countdown) {
            return;
        }
        self.render(buffers);
        buffers.swap();
        timer.start_ms(&mut self.countdown, self.config.period_ms(self.phase));
        trace!("pattern phase {} shown", self.phase);
        self.phase = self.phase.flip();
    }
}
