#![allow(missing_docs)]
#![no_std]
#![no_main]
#![cfg(not(feature = "host"))]

use core::{convert::Infallible, panic};

use embassy_executor::Spawner;
use embassy_rp::gpio::{Level, Output};
use smart_leds::colors;
use static_cell::StaticCell;
use strip_kit::{
    Result,
    board::EmbassyTicks,
    control_loop::ControlLoop,
    heartbeat::{Heartbeat, HeartbeatConfig},
    pixel_store::BufferPair,
    producer::pattern::{Alternating, PatternConfig, PatternGenerator},
    strip_writer::soft::{PACING_DEFAULT, SoftStripWriter},
    timer::TimerService,
};
use {defmt_rtt as _, panic_probe as _};

// Two 32-LED strips, each on its own data/clock pair, showing the same frames.
const LED_COUNT: usize = 32;

static BUFFERS: StaticCell<BufferPair<LED_COUNT>> = StaticCell::new();

#[embassy_executor::main]
async fn main(_spawner: Spawner) -> ! {
    let err = inner_main().await.unwrap_err();
    panic!("{err}");
}

async fn inner_main() -> Result<Infallible> {
    let p = embassy_rp::init(Default::default());

    let strip_a = SoftStripWriter::<_, _, LED_COUNT>::new(
        Output::new(p.PIN_3, Level::Low),
        Output::new(p.PIN_4, Level::Low),
        PACING_DEFAULT,
    )?;
    let strip_b = SoftStripWriter::<_, _, LED_COUNT>::new(
        Output::new(p.PIN_5, Level::Low),
        Output::new(p.PIN_6, Level::Low),
        PACING_DEFAULT,
    )?;
    let mut heartbeat =
        Heartbeat::new(Output::new(p.PIN_25, Level::Low), HeartbeatConfig::default())?;

    let buffers = BUFFERS.init(BufferPair::new());
    let timer = TimerService::new(EmbassyTicks, EmbassyTicks::calibration()?);
    let pattern = Alternating {
        on: colors::ORANGE,
        off: colors::BLACK,
    };
    let producer = PatternGenerator::new(pattern, PatternConfig::default().with_periods(500, 500));

    let mut control_loop = ControlLoop::new(buffers, [strip_a, strip_b], producer, timer);
    loop {
        control_loop.tick()?;
        heartbeat.advance(control_loop.timer())?;
        embassy_futures::yield_now().await;
    }
}
