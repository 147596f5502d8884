#![allow(missing_docs)]
#![no_std]
#![no_main]
#![cfg(not(feature = "host"))]

use core::{convert::Infallible, panic};

use embassy_executor::Spawner;
use embassy_rp::spi::{self, Spi};
use static_cell::StaticCell;
use strip_kit::{
    Result,
    board::{EmbassyTicks, PicoSpiSink},
    control_loop::ControlLoop,
    pixel_store::BufferPair,
    producer::pattern::{Alternating, PatternConfig, PatternGenerator},
    strip_writer::spi::SpiStripWriter,
    timer::TimerService,
};
use {defmt_rtt as _, panic_probe as _};

// A 16×20 panel on hardware SPI0: clock on GP18, data on GP19.
const LED_COUNT: usize = 320;
const SPI_HZ: u32 = 2_000_000;

static BUFFERS: StaticCell<BufferPair<LED_COUNT>> = StaticCell::new();

#[embassy_executor::main]
async fn main(_spawner: Spawner) -> ! {
    let err = inner_main().await.unwrap_err();
    panic!("{err}");
}

async fn inner_main() -> Result<Infallible> {
    let p = embassy_rp::init(Default::default());

    let mut config = spi::Config::default();
    config.frequency = SPI_HZ;
    let spi = Spi::new_blocking_txonly(p.SPI0, p.PIN_18, p.PIN_19, config);
    let writer = SpiStripWriter::<_, LED_COUNT>::new(PicoSpiSink::new(spi, embassy_rp::pac::SPI0));

    // Dim white until the first frame is rendered.
    let buffers = BUFFERS.init(BufferPair::filled(0x0F));
    let timer = TimerService::new(EmbassyTicks, EmbassyTicks::calibration()?);
    let producer = PatternGenerator::new(Alternating::default(), PatternConfig::default());

    let mut control_loop = ControlLoop::new(buffers, writer, producer, timer);
    loop {
        control_loop.tick()?;
        embassy_futures::yield_now().await;
    }
}
