#![cfg(feature = "host")]
#![allow(missing_docs)]
//! Image ingestion: cursor movement, swaps and resynchronisation.

use core::cell::Cell;
use std::collections::VecDeque;

use strip_kit::layout::{ChannelOrder, LedLayout, PanelMapping, Rotation};
use strip_kit::pixel_store::BufferPair;
use strip_kit::producer::FrameProducer;
use strip_kit::producer::ingest::{
    CHUNK_CAPACITY, FRAME_LINE, IngestConfig, IngestCursor, Ingester, LineTransport, READY_LINE,
    TIMEOUT_LINE,
};
use strip_kit::timer::{Calibration, TickSource, TimerService};

struct FakeTicks(Cell<u32>);

impl TickSource for FakeTicks {
    fn now(&self) -> u32 {
        self.0.get()
    }
}

fn timer(ticks: &FakeTicks) -> TimerService<&FakeTicks> {
    TimerService::new(ticks, Calibration::from_counter_hz(1_000_000).expect("1 MHz"))
}

/// Hands out queued chunks, one per read, and records every line written.
#[derive(Default)]
struct ScriptedTransport {
    chunks: VecDeque<heapless::Vec<u8, CHUNK_CAPACITY>>,
    lines: Vec<String>,
}

impl ScriptedTransport {
    fn queue(&mut self, bytes: &[u8]) {
        let chunk = heapless::Vec::from_slice(bytes).expect("chunk fits");
        self.chunks.push_back(chunk);
    }
}

impl LineTransport for ScriptedTransport {
    fn read_available(&mut self) -> heapless::Vec<u8, CHUNK_CAPACITY> {
        self.chunks.pop_front().unwrap_or_default()
    }

    fn write_line(&mut self, line: &str) {
        self.lines.push(line.to_owned());
    }
}

const TIMEOUT_MS: u32 = 2;

type Ingester2x2 = Ingester<ScriptedTransport, 4, 2, 2>;

fn ingester(config: IngestConfig) -> Ingester2x2 {
    Ingester::new(
        ScriptedTransport::default(),
        PanelMapping::new(Rotation::None, ChannelOrder::Rgb),
        config.with_timeout_ms(TIMEOUT_MS),
    )
}

#[test]
fn first_advance_announces_ready() {
    let ticks = FakeTicks(Cell::new(0));
    let timer = timer(&ticks);
    let mut buffers = BufferPair::<4>::new();
    let mut ingester = ingester(IngestConfig::default());
    assert!(ingester.transport().lines.is_empty());

    ingester.advance(&mut buffers, &timer);
    ingester.advance(&mut buffers, &timer);
    assert_eq!(ingester.transport().lines, [READY_LINE]);
}

#[test]
fn complete_image_swaps_into_serpentine_order() {
    let ticks = FakeTicks(Cell::new(0));
    let timer = timer(&ticks);
    let mut buffers = BufferPair::<4>::new();
    let mut ingester = ingester(IngestConfig::default());

    // Row 0: pixels A B, row 1: pixels C D.
    let image = [1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12];
    ingester.transport_mut().queue(&image[..5]);
    ingester.transport_mut().queue(&image[5..]);

    ingester.advance(&mut buffers, &timer);
    assert_eq!(buffers.swap_count(), 0);
    assert_eq!(
        ingester.cursor(),
        IngestCursor {
            column: 1,
            row: 0,
            channel: 2
        }
    );

    ingester.advance(&mut buffers, &timer);
    assert_eq!(buffers.swap_count(), 1);
    assert_eq!(ingester.frames_received(), 1);
    assert_eq!(ingester.cursor(), IngestCursor::ORIGIN);
    // Row 1 is wired right to left.
    assert_eq!(buffers.draw(), &[[1, 2, 3], [4, 5, 6], [10, 11, 12], [7, 8, 9]]);
    assert_eq!(ingester.transport().lines, [READY_LINE]);
}

#[test]
fn linear_layout_reproduces_the_input_bytes() {
    const WIDTH: usize = 4;
    const HEIGHT: usize = 3;
    const LED_COUNT: usize = WIDTH * HEIGHT;

    let ticks = FakeTicks(Cell::new(0));
    let timer = timer(&ticks);
    let mut buffers = BufferPair::<LED_COUNT>::new();
    let mut ingester = Ingester::<ScriptedTransport, LED_COUNT, WIDTH, HEIGHT>::new(
        ScriptedTransport::default(),
        PanelMapping::from_layout(&LedLayout::linear_row_major(), ChannelOrder::Rgb),
        IngestConfig::default(),
    );

    let image: Vec<u8> = (0..36_u8).map(|byte| byte * 7 + 1).collect();
    assert_eq!(image.len(), LED_COUNT * 3);
    for chunk in image.chunks(7) {
        ingester.transport_mut().queue(chunk);
    }
    for _ in 0..image.len().div_ceil(7) {
        assert_eq!(buffers.swap_count(), 0);
        ingester.advance(&mut buffers, &timer);
    }

    assert_eq!(buffers.swap_count(), 1);
    assert_eq!(ingester.cursor(), IngestCursor::ORIGIN);
    assert_eq!(buffers.draw_bytes(), image.as_slice());
}

#[test]
fn bytes_past_a_frame_start_the_next_one() {
    let ticks = FakeTicks(Cell::new(0));
    let timer = timer(&ticks);
    let mut buffers = BufferPair::<4>::new();
    let mut ingester = ingester(IngestConfig::default().with_announce_frames(true));

    let mut chunk: Vec<u8> = (1..=12).collect();
    chunk.extend([0xAA, 0xBB]);
    ingester.transport_mut().queue(&chunk);
    ingester.advance(&mut buffers, &timer);

    assert_eq!(buffers.swap_count(), 1);
    assert_eq!(
        ingester.cursor(),
        IngestCursor {
            column: 0,
            row: 0,
            channel: 2
        }
    );
    assert_eq!(&buffers.edit_mut()[0][..2], [0xAA, 0xBB]);
    assert_eq!(ingester.transport().lines, [READY_LINE, FRAME_LINE]);
}

#[test]
fn silence_resets_the_cursor_to_origin() {
    let ticks = FakeTicks(Cell::new(0));
    let timer = timer(&ticks);
    let mut buffers = BufferPair::<4>::new();
    let mut ingester = ingester(IngestConfig::default());

    ingester.transport_mut().queue(&[9, 9, 9, 9, 9]);
    ingester.advance(&mut buffers, &timer);
    assert_eq!(ingester.cursor().column, 1);

    // Two 1 ms quanta, each elapsing one tick after its stop value.
    ticks.0.set(1_001);
    ingester.advance(&mut buffers, &timer);
    assert_eq!(ingester.timeouts(), 0);
    ticks.0.set(2_002);
    ingester.advance(&mut buffers, &timer);
    assert_eq!(ingester.timeouts(), 1);
    assert_eq!(ingester.cursor(), IngestCursor::ORIGIN);
    assert_eq!(ingester.transport().lines, [READY_LINE, TIMEOUT_LINE]);

    // The next byte lands at the origin.
    ingester.transport_mut().queue(&[42]);
    ingester.advance(&mut buffers, &timer);
    assert_eq!(buffers.edit_mut()[0][0], 42);
    assert_eq!(buffers.swap_count(), 0);
}

#[test]
fn steady_traffic_never_times_out() {
    let ticks = FakeTicks(Cell::new(0));
    let timer = timer(&ticks);
    let mut buffers = BufferPair::<4>::new();
    let mut ingester = ingester(IngestConfig::default());

    for step in 0..24_u32 {
        ticks.0.set(step * 900);
        ingester.transport_mut().queue(&[0x10]);
        ingester.advance(&mut buffers, &timer);
    }
    assert_eq!(ingester.timeouts(), 0);
    assert_eq!(ingester.frames_received(), 2);
}

#[test]
fn quiet_link_keeps_reporting_timeouts() {
    let ticks = FakeTicks(Cell::new(0));
    let timer = timer(&ticks);
    let mut buffers = BufferPair::<4>::new();
    let mut ingester = ingester(IngestConfig::default());

    for now in (0..10_000).step_by(100) {
        ticks.0.set(now);
        ingester.advance(&mut buffers, &timer);
    }
    assert!(ingester.timeouts() >= 4);
    assert_eq!(buffers.swap_count(), 0);
}
