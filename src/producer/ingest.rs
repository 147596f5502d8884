//! Image ingestion from a line-buffered byte transport (typically USB CDC).
//!
//! The sender streams raw images: `W × H` pixels, row by row, three bytes per pixel
//! in red, green, blue order. Nothing frames the bytes; the receiver's cursor alone
//! says where the next byte goes:
//!
//! ```text
//! byte:   R G B R G B ... R G B   R G B ...
//! cursor: (0,0)  (1,0)    (W-1,0) (0,1) ...        (W-1,H-1) → swap, back to (0,0)
//! ```
//!
//! If the sender stops mid-image (a dropped connection, a restarted script), the
//! cursor would stay out of step forever. A countdown restarted by every received
//! chunk catches that: when it fires, the cursor returns to the origin and the
//! sender is told so.

use heapless::Vec;

use super::FrameProducer;
use crate::layout::PanelMapping;
use crate::pixel_store::{BufferPair, CHANNELS};
use crate::timer::{Countdown, TickSource, TimerService};

/// Largest chunk a transport hands over in one read.
pub const CHUNK_CAPACITY: usize = 64;

/// Silence after which the cursor is reset, in milliseconds.
pub const INGEST_TIMEOUT_MS_DEFAULT: u32 = 5_000;

/// Sent once when the ingester starts.
pub const READY_LINE: &str = "READY!";
/// Sent when the cursor is reset after a silence.
pub const TIMEOUT_LINE: &str = "Timeout, init index - READY!";
/// Sent after each complete image when [`IngestConfig::announce_frames`] is set.
pub const FRAME_LINE: &str = "Received an image, switching buffers - READY!";

/// A bidirectional, line-oriented byte channel.
///
/// Both methods must return promptly.
pub trait LineTransport {
    /// Bytes received since the last call; empty if none.
    fn read_available(&mut self) -> Vec<u8, CHUNK_CAPACITY>;

    /// Send one diagnostic line. Implementations append the line terminator.
    fn write_line(&mut self, line: &str);
}

impl<L: LineTransport + ?Sized> LineTransport for &mut L {
    fn read_available(&mut self) -> Vec<u8, CHUNK_CAPACITY> {
        (**self).read_available()
    }

    fn write_line(&mut self, line: &str) {
        (**self).write_line(line);
    }
}

/// Ingester settings.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct IngestConfig {
    /// Silence, in milliseconds, after which the cursor returns to the origin.
    pub timeout_ms: u32,
    /// Send [`FRAME_LINE`] after every complete image.
    pub announce_frames: bool,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl IngestConfig {
    /// Default settings.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            timeout_ms: INGEST_TIMEOUT_MS_DEFAULT,
            announce_frames: false,
        }
    }

    /// Use a different resynchronisation timeout.
    #[must_use]
    pub const fn with_timeout_ms(mut self, timeout_ms: u32) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    /// Turn per-image notices on or off.
    #[must_use]
    pub const fn with_announce_frames(mut self, announce_frames: bool) -> Self {
        self.announce_frames = announce_frames;
        self
    }
}

/// Where the next incoming byte lands, in input coordinates.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct IngestCursor {
    /// Input column, `0..W`.
    pub column: usize,
    /// Input row, `0..H`.
    pub row: usize,
    /// Color channel, 0 red, 1 green, 2 blue.
    pub channel: usize,
}

impl IngestCursor {
    /// The first byte of an image.
    pub const ORIGIN: Self = Self {
        column: 0,
        row: 0,
        channel: 0,
    };

    /// Move past one byte of a `width`-column image. Returns the new cursor; its
    /// `row` equals the image height once the final byte has been consumed.
    #[must_use]
    const fn next(self, width: usize) -> Self {
        let Self {
            mut column,
            mut row,
            mut channel,
        } = self;
        channel += 1;
        if channel == CHANNELS {
            channel = 0;
            column += 1;
            if column == width {
                column = 0;
                row += 1;
            }
        }
        Self {
            column,
            row,
            channel,
        }
    }
}

/// Writes incoming image bytes into the edit buffer and swaps after each image.
///
/// `W × H` is the incoming image size; `N` must equal `W * H`.
pub struct Ingester<L, const N: usize, const W: usize, const H: usize> {
    transport: L,
    mapping: PanelMapping<N, W, H>,
    config: IngestConfig,
    cursor: IngestCursor,
    timeout: Countdown,
    started: bool,
    frames_received: u32,
    timeouts: u32,
}

impl<L: LineTransport, const N: usize, const W: usize, const H: usize> Ingester<L, N, W, H> {
    /// Create an ingester. Nothing is sent until the first advance.
    #[must_use]
    pub const fn new(transport: L, mapping: PanelMapping<N, W, H>, config: IngestConfig) -> Self {
        const { assert!(W * H == N, "input image must cover every LED exactly once") };
        Self {
            transport,
            mapping,
            config,
            cursor: IngestCursor::ORIGIN,
            timeout: Countdown::new(),
            started: false,
            frames_received: 0,
            timeouts: 0,
        }
    }

    /// Where the next byte will land.
    #[must_use]
    pub const fn cursor(&self) -> IngestCursor {
        self.cursor
    }

    /// Complete images received so far (wrapping).
    #[must_use]
    pub const fn frames_received(&self) -> u32 {
        self.frames_received
    }

    /// Number of resynchronisations so far (wrapping).
    #[must_use]
    pub const fn timeouts(&self) -> u32 {
        self.timeouts
    }

    /// The wrapped transport.
    #[must_use]
    pub const fn transport(&self) -> &L {
        &self.transport
    }

    /// The wrapped transport, mutably.
    pub const fn transport_mut(&mut self) -> &mut L {
        &mut self.transport
    }

    fn ingest_byte(&mut self, byte: u8, buffers: &mut BufferPair<N>) {
        let IngestCursor {
            column,
            row,
            channel,
        } = self.cursor;
        let offset = self.mapping.offset(column, row, channel);
        buffers.edit_bytes_mut()[offset] = byte;

        self.cursor = self.cursor.next(W);
        if self.cursor.row == H {
            buffers.swap();
            self.frames_received = self.frames_received.wrapping_add(1);
            debug!("image {} received", self.frames_received);
            if self.config.announce_frames {
                self.transport.write_line(FRAME_LINE);
            }
            self.cursor = IngestCursor::ORIGIN;
        }
    }
}

impl<L: LineTransport, const N: usize, const W: usize, const H: usize> FrameProducer<N>
    for Ingester<L, N, W, H>
{
    fn advance<T: TickSource>(&mut self, buffers: &mut BufferPair<N>, timer: &TimerService<T>) {
        if !self.started {
            self.started = true;
            info!("ingesting {}x{} images", W, H);
            self.transport.write_line(READY_LINE);
            timer.start_ms(&mut self.timeout, self.config.timeout_ms);
        }

        if timer.poll(&mut self.timeout) {
            warn!(
                "no image data for {} ms, cursor reset from ({}, {})",
                self.config.timeout_ms,
                self.cursor.column,
                self.cursor.row
            );
            self.timeouts = self.timeouts.wrapping_add(1);
            self.cursor = IngestCursor::ORIGIN;
            self.transport.write_line(TIMEOUT_LINE);
            timer.start_ms(&mut self.timeout, self.config.timeout_ms);
        }

        let chunk = self.transport.read_available();
        if chunk.is_empty() {
            return;
        }
        timer.start_ms(&mut self.timeout, self.config.timeout_ms);
        for &byte in &chunk {
            self.ingest_byte(byte, buffers);
        }
    }
}
