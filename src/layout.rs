//! Panel geometry: how `(x, y)` cells of a rectangular LED panel map to positions on
//! the physical strip, and how incoming color channels map to wire byte order.
//!
//! See [`LedLayout`] for wiring, [`Rotation`] and [`ChannelOrder`] for the two
//! build-time choices, and [`PanelMapping`] for the precomputed byte-offset table the
//! ingester uses.

use smart_leds::RGB8;

use crate::pixel_store::CHANNELS;

/// Compile-time description of panel wiring.
///
/// `LedLayout` records, for every LED in strip order, the `(x, y)` cell it lights.
/// `(0, 0)` is the top-left corner, `x` grows to the right and `y` downward.
///
/// Layouts are validated when constructed (in `const` context, at compile time):
/// every coordinate must be in bounds and every cell must appear exactly once.
///
/// Start from a constructor ([`serpentine_row_major`](Self::serpentine_row_major),
/// [`linear_row_major`](Self::linear_row_major) or [`new`](Self::new)) and apply
/// rotations as needed.
///
/// ```text
/// Serpentine 3×2 rotated clockwise to 2×3:
///
///   Before:              After:
///     LED0  LED1  LED2     LED5  LED0
///     LED5  LED4  LED3     LED4  LED1
///                          LED3  LED2
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LedLayout<const N: usize, const W: usize, const H: usize> {
    map: [(u16, u16); N],
}

impl<const N: usize, const W: usize, const H: usize> LedLayout<N, W, H> {
    /// `(x, y)` of each LED, in strip order.
    #[must_use]
    pub const fn index_to_xy(&self) -> &[(u16, u16); N] {
        &self.map
    }

    /// Inverse mapping: entry `y * W + x` is the strip index of cell `(x, y)`.
    #[must_use]
    pub const fn xy_to_index(&self) -> [u16; N] {
        assert!(
            N <= u16::MAX as usize,
            "total LEDs must fit in u16 for xy_to_index"
        );

        let mut inverse = [0_u16; N];
        let mut seen = [false; N];
        let mut led_index = 0;
        while led_index < N {
            let (col, row) = self.map[led_index];
            let cell = row as usize * W + col as usize;
            assert!(!seen[cell], "duplicate (col,row) in xy_to_index inversion");
            seen[cell] = true;
            inverse[cell] = led_index as u16;
            led_index += 1;
        }
        inverse
    }

    /// Layout from an explicit `(x, y)` per LED, in strip order.
    ///
    /// # Panics
    ///
    /// If `W * H != N`, a coordinate is out of bounds, or a cell is listed twice or
    /// not at all. In `const` context these are compile errors.
    #[must_use]
    pub const fn new(map: [(u16, u16); N]) -> Self {
        assert!(W > 0 && H > 0, "W and H must be positive");
        assert!(W * H == N, "W*H must equal N");

        let mut seen = [false; N];

        let mut i = 0;
        while i < N {
            let (c, r) = map[i];
            let c = c as usize;
            let r = r as usize;

            assert!(c < W, "column out of bounds");
            assert!(r < H, "row out of bounds");

            let cell = r * W + c;
            assert!(!seen[cell], "duplicate (col,row) in mapping");
            seen[cell] = true;

            i += 1;
        }

        let mut k = 0;
        while k < N {
            assert!(seen[k], "mapping does not cover every cell");
            k += 1;
        }

        Self { map }
    }

    /// Every row left to right, top row first.
    ///
    /// ```text
    ///   LED0  LED1  LED2
    ///   LED3  LED4  LED5
    /// ```
    #[must_use]
    pub const fn linear_row_major() -> Self {
        assert!(W > 0 && H > 0, "W and H must be positive");
        assert!(W * H == N, "W*H must equal N");

        let mut mapping = [(0_u16, 0_u16); N];
        let mut led_index = 0;
        while led_index < N {
            mapping[led_index] = ((led_index % W) as u16, (led_index / W) as u16);
            led_index += 1;
        }
        Self::new(mapping)
    }

    /// Rows wired left-to-right, then right-to-left, alternating, top row first.
    ///
    /// This is how the supported panels are wired.
    ///
    /// ```text
    ///   LED0  LED1  LED2
    ///   LED5  LED4  LED3
    /// ```
    #[must_use]
    pub const fn serpentine_row_major() -> Self {
        assert!(W > 0 && H > 0, "W and H must be positive");
        assert!(W * H == N, "W*H must equal N");

        let mut mapping = [(0_u16, 0_u16); N];
        let mut y_index = 0;
        while y_index < H {
            let mut x_index = 0;
            while x_index < W {
                let led_index = if y_index % 2 == 0 {
                    y_index * W + x_index
                } else {
                    y_index * W + (W - 1 - x_index)
                };
                mapping[led_index] = (x_index as u16, y_index as u16);
                x_index += 1;
            }
            y_index += 1;
        }
        Self::new(mapping)
    }

    /// Rotate 90° clockwise. A `W×H` layout becomes `H×W`.
    #[must_use]
    pub const fn rotate_cw(self) -> LedLayout<N, H, W> {
        let mut out = [(0u16, 0u16); N];
        let mut i = 0;
        while i < N {
            let (c, r) = self.map[i];
            out[i] = ((H - 1 - r as usize) as u16, c);
            i += 1;
        }
        LedLayout::<N, H, W>::new(out)
    }

    /// Rotate 180°.
    #[must_use]
    pub const fn rotate_180(self) -> Self {
        self.rotate_cw().rotate_cw()
    }

    /// Rotate 90° counter-clockwise.
    #[must_use]
    pub const fn rotate_ccw(self) -> LedLayout<N, H, W> {
        self.rotate_cw().rotate_cw().rotate_cw()
    }

    /// Layout of a serpentine-row-major panel as seen by a sender that treats it as a
    /// `W×H` image turned by `rotation`.
    ///
    /// `W` and `H` are the dimensions of the *incoming* image. For
    /// [`Rotation::Cw90`] the physical panel is `H` cells wide and `W` tall.
    #[must_use]
    pub const fn for_input(rotation: Rotation) -> Self {
        match rotation {
            Rotation::None => Self::serpentine_row_major(),
            Rotation::Cw90 => LedLayout::<N, H, W>::serpentine_row_major().rotate_ccw(),
            Rotation::Cw180 => Self::serpentine_row_major().rotate_180(),
        }
    }
}

/// How the incoming image is turned relative to the panel.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Rotation {
    /// Image rows run along the panel rows.
    #[default]
    None,
    /// The image appears turned 90° clockwise; its rows run down panel columns.
    Cw90,
    /// The image appears upside down.
    Cw180,
}

/// Physical byte order of the three color channels on the strip.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ChannelOrder {
    /// Red, green, blue.
    Rgb,
    /// Red, blue, green.
    Rbg,
    /// Green, red, blue. LPD8806 strips use this order.
    #[default]
    Grb,
    /// Green, blue, red.
    Gbr,
    /// Blue, red, green.
    Brg,
    /// Blue, green, red.
    Bgr,
}

/// Channel order used when nothing else is configured.
pub const CHANNEL_ORDER_DEFAULT: ChannelOrder = ChannelOrder::Grb;

impl ChannelOrder {
    /// Physical slot of each incoming channel, indexed red, green, blue.
    #[must_use]
    pub const fn slots(self) -> [u8; CHANNELS] {
        match self {
            Self::Rgb => [0, 1, 2],
            Self::Rbg => [0, 2, 1],
            Self::Grb => [1, 0, 2],
            Self::Gbr => [2, 0, 1],
            Self::Brg => [1, 2, 0],
            Self::Bgr => [2, 1, 0],
        }
    }

    /// Physical slot of incoming channel `channel` (0 red, 1 green, 2 blue).
    #[must_use]
    pub const fn slot(self, channel: usize) -> usize {
        self.slots()[channel] as usize
    }

    /// A color's three bytes in physical order.
    #[must_use]
    pub const fn encode(self, color: RGB8) -> [u8; CHANNELS] {
        let [red, green, blue] = self.slots();
        let mut bytes = [0_u8; CHANNELS];
        bytes[red as usize] = color.r;
        bytes[green as usize] = color.g;
        bytes[blue as usize] = color.b;
        bytes
    }
}

/// Precomputed `(x, y, channel)` → buffer byte offset for an incoming `W×H` image.
///
/// ```text
/// offset(x, y, c) = 3 · xy_to_index[y·W + x] + channel_order.slot(c)
/// ```
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct PanelMapping<const N: usize, const W: usize, const H: usize> {
    xy_to_index: [u16; N],
    channel_order: ChannelOrder,
}

impl<const N: usize, const W: usize, const H: usize> PanelMapping<N, W, H> {
    /// Mapping for a serpentine-row-major panel fed an image turned by `rotation`.
    #[must_use]
    pub const fn new(rotation: Rotation, channel_order: ChannelOrder) -> Self {
        Self::from_layout(&LedLayout::for_input(rotation), channel_order)
    }

    /// Mapping for an arbitrary layout in input coordinates.
    #[must_use]
    pub const fn from_layout(layout: &LedLayout<N, W, H>, channel_order: ChannelOrder) -> Self {
        Self {
            xy_to_index: layout.xy_to_index(),
            channel_order,
        }
    }

    /// Strip index of input cell `(x, y)`.
    #[must_use]
    pub const fn led_index(&self, x: usize, y: usize) -> usize {
        self.xy_to_index[y * W + x] as usize
    }

    /// Byte offset in a pixel buffer for channel `channel` of input cell `(x, y)`.
    #[must_use]
    pub const fn offset(&self, x: usize, y: usize, channel: usize) -> usize {
        self.led_index(x, y) * CHANNELS + self.channel_order.slot(channel)
    }

    /// The configured channel order.
    #[must_use]
    pub const fn channel_order(&self) -> ChannelOrder {
        self.channel_order
    }
}
