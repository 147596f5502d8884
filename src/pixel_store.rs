//! Double-buffered pixel storage shared by the strip writers and the frame producer.
//!
//! Two equally sized buffers of `N` pixels, three bytes each, in physical strip
//! order. At any moment one buffer is the *draw* buffer (writers read it) and the
//! other the *edit* buffer (the producer fills it). [`BufferPair::swap`] exchanges the
//! roles; it is the only hand-off between producer and writers.
//!
//! Writers take `&BufferPair`, the producer takes `&mut BufferPair`, so the borrow
//! checker keeps a writer from ever observing the edit buffer while it is being
//! filled.

/// Bytes per pixel.
pub const CHANNELS: usize = 3;

/// One frame of `N` pixels in physical strip order, channel bytes in wire order.
pub type PixelBuffer<const N: usize> = [[u8; CHANNELS]; N];

/// The role a buffer currently plays.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Role {
    /// Being transmitted by the writers.
    Draw,
    /// Being filled by the producer.
    Edit,
}

/// Identifies one of the two physical buffers independent of its role.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Slot {
    /// The buffer that starts out as the draw buffer.
    First,
    /// The buffer that starts out as the edit buffer.
    Second,
}

/// Two pixel buffers and a flag telling which one is drawn.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct BufferPair<const N: usize> {
    buffers: [PixelBuffer<N>; 2],
    first_is_draw: bool,
    swap_count: u32,
}

impl<const N: usize> Default for BufferPair<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> BufferPair<N> {
    /// Bytes in one buffer.
    pub const LEN: usize = N * CHANNELS;

    /// Both buffers zeroed; [`Slot::First`] is the draw buffer.
    #[must_use]
    pub const fn new() -> Self {
        Self::filled(0)
    }

    /// Both buffers set to `byte` in every position.
    ///
    /// The wire protocol sends each byte with its top bit forced high, so a strip
    /// fed zeroed buffers shows every LED off.
    #[must_use]
    pub const fn filled(byte: u8) -> Self {
        Self::from_buffers([[byte; CHANNELS]; N], [[byte; CHANNELS]; N])
    }

    /// Start from explicit contents: `draw` is transmitted first, `edit` is the one
    /// handed to the producer.
    #[must_use]
    pub const fn from_buffers(draw: PixelBuffer<N>, edit: PixelBuffer<N>) -> Self {
        Self {
            buffers: [draw, edit],
            first_is_draw: true,
            swap_count: 0,
        }
    }

    /// The buffer currently being transmitted.
    #[must_use]
    pub const fn draw(&self) -> &PixelBuffer<N> {
        let [first, second] = &self.buffers;
        if self.first_is_draw { first } else { second }
    }

    /// The draw buffer as `N * 3` contiguous bytes.
    #[must_use]
    pub const fn draw_bytes(&self) -> &[u8] {
        self.draw().as_flattened()
    }

    /// The buffer currently being filled.
    pub const fn edit_mut(&mut self) -> &mut PixelBuffer<N> {
        let [first, second] = &mut self.buffers;
        if self.first_is_draw { second } else { first }
    }

    /// The edit buffer as `N * 3` contiguous bytes.
    pub fn edit_bytes_mut(&mut self) -> &mut [u8] {
        self.edit_mut().as_flattened_mut()
    }

    /// Exchange the draw and edit roles. Contents are not touched.
    pub fn swap(&mut self) {
        self.first_is_draw = !self.first_is_draw;
        self.swap_count = self.swap_count.wrapping_add(1);
        debug!("buffers swapped ({})", self.swap_count);
    }

    /// Current role of `slot`.
    #[must_use]
    pub const fn role_of(&self, slot: Slot) -> Role {
        match (slot, self.first_is_draw) {
            (Slot::First, true) | (Slot::Second, false) => Role::Draw,
            (Slot::First, false) | (Slot::Second, true) => Role::Edit,
        }
    }

    /// Number of swaps since construction (wrapping).
    #[must_use]
    pub const fn swap_count(&self) -> u32 {
        self.swap_count
    }
}
