// Frame slots - Two alternating presentation buffers
//
// The slot being filled is never the one the display is reading from.

use super::surface::Surface;
use crate::platform::DisplaySink;

/// One presentation buffer holding a visible RGB565 picture
#[derive(Debug, Clone)]
pub struct FrameSlot {
    pixels: Vec<u16>,
    width: usize,
    height: usize,
}

impl FrameSlot {
    /// Create a black slot
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            pixels: vec![0; width * height],
            width,
            height,
        }
    }

    /// Width in pixels
    pub fn width(&self) -> usize {
        self.width
    }

    /// Height in pixels
    pub fn height(&self) -> usize {
        self.height
    }

    /// Raw RGB565 pixels, row-major
    pub fn as_slice(&self) -> &[u16] {
        &self.pixels
    }

    /// Read one pixel
    #[inline]
    pub fn pixel(&self, x: usize, y: usize) -> u16 {
        self.pixels[y * self.width + x]
    }

    fn copy_from_surface(&mut self, surface: &Surface) {
        let width = self.width.min(surface.width());
        for y in 0..self.height.min(surface.height()) {
            let dst = &mut self.pixels[y * self.width..y * self.width + width];
            dst.copy_from_slice(&surface.row(y as isize)[..width]);
        }
    }
}

/// Double-buffered presentation slots
#[derive(Debug)]
pub struct FrameSlots {
    slots: [FrameSlot; 2],
    /// Index of the slot last handed to the display
    front: usize,
    presented: u64,
}

impl FrameSlots {
    /// Create both slots with the given size
    pub fn with_size(width: usize, height: usize) -> Self {
        Self {
            slots: [FrameSlot::new(width, height), FrameSlot::new(width, height)],
            front: 0,
            presented: 0,
        }
    }

    /// Slot currently shown by the display
    pub fn front(&self) -> &FrameSlot {
        &self.slots[self.front]
    }

    /// Index of the slot that will be written next
    pub fn back_index(&self) -> usize {
        1 - self.front
    }

    /// Number of frames handed to the display so far
    pub fn presented(&self) -> u64 {
        self.presented
    }

    /// Copy `surface` into the back slot, enqueue it, and flip
    ///
    /// The previously shown slot is passed along so the display may diff
    /// against it. The enqueue does not wait for the display.
    pub fn present(&mut self, surface: &Surface, display: &mut dyn DisplaySink) {
        let back = self.back_index();
        self.slots[back].copy_from_surface(surface);

        let [first, second] = &self.slots;
        let (written, shown) = if back == 0 {
            (first, second)
        } else {
            (second, first)
        };
        let previous = (self.presented > 0).then_some(shown);
        display.queue_update(written, previous);

        self.front = back;
        self.presented += 1;
    }
}
