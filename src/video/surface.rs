// Surface - Pixel planes with an overscan band above and below
//
// The renderer addresses rows relative to an origin that sits one overscan
// band into the allocation, so row -1 (used for extended/overscan rendering)
// is still inside the buffer.

use std::collections::TryReserveError;
use std::mem::size_of;
use thiserror::Error;

/// Visible width of the SNES picture in pixels
pub const SNES_WIDTH: usize = 256;

/// Visible height of the SNES picture in lines
pub const SNES_HEIGHT: usize = 224;

/// Height including the extended (overscan) display mode
pub const SNES_HEIGHT_EXTENDED: usize = 239;

/// Rows reserved above and below the addressable picture
pub const OVERSCAN_ROWS: usize = 1;

/// Plane allocation failure
#[derive(Debug, Error)]
pub enum PlaneError {
    #[error("{width}x{height} plane does not fit in memory")]
    TooLarge { width: usize, height: usize },

    #[error(transparent)]
    OutOfMemory(#[from] TryReserveError),
}

/// A row-addressable pixel plane
///
/// Storage is `width * (height + 2 * OVERSCAN_ROWS)` elements. Row `y` is
/// valid for `-OVERSCAN_ROWS <= y < height + OVERSCAN_ROWS`.
#[derive(Debug, Clone)]
pub struct Plane<T> {
    data: Vec<T>,
    width: usize,
    height: usize,
    origin: usize,
}

/// RGB565 little-endian colour plane (main or sub screen)
pub type Surface = Plane<u16>;

/// Depth plane used by the renderer for priority resolution
pub type ZBuffer = Plane<u8>;

impl<T: Copy + Default> Plane<T> {
    /// Allocate a plane, failing instead of aborting when memory is short
    ///
    /// # Arguments
    /// * `width` - Pixels per row
    /// * `height` - Addressable rows (excluding the overscan bands)
    pub fn allocate(width: usize, height: usize) -> Result<Self, PlaneError> {
        let len = height
            .checked_add(2 * OVERSCAN_ROWS)
            .and_then(|rows| rows.checked_mul(width))
            .ok_or(PlaneError::TooLarge { width, height })?;
        let mut data = Vec::new();
        data.try_reserve_exact(len)?;
        data.resize(len, T::default());

        Ok(Self {
            data,
            width,
            height,
            origin: OVERSCAN_ROWS * width,
        })
    }

    /// Pixels per row
    pub fn width(&self) -> usize {
        self.width
    }

    /// Addressable rows
    pub fn height(&self) -> usize {
        self.height
    }

    /// Bytes per row
    pub fn pitch(&self) -> usize {
        self.width * size_of::<T>()
    }

    /// Address of pixel (0, 0)
    ///
    /// Only used to derive the main/sub distance; never dereferenced.
    pub fn base_address(&self) -> usize {
        self.data.as_ptr().wrapping_add(self.origin) as usize
    }

    fn row_start(&self, y: isize) -> usize {
        let overscan = OVERSCAN_ROWS as isize;
        assert!(
            y >= -overscan && y < self.height as isize + overscan,
            "row {} out of bounds",
            y
        );
        (self.origin as isize + y * self.width as isize) as usize
    }

    /// Borrow one row; negative rows reach into the top overscan band
    ///
    /// # Panics
    /// Panics if `y` is outside the allocation
    pub fn row(&self, y: isize) -> &[T] {
        let start = self.row_start(y);
        &self.data[start..start + self.width]
    }

    /// Mutably borrow one row
    ///
    /// # Panics
    /// Panics if `y` is outside the allocation
    pub fn row_mut(&mut self, y: isize) -> &mut [T] {
        let start = self.row_start(y);
        let width = self.width;
        &mut self.data[start..start + width]
    }

    /// Read a pixel
    #[inline]
    pub fn get(&self, x: usize, y: isize) -> T {
        assert!(x < self.width, "X coordinate {} out of bounds", x);
        self.row(y)[x]
    }

    /// Write a pixel
    #[inline]
    pub fn set(&mut self, x: usize, y: isize, value: T) {
        assert!(x < self.width, "X coordinate {} out of bounds", x);
        self.row_mut(y)[x] = value;
    }

    /// Fill the whole allocation, overscan bands included
    pub fn fill(&mut self, value: T) {
        self.data.fill(value);
    }
}
