// Video module - Render surfaces and frame presentation
//
// This module provides:
// - Main and sub screen surfaces (RGB565) with overscan bands
// - Matching Z-buffers
// - The signed main/sub distance (`delta`) used for sub-screen blending
// - Double-buffered presentation slots
// - PNG screenshots of the displayed frame

pub mod screenshot;
pub mod slots;
pub mod surface;

pub use screenshot::{save_frame, ScreenshotError};
pub use slots::{FrameSlot, FrameSlots};
pub use surface::{
    Plane, PlaneError, Surface, ZBuffer, OVERSCAN_ROWS, SNES_HEIGHT, SNES_HEIGHT_EXTENDED,
    SNES_WIDTH,
};

use crate::error::{FrontendError, InitStage};
use crate::platform::{DisplaySink, PixelFormat, SourceFormat};
use tracing::debug;

/// Simultaneous access to the main and sub planes
///
/// Handed to the emulation core for one step; replaces addressing the sub
/// screen through a pointer offset from the main screen.
#[derive(Debug)]
pub struct SurfacePair<'a> {
    main: &'a mut Surface,
    sub: &'a mut Surface,
    main_z: &'a mut ZBuffer,
    sub_z: &'a mut ZBuffer,
}

impl<'a> SurfacePair<'a> {
    /// Main screen
    pub fn main(&mut self) -> &mut Surface {
        &mut *self.main
    }

    /// Sub screen
    pub fn sub(&mut self) -> &mut Surface {
        &mut *self.sub
    }

    /// Main screen depth
    pub fn main_z(&mut self) -> &mut ZBuffer {
        &mut *self.main_z
    }

    /// Sub screen depth
    pub fn sub_z(&mut self) -> &mut ZBuffer {
        &mut *self.sub_z
    }

    /// Borrow both colour planes at once, main first
    pub fn screens(&mut self) -> (&mut Surface, &mut Surface) {
        (&mut *self.main, &mut *self.sub)
    }

    /// Borrow both depth planes at once, main first
    pub fn depths(&mut self) -> (&mut ZBuffer, &mut ZBuffer) {
        (&mut *self.main_z, &mut *self.sub_z)
    }
}

/// Owner of the render surfaces and the presentation slots
#[derive(Debug)]
pub struct VideoSurfaceManager {
    main: Surface,
    sub: Surface,
    main_z: ZBuffer,
    sub_z: ZBuffer,
    delta: isize,
    slots: FrameSlots,
}

impl VideoSurfaceManager {
    /// Allocate all four planes at the SNES extended size
    ///
    /// # Returns
    /// The manager, or a fatal display-memory error. No partial allocation
    /// is kept on failure.
    pub fn initialize() -> Result<Self, FrontendError> {
        Self::with_dimensions(SNES_WIDTH, SNES_HEIGHT_EXTENDED)
    }

    /// Allocate all four planes with custom dimensions
    pub fn with_dimensions(width: usize, height: usize) -> Result<Self, FrontendError> {
        let (main, sub, main_z, sub_z) = allocate_planes(width, height)?;

        let mut manager = Self {
            main,
            sub,
            main_z,
            sub_z,
            delta: 0,
            slots: FrameSlots::with_size(width, height.min(SNES_HEIGHT)),
        };
        manager.recompute_delta();

        debug!(
            width,
            height,
            pitch = manager.main.pitch(),
            delta = manager.delta,
            "display memory allocated"
        );

        Ok(manager)
    }

    /// Replace all four planes with fresh allocations
    ///
    /// `delta` is recomputed before this returns.
    pub fn reallocate(&mut self) -> Result<(), FrontendError> {
        let (main, sub, main_z, sub_z) = allocate_planes(self.main.width(), self.main.height())?;
        self.main = main;
        self.sub = sub;
        self.main_z = main_z;
        self.sub_z = sub_z;
        self.recompute_delta();
        Ok(())
    }

    fn recompute_delta(&mut self) {
        self.delta = (self.sub.base_address() as isize - self.main.base_address() as isize) >> 1;
    }

    /// Signed distance from the main screen to the sub screen, in pixels
    pub fn delta(&self) -> isize {
        self.delta
    }

    /// Main screen
    pub fn main(&self) -> &Surface {
        &self.main
    }

    /// Sub screen
    pub fn sub(&self) -> &Surface {
        &self.sub
    }

    /// Lend all four planes to the emulation core
    pub fn pair(&mut self) -> SurfacePair<'_> {
        SurfacePair {
            main: &mut self.main,
            sub: &mut self.sub,
            main_z: &mut self.main_z,
            sub_z: &mut self.sub_z,
        }
    }

    /// Format to declare to the display at boot
    pub fn source_format(&self) -> SourceFormat {
        SourceFormat {
            width: self.main.width(),
            height: self.main.height().min(SNES_HEIGHT),
            pitch: self.main.pitch(),
            format: PixelFormat::Rgb565Le,
        }
    }

    /// Hand the main screen to the display through the back slot
    pub fn present(&mut self, display: &mut dyn DisplaySink) {
        self.slots.present(&self.main, display);
    }

    /// Frame most recently handed to the display
    pub fn displayed_frame(&self) -> &FrameSlot {
        self.slots.front()
    }

    /// Presentation slots
    pub fn slots(&self) -> &FrameSlots {
        &self.slots
    }
}

fn allocate_planes(
    width: usize,
    height: usize,
) -> Result<(Surface, Surface, ZBuffer, ZBuffer), FrontendError> {
    let fail = |e: PlaneError| {
        FrontendError::fatal(InitStage::DisplayMemory, e.to_string())
    };

    let main = Surface::allocate(width, height).map_err(fail)?;
    let sub = Surface::allocate(width, height).map_err(fail)?;
    let main_z = ZBuffer::allocate(width, height).map_err(fail)?;
    let sub_z = ZBuffer::allocate(width, height).map_err(fail)?;

    Ok((main, sub, main_z, sub_z))
}
