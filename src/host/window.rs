// Window module - Desktop window driving the frame scheduler
//
// The winit event loop owns the scheduler. Each pass through
// `about_to_wait` runs one loop iteration; queued frames are converted from
// RGB565 and shown through pixels on the next redraw.

use super::DesktopPlatform;
use crate::core::EmulationCore;
use crate::error::{FrontendError, InitStage};
use crate::menu::MenuHost;
use crate::scheduler::{FrameScheduler, SchedulerState};
use crate::video::screenshot::rgb565_to_rgb888;
use crate::video::{FrameSlot, SNES_HEIGHT, SNES_WIDTH};
use pixels::{Pixels, PixelsBuilder, SurfaceTexture};
use std::sync::Arc;
use tracing::{error, info};
use winit::application::ApplicationHandler;
use winit::dpi::LogicalSize;
use winit::event::{ElementState, KeyEvent, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::window::{Window, WindowId};

/// Window configuration
#[derive(Debug, Clone, Copy)]
pub struct WindowConfig {
    /// Scale factor (1x to 4x)
    pub scale: u32,
    /// Whether to enable VSync
    pub vsync: bool,
}

impl WindowConfig {
    /// Create a new window configuration with default values
    ///
    /// Default: 3x scale, VSync disabled (the platform paces the loop)
    pub fn new() -> Self {
        Self {
            scale: 3,
            vsync: false,
        }
    }

    /// Set the scale factor
    pub fn with_scale(mut self, scale: u32) -> Self {
        self.scale = scale.clamp(1, 4);
        self
    }

    /// Set VSync enabled or disabled
    pub fn with_vsync(mut self, vsync: bool) -> Self {
        self.vsync = vsync;
        self
    }

    /// Get the window width in pixels
    pub fn window_width(&self) -> u32 {
        SNES_WIDTH as u32 * self.scale
    }

    /// Get the window height in pixels
    pub fn window_height(&self) -> u32 {
        SNES_HEIGHT as u32 * self.scale
    }
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Write an RGB565 frame into an RGBA8 buffer of `width` x `height`
///
/// Pixels outside the frame are left untouched.
pub fn frame_to_rgba(frame: &FrameSlot, rgba: &mut [u8], width: usize, height: usize) {
    let rows = height.min(frame.height());
    let cols = width.min(frame.width());
    for y in 0..rows {
        for x in 0..cols {
            let offset = (y * width + x) * 4;
            let Some(dst) = rgba.get_mut(offset..offset + 4) else {
                return;
            };
            let [r, g, b] = rgb565_to_rgb888(frame.pixel(x, y));
            dst.copy_from_slice(&[r, g, b, 0xFF]);
        }
    }
}

/// Event loop handler owning a booted scheduler
struct DesktopApp<C, M> {
    scheduler: FrameScheduler<DesktopPlatform, C, M>,
    config: WindowConfig,
    window: Option<Arc<Window>>,
    pixels: Option<Pixels<'static>>,
    error: Option<FrontendError>,
}

impl<C: EmulationCore, M: MenuHost> DesktopApp<C, M> {
    fn new(scheduler: FrameScheduler<DesktopPlatform, C, M>, config: WindowConfig) -> Self {
        Self {
            scheduler,
            config,
            window: None,
            pixels: None,
            error: None,
        }
    }

    fn create_surface(
        &self,
        event_loop: &ActiveEventLoop,
    ) -> Result<(Arc<Window>, Pixels<'static>), FrontendError> {
        let title = match self.scheduler.rom() {
            Some(rom) => format!("snes-go - {}", rom.name),
            None => "snes-go".to_string(),
        };
        let window_attributes = Window::default_attributes()
            .with_title(title)
            .with_inner_size(LogicalSize::new(
                self.config.window_width(),
                self.config.window_height(),
            ))
            .with_resizable(false);

        let window = event_loop
            .create_window(window_attributes)
            .map_err(|e| FrontendError::fatal(InitStage::Platform, e.to_string()))?;

        // Arc keeps the window alive for the 'static surface
        let window = Arc::new(window);
        let size = window.inner_size();
        let surface_texture = SurfaceTexture::new(size.width, size.height, Arc::clone(&window));

        let pixels = PixelsBuilder::new(SNES_WIDTH as u32, SNES_HEIGHT as u32, surface_texture)
            .enable_vsync(self.config.vsync)
            .build()
            .map_err(|e| FrontendError::fatal(InitStage::Platform, e.to_string()))?;

        Ok((window, pixels))
    }

    fn render(&mut self) -> Result<(), pixels::Error> {
        let (Some(pixels), Some(frame)) = (&mut self.pixels, self.scheduler.platform().frame())
        else {
            return Ok(());
        };
        frame_to_rgba(frame, pixels.frame_mut(), SNES_WIDTH, SNES_HEIGHT);
        pixels.render()
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, err: FrontendError) {
        error!(error = %err, "stopping");
        self.error = Some(err);
        event_loop.exit();
    }
}

impl<C: EmulationCore, M: MenuHost> ApplicationHandler for DesktopApp<C, M> {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        match self.create_surface(event_loop) {
            Ok((window, pixels)) => {
                self.window = Some(window);
                self.pixels = Some(pixels);
            }
            Err(e) => self.fail(event_loop, e),
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        match event {
            WindowEvent::CloseRequested => {
                info!("close requested");
                event_loop.exit();
            }
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key,
                        state,
                        ..
                    },
                ..
            } => {
                self.scheduler
                    .platform_mut()
                    .keyboard_mut()
                    .handle_key(physical_key, state == ElementState::Pressed);
            }
            WindowEvent::Focused(false) => {
                self.scheduler.platform_mut().keyboard_mut().release_all();
            }
            WindowEvent::RedrawRequested => {
                if let Err(e) = self.render() {
                    error!(error = %e, "render failed");
                    event_loop.exit();
                }
            }
            _ => {}
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_none() {
            return;
        }

        if self.scheduler.state() == SchedulerState::Running {
            if let Err(e) = self.scheduler.step() {
                self.fail(event_loop, e);
                return;
            }
        }
        if self.scheduler.state() != SchedulerState::Running {
            info!("scheduler stopped");
            event_loop.exit();
            return;
        }

        if self.scheduler.platform_mut().take_dirty() {
            if let Some(window) = &self.window {
                window.request_redraw();
            }
        }
    }
}

/// Open the window and drive a booted scheduler until it stops
///
/// # Arguments
/// * `scheduler` - Scheduler that has already completed `boot`
/// * `config` - Window configuration
///
/// # Returns
/// Result indicating success or error
pub fn run_desktop<C: EmulationCore, M: MenuHost>(
    scheduler: FrameScheduler<DesktopPlatform, C, M>,
    config: WindowConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    let event_loop = EventLoop::new()?;

    // The platform paces each iteration itself, so the loop never blocks
    event_loop.set_control_flow(ControlFlow::Poll);

    info!(
        width = config.window_width(),
        height = config.window_height(),
        scale = config.scale,
        vsync = config.vsync,
        "starting display window"
    );

    let mut app = DesktopApp::new(scheduler, config);
    event_loop.run_app(&mut app)?;

    match app.error.take() {
        Some(e) => Err(e.into()),
        None => Ok(()),
    }
}
