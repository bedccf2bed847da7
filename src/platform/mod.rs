// Platform module - The narrow interface consumed from the host runtime
//
// The frame loop never talks to hardware directly. Everything it needs from
// the host (gamepad state, display queue, audio device, timer, pacing,
// persisted settings) goes through the traits in this module.

pub mod settings;

pub use settings::{JsonSettingsStore, SettingsError, SettingsStore};

use crate::audio::StereoSample;
use crate::input::GamepadKeys;
use crate::video::FrameSlot;

/// Pixel layout of frames handed to the display
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PixelFormat {
    /// 16-bit 5:6:5, little endian
    Rgb565Le,
}

/// Source format declared to the display once at boot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceFormat {
    /// Visible width in pixels
    pub width: usize,
    /// Visible height in pixels
    pub height: usize,
    /// Bytes per row of the render surface
    pub pitch: usize,
    /// Pixel layout
    pub format: PixelFormat,
}

/// Display pipeline
pub trait DisplaySink {
    /// Declare the layout of every frame that will follow
    fn set_source_format(&mut self, format: SourceFormat);

    /// Enqueue a finished frame without waiting for it to be shown
    ///
    /// `previous` is the frame shown before this one, if any.
    fn queue_update(&mut self, frame: &FrameSlot, previous: Option<&FrameSlot>);
}

/// Audio device
pub trait AudioSink {
    /// Submit interleaved stereo frames for playback
    fn submit_audio(&mut self, samples: &[StereoSample]);
}

/// Host runtime driving one frontend instance
pub trait Platform: DisplaySink + AudioSink {
    /// Read the raw physical button state
    fn read_gamepad(&mut self) -> GamepadKeys;

    /// Monotonic timer in microseconds
    fn timer_us(&self) -> i64;

    /// Called once per loop iteration with the measured work time
    ///
    /// The platform does whatever pacing or power management it needs here.
    fn tick(&mut self, elapsed_us: i64);

    /// Persisted key-value settings
    fn settings(&self) -> &dyn SettingsStore;

    /// Mutable persisted key-value settings
    fn settings_mut(&mut self) -> &mut dyn SettingsStore;
}
