// Core module - The interface to the emulation core
//
// The frontend never emulates anything itself. It configures a core, brings
// it up in stages, loads a ROM into it and then runs it one frame at a time,
// lending it the render surfaces, the controller state and the audio port
// for the duration of each step.

pub mod test_pattern;

pub use test_pattern::TestPatternCore;

use crate::audio::{AudioMode, AudioPort};
use crate::input::SnesButtons;
use crate::video::SurfacePair;
use std::path::Path;
use thiserror::Error;

/// Master cycles per scanline
pub const SNES_CYCLES_PER_SCANLINE: u32 = 1364;

/// Horizontal counter positions per scanline
pub const SNES_HCOUNTER_MAX: u32 = 342;

/// Failure reported by the emulation core
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct CoreError(pub String);

impl CoreError {
    /// Create an error from any message
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

/// Result type for core operations
pub type CoreResult<T> = Result<T, CoreError>;

/// Device plugged into the controller ports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ControllerType {
    /// Standard joypad
    #[default]
    Joypad,
    /// SNES mouse
    Mouse,
    /// Super Scope light gun
    SuperScope,
    /// Justifier light gun
    Justifier,
}

/// CPU timing knobs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CycleTiming {
    /// Run memory accesses at the fast speed
    pub overclock_cycles: bool,
    /// Cycles of a fast access
    pub one_c: u32,
    /// Cycles of a slow access
    pub slow_one_c: u32,
    /// Cycles of a double access
    pub two_c: u32,
}

impl Default for CycleTiming {
    fn default() -> Self {
        Self {
            overclock_cycles: false,
            one_c: 4,
            slow_one_c: 5,
            two_c: 6,
        }
    }
}

/// Configuration handed to the core before it is first used
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoreSettings {
    pub joystick_enabled: bool,
    pub cycles_percentage: u32,
    pub h_max: u32,
    /// PAL frame length in microseconds
    pub frame_time_pal: u32,
    /// NTSC frame length in microseconds
    pub frame_time_ntsc: u32,
    pub controller: ControllerType,
    pub apply_cheats: bool,
    pub hblank_start: u32,
    pub sound_playback_rate: u32,
    pub interpolated_sound: bool,
    /// Rate the core resamples from; only set when the core drives audio submission
    pub sound_input_rate: Option<u32>,
    /// Cleared while audio is switched off
    pub apu_enabled: bool,
    pub timing: CycleTiming,
    pub reduce_sprite_flicker: bool,
}

impl CoreSettings {
    /// Settings for the handheld frontend
    ///
    /// # Arguments
    ///
    /// * `sample_rate` - Audio output rate in Hz
    /// * `mode` - How mixed audio reaches the device
    pub fn new(sample_rate: u32, mode: AudioMode) -> Self {
        let h_max = SNES_CYCLES_PER_SCANLINE;
        Self {
            joystick_enabled: false,
            cycles_percentage: 100,
            h_max,
            frame_time_pal: 20000,
            frame_time_ntsc: 16667,
            controller: ControllerType::Joypad,
            apply_cheats: false,
            hblank_start: (256 * h_max) / SNES_HCOUNTER_MAX,
            sound_playback_rate: sample_rate,
            interpolated_sound: true,
            sound_input_rate: match mode {
                AudioMode::OnDemand => Some(sample_rate),
                AudioMode::PerFrame => None,
            },
            apu_enabled: true,
            timing: CycleTiming::default(),
            reduce_sprite_flicker: false,
        }
    }
}

/// What the core reports about a loaded ROM
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RomInfo {
    /// Internal title
    pub name: String,
}

/// Everything the core may touch during one frame
pub struct FrameContext<'a> {
    render: bool,
    surfaces: SurfacePair<'a>,
    controller: SnesButtons,
    audio: AudioPort<'a>,
    settings: &'a CoreSettings,
}

impl<'a> FrameContext<'a> {
    /// Assemble the context for one step
    pub fn new(
        render: bool,
        surfaces: SurfacePair<'a>,
        controller: SnesButtons,
        audio: AudioPort<'a>,
        settings: &'a CoreSettings,
    ) -> Self {
        Self {
            render,
            surfaces,
            controller,
            audio,
            settings,
        }
    }

    /// Whether the picture of this frame will be presented
    ///
    /// The core may skip rasterizing when this is false.
    pub fn render_this_frame(&self) -> bool {
        self.render
    }

    /// Render surfaces
    pub fn surfaces(&mut self) -> &mut SurfacePair<'a> {
        &mut self.surfaces
    }

    /// Joypad state for a controller port; only port 0 is connected
    pub fn joypad(&self, port: u32) -> SnesButtons {
        if port == 0 {
            self.controller
        } else {
            SnesButtons::empty()
        }
    }

    /// Audio output
    pub fn audio(&mut self) -> &mut AudioPort<'a> {
        &mut self.audio
    }

    /// Core configuration
    pub fn settings(&self) -> &CoreSettings {
        self.settings
    }
}

/// An emulation core driven by the frame scheduler
///
/// The init stages are called once each, in declaration order, before the
/// ROM is loaded. Any failure aborts boot.
pub trait EmulationCore {
    /// Allocate the memory map
    fn init_memory(&mut self, _settings: &CoreSettings) -> CoreResult<()> {
        Ok(())
    }

    /// Bring up the audio processing unit
    fn init_apu(&mut self, _settings: &CoreSettings) -> CoreResult<()> {
        Ok(())
    }

    /// Bring up the sound mixer
    fn init_sound(&mut self, _settings: &CoreSettings) -> CoreResult<()> {
        Ok(())
    }

    /// Bring up the renderer
    fn init_gfx(&mut self, _settings: &CoreSettings) -> CoreResult<()> {
        Ok(())
    }

    /// Load a ROM image
    fn load_rom(&mut self, path: &Path) -> CoreResult<RomInfo>;

    /// Emulate one frame
    fn run_frame(&mut self, frame: &mut FrameContext<'_>);
}
