// Host module - Desktop stand-in for the handheld runtime
//
// DesktopPlatform implements the platform traits on top of a winit window
// (keyboard), gilrs (gamepads) and cpal (audio). The window itself lives in
// `window`, which drives the scheduler from the winit event loop.

pub mod audio_out;
pub mod gamepad;
pub mod keyboard;
pub mod window;

pub use gamepad::GamepadInput;
pub use keyboard::KeyboardInput;
pub use window::{run_desktop, WindowConfig};

use crate::audio::StereoSample;
use crate::config::FrontendConfig;
use crate::input::GamepadKeys;
use crate::platform::{AudioSink, DisplaySink, JsonSettingsStore, Platform, SettingsStore, SourceFormat};
use crate::video::FrameSlot;
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, info};

#[cfg(feature = "audio")]
use audio_out::AudioOutput;
#[cfg(feature = "audio")]
use tracing::warn;

/// Audio ring length; a few frames of headroom keeps the device fed
#[cfg(feature = "audio")]
const AUDIO_BUFFER_MS: u32 = 100;

/// Desktop implementation of the platform interface
pub struct DesktopPlatform {
    keyboard: KeyboardInput,
    gamepad: Option<GamepadInput>,
    format: Option<SourceFormat>,
    frame: Option<FrameSlot>,
    dirty: bool,
    #[cfg(feature = "audio")]
    audio: Option<AudioOutput>,
    dropped_samples: u64,
    settings: JsonSettingsStore,
    epoch: Instant,
    frame_interval: Duration,
    deadline: Instant,
}

impl DesktopPlatform {
    /// Open gamepads and the audio device
    ///
    /// Neither is required: without a gamepad only the keyboard is read,
    /// without an audio device submitted frames are discarded.
    pub fn new(config: &FrontendConfig, settings: JsonSettingsStore) -> Self {
        #[cfg(feature = "audio")]
        let audio = if config.audio.enabled {
            AudioOutput::new(config.audio.sample_rate, AUDIO_BUFFER_MS)
                .map_err(|e| warn!(error = %e, "audio output unavailable, running silent"))
                .ok()
        } else {
            None
        };

        let frame_interval = Duration::from_micros(config.frame_interval_us().unsigned_abs());
        let now = Instant::now();

        info!(
            interval_us = frame_interval.as_micros() as u64,
            "desktop platform ready"
        );

        Self {
            keyboard: KeyboardInput::new(),
            gamepad: GamepadInput::open(),
            format: None,
            frame: None,
            dirty: false,
            #[cfg(feature = "audio")]
            audio,
            dropped_samples: 0,
            settings,
            epoch: now,
            frame_interval,
            deadline: now + frame_interval,
        }
    }

    /// Keyboard state fed by window events
    pub fn keyboard_mut(&mut self) -> &mut KeyboardInput {
        &mut self.keyboard
    }

    /// Format declared at boot, if any
    pub fn source_format(&self) -> Option<SourceFormat> {
        self.format
    }

    /// Most recently queued frame
    pub fn frame(&self) -> Option<&FrameSlot> {
        self.frame.as_ref()
    }

    /// True once per newly queued frame
    pub fn take_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    /// Audio frames lost to a full device ring
    pub fn dropped_samples(&self) -> u64 {
        self.dropped_samples
    }
}

impl DisplaySink for DesktopPlatform {
    fn set_source_format(&mut self, format: SourceFormat) {
        info!(
            width = format.width,
            height = format.height,
            pitch = format.pitch,
            "source format"
        );
        self.format = Some(format);
    }

    fn queue_update(&mut self, frame: &FrameSlot, _previous: Option<&FrameSlot>) {
        match &mut self.frame {
            Some(latest) => latest.clone_from(frame),
            None => self.frame = Some(frame.clone()),
        }
        self.dirty = true;
    }
}

impl AudioSink for DesktopPlatform {
    #[cfg(feature = "audio")]
    fn submit_audio(&mut self, samples: &[StereoSample]) {
        if let Some(audio) = &self.audio {
            let dropped = audio.push(samples);
            if dropped > 0 {
                self.dropped_samples += dropped as u64;
                debug!(dropped, buffered = audio.buffered(), "audio ring full");
            }
        }
    }

    #[cfg(not(feature = "audio"))]
    fn submit_audio(&mut self, samples: &[StereoSample]) {
        self.dropped_samples += samples.len() as u64;
    }
}

impl Platform for DesktopPlatform {
    fn read_gamepad(&mut self) -> GamepadKeys {
        let mut keys = self.keyboard.state();
        if let Some(gamepad) = &mut self.gamepad {
            gamepad.update();
            keys |= gamepad.state();
        }
        keys
    }

    fn timer_us(&self) -> i64 {
        self.epoch.elapsed().as_micros() as i64
    }

    fn tick(&mut self, elapsed_us: i64) {
        let now = Instant::now();
        if now < self.deadline {
            thread::sleep(self.deadline - now);
            self.deadline += self.frame_interval;
        } else {
            // Behind schedule: restart the cadence instead of racing to catch up
            if now - self.deadline > self.frame_interval {
                debug!(elapsed_us, "frame overran its slot");
            }
            self.deadline = now + self.frame_interval;
        }
    }

    fn settings(&self) -> &dyn SettingsStore {
        &self.settings
    }

    fn settings_mut(&mut self) -> &mut dyn SettingsStore {
        &mut self.settings
    }
}
