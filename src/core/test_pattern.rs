// Test pattern core - A stand-in emulation core
//
// Draws scrolling colour bars on the main screen and a tint on the sub
// screen, then averages the two the way SNES colour math does. A square
// follows the d-pad. While any button is held a square-wave tone plays.

use super::{CoreError, CoreResult, CoreSettings, EmulationCore, FrameContext, RomInfo};
use crate::audio::StereoSample;
use crate::input::SnesButtons;
use crate::video::{Surface, SNES_HEIGHT, SNES_WIDTH};
use std::fs;
use std::path::Path;

/// Eight bars in RGB565
const BARS: [u16; 8] = [
    0xFFFF, 0xFFE0, 0x07FF, 0x07E0, 0xF81F, 0xF800, 0x001F, 0x0000,
];

const SUB_TINT: u16 = 0x4208;
const CURSOR_SIZE: usize = 16;
const CURSOR_COLOR: u16 = 0xFFFF;
const TONE_HZ: u32 = 440;
const TONE_AMPLITUDE: i16 = 3000;

/// Built-in core that needs no ROM
#[derive(Debug, Default)]
pub struct TestPatternCore {
    frame: u64,
    cursor: (usize, usize),
    phase: u32,
    samples_per_frame: usize,
    sample_rate: u32,
    rendered: u64,
}

impl TestPatternCore {
    /// Create the core
    pub fn new() -> Self {
        Self {
            cursor: ((SNES_WIDTH - CURSOR_SIZE) / 2, (SNES_HEIGHT - CURSOR_SIZE) / 2),
            ..Self::default()
        }
    }

    /// Frames emulated so far
    pub fn frames(&self) -> u64 {
        self.frame
    }

    /// Frames that were rasterized
    pub fn rendered(&self) -> u64 {
        self.rendered
    }

    /// Cursor position (top-left corner)
    pub fn cursor(&self) -> (usize, usize) {
        self.cursor
    }

    fn move_cursor(&mut self, buttons: SnesButtons) {
        let (mut x, mut y) = self.cursor;
        if buttons.contains(SnesButtons::LEFT) {
            x = x.saturating_sub(2);
        }
        if buttons.contains(SnesButtons::RIGHT) {
            x = (x + 2).min(SNES_WIDTH - CURSOR_SIZE);
        }
        if buttons.contains(SnesButtons::UP) {
            y = y.saturating_sub(2);
        }
        if buttons.contains(SnesButtons::DOWN) {
            y = (y + 2).min(SNES_HEIGHT - CURSOR_SIZE);
        }
        self.cursor = (x, y);
    }

    fn draw(&self, main: &mut Surface, sub: &mut Surface) {
        let bar_width = SNES_WIDTH / BARS.len();
        let scroll = self.frame as usize;

        for y in 0..SNES_HEIGHT {
            let row = y as isize;
            for x in 0..SNES_WIDTH {
                sub.set(x, row, SUB_TINT);
                let bar = BARS[((x + scroll) / bar_width) % BARS.len()];
                main.set(x, row, average_rgb565(bar, sub.get(x, row)));
            }
        }

        let (cx, cy) = self.cursor;
        for y in cy..cy + CURSOR_SIZE {
            for x in cx..cx + CURSOR_SIZE {
                main.set(x, y as isize, CURSOR_COLOR);
            }
        }
    }

    fn tone(&mut self, count: usize, audible: bool) -> Vec<StereoSample> {
        let half_period = (self.sample_rate / (TONE_HZ * 2)).max(1);
        (0..count)
            .map(|_| {
                self.phase = (self.phase + 1) % (half_period * 2);
                if !audible {
                    StereoSample::SILENCE
                } else if self.phase < half_period {
                    StereoSample::mono(TONE_AMPLITUDE)
                } else {
                    StereoSample::mono(-TONE_AMPLITUDE)
                }
            })
            .collect()
    }
}

impl EmulationCore for TestPatternCore {
    fn init_sound(&mut self, settings: &CoreSettings) -> CoreResult<()> {
        if settings.sound_playback_rate == 0 {
            return Err(CoreError::new("playback rate is zero"));
        }
        self.sample_rate = settings.sound_playback_rate;
        self.samples_per_frame = (u64::from(settings.sound_playback_rate)
            * u64::from(settings.frame_time_ntsc)
            / 1_000_000) as usize;
        Ok(())
    }

    /// An empty path selects the built-in pattern; anything else must exist
    fn load_rom(&mut self, path: &Path) -> CoreResult<RomInfo> {
        if path.as_os_str().is_empty() {
            return Ok(RomInfo {
                name: "TEST PATTERN".to_string(),
            });
        }

        let metadata = fs::metadata(path)
            .map_err(|e| CoreError::new(format!("{}: {}", path.display(), e)))?;
        if metadata.len() == 0 {
            return Err(CoreError::new(format!("{} is empty", path.display())));
        }

        let name = path
            .file_stem()
            .map(|stem| stem.to_string_lossy().to_uppercase())
            .unwrap_or_else(|| "UNTITLED".to_string());
        Ok(RomInfo { name })
    }

    fn run_frame(&mut self, frame: &mut FrameContext<'_>) {
        let buttons = frame.joypad(0);
        self.move_cursor(buttons);

        if frame.render_this_frame() {
            let (main, sub) = frame.surfaces().screens();
            self.draw(main, sub);
            self.rendered += 1;
        }

        if frame.settings().apu_enabled && frame.audio().enabled() {
            let samples = self.tone(self.samples_per_frame, !buttons.is_empty());
            let audio = frame.audio();
            audio.push_samples(&samples);
            audio.samples_ready();
        }

        self.frame += 1;
    }
}

/// Half-brightness add of two RGB565 pixels
fn average_rgb565(a: u16, b: u16) -> u16 {
    ((a & 0xF7DE) >> 1) + ((b & 0xF7DE) >> 1)
}
