// Common test utilities for scheduler integration tests
//
// Fakes for the three collaborators of the frame scheduler: a platform that
// records everything handed to it, a core that follows a script, and a menu
// host that replays canned choices.

#![allow(dead_code)]

use snes_go::audio::StereoSample;
use snes_go::config::FrontendConfig;
use snes_go::core::{CoreError, CoreResult, CoreSettings, EmulationCore, FrameContext, RomInfo};
use snes_go::input::{GamepadKeys, KeymapSet, SnesButtons};
use snes_go::menu::{GameMenuChoice, MenuEvent, MenuHost, OptionId, OptionsMenu};
use snes_go::platform::{
    AudioSink, DisplaySink, JsonSettingsStore, Platform, SettingsStore, SourceFormat,
};
use snes_go::scheduler::FrameScheduler;
use snes_go::video::FrameSlot;
use std::cell::Cell;
use std::collections::VecDeque;
use std::path::Path;

/// Simulated work time of one frame, in microseconds
pub const FRAME_COST_US: i64 = 500;

/// Platform that records every call made by the scheduler
pub struct FakePlatform {
    pub format: Option<SourceFormat>,
    pub updates: usize,
    pub last_frame: Option<FrameSlot>,
    pub audio_calls: Vec<Vec<StereoSample>>,
    pub ticks: Vec<i64>,
    pub settings: JsonSettingsStore,
    script: VecDeque<GamepadKeys>,
    clock: Cell<i64>,
}

impl FakePlatform {
    pub fn new() -> Self {
        Self {
            format: None,
            updates: 0,
            last_frame: None,
            audio_calls: Vec::new(),
            ticks: Vec::new(),
            settings: JsonSettingsStore::in_memory(),
            script: VecDeque::new(),
            clock: Cell::new(0),
        }
    }

    /// Raw key states returned by successive polls; empty once exhausted
    pub fn with_script(mut self, script: impl IntoIterator<Item = GamepadKeys>) -> Self {
        self.script = script.into_iter().collect();
        self
    }

    /// Pre-seed the persisted keymap index
    pub fn with_stored_keymap(mut self, index: i64) -> Self {
        self.settings
            .set_number("keymap", index)
            .expect("in-memory store never fails");
        self
    }

    pub fn audio_samples(&self) -> usize {
        self.audio_calls.iter().map(Vec::len).sum()
    }
}

impl DisplaySink for FakePlatform {
    fn set_source_format(&mut self, format: SourceFormat) {
        self.format = Some(format);
    }

    fn queue_update(&mut self, frame: &FrameSlot, _previous: Option<&FrameSlot>) {
        self.updates += 1;
        self.last_frame = Some(frame.clone());
    }
}

impl AudioSink for FakePlatform {
    fn submit_audio(&mut self, samples: &[StereoSample]) {
        self.audio_calls.push(samples.to_vec());
    }
}

impl Platform for FakePlatform {
    fn read_gamepad(&mut self) -> GamepadKeys {
        self.script.pop_front().unwrap_or_default()
    }

    // Every reading advances the clock, so one step measures FRAME_COST_US
    fn timer_us(&self) -> i64 {
        let now = self.clock.get();
        self.clock.set(now + FRAME_COST_US);
        now
    }

    fn tick(&mut self, elapsed_us: i64) {
        self.ticks.push(elapsed_us);
    }

    fn settings(&self) -> &dyn SettingsStore {
        &self.settings
    }

    fn settings_mut(&mut self) -> &mut dyn SettingsStore {
        &mut self.settings
    }
}

/// Init stage a `ScriptedCore` should fail at
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailAt {
    Memory,
    Apu,
    Sound,
    Graphics,
    Rom,
}

/// Core that records its calls and produces a fixed amount of audio
#[derive(Debug, Default)]
pub struct ScriptedCore {
    pub fail_at: Option<FailAt>,
    pub calls: Vec<&'static str>,
    pub frames: u64,
    pub renders: Vec<bool>,
    pub joypads: Vec<SnesButtons>,
    pub apu_flags: Vec<bool>,
    pub samples_per_frame: usize,
    pub sample_value: i16,
    pub sample_step: i16,
}

impl ScriptedCore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Push `count` samples of `value` on every frame
    pub fn with_audio(mut self, count: usize, value: i16) -> Self {
        self.samples_per_frame = count;
        self.sample_value = value;
        self
    }

    /// Raise the pushed sample value by `step` on every frame
    pub fn with_audio_step(mut self, step: i16) -> Self {
        self.sample_step = step;
        self
    }

    pub fn failing_at(stage: FailAt) -> Self {
        Self {
            fail_at: Some(stage),
            ..Self::default()
        }
    }

    fn stage(&mut self, name: &'static str, stage: FailAt) -> CoreResult<()> {
        self.calls.push(name);
        if self.fail_at == Some(stage) {
            Err(CoreError::new(format!("{name} unavailable")))
        } else {
            Ok(())
        }
    }
}

impl EmulationCore for ScriptedCore {
    fn init_memory(&mut self, _settings: &CoreSettings) -> CoreResult<()> {
        self.stage("memory", FailAt::Memory)
    }

    fn init_apu(&mut self, _settings: &CoreSettings) -> CoreResult<()> {
        self.stage("apu", FailAt::Apu)
    }

    fn init_sound(&mut self, _settings: &CoreSettings) -> CoreResult<()> {
        self.stage("sound", FailAt::Sound)
    }

    fn init_gfx(&mut self, _settings: &CoreSettings) -> CoreResult<()> {
        self.stage("gfx", FailAt::Graphics)
    }

    fn load_rom(&mut self, path: &Path) -> CoreResult<RomInfo> {
        self.stage("rom", FailAt::Rom)?;
        Ok(RomInfo {
            name: path.display().to_string(),
        })
    }

    fn run_frame(&mut self, frame: &mut FrameContext<'_>) {
        self.renders.push(frame.render_this_frame());
        self.joypads.push(frame.joypad(0));
        self.apu_flags.push(frame.settings().apu_enabled);

        if frame.render_this_frame() {
            let color = self.frames as u16;
            frame.surfaces().main().fill(color);
        }

        if self.samples_per_frame > 0 {
            let value = self.sample_value + self.sample_step * self.frames as i16;
            let samples = vec![StereoSample::mono(value); self.samples_per_frame];
            let audio = frame.audio();
            audio.push_samples(&samples);
            audio.samples_ready();
        }

        self.frames += 1;
    }
}

/// One scripted interaction inside the options menu
#[derive(Debug, Clone, Copy)]
pub enum MenuStep {
    Option(OptionId, MenuEvent),
    Controls(MenuEvent),
}

/// Menu host replaying canned choices
#[derive(Debug, Default)]
pub struct ScriptedMenu {
    pub game_choices: VecDeque<GameMenuChoice>,
    pub options_sessions: VecDeque<Vec<MenuStep>>,
    pub game_opened: usize,
    pub options_opened: usize,
}

impl ScriptedMenu {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_game_choice(mut self, choice: GameMenuChoice) -> Self {
        self.game_choices.push_back(choice);
        self
    }

    pub fn with_options_session(mut self, steps: Vec<MenuStep>) -> Self {
        self.options_sessions.push_back(steps);
        self
    }
}

impl MenuHost for ScriptedMenu {
    fn game_menu(&mut self) -> GameMenuChoice {
        self.game_opened += 1;
        self.game_choices
            .pop_front()
            .unwrap_or(GameMenuChoice::Resume)
    }

    fn options_menu(&mut self, menu: &mut OptionsMenu<'_>) {
        self.options_opened += 1;
        for step in self.options_sessions.pop_front().unwrap_or_default() {
            match step {
                MenuStep::Option(id, event) => {
                    menu.handle(id, event);
                }
                MenuStep::Controls(event) => {
                    menu.handle_controls(event);
                }
            }
        }
    }
}

pub type TestScheduler = FrameScheduler<FakePlatform, ScriptedCore, ScriptedMenu>;

/// Configuration with every frame rendered
pub fn config_every_frame() -> FrontendConfig {
    let mut config = FrontendConfig::default();
    config.video.frameskip = 1;
    config
}

/// Scheduler booted with the built-in keymaps
pub fn booted(
    platform: FakePlatform,
    core: ScriptedCore,
    menu: ScriptedMenu,
    config: &FrontendConfig,
) -> TestScheduler {
    let mut scheduler = FrameScheduler::new(platform, core, menu, config, KeymapSet::builtin());
    scheduler
        .boot(Path::new("test.sfc"))
        .expect("scripted boot succeeds");
    scheduler
}
