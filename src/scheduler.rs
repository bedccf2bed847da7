// Frame scheduler - The fixed-cadence frame loop
//
// Coordinates input, the emulation core, audio mixing and presentation.
// Each iteration polls input (opening a menu if requested), runs one core
// frame, mixes and submits one frame of audio, presents the picture when
// frameskip allows and reports the time spent to the platform. The
// scheduler never sleeps; pacing is the platform's business.

use crate::audio::{AudioMixPipeline, AudioMode, AudioPort, AudioStats};
use crate::config::FrontendConfig;
use crate::core::{CoreSettings, EmulationCore, FrameContext, RomInfo};
use crate::error::{FrontendError, InitStage};
use crate::handlers;
use crate::input::{InputTranslator, KeymapSet, MenuTriggers};
use crate::menu::{GameMenuChoice, MenuHost, OptionsMenu, RuntimeOptions};
use crate::platform::Platform;
use crate::video::screenshot::timestamped_path;
use crate::video::{VideoSurfaceManager, SNES_HEIGHT, SNES_WIDTH};
use std::path::{Path, PathBuf};
use tracing::{debug, error, info, trace, warn};

/// Present one frame out of every `n`; never zero
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Frameskip(u32);

impl Frameskip {
    /// Create a divisor, raising 0 to 1
    pub fn new(value: u32) -> Self {
        Self(value.max(1))
    }

    /// The divisor
    pub fn get(self) -> u32 {
        self.0
    }
}

impl Default for Frameskip {
    fn default() -> Self {
        Self(3)
    }
}

/// Frame counting and render decisions
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PacingState {
    frame_counter: u64,
    frameskip: Frameskip,
    last_elapsed_us: i64,
}

impl PacingState {
    /// Start counting from frame 0
    pub fn new(frameskip: Frameskip) -> Self {
        Self {
            frame_counter: 0,
            frameskip,
            last_elapsed_us: 0,
        }
    }

    /// Decide whether the next frame is presented and advance the counter
    ///
    /// The value tested is the counter before the increment, so frame 0 is
    /// always presented.
    ///
    /// # Example
    ///
    /// ```
    /// use snes_go::scheduler::{Frameskip, PacingState};
    ///
    /// let mut pacing = PacingState::new(Frameskip::new(2));
    /// assert!(pacing.next_render());
    /// assert!(!pacing.next_render());
    /// assert!(pacing.next_render());
    /// ```
    pub fn next_render(&mut self) -> bool {
        let render = self.frame_counter % u64::from(self.frameskip.get()) == 0;
        self.frame_counter = self.frame_counter.wrapping_add(1);
        render
    }

    /// Frames started so far
    pub fn frame_counter(&self) -> u64 {
        self.frame_counter
    }

    /// Current divisor
    pub fn frameskip(&self) -> Frameskip {
        self.frameskip
    }

    /// Change the divisor; the counter is left alone
    pub fn set_frameskip(&mut self, frameskip: Frameskip) {
        self.frameskip = frameskip;
    }

    /// Work time of the last iteration in microseconds
    pub fn last_elapsed_us(&self) -> i64 {
        self.last_elapsed_us
    }

    fn record_elapsed(&mut self, elapsed_us: i64) {
        self.last_elapsed_us = elapsed_us;
    }
}

/// Lifecycle of the scheduler
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerState {
    /// Created, `boot` not yet successful
    Booting,
    /// Stepping frames
    Running,
    /// Quit from the game menu, or boot failed
    Stopped,
}

/// What happened during one `step`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IterationReport {
    /// Frame counter value tested for this iteration
    pub frame: u64,
    /// The picture was handed to the display
    pub rendered: bool,
    /// Time spent between the start and end timestamps
    pub elapsed_us: i64,
    /// Stereo frames handed to the audio device
    pub samples_submitted: usize,
    /// Menus opened before the frame ran
    pub menu: MenuTriggers,
}

/// The frame loop and everything it owns
pub struct FrameScheduler<P, C, M> {
    platform: P,
    core: C,
    menu: M,

    state: SchedulerState,
    pacing: PacingState,
    options: RuntimeOptions,
    settings: CoreSettings,

    video: Option<VideoSurfaceManager>,
    audio: AudioMixPipeline,
    audio_mode: AudioMode,
    input: InputTranslator,
    keymaps: KeymapSet,

    rom_path: PathBuf,
    rom: Option<RomInfo>,
    screenshot_dir: PathBuf,
}

impl<P: Platform, C: EmulationCore, M: MenuHost> FrameScheduler<P, C, M> {
    /// Create a scheduler in the `Booting` state
    ///
    /// # Arguments
    ///
    /// * `platform` - Host runtime
    /// * `core` - Emulation core
    /// * `menu` - Menu renderer
    /// * `config` - Startup values for the runtime options
    /// * `keymaps` - Selectable control profiles
    pub fn new(platform: P, core: C, menu: M, config: &FrontendConfig, keymaps: KeymapSet) -> Self {
        let frameskip = Frameskip::new(config.video.frameskip);
        let options = RuntimeOptions {
            apu_enabled: config.audio.enabled,
            lowpass_filter: config.audio.lowpass_filter,
            frameskip,
            keymap: 0,
        };

        Self {
            platform,
            core,
            menu,
            state: SchedulerState::Booting,
            pacing: PacingState::new(frameskip),
            options,
            settings: CoreSettings::new(config.audio.sample_rate, config.audio.mode),
            video: None,
            audio: AudioMixPipeline::new(config.audio.sample_rate, config.video.target_fps),
            audio_mode: config.audio.mode,
            input: InputTranslator::new(),
            keymaps,
            rom_path: PathBuf::new(),
            rom: None,
            screenshot_dir: config.paths.screenshots.clone(),
        }
    }

    /// Bring everything up and enter `Running`
    ///
    /// Stages run in order: display memory, core memory, APU, sound,
    /// graphics, ROM. The first failure is fatal and leaves the scheduler
    /// `Stopped`.
    pub fn boot(&mut self, rom_path: &Path) -> Result<RomInfo, FrontendError> {
        if self.state != SchedulerState::Booting {
            return Err(FrontendError::AlreadyBooted);
        }

        match self.try_boot(rom_path) {
            Ok(rom) => {
                self.state = SchedulerState::Running;
                info!(rom = %rom.name, keymap = self.options.keymap, "boot complete");
                Ok(rom)
            }
            Err(e) => {
                self.state = SchedulerState::Stopped;
                error!(error = %e, "boot failed");
                Err(e)
            }
        }
    }

    fn try_boot(&mut self, rom_path: &Path) -> Result<RomInfo, FrontendError> {
        self.settings.apu_enabled = self.options.apu_enabled;

        let video = VideoSurfaceManager::initialize()?;
        debug!("display memory ready");

        let fatal = |stage: InitStage| move |e: crate::core::CoreError| FrontendError::fatal(stage, e.0);
        self.core
            .init_memory(&self.settings)
            .map_err(fatal(InitStage::Memory))?;
        self.core
            .init_apu(&self.settings)
            .map_err(fatal(InitStage::Apu))?;
        self.core
            .init_sound(&self.settings)
            .map_err(fatal(InitStage::Sound))?;
        self.core
            .init_gfx(&self.settings)
            .map_err(fatal(InitStage::Graphics))?;
        debug!("core initialized");

        let rom = self
            .core
            .load_rom(rom_path)
            .map_err(fatal(InitStage::RomLoad))?;

        self.platform.set_source_format(video.source_format());
        self.video = Some(video);

        let index = self.keymaps.stored_index(self.platform.settings());
        self.options.keymap = index;
        self.keymaps.apply(index, &mut self.input);

        self.rom_path = rom_path.to_path_buf();
        self.rom = Some(rom.clone());
        Ok(rom)
    }

    /// Run one loop iteration
    ///
    /// Choosing Quit in the game menu stops the scheduler before the frame
    /// runs; the report then shows nothing rendered or submitted.
    pub fn step(&mut self) -> Result<IterationReport, FrontendError> {
        if self.state != SchedulerState::Running {
            return Err(FrontendError::NotRunning);
        }

        let poll = self.input.poll(self.platform.read_gamepad());
        if poll.triggers.contains(MenuTriggers::GAME_MENU) {
            self.open_game_menu();
        }
        if self.state != SchedulerState::Running {
            return Ok(IterationReport {
                frame: self.pacing.frame_counter(),
                rendered: false,
                elapsed_us: 0,
                samples_submitted: 0,
                menu: poll.triggers,
            });
        }
        if poll.triggers.contains(MenuTriggers::OPTIONS_MENU) {
            self.open_options_menu();
        }

        let start = self.platform.timer_us();

        let frame = self.pacing.frame_counter();
        let render = self.pacing.next_render();
        if !self.options.apu_enabled {
            self.settings.apu_enabled = false;
        }

        let audio_on = self.options.apu_enabled;
        let lowpass = self.options.lowpass_filter;
        let per_frame = audio_on && self.audio_mode == AudioMode::PerFrame;

        let video = self.video.as_mut().ok_or(FrontendError::NotRunning)?;
        let mut samples_submitted = {
            let port = AudioPort::new(&mut self.audio, &mut self.platform, self.audio_mode, audio_on);
            let mut context =
                FrameContext::new(render, video.pair(), poll.controller, port, &self.settings);
            self.core.run_frame(&mut context);
            context.audio().submitted()
        };

        if per_frame {
            self.audio.flush(lowpass);
        }

        let elapsed_us = self.platform.timer_us() - start;

        if render {
            video.present(&mut self.platform);
        }

        if per_frame {
            samples_submitted += self.audio.submit(&mut self.platform);
        }

        self.pacing.record_elapsed(elapsed_us);
        self.platform.tick(elapsed_us);

        trace!(frame, render, elapsed_us, samples_submitted, "frame");

        Ok(IterationReport {
            frame,
            rendered: render,
            elapsed_us,
            samples_submitted,
            menu: poll.triggers,
        })
    }

    /// Step until the scheduler stops
    pub fn run(&mut self) -> Result<(), FrontendError> {
        while self.state == SchedulerState::Running {
            self.step()?;
        }
        Ok(())
    }

    fn open_game_menu(&mut self) {
        debug!("game menu opened");
        let choice = self.menu.game_menu();
        info!(choice = %choice, "game menu closed");

        let outcome = match choice {
            GameMenuChoice::Resume => Ok(()),
            GameMenuChoice::SaveState => handlers::save_state(&self.state_path()),
            GameMenuChoice::LoadState => handlers::load_state(&self.state_path()),
            GameMenuChoice::Reset => handlers::reset(false),
            GameMenuChoice::Screenshot => {
                self.take_screenshot();
                Ok(())
            }
            GameMenuChoice::Quit => {
                self.state = SchedulerState::Stopped;
                info!("quit requested");
                Ok(())
            }
        };

        if let Err(e) = outcome {
            warn!(error = %e, "menu action had no effect");
        }
    }

    fn open_options_menu(&mut self) {
        debug!("options menu opened");
        let before = self.options;
        {
            let mut options = OptionsMenu::new(&mut self.options, &self.keymaps);
            self.menu.options_menu(&mut options);
        }
        self.apply_options(before);
    }

    fn apply_options(&mut self, before: RuntimeOptions) {
        let after = self.options;

        if after.apu_enabled != before.apu_enabled {
            self.settings.apu_enabled = after.apu_enabled;
            info!(enabled = after.apu_enabled, "APU toggled");
        }
        if after.lowpass_filter != before.lowpass_filter {
            info!(enabled = after.lowpass_filter, "low-pass filter toggled");
        }
        if after.frameskip != before.frameskip {
            self.pacing.set_frameskip(after.frameskip);
            info!(frameskip = after.frameskip.get(), "frameskip changed");
        }
        if after.keymap != before.keymap {
            self.keymaps.apply(after.keymap, &mut self.input);
            if let Err(e) = self
                .keymaps
                .store_index(self.platform.settings_mut(), after.keymap)
            {
                warn!(error = %e, "could not persist keymap selection");
            }
        }
    }

    fn take_screenshot(&self) {
        let Some(video) = self.video.as_ref() else {
            return;
        };
        let rom_name = self.rom.as_ref().map(|rom| rom.name.as_str());
        let path = timestamped_path(&self.screenshot_dir, rom_name);
        if let Err(e) = handlers::screenshot(video, &path, SNES_WIDTH as u32, SNES_HEIGHT as u32) {
            warn!(error = %e, "screenshot failed");
        }
    }

    fn state_path(&self) -> PathBuf {
        self.rom_path.with_extension("state")
    }

    /// Lifecycle state
    pub fn state(&self) -> SchedulerState {
        self.state
    }

    /// Frame counting
    pub fn pacing(&self) -> &PacingState {
        &self.pacing
    }

    /// Values changeable from the options menu
    pub fn options(&self) -> &RuntimeOptions {
        &self.options
    }

    /// Configuration handed to the core
    pub fn core_settings(&self) -> &CoreSettings {
        &self.settings
    }

    /// Render surfaces, once booted
    pub fn video(&self) -> Option<&VideoSurfaceManager> {
        self.video.as_ref()
    }

    /// Audio statistics
    pub fn audio_stats(&self) -> AudioStats {
        self.audio.stats()
    }

    /// Active binding table
    pub fn input(&self) -> &InputTranslator {
        &self.input
    }

    /// Loaded ROM, once booted
    pub fn rom(&self) -> Option<&RomInfo> {
        self.rom.as_ref()
    }

    /// Host runtime
    pub fn platform(&self) -> &P {
        &self.platform
    }

    /// Mutable host runtime
    pub fn platform_mut(&mut self) -> &mut P {
        &mut self.platform
    }

    /// Emulation core
    pub fn core(&self) -> &C {
        &self.core
    }

    /// Menu renderer
    pub fn menu_host(&self) -> &M {
        &self.menu
    }
}
