// Frame scheduler integration tests
//
// Drive the scheduler end to end through the fakes in `common`: boot
// sequencing, frame pacing, audio submission, menu suspension and keymap
// persistence.

mod common;

use common::*;
use proptest::prelude::*;
use snes_go::audio::{AudioMode, StereoSample};
use snes_go::error::{FrontendError, InitStage};
use snes_go::input::{GamepadKeys, InputTranslator, KeymapSet, MenuTriggers, SnesButtons};
use snes_go::menu::{GameMenuChoice, MenuEvent, OptionId};
use snes_go::platform::{PixelFormat, SettingsStore};
use snes_go::scheduler::{FrameScheduler, SchedulerState};
use snes_go::video::{SNES_HEIGHT, SNES_WIDTH};
use snes_go::FrontendConfig;
use std::path::Path;

/// Samples in one 60 Hz frame at 22050 Hz
const FRAME_SAMPLES: usize = 22050 / 60;

// ========================================
// Boot
// ========================================

#[test]
fn test_boot_declares_source_format() {
    let scheduler = booted(
        FakePlatform::new(),
        ScriptedCore::new(),
        ScriptedMenu::new(),
        &FrontendConfig::default(),
    );

    assert_eq!(scheduler.state(), SchedulerState::Running);
    assert_eq!(scheduler.core().calls, ["memory", "apu", "sound", "gfx", "rom"]);

    let format = scheduler.platform().format.expect("format declared at boot");
    assert_eq!(format.width, SNES_WIDTH);
    assert_eq!(format.height, SNES_HEIGHT);
    assert_eq!(format.format, PixelFormat::Rgb565Le);
    assert_eq!(scheduler.rom().map(|rom| rom.name.as_str()), Some("test.sfc"));
}

#[test]
fn test_boot_failure_names_stage_and_stops() {
    let cases = [
        (FailAt::Memory, InitStage::Memory, 1),
        (FailAt::Apu, InitStage::Apu, 2),
        (FailAt::Sound, InitStage::Sound, 3),
        (FailAt::Graphics, InitStage::Graphics, 4),
        (FailAt::Rom, InitStage::RomLoad, 5),
    ];

    for (fail_at, expected, calls) in cases {
        let mut scheduler = FrameScheduler::new(
            FakePlatform::new(),
            ScriptedCore::failing_at(fail_at),
            ScriptedMenu::new(),
            &FrontendConfig::default(),
            KeymapSet::builtin(),
        );

        let err = scheduler.boot(Path::new("broken.sfc")).unwrap_err();
        match err {
            FrontendError::FatalInit { stage, .. } => assert_eq!(stage, expected),
            other => panic!("expected FatalInit, got {other:?}"),
        }
        assert!(err.is_fatal());
        assert_eq!(scheduler.state(), SchedulerState::Stopped);
        assert_eq!(scheduler.core().calls.len(), calls);
        // Nothing reaches the display before every stage succeeded
        assert!(scheduler.platform().format.is_none());
        assert!(matches!(scheduler.step(), Err(FrontendError::NotRunning)));
    }
}

#[test]
fn test_boot_twice_rejected() {
    let mut scheduler = booted(
        FakePlatform::new(),
        ScriptedCore::new(),
        ScriptedMenu::new(),
        &FrontendConfig::default(),
    );
    assert!(matches!(
        scheduler.boot(Path::new("again.sfc")),
        Err(FrontendError::AlreadyBooted)
    ));
    assert_eq!(scheduler.state(), SchedulerState::Running);
}

#[test]
fn test_step_before_boot_is_not_running() {
    let mut scheduler = FrameScheduler::new(
        FakePlatform::new(),
        ScriptedCore::new(),
        ScriptedMenu::new(),
        &FrontendConfig::default(),
        KeymapSet::builtin(),
    );
    assert!(matches!(scheduler.step(), Err(FrontendError::NotRunning)));
    assert_eq!(scheduler.core().frames, 0);
}

// ========================================
// Frame pacing
// ========================================

#[test]
fn test_frameskip_three_render_pattern() {
    let mut scheduler = booted(
        FakePlatform::new(),
        ScriptedCore::new(),
        ScriptedMenu::new(),
        &FrontendConfig::default(),
    );

    let rendered: Vec<bool> = (0..6)
        .map(|_| scheduler.step().unwrap().rendered)
        .collect();

    assert_eq!(rendered, [true, false, false, true, false, false]);
    assert_eq!(scheduler.core().renders, rendered);
    assert_eq!(scheduler.platform().updates, 2);
    assert_eq!(scheduler.pacing().frame_counter(), 6);
}

#[test]
fn test_elapsed_time_reaches_tick() {
    let mut scheduler = booted(
        FakePlatform::new(),
        ScriptedCore::new(),
        ScriptedMenu::new(),
        &FrontendConfig::default(),
    );

    for _ in 0..3 {
        let report = scheduler.step().unwrap();
        assert_eq!(report.elapsed_us, FRAME_COST_US);
    }
    assert_eq!(scheduler.platform().ticks, [FRAME_COST_US; 3]);
    assert_eq!(scheduler.pacing().last_elapsed_us(), FRAME_COST_US);
}

#[test]
fn test_presented_frame_is_latest_render() {
    let mut scheduler = booted(
        FakePlatform::new(),
        ScriptedCore::new(),
        ScriptedMenu::new(),
        &config_every_frame(),
    );

    for _ in 0..4 {
        scheduler.step().unwrap();
    }

    let frame = scheduler.platform().last_frame.as_ref().expect("frame queued");
    assert_eq!(frame.pixel(0, 0), 3);
    assert_eq!(frame.pixel(SNES_WIDTH - 1, SNES_HEIGHT - 1), 3);
    assert_eq!(scheduler.video().unwrap().displayed_frame().pixel(10, 10), 3);
}

// ========================================
// Audio
// ========================================

#[test]
fn test_per_frame_audio_submits_fixed_size() {
    let mut scheduler = booted(
        FakePlatform::new(),
        ScriptedCore::new().with_audio(100, 50),
        ScriptedMenu::new(),
        &FrontendConfig::default(),
    );

    for _ in 0..5 {
        let report = scheduler.step().unwrap();
        assert_eq!(report.samples_submitted, FRAME_SAMPLES);
    }

    let calls = &scheduler.platform().audio_calls;
    assert_eq!(calls.len(), 5);
    assert!(calls.iter().all(|call| call.len() == FRAME_SAMPLES));
    // 100 real samples, the rest padded with silence
    assert_eq!(calls[0][99], StereoSample::mono(50));
    assert_eq!(calls[0][100], StereoSample::SILENCE);
    assert_eq!(scheduler.audio_stats().underruns, 5);
}

#[test]
fn test_audio_disabled_never_calls_sink() {
    for mode in [AudioMode::PerFrame, AudioMode::OnDemand] {
        let mut config = FrontendConfig::default();
        config.audio.enabled = false;
        config.audio.mode = mode;

        let mut scheduler = booted(
            FakePlatform::new(),
            ScriptedCore::new().with_audio(FRAME_SAMPLES, 1000),
            ScriptedMenu::new(),
            &config,
        );

        for _ in 0..30 {
            assert_eq!(scheduler.step().unwrap().samples_submitted, 0);
        }

        assert!(scheduler.platform().audio_calls.is_empty());
        assert!(scheduler.core().apu_flags.iter().all(|&apu| !apu));
        assert!(!scheduler.core_settings().apu_enabled);
    }
}

#[test]
fn test_lowpass_toggle_affects_next_flush_only() {
    let platform = FakePlatform::new().with_script([GamepadKeys::empty(), GamepadKeys::OPTION]);
    let menu = ScriptedMenu::new().with_options_session(vec![MenuStep::Option(
        OptionId::LowpassFilter,
        MenuEvent::Next,
    )]);
    let mut scheduler = booted(
        platform,
        ScriptedCore::new()
            .with_audio(FRAME_SAMPLES, 1000)
            .with_audio_step(1000),
        menu,
        &FrontendConfig::default(),
    );

    scheduler.step().unwrap();
    let report = scheduler.step().unwrap();
    assert_eq!(report.menu, MenuTriggers::OPTIONS_MENU);
    assert!(scheduler.options().lowpass_filter);

    let calls = &scheduler.platform().audio_calls;
    assert_eq!(calls.len(), 2);
    assert_eq!(calls[1].len(), calls[0].len());

    // First flush went out unfiltered and stays that way
    assert!(calls[0].iter().all(|&s| s == StereoSample::mono(1000)));

    // Filter continues from the last direct sample and climbs towards the input
    assert_eq!(calls[1][0], StereoSample::mono(1400));
    assert!(calls[1][0].left < calls[1][1].left);
    assert!(calls[1].iter().all(|s| s.left > 1000 && s.left < 2000));
}

#[test]
fn test_on_demand_submits_inline() {
    let mut config = FrontendConfig::default();
    config.audio.mode = AudioMode::OnDemand;

    let mut scheduler = booted(
        FakePlatform::new(),
        ScriptedCore::new().with_audio(64, 7),
        ScriptedMenu::new(),
        &config,
    );

    for _ in 0..3 {
        assert_eq!(scheduler.step().unwrap().samples_submitted, 64);
    }

    let calls = &scheduler.platform().audio_calls;
    assert_eq!(calls.len(), 3);
    assert!(calls.iter().all(|call| call.len() == 64));
    assert_eq!(scheduler.audio_stats().frames_flushed, 0);
    assert_eq!(scheduler.core_settings().sound_input_rate, Some(22050));
}

#[test]
fn test_apu_disabled_from_menu_silences_output() {
    let platform = FakePlatform::new().with_script([
        GamepadKeys::empty(),
        GamepadKeys::OPTION,
        GamepadKeys::empty(),
    ]);
    let menu = ScriptedMenu::new()
        .with_options_session(vec![MenuStep::Option(OptionId::ApuEnable, MenuEvent::Prev)]);
    let mut scheduler = booted(
        platform,
        ScriptedCore::new().with_audio(FRAME_SAMPLES, 1000),
        menu,
        &FrontendConfig::default(),
    );

    for _ in 0..3 {
        scheduler.step().unwrap();
    }

    assert_eq!(scheduler.platform().audio_calls.len(), 1);
    assert_eq!(scheduler.core().apu_flags, [true, false, false]);
    assert!(!scheduler.options().apu_enabled);
}

// ========================================
// Menus
// ========================================

#[test]
fn test_game_menu_suspends_and_resumes() {
    let platform = FakePlatform::new().with_script([
        GamepadKeys::empty(),
        GamepadKeys::MENU,
        GamepadKeys::A,
    ]);
    let mut scheduler = booted(
        platform,
        ScriptedCore::new(),
        ScriptedMenu::new().with_game_choice(GameMenuChoice::Resume),
        &config_every_frame(),
    );

    let frames: Vec<u64> = (0..3).map(|_| scheduler.step().unwrap().frame).collect();

    assert_eq!(frames, [0, 1, 2]);
    assert_eq!(scheduler.menu_host().game_opened, 1);
    assert_eq!(scheduler.pacing().frame_counter(), 3);
    assert_eq!(scheduler.core().frames, 3);
    // The menu poll hands the core an idle joypad
    assert_eq!(
        scheduler.core().joypads,
        [SnesButtons::empty(), SnesButtons::empty(), SnesButtons::B]
    );
    assert_eq!(scheduler.state(), SchedulerState::Running);
}

#[test]
fn test_quit_stops_before_frame() {
    let platform = FakePlatform::new().with_script([GamepadKeys::empty(), GamepadKeys::MENU]);
    let mut scheduler = booted(
        platform,
        ScriptedCore::new().with_audio(FRAME_SAMPLES, 1),
        ScriptedMenu::new().with_game_choice(GameMenuChoice::Quit),
        &config_every_frame(),
    );

    scheduler.step().unwrap();
    let report = scheduler.step().unwrap();

    assert!(!report.rendered);
    assert_eq!(report.samples_submitted, 0);
    assert_eq!(scheduler.state(), SchedulerState::Stopped);
    assert_eq!(scheduler.core().frames, 1);
    assert_eq!(scheduler.platform().audio_calls.len(), 1);
    assert!(matches!(scheduler.step(), Err(FrontendError::NotRunning)));
}

#[test]
fn test_run_returns_after_quit() {
    let mut script = vec![GamepadKeys::empty(); 10];
    script.push(GamepadKeys::MENU);
    let mut scheduler = booted(
        FakePlatform::new().with_script(script),
        ScriptedCore::new(),
        ScriptedMenu::new().with_game_choice(GameMenuChoice::Quit),
        &FrontendConfig::default(),
    );

    scheduler.run().unwrap();

    assert_eq!(scheduler.state(), SchedulerState::Stopped);
    assert_eq!(scheduler.core().frames, 10);
}

#[test]
fn test_unsupported_choices_keep_running() {
    let script = [GamepadKeys::MENU, GamepadKeys::MENU, GamepadKeys::MENU];
    let menu = ScriptedMenu::new()
        .with_game_choice(GameMenuChoice::SaveState)
        .with_game_choice(GameMenuChoice::LoadState)
        .with_game_choice(GameMenuChoice::Reset);
    let mut scheduler = booted(
        FakePlatform::new().with_script(script),
        ScriptedCore::new(),
        menu,
        &FrontendConfig::default(),
    );

    for _ in 0..3 {
        scheduler.step().unwrap();
    }

    assert_eq!(scheduler.menu_host().game_opened, 3);
    assert_eq!(scheduler.state(), SchedulerState::Running);
    assert_eq!(scheduler.core().frames, 3);
}

#[test]
fn test_screenshot_choice_writes_png() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = config_every_frame();
    config.paths.screenshots = dir.path().to_path_buf();

    let mut scheduler = booted(
        FakePlatform::new().with_script([GamepadKeys::empty(), GamepadKeys::MENU]),
        ScriptedCore::new(),
        ScriptedMenu::new().with_game_choice(GameMenuChoice::Screenshot),
        &config,
    );

    scheduler.step().unwrap();
    scheduler.step().unwrap();

    let shots: Vec<_> = std::fs::read_dir(dir.path().join("test_sfc"))
        .unwrap()
        .collect();
    assert_eq!(shots.len(), 1);
}

#[test]
fn test_frameskip_changed_from_menu() {
    let menu = ScriptedMenu::new().with_options_session(vec![
        MenuStep::Option(OptionId::Frameskip, MenuEvent::Prev),
        MenuStep::Option(OptionId::Frameskip, MenuEvent::Prev),
    ]);
    let mut scheduler = booted(
        FakePlatform::new().with_script([GamepadKeys::OPTION]),
        ScriptedCore::new(),
        menu,
        &FrontendConfig::default(),
    );

    let first = scheduler.step().unwrap();
    assert!(first.rendered);
    assert_eq!(scheduler.pacing().frameskip().get(), 1);
    assert!((0..5).all(|_| scheduler.step().unwrap().rendered));
}

// ========================================
// Keymaps
// ========================================

#[test]
fn test_keymap_restored_at_boot() {
    let keymaps = KeymapSet::builtin();
    for (stored, expected) in [(2, 2), (5, 1), (-1, 3)] {
        let scheduler = booted(
            FakePlatform::new().with_stored_keymap(stored),
            ScriptedCore::new(),
            ScriptedMenu::new(),
            &FrontendConfig::default(),
        );
        assert_eq!(scheduler.options().keymap, expected);
        assert_eq!(scheduler.input().bindings(), keymaps.get(expected).bindings());
    }
}

#[test]
fn test_keymap_change_is_applied_and_persisted() {
    let menu = ScriptedMenu::new().with_options_session(vec![
        MenuStep::Controls(MenuEvent::Prev),
        MenuStep::Controls(MenuEvent::Enter),
    ]);
    let mut scheduler = booted(
        FakePlatform::new().with_script([GamepadKeys::OPTION]),
        ScriptedCore::new(),
        menu,
        &FrontendConfig::default(),
    );

    scheduler.step().unwrap();

    let keymaps = KeymapSet::builtin();
    assert_eq!(scheduler.options().keymap, 3);
    assert_eq!(scheduler.platform().settings.get_number("keymap", 0), 3);
    assert_eq!(scheduler.input().bindings(), keymaps.get(3).bindings());
}

#[test]
fn test_keymap_survives_restart() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("settings.json");

    let mut platform = FakePlatform::new().with_script([GamepadKeys::OPTION]);
    platform.settings = snes_go::platform::JsonSettingsStore::open(&path).unwrap();
    let mut scheduler = booted(
        platform,
        ScriptedCore::new(),
        ScriptedMenu::new().with_options_session(vec![MenuStep::Controls(MenuEvent::Next)]),
        &FrontendConfig::default(),
    );
    scheduler.step().unwrap();
    drop(scheduler);

    let mut platform = FakePlatform::new();
    platform.settings = snes_go::platform::JsonSettingsStore::open(&path).unwrap();
    let scheduler = booted(
        platform,
        ScriptedCore::new(),
        ScriptedMenu::new(),
        &FrontendConfig::default(),
    );
    assert_eq!(scheduler.options().keymap, 1);
}

// ========================================
// Properties
// ========================================

proptest! {
    #[test]
    fn prop_translator_is_pure(bits in any::<u32>(), other in any::<u32>(), profile in 0usize..4) {
        let keymaps = KeymapSet::builtin();
        let mut input = InputTranslator::new();
        keymaps.apply(profile, &mut input);

        let raw = GamepadKeys::from_bits_truncate(bits);
        let first = input.poll(raw);
        let _ = input.poll(GamepadKeys::from_bits_truncate(other));
        prop_assert_eq!(input.poll(raw), first);
    }

    #[test]
    fn prop_keymap_selection_wraps(count in 1usize..8, start in 0usize..8) {
        let keymaps = KeymapSet::from_profiles(
            (0..count)
                .map(|i| snes_go::input::KeymapProfile::new(format!("P{i}"), Vec::new()))
                .collect(),
        )
        .unwrap();
        let start = start % count;

        let next = keymaps.select(start, snes_go::input::Direction::Next);
        let back = keymaps.select(next, snes_go::input::Direction::Prev);
        prop_assert_eq!(back, start);
        prop_assert!(next < count);
        if start == count - 1 {
            prop_assert_eq!(next, 0);
        }
        if start == 0 {
            prop_assert_eq!(keymaps.select(0, snes_go::input::Direction::Prev), count - 1);
        }
    }

    #[test]
    fn prop_submission_size_fixed(pushed in 0usize..2000, lowpass in any::<bool>()) {
        let mut pipeline = snes_go::audio::AudioMixPipeline::new(22050, 60);
        pipeline.push_samples(&vec![StereoSample::mono(100); pushed]);
        prop_assert_eq!(pipeline.flush(lowpass), FRAME_SAMPLES);
        prop_assert_eq!(pipeline.buffer().len(), FRAME_SAMPLES);
    }
}
