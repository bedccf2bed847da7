// snes-go Library
// Frame orchestration for a handheld SNES emulator frontend

// Public modules
pub mod audio;
pub mod config;
pub mod core;
pub mod error;
pub mod handlers;
pub mod host;
pub mod input;
pub mod menu;
pub mod platform;
pub mod scheduler;
pub mod video;

// Re-export main types for convenience
pub use audio::{AudioMixPipeline, AudioMode, AudioStats, Mixer, StereoSample, AUDIO_SAMPLE_RATE};
pub use config::{ConfigError, FrontendConfig, CONFIG_FILE};
pub use crate::core::{CoreSettings, EmulationCore, FrameContext, RomInfo};
pub use error::{FrontendError, InitStage, Operation};
pub use input::{GamepadKeys, InputTranslator, KeymapProfile, KeymapSet, SnesButtons};
pub use menu::{GameMenuChoice, MenuHost, OptionsMenu, RuntimeOptions};
pub use platform::{JsonSettingsStore, Platform, SettingsStore, SourceFormat};
pub use scheduler::{FrameScheduler, Frameskip, IterationReport, PacingState, SchedulerState};
pub use video::{FrameSlot, VideoSurfaceManager};
